use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Md2HtmlError {
	#[error(transparent)]
	#[diagnostic(code(md2html::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{path}`: {source}")]
	#[diagnostic(code(md2html::file_read))]
	FileRead {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("cycle detected while re-entering marker `{marker}`, active markers: {chain}")]
	#[diagnostic(
		code(md2html::cycle_detected),
		help("a recursive handler expanded into a block whose marker is already being expanded")
	)]
	CycleDetected { marker: String, chain: String },

	#[error("metadata expansion of marker `{marker}` exceeded the depth limit of {limit}")]
	#[diagnostic(
		code(md2html::recursion_limit),
		help("recursive handlers keep producing new markers; check the replacement templates")
	)]
	RecursionLimit { marker: String, limit: usize },

	#[error("error processing marker `{marker}` on page `{document}`: {source}")]
	#[diagnostic(code(md2html::handler_failure))]
	Handler {
		marker: String,
		document: String,
		#[source]
		source: Box<Md2HtmlError>,
	},

	#[error("{0}")]
	#[diagnostic(code(md2html::page_metadata))]
	PageMetadata(String),

	#[error("incorrect JSON in {context}: {reason}")]
	#[diagnostic(code(md2html::invalid_json))]
	InvalidJson { context: String, reason: String },

	#[error("failed to parse argument file `{path}`: {reason}")]
	#[diagnostic(
		code(md2html::argument_file),
		help("the argument file needs a non-empty `documents` list; see `md2html --help`")
	)]
	ArgumentFile { path: String, reason: String },

	#[error("invalid document definition: {0}")]
	#[diagnostic(code(md2html::document))]
	Document(String),

	#[error("error initializing plugin `{plugin}`: {reason}")]
	#[diagnostic(code(md2html::plugin_data))]
	PluginData { plugin: String, reason: String },

	#[error("unknown plugin: `{0}`")]
	#[diagnostic(
		code(md2html::unknown_plugin),
		help(
			"available plugins: variables, page-variables, relative-paths, page-links, ignore, \
			 replace, include-file"
		)
	)]
	UnknownPlugin(String),

	#[error("invalid replacement template `{template}`: {reason}")]
	#[diagnostic(code(md2html::replacement_template))]
	ReplacementTemplate { template: String, reason: String },

	#[error("cannot relativize `{path}` against page `{page}`: {reason}")]
	#[diagnostic(code(md2html::relative_path))]
	RelativePath {
		path: String,
		page: String,
		reason: String,
	},

	#[error("failed to render markdown: {0}")]
	#[diagnostic(code(md2html::markdown))]
	Markdown(String),

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(md2html::template_render))]
	TemplateRender(String),

	#[error("{0}")]
	#[diagnostic(code(md2html::options), help("use `md2html --help` for the list of options"))]
	Options(String),
}

impl Md2HtmlError {
	/// Attach the marker and page to an error raised by a handler. Errors that
	/// already carry their own expansion context are returned unchanged so that
	/// nested re-entries report the innermost failure.
	pub(crate) fn in_handler(self, marker: &str, document: &str) -> Self {
		match self {
			Self::CycleDetected { .. } | Self::RecursionLimit { .. } | Self::Handler { .. } => self,
			other => {
				Self::Handler {
					marker: marker.to_string(),
					document: document.to_string(),
					source: Box::new(other),
				}
			}
		}
	}
}

pub type Md2HtmlResult<T> = Result<T, Md2HtmlError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
