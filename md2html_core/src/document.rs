use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

/// A page to convert, with all options already merged from the command line,
/// the document item and the `default` section of the argument file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Document {
	/// Markdown source file.
	pub input_file: PathBuf,
	/// HTML output location, relative to the working directory and always
	/// written with `/` separators.
	pub output_file: String,
	/// Page title, empty when not given.
	pub title: String,
	/// Short identifier other pages use to link here.
	pub code: Option<String>,
	/// Custom page template. The built-in template is used when absent.
	pub template: Option<PathBuf>,
	/// Stylesheets linked from the page.
	pub link_css: Vec<String>,
	/// Stylesheets whose content is embedded into the page.
	pub include_css: Vec<PathBuf>,
	/// Produce a page without any styles.
	pub no_css: bool,
	/// Regenerate even when the output is newer than the input.
	pub force: bool,
	/// Log progress for this document.
	pub verbose: bool,
	/// Print the output path once the page is generated.
	pub report: bool,
}

impl Document {
	/// A document for `input_file` with the output placed next to it.
	pub fn new(input_file: impl Into<PathBuf>) -> Self {
		let input_file = input_file.into();
		let output_file = default_output_file(&input_file);

		Self {
			input_file,
			output_file,
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_output(mut self, output_file: impl Into<String>) -> Self {
		self.output_file = output_file.into().replace('\\', "/");
		self
	}

	#[must_use]
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(code.into());
		self
	}

	/// Identifies the page in diagnostics.
	pub fn name(&self) -> String {
		self.input_file.display().to_string()
	}

	/// True when neither linked nor embedded styles are configured and styles
	/// are not switched off.
	pub fn uses_default_css(&self) -> bool {
		!self.no_css && self.link_css.is_empty() && self.include_css.is_empty()
	}
}

/// The input path with its extension replaced by `.html`.
pub fn default_output_file(input_file: &Path) -> String {
	input_file
		.with_extension("html")
		.to_string_lossy()
		.replace('\\', "/")
}
