use std::fs;
use std::path::Path;
use std::path::PathBuf;

use chrono::Local;

use crate::Arguments;
use crate::CliOptions;
use crate::Document;
use crate::HandlerRegistry;
use crate::Md2HtmlResult;
use crate::PageRenderer;
use crate::Plugin;
use crate::PluginTable;
use crate::SessionOptions;
use crate::Variables;
use crate::cache::read_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
	Generated,
	/// The output was newer than the input and regeneration was not forced.
	Skipped,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
	pub input_file: PathBuf,
	pub output_file: String,
	pub status: DocumentStatus,
	pub verbose: bool,
	pub report: bool,
}

impl DocumentOutcome {
	fn new(document: &Document, status: DocumentStatus) -> Self {
		Self {
			input_file: document.input_file.clone(),
			output_file: document.output_file.clone(),
			status,
			verbose: document.verbose,
			report: document.report,
		}
	}
}

/// One conversion run: the documents, the active plugins and the handler
/// registry built from them.
pub struct Session {
	options: SessionOptions,
	documents: Vec<Document>,
	plugins: Vec<Box<dyn Plugin>>,
	registry: HandlerRegistry,
	renderer: PageRenderer,
}

impl Session {
	/// Load the argument file named on the command line, if any, and
	/// activate the configured plugins from `table`.
	pub fn load(cli: &CliOptions, table: &PluginTable) -> Md2HtmlResult<Self> {
		let arguments = Arguments::load(cli)?;
		let plugins = table.instantiate(&arguments.plugins)?;

		Self::new(arguments.options, arguments.documents, plugins)
	}

	/// Every plugin sees the document list first. Plugins that are blank
	/// afterwards are dropped.
	pub fn new(
		options: SessionOptions,
		documents: Vec<Document>,
		mut plugins: Vec<Box<dyn Plugin>>,
	) -> Md2HtmlResult<Self> {
		for plugin in &mut plugins {
			plugin.accept_document_list(&documents)?;
		}
		plugins.retain(|plugin| !plugin.is_blank());

		let registry = HandlerRegistry::from_plugins(&plugins);
		tracing::debug!(
			plugins = ?plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>(),
			registry = ?registry,
			"session ready"
		);

		Ok(Self {
			options,
			documents,
			plugins,
			registry,
			renderer: PageRenderer::new(),
		})
	}

	pub fn options(&self) -> SessionOptions {
		self.options
	}

	pub fn documents(&self) -> &[Document] {
		&self.documents
	}

	pub fn registry(&self) -> &HandlerRegistry {
		&self.registry
	}

	/// Names of the active plugins in configuration order.
	pub fn plugin_names(&self) -> Vec<&'static str> {
		self.plugins.iter().map(|plugin| plugin.name()).collect()
	}

	/// Convert every document in order, stopping at the first failure.
	pub fn run(&self) -> Md2HtmlResult<Vec<DocumentOutcome>> {
		self.documents
			.iter()
			.map(|document| self.convert(document))
			.collect()
	}

	/// Convert one document and write its output file.
	pub fn convert(&self, document: &Document) -> Md2HtmlResult<DocumentOutcome> {
		let output_file = Path::new(&document.output_file);

		if !document.force && is_up_to_date(&document.input_file, output_file) {
			tracing::info!(
				input = %document.input_file.display(),
				output = %document.output_file,
				"output is up to date, skipping"
			);
			return Ok(DocumentOutcome::new(document, DocumentStatus::Skipped));
		}

		let page = self.convert_text(document, &read_text(&document.input_file)?)?;

		if let Some(parent) = output_file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		fs::write(output_file, page)?;

		tracing::info!(
			input = %document.input_file.display(),
			output = %document.output_file,
			"generated page"
		);

		Ok(DocumentOutcome::new(document, DocumentStatus::Generated))
	}

	/// Produce the HTML page for `document` from its Markdown `text` without
	/// touching the file system, apart from templates and stylesheets.
	pub fn convert_text(&self, document: &Document, text: &str) -> Md2HtmlResult<String> {
		for plugin in &self.plugins {
			plugin.new_page(document);
		}

		let text = self.registry.apply(text, document)?;

		let mut variables = Variables::new();
		for plugin in &self.plugins {
			variables.extend(plugin.variables(document)?);
		}

		self.renderer
			.render(document, &text, variables, Local::now())
	}
}

/// True when `output_file` exists and was modified after `input_file`.
fn is_up_to_date(input_file: &Path, output_file: &Path) -> bool {
	let modified = |path: &Path| fs::metadata(path).and_then(|metadata| metadata.modified());

	match (modified(input_file), modified(output_file)) {
		(Ok(input), Ok(output)) => output > input,
		_ => false,
	}
}
