use chrono::DateTime;
use chrono::Local;
use serde_json::Value;

use crate::Document;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::TextCache;
use crate::Variables;

pub const EXEC_NAME: &str = "md2html";
pub const EXEC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page template used when a document names none.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.html");
/// Stylesheet embedded into pages that configure no styles.
pub const DEFAULT_STYLES: &str = include_str!("templates/styles.css");

const PAGE_TEMPLATE_NAME: &str = "page";

/// Render Markdown with GitHub extensions. Raw HTML is passed through.
pub fn markdown_to_html(text: &str) -> Md2HtmlResult<String> {
	let options = markdown::Options {
		compile: markdown::CompileOptions {
			allow_dangerous_html: true,
			allow_dangerous_protocol: true,
			..markdown::CompileOptions::gfm()
		},
		..markdown::Options::gfm()
	};

	markdown::to_html_with_options(text, &options)
		.map_err(|message| Md2HtmlError::Markdown(message.to_string()))
}

/// Render `template` with `variables`. Values are inserted as is, without
/// HTML escaping.
pub fn render_template(template: &str, variables: &Variables) -> Md2HtmlResult<String> {
	let mut env = minijinja::Environment::new();
	env.set_keep_trailing_newline(true);
	env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
	env.add_template(PAGE_TEMPLATE_NAME, template)
		.map_err(|e| Md2HtmlError::TemplateRender(e.to_string()))?;

	let template = env
		.get_template(PAGE_TEMPLATE_NAME)
		.map_err(|e| Md2HtmlError::TemplateRender(e.to_string()))?;

	let ctx = minijinja::Value::from_serialize(variables);
	template
		.render(ctx)
		.map_err(|e| Md2HtmlError::TemplateRender(e.to_string()))
}

/// Turns converted page content into the final HTML page.
#[derive(Debug, Default)]
pub struct PageRenderer {
	files: TextCache,
}

impl PageRenderer {
	pub fn new() -> Self {
		Self::default()
	}

	/// The `<link>` and `<style>` elements for a document.
	pub fn styles(&self, document: &Document) -> Md2HtmlResult<String> {
		if document.uses_default_css() {
			return Ok(style_element(DEFAULT_STYLES));
		}

		let mut styles: Vec<String> = document
			.link_css
			.iter()
			.map(|href| format!(r#"<link rel="stylesheet" type="text/css" href="{href}">"#))
			.collect();

		for path in &document.include_css {
			styles.push(style_element(&self.files.read(path)?));
		}

		Ok(styles.join("\n"))
	}

	/// Assemble the template variables and render the page.
	///
	/// Plugin variables may replace the title. Everything else is set by the
	/// renderer.
	pub fn render(
		&self,
		document: &Document,
		content: &str,
		plugin_variables: Variables,
		now: DateTime<Local>,
	) -> Md2HtmlResult<String> {
		let mut variables = Variables::new();
		variables.insert("title".into(), Value::String(document.title.clone()));
		variables.extend(plugin_variables);
		if variables.get("title").is_none_or(Value::is_null) {
			variables.insert("title".into(), Value::String(String::new()));
		}

		variables.insert("styles".into(), Value::String(self.styles(document)?));
		variables.insert("content".into(), Value::String(markdown_to_html(content)?));
		variables.insert("exec_name".into(), EXEC_NAME.into());
		variables.insert("exec_version".into(), EXEC_VERSION.into());
		variables.insert(
			"generation_date".into(),
			now.format("%Y-%m-%d").to_string().into(),
		);
		variables.insert(
			"generation_time".into(),
			now.format("%H:%M:%S").to_string().into(),
		);

		match &document.template {
			Some(path) => render_template(&self.files.read(path)?, &variables),
			None => render_template(DEFAULT_TEMPLATE, &variables),
		}
	}
}

fn style_element(css: &str) -> String {
	format!("<style>\n{css}\n</style>")
}
