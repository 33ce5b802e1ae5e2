use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::Document;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::cache::read_text;
use crate::document::default_output_file;

/// Document settings as written in the argument file, either in the
/// `default` section or as an entry of `documents`. The command line is
/// described with the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DocumentItem {
	pub input: Option<PathBuf>,
	pub output: Option<String>,
	pub title: Option<String>,
	pub code: Option<String>,
	pub template: Option<PathBuf>,
	pub link_css: Option<Vec<String>>,
	pub add_link_css: Option<Vec<String>>,
	pub include_css: Option<Vec<PathBuf>>,
	pub add_include_css: Option<Vec<PathBuf>>,
	pub no_css: Option<bool>,
	pub force: Option<bool>,
	pub verbose: Option<bool>,
	pub report: Option<bool>,
}

impl DocumentItem {
	fn has_css(&self) -> bool {
		[&self.link_css, &self.add_link_css]
			.into_iter()
			.any(|list| list.as_ref().is_some_and(|list| !list.is_empty()))
			|| [&self.include_css, &self.add_include_css]
				.into_iter()
				.any(|list| list.as_ref().is_some_and(|list| !list.is_empty()))
	}
}

/// Run-wide settings from the `options` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionOptions {
	#[serde(default)]
	pub verbose: bool,
}

/// The parsed argument file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentFile {
	#[serde(default)]
	pub options: SessionOptions,
	#[serde(default)]
	pub default: DocumentItem,
	pub documents: Vec<DocumentItem>,
	/// Plugin names mapped to their data, in file order.
	#[serde(default)]
	pub plugins: Map<String, Value>,
}

impl ArgumentFile {
	/// Load an argument file. Files ending in `.toml` are read as TOML,
	/// anything else as JSON where lines starting with `#` are comments.
	pub fn load(path: &Path) -> Md2HtmlResult<Self> {
		let text = read_text(path)?;
		let is_toml = path
			.extension()
			.is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));

		let parsed = if is_toml {
			Self::from_toml(&text)
		} else {
			Self::from_json(&text)
		};

		parsed.map_err(|reason| {
			Md2HtmlError::ArgumentFile {
				path: path.display().to_string(),
				reason,
			}
		})
	}

	fn from_json(text: &str) -> Result<Self, String> {
		let file: Self =
			serde_json::from_str(&blank_comment_lines(text)).map_err(|error| error.to_string())?;
		file.validated()
	}

	fn from_toml(text: &str) -> Result<Self, String> {
		let file: Self = toml::from_str(text).map_err(|error| error.to_string())?;
		file.validated()
	}

	fn validated(self) -> Result<Self, String> {
		if self.documents.is_empty() {
			return Err("the `documents` list is empty".to_string());
		}

		Ok(self)
	}
}

/// Replace comment lines with empty lines so that parser positions still
/// point at the right line.
pub fn blank_comment_lines(text: &str) -> String {
	text.split_inclusive('\n')
		.map(|line| {
			if line.trim_start().starts_with('#') {
				if line.ends_with("\r\n") {
					"\r\n"
				} else if line.ends_with('\n') {
					"\n"
				} else {
					""
				}
			} else {
				line
			}
		})
		.collect()
}

/// What the command line asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
	pub argument_file: Option<PathBuf>,
	/// Document settings given on the command line. They describe the only
	/// document when no argument file is used and override every document
	/// otherwise.
	pub document: DocumentItem,
}

/// Everything a run needs, merged from the command line and the argument
/// file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
	pub options: SessionOptions,
	pub documents: Vec<Document>,
	pub plugins: Map<String, Value>,
}

impl Arguments {
	pub fn load(cli: &CliOptions) -> Md2HtmlResult<Self> {
		let Some(path) = &cli.argument_file else {
			let none = DocumentItem::default();
			let document = resolve_document(&cli.document, &none, &none)?;
			return Ok(Self {
				options: SessionOptions {
					verbose: document.verbose,
				},
				documents: vec![document],
				plugins: Map::new(),
			});
		};

		let file = ArgumentFile::load(path)?;
		Self::from_argument_file(cli, file)
	}

	pub fn from_argument_file(cli: &CliOptions, file: ArgumentFile) -> Md2HtmlResult<Self> {
		if file.options.verbose && cli.document.report == Some(true) {
			return Err(Md2HtmlError::Options(
				"`verbose` in the `options` section is incompatible with `--report`".to_string(),
			));
		}

		if file.default.no_css == Some(true) && file.default.has_css() {
			return Err(Md2HtmlError::Document(
				"`no-css` is incompatible with CSS lists in the `default` section".to_string(),
			));
		}

		let documents = file
			.documents
			.iter()
			.map(|item| resolve_document(&cli.document, item, &file.default))
			.collect::<Md2HtmlResult<Vec<_>>>()?;

		Ok(Self {
			options: SessionOptions {
				verbose: file.options.verbose || cli.document.verbose == Some(true),
			},
			documents,
			plugins: file.plugins,
		})
	}
}

fn first<T: Clone>(values: [&Option<T>; 3]) -> Option<T> {
	values.into_iter().find_map(Option::clone)
}

/// Merge one document: command line first, then the document item, then the
/// `default` section.
pub fn resolve_document(
	cli: &DocumentItem,
	item: &DocumentItem,
	defaults: &DocumentItem,
) -> Md2HtmlResult<Document> {
	let input_file = first([&cli.input, &item.input, &defaults.input])
		.ok_or_else(|| Md2HtmlError::Document("the input file is not defined".to_string()))?;
	let name = input_file.display().to_string();

	let output_file = first([&cli.output, &item.output, &defaults.output])
		.map_or_else(|| default_output_file(&input_file), |output| output.replace('\\', "/"));

	let (link_css, include_css, no_css) = if cli.no_css == Some(true) || cli.has_css() {
		(
			cli.link_css.clone().unwrap_or_default(),
			cli.include_css.clone().unwrap_or_default(),
			cli.no_css == Some(true),
		)
	} else {
		if item.no_css == Some(true) && item.has_css() {
			return Err(Md2HtmlError::Document(format!(
				"`no-css` is incompatible with CSS lists for document `{name}`"
			)));
		}

		let mut link_css = item
			.link_css
			.clone()
			.or_else(|| defaults.link_css.clone())
			.unwrap_or_default();
		link_css.extend(item.add_link_css.iter().flatten().cloned());
		let mut include_css = item
			.include_css
			.clone()
			.or_else(|| defaults.include_css.clone())
			.unwrap_or_default();
		include_css.extend(item.add_include_css.iter().flatten().cloned());

		let no_css = link_css.is_empty()
			&& include_css.is_empty()
			&& item.no_css.or(defaults.no_css).unwrap_or(false);

		(link_css, include_css, no_css)
	};

	let flag = |cli: Option<bool>, item: Option<bool>, defaults: Option<bool>| {
		cli.filter(|value| *value)
			.or(item)
			.or(defaults)
			.unwrap_or(false)
	};

	let verbose = flag(cli.verbose, item.verbose, defaults.verbose);
	let report = flag(cli.report, item.report, defaults.report);
	if verbose && report {
		return Err(Md2HtmlError::Document(format!(
			"`report` and `verbose` are incompatible for document `{name}`"
		)));
	}

	Ok(Document {
		input_file,
		output_file,
		title: first([&cli.title, &item.title, &defaults.title]).unwrap_or_default(),
		code: cli.code.clone().or_else(|| item.code.clone()),
		template: first([&cli.template, &item.template, &defaults.template]),
		link_css,
		include_css,
		no_css,
		force: flag(cli.force, item.force, defaults.force),
		verbose,
		report,
	})
}
