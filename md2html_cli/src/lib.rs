use std::path::PathBuf;

use clap::Parser;
use md2html_core::CliOptions;
use md2html_core::DocumentItem;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert Markdown pages into HTML pages.",
	long_about = "md2html converts Markdown pages into HTML pages using a page template.\n\nPlugins \
	              configured in an argument file rewrite metadata blocks written as HTML \
	              comments, `<!--MARKER payload-->`, before the page is rendered. They insert \
	              links between pages, include files, define page variables and more.\n\nQuick \
	              start:\n  md2html -i page.md            Convert a single page\n  md2html \
	              --argument-file args.json  Convert every document of a project"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Md2HtmlCli {
	/// Input Markdown file.
	#[arg(long, short, conflicts_with = "argument_file")]
	pub input: Option<PathBuf>,

	/// Argument file describing the documents to convert and the plugins to
	/// use. JSON, or TOML when the file name ends with `.toml`.
	#[arg(long)]
	pub argument_file: Option<PathBuf>,

	/// Output HTML file. Defaults to the input file name with the `.html`
	/// extension.
	#[arg(long, short)]
	pub output: Option<String>,

	/// The HTML page title.
	#[arg(long, short)]
	pub title: Option<String>,

	/// Custom page template.
	#[arg(long)]
	pub template: Option<PathBuf>,

	/// Link a CSS file. May be repeated.
	#[arg(long)]
	pub link_css: Vec<String>,

	/// Embed the content of a CSS file. May be repeated.
	#[arg(long)]
	pub include_css: Vec<PathBuf>,

	/// Create pages without any CSS. Without CSS options the default
	/// stylesheet is embedded.
	#[arg(long, default_value_t = false, conflicts_with_all = ["link_css", "include_css"])]
	pub no_css: bool,

	/// Rewrite output files even when they are newer than their input.
	#[arg(long, short, default_value_t = false)]
	pub force: bool,

	/// Print human readable progress messages.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Print only the paths of generated files, one per line.
	#[arg(long, short, default_value_t = false, conflicts_with = "verbose")]
	pub report: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl Md2HtmlCli {
	/// The options the conversion session is loaded from. Flags that were
	/// not given stay unset so argument file values can apply.
	pub fn cli_options(&self) -> CliOptions {
		CliOptions {
			argument_file: self.argument_file.clone(),
			document: DocumentItem {
				input: self.input.clone(),
				output: self.output.clone(),
				title: self.title.clone(),
				template: self.template.clone(),
				link_css: non_empty(&self.link_css),
				include_css: non_empty(&self.include_css),
				no_css: flag(self.no_css),
				force: flag(self.force),
				verbose: flag(self.verbose),
				report: flag(self.report),
				..DocumentItem::default()
			},
		}
	}
}

fn flag(value: bool) -> Option<bool> {
	value.then_some(true)
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
	(!values.is_empty()).then(|| values.to_vec())
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;
	use similar_asserts::assert_eq;

	use super::*;

	#[test]
	fn verify_cli() {
		Md2HtmlCli::command().debug_assert();
	}

	#[test]
	fn unset_flags_stay_unset() {
		let cli = Md2HtmlCli::parse_from(["md2html", "-i", "page.md"]);
		let options = cli.cli_options();

		assert_eq!(options.document.input, Some(PathBuf::from("page.md")));
		assert_eq!(options.document.force, None);
		assert_eq!(options.document.verbose, None);
		assert_eq!(options.document.link_css, None);
		assert_eq!(options.argument_file, None);
	}

	#[test]
	fn repeated_css_options_are_collected() {
		let cli = Md2HtmlCli::parse_from([
			"md2html",
			"-i",
			"page.md",
			"--link-css=one.css",
			"--link-css",
			"two.css",
			"--include-css",
			"local.css",
			"-fv",
		]);
		let options = cli.cli_options();

		assert_eq!(
			options.document.link_css,
			Some(vec!["one.css".to_string(), "two.css".to_string()])
		);
		assert_eq!(
			options.document.include_css,
			Some(vec![PathBuf::from("local.css")])
		);
		assert_eq!(options.document.force, Some(true));
		assert_eq!(options.document.verbose, Some(true));
	}

	#[rstest::rstest]
	#[case::no_css_with_link_css(&["md2html", "-i", "a.md", "--no-css", "--link-css", "a.css"])]
	#[case::no_css_with_include_css(&["md2html", "-i", "a.md", "--no-css", "--include-css", "a.css"])]
	#[case::report_with_verbose(&["md2html", "-i", "a.md", "-r", "-v"])]
	#[case::input_with_argument_file(&["md2html", "-i", "a.md", "--argument-file", "args.json"])]
	#[case::missing_title_value(&["md2html", "-i", "a.md", "--title"])]
	#[case::unknown_option(&["md2html", "--unknown"])]
	fn rejects_invalid_arguments(#[case] args: &[&str]) {
		assert!(Md2HtmlCli::try_parse_from(args).is_err());
	}
}
