use std::process;
use std::time::Instant;

use clap::Parser;
use md2html_cli::Md2HtmlCli;
use md2html_core::DocumentOutcome;
use md2html_core::DocumentStatus;
use md2html_core::Md2HtmlError;
use md2html_core::PluginTable;
use md2html_core::Session;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = match Md2HtmlCli::try_parse() {
		Ok(args) => args,
		Err(error) => {
			let code = i32::from(error.use_stderr());
			error.print().ok();
			process::exit(code);
		}
	};

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let filter = if args.verbose {
		EnvFilter::new("info")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_ansi(use_color)
		.with_writer(std::io::stderr)
		.init();

	if let Err(error) = run(&args) {
		let report: miette::Report = error.into();
		eprintln!("{report:?}");
		process::exit(2);
	}
}

fn run(args: &Md2HtmlCli) -> Result<(), Md2HtmlError> {
	let started = Instant::now();
	let session = Session::load(&args.cli_options(), &PluginTable::builtin())?;

	for document in session.documents() {
		print_outcome(&session.convert(document)?);
	}

	if session.options().verbose {
		println!(
			"{} {:.3?}",
			colored!("Finished in:", bold),
			started.elapsed()
		);
	}

	Ok(())
}

fn print_outcome(outcome: &DocumentOutcome) {
	match outcome.status {
		DocumentStatus::Generated => {
			if outcome.verbose {
				println!(
					"{} {}",
					colored!("Output file generated:", green),
					outcome.output_file
				);
			}
			if outcome.report {
				println!("{}", outcome.output_file);
			}
		}
		DocumentStatus::Skipped => {
			if outcome.verbose {
				println!(
					"{} {}",
					colored!("The output file is up-to-date. Skipping:", yellow),
					outcome.output_file
				);
			}
		}
	}
}
