//! `md2html_core` converts Markdown pages into HTML pages. Plugins rewrite
//! small metadata blocks embedded in HTML comments, `<!--MARKER payload-->`,
//! before the page is rendered.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown page
//!   → Tokenizer (finds balanced `<!--MARKER payload-->` blocks)
//!   → Handler registry (marker + page-start scope → handlers)
//!   → Substitution engine (invokes handlers, splices results, guards recursion)
//!   → Markdown renderer
//!   → Page template (title, styles, content and plugin variables)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Argument file loading and merging of command line, document
//!   and `default` settings.
//! - [`plugins`]: The built-in plugins and [`PluginTable`].
//! - [`paths`]: Relative links between generated pages.
//!
//! ## Key Types
//!
//! - [`MetadataFinder`]: Forward-only scanner yielding [`MetadataBlock`]s.
//! - [`HandlerRegistry`]: Built once per run from plugin declarations. Its
//!   [`HandlerRegistry::apply`] method runs the substitution engine.
//! - [`Plugin`] and [`PageMetadataHandler`]: What plugins implement.
//! - [`Session`]: Drives a conversion run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2html_core::CliOptions;
//! use md2html_core::PluginTable;
//! use md2html_core::Session;
//! use std::path::PathBuf;
//!
//! let cli = CliOptions {
//! 	argument_file: Some(PathBuf::from("md2html_args.json")),
//! 	..CliOptions::default()
//! };
//! let session = Session::load(&cli, &PluginTable::builtin()).unwrap();
//! for outcome in session.run().unwrap() {
//! 	println!("{} -> {}", outcome.input_file.display(), outcome.output_file);
//! }
//! ```

pub use cache::*;
pub use config::*;
pub use document::*;
pub use engine::*;
pub use error::*;
pub use lexer::*;
pub use plugin::*;
pub use plugins::PluginTable;
pub use registry::*;
pub use render::*;
pub use replacer::*;
pub use session::*;

mod cache;
pub mod config;
mod document;
mod engine;
#[allow(unused_assignments)]
mod error;
mod lexer;
pub mod paths;
mod plugin;
pub mod plugins;
mod registry;
mod render;
mod replacer;
mod session;

#[cfg(test)]
mod __fixtures;
