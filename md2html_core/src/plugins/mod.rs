//! Built-in plugins and the table used to instantiate plugins by name.
//!
//! | Name             | Markers (default)          | Effect                                      |
//! | ---------------- | -------------------------- | ------------------------------------------- |
//! | `variables`      | –                          | static template variables                   |
//! | `page-variables` | `VARIABLES` (page start)   | per-page template variables from JSON       |
//! | `relative-paths` | configurable               | paths relative to the current page          |
//! | `page-links`     | `page`                     | links to other documents by their `code`    |
//! | `ignore`         | `ignore`                   | keeps a literal comment in the output       |
//! | `replace`        | configurable               | `${n}` templates filled from the payload    |
//! | `include-file`   | configurable               | file content, optionally expanded again     |

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::Plugin;

pub use ignore::DEFAULT_IGNORE_MARKER;
pub use ignore::IgnorePlugin;
pub use include_file::Delimiters;
pub use include_file::IncludeFileItem;
pub use include_file::IncludeFilePlugin;
pub use include_file::TrimMode;
pub use page_links::DEFAULT_PAGE_LINK_MARKER;
pub use page_links::PageLinksPlugin;
pub use page_variables::DEFAULT_PAGE_VARIABLES_MARKER;
pub use page_variables::PageVariablesPlugin;
pub use relative_paths::RelativePathsPlugin;
pub use replace::ReplaceItem;
pub use replace::ReplacePlugin;
pub use variables::VariablesPlugin;

mod ignore;
mod include_file;
mod page_links;
mod page_variables;
mod relative_paths;
mod replace;
mod variables;

/// Creates a plugin from its argument-file data.
pub type PluginFactory = fn(&Value) -> Md2HtmlResult<Box<dyn Plugin>>;

/// Plugin names mapped to their factories.
///
/// Built once at startup and handed to whatever loads the argument file.
#[derive(Clone, Default)]
pub struct PluginTable {
	factories: BTreeMap<&'static str, PluginFactory>,
}

impl PluginTable {
	/// A table without any plugins.
	pub fn new() -> Self {
		Self::default()
	}

	/// A table with every built-in plugin.
	pub fn builtin() -> Self {
		let mut table = Self::new();
		table
			.register(variables::NAME, create_variables)
			.register(page_variables::NAME, create_page_variables)
			.register(relative_paths::NAME, create_relative_paths)
			.register(page_links::NAME, create_page_links)
			.register(ignore::NAME, create_ignore)
			.register(replace::NAME, create_replace)
			.register(include_file::NAME, create_include_file);
		table
	}

	pub fn register(&mut self, name: &'static str, factory: PluginFactory) -> &mut Self {
		self.factories.insert(name, factory);
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}

	/// Create the configured plugins in configuration order.
	pub fn instantiate(&self, plugins: &Map<String, Value>) -> Md2HtmlResult<Vec<Box<dyn Plugin>>> {
		plugins
			.iter()
			.map(|(name, data)| {
				let factory = self
					.factories
					.get(name.as_str())
					.ok_or_else(|| Md2HtmlError::UnknownPlugin(name.clone()))?;
				tracing::debug!(plugin = %name, "initializing plugin");
				factory(data)
			})
			.collect()
	}
}

impl fmt::Debug for PluginTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.factories.keys()).finish()
	}
}

fn create_variables(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(VariablesPlugin::from_data(data)?))
}

fn create_page_variables(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(PageVariablesPlugin::from_data(data)?))
}

fn create_relative_paths(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(RelativePathsPlugin::from_data(data)?))
}

fn create_page_links(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(PageLinksPlugin::from_data(data)?))
}

fn create_ignore(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(IgnorePlugin::from_data(data)?))
}

fn create_replace(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(ReplacePlugin::from_data(data)?))
}

fn create_include_file(data: &Value) -> Md2HtmlResult<Box<dyn Plugin>> {
	Ok(Box::new(IncludeFilePlugin::from_data(data)?))
}

/// Deserialize plugin data, reporting failures against the plugin name.
fn plugin_data<T: DeserializeOwned>(plugin: &str, data: &Value) -> Md2HtmlResult<T> {
	T::deserialize(data).map_err(|error| {
		Md2HtmlError::PluginData {
			plugin: plugin.to_string(),
			reason: error.to_string(),
		}
	})
}

/// A payload that is either a plain string or a JSON array of strings.
fn list_from_string_or_array(payload: &str) -> Md2HtmlResult<Vec<String>> {
	if !payload.starts_with('[') {
		return Ok(vec![payload.to_string()]);
	}

	serde_json::from_str(payload).map_err(|error| {
		Md2HtmlError::InvalidJson {
			context: "metadata block".to_string(),
			reason: error.to_string(),
		}
	})
}

/// Reject markers configured twice, ignoring case.
fn check_unique_markers<'m>(
	plugin: &str,
	markers: impl IntoIterator<Item = &'m String>,
) -> Md2HtmlResult<()> {
	let mut seen = HashSet::new();
	for marker in markers {
		let marker = marker.to_uppercase();
		if !seen.insert(marker.clone()) {
			return Err(Md2HtmlError::PluginData {
				plugin: plugin.to_string(),
				reason: format!("marker duplication (case-insensitively): {marker}"),
			});
		}
	}

	Ok(())
}
