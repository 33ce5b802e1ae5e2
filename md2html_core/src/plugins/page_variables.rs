use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde_json::Value;

use super::plugin_data;
use crate::Document;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;
use crate::Plugin;
use crate::Variables;

pub(super) const NAME: &str = "page-variables";

/// Marker used when the plugin is configured without any.
pub const DEFAULT_PAGE_VARIABLES_MARKER: &str = "VARIABLES";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct MarkerOptions {
	only_at_page_start: Option<bool>,
}

/// Collects per-page template variables from blocks such as
/// `<!--VARIABLES {"title": "Home"}-->`. The blocks disappear from the page.
#[derive(Debug)]
pub struct PageVariablesPlugin {
	/// Uppercased markers and whether they only apply at the page start.
	markers: BTreeMap<String, bool>,
	collector: Arc<PageVariablesCollector>,
}

impl PageVariablesPlugin {
	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		let options: Option<BTreeMap<String, MarkerOptions>> = plugin_data(NAME, data)?;
		let mut markers: BTreeMap<String, bool> = options
			.unwrap_or_default()
			.into_iter()
			.map(|(marker, options)| {
				(
					marker.to_uppercase(),
					options.only_at_page_start.unwrap_or(true),
				)
			})
			.collect();

		if markers.is_empty() {
			markers.insert(DEFAULT_PAGE_VARIABLES_MARKER.to_string(), true);
		}

		Ok(Self {
			markers,
			collector: Arc::default(),
		})
	}
}

impl Default for PageVariablesPlugin {
	fn default() -> Self {
		Self {
			markers: BTreeMap::from([(DEFAULT_PAGE_VARIABLES_MARKER.to_string(), true)]),
			collector: Arc::default(),
		}
	}
}

impl Plugin for PageVariablesPlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		self.markers
			.iter()
			.map(|(marker, only_at_page_start)| {
				HandlerDeclaration::new(
					marker.clone(),
					*only_at_page_start,
					Arc::clone(&self.collector) as Arc<dyn PageMetadataHandler>,
				)
			})
			.collect()
	}

	fn new_page(&self, _document: &Document) {
		self.collector.reset();
	}

	fn variables(&self, _document: &Document) -> Md2HtmlResult<Variables> {
		Ok(self.collector.snapshot())
	}
}

#[derive(Debug, Default)]
struct PageVariablesCollector {
	variables: Mutex<Variables>,
}

impl PageVariablesCollector {
	fn reset(&self) {
		self.variables
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}

	fn snapshot(&self) -> Variables {
		self.variables
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

impl PageMetadataHandler for PageVariablesCollector {
	fn accept_page_metadata(
		&self,
		_cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		let value: Value = serde_json::from_str(payload).map_err(|error| {
			Md2HtmlError::InvalidJson {
				context: "page metadata".to_string(),
				reason: error.to_string(),
			}
		})?;

		let Value::Object(metadata) = value else {
			return Err(Md2HtmlError::PageMetadata(
				"page variables must be a JSON object".to_string(),
			));
		};

		self.variables
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.extend(metadata);

		Ok(String::new())
	}
}
