use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::check_unique_markers;
use super::list_from_string_or_array;
use super::plugin_data;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;
use crate::Plugin;
use crate::VariableReplacer;

pub(super) const NAME: &str = "replace";

/// One entry of the plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReplaceItem {
	pub markers: Vec<String>,
	/// Template with `${n}` placeholders.
	pub replace_with: String,
	/// Expand metadata blocks in the replacement as well.
	#[serde(default)]
	pub recursive: bool,
}

#[derive(Debug)]
struct Replacement {
	replacer: VariableReplacer,
	recursive: bool,
}

/// Replaces `<!--marker value-->` or `<!--marker ["a", "b"]-->` with a
/// template filled from the payload values.
#[derive(Debug)]
pub struct ReplacePlugin {
	markers: Vec<String>,
	handler: Arc<Replacer>,
}

impl ReplacePlugin {
	pub fn new(items: Vec<ReplaceItem>) -> Md2HtmlResult<Self> {
		check_unique_markers(NAME, items.iter().flat_map(|item| &item.markers))?;

		let mut markers = Vec::new();
		let mut replacements = HashMap::new();

		for item in items {
			let replacer = VariableReplacer::new(&item.replace_with)?;
			let replacement = Arc::new(Replacement {
				replacer,
				recursive: item.recursive,
			});

			for marker in item.markers {
				replacements.insert(marker.to_uppercase(), Arc::clone(&replacement));
				markers.push(marker);
			}
		}

		Ok(Self {
			markers,
			handler: Arc::new(Replacer { replacements }),
		})
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		Self::new(plugin_data(NAME, data)?)
	}
}

impl Plugin for ReplacePlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn is_blank(&self) -> bool {
		self.markers.is_empty()
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		self.markers
			.iter()
			.map(|marker| {
				HandlerDeclaration::new(
					marker.clone(),
					false,
					Arc::clone(&self.handler) as Arc<dyn PageMetadataHandler>,
				)
			})
			.collect()
	}
}

#[derive(Debug)]
struct Replacer {
	/// Uppercased markers mapped to their templates.
	replacements: HashMap<String, Arc<Replacement>>,
}

impl PageMetadataHandler for Replacer {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		let marker = marker.to_uppercase();
		let replacement = self.replacements.get(&marker).ok_or_else(|| {
			Md2HtmlError::PageMetadata(format!("no replacement configured for `{marker}`"))
		})?;

		let values = list_from_string_or_array(payload.trim_start())?;
		let result = replacement.replacer.replace(&values);

		if replacement.recursive {
			cx.expand(&result)
		} else {
			Ok(result)
		}
	}
}
