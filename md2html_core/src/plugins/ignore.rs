use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::plugin_data;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;
use crate::Plugin;
use crate::lexer::BLOCK_CLOSE;
use crate::lexer::BLOCK_OPEN;

pub(super) const NAME: &str = "ignore";

/// Marker used when the plugin is configured without any.
pub const DEFAULT_IGNORE_MARKER: &str = "ignore";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IgnoreData {
	#[serde(default)]
	markers: Vec<String>,
}

/// Lets a page keep a literal HTML comment: `<!--ignore text-->` becomes
/// `<!--text-->`.
#[derive(Debug, Clone)]
pub struct IgnorePlugin {
	markers: Vec<String>,
}

impl IgnorePlugin {
	pub fn new(markers: Vec<String>) -> Self {
		if markers.is_empty() {
			return Self::default();
		}

		Self { markers }
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		let data: IgnoreData = if data.is_null() {
			IgnoreData::default()
		} else {
			plugin_data(NAME, data)?
		};

		Ok(Self::new(data.markers))
	}
}

impl Default for IgnorePlugin {
	fn default() -> Self {
		Self {
			markers: vec![DEFAULT_IGNORE_MARKER.to_string()],
		}
	}
}

impl Plugin for IgnorePlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		let handler: Arc<dyn PageMetadataHandler> = Arc::new(CommentKeeper);

		self.markers
			.iter()
			.map(|marker| HandlerDeclaration::new(marker.clone(), false, Arc::clone(&handler)))
			.collect()
	}
}

#[derive(Debug)]
struct CommentKeeper;

impl PageMetadataHandler for CommentKeeper {
	fn accept_page_metadata(
		&self,
		_cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		Ok(format!("{BLOCK_OPEN}{}{BLOCK_CLOSE}", payload.trim_start()))
	}
}
