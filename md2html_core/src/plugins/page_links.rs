use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::plugin_data;
use crate::Document;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;
use crate::Plugin;
use crate::paths::relativize_resource;

pub(super) const NAME: &str = "page-links";

/// Marker used when the plugin is configured without any.
pub const DEFAULT_PAGE_LINK_MARKER: &str = "page";

fn default_markers() -> Option<Vec<String>> {
	Some(vec![DEFAULT_PAGE_LINK_MARKER.to_string()])
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageLinksData {
	#[serde(default = "default_markers")]
	markers: Option<Vec<String>>,
}

/// Turns `<!--page about-->` into the relative link to the output of the
/// document whose `code` is `about`.
#[derive(Debug)]
pub struct PageLinksPlugin {
	markers: Vec<String>,
	resolver: Option<Arc<PageLinkResolver>>,
}

impl PageLinksPlugin {
	pub fn new(markers: Vec<String>) -> Self {
		Self {
			markers,
			resolver: None,
		}
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		let data: PageLinksData = if data.is_null() {
			PageLinksData {
				markers: default_markers(),
			}
		} else {
			plugin_data(NAME, data)?
		};

		// `null` switches the plugin off, an empty list means the default.
		let markers = match data.markers {
			None => Vec::new(),
			Some(markers) if markers.is_empty() => vec![DEFAULT_PAGE_LINK_MARKER.to_string()],
			Some(markers) => markers,
		};

		Ok(Self::new(markers))
	}
}

impl Default for PageLinksPlugin {
	fn default() -> Self {
		Self::new(vec![DEFAULT_PAGE_LINK_MARKER.to_string()])
	}
}

impl Plugin for PageLinksPlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn is_blank(&self) -> bool {
		self.resolver.is_none()
	}

	fn accept_document_list(&mut self, documents: &[Document]) -> Md2HtmlResult<()> {
		if self.markers.is_empty() {
			return Ok(());
		}

		let pages: HashMap<String, String> = documents
			.iter()
			.filter_map(|document| {
				let code = document.code.as_deref()?;
				Some((code.to_string(), document.output_file.clone()))
			})
			.collect();

		if !pages.is_empty() {
			self.resolver = Some(Arc::new(PageLinkResolver { pages }));
		}

		Ok(())
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		let Some(resolver) = &self.resolver else {
			return Vec::new();
		};

		self.markers
			.iter()
			.map(|marker| {
				HandlerDeclaration::new(
					marker.clone(),
					false,
					Arc::clone(resolver) as Arc<dyn PageMetadataHandler>,
				)
			})
			.collect()
	}
}

#[derive(Debug)]
struct PageLinkResolver {
	/// Document codes mapped to output files.
	pages: HashMap<String, String>,
}

impl PageMetadataHandler for PageLinkResolver {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		block: &str,
	) -> Md2HtmlResult<String> {
		match self.pages.get(payload.trim()) {
			Some(output_file) => relativize_resource(output_file, &cx.document().output_file),
			None => Ok(block.to_string()),
		}
	}
}
