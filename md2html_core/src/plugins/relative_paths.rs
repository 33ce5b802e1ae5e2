use std::collections::BTreeMap;
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
use crate::Variables;
use crate::paths::relativize_path;

pub(super) const NAME: &str = "relative-paths";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelativePathsData {
	WithMarkers {
		markers: Vec<String>,
		paths: BTreeMap<String, String>,
	},
	Paths(BTreeMap<String, String>),
}

/// Directory paths, given relative to the working directory, rewritten to be
/// relative to each generated page.
///
/// Every path is exported as a template variable. When markers are configured
/// `<!--marker name-->` expands to the path named `name` as well.
#[derive(Debug)]
pub struct RelativePathsPlugin {
	markers: Vec<String>,
	resolver: Arc<PathResolver>,
}

impl RelativePathsPlugin {
	pub fn new(markers: Vec<String>, paths: BTreeMap<String, String>) -> Self {
		Self {
			markers,
			resolver: Arc::new(PathResolver { paths }),
		}
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		let plugin = match plugin_data(NAME, data)? {
			RelativePathsData::WithMarkers { markers, paths } => Self::new(markers, paths),
			RelativePathsData::Paths(paths) => Self::new(Vec::new(), paths),
		};

		Ok(plugin)
	}
}

impl Plugin for RelativePathsPlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn is_blank(&self) -> bool {
		self.resolver.paths.is_empty()
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		self.markers
			.iter()
			.map(|marker| {
				HandlerDeclaration::new(
					marker.clone(),
					false,
					Arc::clone(&self.resolver) as Arc<dyn PageMetadataHandler>,
				)
			})
			.collect()
	}

	fn variables(&self, document: &Document) -> Md2HtmlResult<Variables> {
		self.resolver
			.paths
			.iter()
			.map(|(name, path)| {
				let relative = relativize_path(path, &document.output_file)?;
				Ok((name.clone(), Value::String(relative)))
			})
			.collect()
	}
}

#[derive(Debug)]
struct PathResolver {
	paths: BTreeMap<String, String>,
}

impl PageMetadataHandler for PathResolver {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		block: &str,
	) -> Md2HtmlResult<String> {
		match self.paths.get(payload.trim()) {
			Some(path) => relativize_path(path, &cx.document().output_file),
			None => Ok(block.to_string()),
		}
	}
}
