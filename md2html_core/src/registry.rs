use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::HandlerDeclaration;
use crate::PageMetadataHandler;
use crate::Plugin;

/// Default ceiling for nested handler re-entries on one page.
pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MarkerKey {
	marker: String,
	only_at_page_start: bool,
}

impl MarkerKey {
	fn new(marker: &str, only_at_page_start: bool) -> Self {
		Self {
			marker: marker.to_uppercase(),
			only_at_page_start,
		}
	}
}

/// Maps markers to the handlers declared for them.
///
/// Built once per run and read-only afterwards, so one registry can serve
/// any number of pages.
pub struct HandlerRegistry {
	handlers: HashMap<MarkerKey, Vec<Arc<dyn PageMetadataHandler>>>,
	all_only_at_page_start: bool,
	max_depth: usize,
}

impl HandlerRegistry {
	/// Build a registry from declarations. Handlers sharing a marker and
	/// scope keep their declaration order.
	pub fn new(declarations: impl IntoIterator<Item = HandlerDeclaration>) -> Self {
		let mut handlers: HashMap<MarkerKey, Vec<Arc<dyn PageMetadataHandler>>> = HashMap::new();
		let mut all_only_at_page_start = true;

		for declaration in declarations {
			if !declaration.only_at_page_start {
				all_only_at_page_start = false;
			}

			handlers
				.entry(MarkerKey::new(
					&declaration.marker,
					declaration.only_at_page_start,
				))
				.or_default()
				.push(declaration.handler);
		}

		Self {
			handlers,
			all_only_at_page_start,
			max_depth: DEFAULT_MAX_EXPANSION_DEPTH,
		}
	}

	/// Build a registry from the declarations of the given plugins, in plugin
	/// order.
	pub fn from_plugins(plugins: &[Box<dyn Plugin>]) -> Self {
		Self::new(plugins.iter().flat_map(|plugin| plugin.declarations()))
	}

	/// Limit how deep handlers may re-enter the engine.
	#[must_use]
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Handlers for `marker`. Page-start handlers are preferred for blocks at
	/// the page start; handlers accepting blocks anywhere are the fallback.
	pub fn lookup(&self, marker: &str, first_non_blank: bool) -> Option<&[Arc<dyn PageMetadataHandler>]> {
		let found = if first_non_blank {
			self.handlers.get(&MarkerKey::new(marker, true))
		} else {
			None
		};

		found
			.or_else(|| self.handlers.get(&MarkerKey::new(marker, false)))
			.map(Vec::as_slice)
	}

	/// True when every declared handler only accepts page-start blocks. The
	/// engine then looks at no more than the first block of a page.
	pub fn all_only_at_page_start(&self) -> bool {
		self.all_only_at_page_start
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut markers: Vec<_> = self
			.handlers
			.iter()
			.map(|(key, handlers)| (key.marker.as_str(), key.only_at_page_start, handlers.len()))
			.collect();
		markers.sort_unstable();

		f.debug_struct("HandlerRegistry")
			.field("markers", &markers)
			.field("all_only_at_page_start", &self.all_only_at_page_start)
			.field("max_depth", &self.max_depth)
			.finish()
	}
}
