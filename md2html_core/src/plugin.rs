use std::fmt;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;

use crate::Document;
use crate::HandlerContext;
use crate::Md2HtmlResult;

/// Variables a plugin exports to the page template.
pub type Variables = Map<String, Value>;

/// Receives the metadata blocks a plugin registered interest in.
///
/// Implementations hold any per-page or per-run state behind their own
/// synchronization: the registry shares handlers between pages.
pub trait PageMetadataHandler: Send + Sync {
	/// Handle one block and return the text that replaces it on the page.
	///
	/// `marker` is the marker as written on the page, `payload` the text
	/// following it and `block` the whole block including delimiters. A
	/// handler that wants the returned text expanded as well calls
	/// [`HandlerContext::expand`], which keeps cycle detection intact.
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		marker: &str,
		payload: &str,
		block: &str,
	) -> Md2HtmlResult<String>;
}

/// One marker a plugin wants to handle.
#[derive(Clone)]
pub struct HandlerDeclaration {
	/// Marker name, matched case-insensitively.
	pub marker: String,
	/// Accept only blocks preceded by nothing but whitespace.
	pub only_at_page_start: bool,
	pub handler: Arc<dyn PageMetadataHandler>,
}

impl HandlerDeclaration {
	pub fn new(
		marker: impl Into<String>,
		only_at_page_start: bool,
		handler: Arc<dyn PageMetadataHandler>,
	) -> Self {
		Self {
			marker: marker.into(),
			only_at_page_start,
			handler,
		}
	}
}

impl fmt::Debug for HandlerDeclaration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerDeclaration")
			.field("marker", &self.marker)
			.field("only_at_page_start", &self.only_at_page_start)
			.finish_non_exhaustive()
	}
}

/// An activated plugin. Every capability is optional.
///
/// The driver calls [`Plugin::accept_document_list`] once after all
/// documents are known, reads [`Plugin::declarations`] once to build the
/// handler registry, then for every page calls [`Plugin::new_page`] before the
/// metadata pass and [`Plugin::variables`] after it.
pub trait Plugin: Send + Sync {
	/// The name the plugin is configured under in the argument file.
	fn name(&self) -> &'static str;

	/// A blank plugin has nothing to do and is dropped from the run.
	fn is_blank(&self) -> bool {
		false
	}

	fn accept_document_list(&mut self, _documents: &[Document]) -> Md2HtmlResult<()> {
		Ok(())
	}

	fn declarations(&self) -> Vec<HandlerDeclaration> {
		Vec::new()
	}

	/// Reset per-page state.
	fn new_page(&self, _document: &Document) {}

	fn variables(&self, _document: &Document) -> Md2HtmlResult<Variables> {
		Ok(Variables::new())
	}
}
