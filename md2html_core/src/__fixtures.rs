use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use crate::Document;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::HandlerRegistry;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;

/// Returns the same text for every block.
pub struct StaticHandler(pub &'static str);

impl PageMetadataHandler for StaticHandler {
	fn accept_page_metadata(
		&self,
		_cx: &mut HandlerContext<'_>,
		_marker: &str,
		_payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		Ok(self.0.to_string())
	}
}

/// Returns `[marker:payload]` and remembers every call.
#[derive(Default)]
pub struct RecordingHandler {
	pub name: &'static str,
	pub calls: Mutex<Vec<String>>,
}

impl RecordingHandler {
	pub fn new(name: &'static str) -> Arc<Self> {
		Arc::new(Self {
			name,
			calls: Mutex::new(Vec::new()),
		})
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
	}
}

impl PageMetadataHandler for RecordingHandler {
	fn accept_page_metadata(
		&self,
		_cx: &mut HandlerContext<'_>,
		marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		if let Ok(mut calls) = self.calls.lock() {
			calls.push(format!("{marker}:{payload}"));
		}

		Ok(format!("[{}:{}]", self.name, payload.trim()))
	}
}

/// Fills `{}` in the template with the trimmed payload and expands the
/// result again.
pub struct ExpandingHandler(pub &'static str);

impl PageMetadataHandler for ExpandingHandler {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		cx.expand(&self.0.replace("{}", payload.trim()))
	}
}

/// Returns the chain of active markers.
pub struct VisitedProbe;

impl PageMetadataHandler for VisitedProbe {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		_marker: &str,
		_payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		Ok(cx.visited().chain())
	}
}

/// Always fails with a page metadata error.
pub struct FailingHandler;

impl PageMetadataHandler for FailingHandler {
	fn accept_page_metadata(
		&self,
		_cx: &mut HandlerContext<'_>,
		_marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		Err(Md2HtmlError::PageMetadata(format!(
			"cannot handle `{}`",
			payload.trim()
		)))
	}
}

pub fn declare(
	marker: &str,
	only_at_page_start: bool,
	handler: impl PageMetadataHandler + 'static,
) -> HandlerDeclaration {
	HandlerDeclaration::new(marker, only_at_page_start, Arc::new(handler))
}

pub fn registry(declarations: Vec<HandlerDeclaration>) -> HandlerRegistry {
	HandlerRegistry::new(declarations)
}

pub fn page() -> Document {
	Document::new("page.md")
}

pub fn page_at(output_file: &str) -> Document {
	Document::new("page.md").with_output(output_file)
}

pub fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap();
	}
	std::fs::write(path, content).unwrap();
}
