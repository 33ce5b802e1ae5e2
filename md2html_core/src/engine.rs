use std::borrow::Cow;

use derive_more::Deref;

use crate::Document;
use crate::HandlerRegistry;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::lexer::find_metadata;

/// Markers currently being expanded, outermost first.
///
/// One set lives for a top-level [`HandlerRegistry::apply`] call and is
/// threaded through every re-entry a handler triggers. A marker is never
/// present twice: trying to enter an active marker is a cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref)]
pub struct VisitedMarkers(Vec<String>);

impl VisitedMarkers {
	pub fn new() -> Self {
		Self::default()
	}

	/// The active markers joined with `,`, e.g. `M1,M2,M3`.
	pub fn chain(&self) -> String {
		self.0.join(",")
	}

	/// Mark `marker` (already uppercased) as active until the returned guard
	/// is dropped.
	fn enter(&mut self, marker: &str, max_depth: usize) -> Md2HtmlResult<ActiveMarker<'_>> {
		if self.0.iter().any(|active| active == marker) {
			return Err(Md2HtmlError::CycleDetected {
				marker: marker.to_string(),
				chain: self.chain(),
			});
		}

		if self.0.len() >= max_depth {
			return Err(Md2HtmlError::RecursionLimit {
				marker: marker.to_string(),
				limit: max_depth,
			});
		}

		self.0.push(marker.to_string());

		Ok(ActiveMarker { visited: self })
	}
}

/// Keeps a marker on the visited stack for as long as it lives.
struct ActiveMarker<'v> {
	visited: &'v mut VisitedMarkers,
}

impl std::ops::Deref for ActiveMarker<'_> {
	type Target = VisitedMarkers;

	fn deref(&self) -> &Self::Target {
		self.visited
	}
}

impl std::ops::DerefMut for ActiveMarker<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.visited
	}
}

impl Drop for ActiveMarker<'_> {
	fn drop(&mut self) {
		self.visited.0.pop();
	}
}

/// What a handler sees besides the block itself.
pub struct HandlerContext<'a> {
	registry: &'a HandlerRegistry,
	document: &'a Document,
	visited: &'a mut VisitedMarkers,
}

impl<'a> HandlerContext<'a> {
	/// The page being processed.
	pub fn document(&self) -> &'a Document {
		self.document
	}

	/// Markers active on the expansion stack, including the one being handled.
	pub fn visited(&self) -> &VisitedMarkers {
		self.visited
	}

	/// Expand metadata blocks in `text` with the same registry and visited
	/// set, so a block that re-enters an active marker fails as a cycle.
	pub fn expand(&mut self, text: &str) -> Md2HtmlResult<String> {
		self.registry
			.apply_with_visited(text, self.document, self.visited)
			.map(Cow::into_owned)
	}
}

impl HandlerRegistry {
	/// Replace every handled metadata block in `text`.
	///
	/// Returns the input unchanged (borrowed) when no block was handled.
	pub fn apply<'t>(&self, text: &'t str, document: &Document) -> Md2HtmlResult<Cow<'t, str>> {
		let mut visited = VisitedMarkers::new();
		self.apply_with_visited(text, document, &mut visited)
	}

	/// Like [`HandlerRegistry::apply`] but continues an expansion already in
	/// progress, sharing its visited markers.
	pub fn apply_with_visited<'t>(
		&self,
		text: &'t str,
		document: &Document,
		visited: &mut VisitedMarkers,
	) -> Md2HtmlResult<Cow<'t, str>> {
		let mut output = String::with_capacity(text.len());
		let mut last_position = 0;
		let mut replaced = false;

		for found in find_metadata(text) {
			let marker = found.marker.to_uppercase();
			last_position = found.end;
			output.push_str(found.before);

			match self.lookup(&marker, found.is_first_non_blank()) {
				Some(handlers) => {
					let mut replacement = String::new();

					for handler in handlers {
						let mut active = visited.enter(&marker, self.max_depth())?;
						let mut cx = HandlerContext {
							registry: self,
							document,
							visited: &mut *active,
						};

						tracing::debug!(
							marker = %marker,
							depth = cx.visited.len(),
							page = %document.input_file.display(),
							"handling metadata block"
						);

						replacement = handler
							.accept_page_metadata(&mut cx, found.marker, found.payload, found.block)
							.map_err(|error| error.in_handler(&marker, &document.name()))?;
					}

					output.push_str(&replacement);
					replaced = true;
				}
				None => output.push_str(found.block),
			}

			if self.all_only_at_page_start() {
				break;
			}
		}

		if !replaced {
			return Ok(Cow::Borrowed(text));
		}

		output.push_str(&text[last_position..]);

		Ok(Cow::Owned(output))
	}
}
