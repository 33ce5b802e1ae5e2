use std::ops::Range;

use logos::Logos;
use logos::SpannedIter;

/// Opening delimiter of a metadata block.
pub const BLOCK_OPEN: &str = "<!--";
/// Closing delimiter of a metadata block.
pub const BLOCK_CLOSE: &str = "-->";

/// Raw tokens produced by logos. Only the delimiters matter, every other run
/// of characters is plain text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("<!--")]
	BlockOpen,
	#[token("-->")]
	BlockClose,
	#[regex(r"[^<\-]+")]
	#[token("<")]
	#[token("-")]
	Text,
}

/// A metadata block found in page text: `<!--MARKER payload-->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataBlock<'a> {
	/// Text between the end of the previous matched block (or the page start)
	/// and the start of this block. Unrecognized comments are part of it.
	pub before: &'a str,
	/// The marker exactly as written on the page.
	pub marker: &'a str,
	/// Everything after the marker up to the closing delimiter.
	pub payload: &'a str,
	/// The whole block including both delimiters.
	pub block: &'a str,
	/// Byte offset just past the closing delimiter.
	pub end: usize,
}

impl MetadataBlock<'_> {
	/// True when nothing but whitespace precedes the block since the last
	/// matched block or the page start.
	pub fn is_first_non_blank(&self) -> bool {
		self.before.trim().is_empty()
	}
}

/// Forward-only scanner yielding [`MetadataBlock`]s in text order.
///
/// Openers are tracked on a stack so that nested comments stay inside the
/// outer block's payload. Closers without an opener and openers that are
/// never closed are treated as plain text.
pub struct MetadataFinder<'a> {
	/// The page text being scanned.
	text: &'a str,
	/// Delimiter tokens with their byte spans.
	tokens: SpannedIter<'a, RawToken>,
	/// Byte offsets of openers still waiting for a closer.
	openers: Vec<usize>,
	/// Byte offset where the `before` text of the next match starts.
	consumed: usize,
}

impl<'a> MetadataFinder<'a> {
	pub fn new(text: &'a str) -> Self {
		Self {
			text,
			tokens: RawToken::lexer(text).spanned(),
			openers: Vec::new(),
			consumed: 0,
		}
	}

	/// Byte offset up to which the text has been claimed by matched blocks.
	pub fn consumed(&self) -> usize {
		self.consumed
	}

}

/// Build a match for the outer block spanning `range`, if its content starts
/// with a marker. Advances `consumed` past the block on success.
fn match_block<'a>(
	text: &'a str,
	consumed: &mut usize,
	range: Range<usize>,
) -> Option<MetadataBlock<'a>> {
	let content = &text[range.start + BLOCK_OPEN.len()..range.end - BLOCK_CLOSE.len()];
	let (marker, payload) = split_marker(content)?;
	let block = MetadataBlock {
		before: &text[*consumed..range.start],
		marker,
		payload,
		block: &text[range.clone()],
		end: range.end,
	};
	*consumed = range.end;

	Some(block)
}

impl<'a> Iterator for MetadataFinder<'a> {
	type Item = MetadataBlock<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		for (token, span) in self.tokens.by_ref() {
			match token {
				Ok(RawToken::BlockOpen) => self.openers.push(span.start),
				Ok(RawToken::BlockClose) => {
					let Some(start) = self.openers.pop() else {
						continue;
					};

					if !self.openers.is_empty() {
						continue;
					}

					let range = start..span.end;
					if let Some(block) = match_block(self.text, &mut self.consumed, range) {
						return Some(block);
					}
				}
				Ok(RawToken::Text) | Err(()) => {}
			}
		}

		if !self.openers.is_empty() {
			tracing::debug!(
				unclosed = self.openers.len(),
				offset = self.openers[0],
				"ignoring unclosed metadata block"
			);
			self.openers.clear();
		}

		None
	}
}

/// Scan `text` for metadata blocks.
pub fn find_metadata(text: &str) -> MetadataFinder<'_> {
	MetadataFinder::new(text)
}

/// Split block content into the leading marker and the payload after it.
/// Returns `None` when the content does not start with a marker character.
pub fn split_marker(content: &str) -> Option<(&str, &str)> {
	let first = content.chars().next()?;
	if !is_marker_char(first) {
		return None;
	}

	let end = content
		.find(|ch: char| !is_marker_char(ch))
		.unwrap_or(content.len());

	Some(content.split_at(end))
}

fn is_marker_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_'
}
