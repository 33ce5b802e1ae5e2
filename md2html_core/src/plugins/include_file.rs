use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::check_unique_markers;
use super::plugin_data;
use crate::HandlerContext;
use crate::HandlerDeclaration;
use crate::Md2HtmlError;
use crate::Md2HtmlResult;
use crate::PageMetadataHandler;
use crate::Plugin;
use crate::TextCache;

pub(super) const NAME: &str = "include-file";

/// How included text is trimmed after the delimiters are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrimMode {
	/// Remove surrounding whitespace.
	#[default]
	All,
	/// Remove leading and trailing blank lines only.
	EmptyLines,
	/// Keep the text as is.
	None,
}

impl TrimMode {
	fn apply(self, text: &str) -> String {
		match self {
			Self::All => text.trim().to_string(),
			Self::EmptyLines => strip_empty_lines(text),
			Self::None => text.to_string(),
		}
	}
}

/// One entry of the plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IncludeFileItem {
	pub markers: Vec<String>,
	/// Directory the payload paths are resolved against.
	pub root_dir: PathBuf,
	#[serde(default)]
	pub trim: TrimMode,
	/// Expand metadata blocks in the included text as well.
	#[serde(default)]
	pub recursive: bool,
	pub start_with: Option<String>,
	pub end_with: Option<String>,
	pub start_marker: Option<String>,
	pub end_marker: Option<String>,
}

/// A payload written as a JSON object, overriding the marker settings for
/// one inclusion.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct InclusionRequest {
	file: String,
	trim: Option<TrimMode>,
	recursive: Option<bool>,
	start_with: Option<String>,
	end_with: Option<String>,
	start_marker: Option<String>,
	end_marker: Option<String>,
}

impl InclusionRequest {
	fn parse(payload: &str) -> Md2HtmlResult<Self> {
		let payload = payload.trim();
		if !payload.starts_with('{') {
			return Ok(Self {
				file: payload.to_string(),
				..Self::default()
			});
		}

		serde_json::from_str(payload).map_err(|error| {
			Md2HtmlError::InvalidJson {
				context: "inclusion".to_string(),
				reason: error.to_string(),
			}
		})
	}
}

/// Delimiters that cut a fragment out of the included text.
///
/// `start_with` and `end_with` are kept in the fragment, `start_marker` and
/// `end_marker` are not. Empty strings are unset. When a start delimiter is
/// set but never found the fragment is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delimiters {
	pub start_with: String,
	pub end_with: String,
	pub start_marker: String,
	pub end_marker: String,
}

impl Delimiters {
	fn is_empty(&self) -> bool {
		self.start_with.is_empty()
			&& self.end_with.is_empty()
			&& self.start_marker.is_empty()
			&& self.end_marker.is_empty()
	}

	fn overridden_by(&self, request: &InclusionRequest) -> Self {
		let pick = |value: &Option<String>, inherited: &String| {
			value.clone().unwrap_or_else(|| inherited.clone())
		};

		Self {
			start_with: pick(&request.start_with, &self.start_with),
			end_with: pick(&request.end_with, &self.end_with),
			start_marker: pick(&request.start_marker, &self.start_marker),
			end_marker: pick(&request.end_marker, &self.end_marker),
		}
	}

	/// The delimiter occurring at the start of `rest`, in priority order.
	fn matching(&self, rest: &str) -> Option<&str> {
		[
			&self.start_with,
			&self.end_with,
			&self.start_marker,
			&self.end_marker,
		]
		.into_iter()
		.find(|delimiter| !delimiter.is_empty() && rest.starts_with(delimiter.as_str()))
		.map(String::as_str)
	}

	pub fn cut<'t>(&self, text: &'t str) -> &'t str {
		if self.is_empty() {
			return text;
		}

		let mut start = 0;
		let mut end = text.len();
		let mut start_found = false;
		let mut end_found = false;

		let mut position = 0;
		while position < text.len() {
			let Some(found) = self.matching(&text[position..]) else {
				position += text[position..].chars().next().map_or(1, char::len_utf8);
				continue;
			};
			let found_end = position + found.len();

			if found == self.start_with && !start_found {
				start_found = true;
				start = position;
			} else if found == self.end_with && !end_found {
				end_found = true;
				end = found_end;
			} else if found == self.start_marker && !start_found {
				start_found = true;
				start = found_end;
			} else if found == self.end_marker && !end_found {
				end_found = true;
				end = position;
			}

			position = found_end;
		}

		let start_required = !self.start_with.is_empty() || !self.start_marker.is_empty();
		if (start_required && !start_found) || start > end {
			return "";
		}

		&text[start..end]
	}
}

#[derive(Debug, Clone)]
struct IncludeSettings {
	root_dir: PathBuf,
	trim: TrimMode,
	recursive: bool,
	delimiters: Delimiters,
}

/// Replaces `<!--marker path/to/file.md-->` with the content of that file.
#[derive(Debug)]
pub struct IncludeFilePlugin {
	markers: Vec<String>,
	handler: Arc<FileIncluder>,
}

impl IncludeFilePlugin {
	pub fn new(items: Vec<IncludeFileItem>) -> Md2HtmlResult<Self> {
		check_unique_markers(NAME, items.iter().flat_map(|item| &item.markers))?;

		let mut markers = Vec::new();
		let mut settings = HashMap::new();

		for item in items {
			let entry = Arc::new(IncludeSettings {
				root_dir: item.root_dir,
				trim: item.trim,
				recursive: item.recursive,
				delimiters: Delimiters {
					start_with: item.start_with.unwrap_or_default(),
					end_with: item.end_with.unwrap_or_default(),
					start_marker: item.start_marker.unwrap_or_default(),
					end_marker: item.end_marker.unwrap_or_default(),
				},
			});

			for marker in item.markers {
				settings.insert(marker.to_uppercase(), Arc::clone(&entry));
				markers.push(marker);
			}
		}

		Ok(Self {
			markers,
			handler: Arc::new(FileIncluder {
				settings,
				cache: TextCache::new(),
			}),
		})
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		Self::new(plugin_data(NAME, data)?)
	}
}

impl Plugin for IncludeFilePlugin {
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
struct FileIncluder {
	/// Uppercased markers mapped to their settings.
	settings: HashMap<String, Arc<IncludeSettings>>,
	cache: TextCache,
}

impl PageMetadataHandler for FileIncluder {
	fn accept_page_metadata(
		&self,
		cx: &mut HandlerContext<'_>,
		marker: &str,
		payload: &str,
		_block: &str,
	) -> Md2HtmlResult<String> {
		let marker = marker.to_uppercase();
		let settings = self.settings.get(&marker).ok_or_else(|| {
			Md2HtmlError::PageMetadata(format!("no inclusion configured for `{marker}`"))
		})?;

		let request = InclusionRequest::parse(payload)?;
		let path = settings.root_dir.join(request.file.trim());
		let content = self.cache.read(&path)?;

		let delimiters = settings.delimiters.overridden_by(&request);
		let trim = request.trim.unwrap_or(settings.trim);
		let included = trim.apply(delimiters.cut(&content));

		tracing::debug!(file = %path.display(), bytes = included.len(), "including file");

		if request.recursive.unwrap_or(settings.recursive) {
			cx.expand(&included)
		} else {
			Ok(included)
		}
	}
}

fn strip_empty_lines(text: &str) -> String {
	let lines: Vec<&str> = text.lines().collect();
	let first = lines.iter().position(|line| !line.trim().is_empty());
	let last = lines.iter().rposition(|line| !line.trim().is_empty());

	match (first, last) {
		(Some(first), Some(last)) => lines[first..=last].join("\n"),
		_ => String::new(),
	}
}
