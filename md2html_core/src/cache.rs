use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Md2HtmlError;
use crate::Md2HtmlResult;

/// Text files read at most once per run: templates, included stylesheets and
/// included page fragments.
#[derive(Debug, Default)]
pub struct TextCache {
	files: Mutex<HashMap<PathBuf, Arc<str>>>,
}

impl TextCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn read(&self, path: &Path) -> Md2HtmlResult<Arc<str>> {
		let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(content) = files.get(path) {
			return Ok(Arc::clone(content));
		}

		let content: Arc<str> = read_text(path)?.into();
		files.insert(path.to_path_buf(), Arc::clone(&content));

		Ok(content)
	}
}

/// Read a UTF-8 file, naming the path in the error.
pub fn read_text(path: &Path) -> Md2HtmlResult<String> {
	std::fs::read_to_string(path).map_err(|source| {
		Md2HtmlError::FileRead {
			path: path.display().to_string(),
			source,
		}
	})
}
