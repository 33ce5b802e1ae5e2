//! Relative links between generated pages. All locations are relative to the
//! same base directory and use `/` separators.

use crate::Md2HtmlError;
use crate::Md2HtmlResult;

/// The location that, opened from `page`, leads to the resource `resource`.
///
/// Neither argument may be empty or end with `/`.
pub fn relativize_resource(resource: &str, page: &str) -> Md2HtmlResult<String> {
	let page = page_location(resource, page)?;
	let resource = resource.replace('\\', "/");
	if resource.is_empty() || resource.ends_with('/') {
		return Err(Md2HtmlError::RelativePath {
			path: resource,
			page,
			reason: "not a relatively located resource".to_string(),
		});
	}

	if resource.starts_with('/') {
		return Ok(resource);
	}

	Ok(relative_to_page(&resource, &page))
}

/// The directory path that, applied from `page`, leads to `path`.
///
/// `path` must be empty or end with `/`, and so does the result, which makes
/// it usable as a prefix like `{{ path }}styles.css`.
pub fn relativize_path(path: &str, page: &str) -> Md2HtmlResult<String> {
	let page = page_location(path, page)?;
	let path = path.replace('\\', "/");
	if (!path.is_empty() && !path.ends_with('/')) || path == "/" {
		return Err(Md2HtmlError::RelativePath {
			path,
			page,
			reason: "not a relative resource path".to_string(),
		});
	}

	if path.starts_with('/') {
		return Ok(path);
	}

	let relative = relative_to_page(&path, &page);
	if relative == "." {
		return Ok(String::new());
	}

	Ok(format!("{relative}/"))
}

fn page_location(target: &str, page: &str) -> Md2HtmlResult<String> {
	let page = page.replace('\\', "/");
	if page.is_empty() || page.ends_with('/') {
		return Err(Md2HtmlError::RelativePath {
			path: target.to_string(),
			page,
			reason: "the page is not a relatively located resource".to_string(),
		});
	}

	Ok(page)
}

fn relative_to_page(target: &str, page: &str) -> String {
	let target = normalize(target);
	let mut base = normalize(page);
	base.pop();

	let common = target
		.iter()
		.zip(&base)
		.take_while(|(left, right)| left == right)
		.count();

	let mut parts: Vec<&str> = vec![".."; base.len() - common];
	parts.extend(&target[common..]);

	if parts.is_empty() {
		".".to_string()
	} else {
		parts.join("/")
	}
}

/// Split a location into components, resolving `.` and `..` lexically.
fn normalize(location: &str) -> Vec<&str> {
	let mut components: Vec<&str> = Vec::new();

	for component in location.split('/') {
		match component {
			"" | "." => {}
			".." => {
				if components.last().is_some_and(|last| *last != "..") {
					components.pop();
				} else {
					components.push(component);
				}
			}
			_ => components.push(component),
		}
	}

	components
}
