use crate::Md2HtmlError;
use crate::Md2HtmlResult;

const TOKEN_MARKER: char = '$';
const TOKEN_START: char = '{';
const TOKEN_END: char = '}';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
	Text(String),
	/// 1-based position of the substituted value.
	Position(usize),
}

enum State {
	Text,
	Marker,
	Position,
}

/// A `replace-with` template such as `[[${1}-${2}]]`.
///
/// `${n}` is replaced by the n-th value, missing values are replaced by
/// nothing and `$$` stands for a literal `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReplacer {
	parts: Vec<Part>,
}

impl VariableReplacer {
	pub fn new(template: &str) -> Md2HtmlResult<Self> {
		let error = |reason: String| {
			Md2HtmlError::ReplacementTemplate {
				template: template.to_string(),
				reason,
			}
		};

		let mut parts = Vec::new();
		let mut token = String::new();
		let mut state = State::Text;

		for ch in template.chars() {
			match state {
				State::Text => {
					if ch == TOKEN_MARKER {
						state = State::Marker;
					} else {
						token.push(ch);
					}
				}
				State::Marker => {
					match ch {
						TOKEN_MARKER => {
							token.push(TOKEN_MARKER);
							state = State::Text;
						}
						TOKEN_START => {
							parts.push(Part::Text(std::mem::take(&mut token)));
							state = State::Position;
						}
						_ => {
							token.push(TOKEN_MARKER);
							token.push(ch);
							state = State::Text;
						}
					}
				}
				State::Position => {
					if ch == TOKEN_END {
						let position = token.trim();
						let index: i64 = position.parse().map_err(|_| {
							error(format!("replacement position is not a number: {position}"))
						})?;
						if index < 1 {
							return Err(error(format!(
								"replacement position is less than 1: {index}"
							)));
						}
						parts.push(Part::Position(index as usize));
						token.clear();
						state = State::Text;
					} else {
						token.push(ch);
					}
				}
			}
		}

		match state {
			State::Position => {
				return Err(error(format!(
					"matching closing brace not found: `{TOKEN_END}`"
				)));
			}
			State::Marker => token.push(TOKEN_MARKER),
			State::Text => {}
		}
		parts.push(Part::Text(token));

		Ok(Self { parts })
	}

	pub fn replace<S: AsRef<str>>(&self, values: &[S]) -> String {
		let mut result = String::new();

		for part in &self.parts {
			match part {
				Part::Text(text) => result.push_str(text),
				Part::Position(position) => {
					if let Some(value) = values.get(position - 1) {
						result.push_str(value.as_ref());
					}
				}
			}
		}

		result
	}
}
