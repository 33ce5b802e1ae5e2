use serde_json::Value;

use super::plugin_data;
use crate::Document;
use crate::Md2HtmlResult;
use crate::Plugin;
use crate::Variables;

pub(super) const NAME: &str = "variables";

/// Exports the configured variables unchanged to every page template.
#[derive(Debug, Clone, Default)]
pub struct VariablesPlugin {
	variables: Variables,
}

impl VariablesPlugin {
	pub fn new(variables: Variables) -> Self {
		Self { variables }
	}

	pub fn from_data(data: &Value) -> Md2HtmlResult<Self> {
		Ok(Self::new(plugin_data(NAME, data)?))
	}
}

impl Plugin for VariablesPlugin {
	fn name(&self) -> &'static str {
		NAME
	}

	fn is_blank(&self) -> bool {
		self.variables.is_empty()
	}

	fn variables(&self, _document: &Document) -> Md2HtmlResult<Variables> {
		Ok(self.variables.clone())
	}
}
