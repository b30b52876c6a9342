use serde::{Deserialize, Serialize};

use crate::opcode::OPCODE_PREFIX;

/// Template engine configuration.
///
/// Deserializes from camelCase JSON, e.g. `{"prefix": "tpl-", "hiddenClass": "is-hidden"}`;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateOptions {
    /// Instruction attribute prefix.
    pub prefix: String,
    /// CSS class toggled by conditional operators.
    pub hidden_class: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            prefix: OPCODE_PREFIX.to_string(),
            hidden_class: "hidden".to_string(),
        }
    }
}

impl TemplateOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
