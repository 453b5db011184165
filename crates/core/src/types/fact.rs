use serde::{Deserialize, Serialize};

/// A retrieved fact or insight used as planning context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub text: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_category() -> String {
    "general_knowledge".to_string()
}

fn default_source() -> String {
    "unknown".to_string()
}

impl Fact {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            source: source.into(),
        }
    }

    /// Render as a single prompt line.
    pub fn render(&self) -> String {
        format!(
            "- {} (Category: {}, Source: {})",
            self.text, self.category, self.source
        )
    }
}
