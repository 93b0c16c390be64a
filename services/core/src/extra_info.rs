use serde::{Deserialize, Serialize};
use tracing::debug;

/// Free-form market metadata stored on-chain as a JSON string.
///
/// A `null` optional field reads the same as an absent one, and `None` is
/// written by leaving the key out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraInfo {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ExtraInfo {
    /// Builds the blob from form input; `categories` and `tags` are
    /// comma-separated lists.
    pub fn from_form(description: &str, long_description: &str, categories: &str, tags: &str) -> Self {
        Self {
            description: description.to_string(),
            long_description: Some(long_description.to_string()),
            categories: Some(split_list(categories)),
            tags: Some(split_list(tags)),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn categories_joined(&self) -> String {
        self.categories.as_deref().unwrap_or_default().join(", ")
    }

    pub fn tags_joined(&self) -> String {
        self.tags.as_deref().unwrap_or_default().join(", ")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// `None` when the market's extra info is not a valid ExtraInfo document.
pub fn parse_extra_info(raw: &str) -> Option<ExtraInfo> {
    match serde_json::from_str(raw) {
        Ok(info) => Some(info),
        Err(err) => {
            debug!(error = %err, "unparseable extra info");
            None
        }
    }
}
