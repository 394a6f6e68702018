use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeminiBlockReason {
    BlockReasonUnspecified,
    Safety,
    Other,
    Blocklist,
    ProhibitedContent,
    ImageSafety,
    // Reasons added by the API later, kept verbatim.
    #[serde(untagged)]
    Unknown(String),
}

impl GeminiBlockReason {
    /// The reason as the API spells it, e.g. `SAFETY`.
    pub fn wire_name(&self) -> String {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => name,
            _ => format!("{:?}", self),
        }
    }
}
