use serde::{Deserialize, Serialize};

use crate::gemini::{GeminiCandidate, GeminiPromptFeedback, GeminiUsage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(rename = "promptFeedback")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(rename = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GeminiResponse {
    /// Concatenated answer text of the first candidate, without thought parts.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut pieces = content.parts.iter().filter_map(|p| p.answer_text()).peekable();
        pieces.peek()?;
        Some(pieces.collect())
    }

    pub fn block_reason(&self) -> Option<String> {
        let feedback = self.prompt_feedback.as_ref()?;
        match (&feedback.block_reason, &feedback.block_reason_message) {
            (_, Some(message)) => Some(message.clone()),
            (Some(reason), None) => Some(reason.wire_name()),
            (None, None) => None,
        }
    }
}
