use serde::{Deserialize, Serialize};

use crate::gemini::{GeminiContent, GeminiGenerationConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    /// One `user` content per rendered line, in order. The conversation roles
    /// live inside the line text, not in the content role.
    pub fn from_lines(lines: &[String], generation_config: GeminiGenerationConfig) -> Self {
        GeminiRequest {
            contents: lines.iter().map(|line| GeminiContent::user_text(line.as_str())).collect(),
            generation_config: Some(generation_config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_request_from_lines() {
        let lines = vec!["user: sys".to_string(), "model: ok".to_string()];
        let request = GeminiRequest::from_lines(
            &lines,
            GeminiGenerationConfig { max_output_tokens: Some(256), temperature: Some(0.6) },
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"].as_array().unwrap().len(), 2);
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "user: sys");
        assert_eq!(value["contents"][1]["role"], "user");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "model: ok");
        assert!(value["contents"][1]["parts"][0].get("thought").is_none());
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(value["generationConfig"]["temperature"], 0.6);
    }
}
