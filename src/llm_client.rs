use crate::error::ProviderError;
use crate::gemini::{GeminiErrorResponse, GeminiRequest, GeminiResponse};
use reqwest::header::HeaderValue;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
pub struct GeminiClient {
    http_client: Arc<reqwest::Client>,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http_client: Arc<reqwest::Client>, api_base: &str, api_key: &str) -> Self {
        Self {
            http_client,
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn build_target_url(&self, model: &str) -> String {
        // Accept both "gemini-x" and the resource form "models/gemini-x".
        let model = model.strip_prefix("models/").unwrap_or(model);
        let path = format!("models/{}:generateContent", model);
        if self.api_base.ends_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    /// Sends one non-streaming `generateContent` call.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, ProviderError> {
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| ProviderError::InvalidApiKey(e.to_string()))?;
        let target_url = self.build_target_url(model);
        let request_id = Uuid::new_v4().to_string();

        let mut target_request = self
            .http_client
            .post(&target_url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key);

        if let Ok(val) = HeaderValue::from_str(&request_id) {
            target_request = target_request.header("x-request-id", val);
        }

        info!("Sending request {} to: {}", request_id, target_url);
        debug!("request body: {}", serde_json::to_string(request)?);

        let response = target_request.json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<GeminiErrorResponse>(&body) {
                Ok(envelope) => ProviderError::Api {
                    code: envelope.error.code,
                    status: envelope.error.status,
                    message: envelope.error.message,
                },
                Err(_) => ProviderError::Http {
                    code: status.as_u16(),
                    body,
                },
            });
        }

        debug!("response body: {}", body);
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiGenerationConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> GeminiRequest {
        GeminiRequest::from_lines(
            &["user: sys".to_string(), "user: hello".to_string()],
            GeminiGenerationConfig { max_output_tokens: Some(256), temperature: Some(0.6) },
        )
    }

    #[test]
    fn test_build_target_url() {
        let http = Arc::new(reqwest::Client::new());
        let with_slash = GeminiClient::new(http.clone(), "http://host/v1beta/", "k");
        let without_slash = GeminiClient::new(http, "http://host/v1beta", "k");

        assert_eq!(
            with_slash.build_target_url("gemini-2.0-flash"),
            "http://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            without_slash.build_target_url("gemini-2.0-flash"),
            "http://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            without_slash.build_target_url("models/gemini-2.0-flash"),
            "http://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "secret")
            .match_header("x-request-id", Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "user: sys"}]},
                    {"role": "user", "parts": [{"text": "user: hello"}]}
                ],
                "generationConfig": {"maxOutputTokens": 256}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]}}]}).to_string())
            .create_async()
            .await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "secret");
        let response = client.generate_content("gemini-test", &request()).await.unwrap();

        m.assert_async().await;
        assert_eq!(response.text().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_generate_content_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(json!({"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}).to_string())
            .create_async()
            .await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "bad");
        let err = client.generate_content("gemini-test", &request()).await.unwrap_err();

        assert_eq!(err.to_string(), "400 INVALID_ARGUMENT. API key not valid.");
    }

    #[tokio::test]
    async fn test_generate_content_plain_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "k");
        let err = client.generate_content("gemini-test", &request()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Http { code: 503, .. }));
        assert_eq!(err.to_string(), "HTTP 503: upstream unavailable");
    }

    #[tokio::test]
    async fn test_generate_content_accepts_resource_model_name() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(200)
            .with_body(json!({"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}).to_string())
            .create_async()
            .await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "k");
        let response = client.generate_content("models/gemini-test", &request()).await.unwrap();

        m.assert_async().await;
        assert_eq!(response.text().as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_generate_content_rejects_unsendable_key() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "key\n");
        let err = client.generate_content("gemini-test", &request()).await.unwrap_err();

        m.assert_async().await;
        assert!(matches!(err, ProviderError::InvalidApiKey(_)));
    }

    #[tokio::test]
    async fn test_generate_content_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()), &server.url(), "k");
        let err = client.generate_content("gemini-test", &request()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
