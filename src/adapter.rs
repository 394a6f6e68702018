//! The single generate call: flatten history, ask Gemini once, clean the reply.

use crate::error::{ConfigurationError, ProviderError};
use crate::gemini::{GeminiGenerationConfig, GeminiRequest};
use crate::history::History;
use crate::llm_client::{DEFAULT_API_BASE, GeminiClient};
use crate::normalize::{NormalizedTurn, normalize, render_lines};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const THINK_END: &str = "</think>\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.6,
        }
    }
}

impl From<GenerationOptions> for GeminiGenerationConfig {
    fn from(options: GenerationOptions) -> Self {
        GeminiGenerationConfig {
            max_output_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub answer: String,
    pub token_estimate: usize,
}

/// Explicit key first; `lookup` is consulted only when it is empty or absent.
pub fn resolve_api_key<F>(
    explicit: Option<&str>,
    env_var: &str,
    lookup: F,
) -> Result<String, ConfigurationError>
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    lookup(env_var)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ConfigurationError::MissingCredential(env_var.to_string()))
}

/// Keeps what follows the last `</think>\n` and strips `<output>` markers.
pub fn extract_final_answer(raw: &str) -> String {
    let answer = match raw.rsplit_once(THINK_END) {
        Some((_, tail)) => tail,
        None => raw,
    };
    answer.replace("<output>", "").replace("</output>", "")
}

/// Rough usage figure: a quarter of the characters sent and received.
pub fn estimate_tokens(turns: &[NormalizedTurn], raw_response: &str) -> usize {
    let input_chars: usize = turns.iter().map(|t| t.text.chars().count()).sum();
    (input_chars + raw_response.chars().count()) / 4
}

#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    http_client: Arc<reqwest::Client>,
    api_base: String,
    api_key_env: String,
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new(Arc::new(reqwest::Client::new()), DEFAULT_API_BASE)
    }
}

impl GeminiAdapter {
    pub fn new(http_client: Arc<reqwest::Client>, api_base: &str) -> Self {
        Self {
            http_client,
            api_base: api_base.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }

    pub fn with_api_key_env(mut self, env_var: &str) -> Self {
        self.api_key_env = env_var.to_string();
        self
    }

    /// Like [`generate`](Self::generate), but keeps provider failures apart
    /// from answers.
    pub async fn try_generate(
        &self,
        history: &History,
        system: &str,
        model_name: &str,
        api_key: Option<&str>,
        options: GenerationOptions,
    ) -> Result<Result<Generation, ProviderError>, ConfigurationError> {
        let api_key = resolve_api_key(api_key, &self.api_key_env, |name| std::env::var(name).ok())?;
        let client = GeminiClient::new(self.http_client.clone(), &self.api_base, &api_key);

        let turns = normalize(history, system);
        let lines = render_lines(&turns);
        for line in &lines {
            info!("Gemini message: {}", line);
        }

        let request = GeminiRequest::from_lines(&lines, options.into());
        let result = client
            .generate_content(model_name, &request)
            .await
            .and_then(|response| {
                if let Some(usage) = &response.usage_metadata {
                    debug!("provider usage: {:?}", usage);
                }
                match response.text() {
                    Some(text) => Ok(text),
                    None => Err(match response.block_reason() {
                        Some(reason) => ProviderError::Blocked(reason),
                        None => ProviderError::EmptyResponse,
                    }),
                }
            })
            .map(|raw| Generation {
                answer: extract_final_answer(&raw),
                token_estimate: estimate_tokens(&turns, &raw),
            });

        Ok(result)
    }

    /// Never fails once a credential is found: provider errors come back as
    /// the answer text with a zero token estimate.
    pub async fn generate(
        &self,
        history: &History,
        system: &str,
        model_name: &str,
        api_key: Option<&str>,
        options: GenerationOptions,
    ) -> Result<Generation, ConfigurationError> {
        let result = self
            .try_generate(history, system, model_name, api_key, options)
            .await?;
        Ok(result.unwrap_or_else(|e| {
            error!("Error in Gemini API: {}", e);
            Generation {
                answer: e.to_string(),
                token_estimate: 0,
            }
        }))
    }
}

/// One-shot call against the public Gemini endpoint.
pub async fn run_gemini_interleaved(
    history: &History,
    system: &str,
    model_name: &str,
    api_key: Option<&str>,
    options: GenerationOptions,
) -> Result<Generation, ConfigurationError> {
    GeminiAdapter::default()
        .generate(history, system, model_name, api_key, options)
        .await
}
