use crate::adapter::{DEFAULT_API_KEY_ENV, GenerationOptions};
use crate::llm_client::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    /// Empty means "read `api_key_env`".
    pub api_key: String,
    pub api_key_env: String,
    pub model: String,
    pub system: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// socks and http proxy, example: socks5://192.168.0.2:10080
    pub proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: "gemini-2.0-flash".to_string(),
            system: String::new(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            proxy: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "model: gemini-1.5-pro\nsystem: You are terse.\ntemperature: 0.1\nproxy: socks5://127.0.0.1:1080"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.system, "You are terse.");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(
            config.generation_options(),
            GenerationOptions { max_tokens: 256, temperature: 0.1 }
        );
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file("/nonexistent/gemini-interleaved.yaml").is_err());
    }

    #[test]
    fn test_from_file_rejects_bad_types() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_tokens: lots").unwrap();
        assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
    }
}
