pub mod adapter;
pub mod config;
pub mod error;
pub mod gemini;
pub mod history;
pub mod llm_client;
pub mod logging;
pub mod normalize;

pub use adapter::{GeminiAdapter, Generation, GenerationOptions, run_gemini_interleaved};
pub use error::{ConfigurationError, ProviderError};
pub use history::{ContentPart, History, Message};
