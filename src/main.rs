use clap::Parser;
use gemini_interleaved::config::Config;
use gemini_interleaved::logging::init_logging;
use gemini_interleaved::{GeminiAdapter, History};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(name = "gemini-interleaved")]
#[command(about = "Send a conversation to Gemini and print the cleaned answer")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// JSON file holding the conversation history
    #[arg(long, conflicts_with = "prompt")]
    history: Option<String>,

    /// Single user message, used instead of --history
    #[arg(short, long)]
    prompt: Option<String>,

    #[arg(short, long)]
    system: Option<String>,

    #[arg(short, long)]
    model: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(long)]
    max_tokens: Option<u32>,

    #[arg(long)]
    temperature: Option<f64>,

    /// trace, debug, info, warn, error; info shows the rendered conversation and token estimate
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,
}

impl Args {
    fn merge_into(self, mut config: Config) -> Config {
        if let Some(system) = self.system {
            config.system = system;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if self.proxy.is_some() {
            config.proxy = self.proxy;
        }
        config
    }
}

fn load_history(args: &Args) -> anyhow::Result<History> {
    if let Some(prompt) = &args.prompt {
        return Ok(History::from(prompt.as_str()));
    }
    match &args.history {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(History::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", args.log_level);
        Level::INFO
    });
    init_logging(log_level, args.log_file.as_deref());

    let config = match &args.config {
        Some(path) => {
            let config = Config::from_file(path)?;
            info!("Configuration loaded successfully from: {}", path);
            config
        }
        None => Config::default(),
    };
    let history = load_history(&args)?;
    let config = args.merge_into(config);

    let client_builder = reqwest::Client::builder();
    let client_builder = match &config.proxy {
        Some(proxy) => client_builder.proxy(reqwest::Proxy::all(proxy)?),
        None => client_builder,
    };
    let http_client = Arc::new(client_builder.build()?);

    let adapter = GeminiAdapter::new(http_client, &config.api_base).with_api_key_env(&config.api_key_env);
    let generation = adapter
        .generate(
            &history,
            &config.system,
            &config.model,
            Some(config.api_key.as_str()),
            config.generation_options(),
        )
        .await?;

    info!("Estimated tokens: {}", generation.token_estimate);
    println!("{}", generation.answer);
    Ok(())
}
