use anyhow::{Context, Result};
use llmgate::completion::OpenAIClient;
use llmgate::gateway::{Gateway, HttpGateway};
use llmgate::Config;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Config first so its log_level can act as the fallback filter
    let config = Config::load().context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.gateway.log_level.as_str()),
    )
    .init();

    log::info!("Starting llmgate v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Completion endpoint: {}", config.completion.base_url);
    log::info!("Model: {}", config.completion.model);
    if config.api_key.is_none() {
        log::warn!(
            "{} is not set; complete requests will fail until it is provided",
            config.completion.api_key_env
        );
    }

    let backend = OpenAIClient::new(&config.completion, config.api_key.clone())?;
    let gateway = Gateway::new(Arc::new(backend), &config.completion);

    let http_gateway = HttpGateway::new(gateway, &config);
    http_gateway
        .run(&config.bind_addr())
        .await
        .with_context(|| format!("Failed to serve on {}", config.bind_addr()))?;

    Ok(())
}
