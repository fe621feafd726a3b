use clap::Parser;
use tracing_subscriber::EnvFilter;

use greenlight_api::config::{AppConfig, Cli};
use greenlight_api::jsonlog::{properties, Logger};
use greenlight_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up PORT, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env().with_cli_overrides(&cli);

    let logger = Logger::new(std::io::stdout(), config.log.min_level);

    // Framework diagnostics (tracing, tower-http) go through the same JSON sink.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(logger.clone())
        .with_ansi(false)
        .without_time()
        .init();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let environment = config.environment.to_string();
    let state = AppState::new(config, logger.clone());

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => logger.print_fatal(&e, Some(&properties([("addr", bind_addr.as_str())]))),
    };

    logger.print_info(
        "starting server",
        Some(&properties([("addr", bind_addr.as_str()), ("env", environment.as_str())])),
    );

    if let Err(e) = axum::serve(listener, app(state)).await {
        logger.print_fatal(&e, None);
    }
}
