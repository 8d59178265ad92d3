use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use quickweather::{
    AppState, MemorySessionStore, QuickWeatherConfig, ResponseCache, WeatherService, logging, web,
};

/// City weather lookup service with per-session search history
#[derive(Debug, Parser)]
#[command(name = "quickweather", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QuickWeatherConfig::load_from_path(cli.config.clone())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging)?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let mut weather = WeatherService::new(config.weather.clone())
        .context("Failed to create weather service")?;
    if config.cache.enabled {
        let cache = ResponseCache::open(&config.cache.location)
            .with_context(|| format!("Failed to open cache at {}", config.cache.location))?;
        weather = weather.with_cache(cache, Duration::from_secs(config.cache.ttl_seconds));
        tracing::info!("Response cache enabled at {}", config.cache.location);
    }

    let sessions = Arc::new(MemorySessionStore::with_ttl(Duration::from_secs(
        config.session.ttl_seconds,
    )));
    spawn_session_sweeper(
        Arc::clone(&sessions),
        Duration::from_secs(config.session.purge_interval_seconds),
    );

    let state = AppState::new(weather, sessions);
    web::run(state, &config.server.host, config.server.port).await
}

/// Drop idle sessions every `every`
fn spawn_session_sweeper(sessions: Arc<MemorySessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sessions.purge_expired().await;
        }
    });
}
