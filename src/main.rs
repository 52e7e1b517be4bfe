//! # Lexical Insight Server Driver
//!
//! ## Purpose
//! Main entry point for the lexical analysis server. Loads configuration,
//! wires up the lookup sources, cache, resolver and word store, and serves
//! the REST API until shutdown.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Open the offline word store and apply its seed file
//! 4. Build the lookup sources and the shared resolver/cache
//! 5. Start the API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use lexical_insight::analysis::{AnalysisDeps, AnalysisRegistry};
use lexical_insight::api::ApiServer;
use lexical_insight::cache::WordCache;
use lexical_insight::config::Config;
use lexical_insight::errors::Result;
use lexical_insight::resolver::WordResolver;
use lexical_insight::session::SessionContext;
use lexical_insight::sources::{
    FrequencyAnalyzer, LookupSource, RestFrequencySource, RestLookupSource,
};
use lexical_insight::text::Tokenizer;
use lexical_insight::word_store::WordStore;
use lexical_insight::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("lexical-insight-server")
        .version("0.1.0")
        .author("Language Learning Platform Team")
        .about("Asynchronous multi-source lexical analysis engine")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Probe the configured sources and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);
    init_logging(&config);

    info!("starting lexical-insight v0.1.0");
    info!("configuration loaded from: {}", config_path);

    let app_state = initialize_components(Arc::clone(&config)).await?;

    if matches.get_flag("check-health") {
        return run_health_checks(&app_state).await;
    }

    let server = ApiServer::new(app_state.clone());
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("server error: {}", e);
        }
    });

    info!(
        "lexical-insight started on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("server stopped unexpectedly");
        }
    }

    shutdown_components(&app_state).await?;
    info!("lexical-insight shut down successfully");

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build every shared component of the engine
async fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("initializing components...");

    let word_store = Arc::new(WordStore::open(&config.word_store).await?);

    let mut sources: Vec<Arc<dyn LookupSource>> = Vec::new();
    for source_config in config.sources.enabled_dictionaries() {
        info!(source = %source_config.name, "registering lookup source");
        sources.push(Arc::new(RestLookupSource::new(source_config)?));
    }

    if !config.sources.frequency.enabled {
        warn!("frequency analysis is disabled in the configuration");
    }
    let frequency: Arc<dyn FrequencyAnalyzer> =
        Arc::new(RestFrequencySource::new(config.sources.frequency.clone())?);

    let session = SessionContext::new(
        config.session.account_id.clone(),
        config.session.access_token.clone(),
    );
    if !session.is_authenticated() {
        warn!("no access token configured; lookups run anonymously");
    }

    let cache = Arc::new(WordCache::new());
    let resolver = Arc::new(WordResolver::new(sources, cache, session.clone()));
    let tokenizer = Arc::new(Tokenizer::new(&config.analysis)?);

    let deps = Arc::new(AnalysisDeps {
        resolver,
        frequency,
        word_store: Arc::clone(&word_store),
        tokenizer,
        session,
        config: config.analysis.clone(),
    });

    info!("all components initialized");
    Ok(AppState {
        config,
        deps,
        registry: Arc::new(AnalysisRegistry::new()),
        word_store,
        started_at: chrono::Utc::now(),
    })
}

/// Probe the word store and every configured source, then exit
async fn run_health_checks(app_state: &AppState) -> Result<()> {
    info!("running health checks...");

    app_state.word_store.health_check().await?;
    info!("word store is healthy ({} entries)", app_state.word_store.len());

    for source in app_state.deps.resolver.sources() {
        let health = source.health_check().await;
        if health.healthy {
            info!(source = %health.source, "source is healthy ({}ms)", health.response_time_ms);
        } else {
            warn!(
                source = %health.source,
                error = health.error.as_deref().unwrap_or("unknown"),
                "source is unhealthy"
            );
        }
    }

    let frequency = app_state.deps.frequency.health_check().await;
    if frequency.healthy {
        info!("frequency service is healthy ({}ms)", frequency.response_time_ms);
    } else {
        warn!(
            error = frequency.error.as_deref().unwrap_or("unknown"),
            "frequency service is unhealthy"
        );
    }

    info!("health checks finished");
    Ok(())
}

/// Flush durable state and log final statistics
async fn shutdown_components(app_state: &AppState) -> Result<()> {
    info!("shutting down components...");

    app_state.word_store.flush().await?;

    let cache_stats = app_state.deps.resolver.cache().stats();
    info!(
        "final cache statistics: {} entries, {} hits, {} misses",
        cache_stats.entries, cache_stats.hits, cache_stats.misses
    );

    Ok(())
}
