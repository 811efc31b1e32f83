use brain_core::agent::{Agent, AgentOptions};
use brain_core::metrics::Metrics;
use brain_core::model::ProviderFactory;
use brain_core::tooling::{RegistryOptions, ServerEndpoint, ToolRegistry, ToolServerInterface};
use brain_server::config::{AppConfig, HistoryBackend};
use brain_server::history::{HistoryStore, MemoryHistoryStore, RedisHistoryStore};
use brain_server::logging::init_tracing;
use brain_server::server::{self, ServerState};
use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "brain", version, about = "Message-routing brain service")]
struct Cli {
    /// Configuration file path (defaults to config/brain.toml)
    #[arg(short, long, env = "BRAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides BRAIN_HOST/BRAIN_PORT
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env(cli.config.as_deref())?;
    init_tracing(&config.logging);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %chrono::Utc::now().to_rfc3339(),
        "Starting brain service"
    );
    debug!(
        provider = config.llm.provider.as_str(),
        model = config.llm.active_model(),
        "Configuration loaded"
    );

    let metrics = Arc::new(Metrics::new());

    let endpoints = config
        .tool_servers()
        .into_iter()
        .map(|server| ServerEndpoint::new(server.name, &server.url))
        .collect::<Result<Vec<_>, _>>()?;
    let registry = Arc::new(ToolRegistry::with_options(
        endpoints,
        RegistryOptions {
            timeout: Duration::from_secs(config.tools.timeout_secs),
            ..RegistryOptions::default()
        },
        Arc::clone(&metrics),
    )?);

    let provider = ProviderFactory::create(&config.llm.provider_settings())?;
    let tools: Arc<dyn ToolServerInterface> = registry.clone();
    let agent = Agent::new(
        provider,
        tools,
        Arc::clone(&metrics),
        AgentOptions {
            model: config.llm.active_model().to_string(),
            max_iterations: config.agent.max_iterations,
            ..AgentOptions::default()
        },
    );

    let history: Arc<dyn HistoryStore> = match config.history.backend {
        HistoryBackend::Redis => Arc::new(RedisHistoryStore::new(
            config.history.redis_url(),
            config.history.max_messages,
            Arc::clone(&metrics),
        )?),
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new(config.history.max_messages)),
    };

    registry.connect_all().await;

    let addr = match cli.addr {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };
    let state = Arc::new(ServerState::new(
        Arc::new(agent),
        registry,
        history,
        metrics,
    ));
    server::serve(state, addr, shutdown_signal()).await?;

    info!("Brain service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
