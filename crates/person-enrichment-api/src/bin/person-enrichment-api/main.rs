use clap::Parser;
use person_enrichment::config::load_dotenv;
use person_enrichment::{
    EnrichmentService, InMemoryPersonRepository, LookupClient, PersonRepository,
    PostgresPersonRepository, db,
};
use person_enrichment_api::{ApiConfig, AppState, build_app};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Person Enrichment API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8081)]
    port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Disable Swagger UI
    #[arg(long, env = "DISABLE_SWAGGER", default_value_t = false)]
    disable_swagger: bool,

    /// Keep persons in process memory instead of PostgreSQL
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Full PostgreSQL URL, overrides the individual DB_* settings
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    db_port: Option<u16>,

    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    /// disable, allow, prefer, require, verify-ca or verify-full
    #[arg(long, env = "DB_SSL_MODE")]
    db_ssl_mode: Option<String>,

    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    db_max_connections: Option<u32>,

    /// Age prediction provider
    #[arg(long, env = "AGIFY_URL")]
    agify_url: Option<String>,

    /// Gender prediction provider
    #[arg(long, env = "GENDERIZE_URL")]
    genderize_url: Option<String>,

    /// Nationality prediction provider
    #[arg(long, env = "NATIONALIZE_URL")]
    nationalize_url: Option<String>,
}

impl Cli {
    /// CLI and environment values win over the config file
    fn apply_to(self, config: &mut ApiConfig) {
        config.host = self.host;
        config.port = self.port;
        config.log_level = self.log_level;
        config.enable_swagger = !self.disable_swagger;
        config.in_memory = config.in_memory || self.in_memory;

        let database = &mut config.service.database;
        if self.database_url.is_some() {
            database.url = self.database_url;
        }
        if let Some(host) = self.db_host {
            database.host = host;
        }
        if let Some(port) = self.db_port {
            database.port = port;
        }
        if let Some(name) = self.db_name {
            database.name = name;
        }
        if let Some(user) = self.db_user {
            database.user = user;
        }
        if let Some(password) = self.db_password {
            database.password = password;
        }
        if let Some(ssl_mode) = self.db_ssl_mode {
            database.ssl_mode = ssl_mode;
        }
        if let Some(max_connections) = self.db_max_connections {
            database.max_connections = max_connections;
        }

        let lookup = &mut config.service.lookup;
        if let Some(url) = self.agify_url {
            lookup.agify_url = url;
        }
        if let Some(url) = self.genderize_url {
            lookup.genderize_url = url;
        }
        if let Some(url) = self.nationalize_url {
            lookup.nationalize_url = url;
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = load_dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let filter = format!(
        "person_enrichment={lvl},person_enrichment_api={lvl},tower_http=debug",
        lvl = cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = dotenv_path {
        info!("Environment loaded from: {}", path.display());
    }

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config_file {
        match ApiConfig::load_from_file(config_path) {
            Ok(cfg) => {
                info!("Configuration loaded from: {}", config_path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config file: {}. Using default configuration.",
                    e
                );
                ApiConfig::default()
            }
        }
    } else {
        ApiConfig::default()
    };

    // Override with CLI options
    cli.apply_to(&mut config);

    let addr = config.socket_addr()?;

    // Initialize repository and application state
    let repository: Arc<dyn PersonRepository> = if config.in_memory {
        warn!("Using in-memory person store; records are lost on exit");
        Arc::new(InMemoryPersonRepository::new())
    } else {
        let pool = db::connect(&config.service.database).await?;
        Arc::new(PostgresPersonRepository::new(pool))
    };

    let lookup_client = LookupClient::new(config.service.lookup.clone())?;
    let enricher = Arc::new(EnrichmentService::new(lookup_client));
    let state = AppState::new(repository, enricher);

    // Build application
    let app = build_app(state, &config);

    // Start server
    info!("Starting server on: {}", addr);
    if config.enable_swagger {
        info!("Swagger UI: http://{}/swagger-ui", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
