//! vaultmock - local dev host for the accounts secrets engine
//!
//! Mounts the accounts backend behind HTTP so it can be exercised without a
//! full secrets-management host. There is no authentication: the
//! `X-Vault-Token` header is passed through verbatim as the caller token.

mod config;
mod router;

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultmock_accounts::{Backend, EphemeralStorage, MountState, SqliteStorage, StorageGateway};

use crate::config::{Config, StorageConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    Ephemeral,
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(name = "vaultmock")]
#[command(about = "Local dev host for the accounts secrets engine", long_about = None)]
struct Args {
    /// Configuration file (optional)
    #[arg(short, long, default_value = "vaultmock.toml", env = "VAULTMOCK_CONFIG")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, env = "VAULTMOCK_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "VAULTMOCK_HOST")]
    host: Option<String>,

    /// Mount point of the accounts backend
    #[arg(long, env = "VAULTMOCK_MOUNT")]
    mount: Option<String>,

    /// Storage backend
    #[arg(long, value_enum, env = "VAULTMOCK_STORAGE")]
    storage: Option<StorageKind>,

    /// Data directory for sqlite storage
    #[arg(long, env = "VAULTMOCK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "VAULTMOCK_LOG_LEVEL")]
    log_level: String,
}

impl Args {
    /// Command line flags win over the configuration file
    fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(mount) = &self.mount {
            config.mount.path.clone_from(mount);
        }

        let configured_path = match &config.storage {
            StorageConfig::Sqlite { path } => Some(path.clone()),
            StorageConfig::Ephemeral => None,
        };
        let kind = self.storage.unwrap_or(if configured_path.is_some() {
            StorageKind::Sqlite
        } else {
            StorageKind::Ephemeral
        });

        config.storage = match kind {
            StorageKind::Ephemeral => StorageConfig::Ephemeral,
            StorageKind::Sqlite => StorageConfig::Sqlite {
                path: match &self.data_dir {
                    Some(dir) => dir.join("vaultmock.db"),
                    None => configured_path.unwrap_or_else(crate::config::default_sqlite_path),
                },
            },
        };
    }
}

fn open_storage(config: &StorageConfig) -> anyhow::Result<Arc<dyn StorageGateway>> {
    Ok(match config {
        StorageConfig::Ephemeral => Arc::new(EphemeralStorage::new()),
        StorageConfig::Sqlite { path } => Arc::new(SqliteStorage::open(path)?),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "vaultmock={0},vaultmock_accounts={0},tower_http=debug",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    info!("Starting vaultmock...");
    info!("  Mount: {}", config.mount.path);
    match &config.storage {
        StorageConfig::Ephemeral => info!("  Storage: ephemeral"),
        StorageConfig::Sqlite { path } => info!("  Storage: sqlite ({})", path.display()),
    }

    let storage = open_storage(&config.storage)?;
    let state = Arc::new(MountState::new(Backend::new()?, storage, &config.mount.path));

    let app = router::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
