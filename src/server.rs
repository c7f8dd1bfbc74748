//! Server lifecycle: connect, migrate, serve, shut down.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::TransactionQueryService;
use crate::config::{AppConfig, ConfigError};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, SeaOrmTransactionRepository};
use crate::interfaces::http::modules::rate_limit::RateLimiter;
use crate::interfaces::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running API server.
///
/// ```rust,no_run
/// use btc_tx::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub config: AppConfig,
    local_addr: SocketAddr,
    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

/// The global recorder can be installed once per process; later starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
                None
            }
        })
        .clone()
}

fn spawn_rate_limit_sweeper(limiter: RateLimiter, shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => limiter.purge_expired(),
                _ = shutdown.wait() => break,
            }
        }
    });
}

impl ServerHandle {
    /// Start the API server.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to PostgreSQL and run migrations (if enabled)
    /// 3. Build repository, query service and router
    /// 4. Bind and serve until shutdown is triggered
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        config.validate()?;

        info!("Starting Bitcoin transaction API...");

        let metrics_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&config.database).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Repository & service ───────────────────────────────
        let repo = Arc::new(SeaOrmTransactionRepository::new(
            SqlxPostgresConnector::from_sqlx_postgres_pool(db.get_postgres_connection_pool().clone()),
        ));
        let service = Arc::new(TransactionQueryService::new(repo));

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);

        let rate_limiter = if config.rate_limit.enabled {
            let limiter = RateLimiter::from_config(&config.rate_limit);
            info!(
                "Rate limit: {} requests per {}s per client",
                config.rate_limit.max_requests, config.rate_limit.window_secs
            );
            spawn_rate_limit_sweeper(limiter.clone(), shutdown.signal());
            Some(limiter)
        } else {
            None
        };

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(service, &config, metrics_handle, rate_limiter);

        let addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGINT/SIGTERM listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait until shutdown is triggered and in-flight requests drain, then
    /// close the pool.
    pub async fn wait(self) {
        let api_task = self.api_task;
        let drained = self
            .shutdown
            .drain(async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned after shutdown timeout");
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Bitcoin transaction API shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config.
///
/// `RUST_LOG` takes precedence over `logging.level`. Call once at startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
