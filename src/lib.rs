//! # Bitcoin transaction API
//!
//! Paginated read API over a TimescaleDB table of Bitcoin transactions.
//!
//! ## Architecture
//!
//! - **domain**: transaction entities, bucket intervals, repository trait
//! - **application**: query service (validation of ranges, concurrent
//!   rows + count)
//! - **infrastructure**: SeaORM/PostgreSQL repository, migrations,
//!   in-memory repository
//! - **interfaces**: axum REST API with Swagger documentation
//! - **shared**: pagination, query validators, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use application::TransactionQueryService;
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryTransactionRepository, SeaOrmTransactionRepository,
};

pub use interfaces::create_api_router;
