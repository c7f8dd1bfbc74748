//! Create the transactions table and, when available, its TimescaleDB hypertable

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;
use tracing::{info, warn};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Hash).string().not_null())
                    .col(ColumnDef::new(Transactions::BlockId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::OutputTotal).decimal().not_null())
                    .col(
                        ColumnDef::new(Transactions::OutputTotalUsd)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Fee).decimal().not_null())
                    .col(ColumnDef::new(Transactions::Size).integer().not_null())
                    // A hypertable needs its partition column in every unique index
                    .primary_key(
                        Index::create()
                            .name("pk_transactions")
                            .col(Transactions::Hash)
                            .col(Transactions::Time),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_time")
                    .table(Transactions::Table)
                    .col((Transactions::Time, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_hash")
                    .table(Transactions::Table)
                    .col(Transactions::Hash)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        let timescale_available = db
            .query_one(Statement::from_string(
                manager.get_database_backend(),
                "SELECT 1 FROM pg_available_extensions WHERE name = 'timescaledb'",
            ))
            .await?
            .is_some();

        if timescale_available {
            db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS timescaledb")
                .await?;
            db.execute_unprepared(
                "SELECT create_hypertable('transactions', 'time', \
                 if_not_exists => TRUE, migrate_data => TRUE)",
            )
            .await?;
            info!("transactions is a TimescaleDB hypertable");
        } else {
            warn!("TimescaleDB extension not available; by-time queries will fail");
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Transactions {
    Table,
    Hash,
    BlockId,
    Time,
    OutputTotal,
    OutputTotalUsd,
    Fee,
    Size,
}
