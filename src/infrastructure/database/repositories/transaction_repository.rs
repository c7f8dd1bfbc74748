//! SeaORM implementation of TransactionRepository
//!
//! Rows, counts and hash lookups go through the SeaORM query builder; the
//! bucket aggregate is a parameterized raw statement because `time_bucket`
//! is a TimescaleDB function. Every user-supplied value is a bound
//! parameter.

use async_trait::async_trait;
use sea_orm::prelude::{DateTimeUtc, Decimal};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Statement,
};
use tracing::{debug, error};

use crate::domain::{
    BucketInterval, DomainError, DomainResult, PageWindow, TimeBucket, Transaction,
    TransactionFilter, TransactionRepository,
};
use crate::infrastructure::database::entities::transaction;

const TIME_BUCKET_SQL: &str = r#"SELECT time_bucket($1::interval, "time") AS bucket,
       COUNT(*) AS transaction_count,
       SUM("output_total") AS total_volume,
       AVG("fee") AS avg_fee,
       MAX("output_total") AS max_transaction,
       MIN("output_total") AS min_transaction
FROM "transactions"
GROUP BY bucket
ORDER BY bucket DESC
LIMIT $2"#;

/// PostgreSQL binds LIMIT/OFFSET as `bigint`; a larger offset is past any
/// table anyway.
const MAX_SQL_OFFSET: u64 = i64::MAX as u64;

pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Query builders ──────────────────────────────────────────────

/// Base selection for a filter, shared by the rows and count queries.
pub(crate) fn filtered(filter: &TransactionFilter) -> Select<transaction::Entity> {
    let query = transaction::Entity::find();
    match filter {
        TransactionFilter::All => query,
        TransactionFilter::TimeRange { from, to } => {
            query.filter(transaction::Column::Time.between(*from, *to))
        }
        TransactionFilter::HashContains(term) => query.filter(
            Expr::expr(Func::lower(Expr::col((
                transaction::Entity,
                transaction::Column::Hash,
            ))))
            .like(contains_pattern(term)),
        ),
    }
}

/// Rows query: newest first, hash as tie-breaker so pages are stable.
pub(crate) fn rows_query(
    filter: &TransactionFilter,
    window: PageWindow,
) -> Select<transaction::Entity> {
    filtered(filter)
        .order_by_desc(transaction::Column::Time)
        .order_by_asc(transaction::Column::Hash)
        .limit(window.limit)
        .offset(window.offset.min(MAX_SQL_OFFSET))
}

pub(crate) fn time_bucket_statement(interval: BucketInterval, limit: u64) -> Statement {
    Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        TIME_BUCKET_SQL,
        [interval.as_str().into(), (limit as i64).into()],
    )
}

/// `%term%` for a lower-cased `LIKE`, with LIKE metacharacters escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ── Conversion helpers ──────────────────────────────────────────

#[derive(Debug, FromQueryResult)]
struct TimeBucketRow {
    bucket: DateTimeUtc,
    transaction_count: i64,
    total_volume: Option<Decimal>,
    avg_fee: Option<Decimal>,
    max_transaction: Option<Decimal>,
    min_transaction: Option<Decimal>,
}

impl From<TimeBucketRow> for TimeBucket {
    fn from(row: TimeBucketRow) -> Self {
        Self {
            bucket: row.bucket,
            transaction_count: row.transaction_count,
            total_volume: row.total_volume.unwrap_or_default(),
            avg_fee: row.avg_fee.unwrap_or_default(),
            max_transaction: row.max_transaction.unwrap_or_default(),
            min_transaction: row.min_transaction.unwrap_or_default(),
        }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    error!("Transaction query failed: {}", e);
    DomainError::Storage(e.to_string())
}

// ── TransactionRepository impl ──────────────────────────────────

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn find_rows(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> DomainResult<Vec<Transaction>> {
        debug!(?filter, limit = window.limit, offset = window.offset, "Selecting transactions");
        let models = rows_query(filter, window)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Transaction::from).collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> DomainResult<u64> {
        filtered(filter).count(&self.db).await.map_err(db_err)
    }

    async fn find_by_hash(&self, hash: &str) -> DomainResult<Option<Transaction>> {
        let model = transaction::Entity::find()
            .filter(transaction::Column::Hash.eq(hash))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Transaction::from))
    }

    async fn time_buckets(
        &self,
        interval: BucketInterval,
        limit: u64,
    ) -> DomainResult<Vec<TimeBucket>> {
        debug!(interval = %interval, limit, "Selecting time buckets");
        let rows = TimeBucketRow::find_by_statement(time_bucket_statement(interval, limit))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(TimeBucket::from).collect())
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1",
            ))
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};

    use super::*;

    fn model(hash: &str) -> transaction::Model {
        transaction::Model {
            hash: hash.to_string(),
            block_id: 840_000,
            time: Utc.with_ymd_and_hms(2024, 4, 20, 0, 9, 27).unwrap(),
            output_total: Decimal::new(625_000_000, 8),
            output_total_usd: Decimal::new(40_000_000, 2),
            fee: Decimal::ZERO,
            size: 210,
        }
    }

    #[test]
    fn rows_query_orders_newest_first_with_bound_window() {
        let stmt = rows_query(&TransactionFilter::All, PageWindow::new(25, 50))
            .build(DatabaseBackend::Postgres);
        assert!(stmt.sql.contains(r#"ORDER BY "transactions"."time" DESC"#));
        assert!(stmt.sql.contains("LIMIT $1 OFFSET $2"));
        assert_eq!(stmt.values.map(|v| v.0.len()), Some(2));
    }

    #[test]
    fn huge_offset_is_clamped_to_bigint() {
        let stmt = rows_query(&TransactionFilter::All, PageWindow::new(25, u64::MAX))
            .build(DatabaseBackend::Postgres);
        assert_eq!(
            stmt.values.map(|v| v.0),
            Some(vec![
                Value::BigUnsigned(Some(25)),
                Value::BigUnsigned(Some(i64::MAX as u64)),
            ])
        );
    }

    #[tokio::test]
    async fn huge_offset_page_is_empty_with_accurate_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transaction::Model>::new()])
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(5)),
            )])]])
            .into_connection();
        let service = crate::application::TransactionQueryService::new(std::sync::Arc::new(
            SeaOrmTransactionRepository::new(db),
        ));

        let page = service
            .list(PageWindow::new(25, u64::MAX))
            .await
            .unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.pagination.offset, u64::MAX);
    }

    #[test]
    fn range_filter_is_inclusive_between() {
        let filter = TransactionFilter::TimeRange {
            from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
        };
        let stmt = filtered(&filter).build(DatabaseBackend::Postgres);
        assert!(stmt.sql.contains(r#""transactions"."time" BETWEEN $1 AND $2"#));
    }

    #[test]
    fn search_lowercases_and_binds_the_term() {
        let filter = TransactionFilter::HashContains("DeadBeef".to_string());
        let stmt = filtered(&filter).build(DatabaseBackend::Postgres);
        assert!(stmt.sql.contains(r#"LOWER("transactions"."hash") LIKE $1"#));
        assert!(!stmt.sql.contains("deadbeef"));
        assert_eq!(
            stmt.values.map(|v| v.0),
            Some(vec![Value::from("%deadbeef%")])
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("a_b%c"), r"%a\_b\%c%");
        assert_eq!(contains_pattern(r"x\y"), r"%x\\y%");
        assert_eq!(contains_pattern("ABC"), "%abc%");
    }

    #[test]
    fn bucket_statement_binds_interval_and_limit() {
        let stmt = time_bucket_statement(BucketInterval::OneHour, 5);
        assert!(stmt.sql.contains("time_bucket($1::interval"));
        assert!(stmt.sql.contains("ORDER BY bucket DESC"));
        assert_eq!(
            stmt.values.map(|v| v.0),
            Some(vec![Value::from("1 hour"), Value::from(5i64)])
        );
    }

    #[tokio::test]
    async fn find_by_hash_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("ab12")]])
            .into_connection();
        let repo = SeaOrmTransactionRepository::new(db);

        let tx = repo.find_by_hash("ab12").await.unwrap().unwrap();
        assert_eq!(tx.hash, "ab12");
        assert_eq!(tx.output_total, Decimal::new(625_000_000, 8));
    }

    #[tokio::test]
    async fn find_by_hash_without_rows_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transaction::Model>::new()])
            .into_connection();
        let repo = SeaOrmTransactionRepository::new(db);

        assert!(repo.find_by_hash("deadbeef").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_reads_num_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(5)),
            )])]])
            .into_connection();
        let repo = SeaOrmTransactionRepository::new(db);

        assert_eq!(repo.count(&TransactionFilter::All).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn buckets_are_decoded() {
        let bucket = Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("bucket", Value::from(bucket)),
                ("transaction_count", Value::from(3i64)),
                ("total_volume", Value::from(Decimal::new(7, 0))),
                ("avg_fee", Value::from(Decimal::new(1, 4))),
                ("max_transaction", Value::from(Decimal::new(5, 0))),
                ("min_transaction", Value::from(Decimal::new(1, 0))),
            ])]])
            .into_connection();
        let repo = SeaOrmTransactionRepository::new(db);

        let buckets = repo
            .time_buckets(BucketInterval::OneHour, 5)
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket, bucket);
        assert_eq!(buckets[0].transaction_count, 3);
        assert_eq!(buckets[0].total_volume, Decimal::new(7, 0));
    }

    #[tokio::test]
    async fn query_errors_become_storage_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("relation does not exist".into())])
            .into_connection();
        let repo = SeaOrmTransactionRepository::new(db);

        let err = repo
            .find_rows(&TransactionFilter::All, PageWindow::new(25, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(msg) if msg.contains("relation does not exist")));
    }
}
