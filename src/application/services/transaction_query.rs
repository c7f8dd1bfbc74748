//! Read-side transaction queries: listing, date ranges, search and buckets

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::domain::{
    BucketInterval, DomainError, DomainResult, PageWindow, TimeBucket, Transaction,
    TransactionFilter, TransactionRepository,
};
use crate::shared::PaginatedResult;

/// Shortest accepted search term, in characters.
pub const MIN_SEARCH_TERM_LEN: usize = 3;

/// Rows matching a search plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub rows: Vec<Transaction>,
    pub total: u64,
}

/// Query service over the transaction table.
///
/// Every list-style operation issues its rows query and count query
/// concurrently and fails as a whole if either fails.
pub struct TransactionQueryService {
    repo: Arc<dyn TransactionRepository>,
}

impl TransactionQueryService {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    /// Newest transactions first.
    pub async fn list(&self, window: PageWindow) -> DomainResult<PaginatedResult<Transaction>> {
        metrics::counter!("transaction_queries_total", "operation" => "list").increment(1);
        self.paginate(TransactionFilter::All, window).await
    }

    /// Transactions from `start` 00:00:00 through `end` 23:59:59 (UTC), newest first.
    pub async fn list_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        window: PageWindow,
    ) -> DomainResult<PaginatedResult<Transaction>> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        metrics::counter!("transaction_queries_total", "operation" => "range").increment(1);

        let filter = TransactionFilter::TimeRange {
            from: day_start(start),
            to: day_end(end),
        };
        self.paginate(filter, window).await
    }

    /// Most recent `limit` buckets of width `interval`, newest first.
    pub async fn by_time(
        &self,
        interval: BucketInterval,
        limit: u64,
    ) -> DomainResult<Vec<TimeBucket>> {
        metrics::counter!("transaction_queries_total", "operation" => "by_time").increment(1);
        debug!(interval = %interval, limit, "Aggregating transactions by time");
        self.repo.time_buckets(interval, limit).await
    }

    /// Case-insensitive substring search on the hash.
    pub async fn search(&self, term: &str, limit: u64) -> DomainResult<SearchResult> {
        if term.chars().count() < MIN_SEARCH_TERM_LEN {
            return Err(DomainError::validation(
                "term",
                format!("must be at least {} characters", MIN_SEARCH_TERM_LEN),
            ));
        }
        metrics::counter!("transaction_queries_total", "operation" => "search").increment(1);

        let page = self
            .paginate(
                TransactionFilter::HashContains(term.to_string()),
                PageWindow::first(limit),
            )
            .await?;
        Ok(SearchResult {
            rows: page.rows,
            total: page.total,
        })
    }

    /// Exact hash lookup. No matching row is `DomainError::NotFound`.
    pub async fn find_by_hash(&self, hash: &str) -> DomainResult<Transaction> {
        metrics::counter!("transaction_queries_total", "operation" => "by_hash").increment(1);
        self.repo
            .find_by_hash(hash)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Transaction",
                field: "hash",
                value: hash.to_string(),
            })
    }

    pub async fn ping(&self) -> DomainResult<()> {
        self.repo.ping().await
    }

    async fn paginate(
        &self,
        filter: TransactionFilter,
        window: PageWindow,
    ) -> DomainResult<PaginatedResult<Transaction>> {
        let (rows, total) = tokio::try_join!(
            self.repo.find_rows(&filter, window),
            self.repo.count(&filter),
        )?;
        debug!(
            ?filter,
            returned = rows.len(),
            total,
            "Transaction page fetched"
        );
        Ok(PaginatedResult::new(rows, total, window.limit, window.offset))
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59 on `date`; the last representable instant if that overflows.
fn day_end(date: NaiveDate) -> DateTime<Utc> {
    day_start(date)
        .checked_add_signed(Duration::seconds(86_399))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
