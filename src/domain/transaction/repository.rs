//! Transaction repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::interval::BucketInterval;
use super::model::{TimeBucket, Transaction};
use crate::domain::DomainResult;

/// Row selection shared by a rows query and its count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Every transaction.
    All,
    /// `from <= time <= to`.
    TimeRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Case-insensitive substring of `hash`. Matched literally.
    HashContains(String),
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::TimeRange { from, to } => tx.time >= *from && tx.time <= *to,
            Self::HashContains(term) => tx.hash_contains(term),
        }
    }
}

/// Slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    pub fn first(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Read-only access to the transaction table.
///
/// Rows are always ordered by `time` descending.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_rows(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> DomainResult<Vec<Transaction>>;
    async fn count(&self, filter: &TransactionFilter) -> DomainResult<u64>;
    async fn find_by_hash(&self, hash: &str) -> DomainResult<Option<Transaction>>;
    /// Most recent `limit` buckets, newest first.
    async fn time_buckets(
        &self,
        interval: BucketInterval,
        limit: u64,
    ) -> DomainResult<Vec<TimeBucket>>;
    /// Round trip to the store, for health checks.
    async fn ping(&self) -> DomainResult<()>;
}
