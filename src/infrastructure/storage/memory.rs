//! In-memory transaction repository
//!
//! Same ordering and aggregation semantics as the PostgreSQL repository.
//! Used for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::domain::{
    BucketInterval, DomainResult, PageWindow, TimeBucket, Transaction, TransactionFilter,
    TransactionRepository,
};

/// In-memory storage keyed by transaction hash
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    transactions: DashMap<String, Transaction>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let repo = Self::new();
        for tx in transactions {
            repo.insert(tx);
        }
        repo
    }

    pub fn insert(&self, tx: Transaction) {
        self.transactions.insert(tx.hash.clone(), tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Matching rows, newest first. Ties are broken by hash so pages are stable.
    fn sorted(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| a.hash.cmp(&b.hash)));
        rows
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn find_rows(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> DomainResult<Vec<Transaction>> {
        Ok(self
            .sorted(filter)
            .into_iter()
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(window.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> DomainResult<u64> {
        Ok(self
            .transactions
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }

    async fn find_by_hash(&self, hash: &str) -> DomainResult<Option<Transaction>> {
        Ok(self.transactions.get(hash).map(|entry| entry.value().clone()))
    }

    async fn time_buckets(
        &self,
        interval: BucketInterval,
        limit: u64,
    ) -> DomainResult<Vec<TimeBucket>> {
        let mut groups: BTreeMap<DateTime<Utc>, Vec<Transaction>> = BTreeMap::new();
        for entry in self.transactions.iter() {
            let tx = entry.value();
            groups
                .entry(interval.truncate(tx.time))
                .or_default()
                .push(tx.clone());
        }

        Ok(groups
            .into_iter()
            .rev()
            .take(limit as usize)
            .map(|(bucket, txs)| aggregate(bucket, &txs))
            .collect())
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

fn aggregate(bucket: DateTime<Utc>, txs: &[Transaction]) -> TimeBucket {
    let count = txs.len() as i64;
    let total_volume: Decimal = txs.iter().map(|t| t.output_total).sum();
    let total_fee: Decimal = txs.iter().map(|t| t.fee).sum();
    let avg_fee = if count > 0 {
        total_fee / Decimal::from(count)
    } else {
        Decimal::ZERO
    };

    TimeBucket {
        bucket,
        transaction_count: count,
        total_volume,
        avg_fee,
        max_transaction: txs
            .iter()
            .map(|t| t.output_total)
            .max()
            .unwrap_or_default(),
        min_transaction: txs
            .iter()
            .map(|t| t.output_total)
            .min()
            .unwrap_or_default(),
    }
}
