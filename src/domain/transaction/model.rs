//! Transaction domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// On-chain Bitcoin transaction as stored in the time-series table.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Transaction hash (txid), unique
    pub hash: String,
    /// Height of the containing block
    pub block_id: i64,
    /// Block time; the time-series axis
    pub time: DateTime<Utc>,
    /// Sum of outputs in BTC
    pub output_total: Decimal,
    /// Sum of outputs in USD at block time
    pub output_total_usd: Decimal,
    /// Fee in BTC
    pub fee: Decimal,
    /// Serialized size in bytes
    pub size: i32,
}

impl Transaction {
    /// Case-insensitive substring match against the hash.
    pub fn hash_contains(&self, term: &str) -> bool {
        self.hash.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Aggregates over all transactions whose `time` falls inside one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucket {
    /// Bucket start (timestamp truncated to the interval)
    pub bucket: DateTime<Utc>,
    pub transaction_count: i64,
    /// Sum of `output_total`
    pub total_volume: Decimal,
    /// Average `fee`
    pub avg_fee: Decimal,
    /// Largest `output_total`
    pub max_transaction: Decimal,
    /// Smallest `output_total`
    pub min_transaction: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_tx(hash: &str) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            block_id: 840_000,
            time: Utc.with_ymd_and_hms(2024, 4, 20, 0, 9, 27).unwrap(),
            output_total: Decimal::new(312_500_000, 8),
            output_total_usd: Decimal::new(20_000_000, 2),
            fee: Decimal::ZERO,
            size: 250,
        }
    }

    #[test]
    fn hash_contains_ignores_case() {
        let tx = sample_tx("a0B1c2D3e4");
        assert!(tx.hash_contains("b1C2"));
        assert!(tx.hash_contains("A0B1C2D3E4"));
        assert!(!tx.hash_contains("ffff"));
    }
}
