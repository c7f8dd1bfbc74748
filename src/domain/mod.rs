pub mod error;
pub mod transaction;

pub use error::{DomainError, DomainResult, FieldViolation};
pub use transaction::{
    BucketInterval, PageWindow, TimeBucket, Transaction, TransactionFilter, TransactionRepository,
};
