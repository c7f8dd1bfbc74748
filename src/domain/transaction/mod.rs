//! Transaction aggregate
//!
//! Contains the Transaction entity, time buckets, and the repository interface.

pub mod interval;
pub mod model;
pub mod repository;

pub use interval::{BucketInterval, UnknownInterval};
pub use model::{TimeBucket, Transaction};
pub use repository::{PageWindow, TransactionFilter, TransactionRepository};
