//! SeaORM-backed repositories

mod transaction_repository;

pub use transaction_repository::SeaOrmTransactionRepository;
