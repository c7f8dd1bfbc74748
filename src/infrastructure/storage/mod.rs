//! Non-database repository implementations

pub mod memory;

pub use memory::InMemoryTransactionRepository;
