pub mod services;

pub use services::{SearchResult, TransactionQueryService};
