//! Application services

mod transaction_query;

pub use transaction_query::{SearchResult, TransactionQueryService, MIN_SEARCH_TERM_LEN};
