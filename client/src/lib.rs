//! Typed client for the Bitcoin transaction API.
//!
//! One method per endpoint. Each call is a single request; nothing is
//! retried or cached.
//!
//! ```rust,no_run
//! use tx_api_client::{PageRequest, TransactionApiClient};
//!
//! # async fn run() -> Result<(), tx_api_client::ClientError> {
//! let client = TransactionApiClient::new("http://localhost:3001")?;
//! let page = client.list(PageRequest::new(10, 0)).await?;
//! println!("{} of {}", page.rows.len(), page.total_count);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;

use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use error::ClientError;
pub use types::{
    ComponentHealth, ErrorDetail, HealthStatus, PageRequest, Pagination, SearchResult, TimeBucket,
    Transaction, TransactionPage,
};

use error::api_error;

pub struct TransactionApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl TransactionApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies, TLS).
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ClientError> {
        let url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /transactions`
    pub async fn list(&self, page: PageRequest) -> Result<TransactionPage, ClientError> {
        self.get(self.endpoint(&["transactions"]), &page.query())
            .await
    }

    /// `GET /transactions/range`, both days inclusive.
    pub async fn range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: PageRequest,
    ) -> Result<TransactionPage, ClientError> {
        let mut query = vec![
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];
        query.extend(page.query());
        self.get(self.endpoint(&["transactions", "range"]), &query)
            .await
    }

    /// `GET /transactions/by-time`, e.g. `interval = "1 hour"`.
    pub async fn by_time(
        &self,
        interval: &str,
        limit: Option<u32>,
    ) -> Result<Vec<TimeBucket>, ClientError> {
        let mut query = vec![("interval", interval.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get(self.endpoint(&["transactions", "by-time"]), &query)
            .await
    }

    /// `GET /transactions/search`
    pub async fn search(
        &self,
        term: &str,
        limit: Option<u32>,
    ) -> Result<SearchResult, ClientError> {
        let mut query = vec![("term", term.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get(self.endpoint(&["transactions", "search"]), &query)
            .await
    }

    /// `GET /transaction/{hash}`. An unknown hash is `Ok(None)`.
    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Transaction>, ClientError> {
        match self.get(self.endpoint(&["transaction", hash]), &[]).await {
            Ok(tx) => Ok(Some(tx)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET /health`. A degraded service (503) still yields its status body.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.endpoint(&["health"])).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        match status {
            s if s.is_success() => Ok(serde_json::from_slice(&body)?),
            StatusCode::SERVICE_UNAVAILABLE => {
                serde_json::from_slice(&body).map_err(|_| api_error(status.as_u16(), &body))
            }
            s => Err(api_error(s.as_u16(), &body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use btc_tx::domain::Transaction as StoredTransaction;
    use btc_tx::{AppConfig, InMemoryTransactionRepository, TransactionQueryService};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn stored(hash: &str, day: u32, hour: u32) -> StoredTransaction {
        StoredTransaction {
            hash: hash.to_string(),
            block_id: 840_000 + hour as i64,
            time: Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 30).unwrap(),
            output_total: Decimal::new(31_250_000, 8),
            output_total_usd: Decimal::new(2_000_000, 2),
            fee: Decimal::new(1_800, 8),
            size: 400,
        }
    }

    async fn spawn_server() -> String {
        let repo = Arc::new(InMemoryTransactionRepository::with_transactions([
            stored("9f8e7d6c5b", 19, 22),
            stored("abc123def4", 20, 0),
            stored("ABC999eeee", 20, 1),
        ]));
        let service = Arc::new(TransactionQueryService::new(repo));
        let router = btc_tx::create_api_router(service, &AppConfig::default(), None, None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            TransactionApiClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            TransactionApiClient::new("mailto:ops@example.com"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn path_segments_are_encoded_under_base_path() {
        let client = TransactionApiClient::new("http://explorer.local/api/").unwrap();
        assert_eq!(
            client.endpoint(&["transaction", "a b/c"]).as_str(),
            "http://explorer.local/api/transaction/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn lists_a_page() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        let page = client.list(PageRequest::new(2, 0)).await.unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.rows[0].hash, "ABC999eeee");
        assert_eq!(page.rows[0].output_total, Decimal::new(31_250_000, 8));
    }

    #[tokio::test]
    async fn range_and_inverted_range() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();

        let page = client
            .range(day(20), day(20), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);

        let err = client
            .range(day(21), day(19), PageRequest::default())
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("INVALID_DATE_RANGE"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn buckets_by_hour() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        let buckets = client.by_time("1 hour", Some(2)).await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert!(buckets[0].bucket > buckets[1].bucket);
        assert_eq!(buckets[0].transaction_count, 1);
    }

    #[tokio::test]
    async fn search_and_validation_errors() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        let found = client.search("abc", None).await.unwrap();
        assert_eq!(found.total_count, 2);

        let err = client.search("ab", None).await.unwrap_err();
        match err {
            ClientError::Api {
                status,
                message,
                details,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Validation failed");
                assert_eq!(details[0].field, "term");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_hash_is_none() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        assert!(client.get_transaction("deadbeef").await.unwrap().is_none());
        let tx = client.get_transaction("abc123def4").await.unwrap().unwrap();
        assert_eq!(tx.block_id, 840_000);
    }

    #[tokio::test]
    async fn reports_health() {
        let client = TransactionApiClient::new(&spawn_server().await).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.database.map(|d| d.status).as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TransactionApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.list(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
