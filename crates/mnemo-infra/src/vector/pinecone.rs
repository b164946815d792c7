//! PineconeIndex -- concrete [`VectorIndex`] implementation for Pinecone.
//!
//! Connecting describes the index on the control plane
//! (`GET /indexes/{name}`) to learn its data-plane host; upserts and
//! queries then go straight to that host. The credential, index name and
//! namespace all come from [`Settings`].
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use mnemo_core::memory::index::VectorIndex;
use mnemo_types::error::IndexError;
use mnemo_types::index::{IndexMatch, IndexRecord};
use mnemo_types::settings::Settings;

use super::types::{DescribeIndexResponse, QueryRequest, QueryResponse, UpsertRequest, UpsertResponse};

/// Build a handle to the vector index named in `settings`.
///
/// Not cached: every call describes the index again and returns a fresh
/// handle. Failures are returned as-is with no retry.
pub async fn get_index(settings: &Settings) -> Result<PineconeIndex, IndexError> {
    PineconeIndex::connect(settings).await
}

/// Handle to one Pinecone index and namespace.
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: SecretString,
    index_name: String,
    namespace: String,
    host: String,
    dimension: Option<u32>,
}

// PineconeIndex does NOT derive Debug; the SecretString already redacts the
// key, but the handle has nothing useful to print either.

impl PineconeIndex {
    /// The Pinecone API version header value.
    const API_VERSION: &'static str = "2024-07";

    /// Describe the configured index and bind a handle to its host.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Unauthorized`] if the credential is rejected
    /// - [`IndexError::NotFound`] if the index does not exist
    /// - [`IndexError::Unreachable`] if the service cannot be reached
    pub async fn connect(settings: &Settings) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IndexError::Unreachable(format!("failed to build HTTP client: {e}")))?;
        let api_key = SecretString::from(settings.index_api_key.expose_secret().to_string());

        let url = format!("{}/indexes/{}", settings.index_api_url, settings.index_name);
        let request = client
            .get(&url)
            .header("Api-Key", api_key.expose_secret())
            .header("X-Pinecone-API-Version", Self::API_VERSION);
        let description: DescribeIndexResponse = send(request, &settings.index_name).await?;

        if let Some(status) = &description.status {
            if !status.ready {
                tracing::warn!(
                    index = %description.name,
                    state = %status.state,
                    "Vector index is not ready yet"
                );
            }
        }

        let host = normalize_host(&description.host);
        tracing::debug!(index = %description.name, host = %host, "Connected to vector index");

        Ok(Self {
            client,
            api_key,
            index_name: settings.index_name.clone(),
            namespace: settings.namespace.clone(),
            host,
            dimension: description.dimension,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Data-plane base URL, including scheme.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Vector dimension reported by the index, if any.
    pub fn dimension(&self) -> Option<u32> {
        self.dimension
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", self.api_key.expose_secret())
            .header("X-Pinecone-API-Version", Self::API_VERSION)
    }
}

impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[IndexRecord]) -> Result<u64, IndexError> {
        if records.is_empty() {
            return Ok(0);
        }

        let body = UpsertRequest {
            vectors: records,
            namespace: &self.namespace,
        };
        let response: UpsertResponse = send(self.post("/vectors/upsert").json(&body), &self.index_name).await?;

        tracing::debug!(
            index = %self.index_name,
            namespace = %self.namespace,
            upserted = response.upserted_count,
            "Upserted vectors"
        );
        Ok(response.upserted_count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, IndexError> {
        let body = QueryRequest {
            vector,
            top_k,
            namespace: &self.namespace,
            include_metadata: true,
            include_values: false,
        };
        let response: QueryResponse = send(self.post("/query").json(&body), &self.index_name).await?;

        tracing::debug!(
            index = %self.index_name,
            namespace = %self.namespace,
            matches = response.matches.len(),
            "Queried vector index"
        );
        Ok(response.matches)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Send a request and decode a JSON body, mapping service failures.
async fn send<T: DeserializeOwned>(request: RequestBuilder, index_name: &str) -> Result<T, IndexError> {
    let response = request
        .send()
        .await
        .map_err(|e| IndexError::Unreachable(e.to_string()))?;

    let response = check_status(response, index_name).await?;

    response
        .json::<T>()
        .await
        .map_err(|e| IndexError::Decode(e.to_string()))
}

async fn check_status(response: Response, index_name: &str) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => IndexError::Unauthorized,
        404 => IndexError::NotFound(index_name.to_string()),
        code => IndexError::Service { status: code, body },
    })
}

/// Pinecone reports hosts without a scheme; tests and proxies may include one.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings_for(server: &MockServer) -> Settings {
        Settings {
            index_api_key: SecretString::from("pk-test".to_string()),
            index_name: "membot".to_string(),
            namespace: "tenant-a".to_string(),
            default_model: "gpt-3.5-turbo".to_string(),
            index_api_url: server.uri(),
        }
    }

    async fn mount_describe(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/indexes/membot"))
            .and(header("Api-Key", "pk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "membot",
                "host": server.uri(),
                "dimension": 3,
                "metric": "cosine",
                "status": {"ready": true, "state": "Ready"}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("membot-abc.svc.pinecone.io"),
            "https://membot-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_connect_binds_host_and_namespace() {
        let server = MockServer::start().await;
        mount_describe(&server).await;

        let index = get_index(&settings_for(&server)).await.unwrap();
        assert_eq!(index.host(), server.uri());
        assert_eq!(index.index_name(), "membot");
        assert_eq!(index.namespace(), "tenant-a");
        assert_eq!(index.dimension(), Some(3));
    }

    #[tokio::test]
    async fn test_connect_rejected_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/membot"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
            .mount(&server)
            .await;

        let err = get_index(&settings_for(&server)).await.err().unwrap();
        assert!(matches!(err, IndexError::Unauthorized));
    }

    #[tokio::test]
    async fn test_connect_missing_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/membot"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = get_index(&settings_for(&server)).await.err().unwrap();
        assert!(matches!(err, IndexError::NotFound(name) if name == "membot"));
    }

    #[tokio::test]
    async fn test_connect_service_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/membot"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = get_index(&settings_for(&server)).await.err().unwrap();
        match err {
            IndexError::Service { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_connect_unreachable() {
        let settings = Settings {
            index_api_key: SecretString::from("pk-test".to_string()),
            index_name: "membot".to_string(),
            namespace: String::new(),
            default_model: "gpt-3.5-turbo".to_string(),
            index_api_url: "http://127.0.0.1:1".to_string(),
        };

        let err = get_index(&settings).await.err().unwrap();
        assert!(matches!(err, IndexError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_connect_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/membot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "membot",
                "host": server.uri()
            })))
            .expect(2)
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let _first = get_index(&settings).await.unwrap();
        let _second = get_index(&settings).await.unwrap();
    }

    #[tokio::test]
    async fn test_upsert_sends_namespace_and_records() {
        let server = MockServer::start().await;
        mount_describe(&server).await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .and(header("Api-Key", "pk-test"))
            .and(body_partial_json(json!({"namespace": "tenant-a"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let index = get_index(&settings_for(&server)).await.unwrap();
        let record = IndexRecord::new("mem-1", vec![0.1, 0.2, 0.3]).with_metadata("user_id", "u1");
        let upserted = index.upsert(&[record]).await.unwrap();
        assert_eq!(upserted, 1);
    }

    #[tokio::test]
    async fn test_upsert_empty_batch_skips_request() {
        let server = MockServer::start().await;
        mount_describe(&server).await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let index = get_index(&settings_for(&server)).await.unwrap();
        assert_eq!(index.upsert(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_returns_matches() {
        let server = MockServer::start().await;
        mount_describe(&server).await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({
                "topK": 2,
                "namespace": "tenant-a",
                "includeMetadata": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    {"id": "mem-1", "score": 0.93, "metadata": {"content": "likes tea"}},
                    {"id": "mem-2", "score": 0.41}
                ],
                "namespace": "tenant-a"
            })))
            .mount(&server)
            .await;

        let index = get_index(&settings_for(&server)).await.unwrap();
        let matches = index.query(&[0.1, 0.2, 0.3], 2).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "mem-1");
        assert!((matches[0].score - 0.93).abs() < 1e-6);
        assert_eq!(matches[0].metadata["content"], json!("likes tea"));
    }

    #[tokio::test]
    async fn test_query_undecodable_body() {
        let server = MockServer::start().await;
        mount_describe(&server).await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let index = get_index(&settings_for(&server)).await.unwrap();
        let err = index.query(&[0.1, 0.2, 0.3], 1).await.unwrap_err();
        assert!(matches!(err, IndexError::Decode(_)));
    }
}
