//! Caching facade over the records dispatcher.
//!
//! Wraps [`RecordsApi`] with the response cache and the attachment
//! cache, exposing the public CRUD surface:
//!
//! - reads consult the cache before the network and populate it after
//!   attachment processing
//! - `update_record` and `delete_record` invalidate the entire cache on
//!   success; `create_record` leaves existing entries alone
//! - a per-call bypass flag forces network access without disabling
//!   caching for other calls
//!
//! Invalidation is deliberately coarse: the remote API has no change
//! feed, so every mutation discards all potentially-stale state instead
//! of tracking per-record staleness.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Value, json};

use airgrid_core::cache::request_cache_key;
use airgrid_core::{AppConfig, DiskStore, NoopStore, ResponseStore};

use crate::attachments::AttachmentStore;
use crate::error::ClientError;
use crate::records::{Deleted, ListOptions, Record, RecordPage, RecordsApi, response};
use crate::transport::{ReqwestTransport, Transport};

/// CRUD client with response and attachment caching.
pub struct CachingClient {
    api: RecordsApi,
    store: Arc<dyn ResponseStore>,
    attachments: Option<AttachmentStore>,
}

impl CachingClient {
    /// Create a client from configuration.
    ///
    /// Wires the disk-backed response store and the attachment store
    /// when their directories are configured; either defaults to
    /// disabled when omitted.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.timeout())?);
        let store: Arc<dyn ResponseStore> = match &config.response_cache_dir {
            Some(dir) => Arc::new(DiskStore::new(dir)),
            None => Arc::new(NoopStore),
        };

        Self::with_parts(config, transport, store)
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&AppConfig::load()?)
    }

    /// Create a client over explicit transport and store implementations.
    pub fn with_parts(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn ResponseStore>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let attachments = config
            .attachment_cache_dir
            .as_ref()
            .map(|dir| AttachmentStore::new(dir, Arc::clone(&transport)));

        Ok(Self { api: RecordsApi::new(config, transport)?, store, attachments })
    }

    /// List records, optionally filtered by view and formula.
    pub async fn list_records(&self, opts: &ListOptions) -> Result<RecordPage, ClientError> {
        let value = self.cached_get("", &opts.to_query(), opts.bypass_cache).await?;
        Ok(response::decode_lenient(value))
    }

    /// Fetch a single record by id.
    pub async fn get_record(&self, id: &str, bypass_cache: bool) -> Result<Record, ClientError> {
        let value = self.cached_get(id, &[], bypass_cache).await?;
        Ok(response::decode_lenient(value))
    }

    /// Create a record from a field mapping.
    ///
    /// Writes never consult nor populate the cache, and creating a
    /// record leaves existing entries valid.
    pub async fn create_record(&self, fields: Value) -> Result<Record, ClientError> {
        let value = self.api.call(Method::POST, "", &[], Some(json!({ "fields": fields }))).await?;
        Ok(response::decode_lenient(value))
    }

    /// Replace a record's fields.
    ///
    /// On success the entire response cache is invalidated.
    pub async fn update_record(&self, id: &str, fields: Value) -> Result<Record, ClientError> {
        let body = json!({ "records": [{ "id": id, "fields": fields }] });
        let value = self.api.call(Method::PATCH, "", &[], Some(body)).await?;

        self.store.invalidate_all().await?;

        let page: RecordPage = response::decode_lenient(value);
        Ok(page.records.into_iter().next().unwrap_or_default())
    }

    /// Delete a record by id.
    ///
    /// On success the entire response cache is invalidated.
    pub async fn delete_record(&self, id: &str) -> Result<Deleted, ClientError> {
        let value = self.api.call(Method::DELETE, id, &[], None).await?;

        self.store.invalidate_all().await?;

        Ok(response::decode_lenient(value))
    }

    /// Cache-first GET.
    async fn cached_get(
        &self,
        path: &str,
        query: &[(String, String)],
        bypass: bool,
    ) -> Result<Value, ClientError> {
        let url = self.api.request_url(path, query);
        let key = request_cache_key(Method::GET.as_str(), url.as_str(), "");

        if !bypass && let Some(hit) = self.store.get(&key).await {
            tracing::debug!("cache hit for GET {}", url);
            return Ok(hit);
        }

        let mut value = self.api.call(Method::GET, path, query, None).await?;

        if let Some(attachments) = &self.attachments {
            attachments.annotate(&mut value).await;
        }

        // The annotated response is what gets cached, so a later hit
        // carries the same local attachment paths.
        if !bypass {
            self.store.put(&key, &value).await?;
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpRequest, HttpResponse};
    use airgrid_core::MemoryStore;
    use bytes::Bytes;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const LIST_BODY: &str = r#"{
        "records": [{
            "id": "rec1",
            "fields": {
                "Photo": [{"id": "att1", "url": "http://x/a.png", "type": "image/png"}]
            }
        }]
    }"#;

    /// Transport serving the API from one canned body and attachment
    /// URLs from static bytes, recording every request.
    struct RoutedStub {
        requests: Mutex<Vec<(Method, String)>>,
    }

    impl RoutedStub {
        fn new() -> Arc<Self> {
            Arc::new(Self { requests: Mutex::new(Vec::new()) })
        }

        fn api_calls(&self, method: &Method) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, url)| m == method && url.starts_with("https://api.airtable.com/"))
                .count()
        }

        fn download_calls(&self) -> usize {
            self.requests.lock().unwrap().iter().filter(|(_, url)| url.starts_with("http://x/")).count()
        }
    }

    #[async_trait::async_trait]
    impl Transport for RoutedStub {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            self.requests.lock().unwrap().push((request.method.clone(), request.url.clone()));

            let body = if request.url.starts_with("http://x/") {
                Bytes::from_static(b"png bytes")
            } else {
                Bytes::from_static(LIST_BODY.as_bytes())
            };
            Ok(HttpResponse { status: 200, body })
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            api_key: "key_secret".into(),
            base: "app12345".into(),
            table: "Inventory".into(),
            ..Default::default()
        }
    }

    fn client(transport: Arc<RoutedStub>, store: Arc<dyn ResponseStore>) -> CachingClient {
        CachingClient::with_parts(&config(), transport, store).unwrap()
    }

    #[test]
    fn test_construction_rejects_empty_credentials() {
        let cfg = AppConfig { api_key: String::new(), ..config() };
        let result = CachingClient::with_parts(&cfg, RoutedStub::new(), Arc::new(NoopStore));
        assert!(matches!(result, Err(ClientError::Config(_))));

        let cfg = AppConfig { table: String::new(), ..config() };
        let result = CachingClient::with_parts(&cfg, RoutedStub::new(), Arc::new(NoopStore));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_construction_succeeds_with_credentials() {
        assert!(CachingClient::with_parts(&config(), RoutedStub::new(), Arc::new(NoopStore)).is_ok());
    }

    #[tokio::test]
    async fn test_caching_disabled_always_hits_network() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(NoopStore));

        client.list_records(&ListOptions::default()).await.unwrap();
        client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
    }

    #[tokio::test]
    async fn test_repeated_get_served_from_cache() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        let first = client.list_records(&ListOptions::default()).await.unwrap();
        let second = client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 1);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_distinct_queries_cached_separately() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        client.list_records(&ListOptions::default()).await.unwrap();
        client
            .list_records(&ListOptions { view: Some("Grid view".into()), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
    }

    #[tokio::test]
    async fn test_bypass_skips_cache_both_ways() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        let opts = ListOptions { bypass_cache: true, ..Default::default() };
        client.list_records(&opts).await.unwrap();
        // Bypass did not populate the cache either, so a normal call
        // goes to the network again.
        client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
    }

    #[tokio::test]
    async fn test_update_invalidates_cache() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        client.list_records(&ListOptions::default()).await.unwrap();
        client.update_record("rec1", serde_json::json!({"Name": "renamed"})).await.unwrap();
        client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
        assert_eq!(transport.api_calls(&Method::PATCH), 1);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        client.list_records(&ListOptions::default()).await.unwrap();
        client.delete_record("rec1").await.unwrap();
        client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
        assert_eq!(transport.api_calls(&Method::DELETE), 1);
    }

    #[tokio::test]
    async fn test_create_leaves_cache_intact() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        client.list_records(&ListOptions::default()).await.unwrap();
        client.create_record(serde_json::json!({"Name": "new row"})).await.unwrap();
        client.list_records(&ListOptions::default()).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 1);
        assert_eq!(transport.api_calls(&Method::POST), 1);
    }

    #[tokio::test]
    async fn test_get_record_cached_independently_of_list() {
        let transport = RoutedStub::new();
        let client = client(Arc::clone(&transport), Arc::new(MemoryStore::new()));

        client.list_records(&ListOptions::default()).await.unwrap();
        client.get_record("rec1", false).await.unwrap();
        client.get_record("rec1", false).await.unwrap();

        assert_eq!(transport.api_calls(&Method::GET), 2);
    }

    #[tokio::test]
    async fn test_cached_list_with_attachments_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let response_dir = tmp.path().join("c");
        let files_dir = response_dir.join("files");

        let cfg = AppConfig {
            response_cache_dir: Some(response_dir.clone()),
            attachment_cache_dir: Some(files_dir.clone()),
            ..config()
        };

        let transport = RoutedStub::new();
        let store: Arc<dyn ResponseStore> = Arc::new(DiskStore::new(&response_dir));
        let client = CachingClient::with_parts(&cfg, Arc::clone(&transport) as Arc<dyn Transport>, store).unwrap();

        client.list_records(&ListOptions::default()).await.unwrap();
        let second = client.list_records(&ListOptions::default()).await.unwrap();

        // One API call, one attachment download, annotation served from
        // the cache on the second read.
        assert_eq!(transport.api_calls(&Method::GET), 1);
        assert_eq!(transport.download_calls(), 1);
        assert!(files_dir.join("att1.png").exists());

        let cached_url = second.records[0].fields["Photo"][0]["cached_url"].as_str().unwrap();
        assert_eq!(PathBuf::from(cached_url), files_dir.join("att1.png"));
    }
}
