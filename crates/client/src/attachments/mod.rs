//! Opportunistic download cache for image attachments.
//!
//! Scans decoded responses for attachment lists (arrays of objects
//! carrying an `id` and a `url`), downloads image attachments to local
//! storage, and annotates each downloaded object with a `cached_url`
//! pointing at the local copy.
//!
//! Failure policy: a download or file-write problem never fails the
//! surrounding fetch. The attachment is simply left without the
//! annotation and the next response referencing it retries.
//!
//! Local files are addressed by attachment id, not content hash: a
//! remote attachment whose bytes change under the same id keeps serving
//! the old local copy.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::transport::{HttpRequest, Transport};

/// Extensions for the image MIME types the cache downloads.
///
/// Non-image attachments are out of scope; anything else falls back to
/// the URL's own extension, then to `jpg`.
const EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/svg+xml", "svg"),
];

/// Pick a file extension for an attachment.
fn extension_for(mime: &str, url: &str) -> String {
    if let Some((_, ext)) = EXTENSIONS.iter().find(|(m, _)| *m == mime) {
        return (*ext).to_string();
    }

    // Unknown image subtype: infer from the URL path.
    if let Ok(parsed) = Url::parse(url)
        && let Some(ext) = std::path::Path::new(parsed.path()).extension().and_then(|e| e.to_str())
        && !ext.is_empty()
    {
        return ext.to_ascii_lowercase();
    }

    "jpg".to_string()
}

/// Download cache for image attachments embedded in responses.
pub struct AttachmentStore {
    dir: PathBuf,
    transport: Arc<dyn Transport>,
}

impl AttachmentStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>, transport: Arc<dyn Transport>) -> Self {
        Self { dir: dir.into(), transport }
    }

    /// Scan a decoded response and annotate downloadable attachments.
    ///
    /// Handles both list responses (`{"records": [...]}`) and single
    /// records (`{"id", "fields"}`).
    pub async fn annotate(&self, response: &mut Value) {
        if let Some(records) = response.get_mut("records").and_then(Value::as_array_mut) {
            for record in records {
                self.annotate_record(record).await;
            }
        } else if response.get("fields").is_some() {
            self.annotate_record(response).await;
        }
    }

    async fn annotate_record(&self, record: &mut Value) {
        let Some(fields) = record.get_mut("fields").and_then(Value::as_object_mut) else {
            return;
        };

        for value in fields.values_mut() {
            let Some(items) = value.as_array_mut() else { continue };
            for item in items {
                self.annotate_attachment(item).await;
            }
        }
    }

    async fn annotate_attachment(&self, item: &mut Value) {
        let Some(obj) = item.as_object_mut() else { return };

        let Some(id) = obj.get("id").and_then(Value::as_str).map(str::to_owned) else {
            return;
        };
        let Some(url) = obj.get("url").and_then(Value::as_str).map(str::to_owned) else {
            return;
        };
        let mime = obj.get("type").and_then(Value::as_str).unwrap_or_default().to_owned();

        if !mime.starts_with("image/") {
            return;
        }

        if let Some(path) = self.ensure_local(&id, &url, &mime).await {
            obj.insert("cached_url".to_string(), Value::String(path));
        }
    }

    /// Ensure a local copy exists, returning its path.
    ///
    /// An existing file is reused without re-downloading.
    async fn ensure_local(&self, id: &str, url: &str, mime: &str) -> Option<String> {
        let ext = extension_for(mime, url);
        let path = self.dir.join(format!("{id}.{ext}"));

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Some(path.to_string_lossy().into_owned());
        }

        let response = match self.transport.send(HttpRequest::get(url)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("attachment {} download failed: {}", id, e);
                return None;
            }
        };

        if !response.is_success() {
            tracing::debug!("attachment {} download failed: status {}", id, response.status);
            return None;
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::debug!("attachment dir {} unavailable: {}", self.dir.display(), e);
            return None;
        }
        if let Err(e) = tokio::fs::write(&path, &response.body).await {
            tracing::debug!("attachment {} not written: {}", id, e);
            return None;
        }

        tracing::debug!("attachment {} cached at {}", id, path.display());
        Some(path.to_string_lossy().into_owned())
    }
}
