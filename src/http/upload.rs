//! Multipart file upload with progress reporting.
//!
//! Uploads bypass the interceptor pipeline. The file is read straight from
//! disk in fixed size chunks, so memory use does not grow with the file.
//! The progress callback receives a percentage in `[0, 100]` as each chunk
//! is handed to the transport. Every failure (unreadable file, transport
//! error, non-2xx) is normalized to [`Error::Upload`].

// ============================================================================
// Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::session::AUTH_TOKEN_KEY;

use super::client::ApiClient;
use super::response::{decode_lenient, is_success};

// ============================================================================
// Constants
// ============================================================================

/// Multipart field the file is attached under.
pub const UPLOAD_FIELD: &str = "file";

/// Size of each streamed chunk.
const CHUNK_SIZE: usize = 64 * 1024;

// ============================================================================
// ApiClient - Upload
// ============================================================================

impl ApiClient {
    /// Uploads the file at `path` to `endpoint` as multipart form data.
    ///
    /// Resolves with the parsed JSON response, or the raw text if the
    /// response is not JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] on any failure.
    pub async fn upload<P>(
        &self,
        endpoint: &str,
        path: impl AsRef<Path>,
        on_progress: P,
    ) -> Result<Value>
    where
        P: Fn(f64) + Send + Sync + 'static,
    {
        let request_id = RequestId::generate();
        let path = path.as_ref();
        let url = self.url_for(endpoint);

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(%request_id, path = %path.display(), error = %e, "Cannot open upload source");
                return Err(Error::upload(None));
            }
        };
        let total = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(%request_id, path = %path.display(), error = %e, "Cannot stat upload source");
                return Err(Error::upload(None));
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UPLOAD_FIELD.to_string());

        debug!(%request_id, url = %url, file = %file_name, bytes = total, "Starting upload");

        let body = reqwest::Body::wrap_stream(progress_stream(file, total, on_progress));
        let part = Part::stream_with_length(body, total).file_name(file_name);
        let form = Form::new().part(UPLOAD_FIELD, part);

        let mut builder = self.inner.http.post(&url).multipart(form);
        if let Some(token) = self.inner.store.get(AUTH_TOKEN_KEY) {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(%request_id, error = %e, "Upload transport failure");
                return Err(Error::upload(None));
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                error!(%request_id, status, error = %e, "Upload response unreadable");
                return Err(Error::upload(Some(status)));
            }
        };

        if !is_success(status) {
            error!(%request_id, status, "Upload rejected");
            return Err(Error::upload(Some(status)));
        }

        debug!(%request_id, status, "Upload complete");
        Ok(decode_lenient(&body))
    }
}

// ============================================================================
// Progress stream
// ============================================================================

/// Reads `reader` in chunks, reporting progress against `total` as each
/// chunk is yielded.
fn progress_stream<R, P>(
    reader: R,
    total: u64,
    on_progress: P,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static
where
    R: AsyncRead + Send + 'static,
    P: Fn(f64) + Send + Sync + 'static,
{
    let on_progress = Arc::new(on_progress);
    if total == 0 {
        on_progress(100.0);
    }

    let mut sent = 0u64;
    ReaderStream::with_capacity(reader, CHUNK_SIZE).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.len() as u64;
            on_progress(percent(sent, total));
        }
        chunk
    })
}

/// `sent / total` as a percentage clamped to `[0, 100]`.
#[inline]
fn percent(sent: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    ((sent as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}

// ============================================================================
// Tests
// ============================================================================
