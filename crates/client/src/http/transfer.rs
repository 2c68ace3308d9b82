//! File upload and download helpers.
//!
//! Uploads go out as multipart forms; when a progress callback is supplied
//! the file is fed through a counting byte stream that reports whole-percent
//! steps as bytes are read. Downloads stream straight to disk and remove the
//! partial file on any failure.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::http::client::{ApiResponse, HttpClient};
use crate::http::options::RequestOptions;

/// Progress callback receiving a whole percentage (0-100).
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

impl HttpClient {
    /// Upload a local file as a `file` multipart field.
    ///
    /// With `progress` set, percentage steps are reported as the body is
    /// read; without it the file streams silently. The response body is
    /// decoded into `T` like any other request.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file_path: &Path,
        progress: Option<ProgressFn>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let total = tokio::fs::metadata(file_path)
            .await
            .map_err(|e| ApiError::Client(format!("Cannot read file: {e}")))?
            .len();
        let file = tokio::fs::File::open(file_path)
            .await
            .map_err(|e| ApiError::Client(format!("Cannot open file: {e}")))?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let body = match progress {
            Some(callback) => counting_body(file, total, callback),
            None => reqwest::Body::wrap_stream(ReaderStream::new(file)),
        };

        let part = Part::stream_with_length(body, total)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::Client(format!("Cannot build upload part: {e}")))?;
        let form = Form::new().part("file", part);

        let url = self.url_for(endpoint, &options.params)?;
        let headers = self.headers_for(&options);
        let builder = self
            .transport()
            .post(url.clone())
            .headers(headers)
            .multipart(form);

        let timeout = options.timeout;
        let work = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };

        let (status, resp_headers, bytes) = tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| ApiError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::decode_error_body(status, &bytes));
        }

        self.invalidate_cache_for(url.path());

        let data = serde_json::from_slice(&bytes).map_err(|e| ApiError::Schema {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })?;
        Ok(ApiResponse {
            data,
            status: status.as_u16(),
            headers: resp_headers,
            fetched_at: Utc::now(),
        })
    }

    /// Download a binary payload to `dest`.
    ///
    /// The body streams to disk chunk by chunk; on any failure after the
    /// file is created the partial file is removed. Backend failure statuses
    /// keep their `HTTP_ERROR_*` codes; transport and filesystem failures
    /// carry `DOWNLOAD_ERROR`.
    pub async fn download_file(
        &self,
        endpoint: &str,
        dest: &Path,
        progress: Option<ProgressFn>,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        let url = self.url_for(endpoint, &options.params)?;
        let headers = self.headers_for(&options);

        let response = tokio::time::timeout(
            options.timeout,
            self.transport().get(url).headers(headers).send(),
        )
        .await
        .map_err(|_| ApiError::Timeout {
            timeout_ms: options.timeout.as_millis() as u64,
        })?
        .map_err(|e| ApiError::Download(format!("Download request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(Self::decode_error_body(status, &body));
        }

        let total = response.content_length().unwrap_or(0);
        let mut stream = response.bytes_stream();
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| ApiError::Download(format!("Cannot create file: {e}")))?;

        let mut done: u64 = 0;
        let mut last_pct: u8 = 0;
        let write_result: Result<(), ApiError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk =
                    chunk.map_err(|e| ApiError::Download(format!("Stream error: {e}")))?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ApiError::Download(format!("Write error: {e}")))?;
                done += chunk.len() as u64;
                if let Some(callback) = &progress {
                    let pct = percent(done, total);
                    if pct != last_pct {
                        last_pct = pct;
                        callback(pct);
                    }
                }
            }
            file.flush()
                .await
                .map_err(|e| ApiError::Download(format!("Flush error: {e}")))?;
            Ok(())
        }
        .await;

        if let Err(e) = write_result {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(dest).await {
                tracing::warn!(error = %remove_err, path = %dest.display(), "cannot remove partial download");
            }
            return Err(e);
        }

        if let Some(callback) = &progress {
            if last_pct != 100 {
                callback(100);
            }
        }

        Ok(())
    }
}

/// Whole-percent progress, clamped to 100. Unknown totals report 0 until the
/// final 100 is emitted by the caller.
fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done.saturating_mul(100)) / total).min(100) as u8
}

/// Body that counts bytes as they leave and reports percentage steps.
fn counting_body(file: tokio::fs::File, total: u64, callback: ProgressFn) -> reqwest::Body {
    let stream = futures::stream::unfold(
        (ReaderStream::new(file), 0u64, 0u8),
        move |(mut reader, done, last_pct)| {
            let callback = callback.clone();
            async move {
                match reader.next().await {
                    Some(Ok(chunk)) => {
                        let done = done + chunk.len() as u64;
                        let pct = percent(done, total);
                        if pct != last_pct {
                            callback(pct);
                        }
                        Some((Ok::<Bytes, std::io::Error>(chunk), (reader, done, pct)))
                    }
                    Some(Err(e)) => Some((Err(e), (reader, done, last_pct))),
                    None => None,
                }
            }
        },
    );
    reqwest::Body::wrap_stream(stream)
}
