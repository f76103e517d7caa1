//! Package index client
//!
//! Talks to the index JSON API (`<index>/<package>/json` and
//! `<index>/<package>/<version>/json`) and downloads release files.
//! Every failure surfaces as [`Error::Index`]; nothing is retried.

use crate::config::Settings;
use crate::error::{Error, IndexError, Result};
use crate::store::temp_path_for;
use crate::types::IndexMetadata;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// HTTP client for one package index
#[derive(Clone, Debug)]
pub struct IndexClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IndexClient {
    /// Create a client for the index at `base_url`
    ///
    /// `timeout` bounds each request; `None` waits indefinitely.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("wheelwright/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Create a client from the run settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.index_url.clone(), settings.request_timeout())
    }

    /// Index base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Metadata URL for a package, optionally pinned to a version
    #[must_use]
    pub fn metadata_url(&self, package: &str, version: Option<&str>) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        match version {
            Some(version) => format!(
                "{}/{}/{}/json",
                base,
                urlencoding::encode(package),
                urlencoding::encode(version)
            ),
            None => format!("{}/{}/json", base, urlencoding::encode(package)),
        }
    }

    /// Fetch release metadata for a package (latest release when `version` is None)
    pub async fn fetch_metadata(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> Result<IndexMetadata> {
        let url = self.metadata_url(package, version);
        debug!(%url, "fetching metadata");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::MetadataFetchFailed {
                url,
                status: status.as_u16(),
                reason: reason(status),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| transport_error(&url, &e))?;
        let metadata: IndexMetadata =
            serde_json::from_slice(&body).map_err(|e| IndexError::InvalidMetadata {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            %url,
            files = metadata.urls.len(),
            "metadata fetched"
        );
        Ok(metadata)
    }

    /// Download `url` to `dest`, returning the number of bytes written
    ///
    /// The body is streamed to `dest` + `.tmp` and renamed into place only
    /// after it was written completely, so `dest` never holds a partial file.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
                reason: reason(status),
            }
            .into());
        }

        info!("Downloading {}", url);

        let temp_path = temp_path_for(dest);
        let written = match write_body(response, url, &temp_path).await {
            Ok(written) => written,
            Err(e) => {
                // Best effort; a leftover temp file never shadows the real name
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&temp_path, dest).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to move '{}' into place: {}",
                    temp_path.display(),
                    e
                ),
            ))
        })?;

        debug!(%url, bytes = written, dest = %dest.display(), "download complete");
        Ok(written)
    }
}

async fn write_body(mut response: reqwest::Response, url: &str, temp_path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(temp_path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create '{}': {}", temp_path.display(), e),
        ))
    })?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| transport_error(url, &e))? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

fn transport_error(url: &str, error: &reqwest::Error) -> Error {
    let reason = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    IndexError::Unreachable {
        url: url.to_string(),
        reason,
    }
    .into()
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_string()
}
