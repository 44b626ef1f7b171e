//! Google Drive file retrieval.
//!
//! One-shot blocking fetch against the Drive v3 REST API. The client looks
//! up the file's metadata to learn its MIME type, then either streams the
//! raw bytes (`alt=media`) or, for Google Workspace documents that have no
//! raw form, exports them to DOCX. The API key travels in the
//! `X-goog-api-key` header so request URLs stay free of secrets.

use crate::error::{DeliveryError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default Drive v3 API endpoint.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// MIME prefix shared by all Google Workspace native documents.
const WORKSPACE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// Export format for Workspace documents (DOCX).
const EXPORT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// What to fetch and where to store it.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// Drive file ID.
    pub file_id: String,
    /// Local directory, created if missing.
    pub download_dir: PathBuf,
    /// Local file name.
    pub file_name: String,
}

impl DownloadTarget {
    /// Full local path of the stored file.
    #[must_use]
    pub fn local_path(&self) -> PathBuf {
        self.download_dir.join(&self.file_name)
    }
}

/// File metadata relevant to the download strategy.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Name as stored in Drive.
    pub name: String,
    /// MIME type; decides between raw download and DOCX export.
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
struct MetadataWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

/// Drive API client bound to one API key.
pub struct DriveClient {
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DriveClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fetch name and MIME type for a file.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Drive`] if the request or parse fails.
    pub fn metadata(&self, file_id: &str) -> Result<FileMetadata> {
        let url = format!(
            "{}/files/{}?fields=name,mimeType",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(file_id)
        );

        let resp = http_agent()
            .get(&url)
            .set("X-goog-api-key", &self.api_key)
            .set("User-Agent", "drivecast/0.1")
            .call()
            .map_err(|e| DeliveryError::Drive(format!("metadata fetch failed: {e}")))?;

        let body = resp
            .into_string()
            .map_err(|e| DeliveryError::Drive(format!("metadata read failed: {e}")))?;
        let wire: MetadataWire = serde_json::from_str(&body)
            .map_err(|e| DeliveryError::Drive(format!("invalid metadata response: {e}")))?;

        Ok(FileMetadata {
            name: wire.name.unwrap_or_default(),
            mime_type: wire.mime_type.unwrap_or_default(),
        })
    }

    /// Download the file into `target.download_dir/target.file_name`.
    ///
    /// Workspace-native documents cannot be fetched as media, so they are
    /// exported to DOCX; any other MIME type downloads raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Drive`] on any request failure and
    /// [`DeliveryError::Io`] if the directory cannot be created.
    pub fn fetch(&self, target: &DownloadTarget) -> Result<PathBuf> {
        let metadata = self.metadata(&target.file_id)?;

        let url = if is_workspace_native(&metadata.mime_type) {
            info!(
                "'{}' is a {} document, exporting as DOCX",
                metadata.name, metadata.mime_type
            );
            self.export_url(&target.file_id)
        } else {
            self.media_url(&target.file_id)
        };

        std::fs::create_dir_all(&target.download_dir)?;
        let path = target.local_path();
        self.download_to(&url, &path)?;

        info!("stored '{}' at {}", metadata.name, path.display());
        Ok(path)
    }

    fn media_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?alt=media",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(file_id)
        )
    }

    fn export_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}/export?mimeType={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(file_id),
            urlencoding::encode(EXPORT_MIME)
        )
    }

    /// Stream a URL into a local file.
    fn download_to(&self, url: &str, dest: &Path) -> Result<()> {
        let resp = http_agent()
            .get(url)
            .set("X-goog-api-key", &self.api_key)
            .set("User-Agent", "drivecast/0.1")
            .call()
            .map_err(|e| DeliveryError::Drive(format!("download failed: {e}")))?;

        let mut reader = resp.into_reader();
        let mut file = std::fs::File::create(dest).map_err(|e| {
            DeliveryError::Drive(format!("cannot create {}: {e}", dest.display()))
        })?;

        std::io::copy(&mut reader, &mut file)
            .map_err(|e| DeliveryError::Drive(format!("download write failed: {e}")))?;

        Ok(())
    }
}

/// Returns `true` for Google Editors files that require export.
fn is_workspace_native(mime_type: &str) -> bool {
    mime_type.starts_with(WORKSPACE_MIME_PREFIX)
}

fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(15))
        .timeout_read(Duration::from_secs(300))
        .build()
}
