// HTTP client for the file host: one multipart upload call and one GET
// per keepalive visit. Blocking and sequential; every request carries the
// configured timeout and Basic credentials.

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{UploadError, VisitError};
use crate::timestamp::parse_http_date;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{multipart, Client};
use reqwest::header::DATE;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Blocking client bound to the upload endpoint and the view/info base URL.
#[derive(Clone, Debug)]
pub struct HostClient {
    client: Client,
    upload_url: String,
    view_url: String,
    credentials: Credentials,
}

/// Body returned by the upload endpoint. Only the id is used.
#[derive(Deserialize, Debug)]
struct UploadResponse {
    id: String,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub id: String,
    /// Server time of the upload, from the response `Date` header.
    pub uploaded_at: DateTime<Utc>,
    pub link: String,
}

impl HostClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HostClient {
            client,
            upload_url: config.upload_url.clone(),
            view_url: config.view_url.trim_end_matches('/').to_string(),
            credentials: Credentials::new(config.api_key.clone()),
        })
    }

    /// Public link for an uploaded file: `{view_url}/{id}`.
    pub fn view_link(&self, id: &str) -> String {
        format!("{}/{}", self.view_url, id)
    }

    /// Target of keepalive requests: `{view_url}/{id}/info`.
    pub fn info_url(&self, id: &str) -> String {
        format!("{}/{}/info", self.view_url, id)
    }

    /// Upload a local file as multipart field `file`. Only 200 and 201 are
    /// accepted; the body must carry an `id` and the response a valid `Date`.
    pub fn upload(&self, path: &Path) -> Result<UploadResult, UploadError> {
        let io_err = |source: std::io::Error| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();

        let part = multipart::Part::reader_with_length(file, len).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        info!(path = %path.display(), bytes = len, url = %self.upload_url, "uploading");
        let req = self.client.post(&self.upload_url).multipart(form);
        let res = self.credentials.apply(req).send()?;

        let status = res.status();
        debug!(%status, headers = ?res.headers(), "upload response");
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = res.text().unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        let date = res
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = res.text()?;
        debug!(%body, "upload response body");

        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| UploadError::InvalidBody(e.to_string()))?;
        if parsed.id.is_empty() {
            return Err(UploadError::InvalidBody("empty id".into()));
        }

        let date = date.ok_or_else(|| UploadError::InvalidDate("no Date header".into()))?;
        let uploaded_at = parse_http_date(&date).ok_or(UploadError::InvalidDate(date))?;

        Ok(UploadResult {
            link: self.view_link(&parsed.id),
            id: parsed.id,
            uploaded_at,
        })
    }

    /// Hit the info endpoint for `id` so the host resets its inactivity
    /// timer. Anything but 200 is a failure.
    pub fn visit(&self, id: &str) -> Result<(), VisitError> {
        let url = self.info_url(id);
        let res = self.credentials.apply(self.client.get(&url)).send()?;
        let status = res.status();
        debug!(%url, %status, "keepalive response");
        if status != StatusCode::OK {
            return Err(VisitError::Status(status));
        }
        Ok(())
    }
}
