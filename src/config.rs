// Runtime configuration, read once from the environment at startup and
// passed by reference to every component afterwards.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_UPLOAD_URL: &str = "https://pixeldrain.com/api/file";
const DEFAULT_VIEW_URL: &str = "https://pixeldrain.com/api/file";
const DEFAULT_VISIT_INTERVAL_DAYS: u32 = 120;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Config {
    /// POST target for uploads.
    pub upload_url: String,
    /// Base for keepalive requests and view links, without trailing slash.
    pub view_url: String,
    /// Days after which a recorded file is visited again.
    pub visit_interval_days: u32,
    /// Location of the persisted id -> timestamp mapping.
    pub state_file: PathBuf,
    /// Password half of the Basic credentials. May be empty.
    pub api_key: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("upload_url", &self.upload_url)
            .field("view_url", &self.view_url)
            .field("visit_interval_days", &self.visit_interval_days)
            .field("state_file", &self.state_file)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset and
    /// empty values fall back to defaults; set but unparseable numbers
    /// are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upload_url = get("PIXELDRAIN_UPLOAD_URL").unwrap_or_else(|| DEFAULT_UPLOAD_URL.into());
        let view_url = get("PIXELDRAIN_VIEW_URL")
            .unwrap_or_else(|| DEFAULT_VIEW_URL.into())
            .trim_end_matches('/')
            .to_string();

        let visit_interval_days = match get("VISIT_INTERVAL") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("VISIT_INTERVAL must be a whole number of days, got {v:?}"))?,
            None => DEFAULT_VISIT_INTERVAL_DAYS,
        };

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a number of seconds, got {v:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let state_file = match get("JSON_FILE") {
            Some(p) => PathBuf::from(p),
            None => default_state_file(),
        };

        Ok(Config {
            upload_url,
            view_url,
            visit_interval_days,
            state_file,
            api_key: lookup("API_KEY").unwrap_or_default(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// `<data dir>/pxlkeep/files.json`, or the working directory when the
/// platform has no data dir.
fn default_state_file() -> PathBuf {
    let dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join("pxlkeep").join("files.json")
}
