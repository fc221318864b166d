use std::{env, path::Path, path::PathBuf, time::Duration};
use tokio::fs;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Origin the questionnaire page was served from.
    pub base_url: String,
    pub page_path: PathBuf,
    /// How long the headless host keeps running after unload so queued
    /// best-effort events can leave the process.
    pub shutdown_grace: Duration,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("TRACKER_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let page_path = lookup("TRACKER_PAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("page.html"));
        let shutdown_grace = lookup("TRACKER_SHUTDOWN_GRACE_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(250));

        Self {
            base_url,
            page_path,
            shutdown_grace,
        }
    }
}

pub async fn load_page(path: &Path) -> Result<String, std::io::Error> {
    fs::read_to_string(path).await
}
