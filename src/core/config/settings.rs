use std::time::Duration;

use tracing::warn;

use super::values::ConfigValues;
use crate::core::catalog::ReleaseChannel;

pub const DEFAULT_API_BASE: &str = "https://api.curseforge.com";

/// Hytale on CurseForge.
pub const DEFAULT_GAME_ID: u64 = 70216;

pub const KEY_API_KEY: &str = "CURSEFORGE_API_KEY";
pub const KEY_API_KEY_SRC: &str = "CURSEFORGE_API_KEY_SRC";
pub const KEY_API_BASE: &str = "CURSEFORGE_API_BASE";
pub const KEY_GAME_ID: &str = "CURSEFORGE_GAME_ID";
pub const KEY_RELEASE_CHANNEL: &str = "CURSEFORGE_RELEASE_CHANNEL";
pub const KEY_GAME_VERSION_FILTER: &str = "CURSEFORGE_GAME_VERSION_FILTER";
pub const KEY_AUTO_UPDATE: &str = "CURSEFORGE_AUTO_UPDATE";
pub const KEY_FAIL_ON_ERROR: &str = "CURSEFORGE_FAIL_ON_ERROR";
pub const KEY_PRUNE: &str = "CURSEFORGE_PRUNE";
pub const KEY_CACHE_API_URL: &str = "CURSEFORGE_HTTP_CACHE_API_URL";
pub const KEY_CACHE_DOWNLOAD_URL: &str = "CURSEFORGE_HTTP_CACHE_DOWNLOAD_URL";
pub const KEY_HTTP_TIMEOUT_SECS: &str = "CURSEFORGE_HTTP_TIMEOUT_SECS";
pub const KEY_DOWNLOAD_TIMEOUT_SECS: &str = "CURSEFORGE_DOWNLOAD_TIMEOUT_SECS";
pub const KEY_MODS: &str = "CURSEFORGE_MODS";

const DEFAULT_HTTP_TIMEOUT_SECS: i64 = 30;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: i64 = 600;

/// Settings threaded into the catalog client, installer and reconciler.
#[derive(Debug, Clone)]
pub struct ModsSettings {
    pub api_key: String,
    pub api_base: String,
    pub game_id: u64,
    pub release_channel: ReleaseChannel,
    pub game_version_filter: Option<String>,
    /// When false, installed references are trusted without a catalog check.
    pub auto_update: bool,
    pub fail_on_error: bool,
    pub prune: bool,
    pub cache_api_url: Option<String>,
    pub cache_download_url: Option<String>,
    pub http_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ModsSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            game_id: DEFAULT_GAME_ID,
            release_channel: ReleaseChannel::Release,
            game_version_filter: None,
            auto_update: true,
            fail_on_error: false,
            prune: false,
            cache_api_url: None,
            cache_download_url: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS as u64),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS as u64),
        }
    }
}

impl ModsSettings {
    pub fn from_values(values: &ConfigValues) -> Self {
        let mut api_key = values.get_string(KEY_API_KEY, "");
        if let Some(src) = values.get_opt_string(KEY_API_KEY_SRC) {
            match std::fs::read_to_string(&src) {
                Ok(raw) => api_key = raw.trim().to_string(),
                Err(e) => warn!("Cannot read API key from {}: {}", src, e),
            }
        }

        let channel_raw = values.get_string(KEY_RELEASE_CHANNEL, "release");
        let release_channel = channel_raw.parse().unwrap_or_else(|e| {
            warn!("{}, falling back to release", e);
            ReleaseChannel::Release
        });

        Self {
            api_key,
            api_base: values.get_string(KEY_API_BASE, DEFAULT_API_BASE),
            game_id: positive(values.get_int(KEY_GAME_ID, DEFAULT_GAME_ID as i64))
                .unwrap_or(DEFAULT_GAME_ID),
            release_channel,
            game_version_filter: values.get_opt_string(KEY_GAME_VERSION_FILTER),
            auto_update: values.get_bool(KEY_AUTO_UPDATE, true),
            fail_on_error: values.get_bool(KEY_FAIL_ON_ERROR, false),
            prune: values.get_bool(KEY_PRUNE, false),
            cache_api_url: values.get_opt_string(KEY_CACHE_API_URL),
            cache_download_url: values.get_opt_string(KEY_CACHE_DOWNLOAD_URL),
            http_timeout: seconds(values.get_int(KEY_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS))
                .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS as u64)),
            download_timeout: seconds(
                values.get_int(KEY_DOWNLOAD_TIMEOUT_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            )
            .unwrap_or(Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS as u64)),
        }
    }
}

fn positive(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}

fn seconds(value: i64) -> Option<Duration> {
    positive(value).map(Duration::from_secs)
}
