// ─── CurseForge Client ───
// GET-only access to the CurseForge v1 API. Responses are `{ "data": T }`
// envelopes; any non-200 status fails the call.

use async_trait::async_trait;
use reqwest::header::HOST;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::api::CatalogApi;
use super::types::CandidateFile;
use crate::core::config::ModsSettings;
use crate::core::error::{ModError, ModResult};
use crate::core::http::build_api_client;

/// Host the API is served from; sent as `Host` when going through a cache.
const CF_API_HOST: &str = "api.curseforge.com";

/// Every issued key carries this bcrypt-style prefix.
const API_KEY_PREFIX: &str = "$2a$10$";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SlugHit {
    id: u64,
    #[serde(default)]
    slug: String,
}

pub struct CurseForgeClient {
    http: Client,
    api_key: String,
    base_url: String,
    /// `Host` override when `base_url` points at a caching proxy.
    host_header: Option<&'static str>,
    game_id: u64,
}

impl std::fmt::Debug for CurseForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurseForgeClient")
            .field("base_url", &self.base_url)
            .field("game_id", &self.game_id)
            .finish_non_exhaustive()
    }
}

impl CurseForgeClient {
    /// Build a client and prove the key works.
    ///
    /// The key format is checked before any request is made; afterwards a
    /// single probe call (`/v1/games`) must succeed.
    pub async fn connect(settings: &ModsSettings) -> ModResult<Self> {
        let api_key = settings.api_key.trim().to_string();
        validate_api_key(&api_key)?;

        let (base_url, host_header) = match &settings.cache_api_url {
            Some(cache) => (cache.trim_end_matches('/').to_string(), Some(CF_API_HOST)),
            None => (settings.api_base.trim_end_matches('/').to_string(), None),
        };

        let http = build_api_client(settings.http_timeout)?;
        let client = Self {
            http,
            api_key,
            base_url,
            host_header,
            game_id: settings.game_id,
        };

        client
            .api_get::<serde_json::Value>("/v1/games", &[])
            .await
            .map_err(|e| ModError::Authentication(format!("API key probe failed: {e}")))?;

        info!("Connected to catalog at {}", client.base_url);
        Ok(client)
    }

    async fn api_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ModResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(query);
        if let Some(host) = self.host_header {
            request = request.header(HOST, host);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ModError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

fn validate_api_key(key: &str) -> ModResult<()> {
    if key.is_empty() {
        return Err(ModError::Authentication("API key is required".into()));
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(ModError::Authentication(format!(
            "invalid API key format, expected prefix '{API_KEY_PREFIX}'"
        )));
    }
    Ok(())
}

#[async_trait]
impl CatalogApi for CurseForgeClient {
    async fn resolve_slug(&self, slug: &str) -> ModResult<u64> {
        let hits: Vec<SlugHit> = self
            .api_get(
                "/v1/mods/search",
                &[
                    ("gameId", self.game_id.to_string()),
                    ("slug", slug.to_string()),
                ],
            )
            .await?;

        hits.iter()
            .find(|hit| hit.slug.eq_ignore_ascii_case(slug))
            .or_else(|| hits.first())
            .map(|hit| hit.id)
            .ok_or_else(|| ModError::NotFound(slug.to_string()))
    }

    async fn list_files(
        &self,
        mod_id: u64,
        index: u32,
        page_size: u32,
    ) -> ModResult<Vec<CandidateFile>> {
        self.api_get(
            &format!("/v1/mods/{mod_id}/files"),
            &[
                ("index", index.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )
        .await
    }

    async fn get_file(&self, mod_id: Option<u64>, file_id: u64) -> ModResult<CandidateFile> {
        let path = match mod_id {
            Some(mod_id) => format!("/v1/mods/{mod_id}/files/{file_id}"),
            None => format!("/v1/mods/files/{file_id}"),
        };
        let mut file: CandidateFile = self.api_get(&path, &[]).await?;
        if file.mod_id.is_none() {
            file.mod_id = mod_id;
        }
        Ok(file)
    }

    async fn download_url(&self, mod_id: u64, file_id: u64) -> ModResult<String> {
        let url: Option<String> = self
            .api_get(&format!("/v1/mods/{mod_id}/files/{file_id}/download-url"), &[])
            .await?;
        url.filter(|u| !u.is_empty()).ok_or_else(|| {
            ModError::NotFound(format!("download URL for mod {mod_id} file {file_id}"))
        })
    }
}
