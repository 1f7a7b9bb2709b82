use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::HOST;
use reqwest::{Client, Url};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{ModError, ModResult};
use crate::core::http::build_download_client;

/// Streams artifacts to disk, optionally through a caching proxy.
pub struct Downloader {
    client: Client,
    /// Base URL of a download cache; the original host is sent as `Host`.
    cache_base: Option<String>,
}

impl Downloader {
    pub fn new(timeout: Duration) -> ModResult<Self> {
        Ok(Self {
            client: build_download_client(timeout)?,
            cache_base: None,
        })
    }

    pub fn with_cache(mut self, cache_base: Option<String>) -> Self {
        self.cache_base = cache_base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// Map a CDN URL onto the cache, keeping path and query.
    fn route(&self, url: &str) -> ModResult<(String, Option<String>)> {
        let Some(cache) = &self.cache_base else {
            return Ok((url.to_string(), None));
        };
        let parsed = Url::parse(url).map_err(|e| {
            ModError::Config(format!("cannot route download URL {url} through cache: {e}"))
        })?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(h), Some(p)) => Some(format!("{h}:{p}")),
            (Some(h), None) => Some(h.to_string()),
            (None, _) => None,
        };
        let mut routed = format!("{}{}", cache, parsed.path());
        if let Some(query) = parsed.query() {
            routed.push('?');
            routed.push_str(query);
        }
        Ok((routed, host))
    }

    /// Stream `url` into `dest`, creating parent directories as needed.
    ///
    /// On failure `dest` may hold a partial body; the caller owns cleanup.
    /// Returns the number of bytes written.
    pub async fn download_file(&self, url: &str, dest: &Path) -> ModResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ModError::io(parent, e))?;
        }

        let (target, host) = self.route(url)?;
        let mut request = self.client.get(&target);
        if let Some(host) = host {
            request = request.header(HOST, host);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModError::HttpStatus {
                url: target,
                status: status.as_u16(),
            });
        }

        let mut written = 0u64;
        // Scoped so the handle is closed before the caller renames the file.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| ModError::io(dest, e))?;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ModError::io(dest, e))?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| ModError::io(dest, e))?;
            file.sync_all().await.map_err(|e| ModError::io(dest, e))?;
        }

        debug!("Downloaded {} bytes: {} -> {:?}", written, target, dest);
        Ok(written)
    }
}
