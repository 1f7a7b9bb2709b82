//! In-process fake of the CurseForge v1 API used by the integration tests.
//!
//! Every request is recorded (path, query, `Host`) before routing, so
//! tests can assert exactly which endpoints a pass touched.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::HOST;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use tokio::sync::oneshot;

use gamekeeper_mods::core::config::ModsSettings;

pub const TEST_API_KEY: &str = "$2a$10$integrationtestkey";

#[derive(Debug, Clone)]
pub struct MockFile {
    pub id: u64,
    pub name: String,
    pub date: String,
    pub release_type: u8,
    pub body: Vec<u8>,
    advertised_sha1: Option<String>,
}

impl MockFile {
    pub fn release(id: u64, name: &str, date: &str, body: &[u8]) -> Self {
        Self {
            id,
            name: name.to_string(),
            date: date.to_string(),
            release_type: 1,
            body: body.to_vec(),
            advertised_sha1: None,
        }
    }

    pub fn alpha(id: u64, name: &str, date: &str, body: &[u8]) -> Self {
        Self {
            release_type: 3,
            ..Self::release(id, name, date, body)
        }
    }

    /// Advertise a digest the served body does not have.
    pub fn with_wrong_hash(mut self) -> Self {
        self.advertised_sha1 = Some("0".repeat(40));
        self
    }

    fn sha1(&self) -> String {
        self.advertised_sha1
            .clone()
            .unwrap_or_else(|| hex::encode(Sha1::digest(&self.body)))
    }

    fn to_json(&self, mod_id: u64) -> Value {
        json!({
            "id": self.id,
            "modId": mod_id,
            "fileName": self.name,
            "displayName": self.name,
            "fileDate": self.date,
            "releaseType": self.release_type,
            "isAvailable": true,
            "hashes": [{"value": self.sha1(), "algo": 1}],
            "gameVersions": ["Early Access"],
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogData {
    slugs: Vec<(String, u64)>,
    files: HashMap<u64, Vec<MockFile>>,
    reject_key: bool,
    cdn_base: Option<String>,
}

impl CatalogData {
    pub fn with_slug(mut self, slug: &str, mod_id: u64) -> Self {
        self.slugs.push((slug.to_string(), mod_id));
        self
    }

    pub fn with_file(mut self, mod_id: u64, file: MockFile) -> Self {
        self.files.entry(mod_id).or_default().push(file);
        self
    }

    /// Answer the key probe with 403.
    pub fn rejecting_key(mut self) -> Self {
        self.reject_key = true;
        self
    }

    /// Hand out download URLs on this base instead of the server itself.
    pub fn with_cdn_base(mut self, base: &str) -> Self {
        self.cdn_base = Some(base.to_string());
        self
    }

    fn find(&self, mod_id: u64, file_id: u64) -> Option<&MockFile> {
        self.files.get(&mod_id)?.iter().find(|f| f.id == file_id)
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
}

struct Shared {
    data: CatalogData,
    base_url: String,
    requests: Mutex<Vec<Recorded>>,
}

pub struct FakeCatalog {
    shared: Arc<Shared>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _task: tokio::task::JoinHandle<()>,
}

impl FakeCatalog {
    pub async fn start(data: CatalogData) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake catalog");
        let addr: SocketAddr = listener.local_addr().expect("local addr");

        let shared = Arc::new(Shared {
            data,
            base_url: format!("http://{addr}"),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/games", get(games))
            .route("/v1/mods/search", get(search))
            .route("/v1/mods/files/:file_id", get(file_by_id))
            .route("/v1/mods/:mod_id/files", get(list_files))
            .route("/v1/mods/:mod_id/files/:file_id", get(file))
            .route("/v1/mods/:mod_id/files/:file_id/download-url", get(download_url))
            .route("/downloads/:mod_id/:file_id/:name", get(download))
            .layer(middleware::from_fn_with_state(shared.clone(), record))
            .with_state(shared.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            shared,
            shutdown_tx: Some(shutdown_tx),
            _task: task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.shared.base_url
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn count(&self, predicate: impl Fn(&str) -> bool) -> usize {
        self.paths().iter().filter(|p| predicate(p)).count()
    }

    /// Settings pointing straight at this server.
    pub fn settings(&self) -> ModsSettings {
        ModsSettings {
            api_key: TEST_API_KEY.into(),
            api_base: self.base_url().to_string(),
            http_timeout: Duration::from_secs(5),
            download_timeout: Duration::from_secs(5),
            ..ModsSettings::default()
        }
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn record(State(shared): State<Arc<Shared>>, req: Request, next: Next) -> Response {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    shared.requests.lock().unwrap().push(Recorded {
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        host,
    });
    next.run(req).await
}

async fn games(State(shared): State<Arc<Shared>>) -> Response {
    if shared.data.reject_key {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({"data": [{"id": 70216, "name": "Hytale"}]})).into_response()
}

async fn search(
    State(shared): State<Arc<Shared>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let slug = query.get("slug").cloned().unwrap_or_default();
    let hits: Vec<Value> = shared
        .data
        .slugs
        .iter()
        .filter(|(s, _)| *s == slug)
        .map(|(s, id)| json!({"id": id, "slug": s}))
        .collect();
    Json(json!({ "data": hits }))
}

async fn list_files(
    State(shared): State<Arc<Shared>>,
    Path(mod_id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let index: usize = query.get("index").and_then(|v| v.parse().ok()).unwrap_or(0);
    let size: usize = query.get("pageSize").and_then(|v| v.parse().ok()).unwrap_or(50);
    let page: Vec<Value> = shared
        .data
        .files
        .get(&mod_id)
        .map(|files| {
            files
                .iter()
                .skip(index)
                .take(size)
                .map(|f| f.to_json(mod_id))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "data": page }))
}

async fn file(
    State(shared): State<Arc<Shared>>,
    Path((mod_id, file_id)): Path<(u64, u64)>,
) -> Response {
    match shared.data.find(mod_id, file_id) {
        Some(f) => Json(json!({ "data": f.to_json(mod_id) })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn file_by_id(State(shared): State<Arc<Shared>>, Path(file_id): Path<u64>) -> Response {
    let found = shared.data.files.iter().find_map(|(mod_id, files)| {
        files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.to_json(*mod_id))
    });
    match found {
        Some(f) => Json(json!({ "data": f })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn download_url(
    State(shared): State<Arc<Shared>>,
    Path((mod_id, file_id)): Path<(u64, u64)>,
) -> Response {
    let Some(f) = shared.data.find(mod_id, file_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let base = shared.data.cdn_base.as_deref().unwrap_or(&shared.base_url);
    let url = format!("{base}/downloads/{mod_id}/{file_id}/{}", f.name);
    Json(json!({ "data": url })).into_response()
}

async fn download(
    State(shared): State<Arc<Shared>>,
    Path((mod_id, file_id, _name)): Path<(u64, u64, String)>,
) -> Response {
    match shared.data.find(mod_id, file_id) {
        Some(f) => f.body.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
