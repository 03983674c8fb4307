// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use warp::Filter;
use warp::http::{Response, StatusCode};
use warp::hyper::Body;

pub const TOKEN: &str = "mock_access_token_12345";

/// Entries served per `list_folder` page, small to force pagination
const PAGE_SIZE: usize = 2;

#[derive(Debug, Clone)]
enum Entry {
    Folder,
    File { content: Vec<u8>, rev: u64 },
}

#[derive(Debug, Default)]
struct State {
    /// Lower-cased path -> (display path, entry)
    entries: BTreeMap<String, (String, Entry)>,
    next_rev: u64,
    requests: Vec<String>,
}

impl State {
    fn metadata(display: &str, entry: &Entry) -> Value {
        let name = display.rsplit('/').next().unwrap_or_default();
        match entry {
            Entry::Folder => json!({
                ".tag": "folder",
                "name": name,
                "id": format!("id:{name}"),
                "path_lower": display.to_lowercase(),
                "path_display": display,
            }),
            Entry::File { content, rev } => json!({
                ".tag": "file",
                "name": name,
                "id": format!("id:{name}"),
                "rev": format!("{rev:012x}"),
                "size": content.len(),
                "client_modified": "2024-05-01T10:00:00Z",
                "server_modified": "2024-05-01T10:00:01Z",
                "path_lower": display.to_lowercase(),
                "path_display": display,
            }),
        }
    }

    fn children(&self, parent: &str) -> Vec<Value> {
        let parent = parent.to_lowercase();
        self.entries
            .iter()
            .filter(|(key, _)| key.rsplit_once('/').map(|(p, _)| p) == Some(parent.as_str()))
            .map(|(_, (display, entry))| Self::metadata(display, entry))
            .collect()
    }
}

/// Mock Dropbox API serving both the RPC and content endpoints
pub struct MockDropboxServer {
    state: Arc<Mutex<State>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

fn reply(status: StatusCode, body: &Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}

fn conflict(summary: &str) -> Response<Body> {
    reply(
        StatusCode::CONFLICT,
        &json!({ "error_summary": summary, "error": { ".tag": "path" } }),
    )
}

impl MockDropboxServer {
    pub fn new() -> Self {
        MockDropboxServer {
            state: Arc::new(Mutex::new(State::default())),
            server_handle: None,
        }
    }

    pub async fn add_folder(&self, path: &str) {
        let mut state = self.state.lock().await;
        _ = state
            .entries
            .insert(path.to_lowercase(), (path.to_string(), Entry::Folder));
    }

    pub async fn add_file(&self, path: &str, content: &[u8]) {
        let mut state = self.state.lock().await;
        state.next_rev += 1;
        let entry = Entry::File {
            content: content.to_vec(),
            rev: state.next_rev,
        };
        _ = state
            .entries
            .insert(path.to_lowercase(), (path.to_string(), entry));
    }

    pub async fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.lock().await.entries.get(&path.to_lowercase()) {
            Some((_, Entry::File { content, .. })) => Some(content.clone()),
            _ => None,
        }
    }

    /// Endpoints hit so far, in order
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }

    /// Start serving on an ephemeral port; returns the `/2/` base URL
    pub fn start(&mut self) -> String {
        let state = self.state.clone();
        let routes = warp::post()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::header::optional::<String>("dropbox-api-arg"))
            .and(warp::body::bytes())
            .and_then(
                move |path: warp::path::FullPath,
                      auth: Option<String>,
                      arg: Option<String>,
                      body: bytes::Bytes| {
                    let state = state.clone();
                    async move {
                        Ok::<_, Infallible>(handle(state, path.as_str(), auth, arg, body).await)
                    }
                },
            );

        let (addr, server): (SocketAddr, _) =
            warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        self.server_handle = Some(tokio::spawn(server));
        format!("http://{addr}/2/")
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}

async fn handle(
    state: Arc<Mutex<State>>,
    path: &str,
    auth: Option<String>,
    arg: Option<String>,
    body: bytes::Bytes,
) -> Response<Body> {
    let endpoint = path.trim_start_matches("/2/").to_string();
    let mut state = state.lock().await;
    state.requests.push(endpoint.clone());

    let expected = format!("Bearer {TOKEN}");
    if auth.as_deref() != Some(expected.as_str()) {
        return reply(
            StatusCode::UNAUTHORIZED,
            &json!({ "error_summary": "invalid_access_token/..", "error": { ".tag": "invalid_access_token" } }),
        );
    }

    // Content endpoints carry their argument in a header
    let raw_arg = match &arg {
        Some(header) => header.clone(),
        None => String::from_utf8_lossy(&body).to_string(),
    };
    let args: Value = match serde_json::from_str(&raw_arg) {
        Ok(value) => value,
        Err(e) => {
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Body::from(format!("Error in call to API function \"{endpoint}\": {e}")))
                .unwrap_or_default();
        }
    };
    let target = args["path"].as_str().unwrap_or_default().to_string();
    let key = target.to_lowercase();

    match endpoint.as_str() {
        "users/get_current_account" => reply(
            StatusCode::OK,
            &json!({
                "account_id": "dbid:AAH4f99T0taONIb-OurWxbNQ6ywGRopQngc",
                "email": "franz@example.com",
                "name": { "display_name": "Franz Ferdinand (Personal)" }
            }),
        ),
        "files/get_metadata" => match state.entries.get(&key) {
            Some((display, entry)) => reply(StatusCode::OK, &State::metadata(display, entry)),
            None => conflict("path/not_found/.."),
        },
        "files/list_folder" => {
            if !key.is_empty() && !matches!(state.entries.get(&key), Some((_, Entry::Folder))) {
                return conflict("path/not_found/..");
            }
            let children = state.children(&key);
            page(&children, 0)
        }
        "files/list_folder/continue" => {
            let cursor = args["cursor"].as_str().unwrap_or_default();
            let Some((parent, offset)) = cursor.rsplit_once('#') else {
                return conflict("reset/..");
            };
            let offset = offset.parse().unwrap_or_default();
            let children = state.children(parent);
            page(&children, offset)
        }
        "files/upload" => {
            if state.entries.contains_key(&key) {
                return conflict("path/conflict/file/..");
            }
            state.next_rev += 1;
            let entry = Entry::File {
                content: body.to_vec(),
                rev: state.next_rev,
            };
            let metadata = State::metadata(&target, &entry);
            _ = state.entries.insert(key, (target, entry));
            reply(StatusCode::OK, &metadata)
        }
        "files/download" => match state.entries.get(&key) {
            Some((_, Entry::File { content, .. })) => Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/octet-stream")
                .body(Body::from(content.clone()))
                .unwrap_or_default(),
            _ => conflict("path/not_found/.."),
        },
        "files/delete_v2" => match state.entries.remove(&key) {
            Some((display, entry)) => {
                reply(StatusCode::OK, &json!({ "metadata": State::metadata(&display, &entry) }))
            }
            None => conflict("path_lookup/not_found/.."),
        },
        "files/create_folder_v2" => {
            if state.entries.contains_key(&key) {
                return conflict("path/conflict/folder/..");
            }
            let metadata = State::metadata(&target, &Entry::Folder);
            _ = state.entries.insert(key, (target, Entry::Folder));
            reply(StatusCode::OK, &json!({ "metadata": metadata }))
        }
        "files/copy_v2" | "files/move_v2" => {
            let from = args["from_path"].as_str().unwrap_or_default().to_lowercase();
            let to = args["to_path"].as_str().unwrap_or_default().to_string();
            if state.entries.contains_key(&to.to_lowercase()) {
                return conflict("to/conflict/file/..");
            }
            let Some((_, entry)) = state.entries.get(&from).cloned() else {
                return conflict("from_lookup/not_found/..");
            };
            if endpoint == "files/move_v2" {
                _ = state.entries.remove(&from);
            }
            let metadata = State::metadata(&to, &entry);
            _ = state.entries.insert(to.to_lowercase(), (to, entry));
            reply(StatusCode::OK, &json!({ "metadata": metadata }))
        }
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Unknown API function"))
            .unwrap_or_default(),
    }
}

fn page(children: &[Value], offset: usize) -> Response<Body> {
    let end = (offset + PAGE_SIZE).min(children.len());
    let parent = children
        .first()
        .and_then(|c| c["path_lower"].as_str())
        .and_then(|p| p.rsplit_once('/'))
        .map(|(parent, _)| parent.to_string())
        .unwrap_or_default();
    reply(
        StatusCode::OK,
        &json!({
            "entries": children.get(offset..end).unwrap_or_default(),
            "cursor": format!("{parent}#{end}"),
            "has_more": end < children.len(),
        }),
    )
}
