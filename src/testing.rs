//! Scripted transport used by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::errors::{ApiError, AppResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};

enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) {
        self.respond_bytes(status, body.to_string().into_bytes());
    }

    pub fn respond_bytes(&self, status: u16, body: Vec<u8>) {
        self.script.lock().unwrap().push_back(Scripted::Respond(ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        }));
    }

    pub fn fail(&self, message: &str) {
        self.script.lock().unwrap().push_back(Scripted::Fail(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::with_transport(ClientConfig::default(), self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        self.seen.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ApiError::Transport(message)),
            None => panic!("unscripted request: {} {}", request.method, request.path),
        }
    }
}

pub fn user_json(id: u64, username: &str, level: &str) -> serde_json::Value {
    let rank = level.parse::<crate::models::UserLevel>().unwrap().rank().value();
    serde_json::json!({
        "id": id,
        "username": username,
        "full_name": format!("{} Full", username),
        "email": format!("{}@example.com", username),
        "is_admin": rank <= 2,
        "is_staff": rank <= 1,
        "is_superuser": rank == 0,
        "level": level,
        "rank": rank,
        "storage_rel_path": format!("users/{}", id),
    })
}

pub fn file_json(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "original_name": name,
        "size_bytes": 1024,
        "comment": null,
        "uploaded": "2024-01-01T00:00:00+00:00",
        "last_downloaded": null,
        "share_url": null,
        "share_created": null,
    })
}

/// Download sink that keeps saved files in memory.
#[derive(Default)]
pub struct MemorySink {
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl crate::download::DownloadSink for MemorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> AppResult<()> {
        if self.fail {
            return Err(ApiError::Io(std::io::Error::other("disk full")));
        }
        self.saved.lock().unwrap().push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}
