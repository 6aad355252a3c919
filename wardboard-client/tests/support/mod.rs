#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::Notify;
use wardboard_client::{Endpoint, FetchError, JsonSource};

type Reply = Result<Value, FetchError>;

/// Nguồn JSON dựng sẵn theo đường dẫn. Đường dẫn chưa khai báo trả về 404.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thêm một phản hồi cho `path`. Phản hồi cuối cùng được lặp lại.
    pub fn reply(self, path: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok(self, path: &str, body: Value) -> Self {
        self.reply(path, Ok(body))
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        self.reply(path, Err(FetchError::Http { status }))
    }

    /// Mọi request chờ `gate.notify_one()` trước khi trả lời.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, path: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or(Err(FetchError::Http { status: 404 })),
            None => Err(FetchError::Http { status: 404 }),
        }
    }
}

impl JsonSource for ScriptedSource {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let path = endpoint.path();
        self.calls.lock().unwrap().push(path.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.next(&path)
    }
}
