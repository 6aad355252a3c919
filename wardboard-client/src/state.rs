use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::http::JsonSource;

/// Thông báo lỗi khi lỗi gốc không có nội dung.
pub const FALLBACK_ERROR: &str = "Failed";

/// Trạng thái hiển thị của một miền dữ liệu.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Giữ nguyên trạng thái, biến đổi dữ liệu khi đã thành công.
    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> ViewState<U> {
        match self {
            ViewState::Idle => ViewState::Idle,
            ViewState::Loading => ViewState::Loading,
            ViewState::Success(data) => ViewState::Success(f(data)),
            ViewState::Error(message) => ViewState::Error(message.clone()),
        }
    }
}

/// Vé của một lần tải. Chỉ vé mới nhất được phép ghi kết quả.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Bộ điều phối trạng thái của một miền dữ liệu.
///
/// Mỗi lần `begin` cấp một vé mới và chuyển sang `Loading`. Kết quả của vé cũ
/// bị bỏ qua, nên phản hồi đến muộn không ghi đè dữ liệu mới hơn.
#[derive(Debug)]
pub struct DomainState<T> {
    name: &'static str,
    generation: AtomicU64,
    state: watch::Sender<ViewState<T>>,
}

impl<T: Clone> DomainState<T> {
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            name,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    pub fn begin(&self) -> Ticket {
        let mut ticket = Ticket(0);
        self.state.send_modify(|state| {
            ticket = Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = ViewState::Loading;
        });
        ticket
    }

    /// Ghi dữ liệu thành công. Trả về `false` nếu vé đã cũ.
    pub fn resolve(&self, ticket: Ticket, data: T) -> bool {
        self.settle(ticket, ViewState::Success(data))
    }

    pub fn reject(&self, ticket: Ticket, err: &FetchError) -> bool {
        self.fail(ticket, err.to_string())
    }

    /// Như `reject`, cho lỗi không đến từ request, ví dụ miền phụ thuộc bị lỗi.
    pub fn fail(&self, ticket: Ticket, message: impl Into<String>) -> bool {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        };
        self.settle(ticket, ViewState::Error(message))
    }

    /// Về lại `Idle` và làm mọi vé đang chờ trở thành vé cũ.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = ViewState::Idle;
        });
    }

    fn settle(&self, ticket: Ticket, next: ViewState<T>) -> bool {
        let mut next = Some(next);
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            match next.take() {
                Some(next) => {
                    *state = next;
                    true
                }
                None => false,
            }
        });
        if !applied {
            debug!(domain = self.name, ticket = ticket.0, "bỏ qua kết quả của lần tải cũ");
        }
        applied
    }

    /// Tải `endpoint`, chuẩn hoá payload và trả về trạng thái sau cùng.
    pub async fn fetch<S, F>(&self, source: &S, endpoint: &Endpoint, normalize: F) -> ViewState<T>
    where
        S: JsonSource,
        F: FnOnce(&Value) -> T,
    {
        let ticket = self.begin();
        debug!(domain = self.name, %endpoint, "đang tải");
        match source.get_json(endpoint).await {
            Ok(raw) => {
                self.resolve(ticket, normalize(&raw));
            }
            Err(err) => {
                warn!(domain = self.name, %endpoint, error = %err, "tải thất bại");
                self.reject(ticket, &err);
            }
        }
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_loads() {
        let state = DomainState::<Vec<u32>>::new("numbers");
        assert_eq!(state.snapshot(), ViewState::Idle);

        let ticket = state.begin();
        assert!(state.snapshot().is_loading());

        assert!(state.resolve(ticket, vec![1, 2]));
        assert_eq!(state.snapshot().data(), Some(&vec![1, 2]));
    }

    #[test]
    fn stale_result_is_discarded() {
        let state = DomainState::<&str>::new("text");
        let first = state.begin();
        let second = state.begin();

        assert!(state.resolve(second, "new"));
        assert!(!state.resolve(first, "old"));
        assert!(!state.reject(first, &FetchError::Http { status: 500 }));
        assert_eq!(state.snapshot(), ViewState::Success("new"));
    }

    #[test]
    fn stale_result_while_loading_keeps_loading() {
        let state = DomainState::<u8>::new("n");
        let first = state.begin();
        let _second = state.begin();
        assert!(!state.resolve(first, 1));
        assert!(state.snapshot().is_loading());
    }

    #[test]
    fn reject_uses_error_message() {
        let state = DomainState::<u8>::new("n");
        let ticket = state.begin();
        state.reject(ticket, &FetchError::Http { status: 500 });
        assert_eq!(state.snapshot().error(), Some("HTTP error! status: 500"));
    }

    #[test]
    fn reload_after_error_clears_it() {
        let state = DomainState::<u8>::new("n");
        let ticket = state.begin();
        state.reject(ticket, &FetchError::Network("refused".into()));
        state.begin();
        assert_eq!(state.snapshot(), ViewState::Loading);
    }

    #[test]
    fn reset_returns_to_idle_and_drops_pending_ticket() {
        let state = DomainState::<u8>::new("n");
        let ticket = state.begin();
        state.reset();
        assert_eq!(state.snapshot(), ViewState::Idle);
        assert!(!state.resolve(ticket, 1));
        assert_eq!(state.snapshot(), ViewState::Idle);
    }

    #[test]
    fn fail_with_blank_message_falls_back() {
        let state = DomainState::<u8>::new("n");
        let ticket = state.begin();
        state.fail(ticket, "  ");
        assert_eq!(state.snapshot().error(), Some(FALLBACK_ERROR));
    }

    #[test]
    fn map_keeps_state_kind() {
        let loaded: ViewState<Vec<u8>> = ViewState::Success(vec![1, 2, 3]);
        assert_eq!(loaded.map(Vec::len), ViewState::Success(3));
        let failed: ViewState<Vec<u8>> = ViewState::Error("x".into());
        assert_eq!(failed.map(Vec::len), ViewState::Error("x".into()));
    }
}
