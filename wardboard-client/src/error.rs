/// Lỗi khi lấy dữ liệu JSON từ backend.
///
/// Payload sai dạng không phải lỗi: bộ chuẩn hoá trả về kết quả rỗng.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Không có phản hồi: từ chối kết nối, lỗi DNS, hết thời gian chờ, body đứt giữa chừng.
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    /// Không dựng được client từ cấu hình.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Http {
                status: status.as_u16(),
            },
            None => FetchError::Network(err.to_string()),
        }
    }
}
