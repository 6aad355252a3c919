//! Lớp tải dữ liệu của dashboard: client REST, bộ điều phối trạng thái theo
//! miền và phần ghép các miền thành một dashboard.

mod dashboard;
mod endpoint;
mod error;
mod http;
mod state;

pub use dashboard::Dashboard;
pub use endpoint::{Endpoint, PatientFilter};
pub use error::FetchError;
pub use http::{ApiClient, JsonSource};
pub use state::{DomainState, Ticket, ViewState, FALLBACK_ERROR};
