use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};
use wardboard_core::DashboardConfig;

use crate::endpoint::Endpoint;
use crate::error::FetchError;

/// Nguồn JSON thô cho các bộ điều phối.
///
/// `ApiClient` là cài đặt thật; test dùng nguồn dựng sẵn.
pub trait JsonSource: Send + Sync {
    fn get_json(&self, endpoint: &Endpoint) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Client GET cho REST API của bệnh viện.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(config.api_url.trim())
            .map_err(|e| FetchError::Config(format!("{}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Config(format!(
                "{} cannot be used as a base URL",
                config.api_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Nối đường dẫn của endpoint vào địa chỉ gốc, bỏ dấu `/` thừa ở cuối.
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }
}

impl JsonSource for ApiClient {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let url = self.url_for(endpoint)?;
        debug!(%url, "GET");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "backend trả về lỗi");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(%url, error = %e, "body không phải JSON, coi như rỗng");
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> ApiClient {
        let config = DashboardConfig {
            api_url: api_url.to_string(),
            ..DashboardConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn joins_base_and_endpoint() {
        let api = client("http://localhost:47815/api");
        assert_eq!(
            api.url_for(&Endpoint::DepartmentStats).unwrap().as_str(),
            "http://localhost:47815/api/departments/stats"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let api = client("http://localhost:47815/api/");
        assert_eq!(
            api.url_for(&Endpoint::Overview).unwrap().as_str(),
            "http://localhost:47815/api/overview"
        );
    }

    #[test]
    fn dynamic_segments_are_encoded() {
        let api = client("http://localhost:47815/api");
        let url = api
            .url_for(&Endpoint::Patients("in treatment".parse().unwrap()))
            .unwrap();
        assert_eq!(url.path(), "/api/patients/status/in%20treatment");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let config = DashboardConfig {
            api_url: "not a url".into(),
            ..DashboardConfig::default()
        };
        assert!(matches!(ApiClient::new(&config), Err(FetchError::Config(_))));
    }
}
