//! Bridge WASM <-> JavaScript cho lớp dữ liệu dashboard.
//!
//! Trang web tự gọi REST API; bridge chỉ chuẩn hoá payload và tính số liệu tổng hợp.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_wasm_bindgen::{from_value, to_value};
use wardboard_core::aggregate;
use wardboard_core::filter::{filter_appointments, AppointmentFilter};
use wardboard_core::{DashboardConfig, DataDomain, TrendOrder, WardboardError};
use wardboard_normalize as normalize;
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsDashboardConfig {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    trend_order: Option<TrendOrder>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(url) = cfg.api_url.filter(|url| !url.trim().is_empty()) {
            base.api_url = url;
        }
        if let Some(secs) = cfg.request_timeout_secs {
            base.request_timeout_secs = secs;
        }
        if let Some(order) = cfg.trend_order {
            base.trend_order = order;
        }
        base
    }
}

fn read_json(input: JsValue, what: &str) -> Result<Value, JsValue> {
    from_value::<Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được {what}: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(DashboardConfig::from(cfg))
        }
        _ => Ok(DashboardConfig::default()),
    }
}

fn write_js<T: Serialize>(output: &T) -> Result<JsValue, JsValue> {
    to_value(output).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn format_wardboard_error(err: WardboardError) -> JsValue {
    JsValue::from_str(&format!("Wardboard error: {err}"))
}

/// Chuẩn hoá payload thô của một miền (`"departments"`, `"financial"`, ...).
#[wasm_bindgen(js_name = normalizePayload)]
pub fn normalize_payload(domain: &str, payload: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let domain: DataDomain = domain.parse().map_err(format_wardboard_error)?;
    let raw = read_json(payload, "payload")?;
    let canonical = normalize::normalize_value(domain, &raw).map_err(format_wardboard_error)?;
    write_js(&canonical)
}

#[wasm_bindgen(js_name = monthlyTrends)]
pub fn monthly_trends(appointments: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let raw = read_json(appointments, "appointments")?;
    let config = read_config(config)?;
    write_js(&monthly_trends_value(&raw, &config))
}

#[wasm_bindgen(js_name = doctorLoads)]
pub fn doctor_loads(appointments: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(appointments, "appointments")?;
    write_js(&aggregate::appointments_by_doctor(&normalize::normalize_appointments(&raw)))
}

#[wasm_bindgen(js_name = doctorOptions)]
pub fn doctor_options(appointments: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(appointments, "appointments")?;
    write_js(&aggregate::doctor_options(&normalize::normalize_appointments(&raw)))
}

/// `today` dạng `YYYY-MM-DD`, lấy từ đồng hồ của trình duyệt.
#[wasm_bindgen(js_name = filterAppointments)]
pub fn filter_appointments_js(
    appointments: JsValue,
    filter: JsValue,
    today: &str,
) -> Result<JsValue, JsValue> {
    let raw = read_json(appointments, "appointments")?;
    let filter = read_json(filter, "bộ lọc")?;
    let filtered = filter_appointments_value(&raw, filter, today)
        .map_err(|err| JsValue::from_str(&err))?;
    write_js(&filtered)
}

#[wasm_bindgen(js_name = financialSummary)]
pub fn financial_summary(records: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(records, "financial")?;
    write_js(&financial_summary_value(&raw))
}

#[wasm_bindgen(js_name = financialByMonth)]
pub fn financial_by_month(records: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(records, "financial")?;
    write_js(&aggregate::financial_by_month(&normalize::normalize_financials(&raw)))
}

#[wasm_bindgen(js_name = departmentRevenue)]
pub fn department_revenue(revenue: JsValue, departments: JsValue) -> Result<JsValue, JsValue> {
    let revenue = read_json(revenue, "revenue")?;
    let departments = read_json(departments, "departments")?;
    write_js(&department_revenue_value(&revenue, &departments))
}

#[wasm_bindgen(js_name = vitalsSummary)]
pub fn vitals_summary(vitals: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(vitals, "vitals")?;
    write_js(&aggregate::vitals_summary(&normalize::normalize_vitals(&raw)))
}

#[wasm_bindgen(js_name = staffDistribution)]
pub fn staff_distribution(departments: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(departments, "departments")?;
    write_js(&aggregate::staff_distribution(&normalize::normalize_departments(&raw)))
}

#[wasm_bindgen(js_name = genderComposition)]
pub fn gender_composition(slices: JsValue) -> Result<JsValue, JsValue> {
    let raw = read_json(slices, "gender")?;
    write_js(&aggregate::gender_composition(
        &normalize::normalize_demographic_slices(&raw),
    ))
}

/// Cấu hình mặc định sau khi gộp các giá trị trang web truyền vào.
#[wasm_bindgen(js_name = resolveConfig)]
pub fn resolve_config(config: Option<JsValue>) -> Result<JsValue, JsValue> {
    write_js(&read_config(config)?)
}

fn monthly_trends_value(raw: &Value, config: &DashboardConfig) -> Vec<aggregate::MonthlyTrend> {
    let appointments = normalize::normalize_appointments(raw);
    aggregate::monthly_appointment_trends(&appointments, config.trend_order)
}

fn filter_appointments_value(
    raw: &Value,
    filter: Value,
    today: &str,
) -> Result<Vec<wardboard_core::Appointment>, String> {
    let filter: AppointmentFilter = if filter.is_null() {
        AppointmentFilter::default()
    } else {
        serde_json::from_value(filter).map_err(|err| format!("Bộ lọc không hợp lệ: {err}"))?
    };
    let today = NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d")
        .map_err(|err| format!("Ngày hiện tại không hợp lệ `{today}`: {err}"))?;
    let appointments = normalize::normalize_appointments(raw);
    Ok(filter_appointments(&appointments, &filter, today))
}

fn financial_summary_value(raw: &Value) -> aggregate::FinancialSummary {
    aggregate::financial_summary(&normalize::normalize_financials(raw))
}

fn department_revenue_value(revenue: &Value, departments: &Value) -> Vec<aggregate::NamedRevenue> {
    aggregate::department_revenue_named(
        &normalize::normalize_department_revenue(revenue),
        &normalize::normalize_departments(departments),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn js_config_overrides_only_given_fields() {
        let cfg: JsDashboardConfig =
            serde_json::from_value(json!({ "trend_order": "first_seen" })).unwrap();
        let config = DashboardConfig::from(cfg);
        assert_eq!(config.trend_order, TrendOrder::FirstSeen);
        assert_eq!(config.api_url, wardboard_core::DEFAULT_API_URL);
    }

    #[test]
    fn blank_api_url_keeps_default() {
        let config = DashboardConfig::from(JsDashboardConfig {
            api_url: Some("  ".into()),
            ..JsDashboardConfig::default()
        });
        assert_eq!(config.api_url, wardboard_core::DEFAULT_API_URL);
    }

    #[test]
    fn trends_follow_configured_order() {
        let raw = json!([
            { "date": "2025-02-01", "status": "Completed" },
            { "date": "2025-01-05", "status": "Scheduled" },
            { "date": "not a date" }
        ]);
        let months: Vec<_> = monthly_trends_value(&raw, &DashboardConfig::default())
            .into_iter()
            .map(|trend| trend.month)
            .collect();
        assert_eq!(months, vec!["Jan 2025", "Feb 2025", "Unknown"]);
    }

    #[test]
    fn filter_by_doctor_and_today() {
        let raw = json!([
            { "doctorName": "Dr. Hoa", "date": "2025-03-10" },
            { "doctorName": "Dr. Hoa", "date": "2025-03-11" },
            { "doctorName": "Dr. Vy", "date": "2025-03-10" }
        ]);
        let filter = json!({ "doctor": "Dr. Hoa", "window": { "kind": "today" } });
        let kept = filter_appointments_value(&raw, filter, "2025-03-10").unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].doctor_name, "Dr. Hoa");
    }

    #[test]
    fn bad_today_is_reported() {
        let err = filter_appointments_value(&json!([]), Value::Null, "10/03/2025").unwrap_err();
        assert!(err.contains("10/03/2025"));
    }

    #[test]
    fn revenue_names_departments() {
        let named = department_revenue_value(
            &json!({ "data": [{ "department_id": "c1", "revenue": 10 }] }),
            &json!([{ "id": "c1", "name": "Cardiology" }]),
        );
        assert_eq!(named[0].department, "Cardiology");
    }

    #[test]
    fn summary_of_unusable_payload_is_zero() {
        let summary = financial_summary_value(&json!("oops"));
        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.margin_display(), "0");
    }
}
