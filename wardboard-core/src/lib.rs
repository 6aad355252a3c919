//! Kiểu dữ liệu chuẩn hóa cho dashboard quản trị bệnh viện.
//!
//! Mọi bản ghi ở đây đã qua bước chuẩn hóa: trường thiếu được thay bằng giá
//! trị mặc định, nên tầng tổng hợp và tầng hiển thị không cần rẽ nhánh theo
//! hình dạng phản hồi của backend.

pub mod aggregate;
pub mod filter;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Địa chỉ API mặc định khi không cấu hình biến môi trường.
pub const DEFAULT_API_URL: &str = "http://localhost:47815/api";

/// Biến môi trường chứa địa chỉ API.
pub const API_URL_ENV: &str = "WARDBOARD_API_URL";

/// Giá trị thay thế cho chuỗi bị thiếu.
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_DOCTOR: &str = "Unknown Doctor";

/// Cấu hình chung của dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Địa chỉ gốc của REST API, ví dụ `http://localhost:47815/api`.
    pub api_url: String,
    /// Thời gian chờ tối đa cho một request (giây).
    pub request_timeout_secs: u64,
    /// Thứ tự các nhóm tháng trong biểu đồ xu hướng lịch hẹn.
    pub trend_order: TrendOrder,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 15,
            trend_order: TrendOrder::Chronological,
        }
    }
}

impl DashboardConfig {
    /// Đọc địa chỉ API từ `WARDBOARD_API_URL`, giữ mặc định cho phần còn lại.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                config.api_url = url.to_string();
            }
        }
        config
    }
}

/// Cách sắp xếp nhóm tháng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendOrder {
    /// Theo thứ tự xuất hiện đầu tiên trong dữ liệu.
    FirstSeen,
    /// Theo thời gian thực, nhóm không xác định nằm cuối.
    #[default]
    Chronological,
}

/// Các miền dữ liệu của dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataDomain {
    Overview,
    Departments,
    DepartmentStats,
    Patients,
    Staff,
    Appointments,
    Vitals,
    Activities,
    Demographics,
    GenderDemographics,
    AgeDemographics,
    InsuranceDemographics,
    Inventory,
    Financial,
    DepartmentRevenue,
}

impl DataDomain {
    pub const ALL: [DataDomain; 15] = [
        DataDomain::Overview,
        DataDomain::Departments,
        DataDomain::DepartmentStats,
        DataDomain::Patients,
        DataDomain::Staff,
        DataDomain::Appointments,
        DataDomain::Vitals,
        DataDomain::Activities,
        DataDomain::Demographics,
        DataDomain::GenderDemographics,
        DataDomain::AgeDemographics,
        DataDomain::InsuranceDemographics,
        DataDomain::Inventory,
        DataDomain::Financial,
        DataDomain::DepartmentRevenue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataDomain::Overview => "overview",
            DataDomain::Departments => "departments",
            DataDomain::DepartmentStats => "department_stats",
            DataDomain::Patients => "patients",
            DataDomain::Staff => "staff",
            DataDomain::Appointments => "appointments",
            DataDomain::Vitals => "vitals",
            DataDomain::Activities => "activities",
            DataDomain::Demographics => "demographics",
            DataDomain::GenderDemographics => "gender_demographics",
            DataDomain::AgeDemographics => "age_demographics",
            DataDomain::InsuranceDemographics => "insurance_demographics",
            DataDomain::Inventory => "inventory",
            DataDomain::Financial => "financial",
            DataDomain::DepartmentRevenue => "department_revenue",
        }
    }
}

impl fmt::Display for DataDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataDomain {
    type Err = WardboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase().replace('-', "_");
        DataDomain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == wanted)
            .ok_or_else(|| WardboardError::UnknownDomain(value.to_string()))
    }
}

/// Số lượng nhân sự theo nhóm của một khoa.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StaffCounts {
    pub doctors: u32,
    pub nurses: u32,
    pub support: u32,
}

impl StaffCounts {
    /// Tổng ba nhóm, chặn ở `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.doctors
            .saturating_add(self.nurses)
            .saturating_add(self.support)
    }
}

/// Khoa điều trị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub total_patients: u32,
    pub capacity: u32,
    /// Tỷ lệ lấp đầy, luôn nằm trong 0..=100.
    pub current_occupancy: u8,
    pub staff_counts: StaffCounts,
    /// Luôn bằng `staff_counts.total()`.
    pub total_staff: u32,
    pub head: String,
    /// Số lịch hẹn backend gắn sẵn trong bản ghi khoa (nếu có).
    pub total_appointments: u32,
}

impl Default for Department {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: "Department".to_string(),
            total_patients: 0,
            capacity: 0,
            current_occupancy: 0,
            staff_counts: StaffCounts::default(),
            total_staff: 0,
            head: NOT_AVAILABLE.to_string(),
            total_appointments: 0,
        }
    }
}

impl Department {
    /// Gán số nhân sự và cập nhật tổng cho khớp.
    pub fn with_staff(mut self, staff: StaffCounts) -> Self {
        self.staff_counts = staff;
        self.total_staff = staff.total();
        self
    }
}

/// Mức độ nặng của bệnh nhân.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatientSeverity {
    Critical,
    Guarded,
    Stable,
    Other(String),
}

impl PatientSeverity {
    pub fn as_str(&self) -> &str {
        match self {
            PatientSeverity::Critical => "Critical",
            PatientSeverity::Guarded => "Guarded",
            PatientSeverity::Stable => "Stable",
            PatientSeverity::Other(label) => label,
        }
    }
}

impl From<String> for PatientSeverity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Critical" => PatientSeverity::Critical,
            "Guarded" => PatientSeverity::Guarded,
            "Stable" => PatientSeverity::Stable,
            _ => PatientSeverity::Other(value),
        }
    }
}

impl From<PatientSeverity> for String {
    fn from(value: PatientSeverity) -> Self {
        value.as_str().to_string()
    }
}

/// Chỉ số sống gắn trong hồ sơ bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientVitals {
    pub blood_pressure: String,
    pub heart_rate: u32,
    pub temperature: f64,
    pub oxygen_saturation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub department: String,
    pub doctor: String,
    pub status: String,
    pub severity: PatientSeverity,
    pub vitals: Option<PatientVitals>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: UNKNOWN.to_string(),
            age: None,
            gender: NOT_AVAILABLE.to_string(),
            department: NOT_AVAILABLE.to_string(),
            doctor: NOT_AVAILABLE.to_string(),
            status: UNKNOWN.to_string(),
            severity: PatientSeverity::Other(UNKNOWN.to_string()),
            vitals: None,
        }
    }
}

/// Trạng thái lịch hẹn; so khớp phân biệt hoa thường.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Other(label) => label,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Scheduled" => AppointmentStatus::Scheduled,
            "Completed" => AppointmentStatus::Completed,
            "Cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Other(value),
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(value: &str) -> Self {
        AppointmentStatus::from(value.to_string())
    }
}

impl From<AppointmentStatus> for String {
    fn from(value: AppointmentStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Lịch hẹn khám.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub doctor_name: String,
    /// Thời điểm hẹn, giữ nguyên múi giờ của bản ghi.
    pub date: Option<DateTime<FixedOffset>>,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AppointmentStatus,
}

impl Default for Appointment {
    fn default() -> Self {
        Self {
            id: String::new(),
            patient_name: UNKNOWN.to_string(),
            doctor_name: UNKNOWN_DOCTOR.to_string(),
            date: None,
            time: NOT_AVAILABLE.to_string(),
            kind: "Consultation".to_string(),
            status: AppointmentStatus::Scheduled,
        }
    }
}

/// Chỉ số sống đang theo dõi của một bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VitalSign {
    pub patient_id: String,
    pub patient_name: String,
    pub blood_pressure: String,
    pub heart_rate: u32,
    pub temperature: f64,
    pub oxygen_saturation: u32,
    pub active_alerts: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for VitalSign {
    fn default() -> Self {
        Self {
            patient_id: String::new(),
            patient_name: UNKNOWN.to_string(),
            blood_pressure: NOT_AVAILABLE.to_string(),
            heart_rate: 0,
            temperature: 0.0,
            oxygen_saturation: 0,
            active_alerts: 0,
            last_updated: None,
        }
    }
}

impl VitalSign {
    /// Bệnh nhân có ít nhất một cảnh báo đang mở.
    pub fn is_critical(&self) -> bool {
        self.active_alerts > 0
    }
}

/// Doanh thu và chi phí của một kỳ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub period: String,
    /// Ngày đại diện cho kỳ, dùng cho biểu đồ theo tháng.
    pub date: Option<NaiveDate>,
    pub revenue: f64,
    pub expenses: f64,
}

impl Default for FinancialRecord {
    fn default() -> Self {
        Self {
            period: NOT_AVAILABLE.to_string(),
            date: None,
            revenue: 0.0,
            expenses: 0.0,
        }
    }
}

impl FinancialRecord {
    pub fn net_profit(&self) -> f64 {
        self.revenue - self.expenses
    }

    pub fn margin(&self) -> f64 {
        margin_percent(self.revenue, self.net_profit())
    }
}

/// Tỷ suất lợi nhuận (%) làm tròn một chữ số thập phân; 0 khi doanh thu không dương.
pub fn margin_percent(revenue: f64, net_profit: f64) -> f64 {
    if revenue > 0.0 {
        (net_profit / revenue * 1000.0).round() / 10.0
    } else {
        0.0
    }
}

/// Doanh thu theo khoa; `department_id = None` nghĩa là toàn viện.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRevenue {
    pub department_id: Option<String>,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    Good,
    Low,
}

impl StockStatus {
    pub fn from_levels(current: u32, minimum: u32) -> Self {
        if current >= minimum {
            StockStatus::Good
        } else {
            StockStatus::Low
        }
    }
}

/// Vật tư y tế trong kho.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item: String,
    pub current: u32,
    pub minimum: u32,
    pub status: StockStatus,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EquipmentStatus {
    Operational,
    UnderMaintenance,
    OutOfService,
    Other(String),
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentStatus::Operational => "Operational",
            EquipmentStatus::UnderMaintenance => "Under Maintenance",
            EquipmentStatus::OutOfService => "Out of Service",
            EquipmentStatus::Other(label) => label,
        }
    }
}

impl From<String> for EquipmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Operational" => EquipmentStatus::Operational,
            "Under Maintenance" => EquipmentStatus::UnderMaintenance,
            "Out of Service" => EquipmentStatus::OutOfService,
            _ => EquipmentStatus::Other(value),
        }
    }
}

impl From<EquipmentStatus> for String {
    fn from(value: EquipmentStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Thiết bị y tế và lịch bảo trì.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub name: String,
    pub status: EquipmentStatus,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
}

/// Toàn bộ kho: vật tư và thiết bị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub supplies: Vec<InventoryItem>,
    pub equipment: Vec<EquipmentItem>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.supplies.is_empty() && self.equipment.is_empty()
    }

    /// Vật tư dưới mức tối thiểu.
    pub fn low_stock(&self) -> impl Iterator<Item = &InventoryItem> {
        self.supplies
            .iter()
            .filter(|item| item.status == StockStatus::Low)
    }
}

/// Nhân viên y tế.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub status: String,
    pub shift: String,
}

impl Default for StaffMember {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: UNKNOWN.to_string(),
            role: NOT_AVAILABLE.to_string(),
            department: NOT_AVAILABLE.to_string(),
            status: UNKNOWN.to_string(),
            shift: "Day Shift".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityPriority {
    High,
    Medium,
    Low,
}

/// Hoạt động gần đây trong bệnh viện.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub priority: ActivityPriority,
}

/// Một lát cắt nhân khẩu học (giới tính, nhóm tuổi, bảo hiểm).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DemographicSlice {
    pub label: String,
    pub percentage: f64,
}

/// Nhân khẩu học tổng hợp từ `/demographics`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Demographics {
    pub gender: Vec<DemographicSlice>,
    pub age: Vec<DemographicSlice>,
    pub insurance: Vec<DemographicSlice>,
}

/// Lỗi chung của tầng dữ liệu.
#[derive(Debug, thiserror::Error)]
pub enum WardboardError {
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Miền dữ liệu không hỗ trợ: {0}")]
    UnknownDomain(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_total_tracks_counts() {
        let dept = Department::default().with_staff(StaffCounts {
            doctors: 4,
            nurses: 10,
            support: 3,
        });
        assert_eq!(dept.total_staff, 17);
        assert_eq!(dept.total_staff, dept.staff_counts.total());

        let huge = StaffCounts {
            doctors: u32::MAX,
            nurses: 5,
            support: 1,
        };
        assert_eq!(huge.total(), u32::MAX);
    }

    #[test]
    fn domain_parses_loose_spelling() {
        assert_eq!(
            "department-revenue".parse::<DataDomain>().unwrap(),
            DataDomain::DepartmentRevenue
        );
        assert_eq!(" Vitals ".parse::<DataDomain>().unwrap(), DataDomain::Vitals);
        assert!("billing".parse::<DataDomain>().is_err());
    }

    #[test]
    fn status_round_trips_unknown_labels() {
        let status = AppointmentStatus::from("No Show");
        assert_eq!(status, AppointmentStatus::Other("No Show".to_string()));
        assert_eq!(String::from(status), "No Show");
        assert_eq!(AppointmentStatus::from("completed").as_str(), "completed");
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        assert_eq!(margin_percent(0.0, -50.0), 0.0);
        assert_eq!(margin_percent(1500.0, 1000.0), 66.7);
    }

    #[test]
    fn stock_status_follows_minimum() {
        assert_eq!(StockStatus::from_levels(10, 10), StockStatus::Good);
        assert_eq!(StockStatus::from_levels(9, 10), StockStatus::Low);
    }
}
