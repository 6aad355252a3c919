use std::fmt;
use std::str::FromStr;

/// Bộ lọc danh sách bệnh nhân ở màn hình Patients.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PatientFilter {
    #[default]
    All,
    Active,
    /// Trạng thái tuỳ ý, ví dụ `critical`, `discharged`.
    Status(String),
}

impl FromStr for PatientFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Ok(match value.to_ascii_lowercase().as_str() {
            "" | "all" => PatientFilter::All,
            "active" => PatientFilter::Active,
            _ => PatientFilter::Status(value.to_string()),
        })
    }
}

/// Các đường dẫn REST mà dashboard dùng, tương đối với địa chỉ gốc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Overview,
    Departments,
    DepartmentStats,
    DepartmentAppointments(String),
    Patients(PatientFilter),
    Staff,
    Appointments,
    Vitals,
    VitalAlerts(String),
    RecentActivities,
    Demographics,
    GenderDemographics,
    AgeDemographics,
    InsuranceDemographics,
    Inventory,
    Financial,
    FinancialByDepartment,
    FinancialYears,
    MonthlySummary(i32),
    YearlySummary(i32),
}

impl Endpoint {
    /// Các đoạn đường dẫn, chưa mã hoá.
    pub fn segments(&self) -> Vec<String> {
        fn fixed(parts: &[&str]) -> Vec<String> {
            parts.iter().map(|part| part.to_string()).collect()
        }
        match self {
            Endpoint::Overview => fixed(&["overview"]),
            Endpoint::Departments => fixed(&["departments"]),
            Endpoint::DepartmentStats => fixed(&["departments", "stats"]),
            Endpoint::DepartmentAppointments(id) => {
                vec!["departments".into(), id.clone(), "appointments".into()]
            }
            Endpoint::Patients(PatientFilter::All) => fixed(&["patients"]),
            Endpoint::Patients(PatientFilter::Active) => fixed(&["patients", "active"]),
            Endpoint::Patients(PatientFilter::Status(status)) => {
                vec!["patients".into(), "status".into(), status.clone()]
            }
            Endpoint::Staff => fixed(&["staff"]),
            Endpoint::Appointments => fixed(&["appointments"]),
            Endpoint::Vitals => fixed(&["vitals"]),
            Endpoint::VitalAlerts(patient_id) => {
                vec!["vitals".into(), "alerts".into(), patient_id.clone()]
            }
            Endpoint::RecentActivities => fixed(&["activities", "recent"]),
            Endpoint::Demographics => fixed(&["demographics"]),
            Endpoint::GenderDemographics => fixed(&["demographics", "gender"]),
            Endpoint::AgeDemographics => fixed(&["demographics", "age"]),
            Endpoint::InsuranceDemographics => fixed(&["demographics", "insurance"]),
            Endpoint::Inventory => fixed(&["inventory"]),
            Endpoint::Financial => fixed(&["financial"]),
            Endpoint::FinancialByDepartment => fixed(&["financial", "department"]),
            Endpoint::FinancialYears => fixed(&["financials", "years"]),
            Endpoint::MonthlySummary(year) => {
                vec!["financials".into(), "summary".into(), "month".into(), year.to_string()]
            }
            Endpoint::YearlySummary(year) => {
                vec!["financials".into(), "summary".into(), "year".into(), year.to_string()]
            }
        }
    }

    /// Dạng `/departments/stats`, dùng cho log và khoá tra cứu.
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
