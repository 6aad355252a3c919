use futures_util::future::join_all;
use tracing::{info, warn};
use wardboard_core::aggregate::{
    self, DepartmentAppointments, DoctorLoad, FinancialSummary, GenderComposition, MonthlyFinance,
    MonthlyTrend, NamedRevenue, VitalsSummary,
};
use wardboard_core::{
    Activity, Appointment, DashboardConfig, DemographicSlice, Demographics, Department,
    DepartmentRevenue, FinancialRecord, Inventory, Patient, StaffCounts, StaffMember, VitalSign,
};
use wardboard_normalize::{self as normalize, records, OverviewStats};

use crate::endpoint::{Endpoint, PatientFilter};
use crate::error::FetchError;
use crate::http::{ApiClient, JsonSource};
use crate::state::{DomainState, ViewState};

/// Toàn bộ dữ liệu của dashboard, mỗi miền một bộ điều phối.
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    config: DashboardConfig,
    pub overview: DomainState<OverviewStats>,
    pub department_stats: DomainState<OverviewStats>,
    pub departments: DomainState<Vec<Department>>,
    pub department_appointments: DomainState<Vec<DepartmentAppointments>>,
    pub patients: DomainState<Vec<Patient>>,
    pub staff: DomainState<Vec<StaffMember>>,
    pub appointments: DomainState<Vec<Appointment>>,
    pub vitals: DomainState<Vec<VitalSign>>,
    pub activities: DomainState<Vec<Activity>>,
    pub demographics: DomainState<Demographics>,
    pub gender: DomainState<Vec<DemographicSlice>>,
    pub age: DomainState<Vec<DemographicSlice>>,
    pub insurance: DomainState<Vec<DemographicSlice>>,
    pub inventory: DomainState<Inventory>,
    pub financial: DomainState<Vec<FinancialRecord>>,
    pub department_revenue: DomainState<Vec<DepartmentRevenue>>,
    pub financial_years: DomainState<Vec<i32>>,
    /// Kết quả của lần tải tóm tắt theo tháng hoặc theo năm gần nhất.
    pub period_summary: DomainState<Vec<FinancialRecord>>,
    pub patient_alerts: DomainState<Vec<Activity>>,
}

impl Dashboard<ApiClient> {
    /// Dựng dashboard nói chuyện với REST API trong `config`.
    pub fn connect(config: DashboardConfig) -> Result<Self, FetchError> {
        let client = ApiClient::new(&config)?;
        Ok(Self::new(client, config))
    }
}

impl<S: JsonSource> Dashboard<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self {
            source,
            config,
            overview: DomainState::new("overview"),
            department_stats: DomainState::new("department_stats"),
            departments: DomainState::new("departments"),
            department_appointments: DomainState::new("department_appointments"),
            patients: DomainState::new("patients"),
            staff: DomainState::new("staff"),
            appointments: DomainState::new("appointments"),
            vitals: DomainState::new("vitals"),
            activities: DomainState::new("activities"),
            demographics: DomainState::new("demographics"),
            gender: DomainState::new("gender"),
            age: DomainState::new("age"),
            insurance: DomainState::new("insurance"),
            inventory: DomainState::new("inventory"),
            financial: DomainState::new("financial"),
            department_revenue: DomainState::new("department_revenue"),
            financial_years: DomainState::new("financial_years"),
            period_summary: DomainState::new("period_summary"),
            patient_alerts: DomainState::new("patient_alerts"),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Tải song song mọi miền. Một miền lỗi không chặn các miền khác.
    pub async fn load_all(&self, patients: &PatientFilter) {
        info!(api_url = %self.config.api_url, "tải toàn bộ dashboard");
        tokio::join!(
            self.load_overview(),
            async {
                self.load_departments().await;
                self.load_department_appointments().await;
            },
            self.load_department_stats(),
            self.load_patients(patients),
            self.load_staff(),
            self.load_appointments(),
            self.load_vitals(),
            self.load_activities(),
            self.load_demographics(),
            self.load_inventory(),
            self.load_financial(),
            self.load_department_revenue(),
        );
    }

    pub async fn load_overview(&self) -> ViewState<OverviewStats> {
        self.overview
            .fetch(&self.source, &Endpoint::Overview, normalize::normalize_overview)
            .await
    }

    pub async fn load_department_stats(&self) -> ViewState<OverviewStats> {
        self.department_stats
            .fetch(&self.source, &Endpoint::DepartmentStats, normalize::normalize_overview)
            .await
    }

    pub async fn load_departments(&self) -> ViewState<Vec<Department>> {
        self.departments
            .fetch(&self.source, &Endpoint::Departments, normalize::normalize_departments)
            .await
    }

    /// Đếm lịch hẹn của từng khoa. Chỉ chạy khi danh sách khoa đã tải xong;
    /// khoa nào lỗi thì tính là 0.
    ///
    /// Khi danh sách khoa lỗi, miền này nhận cùng thông báo lỗi; khi chưa tải
    /// hoặc đang tải, miền này về `Idle`. Số đếm cũ không được giữ lại.
    pub async fn load_department_appointments(&self) -> ViewState<Vec<DepartmentAppointments>> {
        let departments = match self.departments.snapshot() {
            ViewState::Success(departments) => departments,
            ViewState::Error(message) => {
                let ticket = self.department_appointments.begin();
                self.department_appointments.fail(ticket, message);
                return self.department_appointments.snapshot();
            }
            ViewState::Idle | ViewState::Loading => {
                self.department_appointments.reset();
                return self.department_appointments.snapshot();
            }
        };

        let ticket = self.department_appointments.begin();
        let counts = join_all(departments.iter().map(|dept| self.count_appointments(dept))).await;
        self.department_appointments.resolve(ticket, counts);
        self.department_appointments.snapshot()
    }

    async fn count_appointments(&self, dept: &Department) -> DepartmentAppointments {
        if dept.id.is_empty() {
            return DepartmentAppointments {
                name: dept.name.clone(),
                appointments: dept.total_appointments,
            };
        }
        let endpoint = Endpoint::DepartmentAppointments(dept.id.clone());
        let appointments = match self.source.get_json(&endpoint).await {
            Ok(raw) => records(&raw).len() as u32,
            Err(err) => {
                warn!(department = %dept.id, error = %err, "không đếm được lịch hẹn của khoa");
                0
            }
        };
        DepartmentAppointments {
            name: dept.name.clone(),
            appointments,
        }
    }

    pub async fn load_patients(&self, filter: &PatientFilter) -> ViewState<Vec<Patient>> {
        self.patients
            .fetch(
                &self.source,
                &Endpoint::Patients(filter.clone()),
                normalize::normalize_patients,
            )
            .await
    }

    pub async fn load_staff(&self) -> ViewState<Vec<StaffMember>> {
        self.staff
            .fetch(&self.source, &Endpoint::Staff, normalize::normalize_staff)
            .await
    }

    pub async fn load_appointments(&self) -> ViewState<Vec<Appointment>> {
        self.appointments
            .fetch(&self.source, &Endpoint::Appointments, normalize::normalize_appointments)
            .await
    }

    pub async fn load_vitals(&self) -> ViewState<Vec<VitalSign>> {
        self.vitals
            .fetch(&self.source, &Endpoint::Vitals, normalize::normalize_vitals)
            .await
    }

    pub async fn load_activities(&self) -> ViewState<Vec<Activity>> {
        self.activities
            .fetch(&self.source, &Endpoint::RecentActivities, normalize::normalize_activities)
            .await
    }

    /// Tổng hợp nhân khẩu và ba lát cắt riêng.
    pub async fn load_demographics(&self) {
        tokio::join!(
            self.demographics.fetch(
                &self.source,
                &Endpoint::Demographics,
                normalize::normalize_demographics
            ),
            self.gender.fetch(
                &self.source,
                &Endpoint::GenderDemographics,
                normalize::normalize_demographic_slices
            ),
            self.age.fetch(
                &self.source,
                &Endpoint::AgeDemographics,
                normalize::normalize_demographic_slices
            ),
            self.insurance.fetch(
                &self.source,
                &Endpoint::InsuranceDemographics,
                normalize::normalize_demographic_slices
            ),
        );
    }

    pub async fn load_inventory(&self) -> ViewState<Inventory> {
        self.inventory
            .fetch(&self.source, &Endpoint::Inventory, normalize::normalize_inventory)
            .await
    }

    pub async fn load_financial(&self) -> ViewState<Vec<FinancialRecord>> {
        self.financial
            .fetch(&self.source, &Endpoint::Financial, normalize::normalize_financials)
            .await
    }

    pub async fn load_department_revenue(&self) -> ViewState<Vec<DepartmentRevenue>> {
        self.department_revenue
            .fetch(
                &self.source,
                &Endpoint::FinancialByDepartment,
                normalize::normalize_department_revenue,
            )
            .await
    }

    pub async fn load_financial_years(&self) -> ViewState<Vec<i32>> {
        self.financial_years
            .fetch(&self.source, &Endpoint::FinancialYears, normalize::normalize_years)
            .await
    }

    pub async fn load_monthly_summary(&self, year: i32) -> ViewState<Vec<FinancialRecord>> {
        self.period_summary
            .fetch(
                &self.source,
                &Endpoint::MonthlySummary(year),
                normalize::normalize_financials,
            )
            .await
    }

    pub async fn load_yearly_summary(&self, year: i32) -> ViewState<Vec<FinancialRecord>> {
        self.period_summary
            .fetch(
                &self.source,
                &Endpoint::YearlySummary(year),
                normalize::normalize_financials,
            )
            .await
    }

    /// Cảnh báo chỉ số sống của một bệnh nhân, tải khi người dùng mở chi tiết.
    pub async fn load_patient_alerts(&self, patient_id: &str) -> ViewState<Vec<Activity>> {
        self.patient_alerts
            .fetch(
                &self.source,
                &Endpoint::VitalAlerts(patient_id.to_string()),
                normalize::normalize_activities,
            )
            .await
    }

    pub fn monthly_trends(&self) -> ViewState<Vec<MonthlyTrend>> {
        let order = self.config.trend_order;
        self.appointments
            .snapshot()
            .map(|appointments| aggregate::monthly_appointment_trends(appointments, order))
    }

    pub fn doctor_loads(&self) -> ViewState<Vec<DoctorLoad>> {
        self.appointments
            .snapshot()
            .map(|appointments| aggregate::appointments_by_doctor(appointments))
    }

    pub fn financial_summary(&self) -> ViewState<FinancialSummary> {
        self.financial
            .snapshot()
            .map(|records| aggregate::financial_summary(records))
    }

    pub fn financial_by_month(&self) -> ViewState<Vec<MonthlyFinance>> {
        self.financial
            .snapshot()
            .map(|records| aggregate::financial_by_month(records))
    }

    pub fn vitals_summary(&self) -> ViewState<VitalsSummary> {
        self.vitals.snapshot().map(|vitals| aggregate::vitals_summary(vitals))
    }

    pub fn staff_distribution(&self) -> ViewState<StaffCounts> {
        self.departments
            .snapshot()
            .map(|departments| aggregate::staff_distribution(departments))
    }

    pub fn gender_composition(&self) -> ViewState<GenderComposition> {
        self.gender
            .snapshot()
            .map(|slices| aggregate::gender_composition(slices))
    }

    /// Doanh thu theo khoa kèm tên khoa.
    ///
    /// Khi danh sách khoa chưa tải hoặc lỗi, id sẽ hiện dạng `Dept {id}`.
    /// Chỉ trả `Loading` khi danh sách khoa đang thực sự được tải.
    pub fn department_revenue_named(&self) -> ViewState<Vec<NamedRevenue>> {
        let rows = match self.department_revenue.snapshot() {
            ViewState::Success(rows) => rows,
            other => return other.map(|_| Vec::new()),
        };
        match self.departments.snapshot() {
            ViewState::Success(departments) => {
                ViewState::Success(aggregate::department_revenue_named(&rows, &departments))
            }
            ViewState::Idle | ViewState::Error(_) => {
                ViewState::Success(aggregate::department_revenue_named(&rows, &[]))
            }
            ViewState::Loading => ViewState::Loading,
        }
    }
}
