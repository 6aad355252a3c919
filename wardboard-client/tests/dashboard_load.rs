mod support;

use serde_json::json;
use wardboard_client::{Dashboard, PatientFilter, ViewState};
use wardboard_core::aggregate::{DepartmentAppointments, NamedRevenue, ALL_DEPARTMENTS};
use wardboard_core::{DashboardConfig, TrendOrder};

use support::ScriptedSource;

fn hospital() -> ScriptedSource {
    ScriptedSource::new()
        .ok("/overview", json!({ "totalPatients": 120, "bedOccupancy": 81 }))
        .ok(
            "/departments",
            json!({ "data": [
                { "id": 1, "name": "Cardiology", "staff": { "doctors": 4, "nurses": 10, "support": 3 } },
                { "id": 2, "name": "Neurology", "staff": { "doctors": 2, "nurses": 6, "support": 1 } }
            ]}),
        )
        .ok("/departments/1/appointments", json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]))
        .status("/departments/2/appointments", 503)
        .status("/patients/active", 500)
        .ok(
            "/appointments",
            json!([
                { "patientName": "A", "doctorName": "Dr. Lan", "date": "2025-02-03", "status": "Completed" },
                { "patientName": "B", "doctorName": "Dr. Lan", "date": "2025-01-20", "status": "Cancelled" },
                { "patientName": "C", "doctorName": "N/A", "date": "2025-01-21" }
            ]),
        )
        .ok(
            "/financial",
            json!([
                { "month": "2025-01", "revenue": 1000, "expenses": 400 },
                { "month": "2025-02", "revenue": 500, "expenses": 100 }
            ]),
        )
        .ok(
            "/financial/department",
            json!([
                { "departmentId": 2, "revenue": 700 },
                { "departmentId": 9, "revenue": 50 },
                { "revenue": 800 }
            ]),
        )
}

#[tokio::test]
async fn one_failing_domain_does_not_block_the_rest() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    dashboard.load_all(&PatientFilter::Active).await;

    assert_eq!(
        dashboard.patients.snapshot(),
        ViewState::Error("HTTP error! status: 500".into())
    );
    assert_eq!(dashboard.departments.snapshot().data().map(Vec::len), Some(2));
    assert_eq!(
        dashboard.overview.snapshot().data().and_then(|stats| stats.get("totalPatients")),
        Some(&json!(120))
    );
    // Không khai báo trong nguồn: 404.
    assert_eq!(
        dashboard.inventory.snapshot().error(),
        Some("HTTP error! status: 404")
    );
}

#[tokio::test]
async fn department_appointment_failures_count_as_zero() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    dashboard.load_all(&PatientFilter::Active).await;

    assert_eq!(
        dashboard.department_appointments.snapshot(),
        ViewState::Success(vec![
            DepartmentAppointments {
                name: "Cardiology".into(),
                appointments: 3,
            },
            DepartmentAppointments {
                name: "Neurology".into(),
                appointments: 0,
            },
        ])
    );
}

#[tokio::test]
async fn department_appointments_wait_for_departments() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    assert_eq!(dashboard.load_department_appointments().await, ViewState::Idle);

    let source = ScriptedSource::new().status("/departments", 500);
    let dashboard = Dashboard::new(source, DashboardConfig::default());
    dashboard.load_departments().await;

    assert_eq!(
        dashboard.load_department_appointments().await,
        ViewState::Error("HTTP error! status: 500".into())
    );
    assert!(!dashboard
        .source()
        .calls()
        .iter()
        .any(|path| path.ends_with("/appointments")));
}

#[tokio::test]
async fn department_appointments_drop_counts_when_departments_reload_fails() {
    let source = ScriptedSource::new()
        .ok("/departments", json!([{ "id": 1, "name": "Cardiology" }]))
        .status("/departments", 500)
        .ok("/departments/1/appointments", json!([{ "id": 1 }]));
    let dashboard = Dashboard::new(source, DashboardConfig::default());

    dashboard.load_departments().await;
    let counts = dashboard.load_department_appointments().await;
    assert_eq!(counts.data().map(Vec::len), Some(1));

    dashboard.load_departments().await;
    assert_eq!(
        dashboard.load_department_appointments().await,
        ViewState::Error("HTTP error! status: 500".into())
    );
    assert_eq!(
        dashboard.department_appointments.snapshot(),
        ViewState::Error("HTTP error! status: 500".into())
    );
}

#[tokio::test]
async fn derived_views_follow_loaded_domains() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    dashboard.load_all(&PatientFilter::Active).await;

    let summary = dashboard.financial_summary();
    let summary = summary.data().expect("financial loaded");
    assert_eq!(summary.total_revenue, 1500.0);
    assert_eq!(summary.net_profit, 1000.0);
    assert_eq!(summary.margin_display(), "66.7");

    assert_eq!(
        dashboard.department_revenue_named(),
        ViewState::Success(vec![
            NamedRevenue {
                department: "Neurology".into(),
                revenue: 700.0,
            },
            NamedRevenue {
                department: "Dept 9".into(),
                revenue: 50.0,
            },
            NamedRevenue {
                department: ALL_DEPARTMENTS.into(),
                revenue: 800.0,
            },
        ])
    );

    let staff = dashboard.staff_distribution();
    let staff = staff.data().expect("departments loaded");
    assert_eq!((staff.doctors, staff.nurses, staff.support), (6, 16, 4));

    let loads = dashboard.doctor_loads();
    let loads = loads.data().expect("appointments loaded");
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].doctor, "Dr. Lan");
    assert_eq!(loads[0].total_appointments, 2);
}

#[tokio::test]
async fn trend_order_comes_from_config() {
    let config = DashboardConfig {
        trend_order: TrendOrder::FirstSeen,
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::new(hospital(), config);
    dashboard.load_appointments().await;

    let months: Vec<String> = dashboard
        .monthly_trends()
        .data()
        .expect("appointments loaded")
        .iter()
        .map(|trend| trend.month.clone())
        .collect();
    assert_eq!(months, vec!["Feb 2025", "Jan 2025"]);

    let chronological = Dashboard::new(hospital(), DashboardConfig::default());
    chronological.load_appointments().await;
    let first = chronological.monthly_trends();
    assert_eq!(first.data().map(|trends| trends[0].month.as_str()), Some("Jan 2025"));
}

#[tokio::test]
async fn department_revenue_names_fall_back_without_departments() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    dashboard.load_department_revenue().await;

    let named = dashboard.department_revenue_named();
    let names: Vec<&str> = named
        .data()
        .expect("revenue loaded")
        .iter()
        .map(|row| row.department.as_str())
        .collect();
    assert_eq!(names, vec!["Dept 2", "Dept 9", ALL_DEPARTMENTS]);
}

#[tokio::test]
async fn derived_views_before_loading() {
    let dashboard = Dashboard::new(hospital(), DashboardConfig::default());
    assert_eq!(dashboard.financial_summary(), ViewState::Idle);
    assert_eq!(dashboard.department_revenue_named(), ViewState::Idle);
}

#[tokio::test]
async fn on_demand_financial_views() {
    let source = ScriptedSource::new()
        .ok("/financials/years", json!([2025, 2024, "2024"]))
        .ok(
            "/financials/summary/year/2024",
            json!({ "data": [{ "period": "2024", "revenue": 900, "expenses": 300 }] }),
        )
        .status("/financials/summary/month/2024", 502);
    let dashboard = Dashboard::new(source, DashboardConfig::default());

    assert_eq!(
        dashboard.load_financial_years().await,
        ViewState::Success(vec![2024, 2025])
    );

    let yearly = dashboard.load_yearly_summary(2024).await;
    assert_eq!(yearly.data().map(|rows| rows[0].net_profit()), Some(600.0));

    assert_eq!(
        dashboard.load_monthly_summary(2024).await.error(),
        Some("HTTP error! status: 502")
    );
}

#[tokio::test]
async fn patient_alerts_use_alert_route() {
    let source = ScriptedSource::new().ok(
        "/vitals/alerts/p-7",
        json!([{ "type": "vital", "message": "SpO2 below 90%", "priority": "high" }]),
    );
    let dashboard = Dashboard::new(source, DashboardConfig::default());

    let alerts = dashboard.load_patient_alerts("p-7").await;
    assert_eq!(alerts.data().map(Vec::len), Some(1));
    assert_eq!(dashboard.source().calls(), vec!["/vitals/alerts/p-7"]);
}
