use std::fs;

use serde_json::Value;
use wardboard_core::aggregate::{appointments_by_doctor, monthly_appointment_trends};
use wardboard_core::{AppointmentStatus, TrendOrder, UNKNOWN_DOCTOR};
use wardboard_normalize::normalize_appointments;

fn load_payload() -> Value {
    let path = format!(
        "{}/tests/data/appointment_payload.json",
        env!("CARGO_MANIFEST_DIR")
    );
    let text = fs::read_to_string(path).expect("appointment payload fixture");
    serde_json::from_str(&text).expect("payload is valid JSON")
}

#[test]
fn appointments_normalize_with_positional_ids() {
    let appointments = normalize_appointments(&load_payload());

    assert_eq!(appointments.len(), 5);
    assert_eq!(appointments[0].id, "AP-100");
    assert_eq!(appointments[2].id, "3");
    assert_eq!(appointments[3].doctor_name, UNKNOWN_DOCTOR);
    assert_eq!(appointments[3].date, None);
    assert_eq!(
        appointments[3].status,
        AppointmentStatus::Other("No Show".to_string())
    );
}

#[test]
fn monthly_trends_from_backend_payload() {
    let appointments = normalize_appointments(&load_payload());

    let trends = monthly_appointment_trends(&appointments, TrendOrder::Chronological);
    let months: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(months, vec!["Jan 2025", "Feb 2025", "Unknown"]);

    assert_eq!(trends[0].total, 2);
    assert_eq!(trends[0].scheduled, 2);
    assert_eq!(trends[1].total, 2);
    assert_eq!(trends[1].completed, 1);
    assert_eq!(trends[1].cancelled, 1);
    assert_eq!(trends[2].total, 1);
    assert_eq!(trends[2].completed + trends[2].cancelled + trends[2].scheduled, 0);

    let first_seen = monthly_appointment_trends(&appointments, TrendOrder::FirstSeen);
    let months: Vec<&str> = first_seen.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(months, vec!["Feb 2025", "Jan 2025", "Unknown"]);
}

#[test]
fn doctor_loads_from_backend_payload() {
    let appointments = normalize_appointments(&load_payload());
    let loads = appointments_by_doctor(&appointments);

    let doctors: Vec<&str> = loads.iter().map(|load| load.doctor.as_str()).collect();
    assert_eq!(doctors, vec!["Dr. A", "Dr. B", UNKNOWN_DOCTOR]);
    assert_eq!(loads[0].total_appointments, 2);
    assert_eq!(loads[0].completed, 1);
    assert_eq!(loads[0].scheduled, 1);
    assert_eq!(loads[1].cancelled, 1);
}
