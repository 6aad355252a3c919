use std::fs;

use serde_json::Value;
use wardboard_normalize::normalize_departments;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn department_payload_matches_golden() {
    let payload = fs::read_to_string(fixture_path("department_payload.json"))
        .expect("department payload fixture");
    let raw: Value = serde_json::from_str(&payload).expect("payload is valid JSON");

    let departments = normalize_departments(&raw);
    let actual = serde_json::to_value(&departments).expect("departments serialize");

    let expected = fs::read_to_string(fixture_path("department_canonical.json"))
        .expect("golden departments fixture");
    let expected: Value = serde_json::from_str(&expected).expect("golden is valid JSON");

    assert_eq!(actual, expected);
    for dept in &departments {
        assert_eq!(dept.total_staff, dept.staff_counts.total());
        assert!(dept.current_occupancy <= 100);
    }
}
