//! Backend JSON to canonical dashboard records.
//!
//! Every normalizer is a pure function over a `serde_json::Value` and never
//! fails: bare arrays and `{"data": [...]}` wrappers are unwrapped the same
//! way, anything else yields an empty result, and a malformed element falls
//! back to defaults without affecting its neighbours.

pub mod schema;

use serde_json::{Map, Value};
use wardboard_core::{
    Activity, ActivityPriority, Appointment, AppointmentStatus, DataDomain, DemographicSlice,
    Demographics, Department, DepartmentRevenue, EquipmentItem, EquipmentStatus,
    FinancialRecord, Inventory, InventoryItem, Patient, PatientSeverity, PatientVitals,
    StaffCounts, StaffMember, StockStatus, VitalSign, WardboardError, NOT_AVAILABLE, UNKNOWN,
    UNKNOWN_DOCTOR,
};

use crate::schema::{Field, Record};

/// Free-form statistics (`/overview`, `/departments/stats`) passed through as-is.
pub type OverviewStats = Map<String, Value>;

/// Elements of a list payload: a bare array or the `data` array of a wrapper object.
pub fn records(raw: &Value) -> &[Value] {
    match raw {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Object payload, unwrapping a `data` object when present.
fn object_payload(raw: &Value) -> Option<&Map<String, Value>> {
    let map = raw.as_object()?;
    match map.get("data").and_then(Value::as_object) {
        Some(inner) => Some(inner),
        None => Some(map),
    }
}

mod department {
    use super::Field;

    pub const ID: Field = Field::new(&["id", "department_id", "departmentId", "_id"]);
    pub const NAME: Field = Field::new(&["name", "department_name", "departmentName"]);
    pub const TOTAL_PATIENTS: Field = Field::new(&["totalPatients", "total_patients"]);
    pub const CAPACITY: Field = Field::new(&["capacity", "bed_capacity", "bedCapacity"]);
    pub const OCCUPANCY: Field =
        Field::new(&["currentOccupancy", "current_occupancy", "occupancy"]);
    pub const STAFF: Field = Field::new(&["staff", "staffCounts", "staff_counts"]);
    pub const DOCTORS: Field = Field::new(&["doctors"]);
    pub const NURSES: Field = Field::new(&["nurses"]);
    pub const SUPPORT: Field = Field::new(&["support"]);
    pub const HEAD: Field = Field::new(&["head", "department_head", "departmentHead"]);
    pub const APPOINTMENTS: Field =
        Field::new(&["totalAppointments", "total_appointments", "todayPatients"]);
}

pub fn normalize_departments(raw: &Value) -> Vec<Department> {
    records(raw).iter().map(department_from).collect()
}

fn department_from(value: &Value) -> Department {
    use department::*;

    let record = Record::new(value);
    let defaults = Department::default();
    let staff = record
        .nested(&STAFF)
        .map(|staff| StaffCounts {
            doctors: staff.count(&DOCTORS),
            nurses: staff.count(&NURSES),
            support: staff.count(&SUPPORT),
        })
        .unwrap_or_default();

    Department {
        id: record.text_or(&ID, ""),
        name: record.text(&NAME).unwrap_or(defaults.name),
        total_patients: record.count(&TOTAL_PATIENTS),
        capacity: record.count(&CAPACITY),
        current_occupancy: record.count(&OCCUPANCY).min(100) as u8,
        head: record.text(&HEAD).unwrap_or(defaults.head),
        total_appointments: record.count(&APPOINTMENTS),
        ..Department::default()
    }
    .with_staff(staff)
}

mod patient {
    use super::Field;

    pub const ID: Field = Field::new(&["id", "_id", "patient_id", "patientId"]);
    pub const NAME: Field = Field::new(&["name", "fullName", "full_name", "patientName"]);
    pub const AGE: Field = Field::new(&["age"]);
    pub const GENDER: Field = Field::new(&["gender", "sex"]);
    pub const DEPARTMENT: Field = Field::new(&["department", "department_name", "departmentName"]);
    pub const DOCTOR: Field = Field::new(&["doctor", "doctorName", "doctor_name", "attendingDoctor"]);
    pub const STATUS: Field = Field::new(&["status"]);
    pub const SEVERITY: Field = Field::new(&["severity", "condition"]);
    pub const VITALS: Field = Field::new(&["vitals"]);
    pub const BLOOD_PRESSURE: Field = Field::new(&["bloodPressure", "blood_pressure", "bp"]);
    pub const HEART_RATE: Field = Field::new(&["heartRate", "heart_rate", "pulse"]);
    pub const TEMPERATURE: Field = Field::new(&["temperature", "temp"]);
    pub const OXYGEN: Field =
        Field::new(&["oxygenSaturation", "oxygen_saturation", "spo2", "SpO2"]);
}

pub fn normalize_patients(raw: &Value) -> Vec<Patient> {
    records(raw).iter().map(patient_from).collect()
}

fn patient_from(value: &Value) -> Patient {
    use patient::*;

    let record = Record::new(value);
    let defaults = Patient::default();
    let vitals = record.nested(&VITALS).map(|vitals| PatientVitals {
        blood_pressure: vitals.text_or(&BLOOD_PRESSURE, NOT_AVAILABLE),
        heart_rate: vitals.count(&HEART_RATE),
        temperature: vitals.amount(&TEMPERATURE),
        oxygen_saturation: vitals.count(&OXYGEN),
    });

    Patient {
        id: record.text_or(&ID, ""),
        name: record.text(&NAME).unwrap_or(defaults.name),
        age: record.number(&AGE).filter(|age| *age >= 0.0).map(|age| age.round() as u32),
        gender: record.text(&GENDER).unwrap_or(defaults.gender),
        department: record.text(&DEPARTMENT).unwrap_or(defaults.department),
        doctor: record.text(&DOCTOR).unwrap_or(defaults.doctor),
        status: record.text(&STATUS).unwrap_or(defaults.status),
        severity: record
            .text(&SEVERITY)
            .map(PatientSeverity::from)
            .unwrap_or(defaults.severity),
        vitals,
    }
}

mod appointment {
    use super::Field;

    pub const ID: Field = Field::new(&["id", "appointment_id", "appointmentId", "_id"]);
    pub const PATIENT: Field = Field::new(&["patientName", "patient_name", "patient"]);
    pub const DOCTOR: Field = Field::new(&["doctorName", "doctor_name", "doctor"]);
    pub const DATE: Field =
        Field::new(&["date", "appointment_date", "appointmentDate", "scheduledAt"]);
    pub const TIME: Field = Field::new(&["time", "appointment_time", "appointmentTime"]);
    pub const KIND: Field = Field::new(&["type", "appointment_type", "appointmentType"]);
    pub const STATUS: Field = Field::new(&["status"]);
}

/// Appointments without an id take their 1-based position in the batch.
pub fn normalize_appointments(raw: &Value) -> Vec<Appointment> {
    records(raw)
        .iter()
        .enumerate()
        .map(|(position, value)| appointment_from(position, value))
        .collect()
}

fn appointment_from(position: usize, value: &Value) -> Appointment {
    use appointment::*;

    let record = Record::new(value);
    let defaults = Appointment::default();
    Appointment {
        id: record
            .text(&ID)
            .unwrap_or_else(|| (position + 1).to_string()),
        patient_name: record.text(&PATIENT).unwrap_or(defaults.patient_name),
        doctor_name: record.text_or(&DOCTOR, UNKNOWN_DOCTOR),
        date: record.datetime(&DATE),
        time: record.text(&TIME).unwrap_or(defaults.time),
        kind: record.text(&KIND).unwrap_or(defaults.kind),
        status: record
            .text(&STATUS)
            .map(AppointmentStatus::from)
            .unwrap_or(defaults.status),
    }
}

mod vital {
    use super::Field;

    pub const PATIENT_ID: Field = Field::new(&["patientId", "patient_id", "id"]);
    pub const PATIENT_NAME: Field = Field::new(&["patientName", "patient_name", "name"]);
    pub const ACTIVE_ALERTS: Field = Field::new(&["activeAlerts", "active_alerts", "alerts"]);
    pub const LAST_UPDATED: Field =
        Field::new(&["lastUpdated", "last_updated", "updatedAt", "timestamp"]);
}

pub fn normalize_vitals(raw: &Value) -> Vec<VitalSign> {
    records(raw).iter().map(vital_from).collect()
}

fn vital_from(value: &Value) -> VitalSign {
    use patient::{BLOOD_PRESSURE, HEART_RATE, OXYGEN, TEMPERATURE};
    use vital::*;

    let record = Record::new(value);
    let defaults = VitalSign::default();
    VitalSign {
        patient_id: record.text_or(&PATIENT_ID, ""),
        patient_name: record.text(&PATIENT_NAME).unwrap_or(defaults.patient_name),
        blood_pressure: record.text(&BLOOD_PRESSURE).unwrap_or(defaults.blood_pressure),
        heart_rate: record.count(&HEART_RATE),
        temperature: record.amount(&TEMPERATURE),
        oxygen_saturation: record.count(&OXYGEN),
        active_alerts: record.tally(&ACTIVE_ALERTS),
        last_updated: record.datetime_utc(&LAST_UPDATED),
    }
}

mod financial {
    use super::Field;

    pub const PERIOD: Field = Field::new(&["period", "month", "year", "label"]);
    pub const DATE: Field = Field::new(&["date", "month", "createdAt", "updatedAt"]);
    pub const REVENUE: Field =
        Field::new(&["revenue", "total_revenue", "totalRevenue", "income"]);
    pub const EXPENSES: Field =
        Field::new(&["expenses", "total_expenses", "totalExpenses", "expense"]);
    pub const DEPARTMENT_ID: Field = Field::new(&["department_id", "departmentId", "department"]);
    pub const YEAR: Field = Field::new(&["year", "fiscalYear", "fiscal_year"]);
}

pub fn normalize_financials(raw: &Value) -> Vec<FinancialRecord> {
    records(raw).iter().map(financial_from).collect()
}

fn financial_from(value: &Value) -> FinancialRecord {
    use financial::*;

    let record = Record::new(value);
    FinancialRecord {
        period: record.text_or(&PERIOD, NOT_AVAILABLE),
        date: record.date(&DATE),
        revenue: record.amount(&REVENUE),
        expenses: record.amount(&EXPENSES),
    }
}

/// Revenue rows per department; a missing or null department id means hospital-wide.
pub fn normalize_department_revenue(raw: &Value) -> Vec<DepartmentRevenue> {
    use financial::{DEPARTMENT_ID, REVENUE};

    records(raw)
        .iter()
        .map(|value| {
            let record = Record::new(value);
            DepartmentRevenue {
                department_id: record.text(&DEPARTMENT_ID),
                revenue: record.amount(&REVENUE),
            }
        })
        .collect()
}

mod inventory {
    use super::Field;

    pub const SUPPLIES: Field = Field::new(&["medical_supplies", "medicalSupplies", "supplies"]);
    pub const EQUIPMENT: Field = Field::new(&["equipment"]);
    pub const ITEM: Field = Field::new(&["item", "name"]);
    pub const CURRENT: Field =
        Field::new(&["current", "current_stock", "currentStock", "stock", "quantity"]);
    pub const MINIMUM: Field = Field::new(&["minimum", "minimum_stock", "minimumStock", "min"]);
    pub const STATUS: Field = Field::new(&["status"]);
    pub const UNIT_COST: Field = Field::new(&["unitCost", "unit_cost", "cost"]);
    pub const EQUIPMENT_NAME: Field = Field::new(&["equipment", "name"]);
    pub const LAST_MAINTENANCE: Field = Field::new(&["lastMaintenance", "last_maintenance"]);
    pub const NEXT_MAINTENANCE: Field = Field::new(&["nextMaintenance", "next_maintenance"]);
}

/// Supplies and equipment from `{data: {medical_supplies, equipment}}` or the inner object.
pub fn normalize_inventory(raw: &Value) -> Inventory {
    use inventory::*;

    let Some(payload) = object_payload(raw) else {
        return Inventory::default();
    };
    let record = Record::from_map(payload);

    Inventory {
        supplies: record.array(&SUPPLIES).iter().map(supply_from).collect(),
        equipment: record.array(&EQUIPMENT).iter().map(equipment_from).collect(),
    }
}

fn supply_from(value: &Value) -> InventoryItem {
    use inventory::*;

    let record = Record::new(value);
    let current = record.count(&CURRENT);
    let minimum = record.count(&MINIMUM);
    let status = match record.text(&STATUS).map(|s| s.to_lowercase()).as_deref() {
        Some("good") => StockStatus::Good,
        Some("low") => StockStatus::Low,
        _ => StockStatus::from_levels(current, minimum),
    };

    InventoryItem {
        item: record.text_or(&ITEM, UNKNOWN),
        current,
        minimum,
        status,
        unit_cost: record.amount(&UNIT_COST),
    }
}

fn equipment_from(value: &Value) -> EquipmentItem {
    use inventory::*;

    let record = Record::new(value);
    EquipmentItem {
        name: record.text_or(&EQUIPMENT_NAME, UNKNOWN),
        status: EquipmentStatus::from(record.text_or(&STATUS, UNKNOWN)),
        last_maintenance: record.date(&LAST_MAINTENANCE),
        next_maintenance: record.date(&NEXT_MAINTENANCE),
    }
}

mod staff {
    use super::Field;

    pub const ID: Field = Field::new(&["id", "_id", "staff_id", "staffId"]);
    pub const NAME: Field = Field::new(&["fullName", "name", "full_name"]);
    pub const ROLE: Field = Field::new(&["role", "designation", "specialization"]);
    pub const DEPARTMENT: Field = Field::new(&["department", "department_name", "departmentName"]);
    pub const STATUS: Field = Field::new(&["status"]);
    pub const SHIFT: Field = Field::new(&["shift"]);
}

pub fn normalize_staff(raw: &Value) -> Vec<StaffMember> {
    records(raw)
        .iter()
        .map(|value| {
            use staff::*;

            let record = Record::new(value);
            let defaults = StaffMember::default();
            StaffMember {
                id: record.text_or(&ID, ""),
                name: record.text(&NAME).unwrap_or(defaults.name),
                role: record.text(&ROLE).unwrap_or(defaults.role),
                department: record.text(&DEPARTMENT).unwrap_or(defaults.department),
                status: record.text(&STATUS).unwrap_or(defaults.status),
                shift: record.text(&SHIFT).unwrap_or(defaults.shift),
            }
        })
        .collect()
}

mod activity {
    use super::Field;

    pub const KIND: Field = Field::new(&["type", "kind", "category"]);
    pub const MESSAGE: Field = Field::new(&["message", "description"]);
    pub const TIMESTAMP: Field = Field::new(&["timestamp", "createdAt", "time"]);
    pub const PRIORITY: Field = Field::new(&["priority"]);
}

pub fn normalize_activities(raw: &Value) -> Vec<Activity> {
    records(raw)
        .iter()
        .map(|value| {
            use activity::*;

            let record = Record::new(value);
            let priority = match record.text(&PRIORITY).as_deref() {
                Some("High") => ActivityPriority::High,
                Some("Medium") => ActivityPriority::Medium,
                _ => ActivityPriority::Low,
            };
            Activity {
                kind: record.text_or(&KIND, "Activity"),
                message: record.text_or(&MESSAGE, ""),
                timestamp: record.datetime_utc(&TIMESTAMP),
                priority,
            }
        })
        .collect()
}

mod demographic {
    use super::Field;

    pub const LABEL: Field = Field::new(&[
        "label",
        "gender",
        "type",
        "ageGroup",
        "age_group",
        "range",
        "name",
    ]);
    pub const PERCENTAGE: Field = Field::new(&["percentage", "percent", "value"]);
    pub const GENDER: Field = Field::new(&["gender"]);
    pub const AGE: Field = Field::new(&["age", "ageGroups", "age_groups"]);
    pub const INSURANCE: Field = Field::new(&["insurance"]);
}

/// Chart slices from `/demographics/{gender,age,insurance}`.
pub fn normalize_demographic_slices(raw: &Value) -> Vec<DemographicSlice> {
    records(raw).iter().map(slice_from).collect()
}

fn slice_from(value: &Value) -> DemographicSlice {
    use demographic::*;

    let record = Record::new(value);
    DemographicSlice {
        label: record.text_or(&LABEL, UNKNOWN),
        percentage: record.amount(&PERCENTAGE),
    }
}

/// Combined `/demographics` payload holding `gender`, `age` and `insurance` lists.
pub fn normalize_demographics(raw: &Value) -> Demographics {
    use demographic::*;

    let Some(payload) = object_payload(raw) else {
        return Demographics::default();
    };
    let record = Record::from_map(payload);
    let slices = |field: &Field| -> Vec<DemographicSlice> {
        record.array(field).iter().map(slice_from).collect()
    };

    Demographics {
        gender: slices(&GENDER),
        age: slices(&AGE),
        insurance: slices(&INSURANCE),
    }
}

/// Statistics objects are kept verbatim; anything that is not an object reads as empty.
pub fn normalize_overview(raw: &Value) -> OverviewStats {
    object_payload(raw).cloned().unwrap_or_default()
}

/// Years offered by `/financials/years`, ascending and without duplicates.
///
/// Entries may be bare numbers, numeric strings or `{year}` objects.
pub fn normalize_years(raw: &Value) -> Vec<i32> {
    let mut years: Vec<i32> = records(raw)
        .iter()
        .filter_map(|value| match value {
            Value::Object(_) => Record::new(value).number(&financial::YEAR),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        })
        .filter(|year| *year > 0.0 && year.fract() == 0.0 && *year <= f64::from(i32::MAX))
        .map(|year| year as i32)
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Normalize a JSON string for the given domain and return canonical JSON.
pub fn normalize_str(domain: DataDomain, raw_json: &str) -> Result<Value, WardboardError> {
    let raw: Value =
        serde_json::from_str(raw_json).map_err(|err| WardboardError::Parse(err.to_string()))?;
    normalize_value(domain, &raw)
}

/// Normalize a payload for the given domain and return canonical JSON.
pub fn normalize_value(domain: DataDomain, raw: &Value) -> Result<Value, WardboardError> {
    let canonical = match domain {
        DataDomain::Overview | DataDomain::DepartmentStats => {
            Ok(Value::Object(normalize_overview(raw)))
        }
        DataDomain::Departments => serde_json::to_value(normalize_departments(raw)),
        DataDomain::Patients => serde_json::to_value(normalize_patients(raw)),
        DataDomain::Staff => serde_json::to_value(normalize_staff(raw)),
        DataDomain::Appointments => serde_json::to_value(normalize_appointments(raw)),
        DataDomain::Vitals => serde_json::to_value(normalize_vitals(raw)),
        DataDomain::Activities => serde_json::to_value(normalize_activities(raw)),
        DataDomain::Demographics => serde_json::to_value(normalize_demographics(raw)),
        DataDomain::GenderDemographics
        | DataDomain::AgeDemographics
        | DataDomain::InsuranceDemographics => {
            serde_json::to_value(normalize_demographic_slices(raw))
        }
        DataDomain::Inventory => serde_json::to_value(normalize_inventory(raw)),
        DataDomain::Financial => serde_json::to_value(normalize_financials(raw)),
        DataDomain::DepartmentRevenue => serde_json::to_value(normalize_department_revenue(raw)),
    };
    canonical.map_err(|err| WardboardError::Other(err.to_string()))
}
