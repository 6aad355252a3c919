//! Tổng hợp số liệu hiển thị từ các bản ghi đã chuẩn hóa.

use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{
    margin_percent, Appointment, AppointmentStatus, DemographicSlice, Department,
    DepartmentRevenue, FinancialRecord, StaffCounts, TrendOrder, VitalSign, NOT_AVAILABLE,
    UNKNOWN,
};

/// Tên hiển thị cho doanh thu không gắn khoa.
pub const ALL_DEPARTMENTS: &str = "All Departments";

/// Đơn vị lakh dùng trên biểu đồ tài chính.
const LAKH: f64 = 100_000.0;

/// Bộ đếm theo trạng thái lịch hẹn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub total: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub scheduled: u32,
}

impl StatusCounts {
    fn record(&mut self, status: &AppointmentStatus) {
        self.total += 1;
        match status {
            AppointmentStatus::Completed => self.completed += 1,
            AppointmentStatus::Cancelled => self.cancelled += 1,
            AppointmentStatus::Scheduled => self.scheduled += 1,
            AppointmentStatus::Other(_) => {}
        }
    }
}

/// Một điểm trên biểu đồ xu hướng lịch hẹn theo tháng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTrend {
    /// Nhãn dạng `MMM YYYY`, ví dụ `Jan 2025`.
    pub month: String,
    pub total: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub scheduled: u32,
}

/// Số lịch hẹn theo bác sĩ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorLoad {
    pub doctor: String,
    pub total_appointments: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub scheduled: u32,
}

/// Tổng hợp tài chính.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    /// Phần trăm, đã làm tròn một chữ số thập phân.
    pub margin: f64,
}

impl FinancialSummary {
    /// Chuỗi hiển thị của tỷ suất: `"66.7"`, hoặc `"0"` khi không có doanh thu.
    pub fn margin_display(&self) -> String {
        if self.total_revenue > 0.0 {
            format!("{:.1}", self.margin)
        } else {
            "0".to_string()
        }
    }
}

/// Doanh thu theo khoa kèm tên hiển thị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedRevenue {
    pub department: String,
    pub revenue: f64,
}

/// Phân loại bệnh nhân đang theo dõi chỉ số sống.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VitalsSummary {
    pub critical: u32,
    pub stable: u32,
    pub total: u32,
}

/// Doanh thu và chi phí theo tháng, đơn vị lakh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyFinance {
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
}

/// Tỷ lệ nam/nữ (%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GenderComposition {
    pub male: f64,
    pub female: f64,
}

/// Số lịch hẹn của một khoa.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentAppointments {
    pub name: String,
    pub appointments: u32,
}

/// Nhóm lịch hẹn theo tháng và đếm theo trạng thái.
///
/// Lịch hẹn không có ngày hợp lệ được gom vào nhóm `Unknown`.
pub fn monthly_appointment_trends(
    appointments: &[Appointment],
    order: TrendOrder,
) -> Vec<MonthlyTrend> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(Option<(i32, u32)>, String, StatusCounts)> = Vec::new();

    for appointment in appointments {
        let (sort_key, label) = match appointment.date {
            Some(date) => (
                Some((date.year(), date.month())),
                date.format("%b %Y").to_string(),
            ),
            None => (None, UNKNOWN.to_string()),
        };

        let slot = match index.get(&label) {
            Some(slot) => *slot,
            None => {
                buckets.push((sort_key, label.clone(), StatusCounts::default()));
                index.insert(label, buckets.len() - 1);
                buckets.len() - 1
            }
        };
        buckets[slot].2.record(&appointment.status);
    }

    if order == TrendOrder::Chronological {
        // `None` sorts before `Some`, so unknown months are moved to the end.
        buckets.sort_by_key(|(key, _, _)| (key.is_none(), *key));
    }

    buckets
        .into_iter()
        .map(|(_, month, counts)| MonthlyTrend {
            month,
            total: counts.total,
            completed: counts.completed,
            cancelled: counts.cancelled,
            scheduled: counts.scheduled,
        })
        .collect()
}

/// Bác sĩ chưa được phân công (`N/A` hoặc rỗng).
pub fn is_unassigned_doctor(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_AVAILABLE)
}

/// Nhóm lịch hẹn theo bác sĩ, giữ thứ tự xuất hiện đầu tiên.
pub fn appointments_by_doctor(appointments: &[Appointment]) -> Vec<DoctorLoad> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(&str, StatusCounts)> = Vec::new();

    for appointment in appointments {
        let doctor = appointment.doctor_name.as_str();
        if is_unassigned_doctor(doctor) {
            continue;
        }
        let slot = *index.entry(doctor).or_insert_with(|| {
            buckets.push((doctor, StatusCounts::default()));
            buckets.len() - 1
        });
        buckets[slot].1.record(&appointment.status);
    }

    buckets
        .into_iter()
        .map(|(doctor, counts)| DoctorLoad {
            doctor: doctor.to_string(),
            total_appointments: counts.total,
            completed: counts.completed,
            cancelled: counts.cancelled,
            scheduled: counts.scheduled,
        })
        .collect()
}

/// Danh sách bác sĩ cho bộ lọc, theo thứ tự xuất hiện.
pub fn doctor_options(appointments: &[Appointment]) -> Vec<String> {
    let mut seen = Vec::new();
    for appointment in appointments {
        if !seen.contains(&appointment.doctor_name) {
            seen.push(appointment.doctor_name.clone());
        }
    }
    seen
}

pub fn financial_summary(records: &[FinancialRecord]) -> FinancialSummary {
    let total_revenue: f64 = records.iter().map(|record| record.revenue).sum();
    let total_expenses: f64 = records.iter().map(|record| record.expenses).sum();
    let net_profit = total_revenue - total_expenses;

    FinancialSummary {
        total_revenue,
        total_expenses,
        net_profit,
        margin: margin_percent(total_revenue, net_profit),
    }
}

/// Gộp doanh thu theo tháng (nhãn `MMM`) cho biểu đồ vùng, quy đổi sang lakh.
///
/// Bản ghi không có ngày bị bỏ qua.
pub fn financial_by_month(records: &[FinancialRecord]) -> Vec<MonthlyFinance> {
    let mut output: Vec<MonthlyFinance> = Vec::new();
    for record in records {
        let Some(date) = record.date else {
            continue;
        };
        let month = date.format("%b").to_string();
        match output.iter_mut().find(|entry| entry.month == month) {
            Some(entry) => {
                entry.revenue += record.revenue;
                entry.expenses += record.expenses;
            }
            None => output.push(MonthlyFinance {
                month,
                revenue: record.revenue,
                expenses: record.expenses,
            }),
        }
    }

    for entry in &mut output {
        entry.revenue /= LAKH;
        entry.expenses /= LAKH;
    }
    output
}

/// Nối doanh thu với tên khoa theo id (so sánh dạng chuỗi).
pub fn department_revenue_named(
    rows: &[DepartmentRevenue],
    departments: &[Department],
) -> Vec<NamedRevenue> {
    rows.iter()
        .map(|row| {
            let department = match &row.department_id {
                None => ALL_DEPARTMENTS.to_string(),
                Some(id) => departments
                    .iter()
                    .find(|dept| dept.id == *id)
                    .map(|dept| dept.name.clone())
                    .unwrap_or_else(|| format!("Dept {id}")),
            };
            NamedRevenue {
                department,
                revenue: row.revenue,
            }
        })
        .collect()
}

pub fn vitals_summary(vitals: &[VitalSign]) -> VitalsSummary {
    let critical = vitals.iter().filter(|vital| vital.is_critical()).count() as u32;
    let total = vitals.len() as u32;
    VitalsSummary {
        critical,
        stable: total - critical,
        total,
    }
}

/// Tổng nhân sự của toàn bộ các khoa theo nhóm.
pub fn staff_distribution(departments: &[Department]) -> StaffCounts {
    departments
        .iter()
        .fold(StaffCounts::default(), |mut acc, dept| {
            acc.doctors = acc.doctors.saturating_add(dept.staff_counts.doctors);
            acc.nurses = acc.nurses.saturating_add(dept.staff_counts.nurses);
            acc.support = acc.support.saturating_add(dept.staff_counts.support);
            acc
        })
}

/// Số lịch hẹn mà backend đã gắn sẵn trong bản ghi khoa.
pub fn department_appointment_counts(departments: &[Department]) -> Vec<DepartmentAppointments> {
    departments
        .iter()
        .map(|dept| DepartmentAppointments {
            name: dept.name.clone(),
            appointments: dept.total_appointments,
        })
        .collect()
}

pub fn gender_composition(slices: &[DemographicSlice]) -> GenderComposition {
    let share = |label: &str| {
        slices
            .iter()
            .find(|slice| slice.label == label)
            .map(|slice| slice.percentage)
            .unwrap_or(0.0)
    };
    GenderComposition {
        male: share("Male"),
        female: share("Female"),
    }
}
