//! Bộ lọc lịch hẹn phía client (trạng thái, bác sĩ, khoảng ngày, từ khóa).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Appointment, AppointmentStatus};

/// Khoảng thời gian áp dụng cho bộ lọc ngày.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DateWindow {
    #[default]
    All,
    Today,
    /// Tuần hiện tại, từ Chủ nhật đến thứ Bảy.
    Week,
    Month,
    /// Khoảng đóng `[from, to]`.
    Range { from: NaiveDate, to: NaiveDate },
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            DateWindow::All => true,
            DateWindow::Today => date == today,
            DateWindow::Week => {
                let start =
                    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                let end = start + Duration::days(6);
                date >= start && date <= end
            }
            DateWindow::Month => date.year() == today.year() && date.month() == today.month(),
            DateWindow::Range { from, to } => date >= from && date <= to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub doctor: Option<String>,
    #[serde(default)]
    pub window: DateWindow,
    #[serde(default)]
    pub search: String,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment, today: NaiveDate) -> bool {
        if let Some(status) = &self.status {
            if &appointment.status != status {
                return false;
            }
        }

        if let Some(doctor) = &self.doctor {
            if &appointment.doctor_name != doctor {
                return false;
            }
        }

        if self.window != DateWindow::All {
            let Some(date) = appointment.date else {
                return false;
            };
            if !self.window.contains(date.date_naive(), today) {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let date_text = appointment
            .date
            .map(|date| date.to_rfc3339())
            .unwrap_or_default();
        let haystack = [
            appointment.id.as_str(),
            appointment.patient_name.as_str(),
            appointment.doctor_name.as_str(),
            date_text.as_str(),
            appointment.time.as_str(),
            appointment.kind.as_str(),
            appointment.status.as_str(),
        ];
        haystack
            .iter()
            .any(|text| text.to_lowercase().contains(&query))
    }
}

/// Giữ lại các lịch hẹn khớp bộ lọc, theo thứ tự ban đầu.
pub fn filter_appointments(
    appointments: &[Appointment],
    filter: &AppointmentFilter,
    today: NaiveDate,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appointment| filter.matches(appointment, today))
        .cloned()
        .collect()
}
