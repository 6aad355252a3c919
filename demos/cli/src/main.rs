use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wardboard_client::{Dashboard, JsonSource, PatientFilter, ViewState};
use wardboard_core::{DashboardConfig, DataDomain, TrendOrder, API_URL_ENV};
use wardboard_normalize::normalize_str;

const DEFAULT_LOG_FILTER: &str = "wardboard_client=info,wardboard_cli=info";

#[derive(Parser, Debug)]
#[command(
    name = "wardboard-cli",
    about = "Tải và tổng hợp dữ liệu dashboard bệnh viện."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tải mọi miền từ REST API và in báo cáo tóm tắt.
    Report {
        #[arg(long, env = API_URL_ENV)]
        api_url: Option<String>,
        /// `all`, `active`, hoặc một trạng thái bất kỳ.
        #[arg(long, default_value = "active")]
        patients: PatientFilter,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Nhóm tháng theo thứ tự xuất hiện thay vì theo thời gian.
        #[arg(long)]
        first_seen: bool,
    },
    /// Chuẩn hoá một payload JSON đã lưu và in dạng chuẩn.
    Normalize {
        #[arg(short, long)]
        domain: DataDomain,
        /// Đường dẫn tới file JSON.
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Report {
            api_url,
            patients,
            timeout_secs,
            first_seen,
        } => {
            let mut config = DashboardConfig::from_env();
            if let Some(url) = api_url {
                config.api_url = url;
            }
            if let Some(secs) = timeout_secs {
                config.request_timeout_secs = secs;
            }
            if first_seen {
                config.trend_order = TrendOrder::FirstSeen;
            }
            let dashboard = Dashboard::connect(config)
                .context("Không khởi tạo được client REST")?;
            info!(api_url = %dashboard.config().api_url, ?patients, "đang tải dashboard");
            dashboard.load_all(&patients).await;
            print_report(&dashboard);
        }
        Command::Normalize { domain, input } => {
            let data = std::fs::read_to_string(&input)
                .with_context(|| format!("Không đọc được file {:?}", input))?;
            let canonical = normalize_str(domain, &data)?;
            println!("{}", serde_json::to_string_pretty(&canonical)?);
        }
    }

    Ok(())
}

fn status_line<T>(label: &str, state: &ViewState<T>, describe: impl FnOnce(&T) -> String) {
    let text = match state {
        ViewState::Idle => "chưa tải".to_string(),
        ViewState::Loading => "đang tải".to_string(),
        ViewState::Success(data) => describe(data),
        ViewState::Error(message) => format!("lỗi: {message}"),
    };
    println!("{label:<24} {text}");
}

fn count<T>(items: &[T]) -> String {
    format!("{} bản ghi", items.len())
}

fn print_report<S: JsonSource>(dashboard: &Dashboard<S>) {
    println!("API: {}", dashboard.config().api_url);
    status_line("Overview", &dashboard.overview.snapshot(), |stats| {
        format!("{} chỉ số", stats.len())
    });
    status_line("Departments", &dashboard.departments.snapshot(), |items| count(items));
    status_line("Patients", &dashboard.patients.snapshot(), |items| count(items));
    status_line("Staff", &dashboard.staff.snapshot(), |items| count(items));
    status_line("Appointments", &dashboard.appointments.snapshot(), |items| count(items));
    status_line("Vitals", &dashboard.vitals.snapshot(), |items| count(items));
    status_line("Activities", &dashboard.activities.snapshot(), |items| count(items));
    status_line("Inventory", &dashboard.inventory.snapshot(), |inventory| {
        format!(
            "{} vật tư ({} sắp hết), {} thiết bị",
            inventory.supplies.len(),
            inventory.low_stock().count(),
            inventory.equipment.len()
        )
    });
    status_line("Financial", &dashboard.financial_summary(), |summary| {
        format!(
            "doanh thu {:.0}, lợi nhuận {:.0}, biên {}%",
            summary.total_revenue,
            summary.net_profit,
            summary.margin_display()
        )
    });
    status_line("Vitals summary", &dashboard.vitals_summary(), |summary| {
        format!("{} nguy kịch / {} ổn định", summary.critical, summary.stable)
    });
    status_line("Gender", &dashboard.gender_composition(), |gender| {
        format!("nam {}%, nữ {}%", gender.male, gender.female)
    });

    section("Lịch hẹn theo tháng", dashboard.monthly_trends().data(), |trend| {
        format!(
            "{:<10} tổng {:>3}  xong {:>3}  huỷ {:>3}  chờ {:>3}",
            trend.month, trend.total, trend.completed, trend.cancelled, trend.scheduled
        )
    });
    section("Lịch hẹn theo bác sĩ", dashboard.doctor_loads().data(), |load| {
        format!("{:<24} {}", load.doctor, load.total_appointments)
    });
    section(
        "Lịch hẹn theo khoa",
        dashboard.department_appointments.snapshot().data(),
        |dept| format!("{:<24} {}", dept.name, dept.appointments),
    );
    section(
        "Doanh thu theo khoa",
        dashboard.department_revenue_named().data(),
        |row| format!("{:<24} {:.0}", row.department, row.revenue),
    );
}

fn section<T, D: Display>(title: &str, rows: Option<&Vec<T>>, render: impl Fn(&T) -> D) {
    let Some(rows) = rows else {
        return;
    };
    println!("\n{title}");
    for row in rows {
        println!("  {}", render(row));
    }
}
