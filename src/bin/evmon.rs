use std::sync::Arc;
use std::sync::LazyLock;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use regex::Regex;

use evmon::{
    DateWindow, EtcFormula, Evmon, MemoryReportStore, MetricsCollection, Report, SnapshotGateway,
    TeamKey,
};

static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

#[derive(Parser)]
#[command(name = "evmon", about = "EVM health monitor CLI")]
struct Cli {
    /// Path to a tracking-service snapshot file (JSON)
    #[arg(long)]
    snapshot: String,

    /// Team key as org/project/team
    #[arg(long)]
    team: String,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cumulative EVM metrics over the team's full report history
    Overview {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Preview a candidate report without persisting it
    Preview {
        /// Report window as a month (YYYY-MM)
        #[arg(long)]
        window: String,
        /// Actual cost over the window, whole currency units
        #[arg(long)]
        expenditure: i64,
        /// ETC formula: derived, atypical, typical
        #[arg(long, default_value = "derived")]
        etc_formula: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-report metrics ordered by report start
    Timeline {
        /// Restrict to reports overlapping this range start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Restrict to reports overlapping this range end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Calendar months not yet covered by a report
    Windows {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Existing reports with health metrics, most recent first
    Reports {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a new expenditure report
    AddReport {
        /// Report window as a month (YYYY-MM)
        #[arg(long)]
        window: String,
        /// Actual cost over the window, whole currency units
        #[arg(long)]
        expenditure: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let snapshot = evmon::Snapshot::load(&cli.snapshot)?;
    let store = MemoryReportStore::from_snapshot(&snapshot);
    let gateway = SnapshotGateway::from_snapshot(snapshot)?;
    let evmon = Evmon::new(Arc::new(gateway), Arc::new(store));
    let team = TeamKey::parse(&cli.team)?;

    match cli.command {
        Commands::Overview { json } => {
            let metrics = evmon.calculate_team_metrics_overview(&team).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
        }
        Commands::Preview {
            window,
            expenditure,
            etc_formula,
            json,
        } => {
            let window = parse_month(&window)?;
            let etc = EtcFormula::parse(&etc_formula)?;
            let candidate = Report {
                id: "candidate".into(),
                start: Some(window.start),
                end: Some(window.end),
                expenditure: Some(expenditure),
            };
            let preview = evmon
                .calculate_report_metrics(&team, &candidate, etc)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("Cumulative (existing history)");
                print_metrics(&preview.cumulative);
                println!();
                println!("Delta (if this report is added)");
                print_metrics(&preview.delta);
            }
        }
        Commands::Timeline { from, to, json } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(DateWindow::new(from, to)),
                (None, None) => None,
                _ => anyhow::bail!("--from and --to must be given together"),
            };
            let timeline = evmon.calculate_timeline_metrics(&team, range).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
            } else if timeline.is_empty() {
                println!("No reports.");
            } else {
                for entry in &timeline {
                    let (start, end) = (entry.report.start, entry.report.end);
                    println!(
                        "{} .. {}  PV {:>10}  EV {:>10}  AC {:>10}  CPI {:.2}  SPI {:.2}",
                        fmt_date(start),
                        fmt_date(end),
                        entry.basic.planned_value,
                        entry.basic.earned_value,
                        entry.basic.actual_cost,
                        entry.health.cost_performance_index,
                        entry.health.schedule_performance_index,
                    );
                }
            }
        }
        Commands::Windows { json } => {
            let windows = evmon.list_available_report_windows(&team).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&windows)?);
            } else if windows.is_empty() {
                println!("No report windows available.");
            } else {
                for window in &windows {
                    println!("{} .. {}", window.start, window.end);
                }
            }
        }
        Commands::Reports { json } => {
            let reports = evmon.list_existing_reports_with_metrics(&team).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No reports.");
            } else {
                for entry in &reports {
                    println!(
                        "{} .. {}  CV {:>10}  SV {:>10}  CPI {:.2}  SPI {:.2}",
                        fmt_date(entry.report.start),
                        fmt_date(entry.report.end),
                        entry.health.cost_variance,
                        entry.health.schedule_variance,
                        entry.health.cost_performance_index,
                        entry.health.schedule_performance_index,
                    );
                }
            }
        }
        Commands::AddReport {
            window,
            expenditure,
        } => {
            let window = parse_month(&window)?;
            evmon.create_report(&team, window, expenditure).await?;
            println!("Report recorded for {} .. {}", window.start, window.end);
        }
    }

    Ok(())
}

fn parse_month(s: &str) -> anyhow::Result<DateWindow> {
    let caps = RE_MONTH
        .captures(s.trim())
        .ok_or_else(|| anyhow::anyhow!("invalid month (expected YYYY-MM): {s}"))?;
    let year: i32 = caps[1].parse()?;
    let month: u32 = caps[2].parse()?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("invalid month (expected YYYY-MM): {s}");
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid month: {s}"))?;
    Ok(DateWindow::month_of(first))
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "?".into())
}

fn print_metrics(metrics: &MetricsCollection) {
    println!("  Planned value:       {:>12}", metrics.basic.planned_value);
    println!("  Earned value:        {:>12}", metrics.basic.earned_value);
    println!("  Actual cost:         {:>12}", metrics.basic.actual_cost);
    println!("  Cost variance:       {:>12}", metrics.health.cost_variance);
    println!(
        "  Schedule variance:   {:>12}",
        metrics.health.schedule_variance
    );
    println!(
        "  CPI / SPI:           {:>12}",
        format!(
            "{:.2} / {:.2}",
            metrics.health.cost_performance_index, metrics.health.schedule_performance_index
        )
    );
    println!(
        "  Budget at completion:{:>12}",
        metrics.forecast.budget_at_completion
    );
    println!(
        "  Estimate at compl.:  {:>12}",
        metrics.forecast.estimate_at_completion
    );
    println!(
        "  Estimate to compl.:  {:>12}",
        metrics.forecast.estimate_to_completion
    );
    println!(
        "  Variance at compl.:  {:>12}",
        metrics.forecast.variance_at_completion
    );
}
