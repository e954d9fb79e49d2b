pub mod cache;
pub mod date_util;
pub mod effort;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod metrics;
pub mod model;
pub mod planner;
pub mod proration;
pub mod snapshot;
pub mod timespan;

pub use cache::CachingGateway;
pub use error::{Error, Result};
pub use forecast::{EacFormula, EtcFormula};
pub use gateway::{DataGateway, ReportStore};
pub use metrics::{
    BasicMetrics, ForecastMetrics, HealthMetrics, MetricsCollection, ReportHealth, ReportPreview,
    TimelineEntry,
};
pub use model::{
    Report, Sprint, SprintTimeframe, TeamKey, TimespanAdjustedSprint, TrackedTeamConfig, WorkItem,
    WorkItemState,
};
pub use snapshot::{MemoryReportStore, Snapshot, SnapshotGateway};
pub use timespan::DateWindow;

use std::sync::Arc;

use futures::future::try_join_all;

/// Main entry point for EVM health monitoring.
///
/// Owns the two external collaborators — the tracking-service gateway and
/// the report store — and exposes the calculation operations the API layer
/// consumes. Purely functional over its inputs: every call recomputes from
/// what the collaborators return, with no state held here.
pub struct Evmon {
    gateway: Arc<dyn DataGateway>,
    store: Arc<dyn ReportStore>,
}

impl Evmon {
    pub fn new(gateway: Arc<dyn DataGateway>, store: Arc<dyn ReportStore>) -> Self {
        Self { gateway, store }
    }

    // ── Metric calculations ────────────────────────────────────────

    /// Preview a candidate report against the team's existing history:
    /// cumulative metrics as they stand, plus the delta the candidate
    /// would introduce. The candidate is not persisted.
    ///
    /// The EAC formula comes from team configuration; the ETC formula is
    /// chosen per request.
    pub async fn calculate_report_metrics(
        &self,
        team: &TeamKey,
        candidate: &Report,
        etc: EtcFormula,
    ) -> Result<ReportPreview> {
        let (_, expenditure) = candidate.require_complete()?;
        if expenditure == 0 {
            return Err(Error::ZeroExpenditure);
        }

        let config = self.gateway.read_team_config(team).await?;
        let history = self.store.read_team_reports(team).await?;

        metrics::calculate_report_delta(
            self.gateway.as_ref(),
            team,
            &history,
            candidate,
            config.eac_formula,
            etc,
        )
        .await
    }

    /// Cumulative metrics over the team's full report history, with ETC
    /// derived from the configured EAC formula.
    pub async fn calculate_team_metrics_overview(
        &self,
        team: &TeamKey,
    ) -> Result<MetricsCollection> {
        let reports = self.store.read_team_reports(team).await?;
        if reports.is_empty() {
            return Err(Error::NoReport(team.to_string()));
        }

        let config = self.gateway.read_team_config(team).await?;
        if config.eac_formula == EacFormula::Derived {
            return Err(Error::Config(format!(
                "team {team} is configured with a derived EAC formula; nothing to derive it from"
            )));
        }

        metrics::calculate_cumulative_metrics(
            self.gateway.as_ref(),
            team,
            &reports,
            config.eac_formula,
            EtcFormula::Derived,
        )
        .await
    }

    /// Per-report basic and health metrics, ordered by report start,
    /// optionally restricted to reports overlapping `range`.
    pub async fn calculate_timeline_metrics(
        &self,
        team: &TeamKey,
        range: Option<DateWindow>,
    ) -> Result<Vec<TimelineEntry>> {
        let reports = self.store.read_team_reports(team).await?;
        let selected: Vec<Report> = match range {
            Some(range) => {
                // A report without dates is an error here just as it is on
                // the unfiltered path, not something to filter away.
                let mut selected = Vec::new();
                for report in reports {
                    if report.window()?.overlaps(&range) {
                        selected.push(report);
                    }
                }
                selected
            }
            None => reports,
        };

        let basics = try_join_all(
            selected
                .iter()
                .map(|r| metrics::calculate_report_basic_metrics(self.gateway.as_ref(), team, r)),
        )
        .await?;

        let mut entries: Vec<TimelineEntry> = selected
            .into_iter()
            .zip(basics)
            .map(|(report, basic)| TimelineEntry {
                report,
                health: HealthMetrics::from_basic(&basic),
                basic,
            })
            .collect();
        entries.sort_by_key(|e| e.report.start);
        Ok(entries)
    }

    // ── Report windows and history ─────────────────────────────────

    /// Calendar months on the team timeline not yet covered by a report,
    /// ascending.
    pub async fn list_available_report_windows(&self, team: &TeamKey) -> Result<Vec<DateWindow>> {
        let sprints = self.gateway.read_team_sprints(team).await?;
        let reports = self.store.read_team_reports(team).await?;
        planner::available_report_windows(team, &sprints, &reports)
    }

    /// Existing reports with the health metrics of their own windows,
    /// most recent first.
    pub async fn list_existing_reports_with_metrics(
        &self,
        team: &TeamKey,
    ) -> Result<Vec<ReportHealth>> {
        let reports = self.store.read_team_reports(team).await?;

        let basics = try_join_all(
            reports
                .iter()
                .map(|r| metrics::calculate_report_basic_metrics(self.gateway.as_ref(), team, r)),
        )
        .await?;

        let mut entries: Vec<ReportHealth> = reports
            .into_iter()
            .zip(basics)
            .map(|(report, basic)| ReportHealth {
                report,
                health: HealthMetrics::from_basic(&basic),
            })
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.report.start));
        Ok(entries)
    }

    /// Persist a new expenditure report. Fire-and-forget: the report is
    /// not read back in the same request.
    pub async fn create_report(
        &self,
        team: &TeamKey,
        window: DateWindow,
        expenditure: i64,
    ) -> Result<()> {
        if expenditure == 0 {
            return Err(Error::ZeroExpenditure);
        }
        self.store.create_report(team, window, expenditure).await
    }
}
