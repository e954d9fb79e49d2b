pub mod types;

pub use types::*;

use std::collections::HashSet;

use chrono::Weekday;
use futures::future::try_join_all;
use futures::try_join;

use crate::effort;
use crate::error::{Error, Result};
use crate::forecast::{self, EacFormula, EtcFormula, ForecastInput};
use crate::gateway::DataGateway;
use crate::model::{Report, Sprint, TeamKey, TrackedTeamConfig, WorkItem};
use crate::proration;
use crate::timespan::DateWindow;

/// Everything the aggregator needs about a team, fetched in one concurrent
/// round-trip. The per-sprint work item reads fan out with an
/// all-or-nothing join: if any read fails, the whole calculation fails.
struct TeamData {
    config: TrackedTeamConfig,
    work_days: HashSet<Weekday>,
    sprints: Vec<Sprint>,
    /// Work items per sprint, index-aligned with `sprints`.
    sprint_items: Vec<Vec<WorkItem>>,
    backlog: Vec<WorkItem>,
}

impl TeamData {
    async fn fetch(gateway: &dyn DataGateway, team: &TeamKey) -> Result<Self> {
        let (config, work_days, sprints, backlog) = try_join!(
            gateway.read_team_config(team),
            gateway.read_team_work_days(team),
            gateway.read_team_sprints(team),
            gateway.read_backlog_work_items(team),
        )?;

        let sprint_items = try_join_all(
            sprints
                .iter()
                .map(|sprint| gateway.read_sprint_work_items(team, &sprint.id)),
        )
        .await?;

        Ok(Self {
            config,
            work_days,
            sprints,
            sprint_items,
            backlog,
        })
    }

    /// The team's overall schedule: earliest scheduled sprint start through
    /// the configured deadline.
    fn project_window(&self) -> Result<DateWindow> {
        let start = self
            .sprints
            .iter()
            .filter(|s| s.is_scheduled())
            .filter_map(|s| s.start)
            .min()
            .ok_or_else(|| Error::NoSprints(self.config.key.to_string()))?;
        let deadline = self.config.require_deadline()?;
        Ok(DateWindow::new(start, deadline))
    }

    /// Full product scope in effort points: every sprint work item plus the
    /// unscheduled backlog.
    fn total_effort(&self) -> f64 {
        let sprint_effort: f64 = self
            .sprint_items
            .iter()
            .map(|items| effort::total_effort(items))
            .sum();
        sprint_effort + effort::total_effort(&self.backlog)
    }

    /// Done-state effort prorated into `window` across all scheduled
    /// sprints.
    fn completed_effort_within(&self, window: &DateWindow) -> Result<f64> {
        let mut completed = 0.0;
        for (sprint, items) in self.sprints.iter().zip(&self.sprint_items) {
            let done = effort::completed_effort(items);
            if let Some(adjusted) = proration::prorate(sprint, window, done)? {
                completed += adjusted.effort;
            }
        }
        Ok(completed)
    }
}

/// Compute planned value, earned value, and actual cost for a single report
/// window.
///
/// Planned value prorates the full product scope by the ratio of working
/// days in the report window to working days in the overall project window;
/// earned value is the Done effort prorated into the window. Both windows
/// are clipped to the team deadline first.
pub async fn calculate_report_basic_metrics(
    gateway: &dyn DataGateway,
    team: &TeamKey,
    report: &Report,
) -> Result<BasicMetrics> {
    let (window, expenditure) = report.require_complete()?;
    let data = TeamData::fetch(gateway, team).await?;
    basic_metrics(&data, &window, expenditure)
}

fn basic_metrics(data: &TeamData, window: &DateWindow, expenditure: i64) -> Result<BasicMetrics> {
    let project_window = data.project_window()?;
    let deadline = project_window.end;

    // Neither a report nor the project extends past the deadline for
    // planned-value purposes.
    let report_window = window.clamp_end(deadline);

    let report_days = report_window.working_days(&data.work_days);
    let project_days = project_window.working_days(&data.work_days);
    let planned_effort = if project_days == 0 {
        0.0
    } else {
        report_days as f64 / project_days as f64 * data.total_effort()
    };

    let cost_per_effort = data.config.require_cost_per_effort()?;
    let completed_effort = data.completed_effort_within(&report_window)?;

    log::debug!(
        "basic metrics for {} over {report_window}: planned effort {planned_effort:.2}, completed effort {completed_effort:.2}",
        data.config.key
    );

    Ok(BasicMetrics {
        planned_value: (cost_per_effort as f64 * planned_effort).round() as i64,
        earned_value: (cost_per_effort as f64 * completed_effort).round() as i64,
        actual_cost: expenditure,
    })
}

/// Fold a team's report history into one cumulative metric vector at the
/// cut point after the last supplied report.
pub async fn calculate_cumulative_metrics(
    gateway: &dyn DataGateway,
    team: &TeamKey,
    reports: &[Report],
    eac: EacFormula,
    etc: EtcFormula,
) -> Result<MetricsCollection> {
    // Validate the whole batch up front so the caller gets a single error
    // for incomplete history, before any fetching or forecasting.
    let windows: Vec<DateWindow> = reports
        .iter()
        .map(|r| r.window())
        .collect::<Result<Vec<_>>>()?;

    let (report_basics, data) = try_join!(
        try_join_all(
            reports
                .iter()
                .map(|report| calculate_report_basic_metrics(gateway, team, report)),
        ),
        TeamData::fetch(gateway, team),
    )?;

    let basic = report_basics
        .into_iter()
        .fold(BasicMetrics::default(), |acc, b| acc + b);
    let health = HealthMetrics::from_basic(&basic);

    // Full product scope: effort completed inside every reported window
    // plus whatever still sits in the unscheduled backlog.
    let deadline = data.config.require_deadline()?;
    let mut total_effort = effort::total_effort(&data.backlog);
    for window in &windows {
        total_effort += data.completed_effort_within(&window.clamp_end(deadline))?;
    }

    let cost_per_effort = data.config.require_cost_per_effort()?;
    let budget_at_completion = (cost_per_effort as f64 * total_effort).round() as i64;

    let forecast = forecast::resolve(
        eac,
        etc,
        &ForecastInput {
            budget_at_completion,
            earned_value: basic.earned_value,
            actual_cost: basic.actual_cost,
            cost_performance_index: health.cost_performance_index,
        },
    )?;

    Ok(MetricsCollection {
        basic,
        health,
        forecast,
    })
}

/// Preview the effect of an as-yet-uncommitted report: cumulative metrics
/// over the existing history, plus the field-wise change the candidate
/// would introduce.
pub async fn calculate_report_delta(
    gateway: &dyn DataGateway,
    team: &TeamKey,
    history: &[Report],
    candidate: &Report,
    eac: EacFormula,
    etc: EtcFormula,
) -> Result<ReportPreview> {
    let mut with_candidate = history.to_vec();
    with_candidate.push(candidate.clone());

    let (before, after) = try_join!(
        calculate_cumulative_metrics(gateway, team, history, eac, etc),
        calculate_cumulative_metrics(gateway, team, &with_candidate, eac, etc),
    )?;

    Ok(ReportPreview {
        cumulative: before,
        delta: after - before,
    })
}
