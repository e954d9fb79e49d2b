use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Weekday;

use crate::error::Result;
use crate::model::{Report, Sprint, TeamKey, TrackedTeamConfig, WorkItem};
use crate::timespan::DateWindow;

/// Read contract against the project-tracking service.
///
/// Reads may be invoked concurrently for the same team; implementations are
/// expected to be idempotent (and cached upstream if fetching is expensive,
/// see [`crate::cache::CachingGateway`]).
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn read_team_sprints(&self, team: &TeamKey) -> Result<Vec<Sprint>>;

    async fn read_sprint_work_items(&self, team: &TeamKey, sprint_id: &str)
        -> Result<Vec<WorkItem>>;

    /// Work items not yet assigned to any sprint.
    async fn read_backlog_work_items(&self, team: &TeamKey) -> Result<Vec<WorkItem>>;

    async fn read_team_work_days(&self, team: &TeamKey) -> Result<HashSet<Weekday>>;

    async fn read_team_config(&self, team: &TeamKey) -> Result<TrackedTeamConfig>;
}

/// Persistence contract for cost reports. Reports are append-only; the
/// engine never reads a report back in the request that created it.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn read_team_reports(&self, team: &TeamKey) -> Result<Vec<Report>>;

    async fn create_report(
        &self,
        team: &TeamKey,
        window: DateWindow,
        expenditure: i64,
    ) -> Result<()>;
}
