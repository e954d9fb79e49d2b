//! Snapshot-backed collaborators: a [`DataGateway`] reading from an
//! exported JSON snapshot of the tracking service, and an in-memory
//! [`ReportStore`]. These stand in for the live REST client and the
//! relational store at the same interface boundary.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::gateway::{DataGateway, ReportStore};
use crate::model::{Report, Sprint, TeamKey, TrackedTeamConfig, WorkItem};
use crate::timespan::DateWindow;

/// Root of a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub teams: Vec<TeamSnapshot>,
}

impl Snapshot {
    /// Load and parse a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Gateway(format!("cannot read snapshot {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Gateway(format!("invalid snapshot {}: {e}", path.display())))
    }
}

/// One team's exported state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub config: TrackedTeamConfig,
    /// Weekday names, e.g. `["mon", "tue", "wed", "thu", "fri"]`.
    pub work_days: Vec<String>,
    #[serde(default)]
    pub sprints: Vec<SprintSnapshot>,
    #[serde(default)]
    pub backlog: Vec<WorkItem>,
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// A sprint together with its work items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintSnapshot {
    #[serde(flatten)]
    pub sprint: Sprint,
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
}

struct TeamEntry {
    snapshot: TeamSnapshot,
    work_days: HashSet<Weekday>,
}

/// Read-only [`DataGateway`] over a parsed snapshot.
pub struct SnapshotGateway {
    teams: HashMap<TeamKey, TeamEntry>,
}

impl SnapshotGateway {
    /// Load and parse a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_snapshot(Snapshot::load(path)?)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Self::from_teams(snapshot.teams)
    }

    pub fn from_teams(teams: Vec<TeamSnapshot>) -> Result<Self> {
        let mut map = HashMap::new();
        for snapshot in teams {
            let work_days = snapshot
                .work_days
                .iter()
                .map(|day| {
                    day.parse::<Weekday>()
                        .map_err(|_| Error::Config(format!("invalid work day: {day}")))
                })
                .collect::<Result<HashSet<Weekday>>>()?;
            map.insert(
                snapshot.config.key.clone(),
                TeamEntry {
                    snapshot,
                    work_days,
                },
            );
        }
        Ok(Self { teams: map })
    }

    fn team(&self, key: &TeamKey) -> Result<&TeamEntry> {
        self.teams
            .get(key)
            .ok_or_else(|| Error::Gateway(format!("team {key} not present in snapshot")))
    }
}

#[async_trait]
impl DataGateway for SnapshotGateway {
    async fn read_team_sprints(&self, team: &TeamKey) -> Result<Vec<Sprint>> {
        Ok(self
            .team(team)?
            .snapshot
            .sprints
            .iter()
            .map(|s| s.sprint.clone())
            .collect())
    }

    async fn read_sprint_work_items(
        &self,
        team: &TeamKey,
        sprint_id: &str,
    ) -> Result<Vec<WorkItem>> {
        let entry = self.team(team)?;
        entry
            .snapshot
            .sprints
            .iter()
            .find(|s| s.sprint.id == sprint_id)
            .map(|s| s.work_items.clone())
            .ok_or_else(|| Error::Gateway(format!("sprint {sprint_id} not present in snapshot")))
    }

    async fn read_backlog_work_items(&self, team: &TeamKey) -> Result<Vec<WorkItem>> {
        Ok(self.team(team)?.snapshot.backlog.clone())
    }

    async fn read_team_work_days(&self, team: &TeamKey) -> Result<HashSet<Weekday>> {
        Ok(self.team(team)?.work_days.clone())
    }

    async fn read_team_config(&self, team: &TeamKey) -> Result<TrackedTeamConfig> {
        Ok(self.team(team)?.snapshot.config.clone())
    }
}

/// In-memory, append-only [`ReportStore`], optionally seeded from a
/// snapshot's stored reports.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: RwLock<HashMap<TeamKey, Vec<Report>>>,
    next_id: AtomicU64,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut reports = HashMap::new();
        let mut seeded = 0u64;
        for team in &snapshot.teams {
            seeded += team.reports.len() as u64;
            reports.insert(team.config.key.clone(), team.reports.clone());
        }
        Self {
            reports: RwLock::new(reports),
            next_id: AtomicU64::new(seeded + 1),
        }
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn read_team_reports(&self, team: &TeamKey) -> Result<Vec<Report>> {
        let reports = self.reports.read().await;
        Ok(reports.get(team).cloned().unwrap_or_default())
    }

    async fn create_report(
        &self,
        team: &TeamKey,
        window: DateWindow,
        expenditure: i64,
    ) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut reports = self.reports.write().await;
        reports.entry(team.clone()).or_default().push(Report {
            id: format!("report-{id}"),
            start: Some(window.start),
            end: Some(window.end),
            expenditure: Some(expenditure),
        });
        log::info!("created report for {team} over {window}: {expenditure}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::EacFormula;
    use chrono::NaiveDate;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn team() -> TeamKey {
        TeamKey::new("acme", "widgets", "blue")
    }

    const SNAPSHOT_JSON: &str = r#"{
      "teams": [
        {
          "config": {
            "key": {"organization": "acme", "project": "widgets", "team": "blue"},
            "deadline": "2025-03-31",
            "cost_per_effort": 100,
            "eac_formula": "Basic"
          },
          "work_days": ["mon", "tue", "wed", "thu", "fri"],
          "sprints": [
            {
              "id": "s1",
              "name": "Sprint 1",
              "start": "2025-01-01",
              "end": "2025-01-14",
              "timeframe": "Past",
              "work_items": [
                {"id": "w1", "title": "Login page", "state": "Done", "effort": 5.0}
              ]
            }
          ],
          "backlog": [
            {"id": "w2", "title": "Checkout flow", "state": "New", "effort": 8.0}
          ],
          "reports": [
            {"id": "r1", "start": "2025-01-01", "end": "2025-01-31", "expenditure": 900}
          ]
        }
      ]
    }"#;

    #[tokio::test]
    async fn test_load_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT_JSON.as_bytes()).unwrap();

        let gateway = SnapshotGateway::load(file.path()).unwrap();

        let sprints = gateway.read_team_sprints(&team()).await.unwrap();
        assert_eq!(sprints.len(), 1);
        assert_eq!(sprints[0].start, Some(d(2025, 1, 1)));

        let items = gateway.read_sprint_work_items(&team(), "s1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].effort, 5.0);

        let work_days = gateway.read_team_work_days(&team()).await.unwrap();
        assert_eq!(work_days.len(), 5);
        assert!(work_days.contains(&Weekday::Mon));
        assert!(!work_days.contains(&Weekday::Sat));

        let config = gateway.read_team_config(&team()).await.unwrap();
        assert_eq!(config.cost_per_effort, Some(100));
        assert_eq!(config.eac_formula, EacFormula::Basic);
    }

    #[tokio::test]
    async fn test_unknown_team_is_gateway_error() {
        let gateway = SnapshotGateway::from_teams(vec![]).unwrap();
        let other = TeamKey::new("nope", "nope", "nope");
        assert!(matches!(
            gateway.read_team_sprints(&other).await,
            Err(Error::Gateway(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_work_day_rejected_at_load() {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();
        let mut teams = snapshot.teams;
        teams[0].work_days.push("blursday".into());
        assert!(matches!(
            SnapshotGateway::from_teams(teams),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_report_store_seed_and_append() {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();
        let store = MemoryReportStore::from_snapshot(&snapshot);

        let reports = store.read_team_reports(&team()).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].expenditure, Some(900));

        store
            .create_report(
                &team(),
                DateWindow::new(d(2025, 2, 1), d(2025, 2, 28)),
                1200,
            )
            .await
            .unwrap();

        let reports = store.read_team_reports(&team()).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].start, Some(d(2025, 2, 1)));
        assert_eq!(reports[1].expenditure, Some(1200));
        // Appended reports get fresh ids
        assert_ne!(reports[0].id, reports[1].id);
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_reports() {
        let store = MemoryReportStore::new();
        let reports = store.read_team_reports(&team()).await.unwrap();
        assert!(reports.is_empty());
    }
}
