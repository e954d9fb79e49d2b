use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forecast::EacFormula;
use crate::timespan::DateWindow;

/// Identity of a tracked team inside the project-tracking service.
/// All three parts are opaque strings; together they are the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamKey {
    pub organization: String,
    pub project: String,
    pub team: String,
}

impl TeamKey {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
            team: team.into(),
        }
    }

    /// Parse an `org/project/team` key as passed on the command line.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [org, project, team] if !org.is_empty() && !project.is_empty() && !team.is_empty() => {
                Ok(Self::new(*org, *project, *team))
            }
            _ => Err(Error::Config(format!(
                "invalid team key (expected org/project/team): {s}"
            ))),
        }
    }
}

impl std::fmt::Display for TeamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.organization, self.project, self.team)
    }
}

/// Where a sprint sits relative to today, as reported by the tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SprintTimeframe {
    Past,
    Current,
    Future,
    #[default]
    Unknown,
}

/// A time-boxed delivery period. A sprint with either date missing is
/// unscheduled and excluded from all window math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub timeframe: SprintTimeframe,
}

impl Sprint {
    /// The sprint's full window, if both dates are set.
    pub fn window(&self) -> Option<DateWindow> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateWindow::new(start, end)),
            _ => None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Completion state of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WorkItemState {
    New,
    Done,
    #[default]
    Unknown,
}

/// A unit of work with an effort estimate ("story points").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub state: WorkItemState,
    /// Non-negative effort estimate, convertible to money via cost-per-effort.
    pub effort: f64,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub business_value: Option<i64>,
}

impl WorkItem {
    pub fn is_done(&self) -> bool {
        self.state == WorkItemState::Done
    }
}

/// A user-submitted record of actual expenditure over an accounting window,
/// ordinarily one calendar month. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Actual cost over the window, in whole currency units.
    pub expenditure: Option<i64>,
}

impl Report {
    /// The report's accounting window, or `IncompleteReport` if either
    /// date is missing.
    pub fn window(&self) -> Result<DateWindow> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(DateWindow::new(start, end)),
            _ => Err(Error::IncompleteReport(format!(
                "report {} is missing a start or end date",
                self.id
            ))),
        }
    }

    /// Window and expenditure together, as required by metric calculations.
    pub fn require_complete(&self) -> Result<(DateWindow, i64)> {
        let window = self.window()?;
        let expenditure = self.expenditure.ok_or_else(|| {
            Error::IncompleteReport(format!("report {} is missing an expenditure", self.id))
        })?;
        Ok((window, expenditure))
    }
}

/// Per-team configuration maintained out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedTeamConfig {
    pub key: TeamKey,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// Currency units per effort point.
    #[serde(default)]
    pub cost_per_effort: Option<i64>,
    #[serde(default)]
    pub eac_formula: EacFormula,
}

impl TrackedTeamConfig {
    pub fn require_deadline(&self) -> Result<NaiveDate> {
        self.deadline
            .ok_or_else(|| Error::NoDeadline(self.key.to_string()))
    }

    pub fn require_cost_per_effort(&self) -> Result<i64> {
        self.cost_per_effort
            .ok_or_else(|| Error::NoEffortCost(self.key.to_string()))
    }
}

/// A sprint clipped to a target window: the fraction of its duration inside
/// the window and the effort attributable to that fraction. Derived and
/// ephemeral, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct TimespanAdjustedSprint {
    pub sprint_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Fraction of the sprint's duration inside the window, in [0, 1].
    pub work_factor: f64,
    /// Caller-supplied effort scaled by the work factor.
    pub effort: f64,
}
