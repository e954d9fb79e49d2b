use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No scheduled sprint exists, so no team timeline can be derived.
    #[error("team {0} has no scheduled sprints")]
    NoSprints(String),

    /// The team has no deadline configured but one is required.
    #[error("team {0} has no deadline configured")]
    NoDeadline(String),

    /// The team has no cost-per-effort configured but one is required.
    #[error("team {0} has no cost per effort configured")]
    NoEffortCost(String),

    /// A report is missing its start date, end date, or expenditure.
    #[error("report is missing required information: {0}")]
    IncompleteReport(String),

    /// A report carries an expenditure of zero.
    #[error("report expenditure is zero")]
    ZeroExpenditure,

    /// An operation requiring report history found none.
    #[error("team {0} has no reports")]
    NoReport(String),

    /// A sprint with zero or negative duration cannot be prorated.
    #[error("sprint {0} has an invalid date range")]
    SprintInvalidDate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("gateway error: {0}")]
    Gateway(String),
}

pub type Result<T> = std::result::Result<T, Error>;
