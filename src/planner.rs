use crate::error::{Error, Result};
use crate::model::{Report, Sprint, TeamKey};
use crate::timespan::DateWindow;

/// Calendar months on the team's timeline not yet covered by any existing
/// report, ascending by month start.
///
/// A month is taken when any report overlaps it — fully inside it, fully
/// containing it, or crossing either edge. All three cases reduce to the
/// shared [`DateWindow::overlaps`] test.
pub fn available_report_windows(
    team: &TeamKey,
    sprints: &[Sprint],
    reports: &[Report],
) -> Result<Vec<DateWindow>> {
    let timeline = team_timeline(team, sprints)?;

    let covered: Vec<DateWindow> = reports
        .iter()
        // A report without both dates covers nothing
        .filter_map(|report| report.window().ok())
        .collect();

    let available: Vec<DateWindow> = timeline
        .months()
        .into_iter()
        .filter(|month| !covered.iter().any(|report| report.overlaps(month)))
        .collect();

    log::debug!(
        "{team}: timeline {timeline}, {} month(s) available of {}",
        available.len(),
        timeline.months().len()
    );

    Ok(available)
}

/// The team's project timeline: earliest scheduled sprint start through
/// latest scheduled sprint end.
pub fn team_timeline(team: &TeamKey, sprints: &[Sprint]) -> Result<DateWindow> {
    let scheduled: Vec<DateWindow> = sprints.iter().filter_map(|s| s.window()).collect();

    let start = scheduled.iter().map(|w| w.start).min();
    let end = scheduled.iter().map(|w| w.end).max();
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateWindow::new(start, end)),
        _ => Err(Error::NoSprints(team.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SprintTimeframe;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sprint(id: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Sprint {
        Sprint {
            id: id.into(),
            name: id.into(),
            start,
            end,
            timeframe: SprintTimeframe::Unknown,
        }
    }

    fn report(id: &str, start: NaiveDate, end: NaiveDate) -> Report {
        Report {
            id: id.into(),
            start: Some(start),
            end: Some(end),
            expenditure: Some(1000),
        }
    }

    fn team() -> TeamKey {
        TeamKey::new("acme", "widgets", "blue")
    }

    #[test]
    fn test_february_taken_leaves_january_and_march() {
        let sprints = vec![
            sprint("s1", Some(d(2025, 1, 1)), Some(d(2025, 1, 31))),
            sprint("s2", Some(d(2025, 2, 1)), Some(d(2025, 3, 31))),
        ];
        let reports = vec![report("r1", d(2025, 2, 1), d(2025, 2, 28))];

        let windows = available_report_windows(&team(), &sprints, &reports).unwrap();
        assert_eq!(
            windows,
            vec![
                DateWindow::new(d(2025, 1, 1), d(2025, 1, 31)),
                DateWindow::new(d(2025, 3, 1), d(2025, 3, 31)),
            ]
        );
    }

    #[test]
    fn test_no_reports_makes_every_month_available() {
        let sprints = vec![sprint("s1", Some(d(2025, 1, 1)), Some(d(2025, 3, 31)))];
        let windows = available_report_windows(&team(), &sprints, &[]).unwrap();
        assert_eq!(windows.len(), 3);
        assert!(windows.windows(2).all(|pair| pair[0].start < pair[1].start));
    }

    #[test]
    fn test_partial_overlap_takes_the_month() {
        let sprints = vec![sprint("s1", Some(d(2025, 1, 1)), Some(d(2025, 3, 31)))];
        // Crosses the January/February boundary: both months are taken
        let reports = vec![report("r1", d(2025, 1, 20), d(2025, 2, 10))];

        let windows = available_report_windows(&team(), &sprints, &reports).unwrap();
        assert_eq!(windows, vec![DateWindow::new(d(2025, 3, 1), d(2025, 3, 31))]);
    }

    #[test]
    fn test_report_containing_month_takes_it() {
        let sprints = vec![sprint("s1", Some(d(2025, 1, 1)), Some(d(2025, 3, 31)))];
        let reports = vec![report("r1", d(2024, 12, 15), d(2025, 3, 15))];

        let windows = available_report_windows(&team(), &sprints, &reports).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_dateless_report_covers_nothing() {
        let sprints = vec![sprint("s1", Some(d(2025, 1, 1)), Some(d(2025, 1, 31)))];
        let reports = vec![Report {
            id: "r1".into(),
            start: None,
            end: None,
            expenditure: Some(500),
        }];

        let windows = available_report_windows(&team(), &sprints, &reports).unwrap();
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn test_unscheduled_sprints_only_is_an_error() {
        let sprints = vec![sprint("s1", Some(d(2025, 1, 1)), None)];
        let result = available_report_windows(&team(), &sprints, &[]);
        assert!(matches!(result, Err(Error::NoSprints(_))));
    }

    #[test]
    fn test_timeline_spans_all_scheduled_sprints() {
        let sprints = vec![
            sprint("s1", Some(d(2025, 2, 1)), Some(d(2025, 2, 28))),
            sprint("s2", Some(d(2025, 1, 6)), Some(d(2025, 1, 19))),
            sprint("s3", None, None),
        ];
        let timeline = team_timeline(&team(), &sprints).unwrap();
        assert_eq!(timeline, DateWindow::new(d(2025, 1, 6), d(2025, 2, 28)));
    }
}
