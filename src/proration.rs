use crate::error::{Error, Result};
use crate::model::{Sprint, TimespanAdjustedSprint};
use crate::timespan::DateWindow;

/// Cut a sprint down to `window`, scaling `effort` by the fraction of the
/// sprint's duration that falls inside it.
///
/// `effort` is caller-supplied — typically the summed effort of a filtered
/// subset of the sprint's work items (e.g. only Done items) — so filtering
/// always happens before proration.
///
/// Returns `Ok(None)` when the sprint is unscheduled or does not overlap
/// the window at all. A scheduled sprint with zero or negative duration is
/// a fatal input error.
pub fn prorate(
    sprint: &Sprint,
    window: &DateWindow,
    effort: f64,
) -> Result<Option<TimespanAdjustedSprint>> {
    let sprint_window = match sprint.window() {
        Some(w) => w,
        None => return Ok(None),
    };

    if sprint_window.duration_days() <= 0 {
        return Err(Error::SprintInvalidDate(sprint.id.clone()));
    }

    let clipped = match sprint_window.clip(window) {
        Some(c) => c,
        None => return Ok(None),
    };

    let work_factor = clipped.duration_days() as f64 / sprint_window.duration_days() as f64;

    Ok(Some(TimespanAdjustedSprint {
        sprint_id: sprint.id.clone(),
        start: clipped.start,
        end: clipped.end,
        work_factor,
        effort: effort * work_factor,
    }))
}
