use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::date_util::last_day_of_month;

/// A calendar window [start, end], both ends inclusive.
///
/// This is the single interval primitive shared by sprint proration and
/// report-window planning; overlap tests and intersections go through
/// [`DateWindow::overlaps`] and [`DateWindow::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap();
        Self::new(start, last_day_of_month(date.year(), date.month()))
    }

    /// Two windows intersect iff each starts no later than the other ends.
    /// Covers containment in either direction and partial overlap at
    /// either edge.
    pub fn overlaps(&self, other: &DateWindow) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// The intersection of two windows, or `None` if it is empty.
    ///
    /// Computed from the bounds rather than via [`DateWindow::overlaps`]:
    /// an inverted window (end before start, as produced by clamping a
    /// window that lies entirely past its limit) intersects nothing.
    pub fn clip(&self, other: &DateWindow) -> Option<DateWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            return None;
        }
        Some(DateWindow::new(start, end))
    }

    /// Whole days between start and end. Zero for a single-day window.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// This window with its end pulled back to `limit` if it extends past
    /// it. The start is never moved.
    pub fn clamp_end(&self, limit: NaiveDate) -> DateWindow {
        DateWindow::new(self.start, self.end.min(limit))
    }

    /// Count the days in the window whose weekday is in `work_days`.
    ///
    /// This is a day-by-day scan on purpose: work-day sets are arbitrary
    /// set membership, not a fixed ratio of the week.
    pub fn working_days(&self, work_days: &HashSet<Weekday>) -> u32 {
        let mut count = 0;
        let mut cursor = self.start;
        while cursor <= self.end {
            if work_days.contains(&cursor.weekday()) {
                count += 1;
            }
            cursor += Duration::days(1);
        }
        count
    }

    /// Every calendar month whose first day falls within this window,
    /// ascending.
    pub fn months(&self) -> Vec<DateWindow> {
        let mut months = Vec::new();
        let first = NaiveDate::from_ymd_opt(self.start.year(), self.start.month(), 1).unwrap();
        let mut cursor = if first == self.start {
            first
        } else {
            next_month_start(first)
        };
        while cursor <= self.end {
            months.push(DateWindow::month_of(cursor));
            cursor = next_month_start(cursor);
        }
        months
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    last_day_of_month(date.year(), date.month()) + Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn w(s: NaiveDate, e: NaiveDate) -> DateWindow {
        DateWindow::new(s, e)
    }

    #[test]
    fn test_overlaps_partial_and_contained() {
        let jan = w(d(2025, 1, 1), d(2025, 1, 31));
        // Partial overlap at either edge
        assert!(jan.overlaps(&w(d(2024, 12, 20), d(2025, 1, 5))));
        assert!(jan.overlaps(&w(d(2025, 1, 25), d(2025, 2, 5))));
        // Fully inside / fully containing
        assert!(jan.overlaps(&w(d(2025, 1, 10), d(2025, 1, 20))));
        assert!(jan.overlaps(&w(d(2024, 12, 1), d(2025, 3, 1))));
        // Shared single day counts
        assert!(jan.overlaps(&w(d(2025, 1, 31), d(2025, 2, 28))));
    }

    #[test]
    fn test_overlaps_disjoint() {
        let jan = w(d(2025, 1, 1), d(2025, 1, 31));
        assert!(!jan.overlaps(&w(d(2025, 2, 1), d(2025, 2, 28))));
        assert!(!jan.overlaps(&w(d(2024, 12, 1), d(2024, 12, 31))));
    }

    #[test]
    fn test_clip() {
        let jan = w(d(2025, 1, 1), d(2025, 1, 31));
        let clipped = jan.clip(&w(d(2025, 1, 16), d(2025, 2, 15))).unwrap();
        assert_eq!(clipped, w(d(2025, 1, 16), d(2025, 1, 31)));

        assert!(jan.clip(&w(d(2025, 3, 1), d(2025, 3, 31))).is_none());
    }

    #[test]
    fn test_clip_inverted_window_is_empty() {
        // Clamping a window that lies wholly past the limit turns it
        // inside out; such a window must clip to nothing.
        let inverted = w(d(2025, 4, 1), d(2025, 3, 31));
        let march = w(d(2025, 3, 1), d(2025, 4, 30));
        assert!(march.clip(&inverted).is_none());
        assert!(inverted.clip(&march).is_none());
    }

    #[test]
    fn test_duration_days() {
        assert_eq!(w(d(2025, 1, 1), d(2025, 1, 31)).duration_days(), 30);
        assert_eq!(w(d(2025, 1, 1), d(2025, 1, 1)).duration_days(), 0);
    }

    #[test]
    fn test_clamp_end() {
        let window = w(d(2025, 1, 1), d(2025, 3, 31));
        assert_eq!(
            window.clamp_end(d(2025, 2, 15)),
            w(d(2025, 1, 1), d(2025, 2, 15))
        );
        // Limit past the end leaves the window alone
        assert_eq!(window.clamp_end(d(2025, 6, 1)), window);
    }

    #[test]
    fn test_working_days_all_week() {
        let all: HashSet<Weekday> = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .collect();
        assert_eq!(w(d(2025, 1, 1), d(2025, 1, 31)).working_days(&all), 31);
    }

    #[test]
    fn test_working_days_weekdays_only() {
        let weekdays: HashSet<Weekday> = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ]
        .into_iter()
        .collect();
        // January 2025 has 23 weekdays
        assert_eq!(
            w(d(2025, 1, 1), d(2025, 1, 31)).working_days(&weekdays),
            23
        );
        // A weekend-only window counts zero
        assert_eq!(w(d(2025, 1, 4), d(2025, 1, 5)).working_days(&weekdays), 0);
    }

    #[test]
    fn test_months_aligned_timeline() {
        let months = w(d(2025, 1, 1), d(2025, 3, 31)).months();
        assert_eq!(
            months,
            vec![
                w(d(2025, 1, 1), d(2025, 1, 31)),
                w(d(2025, 2, 1), d(2025, 2, 28)),
                w(d(2025, 3, 1), d(2025, 3, 31)),
            ]
        );
    }

    #[test]
    fn test_months_midmonth_start_skips_partial_month() {
        // Only months whose first day is inside the timeline qualify
        let months = w(d(2025, 1, 15), d(2025, 3, 10)).months();
        assert_eq!(
            months,
            vec![
                w(d(2025, 2, 1), d(2025, 2, 28)),
                w(d(2025, 3, 1), d(2025, 3, 31)),
            ]
        );
    }

    #[test]
    fn test_month_of() {
        assert_eq!(
            DateWindow::month_of(d(2024, 2, 10)),
            w(d(2024, 2, 1), d(2024, 2, 29))
        );
    }
}
