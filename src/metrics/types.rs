use std::ops::{Add, Sub};

use serde::Serialize;

use crate::model::Report;

/// Planned value, earned value, and actual cost over some window, in whole
/// currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BasicMetrics {
    pub planned_value: i64,
    pub earned_value: i64,
    pub actual_cost: i64,
}

impl Add for BasicMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            planned_value: self.planned_value + rhs.planned_value,
            earned_value: self.earned_value + rhs.earned_value,
            actual_cost: self.actual_cost + rhs.actual_cost,
        }
    }
}

impl Sub for BasicMetrics {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            planned_value: self.planned_value - rhs.planned_value,
            earned_value: self.earned_value - rhs.earned_value,
            actual_cost: self.actual_cost - rhs.actual_cost,
        }
    }
}

/// Variances and performance indices derived from [`BasicMetrics`].
/// Divisions are guarded: a zero denominator yields an index of 0, never
/// NaN or infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub cost_variance: i64,
    pub schedule_variance: i64,
    pub cost_performance_index: f64,
    pub schedule_performance_index: f64,
}

impl HealthMetrics {
    pub fn from_basic(basic: &BasicMetrics) -> Self {
        Self {
            cost_variance: basic.earned_value - basic.actual_cost,
            schedule_variance: basic.earned_value - basic.planned_value,
            cost_performance_index: guarded_ratio(basic.earned_value, basic.actual_cost),
            schedule_performance_index: guarded_ratio(basic.earned_value, basic.planned_value),
        }
    }
}

impl Add for HealthMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cost_variance: self.cost_variance + rhs.cost_variance,
            schedule_variance: self.schedule_variance + rhs.schedule_variance,
            cost_performance_index: self.cost_performance_index + rhs.cost_performance_index,
            schedule_performance_index: self.schedule_performance_index
                + rhs.schedule_performance_index,
        }
    }
}

impl Sub for HealthMetrics {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            cost_variance: self.cost_variance - rhs.cost_variance,
            schedule_variance: self.schedule_variance - rhs.schedule_variance,
            cost_performance_index: self.cost_performance_index - rhs.cost_performance_index,
            schedule_performance_index: self.schedule_performance_index
                - rhs.schedule_performance_index,
        }
    }
}

/// Forecast cost figures, in whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForecastMetrics {
    pub budget_at_completion: i64,
    pub estimate_to_completion: i64,
    pub estimate_at_completion: i64,
    pub variance_at_completion: i64,
}

impl Add for ForecastMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            budget_at_completion: self.budget_at_completion + rhs.budget_at_completion,
            estimate_to_completion: self.estimate_to_completion + rhs.estimate_to_completion,
            estimate_at_completion: self.estimate_at_completion + rhs.estimate_at_completion,
            variance_at_completion: self.variance_at_completion + rhs.variance_at_completion,
        }
    }
}

impl Sub for ForecastMetrics {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            budget_at_completion: self.budget_at_completion - rhs.budget_at_completion,
            estimate_to_completion: self.estimate_to_completion - rhs.estimate_to_completion,
            estimate_at_completion: self.estimate_at_completion - rhs.estimate_at_completion,
            variance_at_completion: self.variance_at_completion - rhs.variance_at_completion,
        }
    }
}

/// The complete metric vector for a team at a cut point. Behaves as an
/// algebraic vector: `Add`/`Sub` operate on every field independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsCollection {
    pub basic: BasicMetrics,
    pub health: HealthMetrics,
    pub forecast: ForecastMetrics,
}

impl Add for MetricsCollection {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            basic: self.basic + rhs.basic,
            health: self.health + rhs.health,
            forecast: self.forecast + rhs.forecast,
        }
    }
}

impl Sub for MetricsCollection {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            basic: self.basic - rhs.basic,
            health: self.health - rhs.health,
            forecast: self.forecast - rhs.forecast,
        }
    }
}

/// Cumulative metrics as of the existing history, plus the field-wise
/// change a candidate report would introduce.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPreview {
    pub cumulative: MetricsCollection,
    pub delta: MetricsCollection,
}

/// One timeline row: a report with its window metrics.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub report: Report,
    pub basic: BasicMetrics,
    pub health: HealthMetrics,
}

/// A stored report with the health metrics of its own window.
#[derive(Debug, Clone, Serialize)]
pub struct ReportHealth {
    pub report: Report,
    pub health: HealthMetrics,
}

fn guarded_ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
