use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::ForecastMetrics;

/// Formula used to derive the estimate at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EacFormula {
    /// EAC = ETC + AC (requires a non-derived ETC formula).
    Derived,
    /// EAC = BAC / CPI.
    #[default]
    Basic,
    /// EAC = AC + BAC - EV.
    Atypical,
    /// EAC = AC + (BAC - EV) / CPI.
    Typical,
}

impl EacFormula {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "derived" => Ok(Self::Derived),
            "basic" => Ok(Self::Basic),
            "atypical" => Ok(Self::Atypical),
            "typical" => Ok(Self::Typical),
            _ => Err(Error::Config(format!("unrecognized EAC formula: {s}"))),
        }
    }
}

/// Formula used to derive the estimate to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EtcFormula {
    /// ETC = EAC - AC (requires a non-derived EAC formula).
    #[default]
    Derived,
    /// ETC = BAC - EV.
    Atypical,
    /// ETC = (BAC - EV) / CPI.
    Typical,
}

impl EtcFormula {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "derived" => Ok(Self::Derived),
            "atypical" => Ok(Self::Atypical),
            "typical" => Ok(Self::Typical),
            _ => Err(Error::Config(format!("unrecognized ETC formula: {s}"))),
        }
    }
}

/// Cumulative figures the forecast formulas operate on.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInput {
    pub budget_at_completion: i64,
    pub earned_value: i64,
    pub actual_cost: i64,
    pub cost_performance_index: f64,
}

/// Resolve the EAC/ETC formula pair against the cumulative figures.
///
/// Each formula, when `Derived`, is defined in terms of the other's
/// already-computed value, so `Derived` on both sides is a genuine circular
/// dependency and is rejected before any arithmetic happens.
pub fn resolve(eac: EacFormula, etc: EtcFormula, input: &ForecastInput) -> Result<ForecastMetrics> {
    if eac == EacFormula::Derived && etc == EtcFormula::Derived {
        return Err(Error::Config(
            "EAC and ETC formulas cannot both be derived".into(),
        ));
    }

    let (estimate_at_completion, estimate_to_completion) = if etc == EtcFormula::Derived {
        let eac_value = eac_from_formula(eac, input);
        (eac_value, eac_value - input.actual_cost)
    } else if eac == EacFormula::Derived {
        let etc_value = etc_from_formula(etc, input);
        (etc_value + input.actual_cost, etc_value)
    } else {
        (eac_from_formula(eac, input), etc_from_formula(etc, input))
    };

    Ok(ForecastMetrics {
        budget_at_completion: input.budget_at_completion,
        estimate_to_completion,
        estimate_at_completion,
        variance_at_completion: input.budget_at_completion - estimate_at_completion,
    })
}

fn eac_from_formula(formula: EacFormula, input: &ForecastInput) -> i64 {
    let bac = input.budget_at_completion;
    let ev = input.earned_value;
    let ac = input.actual_cost;
    let cpi = input.cost_performance_index;
    match formula {
        EacFormula::Derived => unreachable!("derived EAC is resolved by the caller"),
        EacFormula::Basic => guarded_div(bac, cpi),
        EacFormula::Atypical => ac + bac - ev,
        EacFormula::Typical => ac + guarded_div(bac - ev, cpi),
    }
}

fn etc_from_formula(formula: EtcFormula, input: &ForecastInput) -> i64 {
    let bac = input.budget_at_completion;
    let ev = input.earned_value;
    let cpi = input.cost_performance_index;
    match formula {
        EtcFormula::Derived => unreachable!("derived ETC is resolved by the caller"),
        EtcFormula::Atypical => bac - ev,
        EtcFormula::Typical => guarded_div(bac - ev, cpi),
    }
}

fn guarded_div(amount: i64, cpi: f64) -> i64 {
    if cpi == 0.0 {
        0
    } else {
        (amount as f64 / cpi).round() as i64
    }
}
