use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Inputs, run_comparison};
use crate::error::SolveError;

/// Input varied while searching for the point where buying overtakes renting.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakEvenTarget {
    #[serde(alias = "monthlyRent", alias = "monthly_rent", alias = "rent")]
    MonthlyRent,
    #[serde(
        alias = "houseAppreciation",
        alias = "house_appreciation",
        alias = "appreciation"
    )]
    HouseAppreciation,
}

#[derive(Debug, Clone, Copy)]
pub struct BreakEvenConfig {
    pub target: BreakEvenTarget,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl BreakEvenConfig {
    pub fn for_target(target: BreakEvenTarget) -> Self {
        match target {
            BreakEvenTarget::MonthlyRent => Self {
                target,
                search_min: 1.0,
                search_max: 20_000.0,
                tolerance: 0.5,
                max_iterations: 64,
            },
            BreakEvenTarget::HouseAppreciation => Self {
                target,
                search_min: -0.10,
                search_max: 0.20,
                tolerance: 1e-5,
                max_iterations: 64,
            },
        }
    }

    /// Layers user-facing bounds over the target defaults. Appreciation
    /// bounds and tolerance are given in percent, rent ones in currency.
    pub fn from_user_bounds(
        target: BreakEvenTarget,
        search_min: Option<f64>,
        search_max: Option<f64>,
        tolerance: Option<f64>,
        max_iterations: Option<u32>,
    ) -> Self {
        let scale = match target {
            BreakEvenTarget::MonthlyRent => 1.0,
            BreakEvenTarget::HouseAppreciation => 0.01,
        };
        let defaults = Self::for_target(target);
        Self {
            target,
            search_min: search_min.map_or(defaults.search_min, |v| v * scale),
            search_max: search_max.map_or(defaults.search_max, |v| v * scale),
            tolerance: tolerance.map_or(defaults.tolerance, |v| v * scale),
            max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub wealth_difference: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenResult {
    pub target: BreakEvenTarget,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Smallest value (within tolerance) at which buying ends wealthier.
    pub solved_value: Option<f64>,
    pub wealth_difference_at_solution: Option<f64>,
    pub iterations: Vec<BreakEvenIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Bisection on the sign of the final wealth difference.
///
/// The difference is non-decreasing in house appreciation for any inputs.
/// In the initial rent it is non-decreasing only while the ETF yield is
/// non-negative: a higher rent turns idle buying months into contribution
/// months, and with a negative yield each of those shrinks the side
/// portfolio. Rent searches with a negative yield are rejected.
pub fn solve_break_even(
    inputs: &Inputs,
    config: BreakEvenConfig,
) -> Result<BreakEvenResult, SolveError> {
    validate_config(inputs, config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_diff = evaluate_candidate(inputs, config.target, config.search_min)?;
    let high_diff = evaluate_candidate(inputs, config.target, config.search_max)?;

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_diff > 0.0 {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Buying already wins at the lower search bound.".to_string();
    } else if high_diff <= 0.0 {
        feasible = false;
        message = "Renting still wins at the upper search bound; no break-even found.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let diff = evaluate_candidate(inputs, config.target, mid)?;
            iterations.push(BreakEvenIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                wealth_difference: diff,
            });

            if diff > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            "Solved break-even value.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let wealth_difference_at_solution = match solved_value {
        Some(value) => Some(evaluate_candidate(inputs, config.target, value)?),
        None => None,
    };
    debug!(
        target = ?config.target,
        ?solved_value,
        iterations = iterations.len(),
        converged,
        "break-even search finished"
    );

    Ok(BreakEvenResult {
        target: config.target,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        wealth_difference_at_solution,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    base_inputs: &Inputs,
    target: BreakEvenTarget,
    candidate_value: f64,
) -> Result<f64, SolveError> {
    let mut inputs = base_inputs.clone();
    match target {
        BreakEvenTarget::MonthlyRent => inputs.monthly_rent = candidate_value,
        BreakEvenTarget::HouseAppreciation => inputs.house_price_annual_yield = candidate_value,
    }
    let result = run_comparison(&inputs)?;
    Ok(result.comparison.wealth_difference)
}

fn validate_config(inputs: &Inputs, config: BreakEvenConfig) -> Result<(), SolveError> {
    fn invalid(msg: &str) -> Result<(), SolveError> {
        Err(SolveError::InvalidConfig(msg.to_string()))
    }

    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return invalid("search bounds must be finite");
    }
    if config.search_max <= config.search_min {
        return invalid("search_max must be greater than search_min");
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return invalid("tolerance must be > 0");
    }
    if config.max_iterations == 0 {
        return invalid("max_iterations must be > 0");
    }
    match config.target {
        BreakEvenTarget::MonthlyRent if config.search_min <= 0.0 => {
            invalid("monthly rent search_min must be > 0")
        }
        BreakEvenTarget::MonthlyRent if inputs.etf_annual_yield < 0.0 => {
            invalid("monthly rent search needs a non-negative ETF yield")
        }
        BreakEvenTarget::HouseAppreciation if config.search_min <= -1.0 => {
            invalid("appreciation search_min must be > -1")
        }
        _ => Ok(()),
    }
}
