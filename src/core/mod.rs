mod engine;
mod params;
mod solver;
mod types;

pub use engine::{compare, run_comparison, simulate_buying, simulate_renting};
pub use params::{annual_to_monthly_rate, derive_parameters};
pub use solver::{
    BreakEvenConfig, BreakEvenIteration, BreakEvenResult, BreakEvenTarget, solve_break_even,
};
pub use types::{
    BetterOption, BuyingMonth, MAX_AMORTIZATION_YEARS, MAX_SIMULATION_YEARS, BuyingScenario, ComparisonResult, ComparisonSummary, Inputs, Rate,
    RentingMonth, RentingScenario, SimulationParameters,
};
