use std::fmt;

use serde::Serialize;

pub const MAX_SIMULATION_YEARS: u32 = 50;
pub const MAX_AMORTIZATION_YEARS: u32 = 50;

/// Validated simulation inputs. Rates are fractions (0.03 = 3%).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub house_price: f64,
    pub down_payment: f64,
    pub mortgage_interest_rate_annual: f64,
    pub etf_annual_yield: f64,
    pub house_price_annual_yield: f64,
    pub house_maintenance_percent_annual: f64,
    pub monthly_rent: f64,
    pub mortgage_percent: f64,
    pub mortgage_amortization_years: u32,
    pub rent_annual_increase: f64,
    pub simulation_years: u32,
}

impl Inputs {
    pub fn simulation_months(&self) -> u32 {
        self.simulation_years.saturating_mul(12)
    }

    pub(crate) fn numeric_fields(&self) -> [(&'static str, f64); 9] {
        [
            ("house_price", self.house_price),
            ("down_payment", self.down_payment),
            (
                "mortgage_interest_rate_annual",
                self.mortgage_interest_rate_annual,
            ),
            ("etf_annual_yield", self.etf_annual_yield),
            ("house_price_annual_yield", self.house_price_annual_yield),
            (
                "house_maintenance_percent_annual",
                self.house_maintenance_percent_annual,
            ),
            ("monthly_rent", self.monthly_rent),
            ("mortgage_percent", self.mortgage_percent),
            ("rent_annual_increase", self.rent_annual_increase),
        ]
    }
}

/// An annual rate together with its effective monthly equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub annual: f64,
    pub monthly: f64,
}

/// Quantities derived once from [`Inputs`] and shared by both paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub house_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    /// Loan balance floor; never above `loan_amount`.
    pub target_mortgage_amount: f64,
    pub amortization_shortfall: f64,
    pub mortgage_interest: Rate,
    pub investment_yield: Rate,
    pub house_appreciation: Rate,
    pub maintenance: Rate,
    pub rent_increase: Rate,
    pub amortization_months: u32,
    pub monthly_amortization: f64,
    /// `loan_amount * mortgage_interest.monthly`, held fixed.
    pub monthly_interest_baseline: f64,
    /// Nominal maintenance, does not follow house value.
    pub monthly_maintenance: f64,
    pub initial_monthly_rent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyingMonth {
    pub month: u32,
    pub comparison_rent: f64,
    pub interest_paid: f64,
    pub amortization_paid: f64,
    pub monthly_cost: f64,
    pub house_value: f64,
    pub remaining_loan: f64,
    pub equity: f64,
    pub monthly_investment: f64,
    pub investment_portfolio: f64,
    pub total_wealth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentingMonth {
    pub month: u32,
    pub monthly_cost: f64,
    pub ownership_cost: f64,
    pub monthly_investment: f64,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyingScenario {
    pub monthly_interest_baseline: f64,
    pub monthly_amortization: f64,
    pub monthly_maintenance: f64,
    pub initial_monthly_cost: f64,
    pub months: Vec<BuyingMonth>,
    pub final_house_value: f64,
    pub final_equity: f64,
    pub final_investment_portfolio: f64,
    pub final_total_wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentingScenario {
    pub initial_monthly_rent: f64,
    pub initial_investment: f64,
    pub monthly_amortization: f64,
    pub amortization_months: u32,
    pub months: Vec<RentingMonth>,
    pub final_monthly_rent: f64,
    pub final_portfolio_value: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BetterOption {
    Buying,
    Renting,
}

impl BetterOption {
    /// Ties go to renting.
    pub fn from_difference(wealth_difference: f64) -> Self {
        if wealth_difference > 0.0 {
            BetterOption::Buying
        } else {
            BetterOption::Renting
        }
    }
}

impl fmt::Display for BetterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetterOption::Buying => f.write_str("Buying"),
            BetterOption::Renting => f.write_str("Renting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub buying_total_cost: f64,
    pub renting_total_cost: f64,
    pub buying_total_invested: f64,
    pub renting_total_invested: f64,
    pub buying_final_wealth: f64,
    pub renting_final_wealth: f64,
    pub wealth_difference: f64,
    pub better_option: BetterOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub parameters: SimulationParameters,
    pub buying: BuyingScenario,
    pub renting: RentingScenario,
    pub comparison: ComparisonSummary,
}
