use super::types::{Inputs, Rate, SimulationParameters};

/// Effective monthly rate `m` with `(1 + m)^12 = 1 + annual`.
pub fn annual_to_monthly_rate(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}

impl Rate {
    pub fn from_annual(annual: f64) -> Self {
        Self {
            annual,
            monthly: annual_to_monthly_rate(annual),
        }
    }
}

pub fn derive_parameters(inputs: &Inputs) -> SimulationParameters {
    let mortgage_interest = Rate::from_annual(inputs.mortgage_interest_rate_annual);
    let maintenance = Rate::from_annual(inputs.house_maintenance_percent_annual);

    let loan_amount = inputs.house_price - inputs.down_payment;
    let target_mortgage_amount = (inputs.house_price * inputs.mortgage_percent)
        .min(loan_amount)
        .max(0.0);
    let amortization_shortfall = (loan_amount - target_mortgage_amount).max(0.0);
    let amortization_months = inputs.mortgage_amortization_years.saturating_mul(12);
    let monthly_amortization = if amortization_months > 0 {
        amortization_shortfall / f64::from(amortization_months)
    } else {
        0.0
    };

    SimulationParameters {
        house_price: inputs.house_price,
        down_payment: inputs.down_payment,
        loan_amount,
        target_mortgage_amount,
        amortization_shortfall,
        mortgage_interest,
        investment_yield: Rate::from_annual(inputs.etf_annual_yield),
        house_appreciation: Rate::from_annual(inputs.house_price_annual_yield),
        maintenance,
        rent_increase: Rate::from_annual(inputs.rent_annual_increase),
        amortization_months,
        monthly_amortization,
        monthly_interest_baseline: loan_amount * mortgage_interest.monthly,
        monthly_maintenance: inputs.house_price * maintenance.monthly,
        initial_monthly_rent: inputs.monthly_rent,
    }
}
