use tracing::debug;

use super::params::derive_parameters;
use super::types::{
    BetterOption, MAX_AMORTIZATION_YEARS, MAX_SIMULATION_YEARS, BuyingMonth, BuyingScenario, ComparisonResult, ComparisonSummary, Inputs,
    RentingMonth, RentingScenario, SimulationParameters,
};
use crate::error::SimulationError;

/// Checked entry point. Rejects non-finite inputs and horizons beyond
/// [`MAX_SIMULATION_YEARS`] / [`MAX_AMORTIZATION_YEARS`], runs both paths
/// over `inputs.simulation_months()` and rejects non-finite aggregates.
pub fn run_comparison(inputs: &Inputs) -> Result<ComparisonResult, SimulationError> {
    for (field, value) in inputs.numeric_fields() {
        if !value.is_finite() {
            return Err(SimulationError::NonFiniteInput { field });
        }
    }
    for (field, years, max) in [
        ("simulation_years", inputs.simulation_years, MAX_SIMULATION_YEARS),
        (
            "mortgage_amortization_years",
            inputs.mortgage_amortization_years,
            MAX_AMORTIZATION_YEARS,
        ),
    ] {
        if years > max {
            return Err(SimulationError::HorizonOutOfRange { field, years, max });
        }
    }

    let params = derive_parameters(inputs);
    debug!(
        loan_amount = params.loan_amount,
        target_mortgage_amount = params.target_mortgage_amount,
        monthly_amortization = params.monthly_amortization,
        monthly_interest_baseline = params.monthly_interest_baseline,
        monthly_maintenance = params.monthly_maintenance,
        "derived simulation parameters"
    );

    let result = compare(&params, inputs.simulation_months());
    let summary = &result.comparison;
    for (field, value) in [
        ("buying_total_cost", summary.buying_total_cost),
        ("renting_total_cost", summary.renting_total_cost),
        ("buying_final_wealth", summary.buying_final_wealth),
        ("renting_final_wealth", summary.renting_final_wealth),
        ("wealth_difference", summary.wealth_difference),
    ] {
        if !value.is_finite() {
            return Err(SimulationError::NonFiniteResult { field });
        }
    }

    debug!(
        months = result.buying.months.len(),
        buying_final_wealth = summary.buying_final_wealth,
        renting_final_wealth = summary.renting_final_wealth,
        better_option = %summary.better_option,
        "comparison finished"
    );
    Ok(result)
}

pub fn compare(params: &SimulationParameters, months: u32) -> ComparisonResult {
    let buying = simulate_buying(params, months);
    let renting = simulate_renting(params, months);

    let buying_total_cost = buying.months.iter().map(|m| m.monthly_cost).sum::<f64>();
    let renting_total_cost = renting.months.iter().map(|m| m.monthly_cost).sum::<f64>();
    let buying_total_invested = buying
        .months
        .iter()
        .map(|m| m.monthly_investment)
        .sum::<f64>();
    let renting_total_invested = params.down_payment
        + renting
            .months
            .iter()
            .map(|m| m.monthly_investment.max(0.0))
            .sum::<f64>();

    let wealth_difference = buying.final_total_wealth - renting.final_portfolio_value;
    let comparison = ComparisonSummary {
        buying_total_cost,
        renting_total_cost,
        buying_total_invested,
        renting_total_invested,
        buying_final_wealth: buying.final_total_wealth,
        renting_final_wealth: renting.final_portfolio_value,
        wealth_difference,
        better_option: BetterOption::from_difference(wealth_difference),
    };

    ComparisonResult {
        parameters: params.clone(),
        buying,
        renting,
        comparison,
    }
}

pub fn simulate_buying(params: &SimulationParameters, months: u32) -> BuyingScenario {
    let mut remaining_loan = params.loan_amount;
    let mut house_value = params.house_price;
    let mut portfolio = 0.0;
    let mut comparison_rent = params.initial_monthly_rent;
    let mut records = Vec::with_capacity(months as usize);

    for month in 1..=months {
        if month > 1 {
            comparison_rent *= 1.0 + params.rent_increase.monthly;
        }

        let interest_paid = remaining_loan * params.mortgage_interest.monthly;
        let amortization_paid = if month <= params.amortization_months
            && remaining_loan > params.target_mortgage_amount
        {
            params
                .monthly_amortization
                .min(remaining_loan - params.target_mortgage_amount)
        } else {
            0.0
        };
        remaining_loan -= amortization_paid;

        let monthly_cost = interest_paid + amortization_paid + params.monthly_maintenance;

        // The side portfolio only earns yield in months that receive a contribution.
        let monthly_investment = if monthly_cost < comparison_rent {
            let slack = comparison_rent - monthly_cost;
            portfolio += slack;
            portfolio *= 1.0 + params.investment_yield.monthly;
            slack
        } else {
            0.0
        };

        house_value *= 1.0 + params.house_appreciation.monthly;
        let equity = house_value - remaining_loan;

        records.push(BuyingMonth {
            month,
            comparison_rent,
            interest_paid,
            amortization_paid,
            monthly_cost,
            house_value,
            remaining_loan,
            equity,
            monthly_investment,
            investment_portfolio: portfolio,
            total_wealth: equity + portfolio,
        });
    }

    let (final_house_value, final_equity, final_investment_portfolio, final_total_wealth) =
        match records.last() {
            Some(last) => (
                last.house_value,
                last.equity,
                last.investment_portfolio,
                last.total_wealth,
            ),
            None => {
                let equity = params.house_price - params.loan_amount;
                (params.house_price, equity, 0.0, equity)
            }
        };

    BuyingScenario {
        monthly_interest_baseline: params.monthly_interest_baseline,
        monthly_amortization: params.monthly_amortization,
        monthly_maintenance: params.monthly_maintenance,
        initial_monthly_cost: params.monthly_interest_baseline
            + params.monthly_amortization
            + params.monthly_maintenance,
        months: records,
        final_house_value,
        final_equity,
        final_investment_portfolio,
        final_total_wealth,
    }
}

/// The hypothetical ownership cost uses the fixed interest baseline, not a
/// declining balance.
pub fn simulate_renting(params: &SimulationParameters, months: u32) -> RentingScenario {
    let mut portfolio = params.down_payment;
    let mut rent = params.initial_monthly_rent;
    let mut records = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let mut ownership_cost = params.monthly_interest_baseline + params.monthly_maintenance;
        if month <= params.amortization_months {
            ownership_cost += params.monthly_amortization;
        }

        if month > 1 {
            rent *= 1.0 + params.rent_increase.monthly;
        }

        let monthly_investment = if ownership_cost < rent {
            0.0
        } else {
            let contribution = ownership_cost - rent;
            portfolio += contribution;
            contribution
        };

        portfolio *= 1.0 + params.investment_yield.monthly;

        records.push(RentingMonth {
            month,
            monthly_cost: rent,
            ownership_cost,
            monthly_investment,
            portfolio_value: portfolio,
        });
    }

    RentingScenario {
        initial_monthly_rent: params.initial_monthly_rent,
        initial_investment: params.down_payment,
        monthly_amortization: params.monthly_amortization,
        amortization_months: params.amortization_months,
        months: records,
        final_monthly_rent: rent,
        final_portfolio_value: portfolio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> Inputs {
        Inputs {
            house_price: 1_000_000.0,
            down_payment: 200_000.0,
            mortgage_interest_rate_annual: 0.03,
            etf_annual_yield: 0.007,
            house_price_annual_yield: 0.002,
            house_maintenance_percent_annual: 0.01,
            monthly_rent: 2_500.0,
            mortgage_percent: 0.67,
            mortgage_amortization_years: 15,
            rent_annual_increase: 0.03,
            simulation_years: 20,
        }
    }

    fn inputs_from_bp(
        house_price: u32,
        down_pct: u32,
        mortgage_bp: u32,
        yield_bp: i32,
        appreciation_bp: i32,
        rent: u32,
        rent_increase_bp: i32,
        mortgage_pct: u32,
        amortization_years: u32,
    ) -> Inputs {
        let house_price = f64::from(house_price);
        Inputs {
            house_price,
            down_payment: house_price * f64::from(down_pct) / 100.0,
            mortgage_interest_rate_annual: f64::from(mortgage_bp) / 10_000.0,
            etf_annual_yield: f64::from(yield_bp) / 10_000.0,
            house_price_annual_yield: f64::from(appreciation_bp) / 10_000.0,
            house_maintenance_percent_annual: 0.01,
            monthly_rent: f64::from(rent),
            mortgage_percent: f64::from(mortgage_pct) / 100.0,
            mortgage_amortization_years: amortization_years,
            rent_annual_increase: f64::from(rent_increase_bp) / 10_000.0,
            simulation_years: 1,
        }
    }

    #[test]
    fn first_buying_month_matches_hand_computation() {
        let params = derive_parameters(&sample_inputs());
        let buying = simulate_buying(&params, 1);
        let first = buying.months[0];

        let interest = 800_000.0 * params.mortgage_interest.monthly;
        let amortization = 130_000.0 / 180.0;
        let cost = interest + amortization + params.monthly_maintenance;

        assert_eq!(first.month, 1);
        assert_approx(first.comparison_rent, 2_500.0);
        assert_approx(first.interest_paid, interest);
        assert_approx(first.amortization_paid, amortization);
        assert_approx(first.monthly_cost, cost);
        assert_approx(first.remaining_loan, 800_000.0 - amortization);
        assert_approx(
            first.house_value,
            1_000_000.0 * (1.0 + params.house_appreciation.monthly),
        );
        assert_approx(first.equity, first.house_value - first.remaining_loan);
        assert_approx(first.total_wealth, first.equity + first.investment_portfolio);
    }

    #[test]
    fn first_renting_month_matches_hand_computation() {
        let params = derive_parameters(&sample_inputs());
        let renting = simulate_renting(&params, 1);
        let first = renting.months[0];

        let ownership = params.monthly_interest_baseline
            + params.monthly_maintenance
            + params.monthly_amortization;
        assert!(ownership > 2_500.0);
        assert_approx(first.ownership_cost, ownership);
        assert_approx(first.monthly_cost, 2_500.0);
        assert_approx(first.monthly_investment, ownership - 2_500.0);
        assert_approx(
            first.portfolio_value,
            (200_000.0 + ownership - 2_500.0) * (1.0 + params.investment_yield.monthly),
        );
    }

    #[test]
    fn end_to_end_example_is_consistent_with_last_records() {
        let inputs = sample_inputs();
        let result = run_comparison(&inputs).expect("valid inputs");

        assert_eq!(result.buying.months.len(), 240);
        assert_eq!(result.renting.months.len(), 240);
        assert!(result.buying.final_equity > 0.0);
        assert!(result.renting.final_portfolio_value >= inputs.down_payment);

        let last_buy = result.buying.months.last().expect("records");
        let last_rent = result.renting.months.last().expect("records");
        assert_eq!(result.buying.final_total_wealth, last_buy.total_wealth);
        assert_eq!(result.renting.final_portfolio_value, last_rent.portfolio_value);
        assert_eq!(
            result.comparison.wealth_difference,
            last_buy.total_wealth - last_rent.portfolio_value
        );
        assert_eq!(
            result.comparison.better_option,
            BetterOption::from_difference(result.comparison.wealth_difference)
        );
    }

    #[test]
    fn aggregates_sum_monthly_records() {
        let params = derive_parameters(&sample_inputs());
        let result = compare(&params, 240);

        let buy_cost: f64 = result.buying.months.iter().map(|m| m.monthly_cost).sum();
        let rent_cost: f64 = result.renting.months.iter().map(|m| m.monthly_cost).sum();
        let buy_invested: f64 = result
            .buying
            .months
            .iter()
            .map(|m| m.monthly_investment)
            .sum();
        let rent_invested: f64 = result
            .renting
            .months
            .iter()
            .map(|m| m.monthly_investment)
            .sum();

        assert_approx(result.comparison.buying_total_cost, buy_cost);
        assert_approx(result.comparison.renting_total_cost, rent_cost);
        assert_approx(result.comparison.buying_total_invested, buy_invested);
        assert_approx(
            result.comparison.renting_total_invested,
            200_000.0 + rent_invested,
        );
    }

    #[test]
    fn loan_amortizes_to_target_then_holds_flat() {
        let mut inputs = sample_inputs();
        inputs.mortgage_amortization_years = 2;
        let params = derive_parameters(&inputs);
        let buying = simulate_buying(&params, 60);

        for pair in buying.months[..24].windows(2) {
            assert!(pair[1].remaining_loan < pair[0].remaining_loan);
        }
        assert_approx(buying.months[23].remaining_loan, params.target_mortgage_amount);
        for record in &buying.months[24..] {
            assert_eq!(record.amortization_paid, 0.0);
            assert_eq!(record.remaining_loan, buying.months[23].remaining_loan);
            assert_approx(
                record.interest_paid,
                record.remaining_loan * params.mortgage_interest.monthly,
            );
        }
    }

    #[test]
    fn zero_amortization_horizon_keeps_loan_constant() {
        let mut inputs = sample_inputs();
        inputs.mortgage_amortization_years = 0;
        let params = derive_parameters(&inputs);
        assert_eq!(params.monthly_amortization, 0.0);

        let buying = simulate_buying(&params, 120);
        for record in &buying.months {
            assert_eq!(record.remaining_loan, params.loan_amount);
            assert_eq!(record.amortization_paid, 0.0);
        }

        let renting = simulate_renting(&params, 120);
        for record in &renting.months {
            assert_approx(
                record.ownership_cost,
                params.monthly_interest_baseline + params.monthly_maintenance,
            );
        }
    }

    #[test]
    fn side_portfolio_never_leaves_zero_when_rent_is_below_cost() {
        let mut inputs = sample_inputs();
        inputs.monthly_rent = 1.0;
        inputs.rent_annual_increase = 0.0;
        inputs.etf_annual_yield = 0.5;
        let params = derive_parameters(&inputs);
        let buying = simulate_buying(&params, 240);

        for record in &buying.months {
            assert_eq!(record.monthly_investment, 0.0);
            assert_eq!(record.investment_portfolio, 0.0);
            assert_eq!(record.total_wealth, record.equity);
        }
    }

    #[test]
    fn idle_buying_months_apply_no_yield() {
        // Rent starts above cost and then falls below it.
        let mut inputs = sample_inputs();
        inputs.monthly_rent = 6_000.0;
        inputs.rent_annual_increase = -0.4;
        inputs.etf_annual_yield = 0.08;
        let params = derive_parameters(&inputs);
        let buying = simulate_buying(&params, 120);

        let mut saw_contribution = false;
        let mut saw_idle_after_contribution = false;
        for pair in buying.months.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            if cur.monthly_investment == 0.0 {
                assert_eq!(cur.investment_portfolio, prev.investment_portfolio);
                saw_idle_after_contribution |= saw_contribution;
            } else {
                saw_contribution = true;
                assert_eq!(
                    cur.investment_portfolio,
                    (prev.investment_portfolio + cur.monthly_investment)
                        * (1.0 + params.investment_yield.monthly)
                );
            }
        }
        assert!(saw_contribution);
        assert!(saw_idle_after_contribution);
    }

    #[test]
    fn renting_portfolio_compounds_without_contributions() {
        let mut inputs = sample_inputs();
        inputs.monthly_rent = 50_000.0;
        inputs.etf_annual_yield = 0.06;
        let params = derive_parameters(&inputs);
        let renting = simulate_renting(&params, 36);

        let mut expected = inputs.down_payment;
        for record in &renting.months {
            assert_eq!(record.monthly_investment, 0.0);
            expected *= 1.0 + params.investment_yield.monthly;
            assert_eq!(record.portfolio_value, expected);
        }
        assert!(renting.final_portfolio_value > inputs.down_payment);
    }

    #[test]
    fn rent_escalates_from_second_month() {
        let params = derive_parameters(&sample_inputs());
        let renting = simulate_renting(&params, 13);
        let buying = simulate_buying(&params, 13);

        assert_eq!(renting.months[0].monthly_cost, 2_500.0);
        assert_approx(renting.months[12].monthly_cost, 2_500.0 * 1.03);
        assert_eq!(renting.final_monthly_rent, renting.months[12].monthly_cost);
        for (buy, rent) in buying.months.iter().zip(&renting.months) {
            assert_eq!(buy.comparison_rent, rent.monthly_cost);
        }
    }

    #[test]
    fn zero_months_reports_initial_state() {
        let params = derive_parameters(&sample_inputs());
        let result = compare(&params, 0);

        assert!(result.buying.months.is_empty());
        assert!(result.renting.months.is_empty());
        assert_approx(result.buying.final_house_value, 1_000_000.0);
        assert_approx(result.buying.final_equity, 200_000.0);
        assert_approx(result.renting.final_portfolio_value, 200_000.0);
        assert_eq!(result.comparison.wealth_difference, 0.0);
        assert_eq!(result.comparison.better_option, BetterOption::Renting);
    }

    #[test]
    fn ties_favor_renting() {
        assert_eq!(BetterOption::from_difference(0.0), BetterOption::Renting);
        assert_eq!(BetterOption::from_difference(-1.0), BetterOption::Renting);
        assert_eq!(BetterOption::from_difference(1e-9), BetterOption::Buying);
    }

    #[test]
    fn run_comparison_rejects_non_finite_input() {
        let mut inputs = sample_inputs();
        inputs.etf_annual_yield = f64::NAN;
        let err = run_comparison(&inputs).expect_err("NaN must be rejected");
        assert!(matches!(
            err,
            SimulationError::NonFiniteInput {
                field: "etf_annual_yield"
            }
        ));

        let mut inputs = sample_inputs();
        inputs.house_price = f64::INFINITY;
        assert!(run_comparison(&inputs).is_err());
    }

    #[test]
    fn run_comparison_rejects_oversized_horizons() {
        let mut inputs = sample_inputs();
        inputs.simulation_years = u32::MAX;
        let err = run_comparison(&inputs).expect_err("horizon must be bounded");
        assert!(matches!(
            err,
            SimulationError::HorizonOutOfRange {
                field: "simulation_years",
                years: u32::MAX,
                max: MAX_SIMULATION_YEARS,
            }
        ));

        let mut inputs = sample_inputs();
        inputs.mortgage_amortization_years = MAX_AMORTIZATION_YEARS + 1;
        assert!(matches!(
            run_comparison(&inputs),
            Err(SimulationError::HorizonOutOfRange {
                field: "mortgage_amortization_years",
                ..
            })
        ));

        let mut inputs = sample_inputs();
        inputs.simulation_years = MAX_SIMULATION_YEARS;
        let result = run_comparison(&inputs).expect("upper bound is allowed");
        assert_eq!(result.buying.months.len(), 600);
    }

    #[test]
    fn month_counts_saturate_instead_of_overflowing() {
        let mut inputs = sample_inputs();
        inputs.simulation_years = u32::MAX;
        inputs.mortgage_amortization_years = u32::MAX;
        assert_eq!(inputs.simulation_months(), u32::MAX);
        assert_eq!(derive_parameters(&inputs).amortization_months, u32::MAX);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let inputs = sample_inputs();
        let first = run_comparison(&inputs).expect("valid inputs");
        let second = run_comparison(&inputs).expect("valid inputs");
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_both_paths_emit_one_record_per_month(
            months in 1u32..600,
            house_price in 100_000u32..3_000_000,
            down_pct in 0u32..101,
            mortgage_bp in 0u32..1_000,
            yield_bp in -500i32..2_000,
            appreciation_bp in -500i32..1_000,
            rent in 100u32..10_000,
            rent_increase_bp in -300i32..800,
            mortgage_pct in 0u32..101,
            amortization_years in 0u32..51
        ) {
            let inputs = inputs_from_bp(
                house_price, down_pct, mortgage_bp, yield_bp, appreciation_bp,
                rent, rent_increase_bp, mortgage_pct, amortization_years,
            );
            let params = derive_parameters(&inputs);
            let result = compare(&params, months);

            prop_assert_eq!(result.buying.months.len(), months as usize);
            prop_assert_eq!(result.renting.months.len(), months as usize);
            for (idx, (buy, rent)) in result
                .buying
                .months
                .iter()
                .zip(&result.renting.months)
                .enumerate()
            {
                prop_assert_eq!(buy.month, idx as u32 + 1);
                prop_assert_eq!(rent.month, idx as u32 + 1);
                prop_assert!(rent.monthly_investment >= 0.0);
                prop_assert!(buy.monthly_investment >= 0.0);
            }
            prop_assert!(params.loan_amount >= params.target_mortgage_amount);
            prop_assert!(params.target_mortgage_amount >= 0.0);
        }

        #[test]
        fn prop_house_value_rises_and_loan_never_grows(
            months in 1u32..480,
            down_pct in 0u32..60,
            mortgage_bp in 0u32..800,
            appreciation_bp in 1i32..1_000,
            mortgage_pct in 0u32..80,
            amortization_years in 1u32..30
        ) {
            let inputs = inputs_from_bp(
                1_000_000, down_pct, mortgage_bp, 500, appreciation_bp,
                2_500, 100, mortgage_pct, amortization_years,
            );
            let params = derive_parameters(&inputs);
            let buying = simulate_buying(&params, months);

            let mut prev_house = params.house_price;
            let mut prev_loan = params.loan_amount;
            for record in &buying.months {
                prop_assert!(record.house_value > prev_house);
                if record.amortization_paid > 1e-6 {
                    prop_assert!(record.remaining_loan < prev_loan);
                } else if record.amortization_paid == 0.0 {
                    prop_assert_eq!(record.remaining_loan, prev_loan);
                } else {
                    prop_assert!(record.remaining_loan <= prev_loan);
                }
                prop_assert!(record.remaining_loan >= params.target_mortgage_amount - EPS);
                prev_house = record.house_value;
                prev_loan = record.remaining_loan;
            }
        }

        #[test]
        fn prop_renting_portfolio_is_non_decreasing_for_non_negative_yield(
            months in 1u32..600,
            yield_bp in 0i32..2_000,
            rent in 100u32..10_000,
            rent_increase_bp in -300i32..800,
            amortization_years in 0u32..51
        ) {
            let inputs = inputs_from_bp(
                800_000, 20, 250, yield_bp, 200,
                rent, rent_increase_bp, 67, amortization_years,
            );
            let params = derive_parameters(&inputs);
            let renting = simulate_renting(&params, months);

            let mut prev = params.down_payment;
            for record in &renting.months {
                prop_assert!(record.portfolio_value >= prev);
                let expected = (prev + record.monthly_investment)
                    * (1.0 + params.investment_yield.monthly);
                prop_assert_eq!(record.portfolio_value, expected);
                prev = record.portfolio_value;
            }
        }

        #[test]
        fn prop_comparison_is_reproducible(
            months in 1u32..360,
            yield_bp in -200i32..1_500,
            rent in 500u32..8_000
        ) {
            let inputs = inputs_from_bp(
                1_200_000, 25, 200, yield_bp, 150, rent, 140, 67, 15,
            );
            let params = derive_parameters(&inputs);
            prop_assert_eq!(compare(&params, months), compare(&params, months));
        }
    }
}
