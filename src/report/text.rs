use tabled::{Table, builder::Builder};

use crate::core::{BreakEvenResult, BreakEvenTarget, ComparisonResult, Inputs};

const RULE_WIDTH: usize = 80;

/// `1234567.891` -> `1,234,567.89`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn format_money(value: f64, currency: &str) -> String {
    format!("{currency} {}", format_thousands(value, 2))
}

fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// One titled `Field | Value` table.
fn section(title: &str, rows: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (label, value) in rows {
        builder.push_record([*label, value.as_str()]);
    }
    let table = Table::from(builder);
    format!("--- {title} ---\n{table}\n")
}

pub fn render_inputs(inputs: &Inputs, currency: &str) -> String {
    let money = |v: f64| format_money(v, currency);
    section(
        "INPUT PARAMETERS",
        &[
            ("Simulation", format!("{} years", inputs.simulation_years)),
            ("House Price", money(inputs.house_price)),
            (
                "Down Payment",
                format!(
                    "{} ({:.1}%)",
                    money(inputs.down_payment),
                    inputs.down_payment / inputs.house_price * 100.0
                ),
            ),
            (
                "Mortgage Interest Rate",
                format!("{} annual", format_percent(inputs.mortgage_interest_rate_annual)),
            ),
            (
                "Target Mortgage",
                format!(
                    "{} of house price, amortized over {} years",
                    format_percent(inputs.mortgage_percent),
                    inputs.mortgage_amortization_years
                ),
            ),
            (
                "ETF Yield",
                format!("{} annual", format_percent(inputs.etf_annual_yield)),
            ),
            (
                "House Price Appreciation",
                format!("{} annual", format_percent(inputs.house_price_annual_yield)),
            ),
            (
                "House Maintenance",
                format!(
                    "{} of house price annually",
                    format_percent(inputs.house_maintenance_percent_annual)
                ),
            ),
            (
                "Monthly Rent",
                format!(
                    "{} (+{} per year)",
                    money(inputs.monthly_rent),
                    format_percent(inputs.rent_annual_increase)
                ),
            ),
        ],
    )
}

pub fn render_comparison(result: &ComparisonResult, years: u32, currency: &str) -> String {
    let money = |v: f64| format_money(v, currency);
    let rule = "=".repeat(RULE_WIDTH);
    let buying = &result.buying;
    let renting = &result.renting;
    let comp = &result.comparison;

    let buying_section = section(
        "BUYING SCENARIO",
        &[
            (
                "Monthly Mortgage Interest",
                money(buying.monthly_interest_baseline),
            ),
            ("Monthly Amortization", money(buying.monthly_amortization)),
            ("Monthly Maintenance", money(buying.monthly_maintenance)),
            (
                "Total Initial Monthly Cost",
                money(buying.initial_monthly_cost),
            ),
            ("Final House Value", money(buying.final_house_value)),
            ("Final Equity", money(buying.final_equity)),
            (
                "Final Side Portfolio",
                money(buying.final_investment_portfolio),
            ),
            ("Final Total Wealth", money(buying.final_total_wealth)),
        ],
    );
    let renting_section = section(
        "RENTING SCENARIO",
        &[
            ("Initial Monthly Rent", money(renting.initial_monthly_rent)),
            ("Final Monthly Rent", money(renting.final_monthly_rent)),
            (
                "Initial Investment (Down Payment)",
                money(renting.initial_investment),
            ),
            ("Final Portfolio Value", money(renting.final_portfolio_value)),
        ],
    );
    let comparison_section = section(
        "COMPARISON",
        &[
            ("Total Cost - Buying", money(comp.buying_total_cost)),
            ("Total Cost - Renting", money(comp.renting_total_cost)),
            ("Total Invested - Buying", money(comp.buying_total_invested)),
            (
                "Total Invested - Renting",
                money(comp.renting_total_invested),
            ),
            ("Final Wealth - Buying", money(comp.buying_final_wealth)),
            ("Final Wealth - Renting", money(comp.renting_final_wealth)),
            ("Wealth Difference", money(comp.wealth_difference)),
            ("Better Option", comp.better_option.to_string()),
        ],
    );

    format!(
        "{rule}\nBUY VS RENT COMPARISON - {years} YEAR ANALYSIS\n{rule}\n\n\
         {buying_section}\n{renting_section}\n{comparison_section}{rule}\n"
    )
}

pub fn render_break_even(result: &BreakEvenResult, currency: &str) -> String {
    let describe = |value: f64| match result.target {
        BreakEvenTarget::MonthlyRent => format_money(value, currency),
        BreakEvenTarget::HouseAppreciation => format!("{} annual", format_percent(value)),
    };
    let label = match result.target {
        BreakEvenTarget::MonthlyRent => "initial monthly rent",
        BreakEvenTarget::HouseAppreciation => "house price appreciation",
    };

    let mut rows = vec![
        (
            "Search Range",
            format!(
                "{} to {}",
                describe(result.search_min),
                describe(result.search_max)
            ),
        ),
        (
            "Buying Wins From",
            result
                .solved_value
                .map_or_else(|| "not within search range".to_string(), describe),
        ),
    ];
    if let Some(diff) = result.wealth_difference_at_solution {
        rows.push(("Wealth Difference There", format_money(diff, currency)));
    }
    rows.push((
        "Iterations",
        format!(
            "{} (converged: {})",
            result.iterations.len(),
            result.converged
        ),
    ));

    let table = section(&format!("BREAK-EVEN: {}", label.to_uppercase()), &rows);
    format!("{table}{}\n", result.message)
}
