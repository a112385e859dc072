use std::io;

use serde::Serialize;

use crate::core::ComparisonResult;

/// Month-indexed series behind the four comparison charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub months: Vec<u32>,
    pub years: Vec<f64>,
    pub buying_equity: Vec<f64>,
    pub buying_total_wealth: Vec<f64>,
    pub house_value: Vec<f64>,
    pub remaining_loan: Vec<f64>,
    pub renting_portfolio: Vec<f64>,
    pub buying_monthly_cost: Vec<f64>,
    pub renting_monthly_cost: Vec<f64>,
    pub buying_cumulative_cost: Vec<f64>,
    pub renting_cumulative_cost: Vec<f64>,
    pub buying_monthly_investment: Vec<f64>,
    pub renting_monthly_investment: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SeriesRow {
    month: u32,
    year: f64,
    buying_monthly_cost: f64,
    buying_cumulative_cost: f64,
    house_value: f64,
    remaining_loan: f64,
    buying_equity: f64,
    buying_monthly_investment: f64,
    buying_side_portfolio: f64,
    buying_total_wealth: f64,
    renting_monthly_cost: f64,
    renting_cumulative_cost: f64,
    renting_monthly_investment: f64,
    renting_portfolio: f64,
}

fn running_total(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

pub fn chart_series(result: &ComparisonResult) -> ChartSeries {
    let buying = &result.buying.months;
    let renting = &result.renting.months;

    ChartSeries {
        months: buying.iter().map(|m| m.month).collect(),
        years: buying.iter().map(|m| f64::from(m.month) / 12.0).collect(),
        buying_equity: buying.iter().map(|m| m.equity).collect(),
        buying_total_wealth: buying.iter().map(|m| m.total_wealth).collect(),
        house_value: buying.iter().map(|m| m.house_value).collect(),
        remaining_loan: buying.iter().map(|m| m.remaining_loan).collect(),
        renting_portfolio: renting.iter().map(|m| m.portfolio_value).collect(),
        buying_monthly_cost: buying.iter().map(|m| m.monthly_cost).collect(),
        renting_monthly_cost: renting.iter().map(|m| m.monthly_cost).collect(),
        buying_cumulative_cost: running_total(buying.iter().map(|m| m.monthly_cost)),
        renting_cumulative_cost: running_total(renting.iter().map(|m| m.monthly_cost)),
        buying_monthly_investment: buying.iter().map(|m| m.monthly_investment).collect(),
        renting_monthly_investment: renting.iter().map(|m| m.monthly_investment).collect(),
    }
}

/// One CSV row per simulated month, both paths side by side.
pub fn write_monthly_csv<W: io::Write>(result: &ComparisonResult, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut buying_cumulative = 0.0;
    let mut renting_cumulative = 0.0;

    for (buy, rent) in result.buying.months.iter().zip(&result.renting.months) {
        buying_cumulative += buy.monthly_cost;
        renting_cumulative += rent.monthly_cost;
        wtr.serialize(SeriesRow {
            month: buy.month,
            year: f64::from(buy.month) / 12.0,
            buying_monthly_cost: buy.monthly_cost,
            buying_cumulative_cost: buying_cumulative,
            house_value: buy.house_value,
            remaining_loan: buy.remaining_loan,
            buying_equity: buy.equity,
            buying_monthly_investment: buy.monthly_investment,
            buying_side_portfolio: buy.investment_portfolio,
            buying_total_wealth: buy.total_wealth,
            renting_monthly_cost: rent.monthly_cost,
            renting_cumulative_cost: renting_cumulative,
            renting_monthly_investment: rent.monthly_investment,
            renting_portfolio: rent.portfolio_value,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
