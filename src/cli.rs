use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::InputOverrides;
use crate::core::BreakEvenTarget;

#[derive(Parser, Debug)]
#[command(
    name = "buy-vs-rent",
    version,
    about = "Compare owning a home with a mortgage against renting and investing the difference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate both paths and print the comparison
    Compare(CompareArgs),
    /// Search for the rent or appreciation rate at which buying overtakes renting
    BreakEven(BreakEvenArgs),
    /// Serve the web calculator and JSON API
    Serve(ServeArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliBreakEvenTarget {
    Rent,
    Appreciation,
}

impl From<CliBreakEvenTarget> for BreakEvenTarget {
    fn from(value: CliBreakEvenTarget) -> Self {
        match value {
            CliBreakEvenTarget::Rent => BreakEvenTarget::MonthlyRent,
            CliBreakEvenTarget::Appreciation => BreakEvenTarget::HouseAppreciation,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct BreakEvenArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    #[arg(long, value_enum)]
    pub target: CliBreakEvenTarget,
    #[arg(
        long,
        help = "Lower search bound (rent in currency, appreciation in percent)"
    )]
    pub search_min: Option<f64>,
    #[arg(
        long,
        help = "Upper search bound (rent in currency, appreciation in percent)"
    )]
    pub search_max: Option<f64>,
    #[arg(long, help = "Stop once the bracket is narrower than this")]
    pub tolerance: Option<f64>,
    #[arg(long, default_value_t = 64)]
    pub max_iterations: u32,
    #[arg(long, default_value_t = false, help = "Emit JSON instead of text")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

/// Simulation inputs accepted on the command line. Rates are in percent.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    #[arg(long, help = "YAML config file; flags override its values")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Currency label used in the text report")]
    pub currency: Option<String>,
    #[arg(long)]
    pub house_price: Option<f64>,
    #[arg(long)]
    pub down_payment: Option<f64>,
    #[arg(long, help = "Annual mortgage interest rate in percent, e.g. 1.5")]
    pub mortgage_rate: Option<f64>,
    #[arg(long, help = "Target mortgage as percent of house price, e.g. 67")]
    pub mortgage_percent: Option<f64>,
    #[arg(long, help = "Years to amortize the loan down to the target")]
    pub amortization_years: Option<u32>,
    #[arg(long, help = "Annual ETF yield in percent")]
    pub etf_yield: Option<f64>,
    #[arg(long, help = "Annual house price appreciation in percent")]
    pub appreciation: Option<f64>,
    #[arg(long, help = "Annual maintenance cost as percent of house price")]
    pub maintenance: Option<f64>,
    #[arg(long)]
    pub monthly_rent: Option<f64>,
    #[arg(long, help = "Annual rent increase in percent")]
    pub rent_increase: Option<f64>,
    #[arg(long)]
    pub years: Option<u32>,
}

impl InputArgs {
    pub fn overrides(&self) -> InputOverrides {
        let pct = |v: Option<f64>| v.map(|v| v / 100.0);
        InputOverrides {
            house_price: self.house_price,
            down_payment: self.down_payment,
            mortgage_interest_rate_annual: pct(self.mortgage_rate),
            etf_annual_yield: pct(self.etf_yield),
            house_price_annual_yield: pct(self.appreciation),
            house_maintenance_percent_annual: pct(self.maintenance),
            monthly_rent: self.monthly_rent,
            mortgage_percent: pct(self.mortgage_percent),
            mortgage_amortization_years: self.amortization_years,
            rent_annual_increase: pct(self.rent_increase),
            simulation_years: self.years,
        }
    }
}
