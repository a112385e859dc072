mod series;
mod text;

pub use series::{ChartSeries, chart_series, write_monthly_csv};
pub use text::{
    format_money, format_thousands, render_break_even, render_comparison, render_inputs,
};
