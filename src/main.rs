use std::io::{self, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use buy_vs_rent::api::run_http_server;
use buy_vs_rent::cli::{BreakEvenArgs, Cli, Command, CompareArgs, InputArgs, OutputFormat};
use buy_vs_rent::config::{Settings, resolve_settings};
use buy_vs_rent::core::{BreakEvenConfig, run_comparison, solve_break_even};
use buy_vs_rent::error::AppError;
use buy_vs_rent::report::{
    render_break_even, render_comparison, render_inputs, write_monthly_csv,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Compare(args) => run_compare(args),
        Command::BreakEven(args) => run_break_even(args),
        Command::Serve(args) => match settings_from(&args.inputs) {
            Ok(settings) => run_http_server(args.port, settings)
                .await
                .map_err(AppError::from),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn settings_from(args: &InputArgs) -> Result<Settings, AppError> {
    Ok(resolve_settings(
        args.config.as_deref(),
        args.overrides(),
        args.currency.clone(),
    )?)
}

fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let settings = settings_from(&args.inputs)?;
    let result = run_comparison(&settings.inputs)?;
    info!(
        better_option = %result.comparison.better_option,
        wealth_difference = result.comparison.wealth_difference,
        "comparison finished"
    );

    let stdout = io::stdout();
    match args.format {
        OutputFormat::Text => {
            let mut out = stdout.lock();
            writeln!(out, "{}", render_inputs(&settings.inputs, &settings.currency))?;
            write!(
                out,
                "{}",
                render_comparison(&result, settings.inputs.simulation_years, &settings.currency)
            )?;
        }
        OutputFormat::Json => {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_monthly_csv(&result, stdout.lock())?,
    }
    Ok(())
}

fn run_break_even(args: BreakEvenArgs) -> Result<(), AppError> {
    let settings = settings_from(&args.inputs)?;
    let config = BreakEvenConfig::from_user_bounds(
        args.target.into(),
        args.search_min,
        args.search_max,
        args.tolerance,
        Some(args.max_iterations),
    );

    let result = solve_break_even(&settings.inputs, config)?;
    info!(
        converged = result.converged,
        iterations = result.iterations.len(),
        "break-even search finished"
    );

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &result)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_break_even(&result, &settings.currency))?;
    }
    Ok(())
}
