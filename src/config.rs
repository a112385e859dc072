use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::Inputs;
use crate::error::ConfigError;

pub const DEFAULT_CURRENCY: &str = "CHF";
pub use crate::core::{MAX_AMORTIZATION_YEARS, MAX_SIMULATION_YEARS};

/// Inputs used when neither a config file nor flags provide a value.
pub fn default_inputs() -> Inputs {
    Inputs {
        house_price: 1_000_000.0,
        down_payment: 200_000.0,
        mortgage_interest_rate_annual: 0.015,
        etf_annual_yield: 0.1078,
        house_price_annual_yield: 0.0373,
        house_maintenance_percent_annual: 0.01,
        monthly_rent: 2_500.0,
        mortgage_percent: 0.67,
        mortgage_amortization_years: 15,
        rent_annual_increase: 0.014,
        simulation_years: 30,
    }
}

/// Optional values layered over [`default_inputs`]. Rates are fractions.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputOverrides {
    pub house_price: Option<f64>,
    pub down_payment: Option<f64>,
    pub mortgage_interest_rate_annual: Option<f64>,
    pub etf_annual_yield: Option<f64>,
    pub house_price_annual_yield: Option<f64>,
    pub house_maintenance_percent_annual: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub mortgage_percent: Option<f64>,
    pub mortgage_amortization_years: Option<u32>,
    pub rent_annual_increase: Option<f64>,
    pub simulation_years: Option<u32>,
}

impl InputOverrides {
    /// Values from `higher` win over `self`.
    pub fn merge(self, higher: InputOverrides) -> InputOverrides {
        InputOverrides {
            house_price: higher.house_price.or(self.house_price),
            down_payment: higher.down_payment.or(self.down_payment),
            mortgage_interest_rate_annual: higher
                .mortgage_interest_rate_annual
                .or(self.mortgage_interest_rate_annual),
            etf_annual_yield: higher.etf_annual_yield.or(self.etf_annual_yield),
            house_price_annual_yield: higher
                .house_price_annual_yield
                .or(self.house_price_annual_yield),
            house_maintenance_percent_annual: higher
                .house_maintenance_percent_annual
                .or(self.house_maintenance_percent_annual),
            monthly_rent: higher.monthly_rent.or(self.monthly_rent),
            mortgage_percent: higher.mortgage_percent.or(self.mortgage_percent),
            mortgage_amortization_years: higher
                .mortgage_amortization_years
                .or(self.mortgage_amortization_years),
            rent_annual_increase: higher.rent_annual_increase.or(self.rent_annual_increase),
            simulation_years: higher.simulation_years.or(self.simulation_years),
        }
    }

    pub fn apply_to(&self, inputs: &mut Inputs) {
        if let Some(v) = self.house_price {
            inputs.house_price = v;
        }
        if let Some(v) = self.down_payment {
            inputs.down_payment = v;
        }
        if let Some(v) = self.mortgage_interest_rate_annual {
            inputs.mortgage_interest_rate_annual = v;
        }
        if let Some(v) = self.etf_annual_yield {
            inputs.etf_annual_yield = v;
        }
        if let Some(v) = self.house_price_annual_yield {
            inputs.house_price_annual_yield = v;
        }
        if let Some(v) = self.house_maintenance_percent_annual {
            inputs.house_maintenance_percent_annual = v;
        }
        if let Some(v) = self.monthly_rent {
            inputs.monthly_rent = v;
        }
        if let Some(v) = self.mortgage_percent {
            inputs.mortgage_percent = v;
        }
        if let Some(v) = self.mortgage_amortization_years {
            inputs.mortgage_amortization_years = v;
        }
        if let Some(v) = self.rent_annual_increase {
            inputs.rent_annual_increase = v;
        }
        if let Some(v) = self.simulation_years {
            inputs.simulation_years = v;
        }
    }
}

/// On-disk YAML layout: the input keys plus presentation settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub inputs: InputOverrides,
    pub currency: Option<String>,
    /// Keys matching no input; collected so typos can be reported.
    #[serde(flatten)]
    pub unknown_keys: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub inputs: Inputs,
    pub currency: String,
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for key in file.unknown_keys.keys() {
        warn!(path = %path.display(), %key, "ignoring unknown config key");
    }
    Ok(file)
}

fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents)
}

/// Defaults, then the optional config file, then `overrides`; validated.
pub fn resolve_settings(
    config_path: Option<&Path>,
    overrides: InputOverrides,
    currency: Option<String>,
) -> Result<Settings, ConfigError> {
    let file = match config_path {
        Some(path) => {
            let file = load_config_file(path)?;
            info!(path = %path.display(), "loaded config file");
            file
        }
        None => ConfigFile::default(),
    };

    let mut inputs = default_inputs();
    file.inputs.merge(overrides).apply_to(&mut inputs);
    validate_inputs(&inputs)?;

    Ok(Settings {
        inputs,
        currency: currency
            .or(file.currency)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    })
}

pub fn validate_inputs(inputs: &Inputs) -> Result<(), ConfigError> {
    for (field, value) in inputs.numeric_fields() {
        if !value.is_finite() {
            return Err(ConfigError::invalid(field, "must be a finite number"));
        }
    }

    if inputs.house_price <= 0.0 {
        return Err(ConfigError::invalid("house_price", "must be > 0"));
    }
    if inputs.down_payment < 0.0 || inputs.down_payment > inputs.house_price {
        return Err(ConfigError::invalid(
            "down_payment",
            "must be between 0 and house_price",
        ));
    }
    if inputs.monthly_rent <= 0.0 {
        return Err(ConfigError::invalid("monthly_rent", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&inputs.mortgage_percent) {
        return Err(ConfigError::invalid(
            "mortgage_percent",
            "must be between 0 and 1",
        ));
    }
    if inputs.mortgage_interest_rate_annual < 0.0 {
        return Err(ConfigError::invalid(
            "mortgage_interest_rate_annual",
            "must be >= 0",
        ));
    }
    if inputs.house_maintenance_percent_annual < 0.0 {
        return Err(ConfigError::invalid(
            "house_maintenance_percent_annual",
            "must be >= 0",
        ));
    }
    for (field, rate) in [
        ("etf_annual_yield", inputs.etf_annual_yield),
        ("house_price_annual_yield", inputs.house_price_annual_yield),
        ("rent_annual_increase", inputs.rent_annual_increase),
    ] {
        if rate <= -1.0 {
            return Err(ConfigError::invalid(field, "must be > -1"));
        }
    }
    if inputs.mortgage_amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(ConfigError::invalid(
            "mortgage_amortization_years",
            format!("must be <= {MAX_AMORTIZATION_YEARS}"),
        ));
    }
    if !(1..=MAX_SIMULATION_YEARS).contains(&inputs.simulation_years) {
        return Err(ConfigError::invalid(
            "simulation_years",
            format!("must be between 1 and {MAX_SIMULATION_YEARS}"),
        ));
    }
    Ok(())
}
