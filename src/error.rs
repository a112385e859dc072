use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("input {field} is not a finite number")]
    NonFiniteInput { field: &'static str },

    #[error("{field} = {years} is outside 0..={max} years")]
    HorizonOutOfRange {
        field: &'static str,
        years: u32,
        max: u32,
    },

    #[error("simulation produced a non-finite {field}")]
    NonFiniteResult { field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("failed to write output: {0}")]
    Output(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Output(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Output(e.to_string())
    }
}
