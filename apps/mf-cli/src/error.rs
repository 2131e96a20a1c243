use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Simulation error: {0}")]
    Sim(#[from] mf_sim::SimError),

    #[error("Core error: {0}")]
    Core(#[from] mf_core::CoreError),

    #[error("Component error: {0}")]
    Component(#[from] mf_components::ComponentError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
