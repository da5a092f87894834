use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Save file decoded at startup.
    pub save_file: PathBuf,
    /// Simulated minutes to run.
    pub ticks: u64,
    /// Where to write the re-encoded model after the run.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    /// Print a JSON snapshot of the model after the run.
    #[serde(default = "default_report")]
    pub report: bool,
}

fn default_report() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("BMS__").split("__"))
    }
}
