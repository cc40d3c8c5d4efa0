//! Configuration loading for the simulator CLI

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use traffic_core::validate_episodes;
use traffic_rl::{AgentConfig, DynamicsConfig, SimulationConfig};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "traffic.toml";

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub agent: AgentConfig,
    pub dynamics: DynamicsConfig,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub episodes: u32,
    pub run_timeout_seconds: u64,
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            episodes: 100,
            run_timeout_seconds: 60,
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::find_config_file())
    }

    /// Load from an explicit file (if any) layered under the environment
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = &config_path {
            tracing::info!("Loading config from: {:?}", path);
            builder = builder.add_source(File::from(path.clone()).required(false));
        } else {
            tracing::info!("No config file found, using defaults");
        }

        // Add environment variables with TRAFFIC prefix
        builder = builder.add_source(
            Environment::with_prefix("TRAFFIC")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate().context("Invalid [agent] section")?;
        self.dynamics
            .validate()
            .context("Invalid [dynamics] section")?;
        validate_episodes(self.simulation.episodes).context("Invalid [simulation] section")?;
        if self.simulation.run_timeout_seconds == 0 {
            bail!("Invalid [simulation] section: run_timeout_seconds must be positive");
        }
        Ok(())
    }

    /// Engine settings, with an optional seed taking precedence over the file
    pub fn simulation_config(&self, seed_override: Option<u64>) -> SimulationConfig {
        SimulationConfig {
            agent: self.agent.clone(),
            dynamics: self.dynamics.clone(),
            seed: seed_override.or(self.simulation.seed),
        }
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: TRAFFIC_CONFIG env, ./traffic.toml, ~/.config/traffic-sim/traffic.toml
        if let Ok(path) = std::env::var("TRAFFIC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home
                .join(".config")
                .join("traffic-sim")
                .join(CONFIG_FILE_NAME);
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}
