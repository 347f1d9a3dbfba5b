//! CLI configuration.
//!
//! Loaded from a TOML file (`loancalc.toml` in the working directory unless
//! `--config` names another) with `LOANCALC_LOG_LEVEL` overriding the log level.
//!
//! ```toml
//! log_level = "debug"
//!
//! [annuity_solver]
//! seed = "0.05"
//! max_iterations = 200
//!
//! [irr_solver]
//! tolerance = "0.000000001"
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use loan_calc_core::solver::SolverConfig;

pub const DEFAULT_CONFIG_FILE: &str = "loancalc.toml";

const LOG_LEVEL_ENV: &str = "LOANCALC_LOG_LEVEL";

/// Partial override of a root-finder preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverOverrides {
    pub seed: Option<Decimal>,
    pub tolerance: Option<Decimal>,
    pub max_iterations: Option<u32>,
    /// `false` drops the bisection fallback
    pub bisection: Option<bool>,
}

impl SolverOverrides {
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if self.bisection == Some(false) {
            config = config.with_bracket(None);
        }
        config
    }

    fn validate(&self, section: &str, errors: &mut Vec<String>) {
        if let Some(seed) = self.seed {
            if seed <= Decimal::NEGATIVE_ONE {
                errors.push(format!("{section}.seed must be greater than -1 (got {seed})"));
            }
        }
        if let Some(tolerance) = self.tolerance {
            if tolerance <= Decimal::ZERO {
                errors.push(format!("{section}.tolerance must be positive (got {tolerance})"));
            }
        }
        if self.max_iterations == Some(0) {
            errors.push(format!("{section}.max_iterations must be greater than 0"));
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub annuity_solver: SolverOverrides,
    #[serde(default)]
    pub irr_solver: SolverOverrides,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            annuity_solver: SolverOverrides::default(),
            irr_solver: SolverOverrides::default(),
        }
    }
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Load `explicit` (which must exist) or the default file when present,
    /// apply the environment override and validate.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        let config = config.with_env_override();
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_override(mut self) -> Self {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let valid_log_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, valid_log_levels
            ));
        }
        self.annuity_solver.validate("annuity_solver", &mut errors);
        self.irr_solver.validate("irr_solver", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn annuity_solver(&self) -> SolverConfig {
        self.annuity_solver.apply(SolverConfig::annuity_rate())
    }

    pub fn irr_solver(&self) -> SolverConfig {
        self.irr_solver.apply(SolverConfig::irr())
    }
}

#[derive(Debug, Clone)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "config IO error: {}", msg),
            Self::Parse(msg) => write!(f, "config parse error: {}", msg),
            Self::Validation(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {}
