//! Engine configuration

use config::{Config, Environment, Source};
use serde::Deserialize;

use core_kernel::{CoreError, Currency};

use crate::solver::{SolverLimits, DEFAULT_MAX_RATE_ITERATIONS, DEFAULT_MAX_TERM_MONTHS};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Currency assumed for amounts entered without one
    #[serde(alias = "currency")]
    pub default_currency: Currency,
    /// Default look-ahead for due-payment queries
    pub due_window_days: u32,
    /// Longest term the solver will produce or accept
    pub max_term_months: u32,
    /// Iteration budget for the implied-rate search
    pub max_rate_iterations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::USD,
            due_window_days: 7,
            max_term_months: DEFAULT_MAX_TERM_MONTHS,
            max_rate_iterations: DEFAULT_MAX_RATE_ITERATIONS,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `CREDIT_*` environment variables
    pub fn from_env() -> Result<Self, CoreError> {
        Self::load(Environment::with_prefix("CREDIT").try_parsing(true))
    }

    /// Loads configuration from any `config` source, falling back to defaults
    pub fn load<S>(source: S) -> Result<Self, CoreError>
    where
        S: Source + Send + Sync + 'static,
    {
        let loaded: Self = Config::builder()
            .add_source(source)
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_term_months == 0 {
            return Err(CoreError::configuration("max_term_months must be at least 1"));
        }
        if self.max_rate_iterations == 0 {
            return Err(CoreError::configuration("max_rate_iterations must be at least 1"));
        }
        Ok(())
    }

    /// Solver bounds derived from this configuration
    pub fn limits(&self) -> SolverLimits {
        SolverLimits {
            max_term_months: self.max_term_months,
            max_rate_iterations: self.max_rate_iterations,
        }
    }
}
