//! Service configuration

use anyhow::Result;
use mixopt_genetic::OptimizerConfig;
use mixopt_saturation::FitterConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Optional configuration file (any format the `config` crate understands)
pub const CONFIG_FILE: &str = "mixopt";

/// Environment variable prefix; nested keys use `__`
/// (e.g. `MIXOPT_OPTIMIZER__POPULATION_SIZE`)
pub const ENV_PREFIX: &str = "MIXOPT";

/// MixOpt service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Default curve fitter settings
    pub fitting: FitterConfig,
    /// Default optimizer settings; requests may override them
    pub optimizer: OptimizerConfig,
    /// In-memory store limits
    pub store: StoreSettings,
    /// Caps on per-request optimizer settings
    pub limits: RequestLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            fitting: FitterConfig::default(),
            optimizer: OptimizerConfig::default(),
            store: StoreSettings::default(),
            limits: RequestLimits::default(),
        }
    }
}

impl ServiceConfig {
    /// Load `.env`, then `mixopt.{toml,json,yaml}` if present, then `MIXOPT_*`
    /// environment variables; `PORT` wins over everything for the port
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::from_environment(Self::environment())?;

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        Ok(cfg)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the fitter or optimizer would refuse at request time
    pub fn validate(&self) -> Result<()> {
        self.fitting.validate()?;
        self.optimizer.validate()?;
        if self.store.max_curves == 0 || self.store.max_stored_runs == 0 {
            anyhow::bail!("store limits must be at least 1");
        }
        self.limits.check(&self.optimizer)?;
        Ok(())
    }
}

/// Store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Maximum fitted curves kept in memory
    pub max_curves: usize,
    /// Optimization results kept for lookup; oldest evicted first
    pub max_stored_runs: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_curves: crate::MAX_STORED_CURVES,
            max_stored_runs: crate::MAX_STORED_RUNS,
        }
    }
}

/// Upper bounds on optimizer work a single request may ask for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    pub max_population_size: usize,
    pub max_generations: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_population_size: crate::MAX_POPULATION_SIZE,
            max_generations: crate::MAX_GENERATIONS,
        }
    }
}

impl RequestLimits {
    pub fn check(&self, optimizer: &OptimizerConfig) -> std::result::Result<(), ServiceError> {
        if optimizer.population_size > self.max_population_size {
            return Err(ServiceError::InvalidRequest(format!(
                "population_size {} exceeds the limit of {}",
                optimizer.population_size, self.max_population_size
            )));
        }
        if optimizer.generations > self.max_generations {
            return Err(ServiceError::InvalidRequest(format!(
                "generations {} exceeds the limit of {}",
                optimizer.generations, self.max_generations
            )));
        }
        Ok(())
    }
}
