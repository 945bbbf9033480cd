//! Colony Simulation Engine
//!
//! Deterministic compartmental population model for free-roaming cat colonies
//! under fertility-control programs. This crate provides the full model
//! without UI or platform-specific dependencies: hosts feed it raw parameter
//! maps and receive resampled time series back.

pub mod breeding;
pub mod config;
pub mod constants;
pub mod control;
pub mod engine;
pub mod migration;
pub mod mortality;
pub mod numbers;
pub mod season;
pub mod series;
pub mod state;

// Re-export commonly used types
pub use breeding::{BreedingOutcome, breed};
pub use config::{ConfigError, FcTiming, FcUnit, ModelRevision, RevisionDefaults, SimulationConfig};
pub use control::Scenario;
pub use engine::{RunLimits, SimulationError, SimulationRun, run, run_with_limits};
pub use migration::{MigrationOutcome, apply_migration};
pub use mortality::{adult_step_survival, apply_adult_mortality, kitten_mortality_rate};
pub use season::breeding_active;
pub use series::{SimulationOutput, build_output, day_grid, sample_at};
pub use state::{CompartmentState, TimestepRecord};

use serde_json::{Map, Value};
use thiserror::Error;

/// Anything that can go wrong between raw parameters and a finished run.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Resolve raw parameters and execute a run in one step.
///
/// # Errors
///
/// Returns [`EngineError::Config`] for invalid parameters and
/// [`EngineError::Simulation`] for runtime failures.
pub fn run_from_params(params: &Map<String, Value>) -> Result<SimulationRun, EngineError> {
    let cfg = SimulationConfig::resolve(params)?;
    Ok(engine::run(cfg)?)
}

/// Trait for abstracting run persistence.
/// Platform-specific implementations should provide this.
pub trait RunStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a completed run under a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be saved.
    fn save_run(&self, run_name: &str, run: &SimulationRun) -> Result<(), Self::Error>;

    /// Load a previously persisted run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be loaded.
    fn load_run(&self, run_name: &str) -> Result<Option<SimulationRun>, Self::Error>;

    /// Delete a persisted run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be deleted.
    fn delete_run(&self, run_name: &str) -> Result<(), Self::Error>;
}

/// Host-facing service tying parameter resolution, execution, and storage
/// together.
pub struct SimulationService<S>
where
    S: RunStore,
{
    store: S,
    limits: RunLimits,
}

impl<S> SimulationService<S>
where
    S: RunStore,
{
    /// Create a service with the default execution limits.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            limits: RunLimits {
                max_timesteps: constants::MAX_TIMESTEPS,
            },
        }
    }

    /// Create a service with host-supplied execution limits.
    pub const fn with_limits(store: S, limits: RunLimits) -> Self {
        Self { store, limits }
    }

    /// Resolve raw parameters and execute a run under the service limits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for invalid parameters and
    /// [`EngineError::Simulation`] for runtime failures.
    pub fn simulate(&self, params: &Map<String, Value>) -> Result<SimulationRun, EngineError> {
        let cfg = SimulationConfig::resolve(params)?;
        Ok(engine::run_with_limits(cfg, self.limits)?)
    }

    /// Execute a run and persist it under `run_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the run fails or cannot be stored.
    pub fn simulate_and_store(
        &self,
        run_name: &str,
        params: &Map<String, Value>,
    ) -> Result<SimulationRun, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let run = self.simulate(params)?;
        self.store.save_run(run_name, &run).map_err(Into::into)?;
        Ok(run)
    }

    /// Load a persisted run's resampled output.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be loaded.
    pub fn load_output(&self, run_name: &str) -> Result<Option<SimulationOutput>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let run = self.store.load_run(run_name).map_err(Into::into)?;
        Ok(run.as_ref().map(SimulationRun::output))
    }

    /// Delete a persisted run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be deleted.
    pub fn delete_run(&self, run_name: &str) -> Result<(), S::Error> {
        self.store.delete_run(run_name)
    }
}
