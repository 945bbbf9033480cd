//! Timestep advancer and run orchestration.
//!
//! A run is a bounded loop of half-year timesteps over an exclusively owned
//! config/state/history triple. Each iteration sequences breeding, juvenile
//! and adult mortality, fertility-control scheduling, and migration, then
//! enforces carrying capacity with an exact proportional clamp. The engine
//! is pure arithmetic: no I/O, no randomness, no state retained between
//! invocations.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::breeding;
use crate::config::SimulationConfig;
use crate::constants::{KITTEN_FEMALE_FRACTION, MAX_TIMESTEPS};
use crate::control::{self, Scenario};
use crate::migration;
use crate::mortality;
use crate::numbers::ratio_or_zero;
use crate::season::breeding_active;
use crate::series::{SimulationOutput, build_output};
use crate::state::{CompartmentState, TimestepRecord};

/// Errors raised while executing the timestep loop.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// The requested horizon exceeds the host-imposed step ceiling.
    #[error("requested {requested} timesteps exceeds the limit of {limit}")]
    ResourceLimit { requested: u32, limit: u32 },
    /// Unexpected arithmetic failure; always fatal to the run.
    #[error("timestep {timestep}: {message}")]
    Internal { timestep: u32, message: String },
}

/// Execution ceilings a host may tighten per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLimits {
    /// Maximum timesteps a single run may execute.
    pub max_timesteps: u32,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_timesteps: MAX_TIMESTEPS,
        }
    }
}

/// A completed run: the resolved config, the full per-timestep history, and
/// the running totals accumulated across it. Owned by the caller; the engine
/// keeps nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub config: SimulationConfig,
    pub scenario: Scenario,
    pub history: Vec<TimestepRecord>,
    pub total_births: f64,
    pub total_kitten_deaths: f64,
    pub total_arrivals: f64,
    pub total_departures: f64,
}

impl SimulationRun {
    /// Fraction of conceived kittens that survived to admission.
    #[must_use]
    pub fn kitten_survival_rate(&self) -> f64 {
        ratio_or_zero(
            self.total_births - self.total_kitten_deaths,
            self.total_births,
        )
    }

    /// Resample the history onto the default 30-day grid.
    #[must_use]
    pub fn output(&self) -> SimulationOutput {
        build_output(self, crate::constants::DEFAULT_SAMPLE_INTERVAL_DAYS)
    }

    /// Resample the history onto a custom day grid.
    #[must_use]
    pub fn output_with_interval(&self, interval_days: u32) -> SimulationOutput {
        build_output(self, interval_days)
    }
}

/// Run a simulation under the default step ceiling.
///
/// # Errors
///
/// Returns [`SimulationError::ResourceLimit`] when the horizon exceeds the
/// ceiling, or [`SimulationError::Internal`] if a timestep produces a
/// non-finite or negative compartment.
pub fn run(cfg: SimulationConfig) -> Result<SimulationRun, SimulationError> {
    run_with_limits(cfg, RunLimits::default())
}

/// Run a simulation with caller-supplied limits.
///
/// The step budget is checked before the loop and again at the top of each
/// iteration, so a host can tighten `max_timesteps` to implement
/// cancellation by budget.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_limits(
    cfg: SimulationConfig,
    limits: RunLimits,
) -> Result<SimulationRun, SimulationError> {
    let timesteps = cfg.timesteps();
    let limit = limits.max_timesteps.min(MAX_TIMESTEPS);
    if timesteps > limit {
        return Err(SimulationError::ResourceLimit {
            requested: timesteps,
            limit,
        });
    }

    let scenario = Scenario::select(&cfg);
    let initial = control::initial_state(&cfg, scenario);
    info!(
        "starting run: scenario={scenario} timesteps={timesteps} population={:.1} capacity={:.1}",
        initial.total(),
        cfg.carrying_capacity
    );

    let mut history = Vec::with_capacity(usize::try_from(timesteps).unwrap_or(0) + 1);
    history.push(TimestepRecord::initial(initial));

    let mut run = SimulationRun {
        config: cfg,
        scenario,
        history,
        total_births: 0.0,
        total_kitten_deaths: 0.0,
        total_arrivals: 0.0,
        total_departures: 0.0,
    };

    let mut state = initial;
    for timestep in 1..=timesteps {
        // Budget check at the top of every iteration: a host-tightened
        // ceiling turns into a partial-failure result, never an endless loop.
        if timestep > limit {
            return Err(SimulationError::ResourceLimit {
                requested: timesteps,
                limit,
            });
        }
        let record = advance(&run.config, scenario, &mut state, timestep)?;
        run.total_births += record.kittens_conceived;
        run.total_kitten_deaths += record.kitten_deaths;
        run.total_arrivals += record.arrivals;
        run.total_departures += record.departures;
        run.history.push(record);
    }

    info!(
        "run complete: births={:.1} kitten_deaths={:.1} final_population={:.1}",
        run.total_births,
        run.total_kitten_deaths,
        state.total()
    );
    Ok(run)
}

/// Advance one timestep, mutating `state` in place and returning its record.
fn advance(
    cfg: &SimulationConfig,
    scenario: Scenario,
    state: &mut CompartmentState,
    timestep: u32,
) -> Result<TimestepRecord, SimulationError> {
    let breeding_season = breeding_active(timestep);
    // Density reflects the population entering the step, before any
    // conversion or mortality.
    let density = ratio_or_zero(state.total(), cfg.carrying_capacity);

    if control::yearly_application_due(cfg, timestep) {
        control::apply_yearly_control(cfg, scenario, state);
    }

    let bred = breeding::breed(cfg, scenario, state, breeding_season);
    let kitten_deaths = bred.conceptions * mortality::kitten_mortality_rate(cfg, density);
    let surviving_kittens = bred.conceptions - kitten_deaths;

    let survival = mortality::adult_step_survival(cfg);
    let adult_deaths = mortality::apply_adult_mortality(state, survival);

    let female_kittens = surviving_kittens * KITTEN_FEMALE_FRACTION;
    let male_kittens = surviving_kittens - female_kittens;
    control::admit_kittens(cfg, scenario, female_kittens, male_kittens, state);

    let migrated = migration::apply_migration(cfg, state);

    // Exact proportional clamp: the post-step total never exceeds capacity.
    let total = state.total();
    if total > cfg.carrying_capacity {
        state.scale(ratio_or_zero(cfg.carrying_capacity, total));
    }

    if !state.is_valid() {
        return Err(SimulationError::Internal {
            timestep,
            message: format!("compartment state became invalid: {state:?}"),
        });
    }

    debug!(
        "timestep {timestep}: season={breeding_season} conceived={:.2} kitten_deaths={:.2} \
         adult_deaths={:.2} total={:.2}",
        bred.conceptions,
        kitten_deaths,
        adult_deaths,
        state.total()
    );

    Ok(TimestepRecord {
        state: *state,
        females_in_estrus: bred.females_in_estrus,
        kittens_conceived: bred.conceptions,
        kitten_deaths,
        adult_deaths,
        arrivals: migrated.arrivals,
        departures: migrated.departures,
    })
}
