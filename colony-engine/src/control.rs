//! Fertility-control scheduling.
//!
//! Converts intact animals into the treated/neutered compartments under the
//! configured timing mode (one-time at initialization, or incrementally once
//! per completed year) and unit mode (percentage of the current intact
//! compartment, or a fixed absolute count).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{FcTiming, FcUnit, SimulationConfig};
use crate::numbers::pct_to_fraction;
use crate::state::CompartmentState;

/// The single active female intervention for a run.
///
/// Exactly one applies: spay takes priority over AMH when both percentages
/// are nonzero, and the losing program is ignored for the whole run. Male
/// neutering is independent of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Spay,
    Amh,
    #[default]
    None,
}

impl Scenario {
    /// Priority-ordered selection: spay first, then AMH, else none.
    #[must_use]
    pub fn select(cfg: &SimulationConfig) -> Self {
        if cfg.pct_females_spayed > 0.0 {
            Self::Spay
        } else if cfg.pct_females_amh > 0.0 {
            Self::Amh
        } else {
            Self::None
        }
    }

    /// Female treatment percentage for the active scenario, 0–100.
    #[must_use]
    pub fn treatment_pct(self, cfg: &SimulationConfig) -> f64 {
        match self {
            Self::Spay => cfg.pct_females_spayed,
            Self::Amh => cfg.pct_females_amh,
            Self::None => 0.0,
        }
    }

    /// Absolute females treated per year for the active scenario.
    #[must_use]
    pub fn treatment_absolute(self, cfg: &SimulationConfig) -> f64 {
        match self {
            Self::Spay => cfg.spay_absolute,
            Self::Amh => cfg.amh_absolute,
            Self::None => 0.0,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spay => "spay",
            Self::Amh => "amh",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Split the initial population by sex and apply one-time conversion.
///
/// In yearly mode the colony starts fully intact; conversion happens inside
/// the timestep loop instead.
#[must_use]
pub fn initial_state(cfg: &SimulationConfig, scenario: Scenario) -> CompartmentState {
    let males = cfg.initial_population * cfg.male_fraction;
    let females = cfg.initial_population - males;

    if cfg.fc_timing == FcTiming::Yearly {
        return CompartmentState {
            intact_females: females,
            treated_females: 0.0,
            intact_males: males,
            neutered_males: 0.0,
        };
    }

    let treated_females = females * pct_to_fraction(scenario.treatment_pct(cfg));
    let neutered_males = males * pct_to_fraction(cfg.pct_males_neutered);
    CompartmentState {
        intact_females: females - treated_females,
        treated_females,
        intact_males: males - neutered_males,
        neutered_males,
    }
}

/// Whether the yearly scheduler fires at this one-based timestep.
#[must_use]
pub fn yearly_application_due(cfg: &SimulationConfig, timestep: u32) -> bool {
    cfg.fc_timing == FcTiming::Yearly && timestep.is_multiple_of(2)
}

/// Apply one year's worth of conversions to the current population.
///
/// Absolute mode moves `min(count, currently_intact)` animals per
/// intervention; percentage mode moves a fraction of the current intact
/// compartment. Only the active scenario's female intervention applies;
/// neutering applies whenever it is configured.
pub fn apply_yearly_control(
    cfg: &SimulationConfig,
    scenario: Scenario,
    state: &mut CompartmentState,
) {
    match cfg.fc_unit {
        FcUnit::Absolute => {
            let females_to_treat = scenario
                .treatment_absolute(cfg)
                .min(state.intact_females)
                .max(0.0);
            state.treated_females += females_to_treat;
            state.intact_females -= females_to_treat;

            let males_to_neuter = cfg.neuter_absolute.min(state.intact_males).max(0.0);
            state.neutered_males += males_to_neuter;
            state.intact_males -= males_to_neuter;
        }
        FcUnit::Percentage => {
            let females_to_treat =
                state.intact_females * pct_to_fraction(scenario.treatment_pct(cfg));
            state.treated_females += females_to_treat;
            state.intact_females -= females_to_treat;

            let males_to_neuter = state.intact_males * pct_to_fraction(cfg.pct_males_neutered);
            state.neutered_males += males_to_neuter;
            state.intact_males -= males_to_neuter;
        }
    }
}

/// Allocate surviving kittens into compartments.
///
/// One-time mode models continuous incidental sterilization at intake: the
/// configured fractions of new kittens are born directly into the
/// treated/neutered compartments. Yearly mode admits all kittens intact.
pub fn admit_kittens(
    cfg: &SimulationConfig,
    scenario: Scenario,
    female_kittens: f64,
    male_kittens: f64,
    state: &mut CompartmentState,
) {
    if cfg.fc_timing == FcTiming::OneTime {
        let treated = female_kittens * pct_to_fraction(scenario.treatment_pct(cfg));
        let neutered = male_kittens * pct_to_fraction(cfg.pct_males_neutered);
        state.intact_females += female_kittens - treated;
        state.treated_females += treated;
        state.intact_males += male_kittens - neutered;
        state.neutered_males += neutered;
    } else {
        state.intact_females += female_kittens;
        state.intact_males += male_kittens;
    }
}
