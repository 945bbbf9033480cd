//! Male-attention-limited breeding model.
//!
//! Male breeding capacity is a finite resource measured in female-days.
//! Intact females demand attention for their receptive share of the estrous
//! cycle; AMH-treated females cycle without conceiving and, in the AMH
//! scenario, compete for the same attention. When total demand exceeds
//! capacity, attention is rationed proportionally and only the intact
//! share of it can produce conceptions.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::constants::{
    ESTROUS_CYCLE_DAYS, ESTRUS_LENGTH_DAYS, MATURITY_FRACTION, TIMESTEP_LENGTH_DAYS,
};
use crate::control::Scenario;
use crate::numbers::ratio_or_zero;
use crate::state::CompartmentState;

/// Receptive share of the estrous cycle for intact females.
fn estrus_ratio() -> f64 {
    ESTRUS_LENGTH_DAYS / ESTROUS_CYCLE_DAYS
}

/// Derived breeding quantities for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BreedingOutcome {
    /// Expected kittens conceived this timestep.
    pub conceptions: f64,
    /// Mature intact females currently in estrus (0 out of season).
    pub females_in_estrus: f64,
    /// Fraction of intact-female demand that was met, 0–1.
    pub success: f64,
}

/// Compute realized conceptions for the timestep.
#[must_use]
pub fn breed(
    cfg: &SimulationConfig,
    scenario: Scenario,
    state: &CompartmentState,
    breeding_season: bool,
) -> BreedingOutcome {
    let mature_intact_females = state.intact_females * MATURITY_FRACTION;
    let mature_treated_females = state.treated_females * MATURITY_FRACTION;
    let mature_intact_males = state.intact_males * MATURITY_FRACTION;
    let mature_males = state.males() * MATURITY_FRACTION;

    let season_days = if breeding_season {
        TIMESTEP_LENGTH_DAYS
    } else {
        0.0
    };

    let male_capacity = mature_intact_males * cfg.male_breeding_capacity_per_day * season_days;
    let intact_demand = mature_intact_females * estrus_ratio() * season_days;
    let amh_demand = if scenario == Scenario::Amh {
        mature_treated_females * cfg.amh_monopolization_ratio * season_days
    } else {
        0.0
    };
    let total_demand = intact_demand + amh_demand;

    let success = if total_demand > 0.0 && male_capacity > 0.0 {
        if total_demand > male_capacity {
            // Males are overwhelmed: ration attention proportionally across
            // the competing demand, then keep only the intact share.
            ratio_or_zero(intact_demand, total_demand)
                * ratio_or_zero(male_capacity, total_demand).min(1.0)
        } else {
            1.0
        }
    } else {
        0.0
    };

    let females_in_estrus = if breeding_season {
        mature_intact_females * estrus_ratio()
    } else {
        0.0
    };

    let conceptions = if breeding_season && mature_intact_females > 0.0 && mature_males > 0.0 {
        mature_intact_females * (cfg.litters_per_year / 2.0) * cfg.mean_litter_size * success
    } else {
        0.0
    };

    BreedingOutcome {
        conceptions,
        females_in_estrus,
        success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn base_config() -> SimulationConfig {
        SimulationConfig::resolve(&Map::new()).unwrap()
    }

    fn balanced_state(females: f64, males: f64) -> CompartmentState {
        CompartmentState {
            intact_females: females,
            treated_females: 0.0,
            intact_males: males,
            neutered_males: 0.0,
        }
    }

    #[test]
    fn ample_males_give_full_success() {
        let cfg = base_config();
        let state = balanced_state(25.0, 25.0);
        let outcome = breed(&cfg, Scenario::None, &state, true);
        assert!((outcome.success - 1.0).abs() < f64::EPSILON);
        // 21.25 mature females x 1 litter x 4 kittens.
        assert!((outcome.conceptions - 85.0).abs() < 1e-9);
        assert!((outcome.females_in_estrus - 21.25 * 7.0 / 16.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_season_produces_nothing() {
        let cfg = base_config();
        let state = balanced_state(25.0, 25.0);
        let outcome = breed(&cfg, Scenario::None, &state, false);
        assert!((outcome.conceptions).abs() < f64::EPSILON);
        assert!((outcome.females_in_estrus).abs() < f64::EPSILON);
        assert!((outcome.success).abs() < f64::EPSILON);
    }

    #[test]
    fn no_intact_males_means_no_capacity() {
        let cfg = base_config();
        let state = CompartmentState {
            intact_females: 25.0,
            treated_females: 0.0,
            intact_males: 0.0,
            neutered_males: 25.0,
        };
        let outcome = breed(&cfg, Scenario::None, &state, true);
        assert!((outcome.success).abs() < f64::EPSILON);
        assert!((outcome.conceptions).abs() < f64::EPSILON);
    }

    #[test]
    fn no_females_means_no_demand() {
        let cfg = base_config();
        let state = balanced_state(0.0, 25.0);
        let outcome = breed(&cfg, Scenario::None, &state, true);
        assert!((outcome.success).abs() < f64::EPSILON);
        assert!((outcome.conceptions).abs() < f64::EPSILON);
    }

    #[test]
    fn scarce_males_ration_proportionally() {
        let mut cfg = base_config();
        cfg.male_breeding_capacity_per_day = 0.01;
        let state = balanced_state(100.0, 1.0);
        let outcome = breed(&cfg, Scenario::None, &state, true);

        let mature_females = 100.0 * 0.85;
        let mature_males = 0.85;
        let demand = mature_females * (7.0 / 16.0) * 182.5;
        let capacity = mature_males * 0.01 * 182.5;
        let expected = capacity / demand; // intact share is 1.0 here
        assert!((outcome.success - expected).abs() < 1e-12);
        assert!(outcome.success < 1.0);
    }

    #[test]
    fn amh_females_compete_for_attention_only_in_amh_scenario() {
        let mut cfg = base_config();
        cfg.male_breeding_capacity_per_day = 0.05;
        let state = CompartmentState {
            intact_females: 50.0,
            treated_females: 50.0,
            intact_males: 2.0,
            neutered_males: 0.0,
        };

        let with_amh = breed(&cfg, Scenario::Amh, &state, true);
        let with_spay = breed(&cfg, Scenario::Spay, &state, true);

        // Spayed females do not cycle, so they leave more attention for the
        // intact females.
        assert!(with_amh.success < with_spay.success);
        assert!(with_amh.conceptions < with_spay.conceptions);
    }

    #[test]
    fn success_never_exceeds_one() {
        let mut cfg = base_config();
        cfg.male_breeding_capacity_per_day = 1_000.0;
        let state = balanced_state(10.0, 1_000.0);
        let outcome = breed(&cfg, Scenario::None, &state, true);
        assert!((outcome.success - 1.0).abs() < f64::EPSILON);
    }
}
