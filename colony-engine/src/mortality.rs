//! Density-dependent juvenile mortality and background adult mortality.

use crate::config::SimulationConfig;
use crate::state::CompartmentState;

/// Juvenile mortality rate at the given density (population over capacity).
///
/// Below capacity the rate interpolates linearly from the base rate toward
/// the high-density rate; at or above capacity the high-density rate applies.
#[must_use]
pub fn kitten_mortality_rate(cfg: &SimulationConfig, density: f64) -> f64 {
    if density < 1.0 {
        let range = cfg.high_density_mortality - cfg.base_kitten_mortality;
        cfg.base_kitten_mortality + density * range
    } else {
        cfg.high_density_mortality
    }
}

/// Per-timestep adult survival factor from the annual mortality rate.
#[must_use]
pub fn adult_step_survival(cfg: &SimulationConfig) -> f64 {
    (1.0 - cfg.adult_mortality_annual).max(0.0).sqrt()
}

/// Apply adult mortality to every compartment, returning the deaths.
pub fn apply_adult_mortality(state: &mut CompartmentState, survival: f64) -> f64 {
    let before = state.total();
    state.scale(survival);
    before - state.total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn base_config() -> SimulationConfig {
        SimulationConfig::resolve(&Map::new()).unwrap()
    }

    #[test]
    fn mortality_interpolates_below_capacity() {
        let cfg = base_config();
        assert!((kitten_mortality_rate(&cfg, 0.0) - 0.75).abs() < f64::EPSILON);
        assert!((kitten_mortality_rate(&cfg, 0.5) - 0.81).abs() < 1e-12);
        assert!((kitten_mortality_rate(&cfg, 0.25) - 0.78).abs() < 1e-12);
    }

    #[test]
    fn mortality_saturates_at_capacity() {
        let cfg = base_config();
        assert!((kitten_mortality_rate(&cfg, 1.0) - 0.87).abs() < f64::EPSILON);
        assert!((kitten_mortality_rate(&cfg, 3.0) - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn step_survival_halves_the_annual_rate_geometrically() {
        let cfg = base_config();
        let survival = adult_step_survival(&cfg);
        assert!((survival * survival - 0.9).abs() < 1e-12);
    }

    #[test]
    fn zero_annual_mortality_means_full_survival() {
        let mut cfg = base_config();
        cfg.adult_mortality_annual = 0.0;
        assert!((adult_step_survival(&cfg) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_annual_mortality_means_no_survivors() {
        let mut cfg = base_config();
        cfg.adult_mortality_annual = 1.0;
        assert!((adult_step_survival(&cfg)).abs() < f64::EPSILON);
    }

    #[test]
    fn adult_mortality_reports_deaths() {
        let mut state = CompartmentState {
            intact_females: 50.0,
            treated_females: 10.0,
            intact_males: 30.0,
            neutered_males: 10.0,
        };
        let deaths = apply_adult_mortality(&mut state, 0.9);
        assert!((deaths - 10.0).abs() < 1e-9);
        assert!((state.total() - 90.0).abs() < 1e-9);
    }
}
