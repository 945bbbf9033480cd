//! Stratified compartment state and the per-timestep history record.

use serde::{Deserialize, Serialize};

/// Continuous-valued population counts, stratified four ways.
///
/// Counts are expected values, not discrete animals; every transition keeps
/// them non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CompartmentState {
    pub intact_females: f64,
    pub treated_females: f64,
    pub intact_males: f64,
    pub neutered_males: f64,
}

impl CompartmentState {
    #[must_use]
    pub fn females(&self) -> f64 {
        self.intact_females + self.treated_females
    }

    #[must_use]
    pub fn males(&self) -> f64 {
        self.intact_males + self.neutered_males
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.females() + self.males()
    }

    /// Scale every compartment by the same factor.
    pub fn scale(&mut self, factor: f64) {
        self.intact_females *= factor;
        self.treated_females *= factor;
        self.intact_males *= factor;
        self.neutered_males *= factor;
    }

    /// True when every compartment holds a finite, non-negative count.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.intact_females,
            self.treated_females,
            self.intact_males,
            self.neutered_males,
        ]
        .iter()
        .all(|count| count.is_finite() && *count >= 0.0)
    }
}

/// Immutable ledger entry for one timestep: the state it produced plus the
/// derived metrics of the transition that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestepRecord {
    pub state: CompartmentState,
    pub females_in_estrus: f64,
    pub kittens_conceived: f64,
    pub kitten_deaths: f64,
    pub adult_deaths: f64,
    pub arrivals: f64,
    pub departures: f64,
}

impl TimestepRecord {
    /// Record for timestep zero: the initial state, no transition metrics.
    #[must_use]
    pub const fn initial(state: CompartmentState) -> Self {
        Self {
            state,
            females_in_estrus: 0.0,
            kittens_conceived: 0.0,
            kitten_deaths: 0.0,
            adult_deaths: 0.0,
            arrivals: 0.0,
            departures: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_derive_from_compartments() {
        let state = CompartmentState {
            intact_females: 10.0,
            treated_females: 5.0,
            intact_males: 8.0,
            neutered_males: 2.0,
        };
        assert!((state.females() - 15.0).abs() < f64::EPSILON);
        assert!((state.males() - 10.0).abs() < f64::EPSILON);
        assert!((state.total() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scale_applies_uniformly() {
        let mut state = CompartmentState {
            intact_females: 10.0,
            treated_females: 4.0,
            intact_males: 6.0,
            neutered_males: 0.0,
        };
        state.scale(0.5);
        assert!((state.total() - 10.0).abs() < f64::EPSILON);
        assert!((state.treated_females - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validity_rejects_nan_and_negative() {
        let mut state = CompartmentState::default();
        assert!(state.is_valid());
        state.intact_males = -0.1;
        assert!(!state.is_valid());
        state.intact_males = f64::NAN;
        assert!(!state.is_valid());
    }
}
