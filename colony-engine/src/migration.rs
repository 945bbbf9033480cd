//! Arrivals and departures.
//!
//! Arrivals are intact outsiders (immigration, abandonment) admitted at an
//! even sex ratio; departures (adoption, dispersal, shelter removal) shrink
//! all four compartments by a uniform rate.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::numbers::ratio_or_zero;
use crate::state::CompartmentState;

/// Realized migration for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MigrationOutcome {
    pub arrivals: f64,
    pub departures: f64,
}

/// Apply half a year's arrivals and departures to the state.
#[must_use]
pub fn apply_migration(cfg: &SimulationConfig, state: &mut CompartmentState) -> MigrationOutcome {
    let arrivals = cfg.arrivals_per_year / 2.0;
    state.intact_females += arrivals / 2.0;
    state.intact_males += arrivals / 2.0;

    let requested_departures = cfg.departures_per_year / 2.0;
    let current_total = state.total();
    let departures = if current_total > 0.0 && requested_departures > 0.0 {
        let rate = ratio_or_zero(requested_departures, current_total).min(1.0);
        state.scale(1.0 - rate);
        requested_departures.min(current_total)
    } else {
        0.0
    };

    MigrationOutcome {
        arrivals,
        departures,
    }
}
