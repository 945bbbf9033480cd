//! Time-series resampling of run history onto a day grid.
//!
//! The engine produces one record per half-year timestep; consumers want
//! values on a regular calendar grid. Each output day maps to a fractional
//! timestep and the two bracketing records are interpolated linearly.
//! Days past the final record clamp to it.

use serde::{Deserialize, Serialize};

use crate::constants::{DAYS_PER_YEAR, TIMESTEP_LENGTH_DAYS};
use crate::engine::SimulationRun;
use crate::numbers::floor_to_index;
use crate::state::TimestepRecord;

/// Resampled run results keyed by a shared day grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub days: Vec<u32>,
    pub focal_population_sizes: Vec<f64>,
    pub females_in_estrus: Vec<f64>,
    /// Always zero: gestation is not modeled as a distinct stage.
    pub pregnant_females: Vec<f64>,
    pub births: Vec<f64>,
    pub kitten_deaths: Vec<f64>,
    pub arrivals: Vec<f64>,
    pub departures: Vec<f64>,
    pub total_births: f64,
    pub total_kitten_deaths: f64,
    pub kitten_survival_rate: f64,
    pub total_arrivals: f64,
    pub total_departures: f64,
}

/// The sampling day grid: day 0 through the final simulated day, inclusive
/// when the horizon is a multiple of the interval.
#[must_use]
pub fn day_grid(years: u32, interval_days: u32) -> Vec<u32> {
    let horizon = years * DAYS_PER_YEAR;
    let interval = interval_days.max(1);
    (0..=horizon).step_by(interval as usize).collect()
}

/// Linearly interpolate a per-timestep series at a fractional day offset.
///
/// Values beyond the last record clamp to it rather than extrapolating.
#[must_use]
pub fn sample_at(series: &[f64], day: f64) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let last = series.len() - 1;
    let position = (day / TIMESTEP_LENGTH_DAYS).max(0.0);
    let lower = floor_to_index(position);
    if lower >= last {
        return series[last];
    }
    let weight = position - position.floor();
    series[lower] * (1.0 - weight) + series[lower + 1] * weight
}

fn resample(history: &[TimestepRecord], days: &[u32], pick: impl Fn(&TimestepRecord) -> f64) -> Vec<f64> {
    let series: Vec<f64> = history.iter().map(pick).collect();
    days.iter()
        .map(|&day| sample_at(&series, f64::from(day)))
        .collect()
}

/// Resample a completed run onto the requested grid.
#[must_use]
pub fn build_output(run: &SimulationRun, interval_days: u32) -> SimulationOutput {
    let days = day_grid(run.config.years, interval_days);
    let history = &run.history;

    SimulationOutput {
        focal_population_sizes: resample(history, &days, |record| record.state.total()),
        females_in_estrus: resample(history, &days, |record| record.females_in_estrus),
        pregnant_females: vec![0.0; days.len()],
        births: resample(history, &days, |record| record.kittens_conceived),
        kitten_deaths: resample(history, &days, |record| record.kitten_deaths),
        arrivals: resample(history, &days, |record| record.arrivals),
        departures: resample(history, &days, |record| record.departures),
        total_births: run.total_births,
        total_kitten_deaths: run.total_kitten_deaths,
        kitten_survival_rate: run.kitten_survival_rate(),
        total_arrivals: run.total_arrivals,
        total_departures: run.total_departures,
        days,
    }
}
