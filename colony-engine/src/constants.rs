//! Fixed biological and scheduling constants for the colony model.
//!
//! These values define the deterministic math of the compartmental model.
//! They are deliberately not exposed as run parameters: the published
//! methodology fixes them, and keeping them here means they can only change
//! through a reviewed code change.

// Timestep geometry ---------------------------------------------------------
/// Calendar days advanced per timestep when locating the season month.
pub(crate) const TIMESTEP_CALENDAR_DAYS: u64 = 182;
/// Effective length of one timestep for rate math and resampling.
pub(crate) const TIMESTEP_LENGTH_DAYS: f64 = 182.5;
/// Two half-year timesteps per simulated year.
pub(crate) const TIMESTEPS_PER_YEAR: u32 = 2;
pub(crate) const DAYS_PER_YEAR: u32 = 365;

// Reproductive biology ------------------------------------------------------
/// Days a female is receptive within one estrous cycle.
pub(crate) const ESTRUS_LENGTH_DAYS: f64 = 7.0;
/// Full estrous cycle length in days.
pub(crate) const ESTROUS_CYCLE_DAYS: f64 = 16.0;
/// Fraction of each compartment old enough to breed.
pub(crate) const MATURITY_FRACTION: f64 = 0.85;
/// Surviving kittens split evenly by sex.
pub(crate) const KITTEN_FEMALE_FRACTION: f64 = 0.5;

// Breeding season -----------------------------------------------------------
/// Epoch the season calendar starts from.
pub(crate) const SEASON_EPOCH: (i32, u32, u32) = (2023, 1, 1);
/// Breeding is active while the calendar month precedes October.
pub(crate) const FIRST_NON_BREEDING_MONTH: u32 = 10;

// Output resampling ---------------------------------------------------------
/// Default day-grid spacing for the interpolated output series.
pub(crate) const DEFAULT_SAMPLE_INTERVAL_DAYS: u32 = 30;

// Resource limits -----------------------------------------------------------
/// Hard ceiling on timesteps per run (1000 simulated years).
pub(crate) const MAX_TIMESTEPS: u32 = 2_000;
