//! Parameter resolution for simulation runs.
//!
//! The host hands the resolver the same flat JSON map its request layer
//! received; every field is optional and falls back to a documented default.
//! Resolution also converts absolute fertility-control counts into
//! equivalent percentages and honors the legacy field names older clients
//! still send.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{ESTROUS_CYCLE_DAYS, MAX_TIMESTEPS, TIMESTEPS_PER_YEAR};
use crate::numbers::ratio_or_zero;

/// When fertility-control conversions are applied to the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FcTiming {
    /// Treat once at initialization; newborns inherit the treatment fraction.
    #[default]
    OneTime,
    /// Treat the currently intact population once per completed year.
    Yearly,
}

impl FcTiming {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for FcTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FcTiming {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-time" => Ok(Self::OneTime),
            "yearly" => Ok(Self::Yearly),
            _ => Err(()),
        }
    }
}

/// How fertility-control amounts are expressed in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FcUnit {
    /// Percentages of the relevant intact compartment.
    #[default]
    Percentage,
    /// Animal counts, converted against the initial population.
    Absolute,
}

impl FcUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Absolute => "absolute",
        }
    }
}

impl fmt::Display for FcUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FcUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "absolute" => Ok(Self::Absolute),
            _ => Err(()),
        }
    }
}

/// Published parameterization a run's defaults are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelRevision {
    /// Stable colony held near capacity by juvenile mortality.
    #[default]
    Boone2019,
    /// Growing colony with lower baseline juvenile mortality.
    Miller2014,
}

impl ModelRevision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boone2019 => "boone2019",
            Self::Miller2014 => "miller2014",
        }
    }

    /// Default table for fields this revision fixes differently.
    #[must_use]
    pub const fn defaults(self) -> RevisionDefaults {
        match self {
            Self::Boone2019 => RevisionDefaults {
                litters_per_year: 2.0,
                mean_litter_size: 4.0,
                base_kitten_mortality: 0.75,
                high_density_mortality: 0.87,
            },
            Self::Miller2014 => RevisionDefaults {
                litters_per_year: 1.4,
                mean_litter_size: 3.5,
                base_kitten_mortality: 0.60,
                high_density_mortality: 0.90,
            },
        }
    }
}

impl fmt::Display for ModelRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelRevision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boone2019" => Ok(Self::Boone2019),
            "miller2014" => Ok(Self::Miller2014),
            _ => Err(()),
        }
    }
}

/// Revision-specific default values applied when the input omits a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevisionDefaults {
    pub litters_per_year: f64,
    pub mean_litter_size: f64,
    pub base_kitten_mortality: f64,
    pub high_density_mortality: f64,
}

/// Errors raised when input parameters are malformed or out of domain.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} cannot be parsed as a number (got {raw})")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be one of [{allowed}] (got {raw})")]
    InvalidChoice {
        field: &'static str,
        allowed: &'static str,
        raw: String,
    },
}

/// Complete, validated configuration for one simulation run.
///
/// Percentages are kept on the 0–100 scale the input uses; annual mortality
/// is resolved to a fraction. All conversions and legacy fallbacks happen in
/// [`SimulationConfig::resolve`], never downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub revision: ModelRevision,
    pub years: u32,
    pub initial_population: f64,
    /// Male share of the initial population, 0–1.
    pub male_fraction: f64,
    pub carrying_capacity: f64,
    pub mean_litter_size: f64,
    pub litters_per_year: f64,
    /// Females a mature intact male can service per day.
    pub male_breeding_capacity_per_day: f64,
    pub pct_females_amh: f64,
    pub pct_females_spayed: f64,
    pub pct_males_neutered: f64,
    pub fc_timing: FcTiming,
    pub fc_unit: FcUnit,
    pub amh_absolute: f64,
    pub spay_absolute: f64,
    pub neuter_absolute: f64,
    /// Annual adult mortality as a fraction, 0–1.
    pub adult_mortality_annual: f64,
    pub base_kitten_mortality: f64,
    pub high_density_mortality: f64,
    pub arrivals_per_year: f64,
    pub departures_per_year: f64,
    /// Share of the estrous cycle an AMH-treated female occupies male
    /// attention, 0–1.
    pub amh_monopolization_ratio: f64,
}

impl SimulationConfig {
    /// Number of half-year timesteps this run executes.
    #[must_use]
    pub const fn timesteps(&self) -> u32 {
        self.years * TIMESTEPS_PER_YEAR
    }

    /// Resolve a flat parameter map into a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending field when a value
    /// cannot be parsed as a number or falls outside its valid domain.
    pub fn resolve(params: &Map<String, Value>) -> Result<Self, ConfigError> {
        let revision = choice_or(params, "model_revision", ModelRevision::default())?;
        let defaults = revision.defaults();

        let years_raw = f64_or(params, "simulation_years", 10.0)?;
        if years_raw < 1.0 {
            return Err(ConfigError::MinViolation {
                field: "simulation_years",
                min: 1.0,
                value: years_raw,
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let years = years_raw.min(f64::from(MAX_TIMESTEPS)) as u32;

        let initial_population = min_checked(
            f64_with_fallback(params, "focal_population", "initial_adult_population", 50.0)?,
            "focal_population",
            0.0,
        )?;

        let male_percentage = match lookup_f64(params, "male_percentage")? {
            Some(pct) => pct,
            None => match lookup_f64(params, "initial_female_percentage")? {
                Some(female_pct) => 100.0 - female_pct,
                None => 50.0,
            },
        };
        let male_percentage = range_checked(male_percentage, "male_percentage", 0.0, 100.0)?;

        let carrying_capacity = min_checked(
            f64_with_fallback(
                params,
                "focal_carrying_capacity",
                "carrying_capacity",
                initial_population,
            )?,
            "focal_carrying_capacity",
            0.0,
        )?;

        let mean_litter_size = positive_checked(
            f64_or(params, "mean_litter_size", defaults.mean_litter_size)?,
            "mean_litter_size",
        )?;
        let litters_per_year = positive_checked(
            f64_or(params, "litters_per_year", defaults.litters_per_year)?,
            "litters_per_year",
        )?;
        let male_breeding_capacity_per_day = positive_checked(
            f64_or(params, "male_breeding_capacity_per_day", 3.0)?,
            "male_breeding_capacity_per_day",
        )?;

        let mut pct_females_amh =
            range_checked(f64_or(params, "pct_females_amh", 0.0)?, "pct_females_amh", 0.0, 100.0)?;
        let mut pct_females_spayed = range_checked(
            f64_or(params, "pct_females_spayed", 0.0)?,
            "pct_females_spayed",
            0.0,
            100.0,
        )?;
        let mut pct_males_neutered = range_checked(
            f64_or(params, "pct_males_neutered", 0.0)?,
            "pct_males_neutered",
            0.0,
            100.0,
        )?;

        let fc_timing = choice_or(params, "fc_timing", FcTiming::default())?;
        let fc_unit = choice_or(params, "fc_unit", FcUnit::default())?;

        let amh_absolute = min_checked(
            f64_or(params, "fc_females_amh_absolute", 0.0)?,
            "fc_females_amh_absolute",
            0.0,
        )?;
        let spay_absolute = min_checked(
            f64_or(params, "fc_females_spayed_absolute", 0.0)?,
            "fc_females_spayed_absolute",
            0.0,
        )?;
        let neuter_absolute = min_checked(
            f64_or(params, "fc_males_neutered_absolute", 0.0)?,
            "fc_males_neutered_absolute",
            0.0,
        )?;

        // Absolute counts are re-expressed as percentages of the initial
        // population so scenario selection and one-time conversion share one
        // code path. An empty colony converts to 0%.
        if fc_unit == FcUnit::Absolute {
            pct_females_amh = 100.0 * ratio_or_zero(amh_absolute, initial_population);
            pct_females_spayed = 100.0 * ratio_or_zero(spay_absolute, initial_population);
            pct_males_neutered = 100.0 * ratio_or_zero(neuter_absolute, initial_population);
        }

        let adult_mortality_annual = range_checked(
            f64_or(params, "adult_mortality_annual", 10.0)?,
            "adult_mortality_annual",
            0.0,
            100.0,
        )? / 100.0;

        let base_kitten_mortality = range_checked(
            f64_or(params, "base_kitten_mortality", defaults.base_kitten_mortality)?,
            "base_kitten_mortality",
            0.0,
            1.0,
        )?;
        let high_density_mortality = range_checked(
            f64_or(params, "high_density_mortality", defaults.high_density_mortality)?,
            "high_density_mortality",
            0.0,
            1.0,
        )?;

        let arrivals_per_year = min_checked(
            f64_or(params, "arrivals_per_year", 0.0)?,
            "arrivals_per_year",
            0.0,
        )?;
        let departures_per_year = min_checked(
            f64_or(params, "departures_per_year", 0.0)?,
            "departures_per_year",
            0.0,
        )?;

        let monopolization_days = min_checked(
            f64_or(params, "monopolization_amh_days", 15.0)?,
            "monopolization_amh_days",
            0.0,
        )?;
        let amh_monopolization_ratio = (monopolization_days / ESTROUS_CYCLE_DAYS).min(1.0);

        // A seed parameter may arrive from older clients; the engine is
        // deterministic and draws nothing from it.
        let _ = lookup_f64(params, "random_seed")?;

        Ok(Self {
            revision,
            years,
            initial_population,
            male_fraction: male_percentage / 100.0,
            carrying_capacity,
            mean_litter_size,
            litters_per_year,
            male_breeding_capacity_per_day,
            pct_females_amh,
            pct_females_spayed,
            pct_males_neutered,
            fc_timing,
            fc_unit,
            amh_absolute,
            spay_absolute,
            neuter_absolute,
            adult_mortality_annual,
            base_kitten_mortality,
            high_density_mortality,
            arrivals_per_year,
            departures_per_year,
            amh_monopolization_ratio,
        })
    }
}

/// Read a numeric field, accepting JSON numbers and numeric strings.
fn lookup_f64(params: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, ConfigError> {
    let Some(value) = params.get(field) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Null => return Ok(None),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(ConfigError::NotNumeric {
            field,
            raw: value.to_string(),
        }),
    }
}

fn f64_or(
    params: &Map<String, Value>,
    field: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    Ok(lookup_f64(params, field)?.unwrap_or(default))
}

/// Read `field`, falling back to the legacy name, then to `default`.
fn f64_with_fallback(
    params: &Map<String, Value>,
    field: &'static str,
    legacy: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    match lookup_f64(params, field)? {
        Some(value) => Ok(value),
        None => Ok(lookup_f64(params, legacy)?.unwrap_or(default)),
    }
}

fn choice_or<T>(
    params: &Map<String, Value>,
    field: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + ChoiceField,
{
    let Some(value) = params.get(field) else {
        return Ok(default);
    };
    let Value::String(text) = value else {
        return Err(ConfigError::InvalidChoice {
            field,
            allowed: T::ALLOWED,
            raw: value.to_string(),
        });
    };
    text.parse::<T>().map_err(|_| ConfigError::InvalidChoice {
        field,
        allowed: T::ALLOWED,
        raw: text.clone(),
    })
}

/// The human-readable choice list shown in `InvalidChoice` errors.
trait ChoiceField {
    const ALLOWED: &'static str;
}

impl ChoiceField for FcTiming {
    const ALLOWED: &'static str = "one-time, yearly";
}

impl ChoiceField for FcUnit {
    const ALLOWED: &'static str = "percentage, absolute";
}

impl ChoiceField for ModelRevision {
    const ALLOWED: &'static str = "boone2019, miller2014";
}

fn min_checked(value: f64, field: &'static str, min: f64) -> Result<f64, ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(value)
}

fn positive_checked(value: f64, field: &'static str) -> Result<f64, ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::MinViolation {
            field,
            min: f64::EPSILON,
            value,
        });
    }
    Ok(value)
}

fn range_checked(
    value: f64,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64, ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn empty_map_resolves_to_documented_defaults() {
        let cfg = SimulationConfig::resolve(&Map::new()).unwrap();
        assert_eq!(cfg.years, 10);
        assert!((cfg.initial_population - 50.0).abs() < f64::EPSILON);
        assert!((cfg.male_fraction - 0.5).abs() < f64::EPSILON);
        assert!((cfg.carrying_capacity - 50.0).abs() < f64::EPSILON);
        assert!((cfg.mean_litter_size - 4.0).abs() < f64::EPSILON);
        assert!((cfg.litters_per_year - 2.0).abs() < f64::EPSILON);
        assert!((cfg.adult_mortality_annual - 0.10).abs() < f64::EPSILON);
        assert!((cfg.base_kitten_mortality - 0.75).abs() < f64::EPSILON);
        assert!((cfg.amh_monopolization_ratio - 15.0 / 16.0).abs() < f64::EPSILON);
        assert_eq!(cfg.fc_timing, FcTiming::OneTime);
        assert_eq!(cfg.fc_unit, FcUnit::Percentage);
        assert_eq!(cfg.revision, ModelRevision::Boone2019);
    }

    #[test]
    fn carrying_capacity_defaults_to_initial_population() {
        let map = params(&[("focal_population", json!(120))]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.carrying_capacity - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn legacy_field_names_are_honored_when_new_names_absent() {
        let map = params(&[
            ("initial_adult_population", json!(80)),
            ("carrying_capacity", json!(400)),
            ("initial_female_percentage", json!(70)),
        ]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.initial_population - 80.0).abs() < f64::EPSILON);
        assert!((cfg.carrying_capacity - 400.0).abs() < f64::EPSILON);
        assert!((cfg.male_fraction - 0.3).abs() < 1e-12);
    }

    #[test]
    fn new_field_names_shadow_legacy_ones() {
        let map = params(&[
            ("focal_carrying_capacity", json!(200)),
            ("carrying_capacity", json!(999)),
        ]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.carrying_capacity - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absolute_counts_convert_to_percentages() {
        let map = params(&[
            ("focal_population", json!(200)),
            ("fc_unit", json!("absolute")),
            ("fc_females_spayed_absolute", json!(50)),
            ("fc_males_neutered_absolute", json!(20)),
        ]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.pct_females_spayed - 25.0).abs() < f64::EPSILON);
        assert!((cfg.pct_males_neutered - 10.0).abs() < f64::EPSILON);
        assert!((cfg.pct_females_amh).abs() < f64::EPSILON);
    }

    #[test]
    fn absolute_conversion_is_zero_for_empty_colony() {
        let map = params(&[
            ("focal_population", json!(0)),
            ("fc_unit", json!("absolute")),
            ("fc_females_spayed_absolute", json!(50)),
        ]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.pct_females_spayed).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_strings_parse_like_numbers() {
        let map = params(&[("simulation_years", json!("3")), ("male_percentage", json!("62.5"))]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert_eq!(cfg.years, 3);
        assert!((cfg.male_fraction - 0.625).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_numeric_values_with_field_name() {
        let map = params(&[("focal_population", json!("plenty"))]);
        let err = SimulationConfig::resolve(&map).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotNumeric {
                field: "focal_population",
                raw: "plenty".to_string(),
            }
        );
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let negative_pop = params(&[("focal_population", json!(-5))]);
        assert!(matches!(
            SimulationConfig::resolve(&negative_pop).unwrap_err(),
            ConfigError::MinViolation {
                field: "focal_population",
                ..
            }
        ));

        let over_pct = params(&[("pct_females_spayed", json!(120))]);
        assert!(matches!(
            SimulationConfig::resolve(&over_pct).unwrap_err(),
            ConfigError::RangeViolation {
                field: "pct_females_spayed",
                ..
            }
        ));

        let zero_years = params(&[("simulation_years", json!(0))]);
        assert!(matches!(
            SimulationConfig::resolve(&zero_years).unwrap_err(),
            ConfigError::MinViolation {
                field: "simulation_years",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_choice_values() {
        let map = params(&[("fc_timing", json!("sometimes"))]);
        let err = SimulationConfig::resolve(&map).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidChoice {
                field: "fc_timing",
                allowed: "one-time, yearly",
                raw: "sometimes".to_string(),
            }
        );
    }

    #[test]
    fn revision_tag_switches_default_tables() {
        let map = params(&[("model_revision", json!("miller2014"))]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.base_kitten_mortality - 0.60).abs() < f64::EPSILON);
        assert!((cfg.high_density_mortality - 0.90).abs() < f64::EPSILON);
        assert!((cfg.litters_per_year - 1.4).abs() < f64::EPSILON);
        assert!((cfg.mean_litter_size - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_values_shadow_revision_defaults() {
        let map = params(&[
            ("model_revision", json!("miller2014")),
            ("base_kitten_mortality", json!(0.5)),
        ]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.base_kitten_mortality - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn monopolization_ratio_caps_at_one() {
        let map = params(&[("monopolization_amh_days", json!(40))]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert!((cfg.amh_monopolization_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vestigial_seed_is_accepted_and_ignored() {
        let with_seed = params(&[("random_seed", json!(42))]);
        let without = Map::new();
        assert_eq!(
            SimulationConfig::resolve(&with_seed).unwrap(),
            SimulationConfig::resolve(&without).unwrap()
        );
    }

    #[test]
    fn timesteps_doubles_years() {
        let map = params(&[("simulation_years", json!(7))]);
        let cfg = SimulationConfig::resolve(&map).unwrap();
        assert_eq!(cfg.timesteps(), 14);
    }
}
