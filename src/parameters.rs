//! Run configuration.
//!
//! Every knob of a run lives in [`Parameters`]. Parameters are built either with
//! [`ParametersBuilder`] (unset fields take their defaults) or loaded from a JSON file with
//! [`load_parameters_from_json`], where missing fields likewise take their defaults:
//!
//! ```json
//! {
//!     "population_size": 5000,
//!     "initial_infections": 0.05,
//!     "seed": 42,
//!     "vaccine_supply": 2500
//! }
//! ```
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use derive_builder::Builder;
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How many individuals are force-infected when the population is built.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum InitialInfections {
    /// An exact number of individuals.
    Count(usize),
    /// A fraction of the population, rounded to the nearest individual.
    Fraction(f64),
}

impl InitialInfections {
    /// The size of the seed cohort for a population of `population_size`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve(self, population_size: usize) -> usize {
        match self {
            InitialInfections::Count(count) => count,
            InitialInfections::Fraction(fraction) => {
                (fraction * population_size as f64).round() as usize
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Builder)]
#[serde(default)]
pub struct Parameters {
    #[builder(default = "1000")]
    pub population_size: usize,

    #[builder(default = "InitialInfections::Count(100)")]
    pub initial_infections: InitialInfections,

    #[builder(default = "0")]
    pub seed: u64,

    #[builder(default = "default_start_date()")]
    pub start_date: NaiveDate,

    /// Chance of catching the disease from a single unit of interaction load.
    #[builder(default = "0.000_002_5")]
    pub interaction_hazard: f64,

    /// Base chance of recovering at the end of each severity stage.
    #[builder(default = "[0.5, 0.3, 0.5, 0.9]")]
    pub recovery_probabilities: [f64; 4],

    #[builder(default = "10")]
    pub wave_count: usize,

    #[builder(default = "15")]
    pub wave_interval_days: i64,

    /// Total number of doses across all waves. `None` means one dose per individual.
    #[builder(default = "None")]
    pub vaccine_supply: Option<usize>,

    #[builder(default = "90")]
    pub max_age: u8,

    #[builder(default = "0.1")]
    pub preexisting_condition_rate: f64,

    #[builder(default = "20")]
    pub max_workplace_id: i32,

    #[builder(default = "20")]
    pub max_shopping_id: i32,

    /// Number of shopping venue draws per individual; repeated draws collapse.
    #[builder(default = "5")]
    pub shopping_draws: usize,

    /// The seed cohort's onset is back-dated by up to this many days.
    #[builder(default = "14")]
    pub max_seed_days_back: i64,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default()
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population_size: 1000,
            initial_infections: InitialInfections::Count(100),
            seed: 0,
            start_date: default_start_date(),
            interaction_hazard: 0.000_002_5,
            recovery_probabilities: [0.5, 0.3, 0.5, 0.9],
            wave_count: 10,
            wave_interval_days: 15,
            vaccine_supply: None,
            max_age: 90,
            preexisting_condition_rate: 0.1,
            max_workplace_id: 20,
            max_shopping_id: 20,
            shopping_draws: 5,
            max_seed_days_back: 14,
        }
    }
}

impl Parameters {
    /// Total doses available over the whole run.
    #[must_use]
    pub fn total_vaccine_supply(&self) -> usize {
        self.vaccine_supply.unwrap_or(self.population_size)
    }

    /// Checks that these parameters describe a runnable population.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigurationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        let result = self.check();
        if let Err(ref e) = result {
            error!("invalid parameters: {e}");
        }
        result
    }

    fn check(&self) -> Result<(), SimError> {
        if self.population_size == 0 {
            return Err(SimError::configuration("population_size must be positive"));
        }
        if self.wave_count == 0 {
            return Err(SimError::configuration("wave_count must be positive"));
        }
        if self.wave_interval_days <= 0 {
            return Err(SimError::configuration(
                "wave_interval_days must be positive",
            ));
        }
        if !self.interaction_hazard.is_finite() || self.interaction_hazard < 0.0 {
            return Err(SimError::configuration(
                "interaction_hazard must be a non-negative number",
            ));
        }
        for (stage, p) in self.recovery_probabilities.iter().enumerate() {
            if !is_probability(*p) {
                return Err(SimError::configuration(format!(
                    "recovery probability for stage {stage} must be in [0, 1], got {p}"
                )));
            }
        }
        if !is_probability(self.preexisting_condition_rate) {
            return Err(SimError::configuration(
                "preexisting_condition_rate must be in [0, 1]",
            ));
        }
        if self.max_workplace_id < 0 || self.max_shopping_id < 0 {
            return Err(SimError::configuration(
                "venue id ranges must be non-negative",
            ));
        }
        if self.max_seed_days_back < 0 {
            return Err(SimError::configuration(
                "max_seed_days_back must be non-negative",
            ));
        }
        match self.initial_infections {
            InitialInfections::Fraction(f) if !is_probability(f) => {
                Err(SimError::configuration(format!(
                    "initial infection fraction must be in [0, 1], got {f}"
                )))
            }
            InitialInfections::Count(n) if n > self.population_size => {
                Err(SimError::configuration(format!(
                    "cannot infect {n} of {} individuals",
                    self.population_size
                )))
            }
            _ => Ok(()),
        }
    }
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

/// Reads a JSON parameter file and validates it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the parameters are invalid.
pub fn load_parameters_from_json<P: AsRef<Path>>(file_path: P) -> Result<Parameters, SimError> {
    let contents = fs::read_to_string(file_path)?;
    let parameters: Parameters = serde_json::from_str(&contents)?;
    parameters.validate()?;
    Ok(parameters)
}
