//! Vaccine prioritization and wave allocation.
//!
//! Before a run, a [`VaccineScoringStrategy`] gives every individual a priority score in
//! `[-1, 1]`; a negative score opts the individual out. On each wave date the
//! [`VaccineAllocator`] walks individuals in ascending score order and vaccinates eligible ones
//! until the wave's quota is used up.
//!
//! The order is computed on the first wave and then frozen for the rest of the run. Scores
//! assigned after that point do not reorder anyone.
use chrono::{Days, NaiveDate};
use log::{debug, info};
use rand::Rng;

use crate::error::SimError;
use crate::individual::{FeatureVector, Individual};
use crate::random::SimRng;

/// A trained predictor supplied from outside the engine. Training it is not the engine's
/// business; the engine only asks for one prediction per individual.
pub trait ScoreModel: Send {
    fn predict(&self, features: &[FeatureVector]) -> Vec<f64>;
}

/// Produces one priority score per individual.
pub trait VaccineScoringStrategy {
    fn name(&self) -> &str;

    fn score(&mut self, individuals: &[Individual], rng: &mut SimRng) -> Vec<f64>;
}

/// The built-in policies.
pub enum ScoringPolicy {
    /// Everyone opts out; no doses are given.
    NoVaccine,
    /// Uniform random scores, i.e. first come, first served.
    RandomPriority,
    /// Scores come from an external model.
    ModelScored {
        name: String,
        model: Box<dyn ScoreModel>,
    },
}

impl ScoringPolicy {
    pub fn model_scored(name: impl Into<String>, model: Box<dyn ScoreModel>) -> ScoringPolicy {
        ScoringPolicy::ModelScored {
            name: name.into(),
            model,
        }
    }
}

impl VaccineScoringStrategy for ScoringPolicy {
    fn name(&self) -> &str {
        match self {
            ScoringPolicy::NoVaccine => "no_vaccine",
            ScoringPolicy::RandomPriority => "random_vaccine",
            ScoringPolicy::ModelScored { name, .. } => name.as_str(),
        }
    }

    fn score(&mut self, individuals: &[Individual], rng: &mut SimRng) -> Vec<f64> {
        match self {
            ScoringPolicy::NoVaccine => vec![-1.0; individuals.len()],
            ScoringPolicy::RandomPriority => {
                individuals.iter().map(|_| rng.random::<f64>()).collect()
            }
            ScoringPolicy::ModelScored { model, .. } => {
                let features: Vec<FeatureVector> =
                    individuals.iter().map(Individual::features).collect();
                model.predict(&features)
            }
        }
    }
}

/// Checks that a strategy scored every individual with a value in `[-1, 1]`.
///
/// # Errors
///
/// Returns [`SimError::StrategyError`] on a missing, extra, non-finite or out-of-range score.
pub fn validate_scores(scores: &[f64], population_size: usize) -> Result<(), SimError> {
    if scores.len() != population_size {
        return Err(SimError::strategy(format!(
            "{} scores for {population_size} individuals",
            scores.len()
        )));
    }
    if let Some((index, score)) = scores
        .iter()
        .enumerate()
        .find(|(_, score)| !(-1.0..=1.0).contains(*score))
    {
        return Err(SimError::strategy(format!(
            "score {score} for individual {index} is outside [-1, 1]"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct VaccineAllocator {
    wave_dates: Vec<NaiveDate>,
    total_supply: usize,
    remaining_supply: usize,
    /// Ascending-score order, computed once on the first wave.
    priority_order: Option<Vec<usize>>,
}

impl VaccineAllocator {
    /// Schedules `wave_count` waves, the i-th (from zero) on `start + interval * (i + 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigurationError`] when there are no waves, the interval is not
    /// positive, or a wave date is out of the calendar's range.
    pub fn new(
        start: NaiveDate,
        wave_count: usize,
        wave_interval_days: i64,
        total_supply: usize,
    ) -> Result<VaccineAllocator, SimError> {
        if wave_count == 0 {
            return Err(SimError::configuration("wave_count must be positive"));
        }
        let interval = u64::try_from(wave_interval_days)
            .ok()
            .filter(|&days| days > 0)
            .ok_or_else(|| SimError::configuration("wave_interval_days must be positive"))?;

        let wave_dates = (1..=wave_count as u64)
            .map(|wave| {
                interval
                    .checked_mul(wave)
                    .and_then(|offset| start.checked_add_days(Days::new(offset)))
                    .ok_or_else(|| SimError::configuration("wave date out of range"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VaccineAllocator {
            wave_dates,
            total_supply,
            remaining_supply: total_supply,
            priority_order: None,
        })
    }

    #[must_use]
    pub fn wave_dates(&self) -> &[NaiveDate] {
        &self.wave_dates
    }

    #[must_use]
    pub fn is_wave_date(&self, date: NaiveDate) -> bool {
        self.wave_dates.contains(&date)
    }

    /// Doses per wave. Any remainder of the supply is never given out.
    #[must_use]
    pub fn quota(&self) -> usize {
        self.total_supply / self.wave_dates.len()
    }

    #[must_use]
    pub fn total_supply(&self) -> usize {
        self.total_supply
    }

    #[must_use]
    pub fn remaining_supply(&self) -> usize {
        self.remaining_supply
    }

    /// The frozen priority order, once the first wave has happened.
    #[must_use]
    pub fn priority_order(&self) -> Option<&[usize]> {
        self.priority_order.as_deref()
    }

    /// Runs the wave scheduled for `current_date`, if any. Returns the number of doses given.
    pub fn allocate(&mut self, individuals: &mut [Individual], current_date: NaiveDate) -> usize {
        if !self.is_wave_date(current_date) {
            return 0;
        }

        let quota = self.quota().min(self.remaining_supply);
        let order = self.priority_order.get_or_insert_with(|| {
            debug!("Freezing vaccine priority order");
            priority_order(individuals)
        });

        let mut given = 0;
        for &index in order.iter() {
            if given >= quota {
                break;
            }
            let individual = &mut individuals[index];
            if individual.is_alive()
                && !individual.is_vaccinated()
                && individual.score() >= 0.0
                && individual.vaccinate(current_date)
            {
                given += 1;
            }
        }

        self.remaining_supply -= given;
        info!(
            "Vaccination wave on {current_date}: {given} of {quota} doses given, {} left",
            self.remaining_supply
        );
        given
    }
}

/// All indices sorted by ascending score; ties keep index order.
fn priority_order(individuals: &[Individual]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..individuals.len()).collect();
    order.sort_by(|&a, &b| individuals[a].score().total_cmp(&individuals[b].score()));
    order
}
