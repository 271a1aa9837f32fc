//! The daily infection draw for susceptible individuals.
use chrono::NaiveDate;
use rand::Rng;

use crate::individual::Individual;

/// Demographic multiplier on the daily infection probability. Only the highest applicable age
/// band counts; a pre-existing condition doubles it again.
#[must_use]
pub fn susceptibility_multiplier(individual: &Individual) -> f64 {
    let age_band = match individual.age() {
        age if age >= 70 => 2.0,
        age if age >= 50 => 1.5,
        age if age >= 30 => 1.1,
        _ => 1.0,
    };
    if individual.demographics().preexisting_condition {
        age_band * 2.0
    } else {
        age_band
    }
}

/// Chance that `individual` is infected today given `load` units of interaction with
/// contagious contacts.
#[must_use]
pub fn infection_probability(individual: &Individual, load: u64, interaction_hazard: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let exposure = (1.0 + interaction_hazard).powf(load as f64) - 1.0;
    exposure * (1.0 - individual.immunity()) * susceptibility_multiplier(individual)
}

/// Draws once for a susceptible individual and infects them on success. Non-susceptible
/// individuals are skipped without drawing. Returns whether an infection happened.
pub fn attempt_infection<R: Rng + ?Sized>(
    individual: &mut Individual,
    load: u64,
    interaction_hazard: f64,
    current_date: NaiveDate,
    rng: &mut R,
) -> bool {
    if !individual.is_susceptible() {
        return false;
    }
    let probability = infection_probability(individual, load, interaction_hazard);
    if rng.random::<f64>() < probability {
        individual.infect(current_date)
    } else {
        false
    }
}
