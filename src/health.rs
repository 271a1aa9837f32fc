//! Disease progression of a single individual.
//!
//! An infected individual moves through severity stages on fixed days after onset. At the end of
//! each stage a single draw decides between recovery and the next stage; after the last stage
//! the alternative to recovery is death. Every other day is a no-op.
use chrono::NaiveDate;
use log::trace;
use rand::Rng;

use crate::individual::Individual;

/// Days after onset on which visible symptoms fade.
pub const SYMPTOMS_FADE_DAY: i64 = 3;
/// Days after onset on which symptoms become visible.
pub const SYMPTOMS_VISIBLE_DAY: i64 = 5;
/// Days after onset on which each stage ends with a recovery draw.
pub const STAGE_END_DAYS: [i64; 4] = [10, 15, 24, 35];

/// Base recovery probabilities per stage, as used in the reference runs.
pub const DEFAULT_RECOVERY_PROBABILITIES: [f64; 4] = [0.5, 0.3, 0.5, 0.9];

/// Multiplier on the recovery draw; larger values make recovery less likely.
#[must_use]
pub fn health_factor(individual: &Individual) -> f64 {
    let mut factor = 1.0;
    if individual.demographics().preexisting_condition {
        factor *= 1.5;
    }
    if individual.age() >= 65 {
        factor *= 1.5;
    }
    factor
}

/// Advances `individual` to `current_date`.
///
/// Does nothing for individuals who were never infected or whose infection is already resolved.
pub fn advance<R: Rng + ?Sized>(
    individual: &mut Individual,
    current_date: NaiveDate,
    recovery_probabilities: &[f64; 4],
    rng: &mut R,
) {
    let Some(onset) = individual.onset() else {
        return;
    };
    if !individual.is_contagious() {
        return;
    }

    let days_since_onset = (current_date - onset).num_days();
    match days_since_onset {
        SYMPTOMS_FADE_DAY => individual.set_visible_symptoms(false),
        SYMPTOMS_VISIBLE_DAY => individual.set_visible_symptoms(true),
        day => {
            if let Some(stage) = STAGE_END_DAYS.iter().position(|&end| end == day) {
                end_stage(individual, stage, current_date, recovery_probabilities, rng);
            }
        }
    }
}

fn end_stage<R: Rng + ?Sized>(
    individual: &mut Individual,
    stage: usize,
    current_date: NaiveDate,
    recovery_probabilities: &[f64; 4],
    rng: &mut R,
) {
    let draw: f64 = rng.random();
    if draw * health_factor(individual) < recovery_probabilities[stage] {
        individual.recover(current_date);
        return;
    }

    if stage + 1 == STAGE_END_DAYS.len() {
        individual.kill(current_date);
        return;
    }

    #[allow(clippy::cast_possible_truncation)]
    let next_stage = (stage + 1) as u8;
    trace!(
        "Individual {} worsens to stage {next_stage} on {current_date}",
        individual.id()
    );
    individual.worsen_to(next_stage);
    if stage == 0 {
        individual.quarantine();
    }
}
