//! Independent trials.
//!
//! A trial scores a population with one policy and runs it for a number of days, recording a
//! [`DaySummary`] per day. To compare policies fairly, [`run_trials`] starts every trial from a
//! clone of the same snapshot, gives each its own random stream, and runs them on separate
//! threads. Trials never share state.
use std::thread;

use log::info;

use crate::error::SimError;
use crate::population::Population;
use crate::random::derive_seed;
use crate::summary::DaySummary;
use crate::vaccine::{ScoringPolicy, VaccineScoringStrategy};

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub policy: String,
    /// One summary per simulated day, starting with the day before the first timestep.
    pub days: Vec<DaySummary>,
    /// The population as it stands after the last day.
    pub population: Population,
}

impl TrialOutcome {
    #[must_use]
    pub fn final_summary(&self) -> Option<&DaySummary> {
        self.days.last()
    }
}

/// Scores `population` with `strategy`, records the initial summary and then runs `days - 1`
/// timesteps, recording a summary after each.
///
/// # Errors
///
/// Returns [`SimError::StrategyError`] if the strategy's scores are invalid.
pub fn run_trial(
    mut population: Population,
    strategy: &mut dyn VaccineScoringStrategy,
    days: usize,
) -> Result<TrialOutcome, SimError> {
    population.assign_scores(strategy)?;
    let policy = strategy.name().to_string();
    info!("Running {policy} for {days} days");

    let mut summaries = Vec::with_capacity(days);
    if days > 0 {
        summaries.push(population.summary());
    }
    for _ in 1..days {
        population.run_timestep();
        summaries.push(population.summary());
    }

    Ok(TrialOutcome {
        policy,
        days: summaries,
        population,
    })
}

/// Runs one trial per policy, each on its own clone of `snapshot` reseeded from the snapshot's
/// seed and the policy name. Outcomes are returned in the order of `policies`.
///
/// # Errors
///
/// Returns the first trial's error in policy order, or [`SimError::SimError`] if a trial thread
/// panicked.
pub fn run_trials(
    snapshot: &Population,
    policies: Vec<ScoringPolicy>,
    days: usize,
) -> Result<Vec<TrialOutcome>, SimError> {
    let base_seed = snapshot.parameters().seed;
    thread::scope(|scope| {
        let handles: Vec<_> = policies
            .into_iter()
            .map(|mut policy| {
                let mut population = snapshot.clone();
                population.reseed(derive_seed(base_seed, policy.name()));
                scope.spawn(move || run_trial(population, &mut policy, days))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| SimError::SimError("trial thread panicked".to_string()))?
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::FeatureVector;
    use crate::parameters::InitialInfections;
    use crate::vaccine::ScoreModel;

    struct OldestFirst;

    impl ScoreModel for OldestFirst {
        fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
            features.iter().map(|f| 1.0 - f.0[0] / 100.0).collect()
        }
    }

    fn snapshot() -> Population {
        Population::construct(200, InitialInfections::Count(20), 11).unwrap()
    }

    #[test]
    fn trial_records_one_summary_per_day() {
        let outcome = run_trial(snapshot(), &mut ScoringPolicy::NoVaccine, 5).unwrap();
        assert_eq!(outcome.policy, "no_vaccine");
        assert_eq!(outcome.days.len(), 5);
        assert_eq!(outcome.days[0].date, outcome.days[0].start_date);
        assert_eq!(
            (outcome.days[4].date - outcome.days[0].date).num_days(),
            4
        );
        assert_eq!(outcome.final_summary(), outcome.days.last());
        assert_eq!(outcome.population.summary(), outcome.days[4]);
    }

    #[test]
    fn zero_days_records_nothing() {
        let outcome = run_trial(snapshot(), &mut ScoringPolicy::NoVaccine, 0).unwrap();
        assert!(outcome.days.is_empty());
        assert!(outcome.final_summary().is_none());
    }

    #[test]
    fn trials_run_in_policy_order() {
        let policies = vec![
            ScoringPolicy::NoVaccine,
            ScoringPolicy::RandomPriority,
            ScoringPolicy::model_scored("oldest_first", Box::new(OldestFirst)),
        ];
        let outcomes = run_trials(&snapshot(), policies, 40).unwrap();
        let names: Vec<&str> = outcomes.iter().map(|o| o.policy.as_str()).collect();
        assert_eq!(names, vec!["no_vaccine", "random_vaccine", "oldest_first"]);

        // The first wave is on day 15.
        assert_eq!(outcomes[0].final_summary().unwrap().vaccinated, 0);
        assert!(outcomes[1].final_summary().unwrap().vaccinated > 0);
        assert!(outcomes[2].final_summary().unwrap().vaccinated > 0);

        // All trials start from the same snapshot.
        assert_eq!(outcomes[0].days[0], outcomes[1].days[0]);
        assert_eq!(outcomes[1].days[0], outcomes[2].days[0]);
    }

    #[test]
    fn trials_are_reproducible() {
        let a = run_trials(&snapshot(), vec![ScoringPolicy::RandomPriority], 30).unwrap();
        let b = run_trials(&snapshot(), vec![ScoringPolicy::RandomPriority], 30).unwrap();
        assert_eq!(a[0].days, b[0].days);
    }

    #[test]
    fn invalid_model_scores_fail_the_batch() {
        struct OutOfRange;
        impl ScoreModel for OutOfRange {
            fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
                vec![2.0; features.len()]
            }
        }

        let policies = vec![
            ScoringPolicy::NoVaccine,
            ScoringPolicy::model_scored("broken", Box::new(OutOfRange)),
        ];
        assert!(matches!(
            run_trials(&snapshot(), policies, 3),
            Err(SimError::StrategyError(_))
        ));
    }
}
