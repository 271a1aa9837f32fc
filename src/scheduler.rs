//! The daily timestep.
//!
//! One call to [`Population::run_timestep`] advances the city by exactly one day:
//!
//! 1. Snapshot who is contagious this morning.
//! 2. Accumulate each susceptible individual's interaction load from that snapshot.
//! 3. Run today's vaccination wave, if there is one.
//! 4. In index order, give every individual their infection draw and then advance their disease.
//! 5. Move the calendar forward one day.
//!
//! Individuals infected during step 4 were not in the morning snapshot, so they cannot infect
//! anyone else until tomorrow.
use chrono::NaiveDate;
use log::{debug, error};
use serde::Serialize;

use crate::exposure;
use crate::health;
use crate::population::Population;
use crate::transmission;

/// What happened during one timestep.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestepReport {
    /// The date that was simulated.
    pub date: NaiveDate,
    pub contagious_at_start: usize,
    pub new_infections: usize,
    pub doses_given: usize,
}

impl Population {
    /// Simulates the current day and returns the new current date.
    pub fn run_timestep(&mut self) -> NaiveDate {
        self.step();
        self.current_date
    }

    /// Simulates the current day and reports what happened.
    pub fn step(&mut self) -> TimestepReport {
        let today = self.current_date;

        let contagious = exposure::contagious_set(&self.individuals);
        let loads = exposure::accumulate(&self.individuals, &self.registry, &contagious);

        let doses_given = self.allocator.allocate(&mut self.individuals, today);

        let hazard = self.parameters.interaction_hazard;
        let recovery = self.parameters.recovery_probabilities;
        let mut new_infections = 0;
        for (individual, load) in self.individuals.iter_mut().zip(loads) {
            if transmission::attempt_infection(individual, load, hazard, today, &mut self.rng) {
                new_infections += 1;
            }
            health::advance(individual, today, &recovery, &mut self.rng);
        }

        match today.succ_opt() {
            Some(tomorrow) => self.current_date = tomorrow,
            None => error!("Calendar cannot advance past {today}"),
        }

        debug!(
            "{today}: {} contagious, {new_infections} infected, {doses_given} vaccinated",
            contagious.len()
        );

        TimestepReport {
            date: today,
            contagious_at_start: contagious.len(),
            new_infections,
            doses_given,
        }
    }

    /// Runs `days` timesteps and returns their reports.
    pub fn run_days(&mut self, days: usize) -> Vec<TimestepReport> {
        (0..days).map(|_| self.step()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::tests::{date, demographics};
    use crate::individual::Individual;
    use crate::parameters::{InitialInfections, Parameters, ParametersBuilder};
    use crate::vaccine::ScoringPolicy;

    fn household(size: usize, hazard: f64) -> Population {
        let individuals = (0..size)
            .map(|id| Individual::new(id, demographics(0, 5, &[])))
            .collect();
        let parameters = ParametersBuilder::default()
            .interaction_hazard(hazard)
            .build()
            .unwrap();
        Population::from_individuals(individuals, parameters).unwrap()
    }

    #[test]
    fn calendar_advances_one_day() {
        let mut population = household(2, 0.0);
        assert_eq!(population.current_date(), date(1));
        assert_eq!(population.run_timestep(), date(2));
        let reports = population.run_days(3);
        assert_eq!(
            reports.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![date(2), date(3), date(4)]
        );
        assert_eq!(population.current_date(), date(5));
    }

    #[test]
    fn household_members_catch_it_with_certainty() {
        // A hazard of 1.0 gives a household contact a probability far above 1.
        let mut population = household(3, 1.0);
        population.force_infect(0);
        let report = population.step();
        assert_eq!(report.contagious_at_start, 1);
        assert_eq!(report.new_infections, 2);
        assert!(population.individuals().iter().all(Individual::is_contagious));
        assert_eq!(population.individual(1).unwrap().onset(), Some(date(1)));
    }

    #[test]
    fn newly_infected_wait_a_day_to_spread() {
        let individuals = vec![
            Individual::new(0, demographics(0, 5, &[])),
            Individual::new(1, demographics(0, 6, &[])),
            Individual::new(2, demographics(1, 6, &[])),
        ];
        let parameters = ParametersBuilder::default()
            .interaction_hazard(1.0)
            .build()
            .unwrap();
        let mut population = Population::from_individuals(individuals, parameters).unwrap();
        population.force_infect(0);

        population.step();
        assert!(population.individual(1).unwrap().is_contagious());
        assert!(population.individual(2).unwrap().is_susceptible());

        population.step();
        assert_eq!(population.individual(2).unwrap().onset(), Some(date(2)));
    }

    #[test]
    fn zero_hazard_keeps_everyone_susceptible() {
        let mut population = household(4, 0.0);
        population.force_infect(0);
        population.run_days(30);
        assert_eq!(population.alive_count() + population.dead_count(), 4);
        assert!(population.individuals()[1..]
            .iter()
            .all(Individual::is_susceptible));
    }

    #[test]
    fn vaccination_waves_follow_calendar() {
        let parameters = ParametersBuilder::default()
            .population_size(100)
            .initial_infections(InitialInfections::Count(0))
            .wave_count(4)
            .wave_interval_days(3)
            .vaccine_supply(Some(40))
            .build()
            .unwrap();
        let mut population = Population::new(parameters).unwrap();
        population
            .assign_scores(&mut ScoringPolicy::RandomPriority)
            .unwrap();

        let doses: Vec<usize> = population
            .run_days(13)
            .iter()
            .map(|report| report.doses_given)
            .collect();
        assert_eq!(doses, vec![0, 0, 0, 10, 0, 0, 10, 0, 0, 10, 0, 0, 10]);
        assert_eq!(population.vaccinated_count(), 40);
        assert_eq!(population.allocator().remaining_supply(), 0);
    }

    #[test]
    fn unscored_population_gets_no_doses() {
        let mut population = Population::new(Parameters {
            population_size: 50,
            initial_infections: InitialInfections::Count(0),
            ..Parameters::default()
        })
        .unwrap();
        population.run_days(151);
        assert_eq!(population.vaccinated_count(), 0);
    }
}
