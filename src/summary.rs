//! Per-day aggregate statistics.
use chrono::NaiveDate;
use serde::Serialize;

use crate::population::Population;

/// A snapshot of the population's aggregate state. Rates use `max(1, denominator)`, so an empty
/// group reads as zero.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub start_date: NaiveDate,
    pub date: NaiveDate,
    pub starting_population: usize,
    pub alive: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub dead: usize,
    pub uninfected: usize,
    pub vaccinated: usize,
    pub wasted_doses: usize,
    pub mortality_rate: f64,
    pub infection_rate: f64,
    pub female_fraction: f64,
    pub male_fraction: f64,
    pub teacher_sick_rate: f64,
    pub hospital_worker_sick_rate: f64,
    pub frontline_worker_sick_rate: f64,
}

impl DaySummary {
    #[must_use]
    pub fn capture(population: &Population) -> DaySummary {
        let female_fraction = population.female_fraction();
        DaySummary {
            start_date: population.start_date(),
            date: population.current_date(),
            starting_population: population.starting_population(),
            alive: population.alive_count(),
            infectious: population.infectious_count(),
            recovered: population.recovered_count(),
            dead: population.dead_count(),
            uninfected: population.uninfected_count(),
            vaccinated: population.vaccinated_count(),
            wasted_doses: population.wasted_dose_count(),
            mortality_rate: population.mortality_rate(),
            infection_rate: population.infection_rate(),
            female_fraction,
            male_fraction: 1.0 - female_fraction,
            teacher_sick_rate: population.teacher_sick_rate(),
            hospital_worker_sick_rate: population.hospital_worker_sick_rate(),
            frontline_worker_sick_rate: population.frontline_worker_sick_rate(),
        }
    }

    /// Individuals accounted for by the health states. Always equals the starting population.
    #[must_use]
    pub fn accounted_for(&self) -> usize {
        self.infectious + self.recovered + self.dead + self.uninfected
    }
}
