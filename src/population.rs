//! The simulated city.
//!
//! A [`Population`] owns its individuals, the venue registry built from them, the vaccination
//! calendar and the random stream. It is built once and then mutated in place, one day at a time,
//! by [`Population::run_timestep`](crate::scheduler). Nobody is ever removed: death is a state.
//!
//! Independent trials each own their own `Population`; use [`Clone`] to start several trials from
//! the same snapshot.
use chrono::{Days, NaiveDate};
use log::{info, warn};
use rand::seq::index;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::error::SimError;
use crate::health;
use crate::individual::{Demographics, Individual, VenueId, WorkplaceKind};
use crate::parameters::{InitialInfections, Parameters, ParametersBuilder};
use crate::random::{rng_from_seed, SimRng};
use crate::registry::ContactRegistry;
use crate::summary::DaySummary;
use crate::vaccine::{validate_scores, VaccineAllocator, VaccineScoringStrategy};

#[derive(Clone, Debug)]
pub struct Population {
    pub(crate) parameters: Parameters,
    pub(crate) individuals: Vec<Individual>,
    pub(crate) registry: ContactRegistry,
    pub(crate) allocator: VaccineAllocator,
    pub(crate) start_date: NaiveDate,
    pub(crate) current_date: NaiveDate,
    pub(crate) rng: SimRng,
}

impl Population {
    /// Generates a random population and infects its seed cohort.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigurationError`] if `parameters` are invalid.
    pub fn new(parameters: Parameters) -> Result<Population, SimError> {
        parameters.validate()?;
        let mut rng = rng_from_seed(parameters.seed);
        let individuals = generate_individuals(&parameters, &mut rng)?;
        let mut population = Population::assemble(parameters, individuals, rng)?;
        population.seed_infections()?;
        info!(
            "Built population of {} with {} infected, {} households",
            population.starting_population(),
            population.ever_infected_count(),
            population.registry.household_count()
        );
        Ok(population)
    }

    /// Builds a population with default parameters apart from its size, seed cohort and seed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigurationError`] for an empty population or an impossible cohort.
    pub fn construct(
        size: usize,
        initial_infections: InitialInfections,
        seed: u64,
    ) -> Result<Population, SimError> {
        let parameters = ParametersBuilder::default()
            .population_size(size)
            .initial_infections(initial_infections)
            .seed(seed)
            .build()
            .map_err(|e| SimError::configuration(e.to_string()))?;
        Population::new(parameters)
    }

    /// Wraps hand-built individuals. Their ids must be their positions. The population size and
    /// seed cohort of `parameters` are ignored: nobody is infected unless the caller does it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigurationError`] for an empty list, misnumbered ids or invalid
    /// parameters.
    pub fn from_individuals(
        individuals: Vec<Individual>,
        mut parameters: Parameters,
    ) -> Result<Population, SimError> {
        if let Some(misplaced) = individuals
            .iter()
            .enumerate()
            .find(|(index, individual)| individual.id() != *index)
        {
            return Err(SimError::configuration(format!(
                "individual {} is at position {}",
                misplaced.1.id(),
                misplaced.0
            )));
        }
        parameters.population_size = individuals.len();
        parameters.initial_infections = InitialInfections::Count(0);
        parameters.validate()?;
        let rng = rng_from_seed(parameters.seed);
        Population::assemble(parameters, individuals, rng)
    }

    fn assemble(
        parameters: Parameters,
        individuals: Vec<Individual>,
        rng: SimRng,
    ) -> Result<Population, SimError> {
        let allocator = VaccineAllocator::new(
            parameters.start_date,
            parameters.wave_count,
            parameters.wave_interval_days,
            parameters.total_vaccine_supply(),
        )?;
        let registry = ContactRegistry::build(&individuals);
        Ok(Population {
            start_date: parameters.start_date,
            current_date: parameters.start_date,
            parameters,
            individuals,
            registry,
            allocator,
            rng,
        })
    }

    /// Force-infects a random cohort with onsets spread over the preceding days, replaying their
    /// disease progression up to the start date.
    fn seed_infections(&mut self) -> Result<(), SimError> {
        let size = self.individuals.len();
        let count = self.parameters.initial_infections.resolve(size);
        if count > size {
            return Err(SimError::configuration(format!(
                "cannot infect {count} of {size} individuals"
            )));
        }

        let cohort = index::sample(&mut self.rng, size, count);
        for chosen in cohort {
            let days_back = self.rng.random_range(0..=self.parameters.max_seed_days_back);
            let days_back = u64::try_from(days_back).unwrap_or_default();
            let onset = self
                .start_date
                .checked_sub_days(Days::new(days_back))
                .ok_or_else(|| SimError::configuration("seed onset out of calendar range"))?;

            let individual = &mut self.individuals[chosen];
            individual.seed_infection(onset);
            for day in 0..days_back {
                if let Some(date) = onset.checked_add_days(Days::new(day)) {
                    health::advance(
                        individual,
                        date,
                        &self.parameters.recovery_probabilities,
                        &mut self.rng,
                    );
                }
            }
        }
        Ok(())
    }

    /// Replaces the random stream, e.g. to give a cloned snapshot its own trajectory.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = rng_from_seed(seed);
    }

    /// Scores every individual with `strategy`. Call this before the first vaccination wave:
    /// the priority order is frozen on that wave.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StrategyError`] if the strategy does not return exactly one score in
    /// `[-1, 1]` per individual. No score is changed in that case.
    pub fn assign_scores(
        &mut self,
        strategy: &mut dyn VaccineScoringStrategy,
    ) -> Result<(), SimError> {
        let scores = strategy.score(&self.individuals, &mut self.rng);
        validate_scores(&scores, self.individuals.len())?;
        if self.allocator.priority_order().is_some() {
            warn!(
                "Scores from {} assigned after the priority order was frozen",
                strategy.name()
            );
        }
        for (individual, score) in self.individuals.iter_mut().zip(scores) {
            individual.set_score(score);
        }
        Ok(())
    }

    /// Infects the individual at `index` on the current date. Returns `false` if they do not
    /// exist, are dead, or were already infected.
    pub fn force_infect(&mut self, index: usize) -> bool {
        let date = self.current_date;
        self.individuals
            .get_mut(index)
            .is_some_and(|individual| individual.infect(date))
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn individual(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    #[must_use]
    pub fn registry(&self) -> &ContactRegistry {
        &self.registry
    }

    #[must_use]
    pub fn allocator(&self) -> &VaccineAllocator {
        &self.allocator
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    #[must_use]
    pub fn wave_dates(&self) -> &[NaiveDate] {
        self.allocator.wave_dates()
    }

    #[must_use]
    pub fn summary(&self) -> DaySummary {
        DaySummary::capture(self)
    }

    fn count(&self, predicate: impl Fn(&Individual) -> bool) -> usize {
        self.individuals.iter().filter(|i| predicate(i)).count()
    }

    #[must_use]
    pub fn starting_population(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.count(Individual::is_alive)
    }

    #[must_use]
    pub fn infectious_count(&self) -> usize {
        self.count(Individual::is_contagious)
    }

    #[must_use]
    pub fn recovered_count(&self) -> usize {
        self.count(Individual::is_recovered)
    }

    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.count(|i| !i.is_alive())
    }

    #[must_use]
    pub fn uninfected_count(&self) -> usize {
        self.count(Individual::is_susceptible)
    }

    #[must_use]
    pub fn ever_infected_count(&self) -> usize {
        self.count(Individual::was_infected)
    }

    #[must_use]
    pub fn vaccinated_count(&self) -> usize {
        self.count(Individual::is_vaccinated)
    }

    #[must_use]
    pub fn wasted_dose_count(&self) -> usize {
        self.count(Individual::has_wasted_dose)
    }

    #[must_use]
    pub fn female_fraction(&self) -> f64 {
        ratio(
            self.count(|i| i.demographics().sex_female),
            self.starting_population(),
        )
    }

    /// Deaths among resolved infections.
    #[must_use]
    pub fn mortality_rate(&self) -> f64 {
        let dead = self.dead_count();
        ratio(dead, dead + self.recovered_count())
    }

    /// Share of the starting population ever infected.
    #[must_use]
    pub fn infection_rate(&self) -> f64 {
        ratio(
            self.recovered_count() + self.dead_count() + self.infectious_count(),
            self.starting_population(),
        )
    }

    /// Share of the workers of `kind` who are contagious right now.
    #[must_use]
    pub fn sick_rate(&self, kind: WorkplaceKind) -> f64 {
        let workers = self.count(|i| i.workplace_kind() == kind);
        let sick = self.count(|i| i.workplace_kind() == kind && i.is_contagious());
        ratio(sick, workers)
    }

    #[must_use]
    pub fn teacher_sick_rate(&self) -> f64 {
        self.sick_rate(WorkplaceKind::School)
    }

    #[must_use]
    pub fn hospital_worker_sick_rate(&self) -> f64 {
        self.sick_rate(WorkplaceKind::Hospital)
    }

    #[must_use]
    pub fn frontline_worker_sick_rate(&self) -> f64 {
        self.sick_rate(WorkplaceKind::Frontline)
    }
}

/// `numerator / max(1, denominator)`
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

fn generate_individuals(
    parameters: &Parameters,
    rng: &mut SimRng,
) -> Result<Vec<Individual>, SimError> {
    let condition = Bernoulli::new(parameters.preexisting_condition_rate)
        .map_err(|e| SimError::configuration(e.to_string()))?;
    let max_household = i32::try_from(parameters.population_size / 4)
        .map_err(|_| SimError::configuration("population_size too large"))?;

    let individuals = (0..parameters.population_size)
        .map(|id| {
            let household = VenueId(rng.random_range(0..=max_household));
            let workplace = VenueId(rng.random_range(0..=parameters.max_workplace_id));
            let shopping = (0..parameters.shopping_draws)
                .map(|_| VenueId(rng.random_range(0..=parameters.max_shopping_id)))
                .collect();
            let age = rng.random_range(0..=parameters.max_age);
            let sex_female = rng.random_bool(0.5);
            let preexisting_condition = condition.sample(rng);
            Individual::new(
                id,
                Demographics {
                    age,
                    sex_female,
                    preexisting_condition,
                    household,
                    workplace,
                    shopping,
                },
            )
        })
        .collect();
    Ok(individuals)
}
