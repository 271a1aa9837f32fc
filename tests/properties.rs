use chrono::NaiveDate;
use vaxsim::exposure::{accumulate, contagious_set};
use vaxsim::{InitialInfections, Individual, Parameters, Population, ScoringPolicy};

fn epidemic(seed: u64) -> Population {
    let parameters = Parameters {
        population_size: 800,
        initial_infections: InitialInfections::Count(80),
        interaction_hazard: 0.002,
        wave_interval_days: 5,
        seed,
        ..Parameters::default()
    };
    let mut population = Population::new(parameters).unwrap();
    population
        .assign_scores(&mut ScoringPolicy::RandomPriority)
        .unwrap();
    population
}

#[derive(PartialEq, Debug)]
struct Resolved {
    onset: Option<NaiveDate>,
    resolution: Option<NaiveDate>,
    severity: u8,
    alive: bool,
}

fn resolved(individual: &Individual) -> Option<Resolved> {
    (!individual.is_alive() || individual.resolution().is_some()).then(|| Resolved {
        onset: individual.onset(),
        resolution: individual.resolution(),
        severity: individual.severity(),
        alive: individual.is_alive(),
    })
}

fn immunities(population: &Population) -> Vec<f64> {
    population
        .individuals()
        .iter()
        .map(Individual::immunity)
        .collect()
}

#[test]
fn immunity_never_decreases() {
    let mut population = epidemic(1);
    let mut previous = immunities(&population);
    for _ in 0..60 {
        population.run_timestep();
        for (individual, before) in population.individuals().iter().zip(&previous) {
            assert!(individual.immunity() >= *before);
        }
        previous = immunities(&population);
    }
}

#[test]
fn resolved_individuals_never_change() {
    let mut population = epidemic(2);
    let mut absorbed: Vec<Option<Resolved>> =
        population.individuals().iter().map(resolved).collect();
    for _ in 0..60 {
        population.run_timestep();
        for (individual, state) in population.individuals().iter().zip(absorbed.iter_mut()) {
            let now = resolved(individual);
            if state.is_some() {
                assert_eq!(now.as_ref(), state.as_ref());
            } else {
                *state = now;
            }
        }
    }
    assert!(absorbed.iter().any(Option::is_some));
}

#[test]
fn waves_respect_quota() {
    let mut population = epidemic(3);
    let quota = population.allocator().quota();
    assert_eq!(quota, 80);
    let reports = population.run_days(60);
    let mut waves = 0;
    for report in &reports {
        assert!(report.doses_given <= quota);
        if population.allocator().is_wave_date(report.date) {
            waves += 1;
        } else {
            assert_eq!(report.doses_given, 0);
        }
    }
    assert_eq!(waves, 10);
    assert!(population.vaccinated_count() <= population.allocator().total_supply());
}

#[test]
fn loads_only_fall_on_the_susceptible() {
    let mut population = epidemic(4);
    for _ in 0..20 {
        let individuals = population.individuals();
        let loads = accumulate(individuals, population.registry(), &contagious_set(individuals));
        assert_eq!(loads.len(), individuals.len());
        for (individual, load) in individuals.iter().zip(&loads) {
            if !individual.is_susceptible() {
                assert_eq!(*load, 0);
            }
        }
        population.run_timestep();
    }
}

#[test]
fn infect_and_vaccinate_are_idempotent() {
    let population = epidemic(5);
    let mut individual = population
        .individuals()
        .iter()
        .find(|i| i.is_susceptible())
        .unwrap()
        .clone();
    let date = population.current_date();

    assert!(individual.infect(date));
    let once = individual.clone();
    assert!(!individual.infect(date));
    assert_eq!(individual, once);

    assert!(individual.vaccinate(date));
    let once = individual.clone();
    assert!(!individual.vaccinate(date));
    assert_eq!(individual, once);
    assert!(individual.has_wasted_dose());
}
