//! A day-by-day epidemic simulation for comparing vaccine prioritization policies.
//!
//! The central object of a vaxsim run is the [`Population`]: a synthetic city of individuals
//! who share households, workplaces and shopping venues. Each call to
//! [`Population::run_timestep`] simulates one day:
//! * Contagious individuals add interaction load to the susceptible people they share a venue
//!   with.
//! * On vaccination wave dates, the [`VaccineAllocator`](vaccine::VaccineAllocator) hands out a
//!   fixed quota of doses in the order set by a [`VaccineScoringStrategy`].
//! * Every susceptible individual draws for infection, and every infected individual moves
//!   through the stages of the disease until they recover or die.
//!
//! Runs are deterministic given a seed. To compare policies, build one snapshot population and
//! hand it to [`run_trials`], which runs every policy on its own copy:
//!
//! ```no_run
//! use vaxsim::{run_trials, InitialInfections, Population, ScoringPolicy};
//!
//! let snapshot = Population::construct(5000, InitialInfections::Fraction(0.05), 42).unwrap();
//! let outcomes = run_trials(
//!     &snapshot,
//!     vec![ScoringPolicy::NoVaccine, ScoringPolicy::RandomPriority],
//!     180,
//! )
//! .unwrap();
//! for outcome in &outcomes {
//!     let last = outcome.final_summary().unwrap();
//!     println!("{}: {} dead", outcome.policy, last.dead);
//! }
//! ```
pub mod error;
pub mod exposure;
pub mod health;
pub mod individual;
pub mod log;
pub mod parameters;
pub mod population;
pub mod random;
pub mod registry;
pub mod scheduler;
pub mod summary;
pub mod transmission;
pub mod trial;
pub mod vaccine;

pub use error::SimError;
pub use individual::{Demographics, FeatureVector, Individual, VenueId, WorkplaceKind};
pub use parameters::{load_parameters_from_json, InitialInfections, Parameters, ParametersBuilder};
pub use population::Population;
pub use scheduler::TimestepReport;
pub use summary::DaySummary;
pub use trial::{run_trial, run_trials, TrialOutcome};
pub use vaccine::{ScoreModel, ScoringPolicy, VaccineScoringStrategy};
