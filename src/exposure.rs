//! Daily interaction load.
//!
//! Every contagious individual adds a fixed weight to the load of each susceptible individual
//! they share a venue with. The work is proportional to the contagious individuals times the size
//! of their venues, never to the square of the population.
use crate::individual::Individual;
use crate::registry::ContactRegistry;

/// Load added to a susceptible co-worker. Quarantined individuals do not spread at work.
pub const WORKPLACE_WEIGHT: u64 = 10;
/// Load added to a susceptible household member, quarantined or not.
pub const HOUSEHOLD_WEIGHT: u64 = 40;
/// Load added per shared public venue (shopping venues plus the workplace id).
pub const SHOPPING_WEIGHT: u64 = 5;

/// Indices of the individuals who are contagious right now.
#[must_use]
pub fn contagious_set(individuals: &[Individual]) -> Vec<usize> {
    individuals
        .iter()
        .enumerate()
        .filter(|(_, individual)| individual.is_contagious())
        .map(|(index, _)| index)
        .collect()
}

/// Computes each individual's interaction load for one day from the given contagious snapshot.
///
/// Only susceptible individuals accumulate load; everyone else stays at zero.
#[must_use]
pub fn accumulate(
    individuals: &[Individual],
    registry: &ContactRegistry,
    contagious: &[usize],
) -> Vec<u64> {
    let mut loads = vec![0; individuals.len()];
    let mut add = |members: &[usize], weight: u64| {
        for &other in members {
            if individuals[other].is_susceptible() {
                loads[other] += weight;
            }
        }
    };

    for &index in contagious {
        let source = &individuals[index];

        // Work
        if !source.is_quarantined() {
            add(registry.workplace_members(source.workplace()), WORKPLACE_WEIGHT);
        }

        // Home
        add(registry.household_members(source.household()), HOUSEHOLD_WEIGHT);

        // Shopping
        for venue in source.public_venues() {
            add(registry.shopping_members(venue), SHOPPING_WEIGHT);
        }
    }

    loads
}
