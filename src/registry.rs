//! Venue membership indices.
//!
//! The registry maps every household, workplace and shopping venue to the individuals who belong
//! to it. It is built once from the population's demographics and never changes afterwards.
//! Whether a member is actually *present* at a public venue on a given day is a separate question
//! answered by [`ContactRegistry::present_at_workplace`] and
//! [`ContactRegistry::present_at_shopping`]: dead and quarantined individuals stay members but are
//! absent. Households have no such filter.
use rustc_hash::FxHashMap;

use crate::individual::{Individual, VenueId};

#[derive(Clone, Debug, Default)]
pub struct ContactRegistry {
    households: FxHashMap<VenueId, Vec<usize>>,
    workplaces: FxHashMap<VenueId, Vec<usize>>,
    shopping: FxHashMap<VenueId, Vec<usize>>,
}

impl ContactRegistry {
    /// Indexes the population. Member lists are in ascending individual order.
    #[must_use]
    pub fn build(individuals: &[Individual]) -> ContactRegistry {
        let mut registry = ContactRegistry::default();
        for (index, individual) in individuals.iter().enumerate() {
            registry
                .households
                .entry(individual.household())
                .or_default()
                .push(index);
            if individual.workplace() != VenueId::NO_WORK {
                registry
                    .workplaces
                    .entry(individual.workplace())
                    .or_default()
                    .push(index);
            }
            for &venue in individual.shopping() {
                registry.shopping.entry(venue).or_default().push(index);
            }
        }
        registry
    }

    #[must_use]
    pub fn household_members(&self, household: VenueId) -> &[usize] {
        members(&self.households, household)
    }

    #[must_use]
    pub fn workplace_members(&self, workplace: VenueId) -> &[usize] {
        members(&self.workplaces, workplace)
    }

    #[must_use]
    pub fn shopping_members(&self, venue: VenueId) -> &[usize] {
        members(&self.shopping, venue)
    }

    #[must_use]
    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    #[must_use]
    pub fn workplace_count(&self) -> usize {
        self.workplaces.len()
    }

    #[must_use]
    pub fn shopping_venue_count(&self) -> usize {
        self.shopping.len()
    }

    /// Members of `workplace` who actually show up there today.
    pub fn present_at_workplace<'a>(
        &'a self,
        workplace: VenueId,
        individuals: &'a [Individual],
    ) -> impl Iterator<Item = usize> + 'a {
        self.workplace_members(workplace)
            .iter()
            .copied()
            .filter(move |&index| individuals[index].effective_workplace().is_some())
    }

    /// Members of shopping `venue` who actually visit it today.
    pub fn present_at_shopping<'a>(
        &'a self,
        venue: VenueId,
        individuals: &'a [Individual],
    ) -> impl Iterator<Item = usize> + 'a {
        self.shopping_members(venue)
            .iter()
            .copied()
            .filter(move |&index| individuals[index].effective_shopping().is_some())
    }
}

fn members(index: &FxHashMap<VenueId, Vec<usize>>, venue: VenueId) -> &[usize] {
    index.get(&venue).map_or(&[][..], Vec::as_slice)
}
