//! One person of the simulated city.
//!
//! Demographics are fixed at creation. Health and vaccine state only change through the
//! operations on [`Individual`], which are idempotent: infecting, vaccinating, recovering or
//! killing an individual a second time (or a dead one) leaves them untouched and returns `false`.
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use log::trace;
use serde::{Deserialize, Serialize};

/// Identifies a household, workplace or shopping venue.
///
/// Workplace and shopping ids share one id space: a workplace with id 3 and the shopping venue
/// with id 3 are the same place when exposure is counted at shopping venues.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueId(pub i32);

impl VenueId {
    pub const SCHOOL: VenueId = VenueId(0);
    pub const HOSPITAL: VenueId = VenueId(1);
    pub const FRONTLINE: VenueId = VenueId(2);
    /// Workplace of individuals who do not work.
    pub const NO_WORK: VenueId = VenueId(-1);
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkplaceKind {
    School,
    Hospital,
    Frontline,
    Ordinary,
    NoWork,
}

impl From<VenueId> for WorkplaceKind {
    fn from(workplace: VenueId) -> Self {
        match workplace {
            VenueId::SCHOOL => WorkplaceKind::School,
            VenueId::HOSPITAL => WorkplaceKind::Hospital,
            VenueId::FRONTLINE => WorkplaceKind::Frontline,
            VenueId::NO_WORK => WorkplaceKind::NoWork,
            _ => WorkplaceKind::Ordinary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u8,
    pub sex_female: bool,
    pub preexisting_condition: bool,
    pub household: VenueId,
    pub workplace: VenueId,
    pub shopping: BTreeSet<VenueId>,
}

/// The inputs an external scoring model sees for one individual: age, teacher, frontline
/// worker, hospital worker, pre-existing condition, number of shopping venues.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureVector(pub [f64; 6]);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    id: usize,
    demographics: Demographics,

    onset: Option<NaiveDate>,
    /// Date of recovery or death.
    resolution: Option<NaiveDate>,
    immunity: f64,
    severity: u8,
    visible_symptoms: bool,
    quarantined: bool,
    alive: bool,
    initially_sick: bool,

    score: f64,
    vaccinated: bool,
    vaccination_date: Option<NaiveDate>,
    wasted_dose: bool,
}

impl Individual {
    /// Creates a healthy, unscored individual.
    #[must_use]
    pub fn new(id: usize, demographics: Demographics) -> Individual {
        Individual {
            id,
            demographics,
            onset: None,
            resolution: None,
            immunity: 0.0,
            severity: 0,
            visible_symptoms: false,
            quarantined: false,
            alive: true,
            initially_sick: false,
            score: -1.0,
            vaccinated: false,
            vaccination_date: None,
            wasted_dose: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.demographics.age
    }

    #[must_use]
    pub fn household(&self) -> VenueId {
        self.demographics.household
    }

    #[must_use]
    pub fn workplace(&self) -> VenueId {
        self.demographics.workplace
    }

    #[must_use]
    pub fn workplace_kind(&self) -> WorkplaceKind {
        self.demographics.workplace.into()
    }

    #[must_use]
    pub fn shopping(&self) -> &BTreeSet<VenueId> {
        &self.demographics.shopping
    }

    #[must_use]
    pub fn onset(&self) -> Option<NaiveDate> {
        self.onset
    }

    #[must_use]
    pub fn resolution(&self) -> Option<NaiveDate> {
        self.resolution
    }

    #[must_use]
    pub fn immunity(&self) -> f64 {
        self.immunity
    }

    #[must_use]
    pub fn severity(&self) -> u8 {
        self.severity
    }

    #[must_use]
    pub fn has_visible_symptoms(&self) -> bool {
        self.visible_symptoms
    }

    #[must_use]
    pub fn is_quarantined(&self) -> bool {
        self.quarantined
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn is_initially_sick(&self) -> bool {
        self.initially_sick
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    #[must_use]
    pub fn vaccination_date(&self) -> Option<NaiveDate> {
        self.vaccination_date
    }

    #[must_use]
    pub fn has_wasted_dose(&self) -> bool {
        self.wasted_dose
    }

    /// Alive, infected and not yet resolved.
    #[must_use]
    pub fn is_contagious(&self) -> bool {
        self.alive && self.onset.is_some() && self.resolution.is_none()
    }

    /// Alive and never infected.
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.alive && self.onset.is_none()
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        self.alive && self.resolution.is_some()
    }

    #[must_use]
    pub fn was_infected(&self) -> bool {
        self.onset.is_some()
    }

    /// The workplace this individual actually shows up at today, if any.
    #[must_use]
    pub fn effective_workplace(&self) -> Option<VenueId> {
        if !self.alive || self.quarantined || self.demographics.workplace == VenueId::NO_WORK {
            None
        } else {
            Some(self.demographics.workplace)
        }
    }

    /// The shopping venues this individual actually visits today.
    #[must_use]
    pub fn effective_shopping(&self) -> Option<&BTreeSet<VenueId>> {
        if !self.alive || self.quarantined {
            None
        } else {
            Some(&self.demographics.shopping)
        }
    }

    /// Every public venue (shopping venues plus workplace) this individual is present at today.
    #[must_use]
    pub fn public_venues(&self) -> BTreeSet<VenueId> {
        let mut venues: BTreeSet<VenueId> =
            self.effective_shopping().cloned().unwrap_or_default();
        venues.extend(self.effective_workplace());
        venues
    }

    /// Sets the onset date. Returns `false` if the individual was already infected or is dead.
    pub fn infect(&mut self, date: NaiveDate) -> bool {
        if self.onset.is_some() || !self.alive {
            trace!("Individual {} cannot be infected again", self.id);
            return false;
        }
        trace!("Individual {} infected on {date}", self.id);
        self.onset = Some(date);
        true
    }

    /// Infects a member of the seed cohort.
    pub(crate) fn seed_infection(&mut self, onset: NaiveDate) -> bool {
        let infected = self.infect(onset);
        if infected {
            self.initially_sick = true;
        }
        infected
    }

    /// Resolves an acute infection by recovery.
    pub fn recover(&mut self, date: NaiveDate) -> bool {
        if !self.is_contagious() {
            return false;
        }
        trace!("Individual {} recovered on {date}", self.id);
        self.resolution = Some(date);
        self.raise_immunity(1.0);
        self.quarantined = false;
        self.visible_symptoms = false;
        self.severity = 0;
        true
    }

    /// Resolves an acute infection by death.
    pub fn kill(&mut self, date: NaiveDate) -> bool {
        if !self.is_contagious() {
            return false;
        }
        trace!("Individual {} died on {date}", self.id);
        self.alive = false;
        self.resolution = Some(date);
        true
    }

    /// Administers the single dose this individual can receive. A dose given while contagious
    /// still raises immunity but is counted as wasted.
    pub fn vaccinate(&mut self, date: NaiveDate) -> bool {
        if self.vaccinated || !self.alive {
            return false;
        }
        self.vaccinated = true;
        self.vaccination_date = Some(date);
        self.raise_immunity(1.0);
        if self.is_contagious() {
            self.wasted_dose = true;
        }
        true
    }

    fn raise_immunity(&mut self, level: f64) {
        self.immunity = self.immunity.max(level.clamp(0.0, 1.0));
    }

    pub(crate) fn set_visible_symptoms(&mut self, visible: bool) {
        self.visible_symptoms = visible;
    }

    /// Moves to a more severe stage; never moves backwards.
    pub(crate) fn worsen_to(&mut self, stage: u8) {
        self.severity = self.severity.max(stage.min(3));
    }

    pub(crate) fn quarantine(&mut self) {
        self.quarantined = true;
    }

    pub(crate) fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        let kind = self.workplace_kind();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        #[allow(clippy::cast_precision_loss)]
        let venue_count = self.demographics.shopping.len() as f64;
        FeatureVector([
            f64::from(self.demographics.age),
            flag(kind == WorkplaceKind::School),
            flag(kind == WorkplaceKind::Frontline),
            flag(kind == WorkplaceKind::Hospital),
            flag(self.demographics.preexisting_condition),
            venue_count,
        ])
    }

    /// Training target for an external scoring model once a run is over: 0 for the seed cohort
    /// (ignored), 2 for death, 1 for any infection, -1 for never infected.
    #[must_use]
    pub fn outcome_label(&self) -> f64 {
        if self.initially_sick {
            0.0
        } else if !self.alive {
            2.0
        } else if self.was_infected() {
            1.0
        } else {
            -1.0
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    pub(crate) fn demographics(household: i32, workplace: i32, shopping: &[i32]) -> Demographics {
        Demographics {
            age: 40,
            sex_female: true,
            preexisting_condition: false,
            household: VenueId(household),
            workplace: VenueId(workplace),
            shopping: shopping.iter().map(|&id| VenueId(id)).collect(),
        }
    }

    #[test]
    fn starts_susceptible_and_unscored() {
        let individual = Individual::new(0, demographics(0, 5, &[1]));
        assert!(individual.is_susceptible());
        assert!(!individual.is_contagious());
        assert_eq!(individual.score(), -1.0);
        assert_eq!(individual.immunity(), 0.0);
    }

    #[test]
    fn infect_is_idempotent() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        assert!(individual.infect(date(1)));
        let once = individual.clone();
        assert!(!individual.infect(date(2)));
        assert_eq!(individual, once);
        assert_eq!(individual.onset(), Some(date(1)));
        assert!(individual.is_contagious());
    }

    #[test]
    fn vaccinate_is_idempotent() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        assert!(individual.vaccinate(date(1)));
        let once = individual.clone();
        assert!(!individual.vaccinate(date(2)));
        assert_eq!(individual, once);
        assert_eq!(individual.immunity(), 1.0);
        assert!(!individual.has_wasted_dose());
    }

    #[test]
    fn vaccinating_contagious_wastes_dose() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        individual.infect(date(1));
        assert!(individual.vaccinate(date(3)));
        assert!(individual.has_wasted_dose());
    }

    #[test]
    fn dead_cannot_be_infected_vaccinated_or_recovered() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        individual.infect(date(1));
        assert!(individual.kill(date(5)));
        let dead = individual.clone();
        assert!(!individual.vaccinate(date(6)));
        assert!(!individual.recover(date(6)));
        assert!(!individual.kill(date(7)));
        assert!(!individual.infect(date(7)));
        assert_eq!(individual, dead);
        assert_eq!(individual.resolution(), Some(date(5)));
    }

    #[test]
    fn recovery_clears_quarantine_and_grants_immunity() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        individual.infect(date(1));
        individual.worsen_to(2);
        individual.quarantine();
        assert!(individual.recover(date(20)));
        assert!(individual.is_recovered());
        assert!(!individual.is_quarantined());
        assert_eq!(individual.immunity(), 1.0);
        assert!(!individual.recover(date(21)));
    }

    #[test]
    fn severity_never_regresses_while_acute() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1]));
        individual.worsen_to(2);
        individual.worsen_to(1);
        assert_eq!(individual.severity(), 2);
        individual.worsen_to(9);
        assert_eq!(individual.severity(), 3);
    }

    #[test]
    fn quarantine_hides_public_venues() {
        let mut individual = Individual::new(0, demographics(0, 5, &[1, 2]));
        assert_eq!(
            individual.public_venues(),
            [VenueId(1), VenueId(2), VenueId(5)].into_iter().collect()
        );
        individual.quarantine();
        assert_eq!(individual.effective_workplace(), None);
        assert!(individual.public_venues().is_empty());
    }

    #[test]
    fn no_work_is_never_a_venue() {
        let individual = Individual::new(0, demographics(0, -1, &[4]));
        assert_eq!(individual.workplace_kind(), WorkplaceKind::NoWork);
        assert_eq!(individual.effective_workplace(), None);
        assert_eq!(individual.public_venues(), [VenueId(4)].into_iter().collect());
    }

    #[test]
    fn features_and_labels() {
        let mut teacher = Individual::new(0, demographics(0, 0, &[3, 4, 5]));
        assert_eq!(teacher.features(), FeatureVector([40.0, 1.0, 0.0, 0.0, 0.0, 3.0]));
        assert_eq!(teacher.outcome_label(), -1.0);
        teacher.infect(date(2));
        assert_eq!(teacher.outcome_label(), 1.0);
        teacher.kill(date(30));
        assert_eq!(teacher.outcome_label(), 2.0);

        let mut seeded = Individual::new(1, demographics(0, 1, &[]));
        assert!(seeded.seed_infection(date(1)));
        assert!(seeded.is_initially_sick());
        assert_eq!(seeded.outcome_label(), 0.0);
        assert_eq!(seeded.workplace_kind(), WorkplaceKind::Hospital);
    }
}
