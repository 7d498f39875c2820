// Owned store of period aggregates, one slot per configured period.
// A slot holding None means the period has not been loaded (yet).
use super::period::PeriodId;
use shared::models::PeriodAggregate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodRegistry {
    // Kept in configured order
    slots: Vec<(PeriodId, Option<PeriodAggregate>)>,
}

impl PeriodRegistry {
    pub fn new<I>(periods: I) -> Self
    where
        I: IntoIterator<Item = PeriodId>,
    {
        let mut registry = PeriodRegistry { slots: Vec::new() };
        for period in periods {
            if !registry.contains(&period) {
                registry.slots.push((period, None));
            }
        }
        registry
    }

    pub fn contains(&self, period: &PeriodId) -> bool {
        self.slots.iter().any(|(id, _)| id == period)
    }

    // Replaces the slot wholesale. Periods outside the configured set are appended at the end.
    pub fn insert(&mut self, period: PeriodId, aggregate: PeriodAggregate) {
        match self.slots.iter_mut().find(|(id, _)| *id == period) {
            Some((_, slot)) => *slot = Some(aggregate),
            None => self.slots.push((period, Some(aggregate))),
        }
    }

    pub fn get(&self, period: &PeriodId) -> Option<&PeriodAggregate> {
        self.slots
            .iter()
            .find(|(id, _)| id == period)
            .and_then(|(_, slot)| slot.as_ref())
    }

    pub fn periods(&self) -> impl Iterator<Item = &PeriodId> {
        self.slots.iter().map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeriodId, Option<&PeriodAggregate>)> {
        self.slots.iter().map(|(id, slot)| (id, slot.as_ref()))
    }

    // Empties every slot, keeping the configured periods.
    pub fn clear(&mut self) {
        for (_, slot) in &mut self.slots {
            *slot = None;
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|(_, slot)| slot.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
