//! In-process step store.

use std::cmp::Ordering;

use jiff::Timestamp;

use super::{Direction, StepStore};
use crate::{
    error::{BackofficeError, Result},
    models::{NewStep, Step, StepPatch},
};

/// Vec-backed [`StepStore`] with the same uniqueness rule as the database.
#[derive(Debug, Default, Clone)]
pub struct MemoryStepStore {
    rows: Vec<Step>,
    next_id: u64,
}

impl MemoryStepStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across all offers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn number_taken(&self, offer_id: u64, step_no: u32, except: Option<u64>) -> bool {
        self.rows.iter().any(|row| {
            row.offer_id == offer_id && row.step_no == step_no && Some(row.id) != except
        })
    }

    fn position(&self, offer_id: u64, step_id: u64) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.id == step_id && row.offer_id == offer_id)
    }
}

fn sequence_order(a: &Step, b: &Step) -> Ordering {
    a.step_no
        .cmp(&b.step_no)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

impl StepStore for MemoryStepStore {
    fn insert(&mut self, step: &NewStep) -> Result<Step> {
        if self.number_taken(step.offer_id, step.step_no, None) {
            return Err(BackofficeError::DuplicateStepNumber {
                offer_id: step.offer_id,
                step_no: step.step_no,
            });
        }

        self.next_id += 1;
        let now = Timestamp::now();
        let row = Step {
            id: self.next_id,
            offer_id: step.offer_id,
            name: step.name.clone(),
            step_no: step.step_no,
            settings: step.settings.clone(),
            duplicated: step.duplicated,
            duplicated_from: step.duplicated_from,
            created_at: now,
            updated_at: now,
        };
        self.rows.push(row.clone());
        Ok(row)
    }

    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>> {
        let mut steps: Vec<Step> = self
            .rows
            .iter()
            .filter(|row| row.offer_id == offer_id)
            .cloned()
            .collect();
        steps.sort_by(sequence_order);
        if direction == Direction::Descending {
            steps.reverse();
        }
        if let Some(limit) = limit {
            steps.truncate(limit);
        }
        Ok(steps)
    }

    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>> {
        Ok(self
            .position(offer_id, step_id)
            .map(|index| self.rows[index].clone()))
    }

    fn update_by_id(
        &mut self,
        offer_id: u64,
        step_id: u64,
        patch: &StepPatch,
    ) -> Result<Option<Step>> {
        let Some(index) = self.position(offer_id, step_id) else {
            return Ok(None);
        };

        if let Some(step_no) = patch.step_no {
            if self.number_taken(offer_id, step_no, Some(step_id)) {
                return Err(BackofficeError::DuplicateStepNumber { offer_id, step_no });
            }
        }

        let row = &mut self.rows[index];
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(settings) = &patch.settings {
            row.settings = settings.clone();
        }
        if let Some(step_no) = patch.step_no {
            row.step_no = step_no;
        }
        row.updated_at = Timestamp::now();
        Ok(Some(row.clone()))
    }

    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool> {
        match self.position(offer_id, step_id) {
            Some(index) => {
                self.rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize> {
        let before = self.rows.len();
        self.rows
            .retain(|row| !(row.offer_id == offer_id && step_ids.contains(&row.id)));
        Ok(before - self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn new_step(offer_id: u64, step_no: u32) -> NewStep {
        NewStep {
            offer_id,
            name: Step::default_name(step_no),
            step_no,
            settings: json!({}),
            duplicated: false,
            duplicated_from: None,
        }
    }

    #[test]
    fn test_insert_rejects_taken_number_within_offer_only() {
        let mut store = MemoryStepStore::new();
        store.insert(&new_step(1, 1)).unwrap();

        let err = store.insert(&new_step(1, 1)).unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::DuplicateStepNumber {
                offer_id: 1,
                step_no: 1
            }
        ));

        // Same number in another offer is fine
        store.insert(&new_step(2, 1)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rows_are_scoped_to_their_offer() {
        let mut store = MemoryStepStore::new();
        let step = store.insert(&new_step(1, 1)).unwrap();

        assert!(store.select_one(2, step.id).unwrap().is_none());
        assert!(store
            .update_by_id(2, step.id, &StepPatch::renumber(5))
            .unwrap()
            .is_none());
        assert!(!store.delete_by_id(2, step.id).unwrap());
        assert_eq!(store.delete_by_ids(2, &[step.id]).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_ordered_directions_and_limit() {
        let mut store = MemoryStepStore::new();
        for step_no in [3, 1, 2] {
            store.insert(&new_step(1, step_no)).unwrap();
        }

        let ascending: Vec<u32> = store
            .select_ordered(1, Direction::Ascending, None)
            .unwrap()
            .iter()
            .map(|s| s.step_no)
            .collect();
        assert_eq!(ascending, vec![1, 2, 3]);

        let top = store.select_ordered(1, Direction::Descending, Some(1)).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].step_no, 3);
    }

    #[test]
    fn test_update_rejects_number_held_by_sibling() {
        let mut store = MemoryStepStore::new();
        let first = store.insert(&new_step(1, 1)).unwrap();
        store.insert(&new_step(1, 2)).unwrap();

        let err = store
            .update_by_id(1, first.id, &StepPatch::renumber(2))
            .unwrap_err();
        assert!(matches!(err, BackofficeError::DuplicateStepNumber { .. }));

        // Renumbering to its own number is not a collision
        assert!(store
            .update_by_id(1, first.id, &StepPatch::renumber(1))
            .unwrap()
            .is_some());
    }
}
