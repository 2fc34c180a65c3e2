//! Step numbering for an offer's funnel.
//!
//! [`StepSequencer`] owns every rule about `step_no`: which number a new step
//! gets, what happens when two writers pick the same number, how the
//! remaining steps close the gap left by a deletion and how a caller-supplied
//! ordering is applied. It holds no state besides the [`StepStore`] it runs
//! against, so the same logic drives the SQLite database and the in-memory
//! store used by tests.
//!
//! Callers are expected to have checked that the offer belongs to the
//! requesting owner; the sequencer only guarantees that a step id is never
//! resolved outside the offer it is given.
//!
//! ```rust
//! use tigerfy_core::{models::StepDraft, sequencer::StepSequencer, store::MemoryStepStore};
//!
//! let mut sequencer = StepSequencer::new(MemoryStepStore::new());
//! let first = sequencer.insert_step(1, &StepDraft::default())?;
//! assert_eq!(first.name, "Step 1");
//! assert_eq!(sequencer.next_sequence_number(1)?, 2);
//! # Ok::<(), tigerfy_core::BackofficeError>(())
//! ```

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::{
    error::{BackofficeError, Result},
    models::{requests::non_blank, NewStep, SettingsInput, Step, StepDraft, StepPatch},
    store::{Direction, StepStore},
};

/// Numbering rules over a [`StepStore`].
#[derive(Debug)]
pub struct StepSequencer<S> {
    store: S,
}

impl<S: StepStore> StepSequencer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Highest `step_no` of the offer plus one, or 1 for an empty offer.
    pub fn next_sequence_number(&self, offer_id: u64) -> Result<u32> {
        let last = self
            .store
            .select_ordered(offer_id, Direction::Descending, Some(1))?;
        Ok(last
            .first()
            .map(|step| step.step_no.saturating_add(1))
            .unwrap_or(1))
    }

    /// Append a step at the next free number.
    ///
    /// With a duplicate source the source's settings are copied verbatim and
    /// any settings on the draft are ignored. A number collision is retried
    /// once with a freshly computed number; a second collision is reported
    /// as [`BackofficeError::Conflict`].
    pub fn insert_step(&mut self, offer_id: u64, draft: &StepDraft) -> Result<Step> {
        let (settings, duplicated_from) = match draft.duplicate_source_id {
            Some(source_id) => (self.find_step(offer_id, source_id)?.settings, Some(source_id)),
            None => (draft.settings.clone().unwrap_or_else(|| json!({})), None),
        };
        let name = non_blank(draft.name.as_deref());

        let step_no = self.next_sequence_number(offer_id)?;
        let first_attempt = self.store.insert(&new_step(
            offer_id,
            step_no,
            name.as_deref(),
            &settings,
            duplicated_from,
        ));

        match first_attempt {
            Err(BackofficeError::DuplicateStepNumber { .. }) => {
                let retry_no = self.next_sequence_number(offer_id)?;
                warn!(
                    "Step number {step_no} of offer {offer_id} was taken concurrently, retrying with {retry_no}"
                );
                self.store
                    .insert(&new_step(
                        offer_id,
                        retry_no,
                        name.as_deref(),
                        &settings,
                        duplicated_from,
                    ))
                    .map_err(|e| match e {
                        BackofficeError::DuplicateStepNumber { offer_id, step_no } => {
                            BackofficeError::Conflict { offer_id, step_no }
                        }
                        other => other,
                    })
            }
            other => other,
        }
    }

    /// Replace the name of a step. Blank names are rejected.
    pub fn rename_step(&mut self, offer_id: u64, step_id: u64, name: &str) -> Result<Step> {
        let name = non_blank(Some(name)).ok_or_else(|| {
            BackofficeError::invalid_input("name").with_reason("Step name must not be blank")
        })?;

        let patch = StepPatch {
            name: Some(name),
            ..Default::default()
        };
        self.store
            .update_by_id(offer_id, step_id, &patch)?
            .ok_or(BackofficeError::StepNotFound { id: step_id })
    }

    /// Update name and/or settings of a step.
    ///
    /// Blank names and settings that do not decode to a JSON object are
    /// treated as absent. When nothing usable remains the stored step is
    /// returned without issuing a write.
    pub fn update_step_settings(
        &mut self,
        offer_id: u64,
        step_id: u64,
        name: Option<&str>,
        settings: Option<&SettingsInput>,
    ) -> Result<Step> {
        let patch = StepPatch {
            name: non_blank(name),
            settings: settings.and_then(SettingsInput::decode),
            step_no: None,
        };

        if patch.is_empty() {
            return self.find_step(offer_id, step_id);
        }

        self.store
            .update_by_id(offer_id, step_id, &patch)?
            .ok_or(BackofficeError::StepNotFound { id: step_id })
    }

    /// Delete a step and renumber the rest to `1..N`.
    ///
    /// The step currently numbered 1 cannot be deleted.
    pub fn delete_step(&mut self, offer_id: u64, step_id: u64) -> Result<()> {
        let step = self.find_step(offer_id, step_id)?;
        if step.is_first() {
            return Err(BackofficeError::ProtectedStep { id: step_id });
        }

        if !self.store.delete_by_id(offer_id, step_id)? {
            return Err(BackofficeError::StepNotFound { id: step_id });
        }

        self.renumber(offer_id)
    }

    /// Assign `step_no = index + 1` following `ordered_step_ids`.
    ///
    /// The list must name every step of the offer exactly once.
    pub fn reorder_steps(&mut self, offer_id: u64, ordered_step_ids: &[u64]) -> Result<()> {
        if ordered_step_ids.is_empty() {
            return Err(BackofficeError::invalid_input("step_ids")
                .with_reason("At least one step ID is required"));
        }

        let mut seen = HashSet::with_capacity(ordered_step_ids.len());
        if let Some(repeated) = ordered_step_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(BackofficeError::invalid_input("step_ids")
                .with_reason(format!("Step ID {repeated} is listed more than once")));
        }

        let current = self.list_steps(offer_id)?;
        let known: HashSet<u64> = current.iter().map(|step| step.id).collect();
        if let Some(unknown) = ordered_step_ids.iter().find(|id| !known.contains(id)) {
            return Err(BackofficeError::StepNotFound { id: *unknown });
        }
        if ordered_step_ids.len() != current.len() {
            return Err(BackofficeError::invalid_input("step_ids").with_reason(format!(
                "Expected all {} steps of the offer, got {}",
                current.len(),
                ordered_step_ids.len()
            )));
        }

        let already_ordered = current
            .iter()
            .zip(ordered_step_ids)
            .enumerate()
            .all(|(index, (step, id))| step.id == *id && step.step_no == index as u32 + 1);
        if already_ordered {
            return Ok(());
        }

        // Park every step above the current maximum so no target number is
        // held by a step that has not moved yet.
        let ceiling = current.iter().map(|step| step.step_no).max().unwrap_or(0);
        for (index, &step_id) in ordered_step_ids.iter().enumerate() {
            self.move_step(offer_id, step_id, ceiling + index as u32 + 1)?;
        }
        for (index, &step_id) in ordered_step_ids.iter().enumerate() {
            self.move_step(offer_id, step_id, index as u32 + 1)?;
        }

        debug!(
            "Reordered {} steps of offer {offer_id}",
            ordered_step_ids.len()
        );
        Ok(())
    }

    /// Steps of the offer ascending by `step_no`, then creation time.
    pub fn list_steps(&self, offer_id: u64) -> Result<Vec<Step>> {
        self.store
            .select_ordered(offer_id, Direction::Ascending, None)
    }

    /// One step of the offer, or [`BackofficeError::StepNotFound`].
    pub fn find_step(&self, offer_id: u64, step_id: u64) -> Result<Step> {
        self.store
            .select_one(offer_id, step_id)?
            .ok_or(BackofficeError::StepNotFound { id: step_id })
    }

    /// The step with the lowest number, created as "Step 1" when the offer
    /// has none.
    pub fn ensure_first_step(&mut self, offer_id: u64) -> Result<Step> {
        let first = self
            .store
            .select_ordered(offer_id, Direction::Ascending, Some(1))?;
        match first.into_iter().next() {
            Some(step) => Ok(step),
            None => self.insert_step(offer_id, &StepDraft::default()),
        }
    }

    /// Remove every step of the offer, first step included.
    pub fn clear_steps(&mut self, offer_id: u64) -> Result<usize> {
        let ids: Vec<u64> = self.list_steps(offer_id)?.iter().map(|s| s.id).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.delete_by_ids(offer_id, &ids)
    }

    fn renumber(&mut self, offer_id: u64) -> Result<()> {
        // Ascending order only ever moves a step down into a slot already
        // vacated by its predecessors.
        let remaining = self.list_steps(offer_id)?;
        for (index, step) in remaining.iter().enumerate() {
            let target = index as u32 + 1;
            if step.step_no != target {
                debug!(
                    "Renumbering step {} of offer {offer_id}: {} -> {target}",
                    step.id, step.step_no
                );
                self.move_step(offer_id, step.id, target)?;
            }
        }
        Ok(())
    }

    fn move_step(&mut self, offer_id: u64, step_id: u64, step_no: u32) -> Result<()> {
        self.store
            .update_by_id(offer_id, step_id, &StepPatch::renumber(step_no))?
            .ok_or(BackofficeError::StepNotFound { id: step_id })?;
        Ok(())
    }
}

fn new_step(
    offer_id: u64,
    step_no: u32,
    name: Option<&str>,
    settings: &Value,
    duplicated_from: Option<u64>,
) -> NewStep {
    NewStep {
        offer_id,
        name: name
            .map(String::from)
            .unwrap_or_else(|| Step::default_name(step_no)),
        step_no,
        settings: settings.clone(),
        duplicated: duplicated_from.is_some(),
        duplicated_from,
    }
}

#[cfg(test)]
mod tests;
