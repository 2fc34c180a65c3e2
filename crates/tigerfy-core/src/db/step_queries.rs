//! Step operations, run through the sequencer inside a transaction.

use jiff::Timestamp;
use rusqlite::{params, TransactionBehavior};

use super::offer_queries::{authorize_offer, TOUCH_OFFER_SQL};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{SettingsInput, Step, StepDraft},
    sequencer::StepSequencer,
    store::SqliteStepStore,
};

impl super::Database {
    /// Runs `op` against the offer's steps in one immediate transaction,
    /// after checking that the owner owns the offer. Bumps the offer's
    /// `updated_at` when `touch` is set.
    fn with_step_sequencer<T, F>(
        &mut self,
        owner: &str,
        offer_id: u64,
        touch: bool,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut StepSequencer<SqliteStepStore<'_>>) -> Result<T>,
    {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        authorize_offer(&tx, owner, offer_id)?;

        let value = {
            let mut sequencer = StepSequencer::new(SqliteStepStore::new(&tx));
            op(&mut sequencer)?
        };

        if touch {
            tx.execute(
                TOUCH_OFFER_SQL,
                params![Timestamp::now().to_string(), offer_id as i64],
            )
            .db_context("Failed to update offer timestamp")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(value)
    }

    /// Number the next inserted step of the offer would get.
    pub fn next_step_number(&mut self, owner: &str, offer_id: u64) -> Result<u32> {
        self.with_step_sequencer(owner, offer_id, false, |seq| {
            seq.next_sequence_number(offer_id)
        })
    }

    /// Appends a step, copying another step's settings when the draft names
    /// a duplicate source.
    pub fn insert_step(&mut self, owner: &str, offer_id: u64, draft: &StepDraft) -> Result<Step> {
        self.with_step_sequencer(owner, offer_id, true, |seq| {
            seq.insert_step(offer_id, draft)
        })
    }

    pub fn rename_step(
        &mut self,
        owner: &str,
        offer_id: u64,
        step_id: u64,
        name: &str,
    ) -> Result<Step> {
        self.with_step_sequencer(owner, offer_id, true, |seq| {
            seq.rename_step(offer_id, step_id, name)
        })
    }

    /// Updates name and/or settings. Nothing is written, the offer included,
    /// when neither carries a usable value.
    pub fn update_step_settings(
        &mut self,
        owner: &str,
        offer_id: u64,
        step_id: u64,
        name: Option<&str>,
        settings: Option<&SettingsInput>,
    ) -> Result<Step> {
        let has_changes = name.is_some_and(|n| !n.trim().is_empty())
            || settings.and_then(SettingsInput::decode).is_some();
        self.with_step_sequencer(owner, offer_id, has_changes, |seq| {
            seq.update_step_settings(offer_id, step_id, name, settings)
        })
    }

    /// Deletes a step and renumbers the remaining ones.
    ///
    /// Returns the step as it was before deletion.
    pub fn delete_step(&mut self, owner: &str, offer_id: u64, step_id: u64) -> Result<Step> {
        self.with_step_sequencer(owner, offer_id, true, |seq| {
            let step = seq.find_step(offer_id, step_id)?;
            seq.delete_step(offer_id, step_id)?;
            Ok(step)
        })
    }

    /// Applies a complete ordering and returns the steps in their new order.
    pub fn reorder_steps(
        &mut self,
        owner: &str,
        offer_id: u64,
        ordered_step_ids: &[u64],
    ) -> Result<Vec<Step>> {
        self.with_step_sequencer(owner, offer_id, true, |seq| {
            seq.reorder_steps(offer_id, ordered_step_ids)?;
            seq.list_steps(offer_id)
        })
    }

    pub fn list_steps(&mut self, owner: &str, offer_id: u64) -> Result<Vec<Step>> {
        self.with_step_sequencer(owner, offer_id, false, |seq| seq.list_steps(offer_id))
    }

    pub fn get_step(&mut self, owner: &str, offer_id: u64, step_id: u64) -> Result<Step> {
        self.with_step_sequencer(owner, offer_id, false, |seq| {
            seq.find_step(offer_id, step_id)
        })
    }

    /// Returns the first step of the offer, creating "Step 1" when there is
    /// none.
    pub fn ensure_first_step(&mut self, owner: &str, offer_id: u64) -> Result<Step> {
        self.with_step_sequencer(owner, offer_id, true, |seq| {
            seq.ensure_first_step(offer_id)
        })
    }
}
