//! Storage capability used by the step sequencer.
//!
//! A [`StepStore`] is the only thing the [`crate::sequencer::StepSequencer`]
//! knows about persistence. Every call is scoped to an offer, so a store
//! never hands out or touches a step of another offer through a step id
//! alone. Two backends ship with the crate:
//!
//! - [`SqliteStepStore`]: borrows a `rusqlite` connection or transaction
//! - [`MemoryStepStore`]: keeps rows in process, for tests and embedding
//!
//! Both enforce uniqueness of `(offer_id, step_no)` and report a violation
//! as [`crate::BackofficeError::DuplicateStepNumber`], which is the signal
//! the sequencer retries on.

use crate::{
    error::Result,
    models::{NewStep, Step, StepPatch},
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStepStore;
pub use sqlite::SqliteStepStore;

/// Sort direction on `(step_no, created_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Row operations over the steps of one offer.
pub trait StepStore {
    /// Insert a row and return it with its assigned id and timestamps.
    fn insert(&mut self, step: &NewStep) -> Result<Step>;

    /// Steps of an offer ordered by `step_no`, then `created_at`, then id.
    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>>;

    /// One step, if it exists under the offer.
    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// Returns `None` when the step does not exist under the offer.
    fn update_by_id(&mut self, offer_id: u64, step_id: u64, patch: &StepPatch)
        -> Result<Option<Step>>;

    /// Returns whether a row was removed.
    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool>;

    /// Returns how many rows were removed.
    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize>;
}

impl<S: StepStore + ?Sized> StepStore for &mut S {
    fn insert(&mut self, step: &NewStep) -> Result<Step> {
        (**self).insert(step)
    }

    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>> {
        (**self).select_ordered(offer_id, direction, limit)
    }

    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>> {
        (**self).select_one(offer_id, step_id)
    }

    fn update_by_id(
        &mut self,
        offer_id: u64,
        step_id: u64,
        patch: &StepPatch,
    ) -> Result<Option<Step>> {
        (**self).update_by_id(offer_id, step_id, patch)
    }

    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool> {
        (**self).delete_by_id(offer_id, step_id)
    }

    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize> {
        (**self).delete_by_ids(offer_id, step_ids)
    }
}
