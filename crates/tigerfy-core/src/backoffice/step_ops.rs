//! Step operations for the Backoffice.

use super::Backoffice;
use crate::{
    display::Steps,
    error::Result,
    models::{Step, StepDraft},
    params::{CreateStep, OfferRef, RenameStep, ReorderSteps, StepRef, UpdateStepSettings},
    session::Session,
};

impl Backoffice {
    /// Number the next step of the offer would receive.
    pub async fn next_step_number(&self, session: &Session, params: &OfferRef) -> Result<u32> {
        let offer_id = params.offer_id;
        self.with_owner(session, move |db, owner| {
            db.next_step_number(owner, offer_id)
        })
        .await
    }

    /// Appends a step to the offer.
    ///
    /// With `duplicate_from` the settings of that step (which must belong to
    /// the same offer) are copied. Settings that do not decode to a JSON
    /// object are rejected.
    pub async fn create_step(&self, session: &Session, params: CreateStep) -> Result<Step> {
        let offer_id = params.offer_id;
        let draft = StepDraft::try_from(params)?;
        self.with_owner(session, move |db, owner| {
            db.insert_step(owner, offer_id, &draft)
        })
        .await
    }

    pub async fn rename_step(&self, session: &Session, params: &RenameStep) -> Result<Step> {
        let params = params.clone();
        self.with_owner(session, move |db, owner| {
            db.rename_step(owner, params.offer_id, params.step_id, &params.name)
        })
        .await
    }

    /// Updates a step's name and/or settings; returns the step unchanged
    /// when neither is usable.
    pub async fn update_step_settings(
        &self,
        session: &Session,
        params: &UpdateStepSettings,
    ) -> Result<Step> {
        let params = params.clone();
        self.with_owner(session, move |db, owner| {
            db.update_step_settings(
                owner,
                params.offer_id,
                params.step_id,
                params.name.as_deref(),
                params.settings.as_ref(),
            )
        })
        .await
    }

    /// Deletes a step other than the first one and closes the gap.
    pub async fn delete_step(&self, session: &Session, params: &StepRef) -> Result<Step> {
        let (offer_id, step_id) = (params.offer_id, params.step_id);
        self.with_owner(session, move |db, owner| {
            db.delete_step(owner, offer_id, step_id)
        })
        .await
    }

    /// Applies a complete ordering of the offer's steps.
    pub async fn reorder_steps(&self, session: &Session, params: &ReorderSteps) -> Result<Steps> {
        let params = params.clone();
        self.with_owner(session, move |db, owner| {
            db.reorder_steps(owner, params.offer_id, &params.step_ids)
        })
        .await
        .map(Steps)
    }

    pub async fn list_steps(&self, session: &Session, params: &OfferRef) -> Result<Steps> {
        let offer_id = params.offer_id;
        self.with_owner(session, move |db, owner| db.list_steps(owner, offer_id))
            .await
            .map(Steps)
    }

    pub async fn get_step(&self, session: &Session, params: &StepRef) -> Result<Step> {
        let (offer_id, step_id) = (params.offer_id, params.step_id);
        self.with_owner(session, move |db, owner| {
            db.get_step(owner, offer_id, step_id)
        })
        .await
    }
}
