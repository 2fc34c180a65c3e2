//! Offer operations for the Backoffice.

use super::Backoffice;
use crate::{
    display::Offers,
    error::{BackofficeError, Result},
    models::{NewOffer, Offer, Step, StepSelector},
    params::{CreateOffer, DeleteOffer, OfferRef, ResolveCurrentStep, SaveBotToken, SetCurrentStep},
    session::Session,
};

impl Backoffice {
    /// Creates an offer for the session's owner.
    ///
    /// The offer starts `incomplete` and without steps; use
    /// [`Backoffice::ensure_first_step`] or [`Backoffice::create_step`] to
    /// add them.
    pub async fn create_offer(&self, session: &Session, params: &CreateOffer) -> Result<Offer> {
        let offer = NewOffer::try_from(params.clone())?;
        self.with_owner(session, move |db, owner| db.create_offer(owner, &offer))
            .await
    }

    /// Lists the owner's offers, newest first.
    pub async fn list_offers(&self, session: &Session) -> Result<Offers> {
        self.with_owner(session, |db, owner| db.list_offers(owner))
            .await
            .map(Offers)
    }

    /// Fetches one offer with its steps.
    pub async fn get_offer(&self, session: &Session, params: &OfferRef) -> Result<Offer> {
        let offer_id = params.offer_id;
        self.with_owner(session, move |db, owner| db.get_offer(owner, offer_id))
            .await
    }

    /// Saves or clears the Telegram bot credentials, updating the status.
    pub async fn save_bot_token(&self, session: &Session, params: &SaveBotToken) -> Result<Offer> {
        let params = params.clone();
        self.with_owner(session, move |db, owner| {
            db.save_bot_token(
                owner,
                params.offer_id,
                params.bot_token.as_deref(),
                params.telegram_username.as_deref(),
            )
        })
        .await
    }

    /// Permanently deletes an offer with all of its steps.
    ///
    /// Requires `confirmed`; returns the offer as it was.
    pub async fn delete_offer(&self, session: &Session, params: &DeleteOffer) -> Result<Offer> {
        if !params.confirmed {
            return Err(BackofficeError::invalid_input("confirmed").with_reason(
                "Offer deletion requires explicit confirmation. Set 'confirmed' to true to delete the offer and all of its steps.",
            ));
        }

        let offer_id = params.offer_id;
        self.with_owner(session, move |db, owner| db.delete_offer(owner, offer_id))
            .await
    }

    pub async fn set_current_step(
        &self,
        session: &Session,
        params: &SetCurrentStep,
    ) -> Result<Offer> {
        let (offer_id, step_id) = (params.offer_id, params.step_id);
        self.with_owner(session, move |db, owner| {
            db.set_current_step(owner, offer_id, step_id)
        })
        .await
    }

    /// Picks the step the offer panel opens: the requested one if it exists,
    /// else the stored current step, else the first step.
    pub async fn resolve_current_step(
        &self,
        session: &Session,
        params: &ResolveCurrentStep,
    ) -> Result<Option<Step>> {
        let offer_id = params.offer_id;
        let selector = StepSelector::from_parts(params.step_id, params.step_no);
        self.with_owner(session, move |db, owner| {
            db.resolve_current_step(owner, offer_id, selector)
        })
        .await
    }

    /// Returns the first step of the offer, creating "Step 1" if the offer
    /// has none.
    pub async fn ensure_first_step(&self, session: &Session, params: &OfferRef) -> Result<Step> {
        let offer_id = params.offer_id;
        self.with_owner(session, move |db, owner| {
            db.ensure_first_step(owner, offer_id)
        })
        .await
    }
}
