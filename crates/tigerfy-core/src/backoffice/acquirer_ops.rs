//! Acquirer operations for the Backoffice.

use super::Backoffice;
use crate::{
    display::Acquirers,
    error::{BackofficeError, Result},
    models::{Acquirer, AcquirerFilter, AcquirerPatch, NewAcquirer},
    params::{AcquirerRef, CreateAcquirer, ListAcquirers, UpdateAcquirer, UpsertAcquirer},
    session::Session,
};

impl Backoffice {
    pub async fn create_acquirer(
        &self,
        session: &Session,
        params: &CreateAcquirer,
    ) -> Result<Acquirer> {
        let acquirer = NewAcquirer::from(params.clone());
        self.with_owner(session, move |db, owner| {
            db.create_acquirer(owner, &acquirer)
        })
        .await
    }

    /// Lists the owner's acquirers, newest first, narrowed by the filter.
    pub async fn list_acquirers(
        &self,
        session: &Session,
        params: &ListAcquirers,
    ) -> Result<Acquirers> {
        let filter = AcquirerFilter::from(params);
        self.with_owner(session, move |db, owner| db.list_acquirers(owner, &filter))
            .await
            .map(Acquirers)
    }

    pub async fn get_acquirer(&self, session: &Session, params: &AcquirerRef) -> Result<Acquirer> {
        let id = params.id;
        self.with_owner(session, move |db, owner| db.get_acquirer(owner, id))
            .await
    }

    /// Applies a partial update; returns the patch alongside the row so
    /// callers can report what changed.
    pub async fn update_acquirer(
        &self,
        session: &Session,
        params: &UpdateAcquirer,
    ) -> Result<(Acquirer, AcquirerPatch)> {
        let id = params.id;
        let patch = AcquirerPatch::from(params.clone());
        self.with_owner(session, move |db, owner| {
            let acquirer = db.update_acquirer(owner, id, &patch)?;
            Ok((acquirer, patch))
        })
        .await
    }

    pub async fn remove_acquirer(
        &self,
        session: &Session,
        params: &AcquirerRef,
    ) -> Result<Acquirer> {
        let id = params.id;
        self.with_owner(session, move |db, owner| db.remove_acquirer(owner, id))
            .await
    }

    /// Updates the acquirer with the given name, or creates it.
    ///
    /// The boolean is true when a new acquirer was created.
    pub async fn upsert_acquirer(
        &self,
        session: &Session,
        params: &UpsertAcquirer,
    ) -> Result<(Acquirer, bool)> {
        if params.name.trim().is_empty() {
            return Err(BackofficeError::invalid_input("name")
                .with_reason("Acquirer name must not be blank"));
        }

        let acquirer = NewAcquirer::from(CreateAcquirer::from(params.clone()));
        // The id is resolved from the name inside the transaction
        let patch = AcquirerPatch::from(params.to_update(0));
        self.with_owner(session, move |db, owner| {
            db.upsert_acquirer_by_name(owner, &acquirer, &patch)
        })
        .await
    }
}
