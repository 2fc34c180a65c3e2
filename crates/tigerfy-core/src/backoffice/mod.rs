//! High-level backoffice API for offers, steps and acquirers.
//!
//! [`Backoffice`] is what the CLI and the MCP server talk to. Every method
//! takes the [`Session`] of the request: operations without an owner fail
//! with [`crate::BackofficeError::Unauthenticated`] before the database is
//! touched, and everything else is scoped to that owner.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Backoffice    │    │    Database     │    │  StepSequencer  │
//! │ (offer_ops,     │───▶│ (offer/step/    │───▶│  over a         │
//! │  step_ops, ...) │    │  acquirer SQL)  │    │  SqliteStepStore│
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   async, per owner       blocking, SQLite        numbering rules
//! ```
//!
//! Each call opens the database on a blocking thread, so a `Backoffice` is
//! cheap to clone and share.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tigerfy_core::{params::{CreateOffer, CreateStep}, BackofficeBuilder, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoffice = BackofficeBuilder::new()
//!     .with_database_path(Some("/tmp/tigerfy.db"))
//!     .build()
//!     .await?;
//! let session = Session::for_owner("user-42");
//!
//! let offer = backoffice
//!     .create_offer(&session, &CreateOffer {
//!         name: "Black Friday".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let step = backoffice
//!     .create_step(&session, CreateStep {
//!         offer_id: offer.id,
//!         ..Default::default()
//!     })
//!     .await?;
//! assert_eq!(step.name, "Step 1");
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio::task;

use crate::{
    db::Database,
    error::{BackofficeError, Result},
    session::Session,
};

pub mod acquirer_ops;
pub mod builder;
pub mod offer_ops;
pub mod step_ops;


pub use builder::BackofficeBuilder;

/// Main interface for managing offers, steps and acquirers.
#[derive(Debug, Clone)]
pub struct Backoffice {
    pub(crate) db_path: PathBuf,
}

impl Backoffice {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Run `op` for the session's owner on a blocking thread with a freshly
    /// opened database.
    async fn with_owner<T, F>(&self, session: &Session, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database, &str) -> Result<T> + Send + 'static,
    {
        let owner = session.require_owner()?.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db, &owner)
        })
        .await
        .map_err(|e| BackofficeError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
