//! Database operations and SQLite management for offers, steps and
//! acquirers.
//!
//! Every query here takes the owner explicitly; an offer or acquirer that
//! belongs to somebody else is reported exactly like a missing one. Step
//! numbering is not implemented in SQL: the step queries open a transaction,
//! wrap it in a [`crate::store::SqliteStepStore`] and hand it to the
//! [`crate::sequencer::StepSequencer`].

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod acquirer_queries;
pub mod migrations;
pub mod offer_queries;
pub mod step_queries;

/// How long a connection waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// The underlying connection, for running a store outside a transaction.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}
