//! Builder for creating and configuring Backoffice instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::Backoffice;
use crate::{
    db::Database,
    error::{BackofficeError, Result},
};

/// Builder for creating and configuring [`Backoffice`] instances.
#[derive(Debug, Clone, Default)]
pub struct BackofficeBuilder {
    database_path: Option<PathBuf>,
}

impl BackofficeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG data directory:
    /// `$XDG_DATA_HOME/tigerfy/tigerfy.db` or `~/.local/share/tigerfy/tigerfy.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Creates the database directory and schema, then returns the
    /// backoffice.
    ///
    /// # Errors
    ///
    /// Returns `BackofficeError::FileSystem` if the directory cannot be created
    /// Returns `BackofficeError::Database` if schema initialization fails
    pub async fn build(self) -> Result<Backoffice> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BackofficeError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let init_path = db_path.clone();
        task::spawn_blocking(move || Database::new(&init_path).map(drop))
            .await
            .map_err(|e| BackofficeError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        log::debug!("Using database at {}", db_path.display());
        Ok(Backoffice::new(db_path))
    }

    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("tigerfy")
            .place_data_file("tigerfy.db")
            .map_err(|e| BackofficeError::XdgDirectory(e.to_string()))
    }
}
