//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        // Databases created before the current step moved out of the step
        // settings have no pointer column on offers
        if !self.has_column("offers", "current_step_id")? {
            self.connection
                .execute(
                    "ALTER TABLE offers ADD COLUMN current_step_id INTEGER REFERENCES steps(id) ON DELETE SET NULL",
                    [],
                )
                .db_context("Failed to add current_step_id column to offers table")?;
        }

        if !self.has_column("steps", "duplicated_from")? {
            self.connection
                .execute("ALTER TABLE steps ADD COLUMN duplicated_from INTEGER", [])
                .db_context("Failed to add duplicated_from column to steps table")?;
        }

        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
                [table, column],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .db_context("Failed to inspect table columns")
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::super::Database;

    #[test]
    fn test_migrates_offers_without_current_step_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE offers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner TEXT NOT NULL,
                    name TEXT NOT NULL,
                    bot_type TEXT NOT NULL DEFAULT 'standard',
                    tracking_type TEXT NOT NULL DEFAULT 'facebook_pixel',
                    status TEXT NOT NULL DEFAULT 'incomplete',
                    telegram_username TEXT,
                    bot_token TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .unwrap();
        }

        let db = Database::new(&path).unwrap();
        assert!(db.has_column("offers", "current_step_id").unwrap());
        assert!(db.has_column("steps", "duplicated_from").unwrap());

        // Opening again is a no-op
        drop(db);
        Database::new(&path).unwrap();
    }
}
