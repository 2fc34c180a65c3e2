//! Acquirer (payment gateway credential) CRUD operations.

use jiff::Timestamp;
use rusqlite::{params, types::Type, Connection, OptionalExtension};

use crate::{
    error::{BackofficeError, DatabaseResultExt, Result},
    models::{requests::non_blank, Acquirer, AcquirerFilter, AcquirerPatch, NewAcquirer},
};

const ACQUIRER_COLUMNS: &str = "id, owner, name, provider, token, webhook_secret, endpoint, is_active, extra, created_at, updated_at";

const INSERT_ACQUIRER_SQL: &str = "INSERT INTO acquirers (owner, name, provider, token, webhook_secret, endpoint, is_active, extra, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
const UPDATE_ACQUIRER_SQL: &str = "UPDATE acquirers SET name = ?1, provider = ?2, token = ?3, webhook_secret = ?4, endpoint = ?5, is_active = ?6, extra = ?7, updated_at = ?8 WHERE id = ?9 AND owner = ?10";
const DELETE_ACQUIRER_SQL: &str = "DELETE FROM acquirers WHERE id = ?1 AND owner = ?2";

fn encode_extra(extra: Option<&serde_json::Value>) -> Result<Option<String>> {
    Ok(extra.map(serde_json::to_string).transpose()?)
}

impl super::Database {
    fn build_acquirer_from_row(row: &rusqlite::Row) -> rusqlite::Result<Acquirer> {
        let extra = row
            .get::<_, Option<String>>(8)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

        Ok(Acquirer {
            id: row.get::<_, i64>(0)? as u64,
            owner: row.get(1)?,
            name: row.get(2)?,
            provider: row.get(3)?,
            token: row.get(4)?,
            webhook_secret: row.get(5)?,
            endpoint: row.get(6)?,
            is_active: row.get(7)?,
            extra,
            created_at: row.get::<_, String>(9)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e))
            })?,
            updated_at: row.get::<_, String>(10)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e))
            })?,
        })
    }

    pub fn create_acquirer(&self, owner: &str, acquirer: &NewAcquirer) -> Result<Acquirer> {
        Self::insert_acquirer(&self.connection, owner, acquirer)
    }

    fn insert_acquirer(conn: &Connection, owner: &str, acquirer: &NewAcquirer) -> Result<Acquirer> {
        let now = Timestamp::now();
        let now_str = now.to_string();

        conn.execute(
            INSERT_ACQUIRER_SQL,
            params![
                owner,
                acquirer.name,
                acquirer.provider,
                acquirer.token,
                acquirer.webhook_secret,
                acquirer.endpoint,
                acquirer.is_active,
                encode_extra(acquirer.extra.as_ref())?,
                &now_str,
                &now_str
            ],
        )
        .db_context("Failed to insert acquirer")?;

        Ok(Acquirer {
            id: conn.last_insert_rowid() as u64,
            owner: owner.to_string(),
            name: acquirer.name.clone(),
            provider: acquirer.provider.clone(),
            token: acquirer.token.clone(),
            webhook_secret: acquirer.webhook_secret.clone(),
            endpoint: acquirer.endpoint.clone(),
            is_active: acquirer.is_active,
            extra: acquirer.extra.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Lists the owner's acquirers, newest first.
    pub fn list_acquirers(&self, owner: &str, filter: &AcquirerFilter) -> Result<Vec<Acquirer>> {
        let mut query = format!("SELECT {ACQUIRER_COLUMNS} FROM acquirers WHERE owner = ?");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner.to_string())];

        if let Some(is_active) = filter.is_active {
            query.push_str(" AND is_active = ?");
            params_vec.push(Box::new(is_active));
        }

        if let Some(ref name) = filter.name {
            query.push_str(" AND instr(lower(name), lower(?)) > 0");
            params_vec.push(Box::new(name.clone()));
        }

        if let Some(ref provider) = filter.provider {
            query.push_str(" AND instr(lower(coalesce(provider, '')), lower(?)) > 0");
            params_vec.push(Box::new(provider.clone()));
        }

        query.push_str(" ORDER BY id DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare acquirer query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let acquirers = stmt
            .query_map(&params_refs[..], Self::build_acquirer_from_row)
            .db_context("Failed to query acquirers")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch acquirers")?;
        Ok(acquirers)
    }

    pub fn get_acquirer(&self, owner: &str, id: u64) -> Result<Acquirer> {
        Self::fetch_acquirer(&self.connection, owner, id)
    }

    fn fetch_acquirer(conn: &Connection, owner: &str, id: u64) -> Result<Acquirer> {
        conn.query_row(
            &format!("SELECT {ACQUIRER_COLUMNS} FROM acquirers WHERE id = ?1 AND owner = ?2"),
            params![id as i64, owner],
            Self::build_acquirer_from_row,
        )
        .optional()
        .db_context("Failed to fetch acquirer")?
        .ok_or(BackofficeError::AcquirerNotFound { id })
    }

    /// Most recently created acquirer of the owner with exactly this name.
    pub fn find_acquirer_by_name(&self, owner: &str, name: &str) -> Result<Option<Acquirer>> {
        Self::fetch_acquirer_by_name(&self.connection, owner, name)
    }

    fn fetch_acquirer_by_name(conn: &Connection, owner: &str, name: &str) -> Result<Option<Acquirer>> {
        conn.query_row(
            &format!(
                "SELECT {ACQUIRER_COLUMNS} FROM acquirers WHERE owner = ?1 AND name = ?2 ORDER BY id DESC LIMIT 1"
            ),
            params![owner, name],
            Self::build_acquirer_from_row,
        )
        .optional()
        .db_context("Failed to look up acquirer by name")
    }

    /// Applies a partial update. An empty patch returns the stored row
    /// without writing.
    pub fn update_acquirer(&self, owner: &str, id: u64, patch: &AcquirerPatch) -> Result<Acquirer> {
        Self::apply_acquirer_patch(&self.connection, owner, id, patch)
    }

    fn apply_acquirer_patch(
        conn: &Connection,
        owner: &str,
        id: u64,
        patch: &AcquirerPatch,
    ) -> Result<Acquirer> {
        let mut acquirer = Self::fetch_acquirer(conn, owner, id)?;
        if patch.is_empty() {
            return Ok(acquirer);
        }

        if let Some(ref name) = patch.name {
            acquirer.name = name.clone();
        }
        if let Some(ref provider) = patch.provider {
            acquirer.provider = Some(provider.clone());
        }
        if let Some(ref token) = patch.token {
            acquirer.token = Some(token.clone());
        }
        if let Some(ref webhook_secret) = patch.webhook_secret {
            acquirer.webhook_secret = Some(webhook_secret.clone());
        }
        if let Some(ref endpoint) = patch.endpoint {
            acquirer.endpoint = Some(endpoint.clone());
        }
        if let Some(is_active) = patch.is_active {
            acquirer.is_active = is_active;
        }
        if let Some(ref extra) = patch.extra {
            acquirer.extra = Some(extra.clone());
        }
        acquirer.updated_at = Timestamp::now();

        conn.execute(
            UPDATE_ACQUIRER_SQL,
            params![
                acquirer.name,
                acquirer.provider,
                acquirer.token,
                acquirer.webhook_secret,
                acquirer.endpoint,
                acquirer.is_active,
                encode_extra(acquirer.extra.as_ref())?,
                acquirer.updated_at.to_string(),
                id as i64,
                owner
            ],
        )
        .db_context("Failed to update acquirer")?;

        Ok(acquirer)
    }

    /// Deletes an acquirer and returns it as it was.
    pub fn remove_acquirer(&self, owner: &str, id: u64) -> Result<Acquirer> {
        let acquirer = self.get_acquirer(owner, id)?;
        self.connection
            .execute(DELETE_ACQUIRER_SQL, params![id as i64, owner])
            .db_context("Failed to delete acquirer")?;
        Ok(acquirer)
    }

    /// Updates the acquirer named `acquirer.name`, or creates it.
    ///
    /// Returns the row and whether it was created.
    pub fn upsert_acquirer_by_name(
        &mut self,
        owner: &str,
        acquirer: &NewAcquirer,
        patch: &AcquirerPatch,
    ) -> Result<(Acquirer, bool)> {
        let name = non_blank(Some(&acquirer.name)).ok_or_else(|| {
            BackofficeError::invalid_input("name").with_reason("Acquirer name must not be blank")
        })?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        let outcome = match Self::fetch_acquirer_by_name(&tx, owner, &name)? {
            Some(existing) => (
                Self::apply_acquirer_patch(&tx, owner, existing.id, patch)?,
                false,
            ),
            None => (Self::insert_acquirer(&tx, owner, acquirer)?, true),
        };
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(outcome)
    }
}
