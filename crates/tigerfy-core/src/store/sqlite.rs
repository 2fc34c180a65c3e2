//! `rusqlite`-backed step store.

use jiff::Timestamp;
use rusqlite::{ffi, params, types::Type, Connection, OptionalExtension};

use super::{Direction, StepStore};
use crate::{
    error::{BackofficeError, DatabaseResultExt, Result},
    models::{NewStep, Step, StepPatch},
};

const STEP_COLUMNS: &str =
    "id, offer_id, name, step_no, settings, duplicated, duplicated_from, created_at, updated_at";

const INSERT_STEP_SQL: &str = "INSERT INTO steps (offer_id, name, step_no, settings, duplicated, duplicated_from, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const DELETE_STEP_SQL: &str = "DELETE FROM steps WHERE id = ?1 AND offer_id = ?2";

/// Step rows reached through a borrowed connection.
///
/// Pass a [`rusqlite::Transaction`] (it derefs to [`Connection`]) when
/// several sequencer calls must commit together.
pub struct SqliteStepStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStepStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

/// Construct a Step from a row selected with [`STEP_COLUMNS`].
pub(crate) fn build_step_from_row(row: &rusqlite::Row) -> rusqlite::Result<Step> {
    let settings_str: String = row.get(4)?;
    let settings = serde_json::from_str(&settings_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Step {
        id: row.get::<_, i64>(0)? as u64,
        offer_id: row.get::<_, i64>(1)? as u64,
        name: row.get(2)?,
        step_no: row.get::<_, i64>(3)? as u32,
        settings,
        duplicated: row.get(5)?,
        duplicated_from: row.get::<_, Option<i64>>(6)?.map(|id| id as u64),
        created_at: row.get::<_, String>(7)?.parse::<Timestamp>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
        })?,
        updated_at: row.get::<_, String>(8)?.parse::<Timestamp>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e))
        })?,
    })
}

/// SQL selecting every step column, filtered on offer and ordered.
pub(crate) fn select_steps_sql(direction: Direction) -> String {
    let order = match direction {
        Direction::Ascending => "step_no ASC, created_at ASC, id ASC",
        Direction::Descending => "step_no DESC, created_at DESC, id DESC",
    };
    format!("SELECT {STEP_COLUMNS} FROM steps WHERE offer_id = ?1 ORDER BY {order} LIMIT ?2")
}

fn is_step_no_collision(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .is_some_and(|m| m.contains("steps.step_no"))
        }
        _ => false,
    }
}

/// Map a write error, turning `UNIQUE(offer_id, step_no)` violations into
/// [`BackofficeError::DuplicateStepNumber`].
fn map_write_error(err: rusqlite::Error, offer_id: u64, step_no: u32, message: &str) -> BackofficeError {
    if is_step_no_collision(&err) {
        BackofficeError::DuplicateStepNumber { offer_id, step_no }
    } else {
        BackofficeError::database(message).with_source(err)
    }
}

impl StepStore for SqliteStepStore<'_> {
    fn insert(&mut self, step: &NewStep) -> Result<Step> {
        let now = Timestamp::now();
        let now_str = now.to_string();
        let settings = serde_json::to_string(&step.settings)?;

        self.conn
            .execute(
                INSERT_STEP_SQL,
                params![
                    step.offer_id as i64,
                    step.name,
                    step.step_no as i64,
                    settings,
                    step.duplicated,
                    step.duplicated_from.map(|id| id as i64),
                    &now_str,
                    &now_str
                ],
            )
            .map_err(|e| map_write_error(e, step.offer_id, step.step_no, "Failed to insert step"))?;

        Ok(Step {
            id: self.conn.last_insert_rowid() as u64,
            offer_id: step.offer_id,
            name: step.name.clone(),
            step_no: step.step_no,
            settings: step.settings.clone(),
            duplicated: step.duplicated,
            duplicated_from: step.duplicated_from,
            created_at: now,
            updated_at: now,
        })
    }

    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self
            .conn
            .prepare(&select_steps_sql(direction))
            .db_context("Failed to prepare step query")?;
        let steps = stmt
            .query_map(params![offer_id as i64, limit], build_step_from_row)
            .db_context("Failed to query steps")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read step rows")?;
        Ok(steps)
    }

    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>> {
        self.conn
            .query_row(
                &format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1 AND offer_id = ?2"),
                params![step_id as i64, offer_id as i64],
                build_step_from_row,
            )
            .optional()
            .db_context("Failed to fetch step")
    }

    fn update_by_id(
        &mut self,
        offer_id: u64,
        step_id: u64,
        patch: &StepPatch,
    ) -> Result<Option<Step>> {
        let mut assignments = vec!["updated_at = ?"];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(Timestamp::now().to_string())];

        if let Some(name) = &patch.name {
            assignments.push("name = ?");
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(settings) = &patch.settings {
            assignments.push("settings = ?");
            params_vec.push(Box::new(serde_json::to_string(settings)?));
        }
        if let Some(step_no) = patch.step_no {
            assignments.push("step_no = ?");
            params_vec.push(Box::new(i64::from(step_no)));
        }
        params_vec.push(Box::new(step_id as i64));
        params_vec.push(Box::new(offer_id as i64));

        let query = format!(
            "UPDATE steps SET {} WHERE id = ? AND offer_id = ?",
            assignments.join(", ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let rows = self
            .conn
            .execute(&query, &params_refs[..])
            .map_err(|e| {
                map_write_error(e, offer_id, patch.step_no.unwrap_or_default(), "Failed to update step")
            })?;
        if rows == 0 {
            return Ok(None);
        }

        self.select_one(offer_id, step_id)
    }

    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool> {
        let rows = self
            .conn
            .execute(DELETE_STEP_SQL, params![step_id as i64, offer_id as i64])
            .db_context("Failed to delete step")?;
        Ok(rows > 0)
    }

    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare(DELETE_STEP_SQL)
            .db_context("Failed to prepare step deletion")?;
        let mut removed = 0;
        for &step_id in step_ids {
            removed += stmt
                .execute(params![step_id as i64, offer_id as i64])
                .db_context("Failed to delete step")?;
        }
        Ok(removed)
    }
}
