//! Offer CRUD operations and the current step pointer.

use jiff::Timestamp;
use rusqlite::{params, types::Type, Connection, OptionalExtension, TransactionBehavior};

use crate::{
    error::{BackofficeError, DatabaseResultExt, Result},
    models::{
        requests::non_blank, BotType, NewOffer, Offer, OfferStatus, Step, StepSelector,
        TrackingType,
    },
    sequencer::StepSequencer,
    store::{Direction, SqliteStepStore, StepStore},
};

const OFFER_COLUMNS: &str = "id, owner, name, bot_type, tracking_type, status, telegram_username, bot_token, current_step_id, created_at, updated_at";

const CHECK_OFFER_OWNER_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM offers WHERE id = ?1 AND owner = ?2)";
const INSERT_OFFER_SQL: &str = "INSERT INTO offers (owner, name, bot_type, tracking_type, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const UPDATE_BOT_TOKEN_SQL: &str = "UPDATE offers SET bot_token = ?1, telegram_username = ?2, status = ?3, updated_at = ?4 WHERE id = ?5 AND owner = ?6";
const UPDATE_CURRENT_STEP_SQL: &str =
    "UPDATE offers SET current_step_id = ?1, updated_at = ?2 WHERE id = ?3 AND owner = ?4";
const DELETE_OFFER_SQL: &str = "DELETE FROM offers WHERE id = ?1 AND owner = ?2";
pub(super) const TOUCH_OFFER_SQL: &str = "UPDATE offers SET updated_at = ?1 WHERE id = ?2";

/// Fail with [`BackofficeError::OfferNotFound`] unless `owner` owns the
/// offer. Foreign and missing offers are indistinguishable.
pub(super) fn authorize_offer(conn: &Connection, owner: &str, offer_id: u64) -> Result<()> {
    let owned: bool = conn
        .query_row(
            CHECK_OFFER_OWNER_SQL,
            params![offer_id as i64, owner],
            |row| row.get(0),
        )
        .db_context("Failed to check offer ownership")?;

    if owned {
        Ok(())
    } else {
        Err(BackofficeError::OfferNotFound { id: offer_id })
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

impl super::Database {
    /// Helper function to construct an Offer (without steps) from a row
    fn build_offer_from_row(row: &rusqlite::Row) -> rusqlite::Result<Offer> {
        let bot_type = row
            .get::<_, String>(3)?
            .parse::<BotType>()
            .map_err(|e| conversion_error(3, e))?;
        let tracking_type = row
            .get::<_, String>(4)?
            .parse::<TrackingType>()
            .map_err(|e| conversion_error(4, e))?;
        let status = row
            .get::<_, String>(5)?
            .parse::<OfferStatus>()
            .map_err(|e| conversion_error(5, e))?;

        Ok(Offer {
            id: row.get::<_, i64>(0)? as u64,
            owner: row.get(1)?,
            name: row.get(2)?,
            bot_type,
            tracking_type,
            status,
            telegram_username: row.get(6)?,
            bot_token: row.get(7)?,
            current_step_id: row.get::<_, Option<i64>>(8)?.map(|id| id as u64),
            created_at: row.get::<_, String>(9)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e))
            })?,
            updated_at: row
                .get::<_, String>(10)?
                .parse::<Timestamp>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e))
                })?,
            steps: Vec::new(),
        })
    }

    fn fetch_offer(conn: &Connection, owner: &str, offer_id: u64) -> Result<Offer> {
        conn.query_row(
            &format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1 AND owner = ?2"),
            params![offer_id as i64, owner],
            Self::build_offer_from_row,
        )
        .optional()
        .db_context("Failed to fetch offer")?
        .ok_or(BackofficeError::OfferNotFound { id: offer_id })
    }

    /// Creates an offer in the `incomplete` state. No step is created.
    pub fn create_offer(&self, owner: &str, offer: &NewOffer) -> Result<Offer> {
        let now = Timestamp::now();
        let now_str = now.to_string();
        let status = OfferStatus::default();

        self.connection
            .execute(
                INSERT_OFFER_SQL,
                params![
                    owner,
                    offer.name,
                    offer.bot_type.as_str(),
                    offer.tracking_type.as_str(),
                    status.as_str(),
                    &now_str,
                    &now_str
                ],
            )
            .db_context("Failed to insert offer")?;

        Ok(Offer {
            id: self.connection.last_insert_rowid() as u64,
            owner: owner.to_string(),
            name: offer.name.clone(),
            bot_type: offer.bot_type,
            tracking_type: offer.tracking_type,
            status,
            telegram_username: None,
            bot_token: None,
            current_step_id: None,
            created_at: now,
            updated_at: now,
            steps: Vec::new(),
        })
    }

    /// Lists the owner's offers, newest first, with their steps loaded.
    pub fn list_offers(&self, owner: &str) -> Result<Vec<Offer>> {
        let mut stmt = self
            .connection
            .prepare(&format!(
                "SELECT {OFFER_COLUMNS} FROM offers WHERE owner = ?1 ORDER BY id DESC"
            ))
            .db_context("Failed to prepare offer query")?;

        let mut offers = stmt
            .query_map(params![owner], Self::build_offer_from_row)
            .db_context("Failed to query offers")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch offers")?;

        let store = SqliteStepStore::new(&self.connection);
        for offer in &mut offers {
            offer.steps = store.select_ordered(offer.id, Direction::Ascending, None)?;
        }

        Ok(offers)
    }

    /// Fetches one offer of the owner with its steps in order.
    pub fn get_offer(&self, owner: &str, offer_id: u64) -> Result<Offer> {
        let mut offer = Self::fetch_offer(&self.connection, owner, offer_id)?;
        offer.steps = SqliteStepStore::new(&self.connection).select_ordered(
            offer_id,
            Direction::Ascending,
            None,
        )?;
        Ok(offer)
    }

    /// Stores or clears the Telegram bot credentials of an offer.
    ///
    /// Blank values clear the column and a leading `@` on the username is
    /// dropped. The offer becomes `active` when a token is stored and falls
    /// back to `incomplete` otherwise.
    pub fn save_bot_token(
        &self,
        owner: &str,
        offer_id: u64,
        bot_token: Option<&str>,
        telegram_username: Option<&str>,
    ) -> Result<Offer> {
        authorize_offer(&self.connection, owner, offer_id)?;

        let bot_token = non_blank(bot_token);
        let telegram_username =
            non_blank(telegram_username.map(|name| name.trim().trim_start_matches('@')));
        let status = if bot_token.is_some() {
            OfferStatus::Active
        } else {
            OfferStatus::Incomplete
        };

        self.connection
            .execute(
                UPDATE_BOT_TOKEN_SQL,
                params![
                    bot_token,
                    telegram_username,
                    status.as_str(),
                    Timestamp::now().to_string(),
                    offer_id as i64,
                    owner
                ],
            )
            .db_context("Failed to save bot token")?;

        self.get_offer(owner, offer_id)
    }

    /// Permanently deletes an offer and all of its steps.
    ///
    /// Returns the offer as it was before deletion.
    pub fn delete_offer(&mut self, owner: &str, offer_id: u64) -> Result<Offer> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let mut offer = Self::fetch_offer(&tx, owner, offer_id)?;
        let mut sequencer = StepSequencer::new(SqliteStepStore::new(&tx));
        offer.steps = sequencer.list_steps(offer_id)?;

        let removed = sequencer.clear_steps(offer_id)?;
        log::debug!("Removed {removed} steps of offer {offer_id}");

        tx.execute(DELETE_OFFER_SQL, params![offer_id as i64, owner])
            .db_context("Failed to delete offer")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(offer)
    }

    /// Points the offer at one of its steps, or clears the pointer.
    pub fn set_current_step(
        &self,
        owner: &str,
        offer_id: u64,
        step_id: Option<u64>,
    ) -> Result<Offer> {
        authorize_offer(&self.connection, owner, offer_id)?;

        if let Some(step_id) = step_id {
            SqliteStepStore::new(&self.connection)
                .select_one(offer_id, step_id)?
                .ok_or(BackofficeError::StepNotFound { id: step_id })?;
        }

        self.connection
            .execute(
                UPDATE_CURRENT_STEP_SQL,
                params![
                    step_id.map(|id| id as i64),
                    Timestamp::now().to_string(),
                    offer_id as i64,
                    owner
                ],
            )
            .db_context("Failed to update current step")?;

        self.get_offer(owner, offer_id)
    }

    /// Works out which step the offer panel should open.
    ///
    /// Tries the selector first (an id, or a step number from older links),
    /// then the stored `current_step_id`, then the lowest numbered step.
    /// Returns `None` only for an offer without steps.
    pub fn resolve_current_step(
        &self,
        owner: &str,
        offer_id: u64,
        selector: Option<StepSelector>,
    ) -> Result<Option<Step>> {
        let offer = self.get_offer(owner, offer_id)?;

        let selected = selector.and_then(|selector| {
            offer.steps.iter().find(|step| match selector {
                StepSelector::Id(id) => step.id == id,
                StepSelector::Number(step_no) => step.step_no == step_no,
            })
        });
        let current = || {
            offer
                .current_step_id
                .and_then(|id| offer.steps.iter().find(|step| step.id == id))
        };

        Ok(selected
            .or_else(current)
            .or_else(|| offer.steps.first())
            .cloned())
    }
}
