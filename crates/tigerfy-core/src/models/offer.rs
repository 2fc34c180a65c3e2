//! Offer model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{BotType, OfferStatus, Step, TrackingType};

/// A sales funnel owned by one user, composed of ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    /// Unique identifier for the offer
    pub id: u64,

    /// Identifier of the owning user
    pub owner: String,

    /// Display name of the offer
    pub name: String,

    pub bot_type: BotType,

    pub tracking_type: TrackingType,

    #[serde(default)]
    pub status: OfferStatus,

    /// Telegram handle of the bot, stored without the leading `@`
    pub telegram_username: Option<String>,

    /// Telegram bot token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Step currently opened in the offer panel
    pub current_step_id: Option<u64>,

    /// Timestamp when the offer was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the offer was last modified (UTC)
    pub updated_at: Timestamp,

    /// Associated steps (lazy-loaded by default)
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Offer {
    pub fn has_bot_token(&self) -> bool {
        self.bot_token.is_some()
    }
}

/// Validated input for inserting an offer row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub name: String,
    pub bot_type: BotType,
    pub tracking_type: TrackingType,
}

impl NewOffer {
    /// An offer with the default bot and tracking configuration.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bot_type: BotType::default(),
            tracking_type: TrackingType::default(),
        }
    }
}

impl TryFrom<crate::params::CreateOffer> for NewOffer {
    type Error = crate::BackofficeError;

    /// Validate the name and parse the optional enum strings. Blank enum
    /// strings fall back to the defaults.
    fn try_from(params: crate::params::CreateOffer) -> Result<Self, Self::Error> {
        use super::requests::non_blank;
        use crate::BackofficeError;

        let name = non_blank(Some(&params.name)).ok_or_else(|| {
            BackofficeError::invalid_input("name").with_reason("Offer name must not be blank")
        })?;

        let bot_type = match non_blank(params.bot_type.as_deref()) {
            Some(raw) => raw
                .parse::<BotType>()
                .map_err(|reason| BackofficeError::invalid_input("bot_type").with_reason(reason))?,
            None => BotType::default(),
        };
        let tracking_type = match non_blank(params.tracking_type.as_deref()) {
            Some(raw) => raw.parse::<TrackingType>().map_err(|reason| {
                BackofficeError::invalid_input("tracking_type").with_reason(reason)
            })?,
            None => TrackingType::default(),
        };

        Ok(Self {
            name,
            bot_type,
            tracking_type,
        })
    }
}
