//! Parameter structures for backoffice operations
//!
//! Shared parameter structures used by every interface (CLI, MCP) without
//! framework-specific derives. Interface layers wrap these types and convert
//! into them; JSON schema generation is only compiled in with the `schema`
//! feature.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! The owner is never part of these structures: it comes from the
//! [`crate::Session`] attached to the request.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::SettingsInput;

/// Parameters for operations addressing one offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct OfferRef {
    /// The ID of the offer
    pub offer_id: u64,
}

/// Parameters for creating a new offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateOffer {
    /// Name of the offer (required)
    pub name: String,
    /// Bot flavour: 'standard' (default), 'wiin_flow' or 'manychat_flow'
    pub bot_type: Option<String>,
    /// Tracking: 'facebook_pixel' (default), 'utmify_pixel',
    /// 'utmify_facebook_pixel' or 'self_hosted'
    pub tracking_type: Option<String>,
}

/// Parameters for connecting a Telegram bot to an offer.
///
/// Blank values clear the stored field. Saving a token activates the offer;
/// clearing it moves the offer back to 'incomplete'.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SaveBotToken {
    pub offer_id: u64,
    pub bot_token: Option<String>,
    /// Telegram username of the bot, with or without a leading '@'
    pub telegram_username: Option<String>,
}

/// Parameters for deleting an offer with all of its steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeleteOffer {
    pub offer_id: u64,
    /// Must be true for the deletion to proceed
    #[serde(default)]
    pub confirmed: bool,
}

/// Parameters for pointing an offer at its current step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SetCurrentStep {
    pub offer_id: u64,
    /// Step to mark as current; omit to clear
    pub step_id: Option<u64>,
}

/// Parameters for working out which step the offer panel opens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ResolveCurrentStep {
    pub offer_id: u64,
    /// Explicit step identifier
    pub step_id: Option<u64>,
    /// Step number, used when no identifier is given
    pub step_no: Option<u32>,
}

/// Parameters for appending a step to an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateStep {
    /// ID of the offer to add the step to
    pub offer_id: u64,
    /// Name of the step; defaults to "Step {n}"
    pub name: Option<String>,
    /// Initial settings, as a JSON object or its encoded string
    pub settings: Option<SettingsInput>,
    /// Copy the settings of this step of the same offer
    pub duplicate_from: Option<u64>,
}

/// Parameters for operations addressing one step of an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepRef {
    pub offer_id: u64,
    pub step_id: u64,
}

/// Parameters for renaming a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RenameStep {
    pub offer_id: u64,
    pub step_id: u64,
    /// New name (must not be blank)
    pub name: String,
}

/// Parameters for updating a step's name and/or settings.
///
/// Settings replace the stored document wholesale. When neither field
/// carries anything usable the step is returned untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateStepSettings {
    pub offer_id: u64,
    pub step_id: u64,
    pub name: Option<String>,
    pub settings: Option<SettingsInput>,
}

/// Parameters for reordering every step of an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReorderSteps {
    pub offer_id: u64,
    /// All step IDs of the offer, in the desired order
    pub step_ids: Vec<u64>,
}

/// Generic parameters for acquirer operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AcquirerRef {
    pub id: u64,
}

/// Parameters for storing gateway credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateAcquirer {
    /// Display name; defaults to "Unnamed"
    pub name: Option<String>,
    /// Gateway vendor, e.g. "WiinPay"
    pub provider: Option<String>,
    /// API key
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub endpoint: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
    /// Free-form provider configuration
    pub extra: Option<Value>,
}

/// Parameters for a partial acquirer update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateAcquirer {
    pub id: u64,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: Option<bool>,
    pub extra: Option<Value>,
}

/// Parameters for creating or updating the acquirer with a given name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpsertAcquirer {
    pub name: String,
    pub provider: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: Option<bool>,
    pub extra: Option<Value>,
}

/// Parameters for listing acquirers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListAcquirers {
    /// Only active (true) or inactive (false) acquirers
    pub active: Option<bool>,
    /// Case-insensitive name fragment
    pub name: Option<String>,
    /// Case-insensitive provider fragment
    pub provider: Option<String>,
}

impl From<UpsertAcquirer> for CreateAcquirer {
    fn from(val: UpsertAcquirer) -> Self {
        CreateAcquirer {
            name: Some(val.name),
            provider: val.provider,
            token: val.token,
            webhook_secret: val.webhook_secret,
            endpoint: val.endpoint,
            is_active: val.is_active,
            extra: val.extra,
        }
    }
}

impl UpsertAcquirer {
    /// The update half of an upsert; the name is the lookup key and is not
    /// rewritten.
    pub fn to_update(&self, id: u64) -> UpdateAcquirer {
        UpdateAcquirer {
            id,
            name: None,
            provider: self.provider.clone(),
            token: self.token.clone(),
            webhook_secret: self.webhook_secret.clone(),
            endpoint: self.endpoint.clone(),
            is_active: self.is_active,
            extra: self.extra.clone(),
        }
    }
}
