//! Payment gateway credential model.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored credentials for one payment gateway account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Acquirer {
    pub id: u64,

    /// Identifier of the owning user
    pub owner: String,

    pub name: String,

    /// Gateway vendor, e.g. "WiinPay"
    pub provider: Option<String>,

    /// API key used against the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    pub endpoint: Option<String>,

    pub is_active: bool,

    /// Free-form provider specific configuration
    pub extra: Option<Value>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}
