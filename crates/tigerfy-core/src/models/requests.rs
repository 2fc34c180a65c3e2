//! Request types for creating and updating models.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{params, BackofficeError};

/// Settings as they arrive from a caller: either a JSON document or its
/// encoded string form (form posts and CLI flags send the latter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum SettingsInput {
    Encoded(String),
    Document(Value),
}

impl SettingsInput {
    /// Decode into a settings object.
    ///
    /// Returns `None` for blank strings, undecodable JSON and anything that
    /// is not a JSON object.
    ///
    /// ```rust
    /// use tigerfy_core::models::SettingsInput;
    ///
    /// let encoded = SettingsInput::Encoded(r#"{"price": 19.9}"#.to_string());
    /// assert!(encoded.decode().is_some());
    ///
    /// assert!(SettingsInput::Encoded("not json".to_string()).decode().is_none());
    /// assert!(SettingsInput::Document(serde_json::json!([1, 2])).decode().is_none());
    /// ```
    pub fn decode(&self) -> Option<Value> {
        let value = match self {
            SettingsInput::Encoded(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return None;
                }
                serde_json::from_str::<Value>(raw).ok()?
            }
            SettingsInput::Document(value) => value.clone(),
        };
        value.is_object().then_some(value)
    }
}

impl From<Value> for SettingsInput {
    fn from(value: Value) -> Self {
        SettingsInput::Document(value)
    }
}

/// Trim a name and drop it when nothing is left.
pub(crate) fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
}

/// Everything the sequencer needs to append a step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDraft {
    /// Label; blank or missing means "Step {n}"
    pub name: Option<String>,
    /// Initial settings; ignored when duplicating
    pub settings: Option<Value>,
    /// Copy settings from this step of the same offer
    pub duplicate_source_id: Option<u64>,
}

impl StepDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl TryFrom<params::CreateStep> for StepDraft {
    type Error = BackofficeError;

    /// Convert creation parameters, rejecting settings that do not decode
    /// to a JSON object.
    fn try_from(params: params::CreateStep) -> Result<Self, Self::Error> {
        let settings = match params.settings {
            Some(input) => Some(input.decode().ok_or_else(|| {
                BackofficeError::invalid_input("settings")
                    .with_reason("Settings must be a JSON object")
            })?),
            None => None,
        };

        Ok(Self {
            name: params.name,
            settings,
            duplicate_source_id: params.duplicate_from,
        })
    }
}

/// Partial update applied by a store. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub name: Option<String>,
    pub settings: Option<Value>,
    pub step_no: Option<u32>,
}

impl StepPatch {
    pub fn renumber(step_no: u32) -> Self {
        Self {
            step_no: Some(step_no),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.settings.is_none() && self.step_no.is_none()
    }
}

/// How a caller points at the step to open in the offer panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSelector {
    /// By step identifier
    Id(u64),
    /// By position, as old links did
    Number(u32),
}

impl StepSelector {
    /// Identifier wins over number when both are given.
    pub fn from_parts(step_id: Option<u64>, step_no: Option<u32>) -> Option<Self> {
        step_id
            .map(StepSelector::Id)
            .or_else(|| step_no.map(StepSelector::Number))
    }
}

/// Validated input for inserting an acquirer row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAcquirer {
    pub name: String,
    pub provider: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: bool,
    pub extra: Option<Value>,
}

impl From<params::CreateAcquirer> for NewAcquirer {
    fn from(params: params::CreateAcquirer) -> Self {
        Self {
            name: non_blank(params.name.as_deref()).unwrap_or_else(|| "Unnamed".to_string()),
            provider: params.provider,
            token: params.token,
            webhook_secret: params.webhook_secret,
            endpoint: params.endpoint,
            is_active: params.is_active.unwrap_or(true),
            extra: params.extra,
        }
    }
}

/// Partial acquirer update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquirerPatch {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: Option<bool>,
    pub extra: Option<Value>,
}

impl AcquirerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.provider.is_none()
            && self.token.is_none()
            && self.webhook_secret.is_none()
            && self.endpoint.is_none()
            && self.is_active.is_none()
            && self.extra.is_none()
    }

    /// Names of the fields this patch touches, for confirmations.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.provider.is_some() {
            fields.push("provider");
        }
        if self.token.is_some() {
            fields.push("token");
        }
        if self.webhook_secret.is_some() {
            fields.push("webhook secret");
        }
        if self.endpoint.is_some() {
            fields.push("endpoint");
        }
        if self.is_active.is_some() {
            fields.push("active flag");
        }
        if self.extra.is_some() {
            fields.push("extra");
        }
        fields
    }
}

impl From<params::UpdateAcquirer> for AcquirerPatch {
    fn from(params: params::UpdateAcquirer) -> Self {
        Self {
            name: non_blank(params.name.as_deref()),
            provider: params.provider,
            token: params.token,
            webhook_secret: params.webhook_secret,
            endpoint: params.endpoint,
            is_active: params.is_active,
            extra: params.extra,
        }
    }
}

/// Filter applied when listing acquirers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquirerFilter {
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the provider
    pub provider: Option<String>,
}

impl From<&params::ListAcquirers> for AcquirerFilter {
    fn from(params: &params::ListAcquirers) -> Self {
        Self {
            is_active: params.active,
            name: non_blank(params.name.as_deref()),
            provider: non_blank(params.provider.as_deref()),
        }
    }
}
