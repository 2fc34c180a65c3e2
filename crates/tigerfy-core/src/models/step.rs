//! Step model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One ordered configuration unit of an offer's funnel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: u64,

    /// ID of the owning offer
    pub offer_id: u64,

    /// Display label
    pub name: String,

    /// Position within the offer, unique per offer and starting at 1
    pub step_no: u32,

    /// Free-form configuration document (always a JSON object)
    pub settings: Value,

    /// Whether the settings were copied from another step
    #[serde(default)]
    pub duplicated: bool,

    /// Source step of the copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicated_from: Option<u64>,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the step was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Step {
    /// Label used when a step is created without a usable name.
    pub fn default_name(step_no: u32) -> String {
        format!("Step {step_no}")
    }

    /// The step every funnel enters through.
    pub fn is_first(&self) -> bool {
        self.step_no == 1
    }
}

/// A row about to be written by a [`crate::store::StepStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewStep {
    pub offer_id: u64,
    pub name: String,
    pub step_no: u32,
    pub settings: Value,
    pub duplicated: bool,
    pub duplicated_from: Option<u64>,
}
