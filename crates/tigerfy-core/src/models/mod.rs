//! Data models for offers, steps and acquirers.
//!
//! Display implementations for these models live in
//! [`crate::display::models`] so the structures here stay plain data.
//!
//! # Examples
//!
//! ```rust
//! use tigerfy_core::models::Step;
//! use jiff::Timestamp;
//!
//! let step = Step {
//!     id: 7,
//!     offer_id: 1,
//!     name: Step::default_name(1),
//!     step_no: 1,
//!     settings: serde_json::json!({}),
//!     duplicated: false,
//!     duplicated_from: None,
//!     created_at: Timestamp::now(),
//!     updated_at: Timestamp::now(),
//! };
//! assert!(step.is_first());
//! assert_eq!(step.name, "Step 1");
//! ```

pub mod acquirer;
pub mod offer;
pub mod requests;
pub mod status;
pub mod step;


pub use acquirer::Acquirer;
pub use offer::{NewOffer, Offer};
pub use requests::{
    AcquirerFilter, AcquirerPatch, NewAcquirer, SettingsInput, StepDraft, StepPatch, StepSelector,
};
pub use status::{BotType, OfferStatus, TrackingType};
pub use step::{NewStep, Step};
