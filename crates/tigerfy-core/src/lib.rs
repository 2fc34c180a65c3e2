//! Core library for the TigerFy funnel backoffice.
//!
//! TigerFy manages Telegram-bot sales funnels ("offers"), the ordered steps
//! each offer is made of, and the payment gateway credentials ("acquirers")
//! an owner keeps on file. This crate holds the business rules, the SQLite
//! persistence and the markdown rendering shared by the `tfy` CLI and its
//! MCP server.
//!
//! # Layout
//!
//! - [`sequencer`]: step numbering rules, generic over a [`store::StepStore`]
//! - [`store`]: the step storage capability and its SQLite and memory backends
//! - [`db`]: the SQLite database for offers, steps and acquirers
//! - [`backoffice`]: the async, owner-scoped API used by the interfaces
//! - [`display`]: markdown `Display` implementations and result wrappers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tigerfy_core::{params::{CreateOffer, CreateStep, OfferRef}, BackofficeBuilder, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoffice = BackofficeBuilder::new()
//!     .with_database_path(Some("tigerfy.db"))
//!     .build()
//!     .await?;
//! let session = Session::for_owner("user-42");
//!
//! let offer = backoffice
//!     .create_offer(&session, &CreateOffer {
//!         name: "Launch".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! backoffice
//!     .ensure_first_step(&session, &OfferRef { offer_id: offer.id })
//!     .await?;
//!
//! let steps = backoffice
//!     .list_steps(&session, &OfferRef { offer_id: offer.id })
//!     .await?;
//! println!("{steps}");
//! # Ok(())
//! # }
//! ```

pub mod backoffice;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod sequencer;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use backoffice::{Backoffice, BackofficeBuilder};
pub use db::Database;
pub use display::{
    Acquirers, CreateResult, DeleteResult, LocalDateTime, OperationStatus, Offers, Steps,
    UpdateResult,
};
pub use error::{BackofficeError, Result};
pub use models::{
    Acquirer, BotType, Offer, OfferStatus, SettingsInput, Step, StepDraft, TrackingType,
};
pub use sequencer::StepSequencer;
pub use session::Session;
pub use store::{MemoryStepStore, SqliteStepStore, StepStore};
