//! Markdown rendering for models and operation results.
//!
//! Domain models implement `Display` directly (see [`models`]); collections
//! and operation outcomes go through small wrapper types so the CLI and the
//! MCP server print exactly the same text.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers        │    │   Formatted     │
//! │ (Offer, Step,   │───▶│ (Steps, Create- │───▶│    Output       │
//! │  Acquirer)      │    │  Result, ...)   │    │ (Terminal/MCP)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: `Offers`, `Steps`, `Acquirers`
//! - [`results`]: `CreateResult`, `UpdateResult`, `DeleteResult`
//! - [`status`]: `OperationStatus`
//! - [`datetime`]: `LocalDateTime`
//!
//! ```rust
//! use tigerfy_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Steps reordered");
//! assert_eq!(status.to_string(), "Success: Steps reordered\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Acquirers, Offers, Steps};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, Resource, UpdateResult};
pub use status::OperationStatus;
