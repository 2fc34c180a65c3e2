//! Result wrapper types for displaying operation outcomes.
//!
//! The wrappers are generic over [`Resource`], so offers, steps and acquirers
//! share one message format: a headline naming the resource kind and ID,
//! followed by the resource itself.

use std::fmt;

use crate::models::{Acquirer, Offer, Step};

/// A model that can be reported on by the result wrappers.
pub trait Resource: fmt::Display {
    /// Lowercase noun used in messages, e.g. "offer"
    const KIND: &'static str;

    fn id(&self) -> u64;

    fn label(&self) -> &str;
}

impl Resource for Offer {
    const KIND: &'static str = "offer";

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Resource for Step {
    const KIND: &'static str = "step";

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Resource for Acquirer {
    const KIND: &'static str = "acquirer";

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Wrapper type for displaying the result of create operations.
///
/// ```rust
/// use tigerfy_core::{display::CreateResult, models::Step};
/// use jiff::Timestamp;
///
/// let step = Step {
///     id: 5,
///     offer_id: 1,
///     name: "Step 1".to_string(),
///     step_no: 1,
///     settings: serde_json::json!({}),
///     duplicated: false,
///     duplicated_from: None,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
/// let output = CreateResult::new(step).to_string();
/// assert!(output.starts_with("Created step with ID: 5"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for CreateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created {} with ID: {}", T::KIND, self.resource.id())?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, optionally
/// listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    /// Create an UpdateResult with a list of changes made.
    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl<T: Resource> fmt::Display for UpdateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated {} with ID: {}", T::KIND, self.resource.id())?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for DeleteResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted {} '{}' (ID: {})",
            T::KIND,
            self.resource.label(),
            self.resource.id()
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn acquirer() -> Acquirer {
        Acquirer {
            id: 4,
            owner: "user-1".to_string(),
            name: "Main".to_string(),
            provider: None,
            token: None,
            webhook_secret: None,
            endpoint: None,
            is_active: true,
            extra: None,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_update_result_lists_changes() {
        let output =
            UpdateResult::with_changes(acquirer(), vec!["token".to_string()]).to_string();
        assert!(output.starts_with("Updated acquirer with ID: 4"));
        assert!(output.contains("Changes made:\n- token"));

        let output = UpdateResult::new(acquirer()).to_string();
        assert!(!output.contains("Changes made:"));
    }

    #[test]
    fn test_delete_result_names_resource() {
        assert_eq!(
            DeleteResult::new(acquirer()).to_string(),
            "Deleted acquirer 'Main' (ID: 4)\n"
        );
    }
}
