//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper owns its items, exposes the usual read-only slice helpers and
//! prints a friendly line instead of nothing when it is empty.

use std::{fmt, ops::Index};

use crate::models::{Acquirer, Offer, Step};

macro_rules! collection_wrapper {
    ($wrapper:ident, $item:ty) => {
        impl $wrapper {
            /// Check if the collection is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of items in the collection.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $wrapper {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $wrapper {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $wrapper {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

/// Offers of one owner, printed as short summaries.
///
/// ```rust
/// use tigerfy_core::{display::Offers, models::{BotType, Offer, OfferStatus, TrackingType}};
/// use jiff::Timestamp;
///
/// let offer = Offer {
///     id: 1,
///     owner: "user-1".to_string(),
///     name: "Launch".to_string(),
///     bot_type: BotType::Standard,
///     tracking_type: TrackingType::FacebookPixel,
///     status: OfferStatus::Incomplete,
///     telegram_username: None,
///     bot_token: None,
///     current_step_id: None,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
///     steps: vec![],
/// };
/// let output = Offers(vec![offer]).to_string();
/// assert!(output.contains("## Launch (ID: 1)"));
/// assert_eq!(Offers(vec![]).to_string(), "No offers found.\n");
/// ```
#[derive(Debug, Clone)]
pub struct Offers(pub Vec<Offer>);

collection_wrapper!(Offers, Offer);

impl fmt::Display for Offers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No offers found.")
        } else {
            for offer in &self.0 {
                offer.fmt_summary(f)?;
            }
            Ok(())
        }
    }
}

/// Steps of an offer in funnel order.
#[derive(Debug, Clone)]
pub struct Steps(pub Vec<Step>);

collection_wrapper!(Steps, Step);

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No steps found.")
        } else {
            for step in &self.0 {
                write!(f, "{step}")?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Acquirers(pub Vec<Acquirer>);

collection_wrapper!(Acquirers, Acquirer);

impl fmt::Display for Acquirers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No acquirers found.")
        } else {
            for acquirer in &self.0 {
                write!(f, "{acquirer}")?;
            }
            Ok(())
        }
    }
}
