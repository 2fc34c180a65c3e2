//! Enumerations describing how an offer is configured.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Created but the bot is not connected yet
    #[default]
    Incomplete,

    /// Bot token saved, offer is live
    Active,

    /// Something went wrong while running the bot
    Error,
}

impl FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incomplete" => Ok(OfferStatus::Incomplete),
            "active" => Ok(OfferStatus::Active),
            "error" => Ok(OfferStatus::Error),
            _ => Err(format!("Invalid offer status: {s}")),
        }
    }
}

impl OfferStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Incomplete => "incomplete",
            OfferStatus::Active => "active",
            OfferStatus::Error => "error",
        }
    }
}

/// Which bot flavour drives the funnel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BotType {
    /// Classic single-bot flow
    #[default]
    Standard,

    /// Flow driven by the Wiin integration
    WiinFlow,

    /// Flow driven by ManyChat
    ManychatFlow,
}

impl FromStr for BotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(BotType::Standard),
            "wiin_flow" => Ok(BotType::WiinFlow),
            "manychat_flow" => Ok(BotType::ManychatFlow),
            _ => Err(format!("Invalid bot type: {s}")),
        }
    }
}

impl BotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotType::Standard => "standard",
            BotType::WiinFlow => "wiin_flow",
            BotType::ManychatFlow => "manychat_flow",
        }
    }
}

/// How conversions of an offer are tracked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingType {
    /// Native Facebook pixel
    #[default]
    FacebookPixel,

    /// UTMify with the UTMify pixel
    UtmifyPixel,

    /// UTMify with the Facebook pixel
    UtmifyFacebookPixel,

    /// Owner-hosted tracking
    SelfHosted,
}

impl FromStr for TrackingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "facebook_pixel" => Ok(TrackingType::FacebookPixel),
            "utmify_pixel" => Ok(TrackingType::UtmifyPixel),
            "utmify_facebook_pixel" => Ok(TrackingType::UtmifyFacebookPixel),
            "self_hosted" => Ok(TrackingType::SelfHosted),
            _ => Err(format!("Invalid tracking type: {s}")),
        }
    }
}

impl TrackingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingType::FacebookPixel => "facebook_pixel",
            TrackingType::UtmifyPixel => "utmify_pixel",
            TrackingType::UtmifyFacebookPixel => "utmify_facebook_pixel",
            TrackingType::SelfHosted => "self_hosted",
        }
    }
}
