//! Display implementations for domain models.
//!
//! Kept apart from the model definitions so the structures stay plain data.
//! Everything renders as markdown; secrets are never printed in full.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Acquirer, BotType, Offer, OfferStatus, Step, TrackingType};

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TrackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Show only the last four characters of a secret.
///
/// ```rust
/// use tigerfy_core::display::models::mask_secret;
///
/// assert_eq!(mask_secret("123456:ABCDEFGH"), "****EFGH");
/// assert_eq!(mask_secret("short"), "****");
/// ```
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn fmt_json_block(f: &mut fmt::Formatter<'_>, value: &serde_json::Value) -> fmt::Result {
    let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
    writeln!(f, "```json")?;
    writeln!(f, "{pretty}")?;
    writeln!(f, "```")
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Bot type: {}", self.bot_type)?;
        writeln!(f, "- Tracking: {}", self.tracking_type)?;
        if let Some(username) = &self.telegram_username {
            writeln!(f, "- Telegram: @{username}")?;
        }
        match &self.bot_token {
            Some(token) => writeln!(f, "- Bot token: {}", mask_secret(token))?,
            None => writeln!(f, "- Bot token: not set")?,
        }
        if let Some(step_id) = self.current_step_id {
            writeln!(f, "- Current step: {step_id}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this offer.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl Offer {
    /// One-paragraph form used in offer listings.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = match self.steps.len() {
            0 => String::new(),
            1 => " (1 step)".to_string(),
            n => format!(" ({n} steps)"),
        };

        writeln!(f, "## {} (ID: {}){steps}", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        writeln!(f, "- **Bot type**: {}", self.bot_type)?;
        if let Some(username) = &self.telegram_username {
            writeln!(f, "- **Telegram**: @{username}")?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {} (ID: {})", self.step_no, self.name, self.id)?;
        writeln!(f)?;

        if let Some(source) = self.duplicated_from {
            writeln!(f, "Duplicated from step {source}.")?;
            writeln!(f)?;
        }

        let has_settings = self.settings.as_object().is_some_and(|map| !map.is_empty());
        if has_settings {
            fmt_json_block(f, &self.settings)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for Acquirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_active { "active" } else { "inactive" };
        writeln!(f, "## {} (ID: {}, {state})", self.name, self.id)?;
        writeln!(f)?;

        if let Some(provider) = &self.provider {
            writeln!(f, "- **Provider**: {provider}")?;
        }
        if let Some(endpoint) = &self.endpoint {
            writeln!(f, "- **Endpoint**: {endpoint}")?;
        }
        match &self.token {
            Some(token) => writeln!(f, "- **Token**: {}", mask_secret(token))?,
            None => writeln!(f, "- **Token**: not set")?,
        }
        if self.webhook_secret.is_some() {
            writeln!(f, "- **Webhook secret**: set")?;
        }
        writeln!(f, "- **Updated**: {}", LocalDateTime(&self.updated_at))?;

        if let Some(extra) = &self.extra {
            writeln!(f)?;
            fmt_json_block(f, extra)?;
        }
        writeln!(f)
    }
}
