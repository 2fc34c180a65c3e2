//! Error handling utilities for MCP server

use rmcp::ErrorData;
use tigerfy_core::BackofficeError;

/// Convert a backoffice error into an MCP error.
///
/// Problems with what the caller sent (unknown ids, bad input, the protected
/// first step) become `invalid_params`; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: BackofficeError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        BackofficeError::OfferNotFound { .. }
        | BackofficeError::StepNotFound { .. }
        | BackofficeError::AcquirerNotFound { .. }
        | BackofficeError::InvalidInput { .. }
        | BackofficeError::ProtectedStep { .. }
        | BackofficeError::Unauthenticated => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_caller_mistakes_are_invalid_params() {
        let error = to_mcp_error("Failed to get offer", BackofficeError::OfferNotFound { id: 4 });
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(error.message, "Failed to get offer: Offer with ID 4 not found");
    }

    #[test]
    fn test_conflicts_are_internal_errors() {
        let error = to_mcp_error(
            "Failed to create step",
            BackofficeError::Conflict {
                offer_id: 1,
                step_no: 3,
            },
        );
        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    }
}
