//! MCP tool handlers implementation

use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tigerfy_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params as core, Backoffice, Session,
};

use super::errors::to_mcp_error;

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// Core parameter types only derive `JsonSchema` behind the `schema` feature
// and know nothing about rmcp. The transparent wrapper below passes
// deserialization and the schema straight through to the wrapped type.

/// Generic MCP wrapper for core parameter types with serde integration
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> McpParams<T>
where
    T: JsonSchema,
{
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type OfferRef = McpParams<core::OfferRef>;
pub type CreateOffer = McpParams<core::CreateOffer>;
pub type SaveBotToken = McpParams<core::SaveBotToken>;
pub type DeleteOffer = McpParams<core::DeleteOffer>;
pub type SetCurrentStep = McpParams<core::SetCurrentStep>;
pub type ResolveCurrentStep = McpParams<core::ResolveCurrentStep>;
pub type CreateStep = McpParams<core::CreateStep>;
pub type StepRef = McpParams<core::StepRef>;
pub type RenameStep = McpParams<core::RenameStep>;
pub type UpdateStepSettings = McpParams<core::UpdateStepSettings>;
pub type ReorderSteps = McpParams<core::ReorderSteps>;
pub type AcquirerRef = McpParams<core::AcquirerRef>;
pub type CreateAcquirer = McpParams<core::CreateAcquirer>;
pub type UpdateAcquirer = McpParams<core::UpdateAcquirer>;
pub type UpsertAcquirer = McpParams<core::UpsertAcquirer>;
pub type ListAcquirers = McpParams<core::ListAcquirers>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl std::fmt::Display) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    backoffice: Backoffice,
    session: Session,
}

impl McpHandlers {
    pub fn new(backoffice: Backoffice, session: Session) -> Self {
        Self {
            backoffice,
            session,
        }
    }

    pub async fn create_offer(&self, Parameters(params): Parameters<CreateOffer>) -> McpResult {
        debug!("create_offer: {params:?}");

        let offer = self
            .backoffice
            .create_offer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create offer", e))?;
        text(CreateResult::new(offer))
    }

    pub async fn list_offers(&self) -> McpResult {
        debug!("list_offers");

        let offers = self
            .backoffice
            .list_offers(&self.session)
            .await
            .map_err(|e| to_mcp_error("Failed to list offers", e))?;

        if offers.is_empty() {
            text(offers)
        } else {
            text(format!("# Offers\n\n{offers}"))
        }
    }

    pub async fn show_offer(&self, Parameters(params): Parameters<OfferRef>) -> McpResult {
        debug!("show_offer: {params:?}");

        let offer = self
            .backoffice
            .get_offer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get offer", e))?;
        text(offer)
    }

    pub async fn save_bot_token(&self, Parameters(params): Parameters<SaveBotToken>) -> McpResult {
        // Parameters carry the raw token; log the offer only.
        debug!("save_bot_token: offer {}", params.as_ref().offer_id);

        let offer = self
            .backoffice
            .save_bot_token(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to save bot token", e))?;

        let change = if offer.bot_token.is_some() {
            "bot token stored"
        } else {
            "bot token cleared"
        };
        text(UpdateResult::with_changes(offer, vec![change.to_string()]))
    }

    pub async fn delete_offer(&self, Parameters(params): Parameters<DeleteOffer>) -> McpResult {
        debug!("delete_offer: {params:?}");

        let offer = self
            .backoffice
            .delete_offer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete offer", e))?;
        text(DeleteResult::new(offer))
    }

    pub async fn set_current_step(
        &self,
        Parameters(params): Parameters<SetCurrentStep>,
    ) -> McpResult {
        debug!("set_current_step: {params:?}");

        let offer = self
            .backoffice
            .set_current_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to set current step", e))?;

        let message = match offer.current_step_id {
            Some(step_id) => format!("Offer {} now opens on step {step_id}", offer.id),
            None => format!("Offer {} has no current step", offer.id),
        };
        text(OperationStatus::success(message))
    }

    pub async fn resolve_current_step(
        &self,
        Parameters(params): Parameters<ResolveCurrentStep>,
    ) -> McpResult {
        debug!("resolve_current_step: {params:?}");

        let offer_id = params.as_ref().offer_id;
        let step = self
            .backoffice
            .resolve_current_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to resolve current step", e))?;

        match step {
            Some(step) => text(step),
            None => text(OperationStatus::success(format!(
                "Offer {offer_id} has no steps yet"
            ))),
        }
    }

    pub async fn ensure_first_step(&self, Parameters(params): Parameters<OfferRef>) -> McpResult {
        debug!("ensure_first_step: {params:?}");

        let step = self
            .backoffice
            .ensure_first_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to initialize steps", e))?;
        text(step)
    }

    pub async fn next_step_number(&self, Parameters(params): Parameters<OfferRef>) -> McpResult {
        debug!("next_step_number: {params:?}");

        let offer_id = params.as_ref().offer_id;
        let next = self
            .backoffice
            .next_step_number(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to compute next step number", e))?;
        text(OperationStatus::success(format!(
            "Next step number for offer {offer_id}: {next}"
        )))
    }

    pub async fn create_step(&self, Parameters(params): Parameters<CreateStep>) -> McpResult {
        debug!("create_step: {params:?}");

        let step = self
            .backoffice
            .create_step(&self.session, params.into_inner())
            .await
            .map_err(|e| to_mcp_error("Failed to create step", e))?;
        text(CreateResult::new(step))
    }

    pub async fn rename_step(&self, Parameters(params): Parameters<RenameStep>) -> McpResult {
        debug!("rename_step: {params:?}");

        let step = self
            .backoffice
            .rename_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to rename step", e))?;
        text(UpdateResult::with_changes(step, vec!["name".to_string()]))
    }

    pub async fn update_step_settings(
        &self,
        Parameters(params): Parameters<UpdateStepSettings>,
    ) -> McpResult {
        debug!("update_step_settings: {params:?}");

        let step = self
            .backoffice
            .update_step_settings(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update step", e))?;
        text(UpdateResult::new(step))
    }

    pub async fn delete_step(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        debug!("delete_step: {params:?}");

        let step = self
            .backoffice
            .delete_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete step", e))?;
        text(DeleteResult::new(step))
    }

    pub async fn reorder_steps(&self, Parameters(params): Parameters<ReorderSteps>) -> McpResult {
        debug!("reorder_steps: {params:?}");

        let steps = self
            .backoffice
            .reorder_steps(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to reorder steps", e))?;
        text(steps)
    }

    pub async fn list_steps(&self, Parameters(params): Parameters<OfferRef>) -> McpResult {
        debug!("list_steps: {params:?}");

        let steps = self
            .backoffice
            .list_steps(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list steps", e))?;
        text(steps)
    }

    pub async fn show_step(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        debug!("show_step: {params:?}");

        let step = self
            .backoffice
            .get_step(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get step", e))?;
        text(step)
    }

    pub async fn create_acquirer(
        &self,
        Parameters(params): Parameters<CreateAcquirer>,
    ) -> McpResult {
        debug!("create_acquirer: provider {:?}", params.as_ref().provider);

        let acquirer = self
            .backoffice
            .create_acquirer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create acquirer", e))?;
        text(CreateResult::new(acquirer))
    }

    pub async fn list_acquirers(&self, Parameters(params): Parameters<ListAcquirers>) -> McpResult {
        debug!("list_acquirers: {params:?}");

        let acquirers = self
            .backoffice
            .list_acquirers(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list acquirers", e))?;
        text(acquirers)
    }

    pub async fn show_acquirer(&self, Parameters(params): Parameters<AcquirerRef>) -> McpResult {
        debug!("show_acquirer: {params:?}");

        let acquirer = self
            .backoffice
            .get_acquirer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get acquirer", e))?;
        text(acquirer)
    }

    pub async fn update_acquirer(
        &self,
        Parameters(params): Parameters<UpdateAcquirer>,
    ) -> McpResult {
        debug!("update_acquirer: {}", params.as_ref().id);

        let (acquirer, patch) = self
            .backoffice
            .update_acquirer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update acquirer", e))?;
        let changes = patch
            .changed_fields()
            .into_iter()
            .map(String::from)
            .collect();
        text(UpdateResult::with_changes(acquirer, changes))
    }

    pub async fn upsert_acquirer(
        &self,
        Parameters(params): Parameters<UpsertAcquirer>,
    ) -> McpResult {
        debug!("upsert_acquirer: {}", params.as_ref().name);

        let (acquirer, created) = self
            .backoffice
            .upsert_acquirer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to upsert acquirer", e))?;
        if created {
            text(CreateResult::new(acquirer))
        } else {
            text(UpdateResult::new(acquirer))
        }
    }

    pub async fn remove_acquirer(&self, Parameters(params): Parameters<AcquirerRef>) -> McpResult {
        debug!("remove_acquirer: {params:?}");

        let acquirer = self
            .backoffice
            .remove_acquirer(&self.session, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to remove acquirer", e))?;
        text(DeleteResult::new(acquirer))
    }
}
