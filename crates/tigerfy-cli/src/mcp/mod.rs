//! MCP server implementation for TigerFy
//!
//! Exposes the backoffice operations as Model Context Protocol tools on
//! stdio. The server acts for one owner, fixed when it starts.


use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tigerfy_core::{Backoffice, Session};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

// Re-export parameter types and result type from handlers for external use
pub use handlers::{
    AcquirerRef, CreateAcquirer, CreateOffer, CreateStep, DeleteOffer, ListAcquirers, McpResult,
    OfferRef, RenameStep, ReorderSteps, ResolveCurrentStep, SaveBotToken, SetCurrentStep,
    StepRef, UpdateAcquirer, UpdateStepSettings, UpsertAcquirer,
};

const INSTRUCTIONS: &str = r#"TigerFy is the backoffice of Telegram-bot sales funnels.

## Core Concepts
- **Offers**: a funnel with a bot flavour, a tracking setup and optionally a Telegram bot token. Storing a token makes the offer active.
- **Steps**: the ordered stages of an offer, numbered 1..N without gaps. Each step has a name and a JSON settings object.
- **Acquirers**: payment gateway credentials kept on file.

## Workflow
1. `create_offer`, then `ensure_first_step` to open the builder with step 1
2. `create_step` appends a step; pass `duplicate_from` to copy another step's settings
3. `update_step_settings` replaces name and/or settings; `rename_step` only changes the name
4. `reorder_steps` takes every step ID of the offer in the new order
5. `delete_step` removes a step and renumbers the rest. Step 1 can never be deleted.
6. `save_bot_token` to go live

## Tool Categories
- **Offers**: create_offer, list_offers, show_offer, save_bot_token, set_current_step, resolve_current_step, delete_offer
- **Steps**: ensure_first_step, next_step_number, create_step, rename_step, update_step_settings, delete_step, reorder_steps, list_steps, show_step
- **Acquirers**: create_acquirer, list_acquirers, show_acquirer, update_acquirer, upsert_acquirer, remove_acquirer"#;

/// MCP server for TigerFy
#[derive(Clone)]
pub struct TigerfyMcpServer {
    backoffice: Backoffice,
    session: Session,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TigerfyMcpServer {
    /// Create a server acting for the owner of `session`
    pub fn new(backoffice: Backoffice, session: Session) -> Self {
        Self {
            backoffice,
            session,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.backoffice.clone(), self.session.clone())
    }

    #[tool(
        name = "create_offer",
        description = "Create a new offer (sales funnel). Requires a name. Optional bot_type (standard, wiin_flow, manychat_flow) and tracking_type (facebook_pixel, utmify_pixel, utmify_facebook_pixel, self_hosted). The offer starts incomplete and without steps."
    )]
    async fn create_offer(&self, params: Parameters<CreateOffer>) -> McpResult {
        self.handlers().create_offer(params).await
    }

    #[tool(
        name = "list_offers",
        description = "List your offers, newest first, with status and step count."
    )]
    async fn list_offers(&self) -> McpResult {
        self.handlers().list_offers().await
    }

    #[tool(
        name = "show_offer",
        description = "Show an offer with its metadata and all steps in order, including each step's settings."
    )]
    async fn show_offer(&self, params: Parameters<OfferRef>) -> McpResult {
        self.handlers().show_offer(params).await
    }

    #[tool(
        name = "save_bot_token",
        description = "Store the Telegram bot token and username of an offer. A stored token makes the offer active; an empty or missing token clears it and the offer goes back to incomplete."
    )]
    async fn save_bot_token(&self, params: Parameters<SaveBotToken>) -> McpResult {
        self.handlers().save_bot_token(params).await
    }

    #[tool(
        name = "set_current_step",
        description = "Choose the step an offer opens on. Leave step_id out to clear it."
    )]
    async fn set_current_step(&self, params: Parameters<SetCurrentStep>) -> McpResult {
        self.handlers().set_current_step(params).await
    }

    #[tool(
        name = "resolve_current_step",
        description = "Show the step an offer opens on. A step_id or step_no is tried first, then the stored current step, then step 1."
    )]
    async fn resolve_current_step(&self, params: Parameters<ResolveCurrentStep>) -> McpResult {
        self.handlers().resolve_current_step(params).await
    }

    #[tool(
        name = "delete_offer",
        description = "Permanently delete an offer and all of its steps. Requires confirmed=true. This cannot be undone."
    )]
    async fn delete_offer(&self, params: Parameters<DeleteOffer>) -> McpResult {
        self.handlers().delete_offer(params).await
    }

    #[tool(
        name = "ensure_first_step",
        description = "Make sure the offer has at least one step. Creates 'Step 1' for an empty offer, otherwise returns the first step."
    )]
    async fn ensure_first_step(&self, params: Parameters<OfferRef>) -> McpResult {
        self.handlers().ensure_first_step(params).await
    }

    #[tool(
        name = "next_step_number",
        description = "Number the next created step of an offer would get."
    )]
    async fn next_step_number(&self, params: Parameters<OfferRef>) -> McpResult {
        self.handlers().next_step_number(params).await
    }

    #[tool(
        name = "create_step",
        description = "Append a step to an offer. Optional name (defaults to 'Step <n>') and settings (a JSON object, or a string holding one). With duplicate_from, the settings of that step of the same offer are copied and settings is ignored."
    )]
    async fn create_step(&self, params: Parameters<CreateStep>) -> McpResult {
        self.handlers().create_step(params).await
    }

    #[tool(
        name = "rename_step",
        description = "Change the name of a step. The name must not be blank."
    )]
    async fn rename_step(&self, params: Parameters<RenameStep>) -> McpResult {
        self.handlers().rename_step(params).await
    }

    #[tool(
        name = "update_step_settings",
        description = "Update the name and/or settings of a step. Settings replace the stored object as a whole; values that are not a JSON object are ignored. When nothing usable is given the step is returned unchanged."
    )]
    async fn update_step_settings(&self, params: Parameters<UpdateStepSettings>) -> McpResult {
        self.handlers().update_step_settings(params).await
    }

    #[tool(
        name = "delete_step",
        description = "Delete a step and renumber the remaining ones to 1..N in their current order. The first step of an offer cannot be deleted."
    )]
    async fn delete_step(&self, params: Parameters<StepRef>) -> McpResult {
        self.handlers().delete_step(params).await
    }

    #[tool(
        name = "reorder_steps",
        description = "Put the steps of an offer in a new order. step_ids must list every step of the offer exactly once; the step at position i gets number i+1."
    )]
    async fn reorder_steps(&self, params: Parameters<ReorderSteps>) -> McpResult {
        self.handlers().reorder_steps(params).await
    }

    #[tool(
        name = "list_steps",
        description = "List the steps of an offer in order."
    )]
    async fn list_steps(&self, params: Parameters<OfferRef>) -> McpResult {
        self.handlers().list_steps(params).await
    }

    #[tool(name = "show_step", description = "Show one step of an offer.")]
    async fn show_step(&self, params: Parameters<StepRef>) -> McpResult {
        self.handlers().show_step(params).await
    }

    #[tool(
        name = "create_acquirer",
        description = "Store payment gateway credentials. All fields are optional; the name defaults to 'Unnamed' and the acquirer is active unless is_active=false."
    )]
    async fn create_acquirer(&self, params: Parameters<CreateAcquirer>) -> McpResult {
        self.handlers().create_acquirer(params).await
    }

    #[tool(
        name = "list_acquirers",
        description = "List acquirers, newest first. Filter by active flag and by case-insensitive parts of name or provider."
    )]
    async fn list_acquirers(&self, params: Parameters<ListAcquirers>) -> McpResult {
        self.handlers().list_acquirers(params).await
    }

    #[tool(name = "show_acquirer", description = "Show one acquirer. Secrets are masked.")]
    async fn show_acquirer(&self, params: Parameters<AcquirerRef>) -> McpResult {
        self.handlers().show_acquirer(params).await
    }

    #[tool(
        name = "update_acquirer",
        description = "Change the given fields of an acquirer. Fields left out are kept."
    )]
    async fn update_acquirer(&self, params: Parameters<UpdateAcquirer>) -> McpResult {
        self.handlers().update_acquirer(params).await
    }

    #[tool(
        name = "upsert_acquirer",
        description = "Update the acquirer with exactly this name, or create it when there is none."
    )]
    async fn upsert_acquirer(&self, params: Parameters<UpsertAcquirer>) -> McpResult {
        self.handlers().upsert_acquirer(params).await
    }

    #[tool(name = "remove_acquirer", description = "Remove an acquirer permanently.")]
    async fn remove_acquirer(&self, params: Parameters<AcquirerRef>) -> McpResult {
        self.handlers().remove_acquirer(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TigerfyMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tigerfy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: TigerfyMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting TigerFy MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tigerfy_core::BackofficeBuilder;

    use super::*;

    #[tokio::test]
    async fn test_server_registers_every_tool() {
        let temp_dir = TempDir::new().unwrap();
        let backoffice = BackofficeBuilder::new()
            .with_database_path(Some(temp_dir.path().join("mcp.db")))
            .build()
            .await
            .unwrap();

        let server = TigerfyMcpServer::new(backoffice, Session::for_owner("owner-1"));
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names.len(), 22);
        assert!(names.contains(&"reorder_steps".to_string()));
        assert!(names.contains(&"upsert_acquirer".to_string()));

        let info = server.get_info();
        assert_eq!(info.server_info.name, "tigerfy");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
    }
}
