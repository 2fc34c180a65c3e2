//! Command-line argument wrappers and the command handler.
//!
//! The argument structs carry the clap derives; each converts into the
//! matching core parameter type so `tigerfy_core::params` stays free of CLI
//! concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Backoffice
//! ```
//!
//! Output always goes through the core `Display` implementations, so the CLI
//! prints the same markdown the MCP server returns.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use tigerfy_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params::*,
    Backoffice, Session, SettingsInput,
};

use crate::renderer::TerminalRenderer;

fn parse_json(raw: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

// ============================================================================
// Offer arguments
// ============================================================================

/// Create a new offer
#[derive(Args)]
pub struct CreateOfferArgs {
    /// Name of the offer
    pub name: String,
    #[arg(
        short,
        long,
        help = "Bot flavour: standard, wiin_flow or manychat_flow"
    )]
    pub bot_type: Option<String>,
    #[arg(
        short,
        long,
        help = "Tracking: facebook_pixel, utmify_pixel, utmify_facebook_pixel or self_hosted"
    )]
    pub tracking_type: Option<String>,
}

impl From<CreateOfferArgs> for CreateOffer {
    fn from(val: CreateOfferArgs) -> Self {
        CreateOffer {
            name: val.name,
            bot_type: val.bot_type,
            tracking_type: val.tracking_type,
        }
    }
}

/// Identify an offer
#[derive(Args)]
pub struct OfferArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
}

impl From<OfferArgs> for OfferRef {
    fn from(val: OfferArgs) -> Self {
        OfferRef {
            offer_id: val.offer_id,
        }
    }
}

/// Store or clear the Telegram bot credentials of an offer
///
/// Leaving out `--token` clears the stored token and moves the offer back to
/// the incomplete state.
#[derive(Args)]
pub struct SaveBotTokenArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(long, help = "Telegram bot token issued by BotFather")]
    pub token: Option<String>,
    #[arg(short, long, help = "Telegram username of the bot, with or without '@'")]
    pub username: Option<String>,
}

impl From<SaveBotTokenArgs> for SaveBotToken {
    fn from(val: SaveBotTokenArgs) -> Self {
        SaveBotToken {
            offer_id: val.offer_id,
            bot_token: val.token,
            telegram_username: val.username,
        }
    }
}

/// Point the offer at one of its steps
#[derive(Args)]
pub struct FocusStepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(help = "Step to open by default; leave out to clear the pointer")]
    pub step_id: Option<u64>,
}

impl From<FocusStepArgs> for SetCurrentStep {
    fn from(val: FocusStepArgs) -> Self {
        SetCurrentStep {
            offer_id: val.offer_id,
            step_id: val.step_id,
        }
    }
}

/// Show the step the offer panel would open
#[derive(Args)]
pub struct CurrentStepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(long, help = "Prefer this step ID")]
    pub step_id: Option<u64>,
    #[arg(long, help = "Prefer the step with this number")]
    pub step_no: Option<u32>,
}

impl From<CurrentStepArgs> for ResolveCurrentStep {
    fn from(val: CurrentStepArgs) -> Self {
        ResolveCurrentStep {
            offer_id: val.offer_id,
            step_id: val.step_id,
            step_no: val.step_no,
        }
    }
}

/// Delete an offer and all of its steps
#[derive(Args)]
pub struct DeleteOfferArgs {
    #[arg(help = "Unique identifier of the offer to permanently delete")]
    pub offer_id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

impl From<DeleteOfferArgs> for DeleteOffer {
    fn from(val: DeleteOfferArgs) -> Self {
        DeleteOffer {
            offer_id: val.offer_id,
            confirmed: val.confirm,
        }
    }
}

#[derive(Subcommand)]
pub enum OfferCommands {
    /// Create a new offer
    #[command(alias = "c")]
    Create(CreateOfferArgs),
    /// List your offers, newest first
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show an offer with its steps
    #[command(alias = "s")]
    Show(OfferArgs),
    /// Store or clear the bot token of an offer
    #[command(alias = "t")]
    Token(SaveBotTokenArgs),
    /// Set or clear the step the offer opens on
    #[command(alias = "f")]
    Focus(FocusStepArgs),
    /// Show the step the offer opens on
    Current(CurrentStepArgs),
    /// Delete an offer permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteOfferArgs),
}

// ============================================================================
// Step arguments
// ============================================================================

/// Append a step to an offer
#[derive(Args)]
pub struct AddStepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(short, long, help = "Step name; defaults to 'Step <number>'")]
    pub name: Option<String>,
    #[arg(short, long, help = "Settings as a JSON object")]
    pub settings: Option<String>,
    #[arg(
        short,
        long,
        help = "Copy the settings of this step of the same offer"
    )]
    pub duplicate_from: Option<u64>,
}

impl From<AddStepArgs> for CreateStep {
    fn from(val: AddStepArgs) -> Self {
        CreateStep {
            offer_id: val.offer_id,
            name: val.name,
            settings: val.settings.map(SettingsInput::Encoded),
            duplicate_from: val.duplicate_from,
        }
    }
}

/// Identify a step of an offer
#[derive(Args)]
pub struct StepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(help = "Unique identifier of the step")]
    pub step_id: u64,
}

impl From<StepArgs> for StepRef {
    fn from(val: StepArgs) -> Self {
        StepRef {
            offer_id: val.offer_id,
            step_id: val.step_id,
        }
    }
}

/// Rename a step
#[derive(Args)]
pub struct RenameStepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(help = "Unique identifier of the step")]
    pub step_id: u64,
    /// New name of the step
    pub name: String,
}

impl From<RenameStepArgs> for RenameStep {
    fn from(val: RenameStepArgs) -> Self {
        RenameStep {
            offer_id: val.offer_id,
            step_id: val.step_id,
            name: val.name,
        }
    }
}

/// Update the name and/or settings of a step
///
/// Settings replace the stored document as a whole. Settings that are not a
/// JSON object are ignored, and when nothing usable is given the step is left
/// untouched.
#[derive(Args)]
pub struct UpdateStepArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(help = "Unique identifier of the step")]
    pub step_id: u64,
    #[arg(short, long, help = "New name of the step")]
    pub name: Option<String>,
    #[arg(short, long, help = "New settings as a JSON object")]
    pub settings: Option<String>,
}

impl From<UpdateStepArgs> for UpdateStepSettings {
    fn from(val: UpdateStepArgs) -> Self {
        UpdateStepSettings {
            offer_id: val.offer_id,
            step_id: val.step_id,
            name: val.name,
            settings: val.settings.map(SettingsInput::Encoded),
        }
    }
}

/// Put every step of an offer in a new order
#[derive(Args)]
pub struct ReorderStepsArgs {
    #[arg(help = "Unique identifier of the offer")]
    pub offer_id: u64,
    #[arg(
        value_delimiter = ',',
        required = true,
        help = "All step IDs of the offer in their new order, comma-separated"
    )]
    pub step_ids: Vec<u64>,
}

impl From<ReorderStepsArgs> for ReorderSteps {
    fn from(val: ReorderStepsArgs) -> Self {
        ReorderSteps {
            offer_id: val.offer_id,
            step_ids: val.step_ids,
        }
    }
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Append a step to an offer
    #[command(alias = "a")]
    Add(AddStepArgs),
    /// Show the number the next step would get
    #[command(alias = "n")]
    Next(OfferArgs),
    /// Create the first step of an offer unless it has steps already
    Init(OfferArgs),
    /// Rename a step
    #[command(alias = "r")]
    Rename(RenameStepArgs),
    /// Update the name and/or settings of a step
    #[command(alias = "u")]
    Update(UpdateStepArgs),
    /// Delete a step and renumber the rest
    #[command(aliases = ["d", "rm"])]
    Delete(StepArgs),
    /// Put every step of an offer in a new order
    #[command(alias = "o")]
    Reorder(ReorderStepsArgs),
    /// List the steps of an offer in order
    #[command(aliases = ["l", "ls"])]
    List(OfferArgs),
    /// Show one step
    #[command(alias = "s")]
    Show(StepArgs),
}

// ============================================================================
// Acquirer arguments
// ============================================================================

/// Store a new acquirer
#[derive(Args)]
pub struct AddAcquirerArgs {
    #[arg(short, long, help = "Display name; defaults to 'Unnamed'")]
    pub name: Option<String>,
    #[arg(short, long, help = "Payment provider, e.g. pushinpay or wiinpay")]
    pub provider: Option<String>,
    #[arg(long, help = "API token of the provider")]
    pub token: Option<String>,
    #[arg(long, help = "Secret used to verify provider webhooks")]
    pub webhook_secret: Option<String>,
    #[arg(long, help = "Custom API endpoint")]
    pub endpoint: Option<String>,
    #[arg(long, help = "Store the acquirer as inactive")]
    pub inactive: bool,
    #[arg(long, value_parser = parse_json, help = "Extra provider data as JSON")]
    pub extra: Option<Value>,
}

impl From<AddAcquirerArgs> for CreateAcquirer {
    fn from(val: AddAcquirerArgs) -> Self {
        CreateAcquirer {
            name: val.name,
            provider: val.provider,
            token: val.token,
            webhook_secret: val.webhook_secret,
            endpoint: val.endpoint,
            is_active: Some(!val.inactive),
            extra: val.extra,
        }
    }
}

/// List acquirers
#[derive(Args)]
pub struct ListAcquirersArgs {
    #[arg(long, help = "Only active (true) or inactive (false) acquirers")]
    pub active: Option<bool>,
    #[arg(short, long, help = "Case-insensitive part of the name")]
    pub name: Option<String>,
    #[arg(short, long, help = "Case-insensitive part of the provider")]
    pub provider: Option<String>,
}

impl From<ListAcquirersArgs> for ListAcquirers {
    fn from(val: ListAcquirersArgs) -> Self {
        ListAcquirers {
            active: val.active,
            name: val.name,
            provider: val.provider,
        }
    }
}

/// Identify an acquirer
#[derive(Args)]
pub struct AcquirerArgs {
    #[arg(help = "Unique identifier of the acquirer")]
    pub id: u64,
}

impl From<AcquirerArgs> for AcquirerRef {
    fn from(val: AcquirerArgs) -> Self {
        AcquirerRef { id: val.id }
    }
}

/// Change fields of an acquirer
#[derive(Args)]
pub struct UpdateAcquirerArgs {
    #[arg(help = "Unique identifier of the acquirer")]
    pub id: u64,
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub webhook_secret: Option<String>,
    #[arg(long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long, value_parser = parse_json)]
    pub extra: Option<Value>,
}

impl From<UpdateAcquirerArgs> for UpdateAcquirer {
    fn from(val: UpdateAcquirerArgs) -> Self {
        UpdateAcquirer {
            id: val.id,
            name: val.name,
            provider: val.provider,
            token: val.token,
            webhook_secret: val.webhook_secret,
            endpoint: val.endpoint,
            is_active: val.active,
            extra: val.extra,
        }
    }
}

/// Create an acquirer, or update the one with the same name
#[derive(Args)]
pub struct UpsertAcquirerArgs {
    /// Exact name to look up
    pub name: String,
    #[arg(short, long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub webhook_secret: Option<String>,
    #[arg(long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long, value_parser = parse_json)]
    pub extra: Option<Value>,
}

impl From<UpsertAcquirerArgs> for UpsertAcquirer {
    fn from(val: UpsertAcquirerArgs) -> Self {
        UpsertAcquirer {
            name: val.name,
            provider: val.provider,
            token: val.token,
            webhook_secret: val.webhook_secret,
            endpoint: val.endpoint,
            is_active: val.active,
            extra: val.extra,
        }
    }
}

#[derive(Subcommand)]
pub enum AcquirerCommands {
    /// Store a new acquirer
    #[command(alias = "a")]
    Add(AddAcquirerArgs),
    /// List acquirers, newest first
    #[command(aliases = ["l", "ls"])]
    List(ListAcquirersArgs),
    /// Show one acquirer
    #[command(alias = "s")]
    Show(AcquirerArgs),
    /// Change fields of an acquirer
    #[command(alias = "u")]
    Update(UpdateAcquirerArgs),
    /// Create or update an acquirer by name
    Upsert(UpsertAcquirerArgs),
    /// Remove an acquirer
    #[command(aliases = ["d", "rm"])]
    Remove(AcquirerArgs),
}

// ============================================================================
// Command handler
// ============================================================================

/// Runs parsed commands against the backoffice and renders the result.
pub struct Cli {
    backoffice: Backoffice,
    session: Session,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(backoffice: Backoffice, session: Session, renderer: TerminalRenderer) -> Self {
        Self {
            backoffice,
            session,
            renderer,
        }
    }

    pub async fn handle_offer_command(&self, command: OfferCommands) -> Result<()> {
        match command {
            OfferCommands::Create(args) => self.create_offer(args).await,
            OfferCommands::List => self.list_offers().await,
            OfferCommands::Show(args) => self.show_offer(args).await,
            OfferCommands::Token(args) => self.save_bot_token(args).await,
            OfferCommands::Focus(args) => self.focus_step(args).await,
            OfferCommands::Current(args) => self.current_step(args).await,
            OfferCommands::Delete(args) => self.delete_offer(args).await,
        }
    }

    pub async fn handle_step_command(&self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Add(args) => self.add_step(args).await,
            StepCommands::Next(args) => self.next_step_number(args).await,
            StepCommands::Init(args) => self.init_steps(args).await,
            StepCommands::Rename(args) => self.rename_step(args).await,
            StepCommands::Update(args) => self.update_step(args).await,
            StepCommands::Delete(args) => self.delete_step(args).await,
            StepCommands::Reorder(args) => self.reorder_steps(args).await,
            StepCommands::List(args) => self.list_steps(args).await,
            StepCommands::Show(args) => self.show_step(args).await,
        }
    }

    pub async fn handle_acquirer_command(&self, command: AcquirerCommands) -> Result<()> {
        match command {
            AcquirerCommands::Add(args) => self.add_acquirer(args).await,
            AcquirerCommands::List(args) => self.list_acquirers(args).await,
            AcquirerCommands::Show(args) => self.show_acquirer(args).await,
            AcquirerCommands::Update(args) => self.update_acquirer(args).await,
            AcquirerCommands::Upsert(args) => self.upsert_acquirer(args).await,
            AcquirerCommands::Remove(args) => self.remove_acquirer(args).await,
        }
    }

    fn render(&self, output: impl std::fmt::Display) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    pub async fn list_offers(&self) -> Result<()> {
        let offers = self
            .backoffice
            .list_offers(&self.session)
            .await
            .context("Failed to list offers")?;
        self.render(offers)
    }

    async fn create_offer(&self, args: CreateOfferArgs) -> Result<()> {
        let offer = self
            .backoffice
            .create_offer(&self.session, &args.into())
            .await
            .context("Failed to create offer")?;
        self.render(CreateResult::new(offer))
    }

    async fn show_offer(&self, args: OfferArgs) -> Result<()> {
        let offer = self
            .backoffice
            .get_offer(&self.session, &args.into())
            .await
            .context("Failed to get offer")?;
        self.render(offer)
    }

    async fn save_bot_token(&self, args: SaveBotTokenArgs) -> Result<()> {
        let params: SaveBotToken = args.into();
        let offer = self
            .backoffice
            .save_bot_token(&self.session, &params)
            .await
            .context("Failed to save bot token")?;

        let changes = if params.bot_token.is_some() {
            vec!["bot token stored".to_string()]
        } else {
            vec!["bot token cleared".to_string()]
        };
        self.render(UpdateResult::with_changes(offer, changes))
    }

    async fn focus_step(&self, args: FocusStepArgs) -> Result<()> {
        let offer = self
            .backoffice
            .set_current_step(&self.session, &args.into())
            .await
            .context("Failed to set current step")?;

        let message = match offer.current_step_id {
            Some(step_id) => format!("Offer {} now opens on step {step_id}", offer.id),
            None => format!("Offer {} has no current step", offer.id),
        };
        self.render(OperationStatus::success(message))
    }

    async fn current_step(&self, args: CurrentStepArgs) -> Result<()> {
        let offer_id = args.offer_id;
        let step = self
            .backoffice
            .resolve_current_step(&self.session, &args.into())
            .await
            .context("Failed to resolve current step")?;

        match step {
            Some(step) => self.render(step),
            None => self.render(OperationStatus::success(format!(
                "Offer {offer_id} has no steps yet"
            ))),
        }
    }

    async fn delete_offer(&self, args: DeleteOfferArgs) -> Result<()> {
        let offer = self
            .backoffice
            .delete_offer(&self.session, &args.into())
            .await
            .context("Failed to delete offer")?;
        self.render(DeleteResult::new(offer))
    }

    async fn add_step(&self, args: AddStepArgs) -> Result<()> {
        let step = self
            .backoffice
            .create_step(&self.session, args.into())
            .await
            .context("Failed to create step")?;
        self.render(CreateResult::new(step))
    }

    async fn next_step_number(&self, args: OfferArgs) -> Result<()> {
        let offer_id = args.offer_id;
        let next = self
            .backoffice
            .next_step_number(&self.session, &args.into())
            .await
            .context("Failed to compute next step number")?;
        self.render(OperationStatus::success(format!(
            "Next step number for offer {offer_id}: {next}"
        )))
    }

    async fn init_steps(&self, args: OfferArgs) -> Result<()> {
        let step = self
            .backoffice
            .ensure_first_step(&self.session, &args.into())
            .await
            .context("Failed to initialize steps")?;
        self.render(step)
    }

    async fn rename_step(&self, args: RenameStepArgs) -> Result<()> {
        let step = self
            .backoffice
            .rename_step(&self.session, &args.into())
            .await
            .context("Failed to rename step")?;
        self.render(UpdateResult::with_changes(step, vec!["name".to_string()]))
    }

    async fn update_step(&self, args: UpdateStepArgs) -> Result<()> {
        let step = self
            .backoffice
            .update_step_settings(&self.session, &args.into())
            .await
            .context("Failed to update step")?;
        self.render(UpdateResult::new(step))
    }

    async fn delete_step(&self, args: StepArgs) -> Result<()> {
        let step = self
            .backoffice
            .delete_step(&self.session, &args.into())
            .await
            .context("Failed to delete step")?;
        self.render(DeleteResult::new(step))
    }

    async fn reorder_steps(&self, args: ReorderStepsArgs) -> Result<()> {
        let steps = self
            .backoffice
            .reorder_steps(&self.session, &args.into())
            .await
            .context("Failed to reorder steps")?;
        self.render(steps)
    }

    async fn list_steps(&self, args: OfferArgs) -> Result<()> {
        let steps = self
            .backoffice
            .list_steps(&self.session, &args.into())
            .await
            .context("Failed to list steps")?;
        self.render(steps)
    }

    async fn show_step(&self, args: StepArgs) -> Result<()> {
        let step = self
            .backoffice
            .get_step(&self.session, &args.into())
            .await
            .context("Failed to get step")?;
        self.render(step)
    }

    async fn add_acquirer(&self, args: AddAcquirerArgs) -> Result<()> {
        let acquirer = self
            .backoffice
            .create_acquirer(&self.session, &args.into())
            .await
            .context("Failed to create acquirer")?;
        self.render(CreateResult::new(acquirer))
    }

    async fn list_acquirers(&self, args: ListAcquirersArgs) -> Result<()> {
        let acquirers = self
            .backoffice
            .list_acquirers(&self.session, &args.into())
            .await
            .context("Failed to list acquirers")?;
        self.render(acquirers)
    }

    async fn show_acquirer(&self, args: AcquirerArgs) -> Result<()> {
        let acquirer = self
            .backoffice
            .get_acquirer(&self.session, &args.into())
            .await
            .context("Failed to get acquirer")?;
        self.render(acquirer)
    }

    async fn update_acquirer(&self, args: UpdateAcquirerArgs) -> Result<()> {
        let (acquirer, patch) = self
            .backoffice
            .update_acquirer(&self.session, &args.into())
            .await
            .context("Failed to update acquirer")?;
        let changes = patch
            .changed_fields()
            .into_iter()
            .map(String::from)
            .collect();
        self.render(UpdateResult::with_changes(acquirer, changes))
    }

    async fn upsert_acquirer(&self, args: UpsertAcquirerArgs) -> Result<()> {
        let (acquirer, created) = self
            .backoffice
            .upsert_acquirer(&self.session, &args.into())
            .await
            .context("Failed to upsert acquirer")?;
        if created {
            self.render(CreateResult::new(acquirer))
        } else {
            self.render(UpdateResult::new(acquirer))
        }
    }

    async fn remove_acquirer(&self, args: AcquirerArgs) -> Result<()> {
        let acquirer = self
            .backoffice
            .remove_acquirer(&self.session, &args.into())
            .await
            .context("Failed to remove acquirer")?;
        self.render(DeleteResult::new(acquirer))
    }
}
