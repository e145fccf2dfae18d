//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `BasketBuddy`, including all slash
//! commands, autocomplete handlers, and bot context management.

/// Discord command implementations (shop, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::shop::Shop,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Shared data available to all bot commands.
/// This structure holds the shop handle every command queries through.
pub struct BotData {
    /// Catalogue and selection operations
    pub shop: Shop,
}

impl BotData {
    /// Creates a new `BotData` instance with the given shop.
    #[must_use]
    pub const fn new(shop: Shop) -> Self {
        Self { shop }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Registers the slash commands and runs the bot until the gateway connection ends.
///
/// # Errors
/// Returns an error if the client cannot be built or the connection fails.
pub async fn run_bot(token: String, shop: Shop) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::categories(),
                commands::find_product(),
                commands::reload_catalogue(),
                commands::catalogue_status(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(shop))
            })
        })
        .build();

    // Slash commands only, no message content needed
    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;

    Ok(())
}

pub use commands::*;
pub use handlers::*;
