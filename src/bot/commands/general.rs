//! General Discord commands - ping and help.
//! These commands don't touch the catalogue.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**BasketBuddy Help**\n\
        Pick a category and a shopping strategy, and BasketBuddy finds the product for you.\n\n\
        **Shopping Commands**\n\
        • `/categories` - Lists every product category in the catalogue.\n\
        • `/find_product <category> <strategy>` - Picks one product: cheapest, most expensive, best value (lowest price per unit) or random.\n\n\
        **Catalogue Commands**\n\
        • `/catalogue_status` - Shows how many products are loaded and when.\n\
        • `/reload_catalogue` - Reloads the catalogue from its source file (requires Manage Server).\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
