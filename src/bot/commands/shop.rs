//! Shop Discord commands - `categories`, `find_product`, `reload_catalogue` and `catalogue_status`.
//!
//! These commands are a thin front end over [`Shop`](crate::core::shop::Shop): they parse
//! Discord input, call one shop operation, and format the result as a message or embed.

use crate::core::{selection::Selection, strategy::StrategyKind};
use poise::serenity_prelude as serenity;

/// Longest category list that still fits an embed description.
const MAX_DESCRIPTION_LEN: usize = 4000;

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{format_category_list, selection_embed};
    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::strategy::StrategyKind,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Strategy choices offered in the `find_product` command.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StrategyChoice {
        #[name = "The cheapest 🤑"]
        Cheapest,
        #[name = "The most expensive 💎"]
        MostExpensive,
        #[name = "Best value ⚖️"]
        BestValue,
        #[name = "Surprise me! 🎲"]
        Random,
    }

    impl From<StrategyChoice> for StrategyKind {
        fn from(choice: StrategyChoice) -> Self {
            match choice {
                StrategyChoice::Cheapest => Self::Cheapest,
                StrategyChoice::MostExpensive => Self::MostExpensive,
                StrategyChoice::BestValue => Self::BestValue,
                StrategyChoice::Random => Self::Random,
            }
        }
    }

    /// Lists every product category in the catalogue.
    #[poise::command(slash_command)]
    pub async fn categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let categories = ctx.data().shop.load_categories().await?;

        if categories.is_empty() {
            ctx.say("The catalogue is empty. Use `/reload_catalogue` to load it.")
                .await?;
            return Ok(());
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Categories ({})**", categories.len()))
            .color(0x0058_65F2)
            .description(format_category_list(&categories));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Picks one product from a category using a shopping strategy.
    #[poise::command(slash_command)]
    pub async fn find_product(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product category (exact name)"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "How to pick the product"] strategy: StrategyChoice,
    ) -> Result<()> {
        let strategy = StrategyKind::from(strategy);

        let Some(selection) = ctx.data().shop.find_product(&category, strategy).await? else {
            ctx.say(format!("❌ No products found in category '{category}'."))
                .await?;
            return Ok(());
        };

        ctx.send(poise::CreateReply::default().embed(selection_embed(&selection)))
            .await?;
        Ok(())
    }

    /// Deletes the stored catalogue and loads it again from its source file.
    ///
    /// The replacement is atomic: if the file is missing or holds an invalid price,
    /// the current catalogue stays in place.
    #[poise::command(slash_command, default_member_permissions = "MANAGE_GUILD")]
    pub async fn reload_catalogue(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;

        match ctx.data().shop.reload_catalogue().await {
            Ok(report) => {
                let mut message = format!("✅ Catalogue reloaded with **{}** products.", report.inserted);
                if report.skipped_malformed > 0 {
                    message.push_str(&format!(
                        "\n⚠️ Skipped {} malformed rows.",
                        report.skipped_malformed
                    ));
                }
                if report.skipped_invalid > 0 {
                    message.push_str(&format!(
                        "\n⚠️ Skipped {} rows with invalid prices.",
                        report.skipped_invalid
                    ));
                }
                if report.ignored_conflicts > 0 {
                    message.push_str(&format!(
                        "\n⚠️ Ignored {} duplicate rows.",
                        report.ignored_conflicts
                    ));
                }
                ctx.say(message).await?;
            }
            Err(e @ (Error::SourceUnavailable { .. } | Error::InvalidNumericField { .. })) => {
                ctx.say(format!(
                    "❌ Catalogue not reloaded, the previous one is still in place: {e}"
                ))
                .await?;
            }
            Err(e) => {
                ctx.say("❌ Failed to reload the catalogue. Please try again later.")
                    .await?;
                return Err(e);
            }
        }

        Ok(())
    }

    /// Shows how many products are loaded and when the catalogue was last loaded.
    #[poise::command(slash_command)]
    pub async fn catalogue_status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let status = ctx.data().shop.catalogue_status().await?;

        let loaded_at = status.loaded_at.map_or_else(
            || "never".to_string(),
            |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );

        let embed = serenity::CreateEmbed::default()
            .title("**Catalogue Status**")
            .color(0x0058_65F2)
            .field("Products", status.product_count.to_string(), true)
            .field("Last loaded", loaded_at, true);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

/// Formats categories as a bullet list, cut off before it overflows an embed.
fn format_category_list(categories: &[String]) -> String {
    let mut list = String::new();
    for (shown, category) in categories.iter().enumerate() {
        let line = format!("• {category}\n");
        if list.len() + line.len() > MAX_DESCRIPTION_LEN {
            list.push_str(&format!("…and {} more", categories.len() - shown));
            break;
        }
        list.push_str(&line);
    }
    list
}

/// Builds the embed showing a selected product.
fn selection_embed(selection: &Selection) -> serenity::CreateEmbed {
    let strategy: StrategyKind = selection.strategy;
    let product = &selection.product;

    serenity::CreateEmbed::default()
        .title(strategy.headline())
        .description(format!("**{}**", product.name))
        .color(strategy.color())
        .field("Category", &product.category, true)
        .field("Supermarket", &product.supermarket, true)
        .field("Price", format!("{:.2}", product.price), true)
        .field(
            "Reference price",
            format!("{:.2} / {}", product.reference_price, product.reference_unit),
            true,
        )
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Strategy: {}",
            strategy.label()
        )))
}
