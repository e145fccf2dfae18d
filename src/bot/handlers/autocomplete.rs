//! Autocomplete handlers for Discord slash command parameters.
//!
//! Category suggestions are read from the store on every keystroke, so they always
//! match the catalogue as it is right now, including right after a reload.

use crate::{bot::BotData, errors::Error};

/// Discord accepts at most this many autocomplete choices.
const MAX_CHOICES: usize = 25;

/// Provides autocomplete suggestions for category names.
///
/// Returns up to 25 stored categories containing `partial` (case-insensitive),
/// in ascending order. Store failures yield no suggestions.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(categories) = ctx.data().shop.load_categories().await else {
        return Vec::new();
    };

    filter_categories(categories, partial)
}

/// Keeps the categories containing `partial` (case-insensitive), capped at 25.
#[must_use]
pub fn filter_categories(categories: Vec<String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    categories
        .into_iter()
        .filter(|category| category.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filtered = filter_categories(categories(&["Bebidas", "Fruta", "Frutos secos"]), "fru");
        assert_eq!(filtered, vec!["Fruta", "Frutos secos"]);
    }

    #[test]
    fn test_empty_partial_keeps_everything() {
        let all = categories(&["Bebidas", "Fruta"]);
        assert_eq!(filter_categories(all.clone(), ""), all);
    }

    #[test]
    fn test_filter_caps_at_discord_limit() {
        let many: Vec<String> = (0..40).map(|i| format!("Category {i:02}")).collect();
        let filtered = filter_categories(many, "category");
        assert_eq!(filtered.len(), MAX_CHOICES);
        assert_eq!(filtered[0], "Category 00");
    }
}
