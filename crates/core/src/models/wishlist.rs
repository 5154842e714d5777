use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RecipeName;

/// A recipe on a commander's wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistRecipe {
    /// Wished recipe.
    pub recipe: RecipeName,
    /// Whether the recipe is shown in wishlist summaries.
    pub visible: bool,
}

impl WishlistRecipe {
    /// Entry for `recipe` with the given visibility.
    pub fn new(recipe: RecipeName, visible: bool) -> Self {
        Self { recipe, visible }
    }
}

/// Parse the persisted `recipe:visible,recipe:visible` form.
///
/// Entries naming unknown recipes or missing the visibility flag are dropped.
/// A later duplicate of the same recipe is ignored.
pub fn parse_wishlist(raw: &str) -> Vec<WishlistRecipe> {
    let mut wishlist: Vec<WishlistRecipe> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((name, visible)) = entry.split_once(':') else {
            debug!("dropping malformed wishlist entry {entry:?}");
            continue;
        };
        let Some(recipe) = RecipeName::from_id(name) else {
            debug!("dropping unknown wishlist recipe {name:?}");
            continue;
        };
        if wishlist.iter().any(|existing| existing.recipe == recipe) {
            continue;
        }
        let visible = visible.trim().eq_ignore_ascii_case("true");
        wishlist.push(WishlistRecipe::new(recipe, visible));
    }
    wishlist
}

/// Inverse of [`parse_wishlist`]: `recipe:visible` entries joined by commas.
pub fn serialize_wishlist(wishlist: &[WishlistRecipe]) -> String {
    wishlist
        .iter()
        .map(|entry| format!("{}:{}", entry.recipe.id(), entry.visible))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the legacy global format: a bare comma-joined list of recipe ids,
/// all of which are treated as visible.
pub(crate) fn parse_legacy_wishlist(raw: &str) -> Vec<WishlistRecipe> {
    let mut wishlist: Vec<WishlistRecipe> = Vec::new();
    for recipe in raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(RecipeName::from_id)
    {
        if wishlist.iter().all(|existing| existing.recipe != recipe) {
            wishlist.push(WishlistRecipe::new(recipe, true));
        }
    }
    wishlist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_wishlist_parses_back() {
        let wishlist = vec![
            WishlistRecipe::new(RecipeName::NightVision, true),
            WishlistRecipe::new(RecipeName::Scope, false),
        ];
        let raw = serialize_wishlist(&wishlist);
        assert_eq!(raw, "night_vision:true,scope:false");
        assert_eq!(parse_wishlist(&raw), wishlist);
    }

    #[test]
    fn skips_broken_entries() {
        let parsed = parse_wishlist("night_vision:true,,bogus:true,scope,stability:TRUE");
        assert_eq!(
            parsed,
            vec![
                WishlistRecipe::new(RecipeName::NightVision, true),
                WishlistRecipe::new(RecipeName::Stability, true),
            ]
        );
        assert!(parse_wishlist("").is_empty());
    }

    #[test]
    fn legacy_entries_are_visible() {
        let parsed = parse_legacy_wishlist("night_vision, scope,night_vision,unknown");
        assert_eq!(
            parsed,
            vec![
                WishlistRecipe::new(RecipeName::NightVision, true),
                WishlistRecipe::new(RecipeName::Scope, true),
            ]
        );
    }
}
