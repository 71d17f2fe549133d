use crate::core::types::Selection;
use crate::query::types::{CatalogQuery, OwnershipFilter};

const MAX_SUGGESTIONS: usize = 3;

/// Short labels for every active structural filter, for a results header
pub fn active_filter_summary(query: &CatalogQuery) -> Vec<String> {
    let mut active = Vec::new();

    match query.classifications.len() {
        0 => {}
        1 => {
            if let Some(only) = query.classifications.iter().next() {
                active.push(only.to_string());
            }
        }
        n => active.push(format!("{} expansions", n)),
    }

    if let Selection::Only(category) = &query.category {
        active.push(format!("{} mounts", category));
    }
    if let Selection::Only(faction) = &query.faction {
        active.push(format!("{} faction", faction));
    }
    if let Selection::Only(source_type) = &query.source_type {
        active.push(format!("{} source", source_type));
    }

    match query.ownership {
        OwnershipFilter::Owned => active.push("Owned only".to_string()),
        OwnershipFilter::NotOwned => active.push("Not owned only".to_string()),
        OwnershipFilter::All => {}
    }

    active
}

/// Hints shown when a query returns nothing. Most restrictive filters first,
/// at most three.
pub fn filter_suggestions(query: &CatalogQuery) -> Vec<String> {
    let mut suggestions = Vec::new();

    let has_classification = !query.classifications.is_empty();
    let has_category = !query.category.is_all();
    let has_faction = !query.faction.is_all();
    let has_source_type = !query.source_type.is_all();
    let has_ownership = query.ownership != OwnershipFilter::All;

    if query.classifications.len() == 1 {
        suggestions.push("Try selecting more expansions");
    }
    if has_category {
        suggestions.push("Try changing the category filter");
    }
    if has_faction {
        suggestions.push("Try changing the faction filter");
    }
    if has_source_type {
        suggestions.push("Try changing the source type filter");
    }
    if has_ownership {
        suggestions.push("Try showing all mounts (owned and unowned)");
    }

    let active_count = [has_classification, has_category, has_faction, has_source_type, has_ownership]
        .iter()
        .filter(|active| **active)
        .count();
    if active_count > 2 {
        suggestions.push("Try clearing some filters");
    }

    if suggestions.is_empty() {
        suggestions.extend([
            "Try adjusting your search terms",
            "Check if you have any active filters",
            "Browse all mounts by clearing filters",
        ]);
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Expansion, Faction, MountCategory, SourceType};

    #[test]
    fn summary_lists_active_filters() {
        let query = CatalogQuery::new()
            .with_classification(Expansion::Cataclysm)
            .with_faction(Faction::Horde)
            .with_ownership(OwnershipFilter::NotOwned);
        assert_eq!(
            active_filter_summary(&query),
            vec!["Cataclysm", "Horde faction", "Not owned only"]
        );

        let query = CatalogQuery::new()
            .with_classification(Expansion::Classic)
            .with_classification(Expansion::Cataclysm)
            .with_category(MountCategory::Flying);
        assert_eq!(active_filter_summary(&query), vec!["2 expansions", "Flying mounts"]);
        assert!(active_filter_summary(&CatalogQuery::new()).is_empty());
    }

    #[test]
    fn suggestions_fall_back_to_generic_hints() {
        let suggestions = filter_suggestions(&CatalogQuery::new().with_text("zzz"));
        assert_eq!(suggestions[0], "Try adjusting your search terms");
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn suggestions_are_capped_at_three() {
        let query = CatalogQuery::new()
            .with_classification(Expansion::Classic)
            .with_category(MountCategory::Ground)
            .with_faction(Faction::Alliance)
            .with_source_type(SourceType::Drop)
            .with_ownership(OwnershipFilter::Owned);
        assert_eq!(
            filter_suggestions(&query),
            vec![
                "Try selecting more expansions",
                "Try changing the category filter",
                "Try changing the faction filter",
            ]
        );
    }
}
