use std::collections::BTreeMap;
use std::fmt::Write;

use crate::constructor::SuggestedDeck;

/// Arena import text: a header, spells by name with counts, a blank line,
/// then basic lands.
pub fn export_to_arena(deck: &SuggestedDeck) -> String {
    let mut out = String::new();
    let _ = write!(out, "Deck: {} Draft\n\n", deck.color_combo.name);

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for spell in &deck.spells {
        *counts.entry(spell.name.as_str()).or_insert(0) += 1;
    }
    for (name, count) in &counts {
        let _ = writeln!(out, "{count} {name}");
    }

    out.push('\n');
    for land in deck.lands.iter().filter(|land| land.quantity > 0) {
        let _ = writeln!(out, "{} {}", land.quantity, land.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::constructor::export::export_to_arena;
    use crate::constructor::fixtures::draft_pool;
    use crate::constructor::DeckConstructor;
    use crate::sources::memory::InMemoryCatalog;
    use crate::sources::CardSources;

    #[tokio::test]
    async fn exports_spells_then_lands() {
        let pool = draft_pool();
        let ids: Vec<_> = pool.iter().map(|c| c.id).collect();
        let constructor =
            DeckConstructor::new(CardSources::from_catalog(Arc::new(InMemoryCatalog::from_cards(pool))));
        let deck = constructor
            .suggest_deck_by_archetype(&ids, "", "", "midrange")
            .await
            .expect("deck");

        let text = export_to_arena(&deck);
        let header = format!("Deck: {} Draft\n\n", deck.color_combo.name);
        assert!(text.starts_with(&header));

        let body = &text[header.len()..];
        let (spells, lands) = body.split_once("\n\n").expect("blank separator");
        let names: Vec<&str> = spells
            .lines()
            .map(|line| line.split_once(' ').expect("count").1)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), deck.spells.len());

        let land_total: u32 = lands
            .lines()
            .map(|line| line.split_once(' ').expect("count").0.parse::<u32>().expect("number"))
            .sum();
        assert_eq!(land_total, 17);
    }
}
