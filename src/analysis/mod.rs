//! Reduces a deck list to aggregate counts used by every scorer.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::ontology::extract_keywords;
use crate::ontology::typeline::{card_types, creature_types};
use crate::types::{Board, Card, CardId, Color, DeckCard};

pub const PRIMARY_COLOR_LIMIT: usize = 2;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckComposition {
    pub colors: BTreeMap<Color, u32>,
    pub mana_curve: BTreeMap<u32, u32>,
    pub card_types: BTreeMap<String, u32>,
    pub keywords: BTreeMap<String, u32>,
    pub creature_types: BTreeMap<String, u32>,
    pub total_cards: u32,
    pub total_nonlands: u32,
    pub average_cmc: f64,
    pub color_identity: Vec<Color>,
    pub primary_colors: Vec<Color>,
    #[serde(skip)]
    total_cmc: f64,
}

impl DeckComposition {
    fn add(&mut self, card: &Card, quantity: u32) {
        self.total_cards += quantity;
        for card_type in card_types(&card.type_line) {
            *self.card_types.entry(card_type).or_insert(0) += quantity;
        }

        if !card.is_land() {
            for color in &card.colors {
                *self.colors.entry(*color).or_insert(0) += quantity;
            }
            *self.mana_curve.entry(card.cmc_slot()).or_insert(0) += quantity;
            self.total_cmc += card.cmc * quantity as f64;
            self.total_nonlands += quantity;
        }

        if let Some(text) = card.oracle_text.as_deref() {
            for keyword in extract_keywords(text) {
                *self.keywords.entry(keyword).or_insert(0) += quantity;
            }
        }

        if card.is_creature() {
            for creature_type in creature_types(&card.type_line) {
                *self.creature_types.entry(creature_type).or_insert(0) += quantity;
            }
        }
    }

    fn finish(mut self) -> Self {
        if self.total_nonlands > 0 {
            self.average_cmc = self.total_cmc / self.total_nonlands as f64;
        }
        self.color_identity = color_identity(&self.colors);
        self.primary_colors = primary_colors(&self.colors, PRIMARY_COLOR_LIMIT);
        self
    }

    pub fn curve_count(&self, cmc: u32) -> u32 {
        self.mana_curve.get(&cmc).copied().unwrap_or(0)
    }

    pub fn keyword_count(&self, keyword: &str) -> u32 {
        self.keywords.get(keyword).copied().unwrap_or(0)
    }

    pub fn creature_type_count(&self, creature_type: &str) -> u32 {
        self.creature_types.get(creature_type).copied().unwrap_or(0)
    }

    pub fn card_type_count(&self, card_type: &str) -> u32 {
        self.card_types.get(card_type).copied().unwrap_or(0)
    }
}

/// Analyze the main board of a deck list. Cards without metadata are skipped.
pub fn analyze_deck(cards: &[DeckCard], metadata: &HashMap<CardId, Card>) -> DeckComposition {
    let mut composition = DeckComposition::default();
    for deck_card in cards.iter().filter(|c| c.board == Board::Main) {
        if let Some(card) = metadata.get(&deck_card.card_id) {
            composition.add(card, deck_card.quantity);
        }
    }
    composition.finish()
}

/// Analyze a plain card list, one copy of each.
pub fn analyze_cards<'a, I>(cards: I) -> DeckComposition
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut composition = DeckComposition::default();
    for card in cards {
        composition.add(card, 1);
    }
    composition.finish()
}

/// Colors with a nonzero count, in WUBRG order.
pub fn color_identity(colors: &BTreeMap<Color, u32>) -> Vec<Color> {
    colors
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(color, _)| *color)
        .collect()
}

/// Most common colors first. Equal counts keep WUBRG order.
pub fn primary_colors(colors: &BTreeMap<Color, u32>, limit: usize) -> Vec<Color> {
    let mut counts: Vec<(Color, u32)> = colors
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(color, count)| (*color, *count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(color, _)| color)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::analysis::{analyze_cards, analyze_deck, primary_colors};
    use crate::types::{Board, Card, Color, DeckCard};

    fn metadata() -> HashMap<i64, Card> {
        let cards = vec![
            Card::new(1, "Llanowar Elves", "Creature — Elf Druid")
                .with_cmc(1.0)
                .with_colors(&[Color::Green])
                .with_oracle_text("{T}: Add {G}."),
            Card::new(2, "Elvish Archdruid", "Creature — Elf Druid")
                .with_cmc(3.0)
                .with_colors(&[Color::Green])
                .with_oracle_text("Other Elf creatures you control get +1/+1."),
            Card::new(3, "Forest", "Basic Land — Forest"),
            Card::new(4, "Lightning Strike", "Instant")
                .with_cmc(2.0)
                .with_colors(&[Color::Red])
                .with_oracle_text("Lightning Strike deals 3 damage to any target."),
        ];
        cards.into_iter().map(|c| (c.id, c)).collect()
    }

    #[test]
    fn weights_counts_by_quantity_and_skips_lands_for_curve() {
        let deck = vec![
            DeckCard::main(1, 4),
            DeckCard::main(2, 2),
            DeckCard::main(3, 10),
            DeckCard::main(4, 1),
        ];
        let composition = analyze_deck(&deck, &metadata());
        assert_eq!(composition.total_cards, 17);
        assert_eq!(composition.total_nonlands, 7);
        assert_eq!(composition.colors.get(&Color::Green), Some(&6));
        assert_eq!(composition.curve_count(1), 4);
        assert_eq!(composition.curve_count(0), 0);
        assert_eq!(composition.card_type_count("Land"), 10);
        assert_eq!(composition.creature_type_count("Elf"), 6);
        assert_eq!(composition.keyword_count("tap abilities"), 4);
        assert_eq!(composition.color_identity, vec![Color::Red, Color::Green]);
        assert_eq!(composition.primary_colors, vec![Color::Green, Color::Red]);
        let expected_avg = (4.0 + 6.0 + 2.0) / 7.0;
        assert!((composition.average_cmc - expected_avg).abs() < 1e-9);
    }

    #[test]
    fn ignores_sideboard_and_unknown_cards() {
        let deck = vec![
            DeckCard {
                card_id: 1,
                quantity: 4,
                board: Board::Sideboard,
            },
            DeckCard::main(999, 4),
        ];
        let composition = analyze_deck(&deck, &metadata());
        assert_eq!(composition.total_cards, 0);
        assert!(composition.color_identity.is_empty());
        assert_eq!(composition.average_cmc, 0.0);
    }

    #[test]
    fn primary_colors_break_ties_in_color_order() {
        let meta = metadata();
        let composition = analyze_cards([&meta[&4], &meta[&1]]);
        assert_eq!(
            primary_colors(&composition.colors, 1),
            vec![Color::Red]
        );
    }
}
