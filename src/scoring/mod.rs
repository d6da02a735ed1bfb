//! Factor functions shared by the recommendation engine, the deck
//! constructors and the seed builder. Each pipeline passes its own tuning.

pub mod quality;

use crate::analysis::DeckComposition;
use crate::ontology::extract_keywords;
use crate::ontology::typeline::creature_types;
use crate::types::{Card, CardId, Color};

/// Ideal card counts per mana value and how a slot's fill level maps to a score.
#[derive(Debug, Clone, Copy)]
pub struct CurveTable {
    /// Indexed by mana value.
    pub ideal: &'static [u32],
    /// Ideal for mana values past the end of `ideal`.
    pub beyond: u32,
    pub equal_score: f64,
    pub over_base: f64,
    pub over_step: f64,
    pub over_floor: f64,
}

/// Recommendation engine curve: a limited deck's rough targets.
pub const RECOMMEND_CURVE: CurveTable = CurveTable {
    ideal: &[0, 2, 5, 5, 4, 3, 2],
    beyond: 2,
    equal_score: 0.6,
    over_base: 0.5,
    over_step: 0.1,
    over_floor: 0.1,
};

/// Deck constructor curve, measured against the candidate pool.
pub const CONSTRUCTOR_CURVE: CurveTable = CurveTable {
    ideal: &[0, 2, 5, 5, 4, 3, 2, 2],
    beyond: 1,
    equal_score: 0.6,
    over_base: 0.4,
    over_step: 0.0,
    over_floor: 0.4,
};

impl CurveTable {
    pub fn ideal_for(&self, cmc: u32) -> u32 {
        self.ideal
            .get(cmc as usize)
            .copied()
            .unwrap_or(self.beyond)
    }

    /// Under-filled slots score `0.7 + 0.1 * gap`, capped at 1.0.
    pub fn score(&self, cmc: u32, current: u32) -> f64 {
        let ideal = self.ideal_for(cmc);
        if current < ideal {
            let gap = (ideal - current) as f64;
            return f64::min(0.7 + gap * 0.1, 1.0);
        }
        if current == ideal {
            return self.equal_score;
        }
        let excess = (current - ideal) as f64;
        f64::max(self.over_base - excess * self.over_step, self.over_floor)
    }
}

/// Color fit of a card against a deck's identity and primary colors.
pub fn color_fit(card: &Card, identity: &[Color], primary: &[Color]) -> f64 {
    if card.is_colorless() {
        return 1.0;
    }
    let matching = card.colors.iter().filter(|c| identity.contains(c)).count();
    if matching == 0 {
        return 0.0;
    }
    if matching == card.colors.len() {
        if card.colors.iter().all(|c| primary.contains(c)) {
            return 1.0;
        }
        return 0.85;
    }
    matching as f64 / card.colors.len() as f64 * 0.5
}

pub fn curve_fit(card: &Card, composition: &DeckComposition, table: &CurveTable) -> f64 {
    if card.is_land() {
        return 0.5;
    }
    let cmc = card.cmc_slot();
    table.score(cmc, composition.curve_count(cmc))
}

const KEYWORD_MATCH_BONUS: f64 = 0.2;

/// Tribal bonus by how many creatures of the type the deck already runs.
pub fn tribal_bonus(count: u32) -> Option<f64> {
    match count {
        0..=2 => None,
        3..=4 => Some(0.4),
        5..=7 => Some(0.6),
        _ => Some(0.8),
    }
}

/// Keyword and creature-type overlap with a deck, averaged over every hit.
pub fn deck_synergy(card: &Card, composition: &DeckComposition) -> f64 {
    let mut total = 0.0;
    let mut hits = 0usize;

    if let Some(text) = card.oracle_text.as_deref() {
        for keyword in extract_keywords(text) {
            if composition.keyword_count(&keyword) > 0 {
                total += KEYWORD_MATCH_BONUS;
                hits += 1;
            }
        }
    }

    if card.is_creature() {
        for creature_type in creature_types(&card.type_line) {
            if let Some(bonus) = tribal_bonus(composition.creature_type_count(&creature_type)) {
                total += bonus;
                hits += 1;
            }
        }
    }

    if hits == 0 {
        return 0.5;
    }
    f64::min(total / hits as f64, 1.0)
}

pub const LIMITED_FORMAT: &str = "Limited";

pub fn playability(card: &Card, format: &str, draft_card_ids: Option<&[CardId]>) -> f64 {
    if format != LIMITED_FORMAT {
        return 0.8;
    }
    match draft_card_ids {
        Some(ids) if ids.contains(&card.id) => 0.9,
        Some(_) => 0.1,
        None => 0.8,
    }
}

/// "This card a, b, and c." from lowercase reason fragments.
pub fn join_reasons(reasons: &[String]) -> String {
    if reasons.is_empty() {
        return "This card could work in your deck.".to_string();
    }
    let mut sentence = String::from("This card ");
    let last = reasons.len() - 1;
    for (i, reason) in reasons.iter().enumerate() {
        if i == 0 {
            sentence.push_str(reason);
        } else if i == last {
            sentence.push_str(", and ");
            sentence.push_str(reason);
        } else {
            sentence.push_str(", ");
            sentence.push_str(reason);
        }
    }
    sentence.push('.');
    sentence
}

/// Land-count penalty for multicolor mana bases.
pub fn mana_consistency(color_count: usize) -> f64 {
    match color_count {
        0 | 1 => 1.0,
        2 => 0.9,
        _ => 0.7,
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::analyze_cards;
    use crate::scoring::{
        color_fit, curve_fit, deck_synergy, join_reasons, playability, CONSTRUCTOR_CURVE,
        RECOMMEND_CURVE,
    };
    use crate::types::{Card, Color};

    fn bear(id: i64, colors: &[Color]) -> Card {
        Card::new(id, "Bear", "Creature — Bear")
            .with_cmc(2.0)
            .with_colors(colors)
    }

    #[test]
    fn colorless_always_fits() {
        let artifact = Card::new(1, "Ornithopter", "Artifact Creature — Thopter");
        assert_eq!(color_fit(&artifact, &[], &[]), 1.0);
        assert_eq!(color_fit(&artifact, &[Color::Red], &[Color::Red]), 1.0);
    }

    #[test]
    fn color_fit_grades_matches() {
        let identity = [Color::White, Color::Blue, Color::Black];
        let primary = [Color::White, Color::Blue];
        assert_eq!(color_fit(&bear(1, &[Color::White]), &identity, &primary), 1.0);
        assert_eq!(color_fit(&bear(2, &[Color::Black]), &identity, &primary), 0.85);
        assert_eq!(color_fit(&bear(3, &[Color::Green]), &identity, &primary), 0.0);
        let partial = color_fit(&bear(4, &[Color::White, Color::Red]), &identity, &primary);
        assert!((partial - 0.25).abs() < 1e-9);
    }

    #[test]
    fn curve_tables_reward_gaps() {
        assert!((RECOMMEND_CURVE.score(2, 0) - 1.0).abs() < 1e-9);
        assert!((RECOMMEND_CURVE.score(1, 1) - 0.8).abs() < 1e-9);
        assert!((RECOMMEND_CURVE.score(2, 5) - 0.6).abs() < 1e-9);
        assert!((RECOMMEND_CURVE.score(2, 7) - 0.3).abs() < 1e-9);
        assert!((RECOMMEND_CURVE.score(2, 20) - 0.1).abs() < 1e-9);
        assert!((RECOMMEND_CURVE.score(9, 0) - 0.9).abs() < 1e-9);
        assert!((CONSTRUCTOR_CURVE.score(3, 9) - 0.4).abs() < 1e-9);
        assert!((CONSTRUCTOR_CURVE.score(8, 0) - 0.8).abs() < 1e-9);

        let land = Card::new(9, "Island", "Basic Land — Island");
        let deck = analyze_cards(&[]);
        assert_eq!(curve_fit(&land, &deck, &RECOMMEND_CURVE), 0.5);
    }

    #[test]
    fn synergy_is_neutral_without_overlap() {
        let deck = analyze_cards(&[]);
        assert_eq!(deck_synergy(&bear(1, &[Color::Green]), &deck), 0.5);
    }

    #[test]
    fn tribal_overlap_scales_with_count() {
        let elves: Vec<Card> = (0..5)
            .map(|id| Card::new(id, "Elf", "Creature — Elf Warrior").with_cmc(2.0))
            .collect();
        let deck = analyze_cards(&elves);
        let candidate = Card::new(10, "Elf Lord", "Creature — Elf").with_cmc(3.0);
        assert!((deck_synergy(&candidate, &deck) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn playability_depends_on_draft_pool() {
        let card = bear(5, &[Color::Green]);
        assert_eq!(playability(&card, "Limited", Some(&[5, 6])), 0.9);
        assert_eq!(playability(&card, "Limited", Some(&[6])), 0.1);
        assert_eq!(playability(&card, "Limited", None), 0.8);
        assert_eq!(playability(&card, "Standard", Some(&[6])), 0.8);
    }

    #[test]
    fn reasons_join_into_a_sentence() {
        assert_eq!(join_reasons(&[]), "This card could work in your deck.");
        assert_eq!(join_reasons(&["is great".to_string()]), "This card is great.");
        let reasons = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(join_reasons(&reasons), "This card a, b, and c.");
    }
}
