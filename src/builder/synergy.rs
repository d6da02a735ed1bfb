//! Scoring of a candidate card against a build-around target: one seed card
//! or a whole deck in progress.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ontology::typeline::{card_types, creature_types};
use crate::ontology::{
    calculate_keyword_synergy_detailed, extract_keywords_with_info, KeywordCategory, KeywordInfo,
};
use crate::types::{Card, Color, SynergyDetail, SynergyKind};

const TRIBAL_SYNERGY: f64 = 0.8;
const THEME_SYNERGY: f64 = 0.7;

/// What candidates are scored against.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SynergyTarget {
    pub colors: Vec<Color>,
    pub keywords: Vec<KeywordInfo>,
    pub themes: Vec<String>,
    pub card_types: Vec<String>,
    pub is_creature: bool,
    pub creature_types: Vec<String>,
}

impl SynergyTarget {
    pub fn from_card(card: &Card) -> Self {
        let mut target = Self::default();
        target.absorb(card);
        target
    }

    /// Union of every card's colors, keywords, themes and creature types.
    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut target = Self::default();
        for card in cards {
            target.absorb(card);
        }
        target.colors.sort();
        target
    }

    fn absorb(&mut self, card: &Card) {
        for color in &card.colors {
            if !self.colors.contains(color) {
                self.colors.push(*color);
            }
        }
        if let Some(text) = card.oracle_text.as_deref().filter(|t| !t.is_empty()) {
            for info in extract_keywords_with_info(text) {
                if info.category == KeywordCategory::Theme && !self.themes.contains(&info.keyword) {
                    self.themes.push(info.keyword.clone());
                }
                if !self.keywords.iter().any(|kw| kw.keyword == info.keyword) {
                    self.keywords.push(info);
                }
            }
        }
        for card_type in card_types(&card.type_line) {
            if !self.card_types.contains(&card_type) {
                self.card_types.push(card_type);
            }
        }
        if card.is_creature() {
            self.is_creature = true;
            for creature_type in creature_types(&card.type_line) {
                if !self.creature_types.contains(&creature_type) {
                    self.creature_types.push(creature_type);
                }
            }
        }
    }

    pub fn keyword_names(&self) -> Vec<String> {
        self.keywords.iter().map(|kw| kw.keyword.clone()).collect()
    }
}

/// How well a card's colors sit inside the target's colors.
pub fn color_compatibility(card: &Card, colors: &[Color]) -> f64 {
    if card.is_colorless() {
        return 1.0;
    }
    if colors.is_empty() {
        return 0.8;
    }
    let matching = card.colors.iter().filter(|c| colors.contains(c)).count();
    if matching == 0 {
        0.0
    } else if matching == card.colors.len() {
        1.0
    } else {
        matching as f64 / card.colors.len() as f64 * 0.7
    }
}

/// Fixed preference for cheap-to-mid costs in 60-card constructed.
pub fn constructed_curve_fit(card: &Card) -> f64 {
    if card.is_land() {
        return 0.5;
    }
    match card.cmc_slot() {
        0 => 0.6,
        1 => 0.8,
        2 | 3 => 1.0,
        4 => 0.8,
        5 => 0.6,
        6 => 0.4,
        _ => 0.3,
    }
}

pub fn rarity_quality(card: &Card) -> f64 {
    card.rarity_kind().fallback_quality()
}

/// Synergy score and the individual synergies that produced it.
///
/// Keyword overlap counts once, every shared creature type counts on its own,
/// and every target theme the card also carries counts on its own. The
/// contributions are averaged, 0.5 when nothing fired.
pub fn synergy_with(card: &Card, target: &SynergyTarget) -> (f64, Vec<SynergyDetail>) {
    let mut total = 0.0;
    let mut fired = 0usize;
    let mut details = Vec::new();

    let card_keywords = card
        .oracle_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(extract_keywords_with_info)
        .unwrap_or_default();

    if !card_keywords.is_empty() && !target.keywords.is_empty() {
        let (score, matched) = calculate_keyword_synergy_detailed(&target.keywords, &card_keywords);
        if score > 0.0 {
            total += score;
            fired += 1;
            for keyword in matched {
                details.push(SynergyDetail {
                    kind: SynergyKind::Keyword,
                    description: format!("Shares {keyword} with your deck"),
                    name: keyword,
                });
            }
        }
    }

    if card.is_creature() && target.is_creature {
        for creature_type in creature_types(&card.type_line) {
            if target.creature_types.contains(&creature_type) {
                total += TRIBAL_SYNERGY;
                fired += 1;
                details.push(SynergyDetail {
                    kind: SynergyKind::Tribal,
                    description: format!("{creature_type} tribal synergy"),
                    name: creature_type,
                });
            }
        }
    }

    let card_themes: BTreeSet<&str> = card_keywords
        .iter()
        .filter(|kw| kw.category == KeywordCategory::Theme)
        .map(|kw| kw.keyword.as_str())
        .collect();
    for theme in &target.themes {
        if card_themes.contains(theme.as_str()) {
            total += THEME_SYNERGY;
            fired += 1;
            details.push(SynergyDetail {
                kind: SynergyKind::Theme,
                name: theme.clone(),
                description: format!("Supports your {theme} theme"),
            });
        }
    }

    if fired == 0 {
        return (0.5, details);
    }
    ((total / fired as f64).min(1.0), details)
}

#[cfg(test)]
mod tests {
    use crate::builder::synergy::{
        color_compatibility, constructed_curve_fit, synergy_with, SynergyTarget,
    };
    use crate::types::{Card, Color, SynergyKind};

    fn seed() -> Card {
        Card::new(1, "Elvish Warchief", "Creature — Elf Warrior")
            .with_cmc(2.0)
            .with_colors(&[Color::Green])
            .with_oracle_text("Whenever another creature you control dies, draw a card.")
    }

    #[test]
    fn target_collects_themes_and_types() {
        let target = SynergyTarget::from_card(&seed());
        assert_eq!(target.colors, vec![Color::Green]);
        assert!(target.themes.contains(&"card draw".to_string()));
        assert!(target.themes.contains(&"death payoff".to_string()));
        assert_eq!(target.creature_types, vec!["Elf".to_string(), "Warrior".to_string()]);
        assert!(target.is_creature);
    }

    #[test]
    fn color_compatibility_cases() {
        let green = [Color::Green];
        let golem = Card::new(2, "Golem", "Artifact Creature — Golem");
        let bear = Card::new(3, "Bear", "Creature — Bear").with_colors(&[Color::Green]);
        let hybrid = Card::new(4, "Charm", "Instant").with_colors(&[Color::Red, Color::Green]);
        let bolt = Card::new(5, "Bolt", "Instant").with_colors(&[Color::Red]);
        assert_eq!(color_compatibility(&golem, &green), 1.0);
        assert_eq!(color_compatibility(&bear, &green), 1.0);
        assert!((color_compatibility(&hybrid, &green) - 0.35).abs() < 1e-9);
        assert_eq!(color_compatibility(&bolt, &green), 0.0);
        assert_eq!(color_compatibility(&bolt, &[]), 0.8);
    }

    #[test]
    fn curve_fit_prefers_two_and_three() {
        let at = |cmc: f64| Card::new(1, "X", "Sorcery").with_cmc(cmc);
        assert_eq!(constructed_curve_fit(&at(2.0)), 1.0);
        assert_eq!(constructed_curve_fit(&at(6.0)), 0.4);
        assert_eq!(constructed_curve_fit(&at(9.0)), 0.3);
        assert_eq!(constructed_curve_fit(&Card::new(2, "Forest", "Basic Land — Forest")), 0.5);
    }

    #[test]
    fn multi_type_creature_registers_each_tribe() {
        let target = SynergyTarget::from_card(&seed());
        let elf_warrior = Card::new(2, "Elf Veteran", "Creature — Elf Warrior");
        let (score, details) = synergy_with(&elf_warrior, &target);
        assert!((score - 0.8).abs() < 1e-9);
        let tribal: Vec<_> = details
            .iter()
            .filter(|d| d.kind == SynergyKind::Tribal)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(tribal, vec!["Elf", "Warrior"]);
    }

    #[test]
    fn no_overlap_is_neutral() {
        let target = SynergyTarget::from_card(&seed());
        let frost = Card::new(3, "Frost Breath", "Instant").with_oracle_text("Tap target creature.");
        let (score, details) = synergy_with(&frost, &target);
        assert_eq!(score, 0.5);
        assert!(details.is_empty());
    }

    #[test]
    fn shared_theme_is_reported() {
        let target = SynergyTarget::from_card(&seed());
        let divination = Card::new(4, "Divination", "Sorcery").with_oracle_text("Draw a card. Draw a card.");
        let (score, details) = synergy_with(&divination, &target);
        assert!(score > 0.5);
        assert!(details
            .iter()
            .any(|d| d.kind == SynergyKind::Theme && d.name == "card draw"));
    }
}
