//! Builds complete limited decks from a draft pool.
//!
//! Every one of the 25 color identities is tried. Cards that fit the colors
//! are scored, 23 are picked against a curve, and basics are added in
//! proportion to the mana symbols of the picks.

pub mod archetype;
pub mod export;
pub mod generic;
pub mod selection;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use tracing::debug;

use crate::scoring::{CurveTable, CONSTRUCTOR_CURVE};
use crate::sources::CardSources;
use crate::types::Color::{Black as B, Blue as U, Green as G, Red as R, White as W};
use crate::types::{Card, CardId, Color, ScoredCard, SuggestedLand};

pub use archetype::{available_draft_archetypes, draft_archetype_description, DraftArchetype};
pub use export::export_to_arena;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ColorCombination {
    pub colors: &'static [Color],
    pub name: &'static str,
}

impl ColorCombination {
    const fn new(colors: &'static [Color], name: &'static str) -> Self {
        Self { colors, name }
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Lands are excluded. Colorless cards always fit.
    pub fn fits(&self, card: &Card) -> bool {
        if card.is_land() {
            return false;
        }
        card.colors.iter().all(|color| self.contains(*color))
    }
}

impl Display for ColorCombination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub const ALL_COLOR_COMBINATIONS: [ColorCombination; 25] = [
    ColorCombination::new(&[W], "Mono-White"),
    ColorCombination::new(&[U], "Mono-Blue"),
    ColorCombination::new(&[B], "Mono-Black"),
    ColorCombination::new(&[R], "Mono-Red"),
    ColorCombination::new(&[G], "Mono-Green"),
    // allied
    ColorCombination::new(&[W, U], "Azorius"),
    ColorCombination::new(&[U, B], "Dimir"),
    ColorCombination::new(&[B, R], "Rakdos"),
    ColorCombination::new(&[R, G], "Gruul"),
    ColorCombination::new(&[G, W], "Selesnya"),
    // enemy
    ColorCombination::new(&[W, B], "Orzhov"),
    ColorCombination::new(&[U, R], "Izzet"),
    ColorCombination::new(&[B, G], "Golgari"),
    ColorCombination::new(&[R, W], "Boros"),
    ColorCombination::new(&[G, U], "Simic"),
    // shards
    ColorCombination::new(&[W, U, B], "Esper"),
    ColorCombination::new(&[U, B, R], "Grixis"),
    ColorCombination::new(&[B, R, G], "Jund"),
    ColorCombination::new(&[R, G, W], "Naya"),
    ColorCombination::new(&[G, W, U], "Bant"),
    // wedges
    ColorCombination::new(&[W, B, G], "Abzan"),
    ColorCombination::new(&[U, R, W], "Jeskai"),
    ColorCombination::new(&[B, G, U], "Sultai"),
    ColorCombination::new(&[R, W, B], "Mardu"),
    ColorCombination::new(&[G, U, R], "Temur"),
];

pub fn filter_by_color_fit(pool: &[Card], combo: &ColorCombination) -> Vec<Card> {
    pool.iter().filter(|card| combo.fits(card)).cloned().collect()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Viability {
    Strong,
    Viable,
    Weak,
}

impl Viability {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Viable => "viable",
            Self::Weak => "weak",
        }
    }
}

impl Display for Viability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

/// A chosen spell as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestedCard {
    pub card_id: CardId,
    pub name: String,
    pub type_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub cmc: u32,
    pub colors: Vec<Color>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rarity: String,
    pub score: f64,
    pub reasoning: String,
}

impl From<&ScoredCard> for SuggestedCard {
    fn from(scored: &ScoredCard) -> Self {
        let card = &scored.card;
        Self {
            card_id: card.id,
            name: card.name.clone(),
            type_line: card.type_line.clone(),
            mana_cost: card.mana_cost.clone(),
            image_uri: card.image_uri.clone(),
            cmc: card.cmc_slot(),
            colors: card.colors.clone(),
            rarity: card.rarity.clone(),
            score: scored.score,
            reasoning: scored.reasoning.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckSuggestionAnalysis {
    pub creature_count: u32,
    /// Non-creature spells.
    pub spell_count: u32,
    pub average_cmc: f64,
    pub mana_curve: BTreeMap<u32, u32>,
    pub color_distribution: BTreeMap<Color, u32>,
    pub top_cards: Vec<String>,
    pub synergies: Vec<String>,
    pub playable_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedDeck {
    pub color_combo: ColorCombination,
    pub spells: Vec<SuggestedCard>,
    pub lands: Vec<SuggestedLand>,
    pub total_cards: u32,
    pub score: f64,
    pub viability: Viability,
    pub analysis: DeckSuggestionAnalysis,
}

impl SuggestedDeck {
    pub fn land_count(&self) -> u32 {
        selection::count_lands(&self.lands)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestDecksResponse {
    pub suggestions: Vec<SuggestedDeck>,
    pub total_combos: usize,
    pub viable_combos: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_combo: Option<ColorCombination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SuggestDecksResponse {
    fn failed(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

/// Constants for the deck constructors.
#[derive(Debug, Clone)]
pub struct ConstructorTuning {
    pub spell_target: usize,
    pub land_count: u32,
    pub min_candidates: usize,
    pub min_creatures: usize,
    /// How far below an archetype's creature minimum a pool may fall.
    pub archetype_creature_slack: usize,
    /// How many spells an archetype deck may fall short of its target.
    pub fill_tolerance: usize,
    pub curve: CurveTable,
}

impl Default for ConstructorTuning {
    fn default() -> Self {
        Self {
            spell_target: 23,
            land_count: 17,
            min_candidates: 15,
            min_creatures: 6,
            archetype_creature_slack: 4,
            fill_tolerance: 3,
            curve: CONSTRUCTOR_CURVE,
        }
    }
}

/// Entry point for the generic and archetype constructors.
#[derive(Clone)]
pub struct DeckConstructor {
    sources: CardSources,
    tuning: ConstructorTuning,
}

impl DeckConstructor {
    pub fn new(sources: CardSources) -> Self {
        Self {
            sources,
            tuning: ConstructorTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: ConstructorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &ConstructorTuning {
        &self.tuning
    }

    /// Loads each pool card, local lookup first. Unknown ids are skipped.
    async fn load_pool(&self, ids: &[CardId]) -> Vec<Card> {
        let mut cards = Vec::with_capacity(ids.len());
        for id in ids {
            match self.sources.find_card(*id).await {
                Some(card) => cards.push(card),
                None => debug!(card_id = id, "pool card could not be loaded"),
            }
        }
        cards
    }
}


#[cfg(test)]
mod tests {
    use crate::constructor::fixtures::draft_pool;
    use crate::constructor::{filter_by_color_fit, ALL_COLOR_COMBINATIONS};
    use crate::types::Color;

    #[test]
    fn twenty_five_combinations_by_size() {
        assert_eq!(ALL_COLOR_COMBINATIONS.len(), 25);
        for size in 1..=3 {
            let count = ALL_COLOR_COMBINATIONS
                .iter()
                .filter(|combo| combo.colors.len() == size)
                .count();
            assert_eq!(count, if size == 1 { 5 } else { 10 });
        }
        let mut names: Vec<_> = ALL_COLOR_COMBINATIONS.iter().map(|c| c.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 25);
    }

    #[test]
    fn color_fit_filter_keeps_subset_and_colorless() {
        let pool = draft_pool();
        for combo in &ALL_COLOR_COMBINATIONS {
            let fitted = filter_by_color_fit(&pool, combo);
            for card in &fitted {
                assert!(!card.is_land());
                assert!(card.colors.iter().all(|c| combo.colors.contains(c)));
            }
            assert!(fitted.iter().any(|card| card.name == "Golem"));
        }

        let gruul = ALL_COLOR_COMBINATIONS
            .iter()
            .find(|c| c.name == "Gruul")
            .expect("gruul");
        let fitted = filter_by_color_fit(&pool, gruul);
        assert!(fitted.iter().any(|c| c.name == "Gruul Charm"));
        assert!(!fitted.iter().any(|c| c.has_color(Color::Blue)));
        assert_eq!(fitted.len(), pool.len() - 2);
    }
}
