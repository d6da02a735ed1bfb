//! Single-card recommendations against an existing deck.

pub mod engine;
pub mod explain;

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ontology::typeline::contains_type;
use crate::scoring::{CurveTable, RECOMMEND_CURVE};
use crate::types::{Card, CardId, Color, DeckCard, ScoreFactors};

pub use engine::RecommendationEngine;

/// Everything the engine knows about the deck being built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckContext {
    #[serde(default)]
    pub cards: Vec<DeckCard>,
    #[serde(default)]
    pub metadata: HashMap<CardId, Card>,
    /// Cards available in a draft. `None` for constructed decks.
    #[serde(default)]
    pub draft_card_ids: Option<Vec<CardId>>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub draft_format: String,
}

impl DeckContext {
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|entry| entry.card_id == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CmcRange {
    pub min: u32,
    pub max: u32,
}

impl CmcRange {
    pub fn contains(&self, cmc: u32) -> bool {
        cmc >= self.min && cmc <= self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filters {
    pub max_results: usize,
    pub min_score: f64,
    /// Keep cards sharing any of these colors. Colorless cards always pass.
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Keep cards whose type line contains any of these types.
    #[serde(default)]
    pub card_types: Vec<String>,
    #[serde(default)]
    pub cmc_range: Option<CmcRange>,
    pub include_lands: bool,
    #[serde(default)]
    pub only_draft_pool: bool,
    #[serde(default)]
    pub draft_pool: Vec<CardId>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_score: 0.3,
            colors: Vec::new(),
            card_types: Vec::new(),
            cmc_range: None,
            include_lands: true,
            only_draft_pool: false,
            draft_pool: Vec::new(),
        }
    }
}

impl Filters {
    pub fn from_tuning(tuning: &RecommendTuning) -> Self {
        Self {
            max_results: tuning.max_results,
            min_score: tuning.min_score,
            include_lands: tuning.include_lands,
            ..Self::default()
        }
    }

    pub fn with_draft_pool(mut self, pool: Vec<CardId>) -> Self {
        self.only_draft_pool = true;
        self.draft_pool = pool;
        self
    }

    pub fn matches(&self, card: &Card) -> bool {
        if !self.colors.is_empty() && !card.is_colorless() && !card.shares_color_with(&self.colors) {
            return false;
        }
        if !self.card_types.is_empty()
            && !self
                .card_types
                .iter()
                .any(|wanted| contains_type(&card.type_line, wanted))
        {
            return false;
        }
        if let Some(range) = self.cmc_range {
            if !range.contains(card.cmc_slot()) {
                return false;
            }
        }
        if !self.include_lands && card.is_land() {
            return false;
        }
        true
    }
}

/// Factor weights for the recommendation engine. They sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecommendWeights {
    pub color_fit: f64,
    pub mana_curve: f64,
    pub quality: f64,
    pub synergy: f64,
    pub playable: f64,
}

impl Default for RecommendWeights {
    fn default() -> Self {
        Self {
            color_fit: 0.30,
            mana_curve: 0.25,
            quality: 0.25,
            synergy: 0.15,
            playable: 0.05,
        }
    }
}

impl RecommendWeights {
    pub fn apply(&self, factors: &ScoreFactors) -> f64 {
        factors.color_fit * self.color_fit
            + factors.mana_curve * self.mana_curve
            + factors.quality * self.quality
            + factors.synergy * self.synergy
            + factors.playable * self.playable
    }
}

#[derive(Debug, Clone)]
pub struct RecommendTuning {
    pub max_results: usize,
    pub min_score: f64,
    pub include_lands: bool,
    pub weights: RecommendWeights,
    pub curve: CurveTable,
}

impl Default for RecommendTuning {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_score: 0.3,
            include_lands: true,
            weights: RecommendWeights::default(),
            curve: RECOMMEND_CURVE,
        }
    }
}

/// The factor that contributed most to a recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationSource {
    ColorFit,
    ManaCurve,
    Quality,
    Synergy,
    Playability,
}

impl RecommendationSource {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::ColorFit => "color-fit",
            Self::ManaCurve => "mana-curve",
            Self::Quality => "quality",
            Self::Synergy => "synergy",
            Self::Playability => "playability",
        }
    }
}

impl Display for RecommendationSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecommendation {
    pub card: Card,
    pub score: f64,
    pub reasoning: String,
    pub source: RecommendationSource,
    pub confidence: f64,
    pub factors: ScoreFactors,
}

#[cfg(test)]
mod tests {
    use crate::recommend::{CmcRange, Filters, RecommendWeights};
    use crate::types::{Card, Color};

    #[test]
    fn default_weights_sum_to_one() {
        let w = RecommendWeights::default();
        let sum = w.color_fit + w.mana_curve + w.quality + w.synergy + w.playable;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn filters_apply_each_restriction() {
        let bolt = Card::new(1, "Lightning Bolt", "Instant")
            .with_cmc(1.0)
            .with_colors(&[Color::Red]);
        let golem = Card::new(2, "Golem", "Artifact Creature — Golem").with_cmc(4.0);
        let forest = Card::new(3, "Forest", "Basic Land — Forest");

        let by_color = Filters {
            colors: vec![Color::Blue],
            ..Filters::default()
        };
        assert!(!by_color.matches(&bolt));
        assert!(by_color.matches(&golem));

        let by_type = Filters {
            card_types: vec!["Creature".to_string()],
            ..Filters::default()
        };
        assert!(!by_type.matches(&bolt));
        assert!(by_type.matches(&golem));

        let by_cmc = Filters {
            cmc_range: Some(CmcRange { min: 2, max: 3 }),
            ..Filters::default()
        };
        assert!(!by_cmc.matches(&golem));

        let no_lands = Filters {
            include_lands: false,
            ..Filters::default()
        };
        assert!(!no_lands.matches(&forest));
        assert!(Filters::default().matches(&forest));
    }
}
