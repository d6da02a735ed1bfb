use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::constructor::generic::{analyze_selection, average_score, PoolIndex};
use crate::constructor::selection::{count_lands, distribute_lands, select_by_curve};
use crate::constructor::{
    filter_by_color_fit, ColorCombination, DeckConstructor, DeckSuggestionAnalysis,
    SuggestedCard, SuggestedDeck, Viability, ALL_COLOR_COMBINATIONS,
};
use crate::error::{DeckError, DeckResult};
use crate::scoring::mana_consistency;
use crate::scoring::quality::lookup_gih_quality;
use crate::types::{Card, CardId, ScoredCard};

/// Cards in a limited deck, spells plus lands.
pub const LIMITED_DECK_SIZE: usize = 40;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DraftArchetype {
    Aggro,
    Midrange,
    Control,
}

/// Build targets for one draft archetype.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DraftProfile {
    pub name: &'static str,
    pub creature_min: usize,
    pub creature_max: usize,
    pub max_avg_cmc: f64,
    pub land_count: u32,
    /// Preferred spell count per mana value 0 through 5; 5 covers 5+.
    pub preferred_curve: [u32; 6],
}

impl DraftProfile {
    pub fn preferred(&self, cmc: u32) -> u32 {
        self.preferred_curve[cmc.min(5) as usize]
    }

    pub fn spell_target(&self) -> usize {
        LIMITED_DECK_SIZE.saturating_sub(self.land_count as usize)
    }
}

const AGGRO: DraftProfile = DraftProfile {
    name: "Aggro",
    creature_min: 16,
    creature_max: 18,
    max_avg_cmc: 2.5,
    land_count: 16,
    preferred_curve: [0, 4, 8, 5, 1, 0],
};

const MIDRANGE: DraftProfile = DraftProfile {
    name: "Midrange",
    creature_min: 14,
    creature_max: 16,
    max_avg_cmc: 3.0,
    land_count: 17,
    preferred_curve: [0, 2, 5, 5, 3, 2],
};

const CONTROL: DraftProfile = DraftProfile {
    name: "Control",
    creature_min: 10,
    creature_max: 12,
    max_avg_cmc: 3.5,
    land_count: 18,
    preferred_curve: [0, 1, 4, 4, 3, 3],
};

impl DraftArchetype {
    pub const ALL: [DraftArchetype; 3] = [
        DraftArchetype::Aggro,
        DraftArchetype::Midrange,
        DraftArchetype::Control,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Aggro => "aggro",
            Self::Midrange => "midrange",
            Self::Control => "control",
        }
    }

    pub fn profile(&self) -> &'static DraftProfile {
        match self {
            Self::Aggro => &AGGRO,
            Self::Midrange => &MIDRANGE,
            Self::Control => &CONTROL,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Aggro => {
                "Aggro: Fast, creature-heavy decks that aim to win early (16-18 creatures, low curve)"
            }
            Self::Midrange => {
                "Midrange: Balanced decks with good creatures and removal (14-16 creatures)"
            }
            Self::Control => {
                "Control: Slower decks focused on removal and card advantage (10-12 creatures, higher curve)"
            }
        }
    }
}

impl Display for DraftArchetype {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown archetype: {0}")]
pub struct DraftArchetypeParseError(pub String);

impl FromStr for DraftArchetype {
    type Err = DraftArchetypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggro" => Ok(Self::Aggro),
            "midrange" => Ok(Self::Midrange),
            "control" => Ok(Self::Control),
            _ => Err(DraftArchetypeParseError(s.to_string())),
        }
    }
}

pub fn available_draft_archetypes() -> Vec<&'static str> {
    DraftArchetype::ALL.iter().map(|a| a.as_slug()).collect()
}

/// Empty for unknown keys.
pub fn draft_archetype_description(key: &str) -> &'static str {
    key.parse::<DraftArchetype>()
        .map(|archetype| archetype.description())
        .unwrap_or("")
}

const QUALITY_WEIGHT: f64 = 0.35;
const CMC_WEIGHT: f64 = 0.30;
const TYPE_WEIGHT: f64 = 0.20;
const SYNERGY_WEIGHT: f64 = 0.15;

pub fn cmc_fit(card: &Card, profile: &DraftProfile) -> f64 {
    let cmc = card.cmc_slot().min(5);
    let preferred = profile.preferred(cmc);
    if preferred == 0 && cmc >= 5 {
        return if profile.max_avg_cmc <= 2.5 { 0.2 } else { 0.5 };
    }
    match preferred {
        5.. => 1.0,
        3..=4 => 0.8,
        1..=2 => 0.6,
        0 => 0.4,
    }
}

fn is_interaction(card: &Card) -> bool {
    let text = card.oracle_lower();
    ["destroy", "exile", "draw", "counter"]
        .iter()
        .any(|needle| text.contains(needle))
}

pub fn type_fit(card: &Card, profile: &DraftProfile) -> f64 {
    let creature = card.is_creature();
    if profile.creature_max >= 16 && creature {
        return 1.0;
    }
    if profile.creature_max <= 12 && !creature {
        return if is_interaction(card) { 1.0 } else { 0.8 };
    }
    0.7
}

pub fn archetype_deck_score(
    selected: &[ScoredCard],
    analysis: &DeckSuggestionAnalysis,
    combo: &ColorCombination,
    profile: &DraftProfile,
) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }

    let creatures = analysis.creature_count as usize;
    let creature = if (profile.creature_min..=profile.creature_max).contains(&creatures) {
        1.0
    } else if creatures + 2 >= profile.creature_min && creatures <= profile.creature_max + 2 {
        0.7
    } else {
        0.4
    };

    let cmc = if analysis.average_cmc <= profile.max_avg_cmc {
        1.0
    } else if analysis.average_cmc <= profile.max_avg_cmc + 0.3 {
        0.7
    } else {
        0.4
    };

    average_score(selected) * 0.40
        + creature * 0.20
        + cmc * 0.20
        + mana_consistency(combo.colors.len()) * 0.20
}

fn archetype_viability(score: f64) -> Viability {
    if score >= 0.7 {
        Viability::Strong
    } else if score >= 0.5 {
        Viability::Viable
    } else {
        Viability::Weak
    }
}

impl DeckConstructor {
    /// The single best deck for a draft archetype across all color
    /// combinations.
    pub async fn suggest_deck_by_archetype(
        &self,
        pool: &[CardId],
        set_code: &str,
        format: &str,
        archetype: &str,
    ) -> DeckResult<SuggestedDeck> {
        let archetype: DraftArchetype = archetype
            .parse()
            .map_err(|err: DraftArchetypeParseError| DeckError::UnknownArchetype(err.0))?;
        let profile = archetype.profile();

        if pool.is_empty() {
            return Err(DeckError::InvalidRequest("no cards in draft pool".to_string()));
        }
        let cards = self.load_pool(pool).await;
        if cards.is_empty() {
            return Err(DeckError::InvalidRequest(
                "could not load any cards from draft pool".to_string(),
            ));
        }

        let min_creatures = profile
            .creature_min
            .saturating_sub(self.tuning.archetype_creature_slack);
        let mut best: Option<SuggestedDeck> = None;
        for combo in &ALL_COLOR_COMBINATIONS {
            let candidates = filter_by_color_fit(&cards, combo);
            if !self.has_enough_playables(&candidates, min_creatures) {
                continue;
            }
            let Some(deck) = self
                .build_archetype_deck(combo, &candidates, set_code, format, profile)
                .await
            else {
                continue;
            };
            let current = best.as_ref().map(|b| b.score).unwrap_or(0.0);
            if deck.score > current {
                best = Some(deck);
            }
        }

        match best {
            Some(deck) => {
                info!(
                    archetype = profile.name,
                    combo = deck.color_combo.name,
                    score = deck.score,
                    "built archetype deck"
                );
                Ok(deck)
            }
            None => Err(DeckError::NoViableDeck(format!(
                "no viable {} deck found in pool",
                profile.name
            ))),
        }
    }

    async fn build_archetype_deck(
        &self,
        combo: &ColorCombination,
        candidates: &[Card],
        set_code: &str,
        format: &str,
        profile: &DraftProfile,
    ) -> Option<SuggestedDeck> {
        let index = PoolIndex::new(candidates);
        let mut scored = Vec::with_capacity(candidates.len());
        for card in candidates {
            scored.push(
                self.score_for_archetype(card, &index, set_code, format, profile)
                    .await,
            );
        }

        let target = profile.spell_target();
        let selected = select_by_curve(scored, target, &profile.preferred_curve);
        if selected.len() + self.tuning.fill_tolerance < target {
            debug!(combo = combo.name, picked = selected.len(), "too few spells for archetype");
            return None;
        }

        let lands = distribute_lands(&selected, combo, profile.land_count);
        let analysis = analyze_selection(&selected, candidates.len());
        let score = archetype_deck_score(&selected, &analysis, combo, profile);

        Some(SuggestedDeck {
            color_combo: *combo,
            spells: selected.iter().map(SuggestedCard::from).collect(),
            total_cards: selected.len() as u32 + count_lands(&lands),
            lands,
            score,
            viability: archetype_viability(score),
            analysis,
        })
    }

    async fn score_for_archetype(
        &self,
        card: &Card,
        index: &PoolIndex,
        set_code: &str,
        format: &str,
        profile: &DraftProfile,
    ) -> ScoredCard {
        let mut reasons = Vec::new();

        let quality = lookup_gih_quality(self.sources.ratings.as_deref(), card, set_code, format).await;
        if quality >= 0.7 {
            reasons.push("high-quality card".to_string());
        }

        let cmc = cmc_fit(card, profile);
        if cmc >= 0.8 {
            reasons.push(format!("great {}-drop for {}", card.cmc_slot(), profile.name));
        }

        let kind = type_fit(card, profile);
        if kind >= 0.8 {
            let creature = card.is_creature();
            if creature && profile.creature_max >= 16 {
                reasons.push("creature for aggro".to_string());
            } else if !creature && profile.creature_max <= 12 {
                reasons.push("spell for control".to_string());
            }
        }

        let synergy = index.synergy(card);
        if synergy >= 0.7 {
            reasons.push("synergy bonus".to_string());
        }

        let score = quality * QUALITY_WEIGHT
            + cmc * CMC_WEIGHT
            + kind * TYPE_WEIGHT
            + synergy * SYNERGY_WEIGHT;
        let reasoning = if reasons.is_empty() {
            format!("Good for {}", profile.name)
        } else {
            reasons.join(", ")
        };
        ScoredCard::new(card.clone(), score, reasoning)
    }
}
