use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{analyze_cards, DeckComposition};
use crate::builder::lands::{recommended_land_count, rounded_basics};
use crate::builder::seed::{combine, seed_reasoning};
use crate::builder::synergy::{color_compatibility, rarity_quality, synergy_with, SynergyTarget};
use crate::builder::{CandidateScope, CardWithOwnership, SeedDeckBuilder};
use crate::error::{DeckError, DeckResult};
use crate::sources::bulk::fetch_card_map;
use crate::types::{Card, CardId, Color, ScoreBreakdown, SuggestedLand, SynergyDetail};

/// Spell counts per mana value for the 36 spells of a 24-land deck.
pub const GAP_CURVE: [(u32, u32); 6] = [(1, 4), (2, 9), (3, 9), (4, 6), (5, 4), (6, 4)];

pub const CONSTRUCTED_DECK_SIZE: u32 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IterativeRequest {
    /// Included in the deck when not already listed.
    pub seed_card_id: CardId,
    /// One entry per copy.
    pub deck_card_ids: Vec<CardId>,
    pub max_results: usize,
    #[serde(flatten)]
    pub scope: CandidateScope,
}

impl IterativeRequest {
    pub fn new(seed_card_id: CardId, deck_card_ids: Vec<CardId>) -> Self {
        Self {
            seed_card_id,
            deck_card_ids,
            ..Self::default()
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_scope(mut self, scope: CandidateScope) -> Self {
        self.scope = scope;
        self
    }

    /// Deck copies per card id, with the seed counted once if absent.
    fn copies(&self) -> BTreeMap<CardId, u32> {
        let mut copies = BTreeMap::new();
        for id in &self.deck_card_ids {
            *copies.entry(*id).or_insert(0) += 1;
        }
        if self.seed_card_id > 0 {
            copies.entry(self.seed_card_id).or_insert(1);
        }
        copies
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NextCardSuggestion {
    #[serde(flatten)]
    pub card: CardWithOwnership,
    pub recommended_copies: u32,
    pub score_breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synergy_details: Vec<SynergyDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveDeckAnalysis {
    pub color_identity: Vec<Color>,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    pub current_curve: BTreeMap<u32, u32>,
    pub recommended_land_count: u32,
    pub total_cards: u32,
    pub in_collection_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct IterativeResponse {
    pub suggestions: Vec<NextCardSuggestion>,
    pub deck_analysis: LiveDeckAnalysis,
    pub slots_remaining: u32,
    pub land_suggestions: Vec<SuggestedLand>,
}

/// Higher the further the deck is below the gap curve at this mana value.
pub fn curve_gap_score(card: &Card, composition: &DeckComposition) -> f64 {
    if card.is_land() {
        return 0.5;
    }
    let slot = card.cmc_slot().clamp(1, 6);
    let ideal = GAP_CURVE
        .iter()
        .find(|(cmc, _)| *cmc == slot)
        .map(|(_, count)| *count)
        .unwrap_or(0);
    let current = if slot == 6 {
        composition
            .mana_curve
            .range(6..)
            .map(|(_, count)| *count)
            .sum()
    } else {
        composition.curve_count(slot)
    };
    if ideal == 0 || current >= ideal {
        return 0.3;
    }
    let gap = (ideal - current) as f64;
    (0.5 + gap / ideal as f64 * 0.5).min(1.0)
}

/// Copies worth running, before subtracting what the deck already holds.
pub fn recommended_copies(card: &Card, score: f64, max_copies: u32) -> u32 {
    let type_line = card.type_line.to_lowercase();
    if type_line.contains("planeswalker") {
        return 2.min(max_copies);
    }
    if type_line.contains("legendary") {
        let copies = if score >= 0.75 { 3 } else { 2 };
        return copies.min(max_copies);
    }
    let cmc = card.cmc_slot();
    if cmc <= 2 && score >= 0.7 {
        return max_copies;
    }
    let base: u32 = match cmc {
        0..=3 => 3,
        4..=5 => 2,
        _ => 1,
    };
    let bonus = u32::from(score >= 0.75);
    (base + bonus).min(max_copies).max(1)
}

impl SeedDeckBuilder {
    /// Suggestions for the next cards of a deck in progress, scored against
    /// the whole deck.
    pub async fn suggest_next_cards(
        &self,
        request: &IterativeRequest,
    ) -> DeckResult<IterativeResponse> {
        if request.deck_card_ids.is_empty() {
            return Err(DeckError::InvalidRequest(
                "deck card list is required".to_string(),
            ));
        }
        let copies = request.copies();
        let cards = self.sources.require_cards()?;
        let ids: Vec<CardId> = copies.keys().copied().collect();
        let loaded = fetch_card_map(cards.clone(), &ids).await;
        if loaded.is_empty() {
            return Err(DeckError::InvalidRequest("could not load any deck cards".to_string()));
        }

        let mut deck: Vec<&Card> = Vec::new();
        for (id, count) in &copies {
            if let Some(card) = loaded.get(id) {
                deck.extend(std::iter::repeat(card).take(*count as usize));
            }
        }
        let composition = analyze_cards(deck.iter().copied());
        let target = SynergyTarget::from_cards(deck.iter().copied());
        debug!(cards = deck.len(), colors = ?target.colors, "analyzed deck in progress");

        let max_copies = self.tuning.max_copies;
        let full: Vec<CardId> = copies
            .iter()
            .filter(|(_, count)| **count >= max_copies)
            .map(|(id, _)| *id)
            .collect();
        let home_set = loaded
            .get(&request.seed_card_id)
            .or_else(|| loaded.values().next())
            .map(|card| card.set_code.clone())
            .unwrap_or_default();
        let candidates = self.candidates(&request.scope, &home_set, &full).await?;

        let collection = self.collection().await;
        let owned = |id: CardId| collection.get(&id).copied().unwrap_or(0);

        let mut suggestions: Vec<NextCardSuggestion> = candidates
            .iter()
            .filter(|card| !card.is_land())
            .filter(|card| {
                card.is_colorless()
                    || target.colors.is_empty()
                    || card.shares_color_with(&target.colors)
            })
            .filter(|card| !request.scope.budget_mode || owned(card.id) > 0)
            .filter_map(|card| {
                let in_deck = copies.get(&card.id).copied().unwrap_or(0);
                let suggestion = score_next_card(
                    card,
                    &target,
                    &composition,
                    in_deck,
                    owned(card.id),
                    max_copies,
                );
                (suggestion.card.score >= self.tuning.min_score).then_some(suggestion)
            })
            .collect();
        suggestions.sort_by(|a, b| b.card.score.total_cmp(&a.card.score));
        suggestions.truncate(self.max_results(request.max_results));

        let total_cards = deck.len() as u32;
        let land_count = recommended_land_count(composition.average_cmc);
        let land_suggestions = deck_lands(&composition, &suggestions, land_count);
        let in_collection_count = copies.keys().filter(|id| owned(**id) > 0).count() as u32;

        info!(
            deck_cards = total_cards,
            suggestions = suggestions.len(),
            "suggested next cards"
        );
        Ok(IterativeResponse {
            suggestions,
            slots_remaining: CONSTRUCTED_DECK_SIZE.saturating_sub(total_cards + land_count),
            land_suggestions,
            deck_analysis: LiveDeckAnalysis {
                color_identity: target.colors.clone(),
                keywords: target.keyword_names(),
                themes: target.themes.clone(),
                current_curve: composition.mana_curve.clone(),
                recommended_land_count: land_count,
                total_cards,
                in_collection_count,
            },
        })
    }
}

fn score_next_card(
    card: &Card,
    target: &SynergyTarget,
    composition: &DeckComposition,
    in_deck: u32,
    owned: u32,
    max_copies: u32,
) -> NextCardSuggestion {
    let color = color_compatibility(card, &target.colors);
    let curve = curve_gap_score(card, composition);
    let (synergy, details) = synergy_with(card, target);
    let quality = rarity_quality(card);
    let overall = combine(color, curve, synergy, quality);

    let room = max_copies.saturating_sub(in_deck);
    let copies = recommended_copies(card, overall, max_copies)
        .saturating_sub(in_deck)
        .clamp(1, room.max(1));
    let reasoning = seed_reasoning(color, curve, synergy, quality, card.cmc_slot());

    NextCardSuggestion {
        card: CardWithOwnership::new(card, overall, reasoning, owned, copies + in_deck),
        recommended_copies: copies,
        score_breakdown: ScoreBreakdown {
            color_fit: color,
            curve_fit: curve,
            synergy,
            quality,
            overall,
        },
        synergy_details: details,
    }
}

/// Deck colors by copy count, plus one per suggestion.
fn deck_lands(
    composition: &DeckComposition,
    suggestions: &[NextCardSuggestion],
    total: u32,
) -> Vec<SuggestedLand> {
    let mut weights: BTreeMap<Color, u32> = composition.colors.clone();
    for suggestion in suggestions {
        for color in &suggestion.card.colors {
            *weights.entry(*color).or_insert(0) += 1;
        }
    }
    rounded_basics(&weights, total)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::analysis::analyze_cards;
    use crate::builder::fixtures::{catalog, SEED};
    use crate::builder::iterative::{curve_gap_score, recommended_copies, IterativeRequest};
    use crate::builder::SeedDeckBuilder;
    use crate::error::DeckError;
    use crate::sources::CardSources;
    use crate::types::{Card, Color};

    fn builder() -> SeedDeckBuilder {
        SeedDeckBuilder::new(CardSources::from_catalog(Arc::new(catalog())))
    }

    #[test]
    fn gap_score_falls_as_slot_fills() {
        let two_drop = Card::new(1, "Bear", "Creature — Bear").with_cmc(2.0);
        let empty = analyze_cards(std::iter::empty());
        assert_eq!(curve_gap_score(&two_drop, &empty), 1.0);

        let bears: Vec<Card> = (0..9).map(|_| two_drop.clone()).collect();
        let full = analyze_cards(bears.iter());
        assert_eq!(curve_gap_score(&two_drop, &full), 0.3);

        let some: Vec<Card> = bears.iter().take(3).cloned().collect();
        let partial = analyze_cards(some.iter());
        let expected = 0.5 + 6.0 / 9.0 * 0.5;
        assert!((curve_gap_score(&two_drop, &partial) - expected).abs() < 1e-9);
    }

    #[test]
    fn copy_heuristics() {
        let walker = Card::new(1, "Nissa", "Legendary Planeswalker — Nissa").with_cmc(4.0);
        let legend = Card::new(2, "Lord", "Legendary Creature — Elf").with_cmc(3.0);
        let one_drop = Card::new(3, "Scout", "Creature — Elf").with_cmc(1.0);
        let dragon = Card::new(4, "Dragon", "Creature — Dragon")
            .with_cmc(6.0)
            .with_colors(&[Color::Red]);
        assert_eq!(recommended_copies(&walker, 0.9, 4), 2);
        assert_eq!(recommended_copies(&legend, 0.8, 4), 3);
        assert_eq!(recommended_copies(&legend, 0.5, 4), 2);
        assert_eq!(recommended_copies(&one_drop, 0.8, 4), 4);
        assert_eq!(recommended_copies(&one_drop, 0.5, 4), 3);
        assert_eq!(recommended_copies(&dragon, 0.8, 4), 2);
        assert_eq!(recommended_copies(&dragon, 0.5, 4), 1);
    }

    #[tokio::test]
    async fn suggests_for_whole_deck() {
        let request = IterativeRequest::new(SEED, vec![SEED, SEED, SEED, SEED, 2, 2, 3]);
        let response = builder().suggest_next_cards(&request).await.expect("response");

        let ids: Vec<_> = response.suggestions.iter().map(|s| s.card.card_id).collect();
        // The seed is already at four copies.
        assert!(!ids.contains(&SEED));
        // Off-color cards are filtered out.
        assert!(!ids.contains(&4));
        // Lands are not suggested as spells.
        assert!(!ids.contains(&8));
        assert!(ids.contains(&2));
        for pair in response.suggestions.windows(2) {
            assert!(pair[0].card.score >= pair[1].card.score);
        }
        let veteran = response
            .suggestions
            .iter()
            .find(|s| s.card.card_id == 2)
            .expect("veteran");
        assert!(veteran.recommended_copies >= 1 && veteran.recommended_copies <= 2);
        assert!(veteran.synergy_details.iter().any(|d| d.name == "Elf"));

        let analysis = &response.deck_analysis;
        assert_eq!(analysis.total_cards, 7);
        assert_eq!(analysis.color_identity, vec![Color::Green]);
        assert_eq!(analysis.recommended_land_count, 22);
        assert_eq!(analysis.in_collection_count, 2);
        assert_eq!(response.slots_remaining, 60 - 7 - 22);
    }

    #[tokio::test]
    async fn empty_deck_is_rejected() {
        let err = builder()
            .suggest_next_cards(&IterativeRequest::new(0, Vec::new()))
            .await
            .expect_err("empty deck");
        assert!(matches!(err, DeckError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn seed_alone_is_not_a_deck() {
        let err = builder()
            .suggest_next_cards(&IterativeRequest::new(SEED, Vec::new()))
            .await
            .expect_err("seed without deck cards");
        match err {
            DeckError::InvalidRequest(message) => {
                assert_eq!(message, "deck card list is required")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
