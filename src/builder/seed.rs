use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builder::lands::rounded_basics;
use crate::builder::synergy::{
    color_compatibility, constructed_curve_fit, rarity_quality, synergy_with, SynergyTarget,
};
use crate::builder::{tally_missing, CandidateScope, CardWithOwnership, SeedDeckBuilder};
use crate::error::DeckResult;
use crate::scoring::join_reasons;
use crate::types::{Card, CardId, Color, ScoreBreakdown, ScoredCard, SuggestedLand};

pub const COLOR_WEIGHT: f64 = 0.25;
pub const CURVE_WEIGHT: f64 = 0.20;
pub const SYNERGY_WEIGHT: f64 = 0.30;
pub const QUALITY_WEIGHT: f64 = 0.15;
pub const LEGALITY_WEIGHT: f64 = 0.05;
pub const PLAYABILITY_WEIGHT: f64 = 0.05;
const CONSTRUCTED_PLAYABILITY: f64 = 0.8;

/// Spell counts per mana value a 60-card deck aims for.
pub const IDEAL_CURVE: [(u32, u32); 6] = [(1, 4), (2, 8), (3, 8), (4, 6), (5, 4), (6, 2)];

/// Seed copies assumed when totalling the deck size.
const SEED_COPIES: u32 = 4;
const SEED_LAND_WEIGHT: u32 = 4;
const TOP_SUGGESTIONS: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedRequest {
    pub seed_card_id: CardId,
    /// Zero means the tuned default.
    pub max_results: usize,
    #[serde(flatten)]
    pub scope: CandidateScope,
}

impl SeedRequest {
    pub fn new(seed_card_id: CardId) -> Self {
        Self {
            seed_card_id,
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
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedDeckAnalysis {
    pub color_identity: Vec<Color>,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    pub ideal_curve: BTreeMap<u32, u32>,
    pub suggested_land_count: u32,
    pub total_cards: u32,
    pub in_collection_count: u32,
    pub missing_count: u32,
    pub missing_wildcard_cost: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResponse {
    pub seed_card: CardWithOwnership,
    pub suggestions: Vec<CardWithOwnership>,
    pub land_suggestions: Vec<SuggestedLand>,
    pub analysis: SeedDeckAnalysis,
}

/// Seed-relative score of one candidate, with its factor breakdown.
pub fn score_for_seed(card: &Card, target: &SynergyTarget) -> ScoredCard {
    let color = color_compatibility(card, &target.colors);
    let curve = constructed_curve_fit(card);
    let (synergy, details) = synergy_with(card, target);
    let quality = rarity_quality(card);
    let overall = combine(color, curve, synergy, quality);

    ScoredCard::new(
        card.clone(),
        overall,
        seed_reasoning(color, curve, synergy, quality, card.cmc_slot()),
    )
    .with_breakdown(ScoreBreakdown {
        color_fit: color,
        curve_fit: curve,
        synergy,
        quality,
        overall,
    })
    .with_synergy_details(details)
}

pub(crate) fn combine(color: f64, curve: f64, synergy: f64, quality: f64) -> f64 {
    color * COLOR_WEIGHT
        + curve * CURVE_WEIGHT
        + synergy * SYNERGY_WEIGHT
        + quality * QUALITY_WEIGHT
        + LEGALITY_WEIGHT
        + CONSTRUCTED_PLAYABILITY * PLAYABILITY_WEIGHT
}

pub(crate) fn seed_reasoning(
    color: f64,
    curve: f64,
    synergy: f64,
    quality: f64,
    cmc: u32,
) -> String {
    let mut reasons = Vec::new();
    if color >= 0.8 {
        reasons.push("matches your colors".to_string());
    }
    if curve >= 0.7 {
        reasons.push(format!("good curve fit at {cmc} CMC"));
    }
    if synergy >= 0.7 {
        reasons.push("synergizes with your strategy".to_string());
    }
    if quality >= 0.7 {
        reasons.push("high-quality card".to_string());
    }
    join_reasons(&reasons)
}

impl SeedDeckBuilder {
    /// Ranked suggestions for a deck built around one card.
    pub async fn build_around_seed(&self, request: &SeedRequest) -> DeckResult<SeedResponse> {
        let seed = self.load_seed(request.seed_card_id).await?;
        let target = SynergyTarget::from_card(&seed);
        let max_results = self.max_results(request.max_results);

        let candidates = self
            .candidates(&request.scope, &seed.set_code, &[seed.id])
            .await?;

        let mut scored: Vec<ScoredCard> = candidates
            .iter()
            .map(|card| score_for_seed(card, &target))
            .filter(|entry| entry.score >= self.tuning.min_score)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let collection = self.collection().await;
        let owned = |id: CardId| collection.get(&id).copied().unwrap_or(0);
        if request.scope.budget_mode {
            scored.retain(|entry| owned(entry.card.id) > 0);
        }
        scored.truncate(max_results);

        let max_copies = self.tuning.max_copies;
        let suggestions: Vec<CardWithOwnership> = scored
            .into_iter()
            .map(|entry| {
                let have = owned(entry.card.id);
                CardWithOwnership::new(&entry.card, entry.score, entry.reasoning, have, max_copies)
            })
            .collect();

        let land_suggestions = seed_lands(&target.colors, &suggestions, self.tuning.land_total);
        let analysis = seed_analysis(&target, &suggestions, &land_suggestions);
        let seed_card = CardWithOwnership::new(
            &seed,
            1.0,
            "This is your build-around card.".to_string(),
            owned(seed.id),
            max_copies,
        );

        info!(
            seed = %seed.name,
            suggestions = suggestions.len(),
            "built around seed card"
        );
        Ok(SeedResponse {
            seed_card,
            suggestions,
            land_suggestions,
            analysis,
        })
    }
}

/// Seed colors weigh four, the top suggestions two, the rest one.
fn seed_lands(
    seed_colors: &[Color],
    suggestions: &[CardWithOwnership],
    total: u32,
) -> Vec<SuggestedLand> {
    let mut weights: BTreeMap<Color, u32> = BTreeMap::new();
    for color in seed_colors {
        *weights.entry(*color).or_insert(0) += SEED_LAND_WEIGHT;
    }
    for (index, card) in suggestions.iter().enumerate() {
        let weight = if index < TOP_SUGGESTIONS { 2 } else { 1 };
        for color in &card.colors {
            *weights.entry(*color).or_insert(0) += weight;
        }
    }
    rounded_basics(&weights, total)
}

fn seed_analysis(
    target: &SynergyTarget,
    suggestions: &[CardWithOwnership],
    lands: &[SuggestedLand],
) -> SeedDeckAnalysis {
    let (in_collection, missing, cost) = tally_missing(suggestions);
    let land_count: u32 = lands.iter().map(|land| land.quantity).sum();
    SeedDeckAnalysis {
        color_identity: target.colors.clone(),
        keywords: target.keyword_names(),
        themes: target.themes.clone(),
        ideal_curve: IDEAL_CURVE.into_iter().collect(),
        suggested_land_count: land_count,
        total_cards: suggestions.len() as u32 + land_count + SEED_COPIES,
        in_collection_count: in_collection,
        missing_count: missing,
        missing_wildcard_cost: cost,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::builder::fixtures::{catalog, SEED};
    use crate::builder::seed::{score_for_seed, SeedRequest};
    use crate::builder::synergy::SynergyTarget;
    use crate::builder::{CandidateScope, SeedDeckBuilder, SetRestriction};
    use crate::error::DeckError;
    use crate::sources::CardSources;

    fn builder() -> SeedDeckBuilder {
        SeedDeckBuilder::new(CardSources::from_catalog(Arc::new(catalog())))
    }

    #[test]
    fn tribal_partner_outscores_off_color_card() {
        let catalog = catalog();
        let seed = catalog.card(SEED).expect("seed");
        let target = SynergyTarget::from_card(seed);
        let veteran = score_for_seed(catalog.card(2).expect("veteran"), &target);
        let harvest = score_for_seed(catalog.card(4).expect("harvest"), &target);
        assert!(veteran.score > harvest.score);
        let breakdown = veteran.breakdown.expect("breakdown");
        assert_eq!(breakdown.color_fit, 1.0);
        assert!((breakdown.synergy - 0.8).abs() < 1e-9);
        assert!(veteran.reasoning.starts_with("This card matches your colors"));
        // 0.25 + 0.2 + 0.24 + 0.09 + 0.05 + 0.04
        assert!((veteran.score - 0.87).abs() < 1e-9);
    }

    #[tokio::test]
    async fn builds_from_standard_sets() {
        let response = builder()
            .build_around_seed(&SeedRequest::new(SEED))
            .await
            .expect("response");

        assert_eq!(response.seed_card.score, 1.0);
        assert_eq!(response.seed_card.reasoning, "This is your build-around card.");
        assert_eq!(response.seed_card.needed_count, 3);
        let ids: Vec<_> = response.suggestions.iter().map(|c| c.card_id).collect();
        assert!(!ids.contains(&SEED));
        // Pelt Collector lives outside the standard sets.
        assert!(!ids.contains(&7));
        assert_eq!(ids[0], 2);
        for pair in response.suggestions.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(response.suggestions.len() <= 40);

        let analysis = &response.analysis;
        assert_eq!(analysis.ideal_curve.get(&2), Some(&8));
        assert_eq!(
            analysis.total_cards,
            response.suggestions.len() as u32 + analysis.suggested_land_count + 4
        );
        assert_eq!(
            analysis.in_collection_count + analysis.missing_count,
            response.suggestions.len() as u32
        );
        assert!(analysis.themes.contains(&"card draw".to_string()));
        assert!(response.land_suggestions.iter().any(|l| l.name == "Forest"));
    }

    #[tokio::test]
    async fn budget_mode_keeps_owned_cards() {
        let request = SeedRequest::new(SEED)
            .with_scope(CandidateScope::default().with_budget_mode(true));
        let response = builder().build_around_seed(&request).await.expect("response");
        let ids: Vec<_> = response.suggestions.iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert!(response.suggestions.iter().all(|c| c.in_collection));
    }

    #[tokio::test]
    async fn single_set_and_max_results() {
        let request = SeedRequest::new(SEED)
            .with_max_results(2)
            .with_scope(CandidateScope::default().with_restriction(SetRestriction::Single));
        let response = builder().build_around_seed(&request).await.expect("response");
        assert_eq!(response.suggestions.len(), 2);
        assert!(response.suggestions.iter().all(|c| [2, 3, 4].contains(&c.card_id)));

        let multiple = SeedRequest::new(SEED)
            .with_scope(CandidateScope::default().with_sets(vec!["ZZZ".into(), "NOPE".into()]));
        let response = builder().build_around_seed(&multiple).await.expect("response");
        let ids: Vec<_> = response.suggestions.iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[tokio::test]
    async fn rejects_bad_seed() {
        let err = builder()
            .build_around_seed(&SeedRequest::new(0))
            .await
            .expect_err("zero id");
        assert_eq!(err.to_string(), "invalid request: seed card ID is required");

        let err = builder()
            .build_around_seed(&SeedRequest::new(999))
            .await
            .expect_err("missing seed");
        assert!(matches!(err, DeckError::CardNotFound(999)));
    }
}
