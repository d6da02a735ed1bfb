use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::{analyze_deck, DeckComposition};
use crate::error::{DeckError, DeckResult};
use crate::recommend::explain::{confidence, generate_explanation, primary_source};
use crate::recommend::{CardRecommendation, DeckContext, Filters, RecommendTuning};
use crate::scoring::quality::lookup_quality;
use crate::scoring::{color_fit, curve_fit, deck_synergy, playability};
use crate::sources::bulk::fetch_cards;
use crate::sources::{CardLookup, CardSources};
use crate::types::{Card, CardId, ScoreFactors};

/// Rule-based recommendation engine. Holds no state between calls.
#[derive(Clone)]
pub struct RecommendationEngine {
    sources: CardSources,
    tuning: RecommendTuning,
}

impl RecommendationEngine {
    pub fn new(sources: CardSources) -> Self {
        Self {
            sources,
            tuning: RecommendTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: RecommendTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &RecommendTuning {
        &self.tuning
    }

    /// Ranked recommendations for `deck`. Without `filters` the tuning's
    /// defaults apply.
    pub async fn recommend(
        &self,
        deck: &DeckContext,
        filters: Option<&Filters>,
    ) -> DeckResult<Vec<CardRecommendation>> {
        let cards = self.sources.require_cards()?;
        let default_filters;
        let filters = match filters {
            Some(filters) => filters,
            None => {
                default_filters = Filters::from_tuning(&self.tuning);
                &default_filters
            }
        };

        let composition = analyze_deck(&deck.cards, &deck.metadata);

        if !filters.only_draft_pool || filters.draft_pool.is_empty() {
            debug!("no candidate pool supplied, nothing to recommend");
            return Ok(Vec::new());
        }
        let candidates = self.draft_candidates(Arc::clone(cards), &filters.draft_pool).await;
        debug!(count = candidates.len(), "loaded draft pool candidates");

        let mut recommendations = Vec::new();
        for card in candidates {
            if deck.contains(card.id) || !filters.matches(&card) {
                continue;
            }
            let recommendation = self.score_card(card, deck, &composition).await;
            if recommendation.score >= filters.min_score {
                recommendations.push(recommendation);
            }
        }

        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
        recommendations.truncate(filters.max_results);

        info!(count = recommendations.len(), "generated recommendations");
        Ok(recommendations)
    }

    /// Reasoning text for a single card against `deck`.
    pub async fn explain(&self, card_id: CardId, deck: &DeckContext) -> DeckResult<String> {
        let cards = self.sources.require_cards()?;
        let card = cards
            .get_card(card_id)
            .await?
            .ok_or(DeckError::CardNotFound(card_id))?;
        let composition = analyze_deck(&deck.cards, &deck.metadata);
        Ok(self.score_card(card, deck, &composition).await.reasoning)
    }

    /// Accepted for API compatibility. Nothing is recorded.
    pub async fn record_acceptance(
        &self,
        _deck_id: &str,
        _card_id: CardId,
        _accepted: bool,
    ) -> DeckResult<()> {
        Ok(())
    }

    async fn draft_candidates(
        &self,
        cards: Arc<dyn CardLookup>,
        pool: &[CardId],
    ) -> Vec<Card> {
        let Some(local) = self.sources.local.as_ref() else {
            return fetch_cards(cards, pool).await;
        };
        let mut candidates = Vec::with_capacity(pool.len());
        for id in pool {
            match local.get_card(*id).await {
                Ok(Some(card)) => candidates.push(card),
                Ok(None) => {}
                Err(err) => debug!(card_id = id, error = %err, "local card lookup failed"),
            }
        }
        candidates
    }

    async fn score_card(
        &self,
        card: Card,
        deck: &DeckContext,
        composition: &DeckComposition,
    ) -> CardRecommendation {
        let quality = lookup_quality(
            self.sources.ratings.as_deref(),
            &card,
            &deck.set_code,
            &deck.draft_format,
        )
        .await;

        let factors = ScoreFactors {
            color_fit: color_fit(&card, &composition.color_identity, &composition.primary_colors),
            mana_curve: curve_fit(&card, composition, &self.tuning.curve),
            synergy: deck_synergy(&card, composition),
            quality,
            playable: playability(&card, &deck.format, deck.draft_card_ids.as_deref()),
        };

        let score = self.tuning.weights.apply(&factors);
        CardRecommendation {
            reasoning: generate_explanation(&card, &factors),
            source: primary_source(&factors),
            confidence: confidence(&factors),
            card,
            score,
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::error::DeckError;
    use crate::recommend::{DeckContext, Filters, RecommendationEngine};
    use crate::sources::memory::InMemoryCatalog;
    use crate::sources::CardSources;
    use crate::types::{Card, Color, DeckCard};

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        for id in 1..=4 {
            catalog = catalog.with_card(
                Card::new(id, &format!("Elf {id}"), "Creature — Elf")
                    .with_cmc(2.0)
                    .with_colors(&[Color::Green])
                    .with_rarity("common"),
            );
        }
        catalog
            .with_card(
                Card::new(10, "Rampaging Baloth", "Creature — Beast")
                    .with_cmc(6.0)
                    .with_colors(&[Color::Green])
                    .with_rarity("mythic"),
            )
            .with_card(
                Card::new(11, "Counterspell", "Instant")
                    .with_cmc(2.0)
                    .with_colors(&[Color::Blue])
                    .with_rarity("common"),
            )
            .with_card(Card::new(12, "Forest", "Basic Land — Forest").with_rarity("common"))
            .with_card(
                Card::new(13, "Elvish Mystic", "Creature — Elf Druid")
                    .with_cmc(1.0)
                    .with_colors(&[Color::Green])
                    .with_rarity("uncommon"),
            )
    }

    fn deck(catalog: &InMemoryCatalog) -> DeckContext {
        let metadata: HashMap<_, _> = (1..=4)
            .filter_map(|id| catalog.card(id).cloned().map(|card| (id, card)))
            .collect();
        DeckContext {
            cards: (1..=4).map(|id| DeckCard::main(id, 1)).collect(),
            metadata,
            format: "Limited".to_string(),
            ..DeckContext::default()
        }
    }

    fn engine() -> (RecommendationEngine, DeckContext) {
        let catalog = Arc::new(catalog());
        let deck = deck(&catalog);
        (RecommendationEngine::new(CardSources::from_catalog(catalog)), deck)
    }

    #[tokio::test]
    async fn ranks_pool_and_skips_deck_cards() {
        let (engine, deck) = engine();
        let filters = Filters::default().with_draft_pool(vec![1, 2, 10, 11, 12, 13]);
        let recs = engine.recommend(&deck, Some(&filters)).await.expect("recommend");

        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.card.id != 1 && r.card.id != 2));
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for rec in &recs {
            assert!((0.0..=1.0).contains(&rec.score));
            assert!(rec.factors.values().iter().all(|v| (0.0..=1.0).contains(v)));
            assert!(rec.score >= filters.min_score);
        }
        let ids: Vec<_> = recs.iter().map(|r| r.card.id).collect();
        assert_eq!(ids, vec![10, 13, 12, 11]);
    }

    #[tokio::test]
    async fn truncates_to_max_results() {
        let (engine, deck) = engine();
        let filters = Filters {
            max_results: 2,
            min_score: 0.0,
            ..Filters::default().with_draft_pool(vec![10, 11, 12, 13])
        };
        let recs = engine.recommend(&deck, Some(&filters)).await.expect("recommend");
        assert_eq!(recs.len(), 2);
    }

    #[tokio::test]
    async fn no_pool_means_no_recommendations() {
        let (engine, deck) = engine();
        let recs = engine.recommend(&deck, None).await.expect("recommend");
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn missing_card_lookup_is_a_configuration_error() {
        let engine = RecommendationEngine::new(CardSources::new());
        let err = engine
            .recommend(&DeckContext::default(), None)
            .await
            .expect_err("should fail");
        assert!(matches!(err, DeckError::MissingCollaborator(_)));
    }

    #[tokio::test]
    async fn explain_matches_recommendation_reasoning() {
        let (engine, deck) = engine();
        let filters = Filters {
            min_score: 0.0,
            ..Filters::default().with_draft_pool(vec![13])
        };
        let recs = engine.recommend(&deck, Some(&filters)).await.expect("recommend");
        let text = engine.explain(13, &deck).await.expect("explain");
        assert_eq!(text, recs[0].reasoning);
        assert!(text.starts_with("This card"));

        let missing = engine.explain(999, &deck).await.expect_err("missing card");
        assert!(matches!(missing, DeckError::CardNotFound(999)));
        assert!(engine.record_acceptance("deck", 13, true).await.is_ok());
    }
}
