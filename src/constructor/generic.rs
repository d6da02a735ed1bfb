use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::constructor::selection::{
    count_lands, distribute_lands, select_by_curve, LIMITED_SELECTION_CURVE,
};
use crate::constructor::{
    filter_by_color_fit, ColorCombination, DeckConstructor, DeckSuggestionAnalysis,
    SuggestDecksResponse, SuggestedCard, SuggestedDeck, Viability, ALL_COLOR_COMBINATIONS,
};
use crate::ontology::extract_keywords;
use crate::scoring::mana_consistency;
use crate::scoring::quality::lookup_gih_quality;
use crate::types::{Card, CardId, ScoredCard};

const QUALITY_WEIGHT: f64 = 0.40;
const CURVE_WEIGHT: f64 = 0.30;
const SYNERGY_WEIGHT: f64 = 0.20;
const COLOR_WEIGHT: f64 = 0.10;

/// Keywords and curve counts of a candidate pool, computed once per color
/// combination.
pub(crate) struct PoolIndex {
    keywords: Vec<(CardId, BTreeSet<String>)>,
    curve: BTreeMap<u32, u32>,
}

impl PoolIndex {
    pub(crate) fn new(pool: &[Card]) -> Self {
        let keywords = pool
            .iter()
            .map(|card| {
                let found = card
                    .oracle_text
                    .as_deref()
                    .map(extract_keywords)
                    .unwrap_or_default();
                (card.id, found)
            })
            .collect();
        let mut curve = BTreeMap::new();
        for card in pool.iter().filter(|card| !card.is_land()) {
            *curve.entry(card.cmc_slot()).or_insert(0) += 1;
        }
        Self { keywords, curve }
    }

    pub(crate) fn curve_count(&self, cmc: u32) -> u32 {
        self.curve.get(&cmc).copied().unwrap_or(0)
    }

    /// 0.5 plus up to 0.5 for other pool cards sharing a keyword, maxing out
    /// at five such cards.
    pub(crate) fn synergy(&self, card: &Card) -> f64 {
        let Some(text) = card.oracle_text.as_deref() else {
            return 0.5;
        };
        let own = extract_keywords(text);
        if own.is_empty() {
            return 0.5;
        }
        let sharing = self
            .keywords
            .iter()
            .filter(|(id, other)| *id != card.id && own.iter().any(|kw| other.contains(kw)))
            .count();
        (sharing as f64 / 5.0).min(1.0) * 0.5 + 0.5
    }
}

fn friendly_keyword(keyword: &str) -> &str {
    match keyword {
        "flying" => "Flying",
        "tokens" => "Tokens",
        "+1/+1 counters" => "+1/+1 Counters",
        "graveyard" => "Graveyard",
        "sacrifice" => "Sacrifice",
        "card draw" => "Card Draw",
        "lifegain" => "Lifegain",
        "ETB" => "Enter the Battlefield",
        "cast triggers" => "Spells Matter",
        "death triggers" => "Death Triggers",
        other => other,
    }
}

/// Keywords carried by at least three chosen cards.
pub fn detect_synergies(selected: &[ScoredCard]) -> Vec<String> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for entry in selected {
        if let Some(text) = entry.card.oracle_text.as_deref() {
            for keyword in extract_keywords(text) {
                *counts.entry(keyword).or_insert(0) += 1;
            }
        }
    }
    counts
        .iter()
        .filter(|(_, count)| **count >= 3)
        .map(|(keyword, count)| format!("{} ({count} cards)", friendly_keyword(keyword)))
        .collect()
}

pub fn analyze_selection(selected: &[ScoredCard], playable_count: usize) -> DeckSuggestionAnalysis {
    let mut analysis = DeckSuggestionAnalysis {
        playable_count,
        ..DeckSuggestionAnalysis::default()
    };

    let mut total_cmc = 0.0;
    for entry in selected {
        let card = &entry.card;
        if card.is_creature() {
            analysis.creature_count += 1;
        } else {
            analysis.spell_count += 1;
        }
        *analysis.mana_curve.entry(card.cmc_slot()).or_insert(0) += 1;
        total_cmc += card.cmc;
        for color in &card.colors {
            *analysis.color_distribution.entry(*color).or_insert(0) += 1;
        }
    }
    if !selected.is_empty() {
        analysis.average_cmc = total_cmc / selected.len() as f64;
    }
    analysis.top_cards = selected.iter().take(3).map(|e| e.card.name.clone()).collect();
    analysis.synergies = detect_synergies(selected);
    analysis
}

pub fn average_score(selected: &[ScoredCard]) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }
    selected.iter().map(|e| e.score).sum::<f64>() / selected.len() as f64
}

pub fn deck_score(
    selected: &[ScoredCard],
    analysis: &DeckSuggestionAnalysis,
    combo: &ColorCombination,
    spell_target: usize,
) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }

    let ratio = analysis.creature_count as f64 / spell_target as f64;
    let creature = if (0.6..=0.75).contains(&ratio) {
        1.0
    } else if (0.5..=0.8).contains(&ratio) {
        0.7
    } else {
        0.4
    };

    let curve_at = |cmc: u32| analysis.mana_curve.get(&cmc).copied().unwrap_or(0);
    let twos = curve_at(2) >= 3;
    let threes = curve_at(3) >= 3;
    let fours = curve_at(4) >= 2;
    let curve = match (twos, threes, fours) {
        (true, true, true) => 1.0,
        (true, true, false) => 0.7,
        _ if twos || threes => 0.5,
        _ => 0.3,
    };

    average_score(selected) * 0.50
        + creature * 0.15
        + curve * 0.15
        + mana_consistency(combo.colors.len()) * 0.20
}

pub fn viability(score: f64, analysis: &DeckSuggestionAnalysis) -> Viability {
    if score >= 0.7 && analysis.creature_count >= 10 && analysis.playable_count >= 20 {
        Viability::Strong
    } else if score >= 0.5 && analysis.creature_count >= 6 {
        Viability::Viable
    } else {
        Viability::Weak
    }
}

impl DeckConstructor {
    /// Best deck per color combination, ranked by deck score.
    ///
    /// An empty or unloadable pool is reported through the response's
    /// `error` field.
    pub async fn suggest_decks(
        &self,
        pool: &[CardId],
        set_code: &str,
        format: &str,
    ) -> SuggestDecksResponse {
        if pool.is_empty() {
            return SuggestDecksResponse::failed("No cards in draft pool");
        }
        let cards = self.load_pool(pool).await;
        if cards.is_empty() {
            return SuggestDecksResponse::failed("Could not load any cards from draft pool");
        }
        info!(count = cards.len(), "loaded cards from pool");

        let mut suggestions = Vec::new();
        for combo in &ALL_COLOR_COMBINATIONS {
            if let Some(deck) = self.evaluate_combination(combo, &cards, set_code, format).await {
                suggestions.push(deck);
            }
        }
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        info!(count = suggestions.len(), "found viable color combinations");

        SuggestDecksResponse {
            best_combo: suggestions.first().map(|deck| deck.color_combo),
            total_combos: ALL_COLOR_COMBINATIONS.len(),
            viable_combos: suggestions.len(),
            suggestions,
            error: None,
        }
    }

    pub(crate) fn has_enough_playables(&self, candidates: &[Card], min_creatures: usize) -> bool {
        if candidates.len() < self.tuning.min_candidates {
            return false;
        }
        candidates.iter().filter(|card| card.is_creature()).count() >= min_creatures
    }

    async fn evaluate_combination(
        &self,
        combo: &ColorCombination,
        pool: &[Card],
        set_code: &str,
        format: &str,
    ) -> Option<SuggestedDeck> {
        let candidates = filter_by_color_fit(pool, combo);
        if !self.has_enough_playables(&candidates, self.tuning.min_creatures) {
            debug!(combo = combo.name, candidates = candidates.len(), "combination not viable");
            return None;
        }

        let index = PoolIndex::new(&candidates);
        let mut scored = Vec::with_capacity(candidates.len());
        for card in &candidates {
            scored.push(self.score_for_deck(card, &index, set_code, format).await);
        }

        let selected = select_by_curve(scored, self.tuning.spell_target, &LIMITED_SELECTION_CURVE);
        let lands = distribute_lands(&selected, combo, self.tuning.land_count);
        let analysis = analyze_selection(&selected, candidates.len());
        let score = deck_score(&selected, &analysis, combo, self.tuning.spell_target);

        Some(SuggestedDeck {
            color_combo: *combo,
            spells: selected.iter().map(SuggestedCard::from).collect(),
            total_cards: selected.len() as u32 + count_lands(&lands),
            lands,
            score,
            viability: viability(score, &analysis),
            analysis,
        })
    }

    async fn score_for_deck(
        &self,
        card: &Card,
        index: &PoolIndex,
        set_code: &str,
        format: &str,
    ) -> ScoredCard {
        let mut reasons = Vec::new();

        let quality = lookup_gih_quality(self.sources.ratings.as_deref(), card, set_code, format).await;
        if quality >= 0.7 {
            reasons.push("high-quality card".to_string());
        }

        let cmc = card.cmc_slot();
        let curve = self.tuning.curve.score(cmc, index.curve_count(cmc));
        if curve >= 0.7 {
            reasons.push(format!("good {cmc}-drop"));
        }

        let synergy = index.synergy(card);
        if synergy >= 0.6 {
            reasons.push("synergizes with pool".to_string());
        }

        let color = if card.colors.len() > 1 { 0.85 } else { 1.0 };

        let score = quality * QUALITY_WEIGHT
            + curve * CURVE_WEIGHT
            + synergy * SYNERGY_WEIGHT
            + color * COLOR_WEIGHT;
        let reasoning = if reasons.is_empty() {
            "Standard playable".to_string()
        } else {
            reasons.join(", ")
        };
        ScoredCard::new(card.clone(), score, reasoning)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::constructor::fixtures::draft_pool;
    use crate::constructor::generic::{detect_synergies, PoolIndex};
    use crate::constructor::{DeckConstructor, Viability};
    use crate::sources::memory::InMemoryCatalog;
    use crate::sources::CardSources;
    use crate::types::{Card, CardId, ScoredCard};

    fn constructor() -> (DeckConstructor, Vec<CardId>) {
        let pool = draft_pool();
        let ids = pool.iter().map(|c| c.id).collect();
        let catalog = Arc::new(InMemoryCatalog::from_cards(pool));
        (DeckConstructor::new(CardSources::from_catalog(catalog)), ids)
    }

    #[test]
    fn pool_synergy_counts_sharing_cards() {
        let draw = |id| Card::new(id, "Divination", "Sorcery").with_oracle_text("Draw two cards.");
        let pool = vec![draw(1), draw(2), draw(3), Card::new(4, "Bear", "Creature — Bear")];
        let index = PoolIndex::new(&pool);
        assert!((index.synergy(&pool[0]) - 0.7).abs() < 1e-9);
        assert!((index.synergy(&pool[3]) - 0.5).abs() < 1e-9);
        assert_eq!(index.curve_count(0), 4);
    }

    #[test]
    fn synergies_need_three_cards() {
        let entry = |id| {
            ScoredCard::new(
                Card::new(id, "Bird", "Creature — Bird").with_oracle_text("Flying"),
                0.5,
                String::new(),
            )
        };
        assert!(detect_synergies(&[entry(1), entry(2)]).is_empty());
        assert_eq!(
            detect_synergies(&[entry(1), entry(2), entry(3)]),
            vec!["Flying (3 cards)".to_string()]
        );
    }

    #[tokio::test]
    async fn suggests_ranked_decks_with_full_mana_bases() {
        let (constructor, ids) = constructor();
        let response = constructor.suggest_decks(&ids, "", "").await;

        assert!(response.error.is_none());
        assert_eq!(response.total_combos, 25);
        assert_eq!(response.viable_combos, response.suggestions.len());
        assert!(response.viable_combos > 0);
        for pair in response.suggestions.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let best = &response.suggestions[0];
        assert_eq!(response.best_combo.map(|c| c.name), Some(best.color_combo.name));
        assert_eq!(best.color_combo.name, "Gruul");
        assert_eq!(best.spells.len(), 23);
        assert_eq!(best.analysis.creature_count, 18);
        assert_eq!(best.viability, Viability::Strong);

        for deck in &response.suggestions {
            assert_eq!(deck.land_count(), 17);
            assert!(deck.spells.len() <= 23);
            assert_eq!(deck.total_cards, deck.spells.len() as u32 + 17);
            assert!((0.0..=1.0).contains(&deck.score));
            assert!(deck.spells.iter().all(|s| (0.0..=1.0).contains(&s.score)));
        }
    }

    #[tokio::test]
    async fn empty_or_unknown_pool_reports_error() {
        let (constructor, _) = constructor();
        let empty = constructor.suggest_decks(&[], "", "").await;
        assert_eq!(empty.error.as_deref(), Some("No cards in draft pool"));

        let unknown = constructor.suggest_decks(&[1, 2, 3], "", "").await;
        assert_eq!(
            unknown.error.as_deref(),
            Some("Could not load any cards from draft pool")
        );
        assert!(unknown.suggestions.is_empty());
    }
}
