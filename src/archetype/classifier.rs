use serde::Serialize;

use crate::archetype::{Archetype, ArchetypeSignal, SignalRule};
use crate::ontology::contains_pattern;
use crate::ontology::typeline::contains_type;
use crate::types::Card;

const MIN_ARCHETYPE_SCORE: f64 = 0.2;
const HIGH_CMC: f64 = 5.0;
const LOW_CMC: f64 = 2.0;

/// One archetype that the card list plausibly belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeScore {
    pub archetype: Archetype,
    pub score: f64,
    pub confidence: f64,
    /// Names of the signals that scored above zero.
    pub signals: Vec<&'static str>,
    pub description: &'static str,
}

/// Aggregate counts used by signal evaluation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckStats {
    pub total_cards: usize,
    pub land_count: usize,
    pub creature_count: usize,
    pub instant_count: usize,
    pub sorcery_count: usize,
    pub artifact_count: usize,
    pub enchantment_count: usize,
    pub planeswalker_count: usize,
    pub high_cmc_count: usize,
    pub low_cmc_count: usize,
    pub avg_cmc: f64,
}

impl DeckStats {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut stats = DeckStats {
            total_cards: cards.len(),
            ..Default::default()
        };
        let mut total_cmc = 0.0;
        let mut nonland = 0usize;

        for card in cards {
            let type_line = card.type_line.as_str();
            if contains_type(type_line, "Land") {
                stats.land_count += 1;
                continue;
            }
            nonland += 1;
            total_cmc += card.cmc;

            if contains_type(type_line, "Creature") {
                stats.creature_count += 1;
            }
            if contains_type(type_line, "Instant") {
                stats.instant_count += 1;
            }
            if contains_type(type_line, "Sorcery") {
                stats.sorcery_count += 1;
            }
            if contains_type(type_line, "Artifact") && !contains_type(type_line, "Creature") {
                stats.artifact_count += 1;
            }
            if contains_type(type_line, "Enchantment") {
                stats.enchantment_count += 1;
            }
            if contains_type(type_line, "Planeswalker") {
                stats.planeswalker_count += 1;
            }
            if card.cmc >= HIGH_CMC {
                stats.high_cmc_count += 1;
            }
            if card.cmc <= LOW_CMC {
                stats.low_cmc_count += 1;
            }
        }

        if nonland > 0 {
            stats.avg_cmc = total_cmc / nonland as f64;
        }
        stats
    }
}

/// Archetypes scoring above the cutoff, best first. Ties keep registry order.
pub fn classify_deck(cards: &[Card]) -> Vec<ArchetypeScore> {
    if cards.is_empty() {
        return Vec::new();
    }
    let stats = DeckStats::from_cards(cards);

    let mut scores: Vec<ArchetypeScore> = Archetype::ALL
        .iter()
        .map(|archetype| score_archetype(*archetype, cards, &stats))
        .filter(|score| score.score > MIN_ARCHETYPE_SCORE)
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

pub fn primary_archetype(cards: &[Card]) -> Option<ArchetypeScore> {
    classify_deck(cards).into_iter().next()
}

pub fn score_archetype(archetype: Archetype, cards: &[Card], stats: &DeckStats) -> ArchetypeScore {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut matched = Vec::new();

    for signal in archetype.signals() {
        let value = evaluate_signal(signal, cards, stats);
        weighted += value * signal.weight;
        total_weight += signal.weight;
        if value > 0.0 {
            matched.push(signal.name);
        }
    }

    let score = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    };
    let signal_bonus = f64::min(matched.len() as f64 * 0.1, 0.3);

    ArchetypeScore {
        archetype,
        score,
        confidence: f64::min(score + signal_bonus, 1.0),
        signals: matched,
        description: archetype.description(),
    }
}

pub fn evaluate_signal(signal: &ArchetypeSignal, cards: &[Card], stats: &DeckStats) -> f64 {
    if signal.min_cmc > 0.0 && stats.avg_cmc < signal.min_cmc {
        return 0.0;
    }
    if signal.max_cmc > 0.0 && stats.avg_cmc > signal.max_cmc {
        return 0.0;
    }

    match signal.rule {
        SignalRule::FewCreatures => return bool_score(stats.creature_count <= 10),
        SignalRule::BigFinishers => return bool_score(stats.high_cmc_count >= 4),
        SignalRule::Matching => {}
    }

    let count = cards
        .iter()
        .filter(|card| matches_signal(card, signal))
        .count();
    if signal.min_count > 0 && count < signal.min_count {
        return 0.0;
    }
    if signal.patterns.is_empty() && signal.type_lines.is_empty() && signal.keywords.is_empty() {
        return 1.0;
    }
    if signal.min_count > 0 {
        return f64::min(count as f64 / (signal.min_count as f64 * 2.0), 1.0);
    }
    1.0
}

fn bool_score(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Every non-empty filter group must have at least one hit.
pub fn matches_signal(card: &Card, signal: &ArchetypeSignal) -> bool {
    if !signal.type_lines.is_empty() {
        if !signal
            .type_lines
            .iter()
            .any(|t| contains_type(&card.type_line, t))
        {
            return false;
        }
        if signal.max_cmc > 0.0 && card.cmc > signal.max_cmc {
            return false;
        }
    }

    let oracle = card.oracle_lower();
    if !signal.patterns.is_empty()
        && !signal
            .patterns
            .iter()
            .any(|pattern| contains_pattern(&oracle, pattern))
    {
        return false;
    }

    if !signal.keywords.is_empty()
        && !signal
            .keywords
            .iter()
            .any(|keyword| oracle.contains(&keyword.to_lowercase()))
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use crate::archetype::classifier::{classify_deck, primary_archetype, DeckStats};
    use crate::archetype::{archetype_description, is_aggro_archetype, is_control_archetype, Archetype};
    use crate::types::Card;

    fn aggro_deck() -> Vec<Card> {
        let mut cards = Vec::new();
        for id in 0..12 {
            cards.push(
                Card::new(id, "Goblin Raider", "Creature — Goblin")
                    .with_cmc(1.0)
                    .with_oracle_text("Menace"),
            );
        }
        for id in 12..20 {
            cards.push(
                Card::new(id, "Shock", "Instant")
                    .with_cmc(1.0)
                    .with_oracle_text("Shock deals 2 damage to any target."),
            );
        }
        cards
    }

    #[test]
    fn empty_deck_has_no_archetype() {
        assert!(classify_deck(&[]).is_empty());
        assert!(primary_archetype(&[]).is_none());
    }

    #[test]
    fn cheap_creatures_and_burn_read_as_aggro() {
        let scores = classify_deck(&aggro_deck());
        let top_two: Vec<Archetype> = scores.iter().take(2).map(|s| s.archetype).collect();
        assert!(top_two.contains(&Archetype::Aggro));

        let aggro = scores
            .iter()
            .find(|s| s.archetype == Archetype::Aggro)
            .expect("aggro missing");
        assert!((aggro.score - 0.75).abs() < 1e-9);
        assert!(aggro.score >= 0.5);
        assert!(aggro.confidence <= 1.0);
        assert!(aggro.signals.contains(&"burn spells"));
        assert!(!aggro.signals.contains(&"haste creatures"));
    }

    #[test]
    fn scores_are_sorted_and_bounded() {
        let scores = classify_deck(&aggro_deck());
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for score in &scores {
            assert!(score.score > 0.2 && score.score <= 1.0);
        }
    }

    #[test]
    fn stats_ignore_lands_for_curve() {
        let mut cards = aggro_deck();
        cards.push(Card::new(99, "Mountain", "Basic Land — Mountain"));
        let stats = DeckStats::from_cards(&cards);
        assert_eq!(stats.land_count, 1);
        assert_eq!(stats.creature_count, 12);
        assert_eq!(stats.instant_count, 8);
        assert_eq!(stats.low_cmc_count, 20);
        assert!((stats.avg_cmc - 1.0).abs() < 1e-9);
    }

    #[test]
    fn helper_lookups() {
        assert_eq!(
            archetype_description("control"),
            "Reactive deck that answers threats and wins in the late game"
        );
        assert_eq!(archetype_description("Burn"), "Unknown archetype");
        assert!(is_aggro_archetype(Archetype::Tempo));
        assert!(!is_aggro_archetype(Archetype::Ramp));
        assert!(is_control_archetype(Archetype::Control));
        assert_eq!("Tokens".parse::<Archetype>().ok(), Some(Archetype::Tokens));
    }
}
