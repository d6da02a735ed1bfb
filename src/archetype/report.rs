use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::constructor::ALL_COLOR_COMBINATIONS;
use crate::error::{DeckError, DeckResult};
use crate::ontology::typeline::contains_type;
use crate::types::{Card, CardId, Color};

/// Share of colored card copies a color needs to count as dominant.
const DOMINANT_SHARE: f64 = 0.15;
const SIGNATURE_WEIGHT: f64 = 2.0;
const CURVE_CAP: u32 = 7;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DeckStyle {
    Aggro,
    Control,
    Midrange,
    Tempo,
}

impl Display for DeckStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Aggro => "Aggro",
            Self::Control => "Control",
            Self::Midrange => "Midrange",
            Self::Tempo => "Tempo",
        };
        write!(f, "{display}")
    }
}

/// A card whose text points at a specific archetype.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeIndicator {
    pub card_id: CardId,
    pub card_name: String,
    pub weight: f64,
    pub reason: &'static str,
}

/// Copy-weighted counts over the whole list, lands included.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompositionBreakdown {
    pub color_counts: BTreeMap<Color, usize>,
    pub colorless_count: usize,
    pub gold_count: usize,
    pub creature_count: usize,
    pub instant_count: usize,
    pub sorcery_count: usize,
    pub artifact_count: usize,
    pub enchantment_count: usize,
    pub planeswalker_count: usize,
    pub land_count: usize,
    /// Nonland mana curve; seven and above share one bucket.
    pub mana_curve: BTreeMap<u32, usize>,
    pub avg_cmc: f64,
    pub rarity_counts: BTreeMap<String, usize>,
}

impl CompositionBreakdown {
    fn nonland_count(&self) -> usize {
        self.creature_count
            + self.instant_count
            + self.sorcery_count
            + self.artifact_count
            + self.enchantment_count
            + self.planeswalker_count
    }

    fn curve_sum(&self, slots: &[u32]) -> usize {
        slots
            .iter()
            .filter_map(|slot| self.mana_curve.get(slot))
            .sum()
    }
}

/// Color-and-style label for a deck, e.g. "Golgari Midrange".
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub primary_archetype: String,
    pub confidence: f64,
    pub color_identity: Vec<Color>,
    pub dominant_colors: Vec<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_pair: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<DeckStyle>,
    pub signature_cards: Vec<CardId>,
    pub indicators: Vec<ArchetypeIndicator>,
    pub total_cards: usize,
    pub breakdown: CompositionBreakdown,
}

/// Labels a card list. Repeated entries count as extra copies.
pub fn classify_colors_and_style(cards: &[Card]) -> DeckResult<ClassificationReport> {
    if cards.is_empty() {
        return Err(DeckError::InvalidRequest("no cards to classify".to_string()));
    }

    let mut grouped: BTreeMap<CardId, (&Card, usize)> = BTreeMap::new();
    for card in cards {
        grouped.entry(card.id).or_insert((card, 0)).1 += 1;
    }

    let breakdown = composition_breakdown(grouped.values().copied());
    let color_identity: Vec<Color> = Color::ALL
        .into_iter()
        .filter(|color| breakdown.color_counts.contains_key(color))
        .collect();
    let dominant_colors = dominant_colors(&breakdown.color_counts);
    let color_pair = guild_name(&dominant_colors);
    let style = detect_deck_style(&breakdown);

    let (mut primary, mut confidence) = match (color_pair, dominant_colors.as_slice()) {
        (Some(name), _) => (name.to_string(), 0.5),
        (None, [color]) => (format!("Mono-{}", color.name()), 0.5),
        (None, colors) if colors.len() > 2 => ("Multi-color".to_string(), 0.4),
        _ => ("Unknown".to_string(), 0.2),
    };
    if let Some(style) = style {
        if color_pair.is_some() {
            confidence += 0.2;
            primary = format!("{primary} {style}");
        } else {
            confidence += 0.15;
            primary = if primary == "Unknown" {
                style.to_string()
            } else {
                format!("{primary} {style}")
            };
        }
    }

    let indicators = find_indicators(grouped.values().copied());
    let signature_cards = indicators
        .iter()
        .filter(|indicator| indicator.weight >= SIGNATURE_WEIGHT)
        .map(|indicator| indicator.card_id)
        .collect();
    if !indicators.is_empty() {
        confidence += f64::min(indicators.len() as f64 * 0.05, 0.2);
    }

    Ok(ClassificationReport {
        primary_archetype: primary,
        confidence: confidence.min(1.0),
        color_identity,
        dominant_colors,
        color_pair,
        style,
        signature_cards,
        indicators,
        total_cards: cards.len(),
        breakdown,
    })
}

fn composition_breakdown<'a>(
    entries: impl Iterator<Item = (&'a Card, usize)>,
) -> CompositionBreakdown {
    let mut breakdown = CompositionBreakdown::default();
    let mut total_cmc = 0.0;
    let mut nonland = 0usize;

    for (card, qty) in entries {
        match card.colors.len() {
            0 => breakdown.colorless_count += qty,
            1 => {}
            _ => breakdown.gold_count += qty,
        }
        for color in &card.colors {
            *breakdown.color_counts.entry(*color).or_insert(0) += qty;
        }

        let type_line = card.type_line.as_str();
        if contains_type(type_line, "creature") {
            breakdown.creature_count += qty;
        }
        if contains_type(type_line, "instant") {
            breakdown.instant_count += qty;
        }
        if contains_type(type_line, "sorcery") {
            breakdown.sorcery_count += qty;
        }
        if contains_type(type_line, "artifact") {
            breakdown.artifact_count += qty;
        }
        if contains_type(type_line, "enchantment") {
            breakdown.enchantment_count += qty;
        }
        if contains_type(type_line, "planeswalker") {
            breakdown.planeswalker_count += qty;
        }
        if contains_type(type_line, "land") {
            breakdown.land_count += qty;
        } else {
            let slot = card.cmc_slot().min(CURVE_CAP);
            *breakdown.mana_curve.entry(slot).or_insert(0) += qty;
            total_cmc += card.cmc * qty as f64;
            nonland += qty;
        }

        *breakdown
            .rarity_counts
            .entry(card.rarity.to_lowercase())
            .or_insert(0) += qty;
    }

    if nonland > 0 {
        breakdown.avg_cmc = total_cmc / nonland as f64;
    }
    breakdown
}

/// Colors holding at least 15% of colored copies, most played first.
/// Ties keep WUBRG order.
pub fn dominant_colors(color_counts: &BTreeMap<Color, usize>) -> Vec<Color> {
    let total: usize = color_counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let threshold = total as f64 * DOMINANT_SHARE;
    let mut counts: Vec<(Color, usize)> = Color::ALL
        .into_iter()
        .filter_map(|color| color_counts.get(&color).map(|count| (color, *count)))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .filter(|(_, count)| *count as f64 >= threshold)
        .map(|(color, _)| color)
        .collect()
}

/// Guild name for exactly two dominant colors, in either order.
pub fn guild_name(dominant: &[Color]) -> Option<&'static str> {
    if dominant.len() != 2 {
        return None;
    }
    ALL_COLOR_COMBINATIONS
        .iter()
        .filter(|combo| combo.colors.len() == 2)
        .find(|combo| dominant.iter().all(|color| combo.contains(*color)))
        .map(|combo| combo.name)
}

pub fn detect_deck_style(breakdown: &CompositionBreakdown) -> Option<DeckStyle> {
    let nonland = breakdown.nonland_count();
    if nonland == 0 {
        return None;
    }
    let creature_ratio = breakdown.creature_count as f64 / nonland as f64;
    let spell_ratio = (breakdown.instant_count + breakdown.sorcery_count) as f64 / nonland as f64;

    let low = breakdown.curve_sum(&[1, 2]);
    let mid = breakdown.curve_sum(&[3, 4]);
    let high = breakdown.curve_sum(&[5, 6, 7]);
    let total = low + mid + high;
    if total == 0 {
        return None;
    }
    let low_ratio = low as f64 / total as f64;
    let high_ratio = high as f64 / total as f64;
    let avg = breakdown.avg_cmc;

    if low_ratio > 0.5 && creature_ratio > 0.6 && avg < 2.5 {
        return Some(DeckStyle::Aggro);
    }
    if high_ratio > 0.3 && spell_ratio > 0.4 && avg > 3.5 {
        return Some(DeckStyle::Control);
    }
    if creature_ratio > 0.4 && (2.5..=3.5).contains(&avg) {
        return Some(DeckStyle::Midrange);
    }
    if creature_ratio > 0.3 && spell_ratio > 0.3 && avg < 3.0 {
        return Some(DeckStyle::Tempo);
    }
    None
}

fn find_indicators<'a>(
    entries: impl Iterator<Item = (&'a Card, usize)>,
) -> Vec<ArchetypeIndicator> {
    let mut indicators = Vec::new();
    for (card, qty) in entries {
        let oracle = card.oracle_lower();
        let mut push = |weight: f64, reason: &'static str| {
            indicators.push(ArchetypeIndicator {
                card_id: card.id,
                card_name: card.name.clone(),
                weight,
                reason,
            });
        };

        if oracle.contains("creatures you control with flying")
            || oracle.contains("whenever a creature with flying")
        {
            push(2.5, "Flying synergy payoff");
        }
        if oracle.contains("sacrifice")
            && (oracle.contains("whenever you sacrifice")
                || oracle.contains("when this creature dies"))
        {
            push(2.0, "Sacrifice synergy");
        }
        if oracle.contains("from your graveyard") || oracle.contains("in your graveyard") {
            push(1.5, "Graveyard synergy");
        }
        if oracle.contains("create")
            && oracle.contains("token")
            && (oracle.contains("whenever") || qty >= 2)
        {
            push(1.5, "Token generation");
        }
        if oracle.contains("+1/+1 counter")
            && (oracle.contains("whenever") || oracle.contains("each creature"))
        {
            push(2.0, "+1/+1 counter synergy");
        }
        if oracle.contains("whenever you cast")
            && (oracle.contains("instant") || oracle.contains("sorcery"))
        {
            push(2.0, "Spells matter");
        }
        if oracle.contains("search your library for a") && oracle.contains("land") {
            push(1.5, "Ramp/land search");
        }
    }
    indicators.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    indicators
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::archetype::report::{
        classify_colors_and_style, dominant_colors, guild_name, DeckStyle,
    };
    use crate::error::DeckError;
    use crate::types::{Card, Color};

    fn copies(card: Card, count: usize) -> Vec<Card> {
        (0..count).map(|_| card.clone()).collect()
    }

    fn golgari_deck() -> Vec<Card> {
        let mut cards = Vec::new();
        cards.extend(copies(
            Card::new(1, "Grave Scrabbler", "Creature — Rat")
                .with_cmc(2.0)
                .with_colors(&[Color::Black]),
            4,
        ));
        cards.extend(copies(
            Card::new(2, "Moss Grazer", "Creature — Beast")
                .with_cmc(3.0)
                .with_colors(&[Color::Green]),
            4,
        ));
        cards.extend(copies(
            Card::new(3, "Rot Lord", "Creature — Fungus")
                .with_cmc(4.0)
                .with_colors(&[Color::Black, Color::Green])
                .with_oracle_text("Return target creature card from your graveyard to your hand."),
            4,
        ));
        cards.extend(copies(
            Card::new(4, "Cut Down", "Instant")
                .with_cmc(1.0)
                .with_colors(&[Color::Black]),
            2,
        ));
        cards.extend(copies(Card::new(5, "Swamp", "Basic Land — Swamp"), 4));
        cards.extend(copies(Card::new(6, "Forest", "Basic Land — Forest"), 4));
        cards
    }

    #[test]
    fn two_color_creature_deck_gets_guild_and_style() {
        let report = classify_colors_and_style(&golgari_deck()).expect("report");
        assert_eq!(report.dominant_colors, vec![Color::Black, Color::Green]);
        assert_eq!(report.color_identity, vec![Color::Black, Color::Green]);
        assert_eq!(report.color_pair, Some("Golgari"));
        assert_eq!(report.style, Some(DeckStyle::Midrange));
        assert_eq!(report.primary_archetype, "Golgari Midrange");
        // 0.5 base, 0.2 for the style, 0.05 for one graveyard indicator
        assert!((report.confidence - 0.75).abs() < 1e-9);
        assert_eq!(report.indicators.len(), 1);
        assert_eq!(report.indicators[0].reason, "Graveyard synergy");
        assert!(report.signature_cards.is_empty());
        assert_eq!(report.total_cards, 22);
        assert_eq!(report.breakdown.land_count, 8);
        assert_eq!(report.breakdown.gold_count, 4);
        assert_eq!(report.breakdown.colorless_count, 8);
    }

    #[test]
    fn mono_color_aggro() {
        let mut cards = copies(
            Card::new(1, "Goblin Raider", "Creature — Goblin")
                .with_cmc(1.0)
                .with_colors(&[Color::Red]),
            12,
        );
        cards.extend(copies(
            Card::new(2, "Goblin Boss", "Creature — Goblin")
                .with_cmc(2.0)
                .with_colors(&[Color::Red])
                .with_oracle_text("Whenever another Goblin enters, put a +1/+1 counter on it."),
            4,
        ));
        cards.extend(copies(Card::new(3, "Mountain", "Basic Land — Mountain"), 16));

        let report = classify_colors_and_style(&cards).expect("report");
        assert_eq!(report.dominant_colors, vec![Color::Red]);
        assert_eq!(report.color_pair, None);
        assert_eq!(report.primary_archetype, "Mono-Red Aggro");
        assert_eq!(report.signature_cards, vec![2]);
        assert!((report.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn minor_splash_is_not_dominant() {
        let counts = BTreeMap::from([(Color::Blue, 18), (Color::Red, 2)]);
        assert_eq!(dominant_colors(&counts), vec![Color::Blue]);
        assert!(dominant_colors(&BTreeMap::new()).is_empty());
        assert_eq!(guild_name(&[Color::Green, Color::Blue]), Some("Simic"));
        assert_eq!(guild_name(&[Color::Green]), None);
    }

    #[test]
    fn lands_only_list_is_unknown() {
        let cards = copies(Card::new(1, "Wastes", "Basic Land"), 3);
        let report = classify_colors_and_style(&cards).expect("report");
        assert_eq!(report.primary_archetype, "Unknown");
        assert!((report.confidence - 0.2).abs() < 1e-9);
        assert!(report.style.is_none());
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = classify_colors_and_style(&[]).expect_err("empty");
        assert!(matches!(err, DeckError::InvalidRequest(_)));
    }
}
