use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::iterative::{recommended_copies, CONSTRUCTED_DECK_SIZE};
use crate::builder::lands::{enters_tapped, exact_basics, produced_colors};
use crate::builder::seed::{combine, seed_reasoning};
use crate::builder::synergy::{color_compatibility, rarity_quality, synergy_with, SynergyTarget};
use crate::builder::{CandidateScope, CardWithOwnership, SeedDeckBuilder};
use crate::error::{DeckError, DeckResult};
use crate::ontology::contains_pattern;
use crate::types::{Card, CardId, Color, ScoreBreakdown, ScoredCard, SynergyDetail};

/// Build targets for a 60-card constructed archetype.
#[derive(Debug, Clone, Serialize)]
pub struct ConstructedProfile {
    pub key: &'static str,
    pub name: &'static str,
    pub land_count: u32,
    /// Spell counts per mana value; the last entry covers everything above it.
    pub curve_targets: &'static [(u32, u32)],
    pub creature_ratio: f64,
    pub removal_count: u32,
    pub card_advantage: u32,
    pub description: &'static str,
    #[serde(skip)]
    pub game_plan: &'static str,
    #[serde(skip)]
    pub mulligan: &'static str,
}

static CONSTRUCTED_PROFILES: [ConstructedProfile; 3] = [
    ConstructedProfile {
        key: "aggro",
        name: "Aggro",
        land_count: 20,
        curve_targets: &[(1, 10), (2, 14), (3, 10), (4, 6)],
        creature_ratio: 0.6,
        removal_count: 4,
        card_advantage: 2,
        description: "Low-curve creatures that pressure the opponent from the first turn.",
        game_plan: "Deploy cheap threats early and attack every turn, using removal to clear blockers.",
        mulligan: "Keep hands with 2-3 lands and at least two plays costing 2 or less.",
    },
    ConstructedProfile {
        key: "midrange",
        name: "Midrange",
        land_count: 24,
        curve_targets: &[(1, 2), (2, 8), (3, 10), (4, 8), (5, 6), (6, 2)],
        creature_ratio: 0.5,
        removal_count: 6,
        card_advantage: 4,
        description: "Efficient threats and removal that trade well at every stage of the game.",
        game_plan: "Trade resources early, then take over with stronger cards in the mid game.",
        mulligan: "Keep hands with 3-4 lands and a mix of early interaction and threats.",
    },
    ConstructedProfile {
        key: "control",
        name: "Control",
        land_count: 26,
        curve_targets: &[(1, 2), (2, 8), (3, 8), (4, 6), (5, 6), (6, 4)],
        creature_ratio: 0.25,
        removal_count: 10,
        card_advantage: 8,
        description: "Answers and card advantage first, a few powerful finishers last.",
        game_plan: "Answer early threats, build card advantage, and win with late finishers.",
        mulligan: "Keep hands with 3-5 lands and early interaction; finishers can wait.",
    },
];

pub fn constructed_profiles() -> &'static [ConstructedProfile] {
    &CONSTRUCTED_PROFILES
}

pub fn constructed_profile(key: &str) -> Option<&'static ConstructedProfile> {
    let key = key.trim().to_ascii_lowercase();
    CONSTRUCTED_PROFILES.iter().find(|profile| profile.key == key)
}

impl ConstructedProfile {
    pub fn spell_slots(&self) -> u32 {
        CONSTRUCTED_DECK_SIZE.saturating_sub(self.land_count)
    }

    fn top_slot(&self) -> u32 {
        self.curve_targets.last().map(|(cmc, _)| *cmc).unwrap_or(1)
    }

    pub fn slot_for(&self, card: &Card) -> u32 {
        card.cmc_slot().clamp(1, self.top_slot())
    }

    pub fn curve_target(&self, slot: u32) -> u32 {
        self.curve_targets
            .iter()
            .find(|(cmc, _)| *cmc == slot)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    fn creature_slots(&self) -> u32 {
        (self.spell_slots() as f64 * self.creature_ratio).round() as u32
    }
}

/// Curve preference of a profile, strongest where it wants the most cards.
pub fn profile_curve_fit(card: &Card, profile: &ConstructedProfile) -> f64 {
    if card.is_land() {
        return 0.5;
    }
    let most = profile
        .curve_targets
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    let wanted = profile.curve_target(profile.slot_for(card));
    if wanted == 0 || most == 0 {
        return 0.2;
    }
    0.4 + 0.6 * wanted as f64 / most as f64
}

pub fn is_removal(card: &Card) -> bool {
    let text = card.oracle_lower();
    ["destroy target", "exile target", "counter target", "fight"]
        .iter()
        .any(|needle| text.contains(needle))
        || contains_pattern(&text, "deals.*damage to")
}

pub fn is_card_advantage(card: &Card) -> bool {
    card.oracle_lower().contains("draw")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompleteDeckRequest {
    pub seed_card_id: CardId,
    pub archetype: String,
    #[serde(flatten)]
    pub scope: CandidateScope,
}

impl CompleteDeckRequest {
    pub fn new(seed_card_id: CardId, archetype: &str) -> Self {
        Self {
            seed_card_id,
            archetype: archetype.to_string(),
            scope: CandidateScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: CandidateScope) -> Self {
        self.scope = scope;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckSpell {
    #[serde(flatten)]
    pub card: CardWithOwnership,
    pub quantity: u32,
    pub score_breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synergy_details: Vec<SynergyDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckLand {
    pub card_id: CardId,
    pub name: String,
    pub quantity: u32,
    pub colors: Vec<Color>,
    pub is_basic: bool,
    pub enters_tapped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckStrategy {
    pub summary: String,
    pub game_plan: String,
    pub key_cards: Vec<String>,
    pub mulligan: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDeckAnalysis {
    pub total_cards: u32,
    pub spell_count: u32,
    pub land_count: u32,
    pub creature_count: u32,
    pub non_creature_count: u32,
    pub average_cmc: f64,
    pub mana_curve: BTreeMap<u32, u32>,
    pub color_distribution: BTreeMap<Color, u32>,
    pub in_collection_count: u32,
    pub missing_count: u32,
    pub missing_wildcard_cost: BTreeMap<String, u32>,
    pub archetype_match: f64,
    #[serde(skip)]
    removal_count: u32,
    #[serde(skip)]
    card_advantage_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteDeckResponse {
    pub archetype: &'static str,
    pub seed_card: CardWithOwnership,
    pub spells: Vec<DeckSpell>,
    pub lands: Vec<DeckLand>,
    pub strategy: DeckStrategy,
    pub analysis: GeneratedDeckAnalysis,
}

struct Pick {
    entry: ScoredCard,
    quantity: u32,
    cap: u32,
}

/// Copies taken so far, per curve slot and per creature/non-creature split.
#[derive(Default)]
struct Tally {
    per_slot: HashMap<u32, u32>,
    creatures: u32,
    others: u32,
    total: u32,
}

impl Tally {
    fn add(&mut self, slot: u32, creature: bool, quantity: u32) {
        *self.per_slot.entry(slot).or_insert(0) += quantity;
        if creature {
            self.creatures += quantity;
        } else {
            self.others += quantity;
        }
        self.total += quantity;
    }

    fn in_slot(&self, slot: u32) -> u32 {
        self.per_slot.get(&slot).copied().unwrap_or(0)
    }
}

/// Greedy spell selection: the seed first, then the curve and creature
/// targets, then any open slot, then extra copies of what was already taken.
fn select_spells(
    seed: Option<ScoredCard>,
    scored: Vec<ScoredCard>,
    profile: &ConstructedProfile,
    cap_for: impl Fn(&ScoredCard) -> u32,
    max_copies: u32,
) -> Vec<Pick> {
    let slots = profile.spell_slots();
    let creature_slots = profile.creature_slots();
    let other_slots = slots.saturating_sub(creature_slots);

    let mut picks: Vec<Pick> = Vec::new();
    let mut tally = Tally::default();

    if let Some(seed) = seed {
        let quantity = max_copies.min(slots);
        tally.add(profile.slot_for(&seed.card), seed.card.is_creature(), quantity);
        picks.push(Pick {
            entry: seed,
            quantity,
            cap: max_copies,
        });
    }

    let mut leftovers = Vec::new();
    for entry in scored {
        let cap = cap_for(&entry);
        let want = recommended_copies(&entry.card, entry.score, max_copies).min(cap);
        let slot = profile.slot_for(&entry.card);
        let creature = entry.card.is_creature();
        let slot_room = profile.curve_target(slot).saturating_sub(tally.in_slot(slot));
        let type_room = if creature {
            creature_slots.saturating_sub(tally.creatures)
        } else {
            other_slots.saturating_sub(tally.others)
        };
        let quantity = want
            .min(slot_room)
            .min(type_room)
            .min(slots - tally.total);
        if quantity > 0 {
            tally.add(slot, creature, quantity);
            picks.push(Pick { entry, quantity, cap });
        } else {
            leftovers.push((entry, want, cap));
        }
    }

    for (entry, want, cap) in leftovers {
        let quantity = want.min(slots - tally.total);
        if quantity > 0 {
            tally.add(profile.slot_for(&entry.card), entry.card.is_creature(), quantity);
            picks.push(Pick { entry, quantity, cap });
        }
    }

    for pick in picks.iter_mut() {
        let extra = pick
            .cap
            .saturating_sub(pick.quantity)
            .min(slots - tally.total);
        pick.quantity += extra;
        tally.total += extra;
    }
    picks
}

fn color_phrase(colors: &[Color]) -> String {
    match colors {
        [] => "Colorless".to_string(),
        [single] => format!("Mono-{}", single.name()),
        many => many
            .iter()
            .map(|color| color.name())
            .collect::<Vec<_>>()
            .join("/"),
    }
}

impl SeedDeckBuilder {
    /// A full 60-card deck around a seed card for a constructed archetype.
    pub async fn generate_complete_deck(
        &self,
        request: &CompleteDeckRequest,
    ) -> DeckResult<CompleteDeckResponse> {
        let profile = constructed_profile(&request.archetype)
            .ok_or_else(|| DeckError::UnknownArchetype(request.archetype.clone()))?;
        let seed = self.load_seed(request.seed_card_id).await?;
        let target = SynergyTarget::from_card(&seed);
        let candidates = self
            .candidates(&request.scope, &seed.set_code, &[seed.id])
            .await?;
        let collection = self.collection().await;
        let owned = |id: CardId| collection.get(&id).copied().unwrap_or(0);
        let max_copies = self.tuning.max_copies;
        let budget = request.scope.budget_mode;

        let (land_pool, spell_pool): (Vec<&Card>, Vec<&Card>) =
            candidates.iter().partition(|card| card.is_land());

        let mut scored: Vec<ScoredCard> = spell_pool
            .into_iter()
            .filter(|card| color_compatibility(card, &target.colors) >= 0.8)
            .filter(|card| !budget || owned(card.id) > 0)
            .map(|card| score_for_profile(card, &target, profile))
            .filter(|entry| entry.score >= self.tuning.min_score)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(candidates = scored.len(), archetype = profile.name, "scored spell candidates");

        let seed_entry = (!seed.is_land()).then(|| {
            ScoredCard::new(seed.clone(), 1.0, "This is your build-around card.".to_string())
        });
        let cap_for = |entry: &ScoredCard| {
            if budget {
                owned(entry.card.id).min(max_copies)
            } else {
                max_copies
            }
        };
        let picks = select_spells(seed_entry, scored, profile, cap_for, max_copies);

        let spells: Vec<DeckSpell> = picks
            .into_iter()
            .map(|pick| {
                let Pick { entry, quantity, .. } = pick;
                let breakdown = entry.breakdown.unwrap_or(ScoreBreakdown {
                    color_fit: 1.0,
                    curve_fit: 1.0,
                    synergy: 1.0,
                    quality: 1.0,
                    overall: entry.score,
                });
                DeckSpell {
                    card: CardWithOwnership::new(
                        &entry.card,
                        entry.score,
                        entry.reasoning,
                        owned(entry.card.id),
                        quantity,
                    ),
                    quantity,
                    score_breakdown: breakdown,
                    synergy_details: entry.synergy_details,
                }
            })
            .collect();

        let deck_colors = if target.colors.is_empty() {
            SynergyTarget::from_cards(spells_cards(&candidates, &spells)).colors
        } else {
            target.colors.clone()
        };
        let lands = build_lands(
            &land_pool,
            &deck_colors,
            &spells,
            profile.land_count,
            max_copies,
            |id| if budget { owned(id) } else { max_copies },
        );

        let analysis = analyze_generated(&spells, &lands, profile, &candidates, &seed);
        let strategy = build_strategy(&seed, &spells, profile, &analysis, &deck_colors, &target);

        info!(
            seed = %seed.name,
            archetype = profile.name,
            total = analysis.total_cards,
            "generated complete deck"
        );
        Ok(CompleteDeckResponse {
            archetype: profile.key,
            seed_card: CardWithOwnership::new(
                &seed,
                1.0,
                "This is your build-around card.".to_string(),
                owned(seed.id),
                max_copies,
            ),
            spells,
            lands,
            strategy,
            analysis,
        })
    }
}

fn score_for_profile(card: &Card, target: &SynergyTarget, profile: &ConstructedProfile) -> ScoredCard {
    let color = color_compatibility(card, &target.colors);
    let curve = profile_curve_fit(card, profile);
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

fn spells_cards<'a>(candidates: &'a [Card], spells: &[DeckSpell]) -> Vec<&'a Card> {
    candidates
        .iter()
        .filter(|card| spells.iter().any(|spell| spell.card.card_id == card.id))
        .collect()
}

/// Dual lands that tap for at least two deck colors and nothing else, then
/// basics for the rest split by colored spell copies.
fn build_lands(
    land_pool: &[&Card],
    deck_colors: &[Color],
    spells: &[DeckSpell],
    land_count: u32,
    max_copies: u32,
    cap_for: impl Fn(CardId) -> u32,
) -> Vec<DeckLand> {
    let mut lands = Vec::new();
    let mut nonbasic_total = 0;
    if deck_colors.len() >= 2 {
        let nonbasic_limit = land_count / 3;
        for card in land_pool {
            let produced = produced_colors(card);
            let fits = produced.len() >= 2 && produced.iter().all(|c| deck_colors.contains(c));
            let quantity = max_copies
                .min(cap_for(card.id))
                .min(nonbasic_limit.saturating_sub(nonbasic_total));
            if !fits || quantity == 0 {
                continue;
            }
            nonbasic_total += quantity;
            lands.push(DeckLand {
                card_id: card.id,
                name: card.name.clone(),
                quantity,
                colors: produced,
                is_basic: false,
                enters_tapped: enters_tapped(card),
            });
        }
    }

    let mut weights: BTreeMap<Color, u32> = deck_colors.iter().map(|c| (*c, 0)).collect();
    for spell in spells {
        for color in &spell.card.colors {
            if let Some(weight) = weights.get_mut(color) {
                *weight += spell.quantity;
            }
        }
    }
    if weights.values().all(|w| *w == 0) {
        for weight in weights.values_mut() {
            *weight = 1;
        }
    }
    for basic in exact_basics(&weights, land_count.saturating_sub(nonbasic_total)) {
        lands.push(DeckLand {
            card_id: basic.card_id,
            name: basic.name,
            quantity: basic.quantity,
            colors: vec![basic.color],
            is_basic: true,
            enters_tapped: false,
        });
    }
    lands
}

fn analyze_generated(
    spells: &[DeckSpell],
    lands: &[DeckLand],
    profile: &ConstructedProfile,
    candidates: &[Card],
    seed: &Card,
) -> GeneratedDeckAnalysis {
    let card_for = |id: CardId| -> Option<&Card> {
        if id == seed.id {
            Some(seed)
        } else {
            candidates.iter().find(|card| card.id == id)
        }
    };

    let mut mana_curve = BTreeMap::new();
    let mut color_distribution = BTreeMap::new();
    let mut creature_count = 0;
    let mut spell_count = 0;
    let mut total_cmc = 0.0;
    let mut removal_count = 0;
    let mut card_advantage_count = 0;
    let mut in_collection_count = 0;
    let mut missing_count = 0;
    let mut missing_wildcard_cost: BTreeMap<String, u32> = BTreeMap::new();

    for spell in spells {
        let quantity = spell.quantity;
        spell_count += quantity;
        *mana_curve.entry(spell.card.cmc).or_insert(0) += quantity;
        for color in &spell.card.colors {
            *color_distribution.entry(*color).or_insert(0) += quantity;
        }
        if let Some(card) = card_for(spell.card.card_id) {
            total_cmc += card.cmc * quantity as f64;
            if card.is_creature() {
                creature_count += quantity;
            }
            if is_removal(card) {
                removal_count += quantity;
            }
            if is_card_advantage(card) {
                card_advantage_count += quantity;
            }
        }
        if spell.card.in_collection {
            in_collection_count += 1;
        } else {
            missing_count += 1;
        }
        if spell.card.needed_count > 0 {
            *missing_wildcard_cost
                .entry(spell.card.rarity_key())
                .or_insert(0) += spell.card.needed_count;
        }
    }

    let land_count: u32 = lands.iter().map(|land| land.quantity).sum();
    let average_cmc = if spell_count > 0 {
        total_cmc / spell_count as f64
    } else {
        0.0
    };

    let mut analysis = GeneratedDeckAnalysis {
        total_cards: spell_count + land_count,
        spell_count,
        land_count,
        creature_count,
        non_creature_count: spell_count - creature_count,
        average_cmc,
        mana_curve,
        color_distribution,
        in_collection_count,
        missing_count,
        missing_wildcard_cost,
        archetype_match: 0.0,
        removal_count,
        card_advantage_count,
    };
    analysis.archetype_match = archetype_match(&analysis, profile);
    analysis
}

/// Mean of curve, creature ratio, removal and card advantage fit, in [0, 1].
fn archetype_match(analysis: &GeneratedDeckAnalysis, profile: &ConstructedProfile) -> f64 {
    let slots = profile.spell_slots().max(1) as f64;
    let top = profile.top_slot();
    let mut deviation = 0u32;
    for (slot, wanted) in profile.curve_targets {
        let actual: u32 = analysis
            .mana_curve
            .iter()
            .filter(|(cmc, _)| (**cmc).clamp(1, top) == *slot)
            .map(|(_, count)| *count)
            .sum();
        deviation += actual.abs_diff(*wanted);
    }
    let curve = (1.0 - deviation as f64 / (2.0 * slots)).clamp(0.0, 1.0);

    let ratio = if analysis.spell_count > 0 {
        analysis.creature_count as f64 / analysis.spell_count as f64
    } else {
        0.0
    };
    let creatures = (1.0 - (ratio - profile.creature_ratio).abs() * 2.0).clamp(0.0, 1.0);
    let removal = (analysis.removal_count as f64 / profile.removal_count.max(1) as f64).min(1.0);
    let advantage =
        (analysis.card_advantage_count as f64 / profile.card_advantage.max(1) as f64).min(1.0);

    (curve + creatures + removal + advantage) / 4.0
}

fn build_strategy(
    seed: &Card,
    spells: &[DeckSpell],
    profile: &ConstructedProfile,
    analysis: &GeneratedDeckAnalysis,
    colors: &[Color],
    target: &SynergyTarget,
) -> DeckStrategy {
    let summary = format!(
        "{} {} deck built around {}.",
        color_phrase(colors),
        profile.name,
        seed.name
    );
    let game_plan = match target.themes.first() {
        Some(theme) => format!("{} Lean on the {theme} theme of {}.", profile.game_plan, seed.name),
        None => profile.game_plan.to_string(),
    };

    let mut ranked: Vec<&DeckSpell> = spells.iter().filter(|s| s.card.card_id != seed.id).collect();
    ranked.sort_by(|a, b| b.card.score.total_cmp(&a.card.score));
    let key_cards = std::iter::once(seed.name.clone())
        .chain(ranked.iter().take(4).map(|s| s.card.name.clone()))
        .collect();

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let creature_ratio = if analysis.spell_count > 0 {
        analysis.creature_count as f64 / analysis.spell_count as f64
    } else {
        0.0
    };
    if analysis.average_cmc <= 2.5 && analysis.spell_count > 0 {
        strengths.push("Fast, efficient curve".to_string());
    }
    if creature_ratio >= 0.5 {
        strengths.push("Strong board presence".to_string());
    }
    if analysis.removal_count >= profile.removal_count {
        strengths.push("Plenty of interaction".to_string());
    } else {
        weaknesses.push("Light on removal".to_string());
    }
    if analysis.card_advantage_count >= profile.card_advantage {
        strengths.push("Good card advantage".to_string());
    } else {
        weaknesses.push("Can run out of cards".to_string());
    }
    match colors.len() {
        0 | 1 => strengths.push("Consistent mana".to_string()),
        2 => {}
        _ => weaknesses.push("Mana can be inconsistent".to_string()),
    }
    if analysis.average_cmc > 3.5 {
        weaknesses.push("Slow against aggressive decks".to_string());
    }
    if analysis.creature_count < 8 {
        weaknesses.push("Few threats to close out games".to_string());
    }
    if analysis.total_cards < CONSTRUCTED_DECK_SIZE {
        weaknesses.push(format!(
            "Only {} cards; not enough candidates to fill the deck",
            analysis.total_cards
        ));
    }

    DeckStrategy {
        summary,
        game_plan,
        key_cards,
        mulligan: profile.mulligan.to_string(),
        strengths,
        weaknesses,
    }
}
