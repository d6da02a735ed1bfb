//! Build-around deck builders for 60-card constructed: suggestions around a
//! seed card, next-card suggestions for a deck in progress, and full deck
//! generation.

pub mod complete;
pub mod iterative;
pub mod lands;
pub mod seed;
pub mod synergy;

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{DeckError, DeckResult};
use crate::sources::CardSources;
use crate::types::{Card, CardId, Color};

pub use complete::{constructed_profile, constructed_profiles, ConstructedProfile};

/// Which sets candidate cards are drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SetRestriction {
    /// The seed card's own set.
    Single,
    /// The request's allowed sets.
    Multiple,
    /// Every standard-legal set.
    #[default]
    All,
}

impl SetRestriction {
    pub const ALL: [SetRestriction; 3] = [
        SetRestriction::Single,
        SetRestriction::Multiple,
        SetRestriction::All,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::All => "all",
        }
    }
}

impl Display for SetRestriction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown set restriction: {0}")]
pub struct SetRestrictionParseError(pub String);

impl FromStr for SetRestriction {
    type Err = SetRestrictionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            "all" | "" => Ok(Self::All),
            _ => Err(SetRestrictionParseError(s.to_string())),
        }
    }
}

/// Where candidates come from and whether only owned cards qualify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateScope {
    pub set_restriction: SetRestriction,
    pub allowed_sets: Vec<String>,
    pub budget_mode: bool,
}

impl CandidateScope {
    pub fn with_sets(mut self, sets: Vec<String>) -> Self {
        self.set_restriction = SetRestriction::Multiple;
        self.allowed_sets = sets;
        self
    }

    pub fn with_restriction(mut self, restriction: SetRestriction) -> Self {
        self.set_restriction = restriction;
        self
    }

    pub fn with_budget_mode(mut self, budget_mode: bool) -> Self {
        self.budget_mode = budget_mode;
        self
    }
}

/// A suggested card with the user's ownership of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardWithOwnership {
    pub card_id: CardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mana_cost: String,
    pub cmc: u32,
    pub colors: Vec<Color>,
    pub type_line: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rarity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_uri: String,
    pub score: f64,
    pub reasoning: String,
    pub in_collection: bool,
    pub owned_count: u32,
    pub needed_count: u32,
}

impl CardWithOwnership {
    /// `needed_count` is how many copies short of `wanted` the collection is.
    pub fn new(card: &Card, score: f64, reasoning: String, owned: u32, wanted: u32) -> Self {
        Self {
            card_id: card.id,
            name: card.name.clone(),
            mana_cost: card.mana_cost.clone().unwrap_or_default(),
            cmc: card.cmc_slot(),
            colors: card.colors.clone(),
            type_line: card.type_line.clone(),
            rarity: card.rarity.clone(),
            image_uri: card.image_uri.clone().unwrap_or_default(),
            score,
            reasoning,
            in_collection: owned > 0,
            owned_count: owned,
            needed_count: wanted.saturating_sub(owned),
        }
    }

    pub fn rarity_key(&self) -> String {
        self.rarity.to_lowercase()
    }
}

/// Constants of the build-around pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTuning {
    pub max_results: usize,
    pub min_score: f64,
    pub land_total: u32,
    pub max_copies: u32,
}

impl Default for SeedTuning {
    fn default() -> Self {
        Self {
            max_results: 40,
            min_score: 0.3,
            land_total: 24,
            max_copies: 4,
        }
    }
}

/// Entry point for every build-around operation.
#[derive(Clone)]
pub struct SeedDeckBuilder {
    sources: CardSources,
    tuning: SeedTuning,
}

impl SeedDeckBuilder {
    pub fn new(sources: CardSources) -> Self {
        Self {
            sources,
            tuning: SeedTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: SeedTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &SeedTuning {
        &self.tuning
    }

    fn max_results(&self, requested: usize) -> usize {
        if requested == 0 {
            self.tuning.max_results
        } else {
            requested
        }
    }

    async fn load_seed(&self, seed_card_id: CardId) -> DeckResult<Card> {
        if seed_card_id <= 0 {
            return Err(DeckError::InvalidRequest("seed card ID is required".to_string()));
        }
        let cards = self.sources.require_cards()?;
        cards
            .get_card(seed_card_id)
            .await
            .context("failed to analyze seed card")?
            .ok_or(DeckError::CardNotFound(seed_card_id))
    }

    /// Cards from the scoped sets, minus the excluded ids.
    async fn candidates(
        &self,
        scope: &CandidateScope,
        home_set: &str,
        exclude: &[CardId],
    ) -> DeckResult<Vec<Card>> {
        let sets = self.sources.require_sets()?;
        let mut candidates = Vec::new();

        match scope.set_restriction {
            SetRestriction::Single => {
                candidates = sets
                    .cards_by_set(home_set)
                    .await
                    .with_context(|| format!("failed to get candidates from {home_set}"))?;
            }
            SetRestriction::Multiple => {
                for set_code in &scope.allowed_sets {
                    match sets.cards_by_set(set_code).await {
                        Ok(cards) => candidates.extend(cards),
                        Err(err) => warn!(set = %set_code, error = %err, "skipping set"),
                    }
                }
            }
            SetRestriction::All => {
                let standard = sets
                    .standard_sets()
                    .await
                    .context("failed to get standard sets")?;
                for set_code in &standard {
                    match sets.cards_by_set(set_code).await {
                        Ok(cards) => candidates.extend(cards),
                        Err(err) => warn!(set = %set_code, error = %err, "skipping set"),
                    }
                }
            }
        }

        candidates.retain(|card| !exclude.contains(&card.id));
        debug!(
            restriction = %scope.set_restriction,
            count = candidates.len(),
            "gathered candidates"
        );
        Ok(candidates)
    }

    async fn collection(&self) -> HashMap<CardId, u32> {
        self.sources.collection_or_empty().await
    }
}

/// Wildcards needed per lowercase rarity for the cards not yet owned.
pub(crate) fn tally_missing<'a, I>(cards: I) -> (u32, u32, BTreeMap<String, u32>)
where
    I: IntoIterator<Item = &'a CardWithOwnership>,
{
    let mut in_collection = 0;
    let mut missing = 0;
    let mut cost = BTreeMap::new();
    for card in cards {
        if card.in_collection {
            in_collection += 1;
        } else {
            missing += 1;
            *cost.entry(card.rarity_key()).or_insert(0) += 1;
        }
    }
    (in_collection, missing, cost)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::sources::memory::InMemoryCatalog;
    use crate::types::{Card, Color};

    pub const SEED: i64 = 1;

    /// Two standard sets around a green elf seed, plus one non-standard set.
    pub fn catalog() -> InMemoryCatalog {
        let green = [Color::Green];
        let mut catalog = InMemoryCatalog::new()
            .with_card(
                Card::new(SEED, "Elvish Warchief", "Creature — Elf Warrior")
                    .with_cmc(2.0)
                    .with_colors(&green)
                    .with_mana_cost("{1}{G}")
                    .with_rarity("rare")
                    .with_set("AAA")
                    .with_oracle_text("Whenever another creature you control dies, draw a card."),
            )
            .with_card(
                Card::new(2, "Elf Veteran", "Creature — Elf Warrior")
                    .with_cmc(3.0)
                    .with_colors(&green)
                    .with_mana_cost("{2}{G}")
                    .with_rarity("uncommon")
                    .with_set("AAA"),
            )
            .with_card(
                Card::new(3, "Llanowar Scout", "Creature — Elf Scout")
                    .with_cmc(1.0)
                    .with_colors(&green)
                    .with_mana_cost("{G}")
                    .with_rarity("common")
                    .with_set("AAA"),
            )
            .with_card(
                Card::new(4, "Grim Harvest", "Sorcery")
                    .with_cmc(2.0)
                    .with_colors(&[Color::Black])
                    .with_mana_cost("{1}{B}")
                    .with_rarity("common")
                    .with_set("AAA")
                    .with_oracle_text("Destroy target creature."),
            )
            .with_card(
                Card::new(5, "Golden Golem", "Artifact Creature — Golem")
                    .with_cmc(4.0)
                    .with_mana_cost("{4}")
                    .with_rarity("mythic")
                    .with_set("BBB"),
            )
            .with_card(
                Card::new(6, "Harmonize", "Sorcery")
                    .with_cmc(4.0)
                    .with_colors(&green)
                    .with_mana_cost("{2}{G}{G}")
                    .with_rarity("uncommon")
                    .with_set("BBB")
                    .with_oracle_text("Draw three cards. Draw a card."),
            )
            .with_card(
                Card::new(7, "Pelt Collector", "Creature — Elf Warrior")
                    .with_cmc(1.0)
                    .with_colors(&green)
                    .with_mana_cost("{G}")
                    .with_rarity("rare")
                    .with_set("ZZZ"),
            )
            .with_card(
                Card::new(8, "Thornwood Falls", "Land")
                    .with_rarity("common")
                    .with_set("BBB")
                    .with_oracle_text("Thornwood Falls enters the battlefield tapped.\n{T}: Add {G} or {U}."),
            )
            .with_standard_sets(&["AAA", "BBB"]);
        for id in 10..30 {
            let cmc = (id % 5 + 1) as f64;
            catalog = catalog.with_card(
                Card::new(id, &format!("Forest Beast {id}"), "Creature — Beast")
                    .with_cmc(cmc)
                    .with_colors(&green)
                    .with_mana_cost("{G}")
                    .with_rarity("common")
                    .with_set("BBB"),
            );
        }
        for id in 30..40 {
            catalog = catalog.with_card(
                Card::new(id, &format!("Giant Growth {id}"), "Instant")
                    .with_cmc(1.0)
                    .with_colors(&green)
                    .with_mana_cost("{G}")
                    .with_rarity("common")
                    .with_set("BBB")
                    .with_oracle_text("Target creature gets +3/+3 until end of turn. Draw a card."),
            );
        }
        catalog.with_owned(2, 4).with_owned(SEED, 1).with_owned(5, 2)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::builder::{tally_missing, CardWithOwnership, SetRestriction};
    use crate::types::{Card, Color};

    #[test]
    fn set_restriction_parses_with_all_default() {
        assert_eq!(SetRestriction::from_str("single").expect("single"), SetRestriction::Single);
        assert_eq!(SetRestriction::from_str("").expect("empty"), SetRestriction::All);
        assert_eq!(SetRestriction::default(), SetRestriction::All);
        assert!(SetRestriction::from_str("some").is_err());
    }

    #[test]
    fn ownership_counts_needed_copies() {
        let card = Card::new(9, "Bear", "Creature — Bear")
            .with_colors(&[Color::Green])
            .with_rarity("Rare");
        let owned = CardWithOwnership::new(&card, 0.8, String::new(), 1, 4);
        assert!(owned.in_collection);
        assert_eq!(owned.needed_count, 3);
        let extra = CardWithOwnership::new(&card, 0.8, String::new(), 6, 4);
        assert_eq!(extra.needed_count, 0);
        let missing = CardWithOwnership::new(&card, 0.8, String::new(), 0, 4);

        let (have, lack, cost) = tally_missing([&owned, &missing]);
        assert_eq!((have, lack), (1, 1));
        assert_eq!(cost.get("rare"), Some(&1));
    }
}
