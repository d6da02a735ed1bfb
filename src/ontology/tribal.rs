//! Creature-type support levels and synergy weights.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ontology::contains_pattern;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TribalSupport {
    /// 20+ cards with tribal synergies.
    Strong,
    /// 10-20 cards.
    Moderate,
    Weak,
}

impl Display for TribalSupport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TribalInfo {
    pub creature_type: &'static str,
    pub support: TribalSupport,
    pub synergy_weight: f64,
    pub related_types: &'static [&'static str],
    pub common_keywords: &'static [&'static str],
    pub description: &'static str,
}

const fn tribe(
    creature_type: &'static str,
    support: TribalSupport,
    synergy_weight: f64,
    related_types: &'static [&'static str],
    common_keywords: &'static [&'static str],
    description: &'static str,
) -> TribalInfo {
    TribalInfo {
        creature_type,
        support,
        synergy_weight,
        related_types,
        common_keywords,
        description,
    }
}

use TribalSupport::{Moderate, Strong, Weak};

pub static TRIBAL_DATABASE: &[TribalInfo] = &[
    tribe(
        "Elf",
        Strong,
        1.3,
        &["Druid", "Ranger", "Shaman"],
        &["mana ramp", "tokens", "+1/+1 counters"],
        "Mana production and overwhelming board presence",
    ),
    tribe(
        "Goblin",
        Strong,
        1.3,
        &["Shaman", "Warrior"],
        &["haste", "sacrifice", "tokens", "damage"],
        "Aggressive swarm tactics with sacrifice synergies",
    ),
    tribe(
        "Vampire",
        Strong,
        1.3,
        &["Noble", "Knight"],
        &["lifelink", "+1/+1 counters", "blood tokens", "drain"],
        "Life manipulation and incremental advantage",
    ),
    tribe(
        "Zombie",
        Strong,
        1.3,
        &["Skeleton"],
        &["graveyard", "death triggers", "tokens", "sacrifice"],
        "Graveyard recursion and death synergies",
    ),
    tribe(
        "Merfolk",
        Strong,
        1.2,
        &["Wizard"],
        &["+1/+1 counters", "unblockable", "card draw"],
        "Evasion and counter-based growth",
    ),
    tribe(
        "Human",
        Strong,
        1.2,
        &["Soldier", "Knight", "Cleric", "Wizard"],
        &["tokens", "anthem", "+1/+1 counters"],
        "Versatile tribe with wide support across colors",
    ),
    tribe(
        "Wizard",
        Strong,
        1.2,
        &["Human", "Merfolk"],
        &["spells matter", "card draw", "counters"],
        "Spell synergies and card advantage",
    ),
    tribe(
        "Soldier",
        Strong,
        1.2,
        &["Human", "Knight", "Warrior"],
        &["tokens", "anthem", "go wide"],
        "Token generation and army building",
    ),
    tribe(
        "Cat",
        Moderate,
        1.1,
        &["Beast"],
        &["tokens", "lifegain", "+1/+1 counters"],
        "Token generation and lifegain synergies",
    ),
    tribe(
        "Dog",
        Moderate,
        1.0,
        &["Beast"],
        &["tokens", "anthem", "fetch lands"],
        "Loyal companions with pack tactics",
    ),
    tribe(
        "Dinosaur",
        Moderate,
        1.1,
        &["Beast"],
        &["trample", "enrage", "damage"],
        "Big creatures with damage-based triggers",
    ),
    tribe(
        "Dragon",
        Moderate,
        1.1,
        &[],
        &["flying", "treasure tokens", "damage"],
        "Powerful flyers with treasure generation",
    ),
    tribe(
        "Angel",
        Moderate,
        1.1,
        &[],
        &["flying", "lifelink", "vigilance"],
        "Evasive threats with lifegain",
    ),
    tribe(
        "Demon",
        Moderate,
        1.0,
        &["Devil"],
        &["flying", "sacrifice", "pay life"],
        "Powerful creatures with sacrifice costs",
    ),
    tribe(
        "Spirit",
        Moderate,
        1.1,
        &[],
        &["flying", "disturb", "enchantments matter"],
        "Evasive creatures with graveyard synergies",
    ),
    tribe(
        "Rogue",
        Moderate,
        1.1,
        &["Assassin", "Faerie"],
        &["mill", "flash", "evasion"],
        "Mill strategies and sneaky tactics",
    ),
    tribe(
        "Warrior",
        Moderate,
        1.0,
        &["Berserker", "Barbarian"],
        &["haste", "attack triggers", "+1/+1 counters"],
        "Aggressive combat-focused creatures",
    ),
    tribe(
        "Knight",
        Moderate,
        1.1,
        &["Human", "Soldier"],
        &["first strike", "vigilance", "equipment"],
        "Combat specialists with equipment synergies",
    ),
    tribe(
        "Faerie",
        Moderate,
        1.1,
        &["Rogue"],
        &["flying", "flash", "spells matter"],
        "Tricky flyers with instant-speed plays",
    ),
    tribe(
        "Monk",
        Weak,
        0.9,
        &["Human"],
        &["prowess", "spells matter", "+1/+1 counters"],
        "Spell-focused combat creatures",
    ),
    tribe(
        "Ninja",
        Weak,
        1.0,
        &["Rogue"],
        &["ninjutsu", "evasion", "card draw"],
        "Combat damage triggers with ninjutsu",
    ),
    tribe(
        "Samurai",
        Weak,
        0.9,
        &["Warrior", "Human"],
        &["attack triggers", "first strike", "vigilance"],
        "Solo attackers with combat bonuses",
    ),
    tribe(
        "Pirate",
        Weak,
        1.0,
        &["Rogue"],
        &["treasure tokens", "evasion", "raid"],
        "Treasure generation and raid mechanics",
    ),
    tribe(
        "Cleric",
        Weak,
        0.9,
        &["Human"],
        &["lifegain", "party", "removal"],
        "Life manipulation and party synergies",
    ),
    tribe(
        "Shaman",
        Weak,
        0.9,
        &["Elf", "Goblin"],
        &["mana ramp", "sacrifice", "ETB"],
        "Mana and sacrifice abilities",
    ),
    tribe(
        "Elemental",
        Moderate,
        1.0,
        &[],
        &["landfall", "evoke", "ETB"],
        "Land synergies and evoke abilities",
    ),
    tribe(
        "Beast",
        Weak,
        0.8,
        &["Cat", "Dog", "Dinosaur"],
        &["trample", "+1/+1 counters"],
        "Generic green creatures with size",
    ),
    tribe(
        "Artifact Creature",
        Moderate,
        1.1,
        &["Construct", "Golem"],
        &["artifacts matter", "modular", "+1/+1 counters"],
        "Artifact synergies and modular mechanics",
    ),
    tribe(
        "Construct",
        Weak,
        0.9,
        &["Artifact Creature", "Golem"],
        &["artifacts matter", "tokens"],
        "Artifact creature tokens and synergies",
    ),
    tribe(
        "Rat",
        Weak,
        1.0,
        &[],
        &["tokens", "discard", "sacrifice"],
        "Swarm tactics and discard synergies",
    ),
    tribe(
        "Bird",
        Weak,
        0.8,
        &[],
        &["flying", "tokens"],
        "Evasive flyers",
    ),
    tribe(
        "Phyrexian",
        Moderate,
        1.0,
        &[],
        &["toxic", "proliferate", "oil counters"],
        "Poison and counter synergies",
    ),
];

static TRIBAL_INDEX: Lazy<HashMap<&'static str, &'static TribalInfo>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for info in TRIBAL_DATABASE {
        index.entry(info.creature_type).or_insert(info);
    }
    index
});

pub fn tribal_info(creature_type: &str) -> Option<&'static TribalInfo> {
    TRIBAL_INDEX.get(creature_type).copied()
}

pub fn tribal_synergy_weight(creature_type: &str) -> f64 {
    tribal_info(creature_type)
        .map(|info| info.synergy_weight)
        .unwrap_or(1.0)
}

pub fn related_types(creature_type: &str) -> &'static [&'static str] {
    tribal_info(creature_type)
        .map(|info| info.related_types)
        .unwrap_or(&[])
}

pub fn is_strong_tribal_support(creature_type: &str) -> bool {
    tribal_info(creature_type)
        .map(|info| info.support == TribalSupport::Strong)
        .unwrap_or(false)
}

pub fn tribal_keywords(creature_type: &str) -> &'static [&'static str] {
    tribal_info(creature_type)
        .map(|info| info.common_keywords)
        .unwrap_or(&[])
}

/// Whether rules text grants every creature type.
pub fn is_changeling(oracle_text: &str) -> bool {
    if oracle_text.is_empty() {
        return false;
    }
    let lower = oracle_text.to_lowercase();
    contains_pattern(&lower, "changeling") || contains_pattern(&lower, "is every creature type")
}

pub fn all_supported_tribes() -> Vec<&'static str> {
    let mut tribes: Vec<&'static str> = TRIBAL_DATABASE.iter().map(|i| i.creature_type).collect();
    tribes.sort_unstable();
    tribes
}

pub fn strong_tribes() -> Vec<&'static str> {
    let mut tribes: Vec<&'static str> = TRIBAL_DATABASE
        .iter()
        .filter(|i| i.support == TribalSupport::Strong)
        .map(|i| i.creature_type)
        .collect();
    tribes.sort_unstable();
    tribes
}

#[cfg(test)]
mod tests {
    use crate::ontology::tribal::{
        all_supported_tribes, is_changeling, is_strong_tribal_support, related_types,
        strong_tribes, tribal_info, tribal_keywords, tribal_synergy_weight, TribalSupport,
    };

    #[test]
    fn looks_up_known_tribes() {
        let elf = tribal_info("Elf").expect("elf missing");
        assert_eq!(elf.support, TribalSupport::Strong);
        assert!((elf.synergy_weight - 1.3).abs() < 1e-9);
        assert!(related_types("Elf").contains(&"Druid"));
        assert!(tribal_keywords("Goblin").contains(&"haste"));
    }

    #[test]
    fn unknown_tribes_are_neutral() {
        assert!(tribal_info("Homunculus").is_none());
        assert!((tribal_synergy_weight("Homunculus") - 1.0).abs() < 1e-9);
        assert!(related_types("Homunculus").is_empty());
        assert!(!is_strong_tribal_support("Homunculus"));
    }

    #[test]
    fn strong_tribes_are_sorted() {
        let strong = strong_tribes();
        assert_eq!(strong.len(), 8);
        assert_eq!(strong.first(), Some(&"Elf"));
        assert_eq!(all_supported_tribes().len(), 32);
    }

    #[test]
    fn detects_changelings() {
        assert!(is_changeling("Changeling (This card is every creature type.)"));
        assert!(!is_changeling("Flying"));
        assert!(!is_changeling(""));
    }
}
