//! Static keyword and theme tables.
//!
//! Dictionary entries match by plain substring against lowercased rules text.
//! Theme patterns go through [`contains_pattern`](crate::ontology::contains_pattern)
//! and may contain a single `.*` wildcard.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ontology::KeywordCategory::{self, *};

#[derive(Debug, Clone, Copy)]
pub struct DictionaryEntry {
    pub keyword: &'static str,
    pub category: KeywordCategory,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ThemePattern {
    pub pattern: &'static str,
    pub keyword: &'static str,
    pub category: KeywordCategory,
    pub weight: f64,
}

const fn kw(keyword: &'static str, category: KeywordCategory, weight: f64) -> DictionaryEntry {
    DictionaryEntry {
        keyword,
        category,
        weight,
    }
}

const fn theme(
    pattern: &'static str,
    keyword: &'static str,
    category: KeywordCategory,
    weight: f64,
) -> ThemePattern {
    ThemePattern {
        pattern,
        keyword,
        category,
        weight,
    }
}

pub static KEYWORD_DICTIONARY: &[DictionaryEntry] = &[
    // Evergreen combat
    kw("flying", Combat, 0.8),
    kw("first strike", Combat, 0.7),
    kw("double strike", Combat, 0.9),
    kw("deathtouch", Combat, 0.8),
    kw("haste", Combat, 0.6),
    kw("lifelink", Combat, 0.7),
    kw("menace", Combat, 0.7),
    kw("reach", Combat, 0.5),
    kw("trample", Combat, 0.7),
    kw("vigilance", Combat, 0.6),
    // Protection
    kw("hexproof", Protection, 0.8),
    kw("indestructible", Protection, 0.9),
    kw("ward", Protection, 0.7),
    kw("shroud", Protection, 0.7),
    kw("protection", Protection, 0.7),
    // Static and casting abilities
    kw("flash", Ability, 0.6),
    kw("defender", Ability, 0.3),
    kw("prowess", Ability, 0.8),
    kw("convoke", Ability, 0.7),
    // Set mechanics
    kw("flashback", Mechanic, 0.8),
    kw("kicker", Mechanic, 0.6),
    kw("adventure", Mechanic, 0.7),
    kw("transform", Mechanic, 0.6),
    kw("disturb", Mechanic, 0.7),
    kw("exploit", Mechanic, 0.8),
    kw("escape", Mechanic, 0.8),
    kw("madness", Mechanic, 0.7),
    kw("cycling", Mechanic, 0.6),
    kw("cascade", Mechanic, 0.9),
    kw("mutate", Mechanic, 0.8),
    kw("foretell", Mechanic, 0.7),
    kw("learn", Mechanic, 0.6),
    kw("ninjutsu", Mechanic, 0.8),
    kw("channel", Mechanic, 0.6),
    kw("bargain", Mechanic, 0.7),
    kw("craft", Mechanic, 0.7),
    kw("descend", Mechanic, 0.7),
    kw("threshold", Mechanic, 0.7),
    kw("delirium", Mechanic, 0.7),
    kw("affinity", Mechanic, 0.8),
    kw("modular", Mechanic, 0.7),
    kw("equip", Mechanic, 0.6),
    kw("crew", Mechanic, 0.7),
    kw("offspring", Mechanic, 0.7),
    kw("valiant", Mechanic, 0.7),
];

pub static THEME_PATTERNS: &[ThemePattern] = &[
    // Tokens
    theme("create a token", "tokens", Theme, 0.9),
    theme("create a.*token", "tokens", Theme, 0.9),
    theme("creates a token", "tokens", Theme, 0.9),
    theme("create two", "tokens", Theme, 0.9),
    theme("create three", "tokens", Theme, 0.9),
    // Counters
    theme("+1/+1 counter", "+1/+1 counters", Theme, 0.9),
    theme("put a counter", "counters", Theme, 0.7),
    theme("put counters", "counters", Theme, 0.7),
    theme("-1/-1 counter", "-1/-1 counters", Theme, 0.8),
    theme("loyalty counter", "planeswalkers", Theme, 0.7),
    theme("charge counter", "artifacts", Theme, 0.6),
    // Graveyard
    theme("from your graveyard", "graveyard", Theme, 0.9),
    theme("from a graveyard", "graveyard", Theme, 0.9),
    theme("in your graveyard", "graveyard", Theme, 0.8),
    theme("return.*from.*graveyard", "graveyard", Theme, 0.9),
    theme("mill", "mill", Theme, 0.8),
    theme("self-mill", "mill", Theme, 0.9),
    // Sacrifice and death
    theme("sacrifice a", "sacrifice", Theme, 0.9),
    theme("sacrifice another", "sacrifice", Theme, 0.9),
    theme("sacrificed", "sacrifice", Theme, 0.8),
    theme("when.*dies", "death triggers", Theme, 0.8),
    theme("whenever.*dies", "death triggers", Theme, 0.8),
    theme(
        "whenever another creature you control dies",
        "death payoff",
        Theme,
        0.95,
    ),
    theme("whenever a creature you control dies", "death payoff", Theme, 0.9),
    theme("whenever a nontoken creature", "death triggers", Theme, 0.85),
    theme("sacrifice a token", "token sacrifice", Theme, 0.9),
    theme("sacrifices a token", "token sacrifice", Theme, 0.9),
    theme("when you sacrifice", "sacrifice payoff", Theme, 0.9),
    theme("whenever you sacrifice", "sacrifice payoff", Theme, 0.9),
    theme("whenever you sacrifice a", "sacrifice payoff", Theme, 0.9),
    theme("as an additional cost", "sacrifice", Theme, 0.7),
    theme("blood token", "blood tokens", Theme, 0.8),
    theme("food token", "food tokens", Theme, 0.8),
    theme("treasure token", "treasure tokens", Theme, 0.8),
    theme("clue token", "clue tokens", Theme, 0.8),
    theme("map token", "map tokens", Theme, 0.8),
    // Card draw and selection
    theme("draw a card", "card draw", Theme, 0.7),
    theme("draw cards", "card draw", Theme, 0.8),
    theme("draw two", "card draw", Theme, 0.8),
    theme("draw three", "card draw", Theme, 0.9),
    theme("scry", "scry", Theme, 0.6),
    theme("surveil", "surveil", Theme, 0.7),
    theme("whenever you draw your second card", "second draw", Theme, 0.9),
    theme("draw your second card", "second draw", Theme, 0.9),
    theme("draw an additional card", "card advantage", Theme, 0.8),
    theme("you may draw an additional card", "card advantage", Theme, 0.8),
    theme("draw two additional cards", "card advantage", Theme, 0.9),
    // Life
    theme("gain life", "lifegain", Theme, 0.7),
    theme("gains life", "lifegain", Theme, 0.7),
    theme("whenever you gain life", "lifegain payoff", Theme, 0.9),
    theme("lose life", "drain", Theme, 0.7),
    theme("pay life", "pay life", Theme, 0.6),
    // Combat
    theme("deals combat damage", "combat damage", Theme, 0.8),
    theme("whenever.*attacks", "attack triggers", Theme, 0.8),
    theme("whenever.*blocks", "block triggers", Theme, 0.7),
    theme("can't be blocked", "evasion", Theme, 0.8),
    // Triggers
    theme("when.*enters", "enters triggers", Trigger, 0.8),
    theme("when.*enters the battlefield", "ETB", Trigger, 0.9),
    theme("whenever.*enters", "enters triggers", Trigger, 0.8),
    theme("whenever you cast", "cast triggers", Trigger, 0.8),
    theme("when you cast", "cast triggers", Trigger, 0.8),
    theme("at the beginning of", "upkeep triggers", Trigger, 0.7),
    theme("at the beginning of your upkeep", "upkeep", Trigger, 0.7),
    theme("at the beginning of your end step", "end step", Trigger, 0.7),
    // Activated
    theme("{t}:", "tap abilities", Activated, 0.7),
    theme("{t},", "tap abilities", Activated, 0.7),
    theme("tap:", "tap abilities", Activated, 0.7),
    // Spells matter
    theme("instant or sorcery", "spells matter", Theme, 0.8),
    theme("noncreature spell", "spells matter", Theme, 0.8),
    theme(
        "whenever you cast a noncreature spell",
        "spells matter",
        Theme,
        0.9,
    ),
    theme(
        "whenever you cast an instant or sorcery",
        "spells matter",
        Theme,
        0.9,
    ),
    theme(
        "whenever you cast your first instant or sorcery",
        "spells matter",
        Theme,
        0.85,
    ),
    theme("magecraft", "spells matter", Theme, 0.9),
    theme("copy target instant or sorcery", "spell copy", Theme, 0.8),
    theme("copy that spell", "spell copy", Theme, 0.8),
    // Artifacts and enchantments
    theme("artifact you control", "artifacts matter", Theme, 0.8),
    theme("enchantment you control", "enchantments matter", Theme, 0.8),
    theme("aura", "auras", Theme, 0.7),
    theme("equipment", "equipment", Theme, 0.7),
    theme("whenever an artifact enters", "artifacts ETB", Theme, 0.85),
    theme(
        "whenever an artifact enters the battlefield",
        "artifacts ETB",
        Theme,
        0.9,
    ),
    theme("whenever an artifact leaves", "artifacts matter", Theme, 0.8),
    theme(
        "whenever an artifact or creature you control",
        "artifacts matter",
        Theme,
        0.8,
    ),
    theme("whenever an enchantment enters", "enchantments ETB", Theme, 0.85),
    theme(
        "whenever an enchantment enters the battlefield",
        "enchantments ETB",
        Theme,
        0.9,
    ),
    // Pump
    theme("gets +", "pump", Theme, 0.6),
    theme("get +", "pump", Theme, 0.6),
    theme("target creature gets", "pump", Theme, 0.6),
    // Removal
    theme("destroy target", "removal", Theme, 0.8),
    theme("exile target", "removal", Theme, 0.8),
    theme("deals.*damage to", "damage", Theme, 0.7),
    theme("fight", "fight", Theme, 0.7),
    theme("bite", "fight", Theme, 0.7),
    // Discard
    theme("discard a card", "discard", Theme, 0.7),
    theme("discards a card", "discard", Theme, 0.7),
    theme("whenever you discard", "discard payoff", Theme, 0.85),
    theme("whenever a player discards", "discard payoff", Theme, 0.8),
    theme("discard your hand", "discard", Theme, 0.8),
    theme("discarded this turn", "discard payoff", Theme, 0.8),
    // Blink
    theme("exile.*then return", "blink", Theme, 0.9),
    theme(
        "exile target creature you control, then return",
        "blink",
        Theme,
        0.9,
    ),
    theme("exile it, then return", "blink", Theme, 0.85),
    theme("exile up to one", "blink", Theme, 0.8),
    // Go wide and anthems
    theme("whenever a creature you control attacks", "go wide", Theme, 0.85),
    theme(
        "whenever one or more creatures you control",
        "go wide",
        Theme,
        0.8,
    ),
    theme("creatures you control get", "anthem", Theme, 0.9),
    theme("other creatures you control get", "anthem", Theme, 0.9),
    theme("creatures you control have", "anthem", Theme, 0.85),
    // Landfall
    theme(
        "whenever a land enters the battlefield under your control",
        "landfall",
        Theme,
        0.9,
    ),
    theme("landfall", "landfall", Theme, 0.9),
    // Ramp
    theme("add one mana", "mana ramp", Theme, 0.6),
    theme("add two mana", "mana ramp", Theme, 0.7),
    theme("search your library for a.*land", "land ramp", Theme, 0.8),
    theme("search your library for a basic land", "land ramp", Theme, 0.8),
    // Historic and legends
    theme("historic", "historic", Theme, 0.7),
    theme("legendary", "legends matter", Theme, 0.6),
    theme("whenever you cast a legendary", "legends matter", Theme, 0.85),
    // Type-specific triggers
    theme("whenever another.*enters", "type ETB", Theme, 0.75),
    theme("for each creature you control", "go wide", Theme, 0.85),
    theme(
        "equal to the number of creatures you control",
        "go wide",
        Theme,
        0.85,
    ),
    // Control
    theme("can't be countered", "uncounterable", Theme, 0.7),
    theme("this spell can't be countered", "uncounterable", Theme, 0.7),
    theme("counter target spell", "control", Theme, 0.8),
    theme("return target", "bounce", Theme, 0.7),
    // Energy
    theme("energy counter", "energy", Theme, 0.9),
    theme("{e}", "energy", Theme, 0.9),
];

static DICTIONARY_INDEX: Lazy<HashMap<&'static str, &'static DictionaryEntry>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for entry in KEYWORD_DICTIONARY {
        index.entry(entry.keyword).or_insert(entry);
    }
    index
});

pub fn dictionary_entry(keyword: &str) -> Option<&'static DictionaryEntry> {
    DICTIONARY_INDEX.get(keyword).copied()
}

pub fn first_theme_for(keyword: &str) -> Option<&'static ThemePattern> {
    THEME_PATTERNS.iter().find(|pattern| pattern.keyword == keyword)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::ontology::keywords::{KEYWORD_DICTIONARY, THEME_PATTERNS};

    #[test]
    fn weights_are_in_unit_interval() {
        for entry in KEYWORD_DICTIONARY {
            assert!(entry.weight > 0.0 && entry.weight <= 1.0, "{}", entry.keyword);
        }
        for pattern in THEME_PATTERNS {
            assert!(pattern.weight > 0.0 && pattern.weight <= 1.0, "{}", pattern.pattern);
        }
    }

    #[test]
    fn dictionary_keywords_are_unique_and_lowercase() {
        let mut seen = BTreeSet::new();
        for entry in KEYWORD_DICTIONARY {
            assert_eq!(entry.keyword, entry.keyword.to_lowercase());
            assert!(seen.insert(entry.keyword), "duplicate {}", entry.keyword);
        }
    }
}
