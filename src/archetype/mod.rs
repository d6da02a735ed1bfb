pub mod classifier;
pub mod report;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Archetype {
    Aggro,
    Control,
    Midrange,
    Combo,
    Tempo,
    Ramp,
    Tribal,
    Tokens,
    Artifacts,
}

impl Archetype {
    pub const ALL: [Archetype; 9] = [
        Archetype::Aggro,
        Archetype::Control,
        Archetype::Midrange,
        Archetype::Combo,
        Archetype::Tempo,
        Archetype::Ramp,
        Archetype::Tribal,
        Archetype::Tokens,
        Archetype::Artifacts,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Aggro => "aggro",
            Self::Control => "control",
            Self::Midrange => "midrange",
            Self::Combo => "combo",
            Self::Tempo => "tempo",
            Self::Ramp => "ramp",
            Self::Tribal => "tribal",
            Self::Tokens => "tokens",
            Self::Artifacts => "artifacts",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Aggro => "Fast, aggressive deck that wins by dealing damage quickly",
            Self::Control => "Reactive deck that answers threats and wins in the late game",
            Self::Midrange => "Flexible deck with efficient threats and removal",
            Self::Combo => "Deck built around specific card combinations",
            Self::Tempo => "Deck that deploys threats while disrupting the opponent",
            Self::Ramp => "Deck that accelerates mana to cast big spells early",
            Self::Tribal => "Deck focused on creature type synergies",
            Self::Tokens => "Deck that creates many creature tokens",
            Self::Artifacts => "Deck built around artifact synergies",
        }
    }

    pub fn signals(&self) -> &'static [ArchetypeSignal] {
        match self {
            Self::Aggro => AGGRO_SIGNALS,
            Self::Control => CONTROL_SIGNALS,
            Self::Midrange => MIDRANGE_SIGNALS,
            Self::Combo => COMBO_SIGNALS,
            Self::Tempo => TEMPO_SIGNALS,
            Self::Ramp => RAMP_SIGNALS,
            Self::Tribal => TRIBAL_SIGNALS,
            Self::Tokens => TOKENS_SIGNALS,
            Self::Artifacts => ARTIFACTS_SIGNALS,
        }
    }
}

impl Display for Archetype {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Aggro => "Aggro",
            Self::Control => "Control",
            Self::Midrange => "Midrange",
            Self::Combo => "Combo",
            Self::Tempo => "Tempo",
            Self::Ramp => "Ramp",
            Self::Tribal => "Tribal",
            Self::Tokens => "Tokens",
            Self::Artifacts => "Artifacts",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown archetype: {0}")]
pub struct ArchetypeParseError(pub String);

impl FromStr for Archetype {
    type Err = ArchetypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_slug() == normalized)
            .ok_or_else(|| ArchetypeParseError(s.to_string()))
    }
}

/// How a signal is evaluated beyond its CMC bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalRule {
    /// Count cards matching the type/pattern/keyword filters.
    Matching,
    /// Satisfied when the deck runs ten or fewer creatures.
    FewCreatures,
    /// Satisfied by four or more nonland cards costing five or more.
    BigFinishers,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArchetypeSignal {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub type_lines: &'static [&'static str],
    pub keywords: &'static [&'static str],
    /// Minimum average CMC, 0 for none.
    pub min_cmc: f64,
    /// Maximum average CMC, 0 for none. For type signals it also caps each card's CMC.
    pub max_cmc: f64,
    pub min_count: usize,
    pub weight: f64,
    pub rule: SignalRule,
}

const BASE: ArchetypeSignal = ArchetypeSignal {
    name: "",
    patterns: &[],
    type_lines: &[],
    keywords: &[],
    min_cmc: 0.0,
    max_cmc: 0.0,
    min_count: 0,
    weight: 0.0,
    rule: SignalRule::Matching,
};

static AGGRO_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "low curve",
        max_cmc: 2.5,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "haste creatures",
        keywords: &["haste"],
        min_count: 3,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "direct damage",
        patterns: &[
            "deals.*damage to any target",
            "deals.*damage to.*player",
            "deals.*damage to.*opponent",
        ],
        min_count: 3,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "cheap creatures",
        type_lines: &["Creature"],
        max_cmc: 2.0,
        min_count: 12,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "burn spells",
        patterns: &["deals.*damage"],
        type_lines: &["Instant", "Sorcery"],
        min_count: 4,
        weight: 0.2,
        ..BASE
    },
];

static CONTROL_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "high curve",
        min_cmc: 3.0,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "counterspells",
        patterns: &["counter target spell", "counter target.*spell"],
        min_count: 4,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "removal",
        patterns: &[
            "destroy target",
            "exile target",
            "deals.*damage to.*creature",
        ],
        min_count: 6,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "card draw",
        patterns: &["draw.*card", "draw two", "draw three"],
        min_count: 4,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "board wipes",
        patterns: &["destroy all", "exile all", "deals.*damage to each"],
        min_count: 2,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "few creatures",
        type_lines: &["Creature"],
        weight: 0.1,
        rule: SignalRule::FewCreatures,
        ..BASE
    },
];

static MIDRANGE_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "balanced curve",
        min_cmc: 2.5,
        max_cmc: 3.5,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "value creatures",
        patterns: &["when.*enters the battlefield", "when.*enters,"],
        type_lines: &["Creature"],
        min_count: 6,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "removal suite",
        patterns: &["destroy target", "exile target"],
        min_count: 4,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "card advantage",
        patterns: &["draw a card", "draw cards"],
        min_count: 3,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "efficient threats",
        type_lines: &["Creature"],
        min_count: 12,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "planeswalkers",
        type_lines: &["Planeswalker"],
        min_count: 2,
        weight: 0.1,
        ..BASE
    },
];

static COMBO_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "tutors",
        patterns: &["search your library for"],
        min_count: 3,
        weight: 0.3,
        ..BASE
    },
    ArchetypeSignal {
        name: "infinite mana",
        patterns: &["untap.*land", "add.*mana.*for each"],
        min_count: 2,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "card selection",
        patterns: &["scry", "surveil", "look at the top"],
        min_count: 4,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "protection",
        patterns: &["hexproof", "can't be countered"],
        min_count: 2,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "recursion",
        patterns: &["return.*from.*graveyard", "cast.*from.*graveyard"],
        min_count: 3,
        weight: 0.2,
        ..BASE
    },
];

static TEMPO_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "cheap threats",
        type_lines: &["Creature"],
        max_cmc: 2.0,
        min_count: 8,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "counterspells",
        patterns: &["counter target"],
        min_count: 4,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "bounce",
        patterns: &[
            "return.*to.*owner's hand",
            "return target.*to its owner's hand",
        ],
        min_count: 3,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "flash",
        keywords: &["flash"],
        min_count: 4,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "card draw",
        patterns: &["draw a card"],
        min_count: 3,
        weight: 0.1,
        ..BASE
    },
    ArchetypeSignal {
        name: "low curve",
        max_cmc: 2.8,
        weight: 0.1,
        ..BASE
    },
];

static RAMP_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "mana dorks",
        patterns: &["add.*mana", "add {g}", "add one mana"],
        type_lines: &["Creature"],
        min_count: 4,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "land search",
        patterns: &[
            "search your library for.*land",
            "search your library for a basic land",
        ],
        min_count: 3,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "big finishers",
        type_lines: &["Creature"],
        min_count: 4,
        weight: 0.2,
        rule: SignalRule::BigFinishers,
        ..BASE
    },
    ArchetypeSignal {
        name: "treasure tokens",
        patterns: &["create a treasure", "treasure token"],
        min_count: 3,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "high top end",
        min_cmc: 3.5,
        weight: 0.2,
        ..BASE
    },
];

static TRIBAL_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "lords",
        patterns: &["other.*you control get +", "creatures you control have"],
        min_count: 2,
        weight: 0.3,
        ..BASE
    },
    ArchetypeSignal {
        name: "tribal synergy",
        patterns: &["for each.*you control", "whenever.*you control"],
        min_count: 3,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "creature focus",
        type_lines: &["Creature"],
        min_count: 20,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "type matters",
        patterns: &["other.*creatures you control"],
        min_count: 2,
        weight: 0.2,
        ..BASE
    },
];

static TOKENS_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "token makers",
        patterns: &["create a.*token", "create.*tokens"],
        min_count: 8,
        weight: 0.3,
        ..BASE
    },
    ArchetypeSignal {
        name: "anthems",
        patterns: &[
            "creatures you control get +",
            "other creatures you control get +",
        ],
        min_count: 3,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "token payoffs",
        patterns: &[
            "for each creature you control",
            "equal to the number of creatures",
        ],
        min_count: 2,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "go wide",
        patterns: &["whenever.*creature.*enters", "whenever a token"],
        min_count: 3,
        weight: 0.15,
        ..BASE
    },
    ArchetypeSignal {
        name: "sacrifice",
        patterns: &["sacrifice a creature", "sacrifice a token"],
        min_count: 2,
        weight: 0.1,
        ..BASE
    },
];

static ARTIFACTS_SIGNALS: &[ArchetypeSignal] = &[
    ArchetypeSignal {
        name: "artifact producers",
        patterns: &[
            "create.*artifact token",
            "create a treasure",
            "create a clue",
            "create a food",
        ],
        min_count: 5,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "artifact payoffs",
        patterns: &["whenever an artifact", "for each artifact"],
        min_count: 3,
        weight: 0.25,
        ..BASE
    },
    ArchetypeSignal {
        name: "artifact creatures",
        type_lines: &["Artifact Creature"],
        min_count: 6,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "artifact synergy",
        patterns: &["artifact you control", "artifacts you control"],
        min_count: 3,
        weight: 0.2,
        ..BASE
    },
    ArchetypeSignal {
        name: "affinity",
        keywords: &["affinity"],
        min_count: 2,
        weight: 0.1,
        ..BASE
    },
];

pub fn archetype_description(name: &str) -> &'static str {
    name.parse::<Archetype>()
        .map(|a| a.description())
        .unwrap_or("Unknown archetype")
}

pub fn is_aggro_archetype(archetype: Archetype) -> bool {
    matches!(archetype, Archetype::Aggro | Archetype::Tempo)
}

pub fn is_control_archetype(archetype: Archetype) -> bool {
    archetype == Archetype::Control
}
