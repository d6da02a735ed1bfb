//! Multi-card synergy packages: named strategies made of roles that
//! different cards fill (e.g. token maker + sacrifice outlet + death payoff).

pub mod detect;

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PackageRole {
    pub name: &'static str,
    pub display_name: &'static str,
    pub patterns: &'static [&'static str],
    pub type_lines: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SynergyPackage {
    pub name: &'static str,
    pub description: &'static str,
    pub roles: &'static [PackageRole],
    /// Distinct filled roles needed for the package to be active.
    pub min_roles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageAnalysis {
    pub package: &'static SynergyPackage,
    pub filled_roles: BTreeMap<&'static str, usize>,
    pub missing_roles: Vec<&'static str>,
    pub completeness: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRoleMatch {
    pub package_name: &'static str,
    pub role_name: &'static str,
    pub role_display: &'static str,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageBonus {
    pub bonus: f64,
    pub reasons: Vec<String>,
}

const fn role(
    name: &'static str,
    display_name: &'static str,
    patterns: &'static [&'static str],
    required: bool,
) -> PackageRole {
    PackageRole {
        name,
        display_name,
        patterns,
        type_lines: &[],
        keywords: &[],
        required,
    }
}

pub static SYNERGY_PACKAGES: &[SynergyPackage] = &[
    SynergyPackage {
        name: "Aristocrats",
        description: "Sacrifice creatures for value with death triggers",
        min_roles: 2,
        roles: &[
            role(
                "token_generator",
                "Token Generator",
                &["create a.*token", "create.*creature token", "creates a.*token"],
                true,
            ),
            role(
                "sac_outlet",
                "Sacrifice Outlet",
                &[
                    "sacrifice a creature:",
                    "sacrifice another creature:",
                    "sacrifice a creature,",
                ],
                true,
            ),
            role(
                "death_payoff",
                "Death Payoff",
                &[
                    "whenever.*creature.*dies",
                    "whenever another creature you control dies",
                    "whenever a creature you control dies",
                ],
                true,
            ),
        ],
    },
    SynergyPackage {
        name: "Spellslinger",
        description: "Cast many spells to trigger prowess and spell payoffs",
        min_roles: 2,
        roles: &[
            role(
                "prowess_creature",
                "Prowess Creature",
                &["prowess", "whenever you cast a noncreature spell", "magecraft"],
                true,
            ),
            PackageRole {
                name: "cheap_spell",
                display_name: "Cheap Spell",
                patterns: &[],
                type_lines: &["Instant", "Sorcery"],
                keywords: &[],
                required: true,
            },
            role(
                "spell_payoff",
                "Spell Payoff",
                &[
                    "whenever you cast an instant or sorcery",
                    "instant or sorcery.*from your graveyard",
                ],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Blink",
        description: "Exile and return creatures to reuse ETB effects",
        min_roles: 2,
        roles: &[
            role(
                "etb_creature",
                "ETB Creature",
                &["when.*enters the battlefield", "when.*enters,"],
                true,
            ),
            role(
                "blink_enabler",
                "Blink Enabler",
                &[
                    "exile.*then return",
                    "exile target creature you control.*return",
                    "flicker",
                ],
                true,
            ),
            role(
                "blink_payoff",
                "Blink Payoff",
                &[
                    "whenever.*enters the battlefield under your control",
                    "whenever another creature enters",
                ],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Reanimator",
        description: "Put creatures in graveyard and bring them back",
        min_roles: 2,
        roles: &[
            role(
                "discard_enabler",
                "Discard Enabler",
                &[
                    "discard a card",
                    "discard.*cards",
                    "mill",
                    "put.*into your graveyard",
                ],
                true,
            ),
            role(
                "reanimation",
                "Reanimation Spell",
                &[
                    "return.*creature.*from.*graveyard to the battlefield",
                    "put.*creature.*from.*graveyard onto the battlefield",
                ],
                true,
            ),
            // Matched by mana value and type, see `matches_role`.
            role("big_target", "Reanimation Target", &[], false),
        ],
    },
    SynergyPackage {
        name: "Tokens",
        description: "Create many tokens and buff them with anthems",
        min_roles: 2,
        roles: &[
            role(
                "token_maker",
                "Token Maker",
                &["create a.*token", "create.*tokens", "create two", "create three"],
                true,
            ),
            role(
                "anthem",
                "Anthem Effect",
                &[
                    "creatures you control get +",
                    "other creatures you control get +",
                    "creatures you control have",
                ],
                true,
            ),
            role(
                "token_payoff",
                "Token Payoff",
                &[
                    "for each creature you control",
                    "equal to the number of creatures",
                ],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Counters",
        description: "Accumulate +1/+1 counters and proliferate",
        min_roles: 2,
        roles: &[
            role(
                "counter_source",
                "Counter Source",
                &[
                    "put a +1/+1 counter",
                    "put.*+1/+1 counters",
                    "enters.*with.*+1/+1 counter",
                ],
                true,
            ),
            role(
                "counter_synergy",
                "Counter Synergy",
                &[
                    "whenever.*+1/+1 counter",
                    "for each +1/+1 counter",
                    "proliferate",
                    "double the number of +1/+1 counters",
                ],
                true,
            ),
            role(
                "counter_payoff",
                "Counter Payoff",
                &["with.*or more +1/+1 counters", "has a +1/+1 counter"],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Lifegain",
        description: "Gain life and trigger lifegain payoffs",
        min_roles: 2,
        roles: &[
            PackageRole {
                name: "lifegain_source",
                display_name: "Lifegain Source",
                patterns: &["gain.*life", "lifelink"],
                type_lines: &[],
                keywords: &["lifelink"],
                required: true,
            },
            role(
                "lifegain_payoff",
                "Lifegain Payoff",
                &["whenever you gain life", "whenever.*gains life"],
                true,
            ),
            role(
                "lifegain_finisher",
                "Lifegain Finisher",
                &["equal to your life total", "life total becomes"],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Graveyard",
        description: "Fill graveyard and use it as a resource",
        min_roles: 2,
        roles: &[
            role(
                "self_mill",
                "Self Mill",
                &["mill", "put.*from.*library into.*graveyard", "surveil"],
                true,
            ),
            role(
                "graveyard_payoff",
                "Graveyard Payoff",
                &[
                    "for each card in your graveyard",
                    "in your graveyard",
                    "from your graveyard",
                    "escape",
                    "flashback",
                    "disturb",
                ],
                true,
            ),
            role(
                "recursion",
                "Recursion",
                &["return.*from your graveyard", "cast.*from your graveyard"],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Artifacts",
        description: "Artifacts matter synergies",
        min_roles: 2,
        roles: &[
            role(
                "artifact_producer",
                "Artifact Producer",
                &[
                    "create.*artifact token",
                    "create a treasure",
                    "create a clue",
                    "create a food",
                    "create a blood",
                ],
                true,
            ),
            role(
                "artifact_payoff",
                "Artifact Payoff",
                &[
                    "whenever an artifact enters",
                    "for each artifact you control",
                    "artifact you control",
                ],
                true,
            ),
            role(
                "artifact_sacrifice",
                "Artifact Sacrifice",
                &[
                    "sacrifice an artifact",
                    "sacrifice a treasure",
                    "sacrifice a food",
                ],
                false,
            ),
        ],
    },
    SynergyPackage {
        name: "Energy",
        description: "Generate and spend energy counters",
        min_roles: 2,
        roles: &[
            role(
                "energy_producer",
                "Energy Producer",
                &["you get {e}", "energy counter"],
                true,
            ),
            role(
                "energy_spender",
                "Energy Spender",
                &["pay {e}", "spend.*energy"],
                true,
            ),
        ],
    },
];

pub fn synergy_packages() -> &'static [SynergyPackage] {
    SYNERGY_PACKAGES
}

pub fn package_by_name(name: &str) -> Option<&'static SynergyPackage> {
    SYNERGY_PACKAGES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}
