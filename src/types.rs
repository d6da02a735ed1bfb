use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ontology::typeline::contains_type;

pub type CardId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::White => "W",
            Self::Blue => "U",
            Self::Black => "B",
            Self::Red => "R",
            Self::Green => "G",
        }
    }

    /// Mana symbol as it appears in a mana cost string, e.g. `{G}`.
    pub fn pip(&self) -> &'static str {
        match self {
            Self::White => "{W}",
            Self::Blue => "{U}",
            Self::Black => "{B}",
            Self::Red => "{R}",
            Self::Green => "{G}",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Blue => "Blue",
            Self::Black => "Black",
            Self::Red => "Red",
            Self::Green => "Green",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Error)]
#[error("unknown color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Self::White),
            "u" | "blue" => Ok(Self::Blue),
            "b" | "black" => Ok(Self::Black),
            "r" | "red" => Ok(Self::Red),
            "g" | "green" => Ok(Self::Green),
            _ => Err(ColorParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Unknown,
}

impl Rarity {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Mythic => "mythic",
            Self::Unknown => "unknown",
        }
    }

    /// Quality used when no external rating exists for a card.
    pub fn fallback_quality(&self) -> f64 {
        match self {
            Self::Mythic => 0.85,
            Self::Rare => 0.75,
            Self::Uncommon => 0.60,
            Self::Common | Self::Unknown => 0.50,
        }
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

impl From<&str> for Rarity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "common" => Self::Common,
            "uncommon" => Self::Uncommon,
            "rare" => Self::Rare,
            "mythic" | "mythic rare" => Self::Mythic,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub type_line: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub set_code: String,
}

impl Card {
    pub fn new(id: CardId, name: &str, type_line: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_line: type_line.to_string(),
            mana_cost: None,
            cmc: 0.0,
            colors: Vec::new(),
            rarity: String::new(),
            oracle_text: None,
            image_uri: None,
            set_code: String::new(),
        }
    }

    pub fn with_cmc(mut self, cmc: f64) -> Self {
        self.cmc = cmc;
        self
    }

    pub fn with_colors(mut self, colors: &[Color]) -> Self {
        let mut unique = Vec::with_capacity(colors.len());
        for color in colors {
            if !unique.contains(color) {
                unique.push(*color);
            }
        }
        self.colors = unique;
        self
    }

    pub fn with_mana_cost(mut self, mana_cost: &str) -> Self {
        self.mana_cost = Some(mana_cost.to_string());
        self
    }

    pub fn with_oracle_text(mut self, text: &str) -> Self {
        self.oracle_text = Some(text.to_string());
        self
    }

    pub fn with_rarity(mut self, rarity: &str) -> Self {
        self.rarity = rarity.to_string();
        self
    }

    pub fn with_set(mut self, set_code: &str) -> Self {
        self.set_code = set_code.to_string();
        self
    }

    pub fn rarity_kind(&self) -> Rarity {
        Rarity::from(self.rarity.as_str())
    }

    /// Lowercased rules text, empty when the card has none.
    pub fn oracle_lower(&self) -> String {
        self.oracle_text
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    pub fn has_oracle_text(&self) -> bool {
        self.oracle_text
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// Integer mana value used for curve slots (truncates fractional costs).
    pub fn cmc_slot(&self) -> u32 {
        if self.cmc.is_finite() && self.cmc > 0.0 {
            self.cmc as u32
        } else {
            0
        }
    }

    pub fn is_land(&self) -> bool {
        contains_type(&self.type_line, "Land")
    }

    pub fn is_creature(&self) -> bool {
        contains_type(&self.type_line, "Creature")
    }

    pub fn is_colorless(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn shares_color_with(&self, colors: &[Color]) -> bool {
        self.colors.iter().any(|c| colors.contains(c))
    }

    /// Number of `{X}` pips of the given color in the mana cost.
    pub fn pip_count(&self, color: Color) -> usize {
        self.mana_cost
            .as_deref()
            .map(|cost| cost.matches(color.pip()).count())
            .unwrap_or(0)
    }
}

/// External win-rate style metrics for a card in a given set and format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CardRating {
    /// Games-in-hand win rate, 0.0-1.0.
    #[serde(default)]
    pub gihwr: f64,
    /// Opening-hand win rate, 0.0-1.0.
    #[serde(default)]
    pub ohwr: f64,
    /// Average taken at (pick position).
    #[serde(default)]
    pub ata: f64,
    /// Average last seen at.
    #[serde(default)]
    pub alsa: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    #[default]
    Main,
    Sideboard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckCard {
    pub card_id: CardId,
    pub quantity: u32,
    #[serde(default)]
    pub board: Board,
}

impl DeckCard {
    pub fn main(card_id: CardId, quantity: u32) -> Self {
        Self {
            card_id,
            quantity,
            board: Board::Main,
        }
    }
}

/// Per-factor breakdown of a recommendation score. Every field is in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreFactors {
    pub color_fit: f64,
    pub mana_curve: f64,
    pub synergy: f64,
    pub quality: f64,
    pub playable: f64,
}

impl ScoreFactors {
    pub fn values(&self) -> [f64; 5] {
        [
            self.color_fit,
            self.mana_curve,
            self.quality,
            self.synergy,
            self.playable,
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub color_fit: f64,
    pub curve_fit: f64,
    pub synergy: f64,
    pub quality: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynergyKind {
    Keyword,
    Tribal,
    Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyDetail {
    #[serde(rename = "type")]
    pub kind: SynergyKind,
    pub name: String,
    pub description: String,
}

/// A card with its overall score and the reasoning behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCard {
    pub card: Card,
    pub score: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synergy_details: Vec<SynergyDetail>,
}

impl ScoredCard {
    pub fn new(card: Card, score: f64, reasoning: String) -> Self {
        Self {
            card,
            score,
            reasoning,
            breakdown: None,
            synergy_details: Vec::new(),
        }
    }

    pub fn with_breakdown(mut self, breakdown: ScoreBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    pub fn with_synergy_details(mut self, details: Vec<SynergyDetail>) -> Self {
        self.synergy_details = details;
        self
    }
}

/// A basic land allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestedLand {
    pub card_id: CardId,
    pub name: String,
    pub quantity: u32,
    pub color: Color,
}

pub struct BasicLand {
    pub card_id: CardId,
    pub name: &'static str,
}

pub fn basic_land(color: Color) -> BasicLand {
    match color {
        Color::White => BasicLand {
            card_id: 81716,
            name: "Plains",
        },
        Color::Blue => BasicLand {
            card_id: 81717,
            name: "Island",
        },
        Color::Black => BasicLand {
            card_id: 81718,
            name: "Swamp",
        },
        Color::Red => BasicLand {
            card_id: 81719,
            name: "Mountain",
        },
        Color::Green => BasicLand {
            card_id: 81720,
            name: "Forest",
        },
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use crate::types::{Card, Color, Rarity};

    #[test]
    fn parses_card_from_catalog_shape() {
        let card: Card = serde_json::from_value(json!({
            "id": 90001,
            "name": "Llanowar Elves",
            "type_line": "Creature — Elf Druid",
            "mana_cost": "{G}",
            "cmc": 1.0,
            "colors": ["G"],
            "rarity": "common",
            "oracle_text": "{T}: Add {G}."
        }))
        .expect("failed to parse card");
        assert!(card.is_creature());
        assert!(!card.is_land());
        assert_eq!(card.colors, vec![Color::Green]);
        assert_eq!(card.pip_count(Color::Green), 1);
        assert_eq!(card.rarity_kind(), Rarity::Common);
    }

    #[test]
    fn colors_parse_from_symbols_and_names() {
        assert_eq!(Color::from_str("u").expect("blue"), Color::Blue);
        assert_eq!(Color::from_str("Black").expect("black"), Color::Black);
        assert!(Color::from_str("purple").is_err());
    }

    #[test]
    fn with_colors_deduplicates() {
        let card = Card::new(1, "Test", "Instant").with_colors(&[Color::Red, Color::Red]);
        assert_eq!(card.colors.len(), 1);
    }

    #[test]
    fn cmc_slot_truncates() {
        let card = Card::new(1, "Test", "Sorcery").with_cmc(3.5);
        assert_eq!(card.cmc_slot(), 3);
        assert_eq!(Card::new(2, "Land", "Basic Land — Forest").cmc_slot(), 0);
    }
}
