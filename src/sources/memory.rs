use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sources::{CardLookup, CollectionLookup, RatingsLookup, SetsLookup};
use crate::types::{Card, CardId, CardRating};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEntry {
    pub set_code: String,
    pub format: String,
    pub card_id: CardId,
    #[serde(flatten)]
    pub rating: CardRating,
}

/// On-disk shape of a card catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
    #[serde(default)]
    pub expert_scores: HashMap<CardId, f64>,
    #[serde(default)]
    pub collection: HashMap<CardId, u32>,
    #[serde(default)]
    pub standard_sets: Vec<String>,
}

/// Serves every collaborator trait from data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
    ratings: HashMap<(String, String, CardId), CardRating>,
    expert_scores: HashMap<CardId, f64>,
    collection: HashMap<CardId, u32>,
    standard_sets: Vec<String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: CatalogDocument) -> Self {
        let mut catalog = Self::from_cards(document.cards);
        for entry in document.ratings {
            catalog = catalog.with_rating(&entry.set_code, &entry.format, entry.card_id, entry.rating);
        }
        catalog.expert_scores = document.expert_scores;
        catalog.collection = document.collection;
        catalog.standard_sets = document.standard_sets;
        catalog
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: CatalogDocument =
            serde_json::from_str(raw).context("invalid catalog JSON")?;
        Ok(Self::from_document(document))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading catalog: {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("failed loading catalog: {}", path.display()))
    }

    /// Later duplicates of an id replace earlier ones.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut catalog = Self::default();
        for card in cards {
            catalog.insert(card);
        }
        catalog
    }

    fn insert(&mut self, card: Card) {
        match self.index.get(&card.id) {
            Some(&slot) => self.cards[slot] = card,
            None => {
                self.index.insert(card.id, self.cards.len());
                self.cards.push(card);
            }
        }
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.insert(card);
        self
    }

    pub fn with_rating(mut self, set_code: &str, format: &str, id: CardId, rating: CardRating) -> Self {
        self.ratings
            .insert((set_code.to_string(), format.to_string(), id), rating);
        self
    }

    pub fn with_expert_score(mut self, id: CardId, score: f64) -> Self {
        self.expert_scores.insert(id, score);
        self
    }

    pub fn with_owned(mut self, id: CardId, count: u32) -> Self {
        self.collection.insert(id, count);
        self
    }

    pub fn with_standard_sets(mut self, sets: &[&str]) -> Self {
        self.standard_sets = sets.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.index.get(&id).map(|slot| &self.cards[*slot])
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn known_sets(&self) -> BTreeSet<&str> {
        self.cards
            .iter()
            .map(|card| card.set_code.as_str())
            .chain(self.standard_sets.iter().map(String::as_str))
            .collect()
    }
}

#[async_trait]
impl CardLookup for InMemoryCatalog {
    async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        Ok(self.card(id).cloned())
    }
}

#[async_trait]
impl RatingsLookup for InMemoryCatalog {
    async fn card_rating(
        &self,
        set_code: &str,
        format: &str,
        id: CardId,
    ) -> Result<Option<CardRating>> {
        Ok(self
            .ratings
            .get(&(set_code.to_string(), format.to_string(), id))
            .cloned())
    }

    async fn expert_score(&self, id: CardId) -> Result<Option<f64>> {
        Ok(self.expert_scores.get(&id).copied())
    }
}

#[async_trait]
impl CollectionLookup for InMemoryCatalog {
    async fn collection_counts(&self) -> Result<HashMap<CardId, u32>> {
        Ok(self.collection.clone())
    }
}

#[async_trait]
impl SetsLookup for InMemoryCatalog {
    async fn standard_sets(&self) -> Result<Vec<String>> {
        Ok(self.standard_sets.clone())
    }

    /// Unknown set codes are an error, like a missing table upstream.
    async fn cards_by_set(&self, set_code: &str) -> Result<Vec<Card>> {
        if !self.known_sets().contains(set_code) {
            return Err(anyhow!("unknown set: {set_code}"));
        }
        Ok(self
            .cards
            .iter()
            .filter(|card| card.set_code == set_code)
            .cloned()
            .collect())
    }
}
