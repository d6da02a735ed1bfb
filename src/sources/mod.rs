//! Collaborator traits the engines pull card data through.

pub mod bulk;
pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{DeckError, DeckResult};
use crate::types::{Card, CardId, CardRating};

#[async_trait]
pub trait CardLookup: Send + Sync {
    /// `Ok(None)` when the card does not exist.
    async fn get_card(&self, id: CardId) -> Result<Option<Card>>;
}

#[async_trait]
pub trait RatingsLookup: Send + Sync {
    async fn card_rating(
        &self,
        set_code: &str,
        format: &str,
        id: CardId,
    ) -> Result<Option<CardRating>>;

    /// Expert limited score in [0, 1] from a secondary rating source.
    async fn expert_score(&self, _id: CardId) -> Result<Option<f64>> {
        Ok(None)
    }
}

#[async_trait]
pub trait CollectionLookup: Send + Sync {
    async fn collection_counts(&self) -> Result<HashMap<CardId, u32>>;
}

#[async_trait]
pub trait SetsLookup: Send + Sync {
    async fn standard_sets(&self) -> Result<Vec<String>>;
    async fn cards_by_set(&self, set_code: &str) -> Result<Vec<Card>>;
}

/// Handles to every collaborator an engine may use. Unset handles are
/// reported as configuration errors by the operations that need them.
#[derive(Clone, Default)]
pub struct CardSources {
    pub cards: Option<Arc<dyn CardLookup>>,
    /// Fast local lookup tried before `cards` for draft pools.
    pub local: Option<Arc<dyn CardLookup>>,
    pub ratings: Option<Arc<dyn RatingsLookup>>,
    pub collection: Option<Arc<dyn CollectionLookup>>,
    pub sets: Option<Arc<dyn SetsLookup>>,
}

impl CardSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every handle backed by the same catalog.
    pub fn from_catalog<C>(catalog: Arc<C>) -> Self
    where
        C: CardLookup + RatingsLookup + CollectionLookup + SetsLookup + 'static,
    {
        let cards: Arc<dyn CardLookup> = catalog.clone();
        let ratings: Arc<dyn RatingsLookup> = catalog.clone();
        let collection: Arc<dyn CollectionLookup> = catalog.clone();
        let sets: Arc<dyn SetsLookup> = catalog;
        Self {
            cards: Some(cards),
            local: None,
            ratings: Some(ratings),
            collection: Some(collection),
            sets: Some(sets),
        }
    }

    pub fn with_cards(mut self, cards: Arc<dyn CardLookup>) -> Self {
        self.cards = Some(cards);
        self
    }

    pub fn with_local(mut self, local: Arc<dyn CardLookup>) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_ratings(mut self, ratings: Arc<dyn RatingsLookup>) -> Self {
        self.ratings = Some(ratings);
        self
    }

    pub fn with_collection(mut self, collection: Arc<dyn CollectionLookup>) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn with_sets(mut self, sets: Arc<dyn SetsLookup>) -> Self {
        self.sets = Some(sets);
        self
    }

    pub fn require_cards(&self) -> DeckResult<&Arc<dyn CardLookup>> {
        self.cards
            .as_ref()
            .ok_or(DeckError::MissingCollaborator("card lookup"))
    }

    pub fn require_sets(&self) -> DeckResult<&Arc<dyn SetsLookup>> {
        self.sets
            .as_ref()
            .ok_or(DeckError::MissingCollaborator("standard sets lookup"))
    }

    /// Local lookup first, then the main card lookup. Failures count as missing.
    pub async fn find_card(&self, id: CardId) -> Option<Card> {
        for lookup in [self.local.as_ref(), self.cards.as_ref()].into_iter().flatten() {
            match lookup.get_card(id).await {
                Ok(Some(card)) => return Some(card),
                Ok(None) => {}
                Err(err) => debug!(card_id = id, error = %err, "card lookup failed"),
            }
        }
        None
    }

    /// Owned copies per card. A failing or missing collection reads as empty.
    pub async fn collection_or_empty(&self) -> HashMap<CardId, u32> {
        let Some(collection) = self.collection.as_ref() else {
            return HashMap::new();
        };
        match collection.collection_counts().await {
            Ok(counts) => counts,
            Err(err) => {
                warn!(error = %err, "collection lookup failed, continuing without ownership");
                HashMap::new()
            }
        }
    }
}
