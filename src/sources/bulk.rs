use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::sources::CardLookup;
use crate::types::{Card, CardId};

/// Looks up every id concurrently, one task per id.
///
/// Missing cards and failed lookups are dropped. The returned cards follow
/// the order of `ids`.
pub async fn fetch_cards(lookup: Arc<dyn CardLookup>, ids: &[CardId]) -> Vec<Card> {
    let mut tasks = JoinSet::new();
    for (index, id) in ids.iter().copied().enumerate() {
        let lookup = Arc::clone(&lookup);
        tasks.spawn(async move { (index, id, lookup.get_card(id).await) });
    }

    let mut fetched: Vec<(usize, Card)> = Vec::with_capacity(ids.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(Some(card)))) => fetched.push((index, card)),
            Ok((_, id, Ok(None))) => debug!(card_id = id, "card not found"),
            Ok((_, id, Err(err))) => debug!(card_id = id, error = %err, "card lookup failed"),
            Err(err) => warn!(error = %err, "card lookup task aborted"),
        }
    }

    fetched.sort_by_key(|(index, _)| *index);
    fetched.into_iter().map(|(_, card)| card).collect()
}

pub async fn fetch_card_map(lookup: Arc<dyn CardLookup>, ids: &[CardId]) -> HashMap<CardId, Card> {
    fetch_cards(lookup, ids)
        .await
        .into_iter()
        .map(|card| (card.id, card))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use crate::sources::bulk::{fetch_card_map, fetch_cards};
    use crate::sources::CardLookup;
    use crate::types::{Card, CardId};

    struct FlakyLookup;

    #[async_trait]
    impl CardLookup for FlakyLookup {
        async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
            match id {
                13 => Err(anyhow!("upstream timeout")),
                404 => Ok(None),
                _ => {
                    // Later ids finish first.
                    tokio::time::sleep(std::time::Duration::from_millis((50 - id as u64 % 50) / 5))
                        .await;
                    Ok(Some(Card::new(id, &format!("Card {id}"), "Creature — Bear")))
                }
            }
        }
    }

    #[tokio::test]
    async fn drops_failures_and_keeps_input_order() {
        let lookup: Arc<dyn CardLookup> = Arc::new(FlakyLookup);
        let cards = fetch_cards(lookup, &[1, 13, 2, 404, 30, 3]).await;
        let ids: Vec<CardId> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 30, 3]);
    }

    #[tokio::test]
    async fn empty_input_fetches_nothing() {
        let lookup: Arc<dyn CardLookup> = Arc::new(FlakyLookup);
        assert!(fetch_cards(lookup.clone(), &[]).await.is_empty());
        assert!(fetch_card_map(lookup, &[13]).await.is_empty());
    }
}
