use thiserror::Error;

use crate::types::CardId;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("{0} is not initialized")]
    MissingCollaborator(&'static str),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("card not found: {0}")]
    CardNotFound(CardId),
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),
    #[error("{0}")]
    NoViableDeck(String),
    #[error("lookup failed: {0}")]
    Lookup(#[from] anyhow::Error),
}

pub type DeckResult<T> = Result<T, DeckError>;
