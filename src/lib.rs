//! Rule-based deck recommendation and synergy engine for trading card games.

pub mod analysis;
pub mod archetype;
pub mod builder;
pub mod config;
pub mod constructor;
pub mod error;
pub mod ontology;
pub mod output;
pub mod packages;
pub mod recommend;
pub mod scoring;
pub mod sources;
pub mod types;

pub use error::{DeckError, DeckResult};
