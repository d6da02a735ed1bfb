use tracing::debug;

use crate::sources::RatingsLookup;
use crate::types::{Card, CardRating};

const RATING_WEIGHT: f64 = 0.70;
const EXPERT_WEIGHT: f64 = 0.30;

/// Win rate band: 45% maps to 0.0, 65% and above to 1.0.
pub fn win_rate_band(win_rate: f64) -> f64 {
    ((win_rate - 0.45) / 0.20).clamp(0.0, 1.0)
}

/// Pick position band: first pick maps to 1.0, fourteenth to 0.0.
pub fn pick_position_band(position: f64) -> f64 {
    (1.0 - (position - 1.0) / 13.0).clamp(0.0, 1.0)
}

pub fn rating_score(rating: &CardRating) -> f64 {
    win_rate_band(rating.gihwr) * 0.50
        + win_rate_band(rating.ohwr) * 0.30
        + pick_position_band(rating.ata) * 0.10
        + pick_position_band(rating.alsa) * 0.10
}

/// Combines whichever quality signals exist, falling back to rarity.
pub fn blend_quality(rating: Option<f64>, expert: Option<f64>, card: &Card) -> f64 {
    match (rating, expert) {
        (Some(rating), Some(expert)) => rating * RATING_WEIGHT + expert * EXPERT_WEIGHT,
        (Some(rating), None) => rating,
        (None, Some(expert)) => expert,
        (None, None) => card.rarity_kind().fallback_quality(),
    }
}

/// Full rating-based score, blended with an expert score when one exists.
pub async fn lookup_quality(
    ratings: Option<&dyn RatingsLookup>,
    card: &Card,
    set_code: &str,
    format: &str,
) -> f64 {
    let Some(ratings) = ratings else {
        return card.rarity_kind().fallback_quality();
    };

    let mut rated = None;
    if !set_code.is_empty() && !format.is_empty() {
        match ratings.card_rating(set_code, format, card.id).await {
            Ok(Some(rating)) => rated = Some(rating_score(&rating)),
            Ok(None) => {}
            Err(err) => debug!(card_id = card.id, error = %err, "rating lookup failed"),
        }
    }

    let expert = match ratings.expert_score(card.id).await {
        Ok(score) => score.map(|s| s.clamp(0.0, 1.0)),
        Err(err) => {
            debug!(card_id = card.id, error = %err, "expert score lookup failed");
            None
        }
    };

    blend_quality(rated, expert, card)
}

/// Games-in-hand band only, as the deck constructors use it.
pub async fn lookup_gih_quality(
    ratings: Option<&dyn RatingsLookup>,
    card: &Card,
    set_code: &str,
    format: &str,
) -> f64 {
    let fallback = card.rarity_kind().fallback_quality();
    let Some(ratings) = ratings else {
        return fallback;
    };
    if set_code.is_empty() || format.is_empty() {
        return fallback;
    }
    match ratings.card_rating(set_code, format, card.id).await {
        Ok(Some(rating)) => win_rate_band(rating.gihwr),
        Ok(None) => fallback,
        Err(err) => {
            debug!(card_id = card.id, error = %err, "rating lookup failed");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scoring::quality::{blend_quality, lookup_gih_quality, lookup_quality, rating_score};
    use crate::sources::memory::InMemoryCatalog;
    use crate::sources::RatingsLookup;
    use crate::types::{Card, CardRating};

    fn rare() -> Card {
        Card::new(7, "Sheoldred", "Legendary Creature — Phyrexian Praetor").with_rarity("Rare")
    }

    #[test]
    fn rating_score_weights_bands() {
        let rating = CardRating {
            gihwr: 0.65,
            ohwr: 0.55,
            ata: 1.0,
            alsa: 14.0,
        };
        let expected = 1.0 * 0.5 + 0.5 * 0.3 + 1.0 * 0.1 + 0.0 * 0.1;
        assert!((rating_score(&rating) - expected).abs() < 1e-9);
        assert!((rating_score(&CardRating::default()) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn blend_prefers_ratings_then_expert_then_rarity() {
        let card = rare();
        assert!((blend_quality(Some(0.8), Some(0.5), &card) - 0.71).abs() < 1e-9);
        assert!((blend_quality(Some(0.8), None, &card) - 0.8).abs() < 1e-9);
        assert!((blend_quality(None, Some(0.4), &card) - 0.4).abs() < 1e-9);
        assert!((blend_quality(None, None, &card) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn lookups_fall_back_without_ratings() {
        let card = rare();
        let catalog = InMemoryCatalog::new()
            .with_rating(
                "ONE",
                "PremierDraft",
                7,
                CardRating {
                    gihwr: 0.61,
                    ohwr: 0.45,
                    ata: 14.0,
                    alsa: 14.0,
                },
            )
            .with_expert_score(7, 1.0);
        let ratings: &dyn RatingsLookup = &catalog;
        tokio_test::block_on(async {
            assert!((lookup_quality(None, &card, "ONE", "PremierDraft").await - 0.75).abs() < 1e-9);

            let blended = lookup_quality(Some(ratings), &card, "ONE", "PremierDraft").await;
            let expected = 0.8 * 0.5 * 0.7 + 1.0 * 0.3;
            assert!((blended - expected).abs() < 1e-9);

            // No set code: only the expert score applies.
            assert!((lookup_quality(Some(ratings), &card, "", "").await - 1.0).abs() < 1e-9);

            assert!((lookup_gih_quality(Some(ratings), &card, "ONE", "PremierDraft").await - 0.8).abs() < 1e-9);
            assert!((lookup_gih_quality(Some(ratings), &card, "ONE", "QuickDraft").await - 0.75).abs() < 1e-9);
        });
    }
}
