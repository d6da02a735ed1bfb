use anyhow::Result;

use crate::builder::complete::CompleteDeckResponse;
use crate::builder::iterative::IterativeResponse;
use crate::builder::CardWithOwnership;
use crate::recommend::CardRecommendation;

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn recommendations_to_csv(recommendations: &[CardRecommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "card_id",
        "name",
        "cmc",
        "score",
        "source",
        "confidence",
        "reasoning",
    ])?;
    for rec in recommendations {
        writer.write_record([
            rec.card.id.to_string(),
            rec.card.name.clone(),
            rec.card.cmc_slot().to_string(),
            format!("{:.4}", rec.score),
            rec.source.to_string(),
            format!("{:.2}", rec.confidence),
            rec.reasoning.clone(),
        ])?;
    }
    finish(writer)
}

/// Seed-builder suggestions with ownership columns.
pub fn owned_cards_to_csv(cards: &[CardWithOwnership]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "card_id",
        "name",
        "cmc",
        "rarity",
        "score",
        "owned",
        "needed",
    ])?;
    for card in cards {
        writer.write_record([
            card.card_id.to_string(),
            card.name.clone(),
            card.cmc.to_string(),
            card.rarity.clone(),
            format!("{:.4}", card.score),
            card.owned_count.to_string(),
            card.needed_count.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn next_cards_to_csv(response: &IterativeResponse) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "card_id",
        "name",
        "recommended_copies",
        "score",
        "color_fit",
        "curve_fit",
        "synergy",
        "quality",
    ])?;
    for suggestion in &response.suggestions {
        let b = &suggestion.score_breakdown;
        writer.write_record([
            suggestion.card.card_id.to_string(),
            suggestion.card.name.clone(),
            suggestion.recommended_copies.to_string(),
            format!("{:.4}", suggestion.card.score),
            format!("{:.4}", b.color_fit),
            format!("{:.4}", b.curve_fit),
            format!("{:.4}", b.synergy),
            format!("{:.4}", b.quality),
        ])?;
    }
    finish(writer)
}

/// One row per deck entry, spells first, then lands.
pub fn complete_deck_to_csv(response: &CompleteDeckResponse) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["quantity", "card_id", "name", "kind", "owned", "needed"])?;
    for spell in &response.spells {
        writer.write_record([
            spell.quantity.to_string(),
            spell.card.card_id.to_string(),
            spell.card.name.clone(),
            "spell".to_string(),
            spell.card.owned_count.to_string(),
            spell.card.needed_count.to_string(),
        ])?;
    }
    for land in &response.lands {
        writer.write_record([
            land.quantity.to_string(),
            land.card_id.to_string(),
            land.name.clone(),
            if land.is_basic { "basic" } else { "land" }.to_string(),
            String::new(),
            String::new(),
        ])?;
    }
    finish(writer)
}
