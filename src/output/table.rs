use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::archetype::classifier::ArchetypeScore;
use crate::archetype::report::ClassificationReport;
use crate::builder::complete::CompleteDeckResponse;
use crate::builder::iterative::IterativeResponse;
use crate::builder::seed::SeedResponse;
use crate::constructor::{SuggestDecksResponse, SuggestedDeck, Viability};
use crate::packages::PackageAnalysis;
use crate::recommend::CardRecommendation;
use crate::types::SuggestedLand;

fn styled_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn color_symbols(colors: &[crate::types::Color]) -> String {
    if colors.is_empty() {
        return "C".to_string();
    }
    colors.iter().map(|c| c.symbol()).collect()
}

fn score_cell(score: f64) -> Cell {
    let cell = Cell::new(format!("{score:.3}"));
    if score >= 0.7 {
        cell.fg(Color::Green)
    } else if score >= 0.5 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn lands_line(lands: &[SuggestedLand]) -> String {
    lands
        .iter()
        .filter(|land| land.quantity > 0)
        .map(|land| format!("{} {}", land.quantity, land.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_recommendations_table(recommendations: &[CardRecommendation]) -> String {
    let mut table = styled_table(vec![
        "Rank",
        "Card",
        "Type",
        "CMC",
        "Score",
        "Source",
        "Confidence",
        "Reasoning",
    ]);
    for (i, rec) in recommendations.iter().enumerate() {
        table.add_row(Row::from(vec![
            Cell::new(i + 1),
            Cell::new(&rec.card.name),
            Cell::new(&rec.card.type_line),
            Cell::new(rec.card.cmc_slot()),
            score_cell(rec.score),
            Cell::new(rec.source.to_string()),
            Cell::new(format!("{:.0}%", rec.confidence * 100.0)),
            Cell::new(&rec.reasoning),
        ]));
    }
    table.to_string()
}

pub fn render_deck_suggestions_table(response: &SuggestDecksResponse) -> String {
    if let Some(error) = &response.error {
        return format!("No deck suggestions: {error}");
    }
    let mut table = styled_table(vec![
        "Colors", "Score", "Viability", "Creatures", "Spells", "Avg CMC", "Top Cards",
    ]);
    for deck in &response.suggestions {
        let viability = Cell::new(deck.viability.to_string());
        let viability = match deck.viability {
            Viability::Strong => viability.fg(Color::Green),
            Viability::Viable => viability.fg(Color::Yellow),
            Viability::Weak => viability.fg(Color::Red),
        };
        table.add_row(Row::from(vec![
            Cell::new(deck.color_combo.name),
            score_cell(deck.score),
            viability,
            Cell::new(deck.analysis.creature_count),
            Cell::new(deck.analysis.spell_count),
            Cell::new(format!("{:.2}", deck.analysis.average_cmc)),
            Cell::new(deck.analysis.top_cards.join(", ")),
        ]));
    }
    format!(
        "{table}\n{} of {} color combinations viable",
        response.viable_combos, response.total_combos
    )
}

pub fn render_suggested_deck_table(deck: &SuggestedDeck) -> String {
    let mut table = styled_table(vec!["Card", "Type", "CMC", "Colors", "Score"]);
    for spell in &deck.spells {
        table.add_row(Row::from(vec![
            Cell::new(&spell.name),
            Cell::new(&spell.type_line),
            Cell::new(spell.cmc),
            Cell::new(color_symbols(&spell.colors)),
            score_cell(spell.score),
        ]));
    }
    format!(
        "{} ({}, score {:.3})\n{table}\nLands: {}\nTotal cards: {}",
        deck.color_combo.name,
        deck.viability,
        deck.score,
        lands_line(&deck.lands),
        deck.total_cards
    )
}

pub fn render_seed_table(response: &SeedResponse) -> String {
    let mut table = styled_table(vec![
        "Card", "CMC", "Colors", "Rarity", "Score", "Owned", "Need", "Reasoning",
    ]);
    for card in &response.suggestions {
        table.add_row(Row::from(vec![
            Cell::new(&card.name),
            Cell::new(card.cmc),
            Cell::new(color_symbols(&card.colors)),
            Cell::new(&card.rarity),
            score_cell(card.score),
            Cell::new(card.owned_count),
            Cell::new(card.needed_count),
            Cell::new(&card.reasoning),
        ]));
    }
    let analysis = &response.analysis;
    format!(
        "Building around {} [{}]\n{table}\nLands: {}\nKeywords: {}\nThemes: {}\nMissing: {} cards",
        response.seed_card.name,
        color_symbols(&analysis.color_identity),
        lands_line(&response.land_suggestions),
        analysis.keywords.join(", "),
        analysis.themes.join(", "),
        analysis.missing_count
    )
}

pub fn render_next_cards_table(response: &IterativeResponse) -> String {
    let mut table = styled_table(vec![
        "Card", "CMC", "Copies", "Score", "Color", "Curve", "Synergy", "Quality", "Owned",
    ]);
    for suggestion in &response.suggestions {
        let breakdown = &suggestion.score_breakdown;
        table.add_row(Row::from(vec![
            Cell::new(&suggestion.card.name),
            Cell::new(suggestion.card.cmc),
            Cell::new(suggestion.recommended_copies),
            score_cell(suggestion.card.score),
            Cell::new(format!("{:.2}", breakdown.color_fit)),
            Cell::new(format!("{:.2}", breakdown.curve_fit)),
            Cell::new(format!("{:.2}", breakdown.synergy)),
            Cell::new(format!("{:.2}", breakdown.quality)),
            Cell::new(suggestion.card.owned_count),
        ]));
    }
    let analysis = &response.deck_analysis;
    format!(
        "{table}\nDeck: {} cards [{}], {} slots remaining\nLands: {}",
        analysis.total_cards,
        color_symbols(&analysis.color_identity),
        response.slots_remaining,
        lands_line(&response.land_suggestions)
    )
}

pub fn render_complete_deck_table(response: &CompleteDeckResponse) -> String {
    let mut table = styled_table(vec!["Qty", "Card", "CMC", "Type", "Score", "Owned"]);
    for spell in &response.spells {
        table.add_row(Row::from(vec![
            Cell::new(spell.quantity),
            Cell::new(&spell.card.name),
            Cell::new(spell.card.cmc),
            Cell::new(&spell.card.type_line),
            score_cell(spell.card.score),
            Cell::new(spell.card.owned_count),
        ]));
    }
    for land in &response.lands {
        let name = if land.enters_tapped {
            format!("{} (tapped)", land.name)
        } else {
            land.name.clone()
        };
        table.add_row(Row::from(vec![
            Cell::new(land.quantity),
            Cell::new(name),
            Cell::new(0),
            Cell::new(if land.is_basic { "Basic Land" } else { "Land" }),
            Cell::new("-"),
            Cell::new("-"),
        ]));
    }

    let strategy = &response.strategy;
    let analysis = &response.analysis;
    format!(
        "{}\n{table}\nGame plan: {}\nKey cards: {}\nMulligan: {}\nStrengths: {}\nWeaknesses: {}\n\
         Cards: {} ({} spells, {} lands), avg CMC {:.2}, archetype match {:.0}%",
        strategy.summary,
        strategy.game_plan,
        strategy.key_cards.join(", "),
        strategy.mulligan,
        strategy.strengths.join("; "),
        strategy.weaknesses.join("; "),
        analysis.total_cards,
        analysis.spell_count,
        analysis.land_count,
        analysis.average_cmc,
        analysis.archetype_match * 100.0
    )
}

pub fn render_archetype_table(scores: &[ArchetypeScore]) -> String {
    let mut table = styled_table(vec!["Archetype", "Score", "Confidence", "Signals"]);
    for score in scores {
        table.add_row(Row::from(vec![
            Cell::new(score.archetype.to_string()),
            score_cell(score.score),
            Cell::new(format!("{:.0}%", score.confidence * 100.0)),
            Cell::new(score.signals.join(", ")),
        ]));
    }
    table.to_string()
}

/// Headline label plus the cards that point at it.
pub fn render_classification(report: &ClassificationReport) -> String {
    let mut out = format!(
        "{} [{}] ({:.0}% confidence, {} cards, avg CMC {:.2})",
        report.primary_archetype,
        color_symbols(&report.color_identity),
        report.confidence * 100.0,
        report.total_cards,
        report.breakdown.avg_cmc
    );
    if report.indicators.is_empty() {
        return out;
    }
    let mut table = styled_table(vec!["Indicator", "Reason", "Weight"]);
    for indicator in &report.indicators {
        table.add_row(Row::from(vec![
            Cell::new(&indicator.card_name),
            Cell::new(indicator.reason),
            Cell::new(format!("{:.1}", indicator.weight)),
        ]));
    }
    out.push('\n');
    out.push_str(&table.to_string());
    out
}

pub fn render_packages_table(analyses: &[PackageAnalysis]) -> String {
    let mut table = styled_table(vec!["Package", "Active", "Completeness", "Missing Roles"]);
    for analysis in analyses {
        let active = if analysis.is_active {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("NO")
        };
        table.add_row(Row::from(vec![
            Cell::new(analysis.package.name),
            active,
            Cell::new(format!("{:.0}%", analysis.completeness * 100.0)),
            Cell::new(analysis.missing_roles.join(", ")),
        ]));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use crate::archetype::report::classify_colors_and_style;
    use crate::constructor::SuggestDecksResponse;
    use crate::output::table::{
        color_symbols, render_classification, render_deck_suggestions_table,
    };
    use crate::types::{Card, Color};

    #[test]
    fn colorless_shows_c() {
        assert_eq!(color_symbols(&[]), "C");
        assert_eq!(color_symbols(&[Color::Red, Color::Green]), "RG");
    }

    #[test]
    fn failed_suggestion_reports_error() {
        let response = SuggestDecksResponse {
            error: Some("No cards in draft pool".to_string()),
            ..SuggestDecksResponse::default()
        };
        assert_eq!(
            render_deck_suggestions_table(&response),
            "No deck suggestions: No cards in draft pool"
        );
    }

    #[test]
    fn classification_headline() {
        let cards: Vec<Card> = (0..4)
            .map(|_| {
                Card::new(1, "Pyre Imp", "Creature — Imp")
                    .with_cmc(1.0)
                    .with_colors(&[Color::Red])
            })
            .collect();
        let report = classify_colors_and_style(&cards).expect("report");
        let rendered = render_classification(&report);
        assert_eq!(
            rendered,
            "Mono-Red Aggro [R] (65% confidence, 4 cards, avg CMC 1.00)"
        );
    }
}
