use std::collections::BTreeMap;

use crate::types::{basic_land, Card, Color, SuggestedLand};

fn basic(color: Color, quantity: u32) -> SuggestedLand {
    let land = basic_land(color);
    SuggestedLand {
        card_id: land.card_id,
        name: land.name.to_string(),
        quantity,
        color,
    }
}

/// Basics proportional to color weight, each rounded to nearest with a floor
/// of one. The quantities need not add up to `total` exactly.
pub fn rounded_basics(weights: &BTreeMap<Color, u32>, total: u32) -> Vec<SuggestedLand> {
    let weight_sum: u32 = weights.values().sum();
    if weight_sum == 0 {
        return Vec::new();
    }
    weights
        .iter()
        .filter(|(_, weight)| **weight > 0)
        .map(|(color, weight)| {
            let share = *weight as f64 / weight_sum as f64;
            let quantity = ((share * total as f64 + 0.5) as u32).max(1);
            basic(*color, quantity)
        })
        .collect()
}

/// Basics proportional to color weight that add up to exactly `total`.
/// Leftover lands go to the largest fractional shares, ties in WUBRG order.
pub fn exact_basics(weights: &BTreeMap<Color, u32>, total: u32) -> Vec<SuggestedLand> {
    let weight_sum: u32 = weights.values().sum();
    if weight_sum == 0 || total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<(Color, u32, f64)> = weights
        .iter()
        .filter(|(_, weight)| **weight > 0)
        .map(|(color, weight)| {
            let exact = *weight as f64 * total as f64 / weight_sum as f64;
            (*color, exact.floor() as u32, exact - exact.floor())
        })
        .collect();

    let allocated: u32 = shares.iter().map(|(_, quantity, _)| quantity).sum();
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|a, b| shares[*b].2.total_cmp(&shares[*a].2));
    for index in order.into_iter().take(total.saturating_sub(allocated) as usize) {
        shares[index].1 += 1;
    }

    shares
        .into_iter()
        .filter(|(_, quantity, _)| *quantity > 0)
        .map(|(color, quantity, _)| basic(color, quantity))
        .collect()
}

/// Land count for a 60-card deck from its average spell cost.
pub fn recommended_land_count(average_cmc: f64) -> u32 {
    if average_cmc < 2.5 {
        22
    } else if average_cmc < 3.5 {
        24
    } else {
        26
    }
}

/// Colors a land can tap for, read from `{W}`-style symbols in its rules text.
pub fn produced_colors(card: &Card) -> Vec<Color> {
    let Some(text) = card.oracle_text.as_deref() else {
        return Vec::new();
    };
    Color::ALL
        .into_iter()
        .filter(|color| text.contains(color.pip()))
        .collect()
}

pub fn enters_tapped(card: &Card) -> bool {
    let text = card.oracle_lower();
    text.contains("enters the battlefield tapped") || text.contains("enters tapped")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::builder::lands::{
        enters_tapped, exact_basics, produced_colors, recommended_land_count, rounded_basics,
    };
    use crate::types::{Card, Color};

    #[test]
    fn rounded_split_keeps_minimum_of_one() {
        let weights = BTreeMap::from([(Color::Green, 60), (Color::Red, 1)]);
        let lands = rounded_basics(&weights, 24);
        assert_eq!(lands.len(), 2);
        assert_eq!(lands[0].name, "Mountain");
        assert_eq!(lands[0].quantity, 1);
        assert_eq!(lands[1].name, "Forest");
        assert_eq!(lands[1].quantity, 24);
        assert!(rounded_basics(&BTreeMap::new(), 24).is_empty());
    }

    #[test]
    fn exact_split_sums_to_total() {
        let weights = BTreeMap::from([(Color::White, 5), (Color::Blue, 3), (Color::Black, 1)]);
        for total in [20, 22, 24, 26] {
            let sum: u32 = exact_basics(&weights, total).iter().map(|l| l.quantity).sum();
            assert_eq!(sum, total);
        }
    }

    #[test]
    fn land_count_bands() {
        assert_eq!(recommended_land_count(0.0), 22);
        assert_eq!(recommended_land_count(2.9), 24);
        assert_eq!(recommended_land_count(4.1), 26);
    }

    #[test]
    fn reads_dual_land_text() {
        let land = Card::new(1, "Thornwood Falls", "Land")
            .with_oracle_text("Thornwood Falls enters the battlefield tapped.\n{T}: Add {G} or {U}.");
        assert_eq!(produced_colors(&land), vec![Color::Blue, Color::Green]);
        assert!(enters_tapped(&land));
    }
}
