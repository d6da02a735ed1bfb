use std::collections::{BTreeMap, HashSet};

use crate::constructor::ColorCombination;
use crate::types::{basic_land, CardId, Color, ScoredCard, SuggestedLand};

/// Ideal spell counts per mana value for a 23-spell limited deck.
pub const LIMITED_SELECTION_CURVE: [u32; 8] = [0, 2, 5, 5, 4, 3, 2, 2];

/// Two-pass greedy pick.
///
/// Cards are ranked by score, ties keeping pool order. The first pass takes a
/// card only while its mana value slot (capped at `ideal.len() - 1`) is below
/// the ideal count. The second pass fills what is left with the best unused
/// cards regardless of cost. A card id is picked at most once.
pub fn select_by_curve(
    mut scored: Vec<ScoredCard>,
    target: usize,
    ideal: &[u32],
) -> Vec<ScoredCard> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    let cap = ideal.len().saturating_sub(1) as u32;

    let mut slots: BTreeMap<u32, u32> = BTreeMap::new();
    let mut used: HashSet<CardId> = HashSet::new();
    let mut picked: Vec<usize> = Vec::with_capacity(target);

    for (index, entry) in scored.iter().enumerate() {
        if picked.len() >= target {
            break;
        }
        if used.contains(&entry.card.id) {
            continue;
        }
        let slot = entry.card.cmc_slot().min(cap);
        let wanted = ideal.get(slot as usize).copied().unwrap_or(0);
        let filled = slots.entry(slot).or_insert(0);
        if *filled < wanted {
            *filled += 1;
            used.insert(entry.card.id);
            picked.push(index);
        }
    }

    for (index, entry) in scored.iter().enumerate() {
        if picked.len() >= target {
            break;
        }
        if used.insert(entry.card.id) {
            picked.push(index);
        }
    }

    let mut entries: Vec<Option<ScoredCard>> = scored.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|index| entries[index].take())
        .collect()
}

pub fn count_lands(lands: &[SuggestedLand]) -> u32 {
    lands.iter().map(|land| land.quantity).sum()
}

/// Splits `total` basics across the combination's colors by mana symbol count.
///
/// Without colored symbols the split is even, earlier colors taking the
/// remainder. Otherwise each color gets its floored share and the remainder
/// goes to the color with the most symbols. Colors with no lands are omitted.
pub fn distribute_lands(
    selected: &[ScoredCard],
    combo: &ColorCombination,
    total: u32,
) -> Vec<SuggestedLand> {
    if combo.colors.is_empty() || total == 0 {
        return Vec::new();
    }

    let pips: Vec<(Color, u32)> = combo
        .colors
        .iter()
        .map(|color| {
            let count = selected
                .iter()
                .map(|entry| entry.card.pip_count(*color) as u32)
                .sum();
            (*color, count)
        })
        .collect();
    let total_pips: u32 = pips.iter().map(|(_, count)| count).sum();

    let mut counts: Vec<(Color, u32)> = if total_pips == 0 {
        let colors = combo.colors.len() as u32;
        let base = total / colors;
        let remainder = total % colors;
        combo
            .colors
            .iter()
            .enumerate()
            .map(|(i, color)| (*color, base + u32::from((i as u32) < remainder)))
            .collect()
    } else {
        let mut shares: Vec<(Color, u32)> = pips
            .iter()
            .map(|(color, count)| {
                let share = (total as f64 * *count as f64 / total_pips as f64).floor() as u32;
                (*color, share)
            })
            .collect();
        let allocated: u32 = shares.iter().map(|(_, share)| share).sum();
        let remaining = total.saturating_sub(allocated);
        if remaining > 0 {
            let mut leader = 0usize;
            let mut most = 0u32;
            for (i, (_, count)) in pips.iter().enumerate() {
                if *count > most {
                    most = *count;
                    leader = i;
                }
            }
            shares[leader].1 += remaining;
        }
        shares
    };

    counts.retain(|(_, quantity)| *quantity > 0);
    counts
        .into_iter()
        .map(|(color, quantity)| {
            let land = basic_land(color);
            SuggestedLand {
                card_id: land.card_id,
                name: land.name.to_string(),
                quantity,
                color,
            }
        })
        .collect()
}
