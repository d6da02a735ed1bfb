use std::collections::BTreeMap;

use crate::ontology::contains_pattern;
use crate::packages::{
    CardRoleMatch, PackageAnalysis, PackageBonus, PackageRole, SynergyPackage, SYNERGY_PACKAGES,
};
use crate::types::Card;

const MISSING_ROLE_BONUS: f64 = 0.3;
const REINFORCE_ROLE_BONUS: f64 = 0.15;
const MAX_PACKAGE_BONUS: f64 = 0.5;
const UNDERFILLED_ROLE_COUNT: usize = 3;

pub fn matches_role(card: &Card, role: &PackageRole) -> bool {
    let oracle = card.oracle_lower();
    let type_line = card.type_line.to_lowercase();

    if role
        .patterns
        .iter()
        .any(|pattern| contains_pattern(&oracle, pattern))
    {
        return true;
    }

    let cost_ok = role.name != "cheap_spell" || card.cmc <= 2.0;
    if cost_ok
        && role
            .type_lines
            .iter()
            .any(|t| type_line.contains(&t.to_lowercase()))
    {
        return true;
    }

    if role
        .keywords
        .iter()
        .any(|keyword| oracle.contains(&keyword.to_lowercase()))
    {
        return true;
    }

    role.name == "big_target" && card.cmc >= 5.0 && type_line.contains("creature")
}

/// Every package role the card can fill.
pub fn card_roles(card: &Card) -> Vec<CardRoleMatch> {
    let mut roles = Vec::new();
    for package in SYNERGY_PACKAGES {
        for role in package.roles {
            if matches_role(card, role) {
                roles.push(CardRoleMatch {
                    package_name: package.name,
                    role_name: role.name,
                    role_display: role.display_name,
                    is_required: role.required,
                });
            }
        }
    }
    roles
}

pub fn analyze_package(package: &'static SynergyPackage, cards: &[Card]) -> PackageAnalysis {
    let mut filled_roles: BTreeMap<&'static str, usize> = BTreeMap::new();
    for card in cards {
        for role in package.roles {
            if matches_role(card, role) {
                *filled_roles.entry(role.name).or_insert(0) += 1;
            }
        }
    }

    let mut missing_roles = Vec::new();
    let mut required_filled = 0usize;
    let mut total_required = 0usize;
    for role in package.roles.iter().filter(|r| r.required) {
        total_required += 1;
        if filled_roles.get(role.name).copied().unwrap_or(0) > 0 {
            required_filled += 1;
        } else {
            missing_roles.push(role.display_name);
        }
    }

    let completeness = if total_required > 0 {
        required_filled as f64 / total_required as f64
    } else {
        0.0
    };
    let roles_with_cards = filled_roles.values().filter(|count| **count > 0).count();

    PackageAnalysis {
        package,
        filled_roles,
        missing_roles,
        completeness,
        is_active: roles_with_cards >= package.min_roles,
    }
}

/// Packages the card list supports at all (completeness above zero), in registry order.
pub fn analyze_deck_packages(cards: &[Card]) -> Vec<PackageAnalysis> {
    SYNERGY_PACKAGES
        .iter()
        .map(|package| analyze_package(package, cards))
        .filter(|analysis| analysis.completeness > 0.0)
        .collect()
}

pub fn missing_role_suggestion(analysis: &PackageAnalysis) -> Option<String> {
    if analysis.missing_roles.is_empty() || analysis.completeness < 0.5 {
        return None;
    }
    Some(format!(
        "Consider adding: {}",
        analysis.missing_roles.join(", ")
    ))
}

/// Bonus for a candidate that fills a missing required role or reinforces a
/// thin role in a package that is active or at least half complete.
pub fn score_card_for_packages(card: &Card, analyses: &[PackageAnalysis]) -> PackageBonus {
    let roles = card_roles(card);
    let mut bonus = 0.0;
    let mut reasons = Vec::new();

    for analysis in analyses {
        if !analysis.is_active && analysis.completeness < 0.5 {
            continue;
        }
        for role in roles
            .iter()
            .filter(|r| r.package_name == analysis.package.name)
        {
            let current = analysis
                .filled_roles
                .get(role.role_name)
                .copied()
                .unwrap_or(0);
            if current == 0 && role.is_required {
                bonus += MISSING_ROLE_BONUS;
                reasons.push(format!(
                    "Completes {} package (adds {})",
                    analysis.package.name, role.role_display
                ));
            } else if current < UNDERFILLED_ROLE_COUNT {
                bonus += REINFORCE_ROLE_BONUS;
                reasons.push(format!(
                    "Strengthens {} (more {})",
                    analysis.package.name, role.role_display
                ));
            }
        }
    }

    PackageBonus {
        bonus: f64::min(bonus, MAX_PACKAGE_BONUS),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use crate::packages::detect::{
        analyze_deck_packages, card_roles, matches_role, missing_role_suggestion,
        score_card_for_packages,
    };
    use crate::packages::package_by_name;
    use crate::types::Card;

    fn card(id: i64, type_line: &str, cmc: f64, text: &str) -> Card {
        Card::new(id, &format!("Card {id}"), type_line)
            .with_cmc(cmc)
            .with_oracle_text(text)
    }

    fn aristocrats_pieces() -> (Card, Card, Card) {
        (
            card(
                1,
                "Sorcery",
                2.0,
                "Create a 1/1 white Soldier creature token.",
            ),
            card(2, "Creature — Vampire", 2.0, "Sacrifice a creature: Scry 1."),
            card(
                3,
                "Creature — Zombie",
                3.0,
                "Whenever another creature you control dies, each opponent loses 1 life.",
            ),
        )
    }

    #[test]
    fn full_aristocrats_package_is_active_and_complete() {
        let (tokens, outlet, payoff) = aristocrats_pieces();
        let analyses = analyze_deck_packages(&[tokens, outlet, payoff]);
        let aristocrats = analyses
            .iter()
            .find(|a| a.package.name == "Aristocrats")
            .expect("aristocrats missing");
        assert!(aristocrats.is_active);
        assert!((aristocrats.completeness - 1.0).abs() < 1e-9);
        assert!(aristocrats.missing_roles.is_empty());
        assert!(missing_role_suggestion(aristocrats).is_none());
    }

    #[test]
    fn missing_outlet_is_reported_and_rewarded() {
        let (tokens, outlet, payoff) = aristocrats_pieces();
        let analyses = analyze_deck_packages(&[tokens, payoff]);
        let aristocrats = analyses
            .iter()
            .find(|a| a.package.name == "Aristocrats")
            .expect("aristocrats missing");
        assert!(aristocrats.completeness < 1.0);
        assert_eq!(aristocrats.missing_roles, vec!["Sacrifice Outlet"]);
        assert_eq!(
            missing_role_suggestion(aristocrats).as_deref(),
            Some("Consider adding: Sacrifice Outlet")
        );

        let bonus = score_card_for_packages(&outlet, &analyses);
        assert!(bonus.bonus > 0.0);
        assert!(!bonus.reasons.is_empty());
        assert!(bonus.reasons[0].contains("Completes Aristocrats package"));
    }

    #[test]
    fn cheap_spell_role_requires_low_cost() {
        let package = package_by_name("spellslinger").expect("spellslinger missing");
        let cheap = &package.roles[1];
        assert!(matches_role(&card(1, "Instant", 1.0, "Draw a card."), cheap));
        assert!(!matches_role(&card(2, "Sorcery", 4.0, "Draw a card."), cheap));
    }

    #[test]
    fn big_creatures_are_reanimation_targets() {
        let roles = card_roles(&card(1, "Creature — Dragon", 6.0, "Flying"));
        assert!(roles
            .iter()
            .any(|r| r.package_name == "Reanimator" && r.role_name == "big_target"));
    }

    #[test]
    fn empty_deck_supports_no_packages() {
        assert!(analyze_deck_packages(&[]).is_empty());
    }

    #[test]
    fn package_bonus_is_capped() {
        let (tokens, _, payoff) = aristocrats_pieces();
        let analyses = analyze_deck_packages(&[tokens, payoff]);
        let multi = card(
            9,
            "Creature — Human",
            2.0,
            "Sacrifice a creature: Create a Treasure token. Whenever a creature you control dies, create a 1/1 token. Creatures you control get +1/+0.",
        );
        let bonus = score_card_for_packages(&multi, &analyses);
        assert!(bonus.bonus <= 0.5 + 1e-9);
    }
}
