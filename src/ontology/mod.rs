pub mod keywords;
pub mod tribal;
pub mod typeline;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ontology::keywords::{dictionary_entry, first_theme_for, KEYWORD_DICTIONARY, THEME_PATTERNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Combat,
    Ability,
    Mechanic,
    Theme,
    Trigger,
    Activated,
    Protection,
}

impl KeywordCategory {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Ability => "ability",
            Self::Mechanic => "mechanic",
            Self::Theme => "theme",
            Self::Trigger => "trigger",
            Self::Activated => "activated",
            Self::Protection => "protection",
        }
    }
}

impl Display for KeywordCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordInfo {
    pub keyword: String,
    pub category: KeywordCategory,
    pub weight: f64,
}

impl KeywordInfo {
    fn new(keyword: &str, category: KeywordCategory, weight: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            category,
            weight,
        }
    }
}

/// Substring match with support for one `.*` wildcard.
///
/// `"create a.*token"` matches when `"create a"` occurs and `"token"` occurs
/// somewhere after its first occurrence. Patterns with two or more wildcards
/// only check the leading segment; this is a known limitation that the
/// registries rely on, so it is kept as is.
pub fn contains_pattern(text: &str, pattern: &str) -> bool {
    if !pattern.contains(".*") {
        return text.contains(pattern);
    }
    let parts: Vec<&str> = pattern.split(".*").collect();
    if parts.len() != 2 {
        return text.contains(parts[0]);
    }
    match text.find(parts[0]) {
        Some(idx) => text[idx + parts[0].len()..].contains(parts[1]),
        None => false,
    }
}

/// Set of keyword names found in a piece of rules text.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let mut found = BTreeSet::new();
    for entry in KEYWORD_DICTIONARY {
        if lower.contains(entry.keyword) {
            found.insert(entry.keyword.to_string());
        }
    }
    for pattern in THEME_PATTERNS {
        if contains_pattern(&lower, pattern.pattern) {
            found.insert(pattern.keyword.to_string());
        }
    }
    found
}

/// Keywords with category and weight, first occurrence of each keyword wins.
/// Dictionary entries come before theme patterns.
pub fn extract_keywords_with_info(text: &str) -> Vec<KeywordInfo> {
    let lower = text.to_lowercase();
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for entry in KEYWORD_DICTIONARY {
        if lower.contains(entry.keyword) && seen.insert(entry.keyword) {
            out.push(KeywordInfo::new(entry.keyword, entry.category, entry.weight));
        }
    }
    for pattern in THEME_PATTERNS {
        if contains_pattern(&lower, pattern.pattern) && seen.insert(pattern.keyword) {
            out.push(KeywordInfo::new(pattern.keyword, pattern.category, pattern.weight));
        }
    }
    out
}

pub fn keyword_weight(keyword: &str) -> f64 {
    if let Some(entry) = dictionary_entry(&keyword.to_lowercase()) {
        return entry.weight;
    }
    first_theme_for(keyword)
        .map(|pattern| pattern.weight)
        .unwrap_or(0.5)
}

pub fn keyword_category(keyword: &str) -> KeywordCategory {
    if let Some(entry) = dictionary_entry(&keyword.to_lowercase()) {
        return entry.category;
    }
    first_theme_for(keyword)
        .map(|pattern| pattern.category)
        .unwrap_or(KeywordCategory::Ability)
}

pub fn calculate_keyword_synergy(first: &[KeywordInfo], second: &[KeywordInfo]) -> f64 {
    calculate_keyword_synergy_detailed(first, second).0
}

/// Pairwise keyword synergy between two keyword lists, in [0, 1], plus the
/// exact keywords both lists share.
///
/// Exact matches contribute the mean of both weights; a different keyword in
/// the same category contributes half of that. The total is normalized by
/// the number of possible pairs.
pub fn calculate_keyword_synergy_detailed(
    first: &[KeywordInfo],
    second: &[KeywordInfo],
) -> (f64, Vec<String>) {
    let mut matched = Vec::new();
    if first.is_empty() || second.is_empty() {
        return (0.0, matched);
    }

    let mut by_category: BTreeMap<KeywordCategory, Vec<&KeywordInfo>> = BTreeMap::new();
    for kw in first {
        by_category.entry(kw.category).or_default().push(kw);
    }

    let mut total = 0.0;
    let mut match_count = 0usize;
    for kw2 in second {
        for kw1 in first {
            if kw1.keyword == kw2.keyword {
                total += (kw1.weight + kw2.weight) / 2.0;
                match_count += 1;
                if !matched.contains(&kw1.keyword) {
                    matched.push(kw1.keyword.clone());
                }
            }
        }
        if let Some(same_category) = by_category.get(&kw2.category) {
            for kw1 in same_category {
                if kw1.keyword != kw2.keyword {
                    total += (kw1.weight + kw2.weight) / 4.0;
                    match_count += 1;
                }
            }
        }
    }

    if match_count == 0 {
        return (0.0, matched);
    }
    let normalized = total / (first.len() * second.len()) as f64;
    (normalized.min(1.0), matched)
}

#[cfg(test)]
mod tests {
    use crate::ontology::{
        calculate_keyword_synergy, calculate_keyword_synergy_detailed, contains_pattern,
        extract_keywords, extract_keywords_with_info, keyword_category, keyword_weight,
        KeywordCategory,
    };

    #[test]
    fn single_wildcard_requires_suffix_after_prefix() {
        assert!(contains_pattern("create a 1/1 white soldier token", "create a.*token"));
        assert!(!contains_pattern("token, then create a card", "create a.*token"));
        assert!(contains_pattern("destroy target creature", "destroy target"));
        assert!(!contains_pattern("exile all creatures", "destroy target"));
    }

    #[test]
    fn multiple_wildcards_degrade_to_prefix_check() {
        let pattern = "return.*creature.*from.*graveyard to the battlefield";
        assert!(contains_pattern("return target land to your hand", pattern));
        assert!(!contains_pattern("exile target creature", pattern));
    }

    #[test]
    fn extracts_dictionary_and_theme_keywords() {
        let keywords = extract_keywords(
            "Flying. Whenever another creature you control dies, draw a card.",
        );
        assert!(keywords.contains("flying"));
        assert!(keywords.contains("death payoff"));
        assert!(keywords.contains("death triggers"));
        assert!(keywords.contains("card draw"));
    }

    #[test]
    fn keyword_info_keeps_first_occurrence() {
        let info = extract_keywords_with_info("Create a 1/1 token. Create two Treasure tokens.");
        let tokens: Vec<_> = info.iter().filter(|k| k.keyword == "tokens").collect();
        assert_eq!(tokens.len(), 1);
        assert!((tokens[0].weight - 0.9).abs() < 1e-9);
        assert_eq!(tokens[0].category, KeywordCategory::Theme);
    }

    #[test]
    fn weight_and_category_lookups_fall_back() {
        assert!((keyword_weight("Flying") - 0.8).abs() < 1e-9);
        assert!((keyword_weight("ETB") - 0.9).abs() < 1e-9);
        assert!((keyword_weight("not a keyword") - 0.5).abs() < 1e-9);
        assert_eq!(keyword_category("hexproof"), KeywordCategory::Protection);
        assert_eq!(keyword_category("tap abilities"), KeywordCategory::Activated);
        assert_eq!(keyword_category("unknown"), KeywordCategory::Ability);
    }

    #[test]
    fn synergy_of_empty_lists_is_zero() {
        let (score, matched) = calculate_keyword_synergy_detailed(&[], &[]);
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn synergy_counts_exact_and_category_matches() {
        let first = extract_keywords_with_info("Flying");
        let second = extract_keywords_with_info("Flying, trample");
        let (score, matched) = calculate_keyword_synergy_detailed(&first, &second);
        assert_eq!(matched, vec!["flying".to_string()]);
        // flying/flying: 0.8, trample vs flying same category: (0.8 + 0.7) / 4
        let expected = (0.8 + 1.5 / 4.0) / 2.0;
        assert!((score - expected).abs() < 1e-9);
        assert!((calculate_keyword_synergy(&first, &second) - expected).abs() < 1e-9);
    }

    #[test]
    fn unrelated_keywords_have_no_synergy() {
        let first = extract_keywords_with_info("Hexproof");
        let second = extract_keywords_with_info("Cascade");
        assert_eq!(calculate_keyword_synergy(&first, &second), 0.0);
    }
}
