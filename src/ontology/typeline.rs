const MAIN_TYPES: [&str; 7] = [
    "Creature",
    "Artifact",
    "Enchantment",
    "Instant",
    "Sorcery",
    "Land",
    "Planeswalker",
];

const SUPERTYPES: [&str; 4] = ["Legendary", "Basic", "Snow", "World"];

/// Case-insensitive substring check against a type line.
pub fn contains_type(type_line: &str, target: &str) -> bool {
    type_line
        .to_lowercase()
        .contains(&target.to_lowercase())
}

/// Subtypes after the em-dash (or a plain hyphen when no em-dash is present).
pub fn creature_types(type_line: &str) -> Vec<String> {
    let mut parts: Vec<&str> = type_line.split('—').collect();
    if parts.len() < 2 {
        parts = type_line.split('-').collect();
    }
    if parts.len() < 2 {
        return Vec::new();
    }
    let mut out: Vec<String> = Vec::new();
    for token in parts[1].split_whitespace() {
        let token = token.trim().to_string();
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Main card types and supertypes from the part of the type line before the em-dash.
pub fn card_types(type_line: &str) -> Vec<String> {
    let head = type_line
        .split('—')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    MAIN_TYPES
        .iter()
        .chain(SUPERTYPES.iter())
        .filter(|t| head.contains(&t.to_lowercase()))
        .map(|t| t.to_string())
        .collect()
}
