use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::SeedTuning;
use crate::constructor::ConstructorTuning;
use crate::recommend::RecommendTuning;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub constructor: ConstructorConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub draft: DraftConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_recommend_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_true")]
    pub include_lands: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorConfig {
    #[serde(default = "default_spell_target")]
    pub spell_target: usize,
    #[serde(default = "default_limited_land_count")]
    pub land_count: u32,
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,
    #[serde(default = "default_min_creatures")]
    pub min_creatures: usize,
    #[serde(default = "default_creature_slack")]
    pub archetype_creature_slack: usize,
    #[serde(default = "default_fill_tolerance")]
    pub fill_tolerance: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_seed_land_total")]
    pub land_total: u32,
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    #[serde(default)]
    pub set_code: String,
    #[serde(default = "default_draft_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<String>,
    pub set_code: Option<String>,
    pub draft_format: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/deck-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.catalog_path {
            self.catalog.path = path;
        }
        if let Some(set_code) = overrides.set_code {
            self.draft.set_code = set_code;
        }
        if let Some(format) = overrides.draft_format {
            self.draft.format = format;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_catalog_path(&self) -> PathBuf {
        expand_tilde(&self.catalog.path)
    }

    /// Engine tuning with the configured limits; weights and curve stay fixed.
    pub fn recommend_tuning(&self) -> RecommendTuning {
        RecommendTuning {
            max_results: self.recommend.max_results,
            min_score: self.recommend.min_score,
            include_lands: self.recommend.include_lands,
            ..RecommendTuning::default()
        }
    }

    pub fn constructor_tuning(&self) -> ConstructorTuning {
        let c = &self.constructor;
        ConstructorTuning {
            spell_target: c.spell_target,
            land_count: c.land_count,
            min_candidates: c.min_candidates,
            min_creatures: c.min_creatures,
            archetype_creature_slack: c.archetype_creature_slack,
            fill_tolerance: c.fill_tolerance,
            ..ConstructorTuning::default()
        }
    }

    pub fn seed_tuning(&self) -> SeedTuning {
        SeedTuning {
            max_results: self.seed.max_results,
            min_score: self.seed.min_score,
            land_total: self.seed.land_total,
            max_copies: self.seed.max_copies,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[logging]
level = "info"

[catalog]
path = "~/.local/share/deck-oracle/catalog.json"

[recommend]
max_results = 10
min_score = 0.3
include_lands = true

[constructor]
spell_target = 23
land_count = 17
min_candidates = 15
min_creatures = 6
archetype_creature_slack = 4
fill_tolerance = 3

[seed]
max_results = 40
min_score = 0.3
land_total = 24
max_copies = 4

[draft]
set_code = ""
format = "PremierDraft"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_results: default_recommend_max_results(),
            min_score: default_min_score(),
            include_lands: true,
        }
    }
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            spell_target: default_spell_target(),
            land_count: default_limited_land_count(),
            min_candidates: default_min_candidates(),
            min_creatures: default_min_creatures(),
            archetype_creature_slack: default_creature_slack(),
            fill_tolerance: default_fill_tolerance(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_results: default_seed_max_results(),
            min_score: default_min_score(),
            land_total: default_seed_land_total(),
            max_copies: default_max_copies(),
        }
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            set_code: String::new(),
            format: default_draft_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_path() -> String {
    "~/.local/share/deck-oracle/catalog.json".to_string()
}

fn default_recommend_max_results() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.3
}

fn default_spell_target() -> usize {
    23
}

fn default_limited_land_count() -> u32 {
    17
}

fn default_min_candidates() -> usize {
    15
}

fn default_min_creatures() -> usize {
    6
}

fn default_creature_slack() -> usize {
    4
}

fn default_fill_tolerance() -> usize {
    3
}

fn default_seed_max_results() -> usize {
    40
}

fn default_seed_land_total() -> u32 {
    24
}

fn default_max_copies() -> u32 {
    4
}

fn default_draft_format() -> String {
    "PremierDraft".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use crate::config::{expand_tilde, Config, ConfigOverrides};

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        let defaults = Config::default();
        assert_eq!(parsed.seed.max_copies, defaults.seed.max_copies);
        assert_eq!(parsed.constructor.land_count, 17);
        assert_eq!(parsed.recommend.max_results, 10);
        assert_eq!(parsed.catalog.path, defaults.catalog.path);
        assert_eq!(parsed.draft.format, "PremierDraft");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let parsed: Config = toml::from_str("[seed]\nmax_copies = 2\n").expect("partial");
        assert_eq!(parsed.seed.max_copies, 2);
        assert_eq!(parsed.seed.land_total, 24);
        assert_eq!(parsed.logging.level, "info");
        assert_eq!(parsed.seed_tuning().max_copies, 2);
    }

    #[test]
    fn tunings_carry_configured_limits() {
        let mut config = Config::default();
        config.recommend.max_results = 3;
        config.constructor.fill_tolerance = 1;
        assert_eq!(config.recommend_tuning().max_results, 3);
        assert_eq!(config.constructor_tuning().fill_tolerance, 1);
        assert_eq!(config.constructor_tuning().spell_target, 23);
    }

    #[test]
    fn overrides_replace_fields() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            catalog_path: Some("/tmp/cards.json".to_string()),
            set_code: Some("BLB".to_string()),
            draft_format: None,
        });
        assert_eq!(config.resolved_catalog_path(), expand_tilde("/tmp/cards.json"));
        assert_eq!(config.draft.set_code, "BLB");
        assert_eq!(config.draft.format, "PremierDraft");
    }
}
