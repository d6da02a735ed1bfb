use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deck_oracle::archetype::classifier::{classify_deck, ArchetypeScore};
use deck_oracle::archetype::report::{classify_colors_and_style, ClassificationReport};
use deck_oracle::builder::complete::{CompleteDeckRequest, CompleteDeckResponse};
use deck_oracle::builder::iterative::{IterativeRequest, IterativeResponse};
use deck_oracle::builder::seed::{SeedRequest, SeedResponse};
use deck_oracle::builder::{CandidateScope, SeedDeckBuilder, SetRestriction};
use deck_oracle::config::{Config, ConfigOverrides};
use deck_oracle::constructor::{export_to_arena, DeckConstructor, SuggestDecksResponse, SuggestedDeck};
use deck_oracle::output::csv::{
    complete_deck_to_csv, next_cards_to_csv, owned_cards_to_csv, recommendations_to_csv,
};
use deck_oracle::output::json::render_json;
use deck_oracle::output::table::{
    render_archetype_table, render_classification, render_complete_deck_table,
    render_deck_suggestions_table, render_next_cards_table, render_packages_table,
    render_recommendations_table, render_seed_table, render_suggested_deck_table,
};
use deck_oracle::packages::detect::{analyze_deck_packages, missing_role_suggestion};
use deck_oracle::packages::PackageAnalysis;
use deck_oracle::recommend::{CardRecommendation, CmcRange, DeckContext, Filters, RecommendationEngine};
use deck_oracle::sources::memory::InMemoryCatalog;
use deck_oracle::sources::CardSources;
use deck_oracle::types::{Card, CardId, Color};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "deck-oracle",
    about = "Deck recommendations, draft deck construction and build-around suggestions"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON card catalog; overrides `[catalog] path`.
    #[arg(long)]
    catalog: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Draft set code used for ratings lookups.
    #[arg(long)]
    set: Option<String>,
    /// Draft format used for ratings lookups.
    #[arg(long = "draft-format")]
    draft_format: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct ScopeArgs {
    /// Comma-separated set codes to draw candidates from.
    #[arg(long)]
    sets: Option<String>,
    /// Only the seed card's own set.
    #[arg(long = "single-set")]
    single_set: bool,
    /// Only cards already in the collection.
    #[arg(long)]
    budget: bool,
}

impl From<ScopeArgs> for CandidateScope {
    fn from(value: ScopeArgs) -> Self {
        let scope = CandidateScope::default().with_budget_mode(value.budget);
        if value.single_set {
            return scope.with_restriction(SetRestriction::Single);
        }
        match value.sets {
            Some(raw) => scope.with_sets(split_list(&raw)),
            None => scope,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Recommend {
        /// JSON deck context file.
        #[arg(long)]
        deck: PathBuf,
        /// Candidate pool: comma-separated ids or a file of ids.
        #[arg(long)]
        pool: Option<String>,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long = "min-score")]
        min_score: Option<f64>,
        #[arg(long)]
        colors: Option<String>,
        #[arg(long = "types")]
        card_types: Option<String>,
        #[arg(long = "min-cmc")]
        min_cmc: Option<u32>,
        #[arg(long = "max-cmc")]
        max_cmc: Option<u32>,
        #[arg(long = "no-lands")]
        no_lands: bool,
    },
    Explain {
        #[arg(long)]
        deck: PathBuf,
        #[arg(long)]
        card: CardId,
    },
    Suggest {
        #[arg(long)]
        pool: String,
    },
    ArchetypeDeck {
        #[arg(long)]
        pool: String,
        #[arg(long)]
        archetype: String,
        /// Print an Arena import list instead of the deck table.
        #[arg(long)]
        export: bool,
    },
    BuildAround {
        #[arg(long)]
        seed: CardId,
        #[arg(long, default_value_t = 0)]
        max: usize,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    NextCards {
        #[arg(long)]
        seed: CardId,
        /// Comma-separated ids, one per copy in the deck.
        #[arg(long = "deck-ids")]
        deck_ids: String,
        #[arg(long, default_value_t = 0)]
        max: usize,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    CompleteDeck {
        #[arg(long)]
        seed: CardId,
        #[arg(long, default_value = "midrange")]
        archetype: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    Classify {
        #[arg(long)]
        cards: String,
    },
    Packages {
        #[arg(long)]
        cards: String,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        catalog_path: cli.catalog.clone(),
        set_code: cli.set.clone(),
        draft_format: cli.draft_format.clone(),
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let set_code = config.draft.set_code.clone();
    let format = config.draft.format.clone();

    match &cli.command {
        Commands::Recommend {
            deck,
            pool,
            max,
            min_score,
            colors,
            card_types,
            min_cmc,
            max_cmc,
            no_lands,
        } => {
            let (catalog, sources) = open_catalog(&config)?;
            let engine =
                RecommendationEngine::new(sources).with_tuning(config.recommend_tuning());
            let context = load_deck_context(deck, &catalog, &set_code, &format)?;
            let mut filters = Filters::from_tuning(engine.tuning());
            if let Some(max) = max {
                filters.max_results = *max;
            }
            if let Some(min_score) = min_score {
                filters.min_score = *min_score;
            }
            if let Some(raw) = colors {
                filters.colors = parse_colors(raw)?;
            }
            if let Some(raw) = card_types {
                filters.card_types = split_list(raw);
            }
            if min_cmc.is_some() || max_cmc.is_some() {
                filters.cmc_range = Some(CmcRange {
                    min: min_cmc.unwrap_or(0),
                    max: max_cmc.unwrap_or(u32::MAX),
                });
            }
            if *no_lands {
                filters.include_lands = false;
            }
            let pool = match pool {
                Some(raw) => parse_id_source(raw)?,
                None => context.draft_card_ids.clone().unwrap_or_default(),
            };
            if pool.is_empty() {
                warn!("no candidate pool given; recommendations draw from the draft pool only");
            }
            let filters = filters.with_draft_pool(pool);
            let recommendations = engine.recommend(&context, Some(&filters)).await?;
            print_recommendations(&recommendations, cli.output)?;
        }
        Commands::Explain { deck, card } => {
            let (catalog, sources) = open_catalog(&config)?;
            let engine =
                RecommendationEngine::new(sources).with_tuning(config.recommend_tuning());
            let context = load_deck_context(deck, &catalog, &set_code, &format)?;
            let explanation = engine.explain(*card, &context).await?;
            match cli.output {
                OutputFormat::Table => println!("{explanation}"),
                _ => println!(
                    "{}",
                    render_json(&serde_json::json!({
                        "card_id": card,
                        "explanation": explanation,
                    }))?
                ),
            }
        }
        Commands::Suggest { pool } => {
            let (_, sources) = open_catalog(&config)?;
            let constructor =
                DeckConstructor::new(sources).with_tuning(config.constructor_tuning());
            let pool = parse_id_source(pool)?;
            let response = constructor.suggest_decks(&pool, &set_code, &format).await;
            print_deck_suggestions(&response, cli.output)?;
        }
        Commands::ArchetypeDeck {
            pool,
            archetype,
            export,
        } => {
            let (_, sources) = open_catalog(&config)?;
            let constructor =
                DeckConstructor::new(sources).with_tuning(config.constructor_tuning());
            let pool = parse_id_source(pool)?;
            let deck = constructor
                .suggest_deck_by_archetype(&pool, &set_code, &format, archetype)
                .await?;
            if *export {
                print!("{}", export_to_arena(&deck));
            } else {
                print_suggested_deck(&deck, cli.output)?;
            }
        }
        Commands::BuildAround { seed, max, scope } => {
            let (_, sources) = open_catalog(&config)?;
            let builder = SeedDeckBuilder::new(sources).with_tuning(config.seed_tuning());
            let request = SeedRequest::new(*seed)
                .with_max_results(*max)
                .with_scope(scope.clone().into());
            let response = builder.build_around_seed(&request).await?;
            print_seed(&response, cli.output)?;
        }
        Commands::NextCards {
            seed,
            deck_ids,
            max,
            scope,
        } => {
            let (_, sources) = open_catalog(&config)?;
            let builder = SeedDeckBuilder::new(sources).with_tuning(config.seed_tuning());
            let request = IterativeRequest::new(*seed, parse_id_list(deck_ids)?)
                .with_max_results(*max)
                .with_scope(scope.clone().into());
            let response = builder.suggest_next_cards(&request).await?;
            print_next_cards(&response, cli.output)?;
        }
        Commands::CompleteDeck {
            seed,
            archetype,
            scope,
        } => {
            let (_, sources) = open_catalog(&config)?;
            let builder = SeedDeckBuilder::new(sources).with_tuning(config.seed_tuning());
            let request =
                CompleteDeckRequest::new(*seed, archetype).with_scope(scope.clone().into());
            let response = builder.generate_complete_deck(&request).await?;
            print_complete_deck(&response, cli.output)?;
        }
        Commands::Classify { cards } => {
            let (catalog, _) = open_catalog(&config)?;
            let cards = catalog_cards(&catalog, &parse_id_source(cards)?)?;
            let report = classify_colors_and_style(&cards)?;
            let scores = classify_deck(&cards);
            print_archetypes(&report, &scores, cli.output)?;
        }
        Commands::Packages { cards } => {
            let (catalog, _) = open_catalog(&config)?;
            let cards = catalog_cards(&catalog, &parse_id_source(cards)?)?;
            let analyses = analyze_deck_packages(&cards);
            print_packages(&analyses, cli.output)?;
        }
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
    }

    Ok(())
}

fn open_catalog(config: &Config) -> Result<(Arc<InMemoryCatalog>, CardSources)> {
    let catalog_path = config.resolved_catalog_path();
    let catalog = Arc::new(InMemoryCatalog::load(&catalog_path)?);
    info!(cards = catalog.len(), path = %catalog_path.display(), "loaded catalog");
    let sources = CardSources::from_catalog(Arc::clone(&catalog));
    Ok((catalog, sources))
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_colors(raw: &str) -> Result<Vec<Color>> {
    let mut colors = Vec::new();
    for piece in split_list(raw) {
        colors.push(Color::from_str(&piece)?);
    }
    Ok(colors)
}

fn parse_id_list(raw: &str) -> Result<Vec<CardId>> {
    let mut out = Vec::new();
    for piece in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        let id = trimmed
            .parse::<CardId>()
            .map_err(|e| anyhow!("invalid card id {trimmed:?}: {e}"))?;
        out.push(id);
    }
    Ok(out)
}

/// Ids inline, or read from a file holding a JSON array or a plain list.
fn parse_id_source(raw: &str) -> Result<Vec<CardId>> {
    let path = Path::new(raw);
    if !path.is_file() {
        return parse_id_list(raw);
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading id list: {}", path.display()))?;
    if data.trim_start().starts_with('[') {
        return serde_json::from_str(&data)
            .with_context(|| format!("failed parsing id list: {}", path.display()));
    }
    parse_id_list(&data)
}

fn catalog_cards(catalog: &InMemoryCatalog, ids: &[CardId]) -> Result<Vec<Card>> {
    ids.iter()
        .map(|id| {
            catalog
                .card(*id)
                .cloned()
                .ok_or_else(|| anyhow!("card {id} is not in the catalog"))
        })
        .collect()
}

/// Deck context from JSON, with metadata filled in from the catalog and the
/// configured draft set and format as fallbacks.
fn load_deck_context(
    path: &Path,
    catalog: &InMemoryCatalog,
    set_code: &str,
    format: &str,
) -> Result<DeckContext> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading deck: {}", path.display()))?;
    let mut context: DeckContext = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing deck: {}", path.display()))?;
    for entry in &context.cards {
        if context.metadata.contains_key(&entry.card_id) {
            continue;
        }
        match catalog.card(entry.card_id) {
            Some(card) => {
                context.metadata.insert(entry.card_id, card.clone());
            }
            None => debug!(card_id = entry.card_id, "deck card missing from catalog"),
        }
    }
    if context.set_code.is_empty() {
        context.set_code = set_code.to_string();
    }
    if context.draft_format.is_empty() {
        context.draft_format = format.to_string();
    }
    Ok(context)
}

fn print_recommendations(recommendations: &[CardRecommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendations_table(recommendations)),
        OutputFormat::Json => println!("{}", render_json(recommendations)?),
        OutputFormat::Csv => println!("{}", recommendations_to_csv(recommendations)?),
    }
    Ok(())
}

fn print_deck_suggestions(response: &SuggestDecksResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_deck_suggestions_table(response)),
        OutputFormat::Json => println!("{}", render_json(response)?),
        OutputFormat::Csv => {
            warn!("CSV output for suggest not implemented, using JSON");
            println!("{}", render_json(response)?);
        }
    }
    Ok(())
}

fn print_suggested_deck(deck: &SuggestedDeck, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_suggested_deck_table(deck)),
        OutputFormat::Json => println!("{}", render_json(deck)?),
        OutputFormat::Csv => {
            warn!("CSV output for archetype-deck not implemented, using JSON");
            println!("{}", render_json(deck)?);
        }
    }
    Ok(())
}

fn print_seed(response: &SeedResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_seed_table(response)),
        OutputFormat::Json => println!("{}", render_json(response)?),
        OutputFormat::Csv => println!("{}", owned_cards_to_csv(&response.suggestions)?),
    }
    Ok(())
}

fn print_next_cards(response: &IterativeResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_next_cards_table(response)),
        OutputFormat::Json => println!("{}", render_json(response)?),
        OutputFormat::Csv => println!("{}", next_cards_to_csv(response)?),
    }
    Ok(())
}

fn print_complete_deck(response: &CompleteDeckResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_complete_deck_table(response)),
        OutputFormat::Json => println!("{}", render_json(response)?),
        OutputFormat::Csv => println!("{}", complete_deck_to_csv(response)?),
    }
    Ok(())
}

fn print_archetypes(
    report: &ClassificationReport,
    scores: &[ArchetypeScore],
    format: OutputFormat,
) -> Result<()> {
    let as_json = || {
        render_json(&serde_json::json!({
            "classification": report,
            "archetypes": scores,
        }))
    };
    match format {
        OutputFormat::Table => {
            println!("{}", render_classification(report));
            println!("{}", render_archetype_table(scores));
        }
        OutputFormat::Json => println!("{}", as_json()?),
        OutputFormat::Csv => {
            warn!("CSV output for classify not implemented, using JSON");
            println!("{}", as_json()?);
        }
    }
    Ok(())
}

fn print_packages(analyses: &[PackageAnalysis], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_packages_table(analyses));
            for suggestion in analyses.iter().filter_map(missing_role_suggestion) {
                println!("{suggestion}");
            }
        }
        OutputFormat::Json => println!("{}", render_json(analyses)?),
        OutputFormat::Csv => {
            warn!("CSV output for packages not implemented, using JSON");
            println!("{}", render_json(analyses)?);
        }
    }
    Ok(())
}
