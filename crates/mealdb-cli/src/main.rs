mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use mealdb_core::{
    CatalogIndex, CatalogSource, DEFAULT_RECOMMENDATIONS, EXAMPLE_LIMIT, PreferenceProfile,
    QueryEngine, Recipe, RecipeQuery, SUGGESTION_LIMIT, apply_preferences, examples,
    get_recipe_by_id, ingredient_examples, sample, sample_with, shopping_items, suggest,
};
use mealdb_store::Store;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(name = "mealdb", about = "Recipe catalog search, preference filtering and MCP server")]
struct Cli {
    /// Path to the catalog database (defaults to $MEALDB_DATA_DIR/catalog.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Import a dataset directory (meals.json, ingredients.json,
    /// meal_ingredients.json or a single catalog.json) into the database
    Seed {
        /// Dataset directory or bundled catalog file
        path: PathBuf,

        /// Clear existing rows before importing
        #[arg(long)]
        replace: bool,
    },

    /// Search recipes by name text and category/area/ingredient filters
    Search {
        /// Case-insensitive substring of the recipe name
        #[arg(default_value = "")]
        text: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        area: Option<String>,

        /// Exact ingredient name
        #[arg(long)]
        ingredient: Option<String>,

        /// Preference profile file (.toml or .json)
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Sort results by name instead of catalog order
        #[arg(long)]
        sort_name: bool,

        /// Print recipes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe in full
    Show {
        /// Recipe id (idMeal)
        id: String,

        /// Print the recipe as JSON
        #[arg(long)]
        json: bool,

        /// Print shopping-list items for the recipe as JSON
        #[arg(long)]
        shopping: bool,
    },

    /// Random recommendations that respect a preference profile
    Recommend {
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS)]
        count: usize,

        /// Preference profile file (.toml or .json)
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// List facet values, or suggest values for a preference field
    Facets {
        /// Restrict output to one facet
        #[arg(long, value_enum)]
        kind: Option<FacetKind>,

        /// Suggest values containing this text (requires --kind)
        #[arg(long)]
        query: Option<String>,

        /// Values already selected, skipped in suggestions
        #[arg(long = "selected")]
        selected: Vec<String>,
    },

    /// Show catalog statistics
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FacetKind {
    Category,
    Area,
    Ingredient,
}

fn data_dir() -> PathBuf {
    std::env::var("MEALDB_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(mealdb_store::default_base_dir)
}

fn open_store(cli: &Cli) -> Result<Store> {
    let path = cli
        .db
        .clone()
        .unwrap_or_else(|| data_dir().join("catalog.db"));
    tracing::debug!("opening catalog database {}", path.display());
    Store::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

fn load_index(store: &Store) -> Result<CatalogIndex> {
    let index = store.load_index().context("failed to load catalog")?;
    let stats = index.stats();
    if stats.orphan_links > 0 || stats.truncated_links > 0 {
        tracing::warn!(
            "catalog has {} orphan and {} truncated ingredient links",
            stats.orphan_links,
            stats.truncated_links
        );
    }
    Ok(index)
}

fn load_prefs(path: Option<&Path>) -> Result<Option<PreferenceProfile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let profile = mealdb_store::load_profile(path)
        .with_context(|| format!("failed to load preferences {}", path.display()))?;
    Ok(Some(profile))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Seed { path, replace } => cmd_seed(&cli, path, *replace),
        Commands::Search {
            text,
            category,
            area,
            ingredient,
            prefs,
            sort_name,
            json,
        } => {
            let mut query = RecipeQuery::new().text(text.as_str());
            query.category = category.clone();
            query.area = area.clone();
            query.ingredient = ingredient.clone();
            if *sort_name {
                query = query.sorted_by_name();
            }
            cmd_search(&cli, &query, prefs.as_deref(), *json)
        }
        Commands::Show { id, json, shopping } => cmd_show(&cli, id, *json, *shopping),
        Commands::Recommend {
            count,
            prefs,
            seed,
            json,
        } => cmd_recommend(&cli, *count, prefs.as_deref(), *seed, *json),
        Commands::Facets {
            kind,
            query,
            selected,
        } => cmd_facets(&cli, *kind, query.as_deref(), selected),
        Commands::Stats => cmd_stats(&cli),
    }
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let server = server::MealServer::new(store).context("failed to load catalog")?;
    tracing::info!("starting MCP server");

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

fn cmd_seed(cli: &Cli, path: &Path, replace: bool) -> Result<()> {
    let data = mealdb_store::load_dataset_dir(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    if data.is_empty() {
        bail!("dataset {} contains no rows", path.display());
    }

    let store = open_store(cli)?;
    if replace {
        store.clear().context("failed to clear catalog")?;
    }
    let report = store.seed(&data).context("failed to seed catalog")?;
    store
        .set_metadata("seeded_from", &path.display().to_string())
        .context("failed to record dataset path")?;
    let counts = store.verify_seeded().context("seeded catalog failed verification")?;

    println!(
        "seeded {} meals, {} ingredients, {} links",
        report.meals, report.ingredients, report.links
    );
    println!(
        "database now holds {} meals, {} ingredients, {} links",
        counts.meals, counts.ingredients, counts.links
    );
    Ok(())
}

fn print_recipes(recipes: &[Recipe], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(recipes).context("failed to serialize recipes")?
        );
        return Ok(());
    }
    if recipes.is_empty() {
        println!("(no recipes found)");
        return Ok(());
    }
    for r in recipes {
        println!("{:>6}  {}  [{} / {}]", r.id_meal, r.name, r.category, r.area);
    }
    Ok(())
}

fn cmd_search(cli: &Cli, query: &RecipeQuery, prefs: Option<&Path>, json: bool) -> Result<()> {
    let profile = load_prefs(prefs)?;
    if query.is_blank() {
        return print_recipes(&[], json);
    }

    let store = open_store(cli)?;
    let index = load_index(&store)?;

    let recipes = QueryEngine::run(&index, query);
    let found = recipes.len();
    let recipes = apply_preferences(&index, recipes, profile.as_ref());
    tracing::debug!("search matched {found}, {} after preferences", recipes.len());

    print_recipes(&recipes, json)
}

fn cmd_show(cli: &Cli, id: &str, json: bool, shopping: bool) -> Result<()> {
    let store = open_store(cli)?;
    let index = load_index(&store)?;
    let recipe = get_recipe_by_id(&index, id)?;

    if shopping {
        let items = shopping_items(&recipe);
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("failed to serialize items")?
        );
        return Ok(());
    }
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recipe).context("failed to serialize recipe")?
        );
        return Ok(());
    }

    println!("{} (#{})", recipe.name, recipe.id_meal);
    println!("{} / {}", recipe.category, recipe.area);
    let tags = recipe.tag_list();
    if !tags.is_empty() {
        println!("tags: {}", tags.join(", "));
    }
    println!();
    println!("Ingredients:");
    for line in recipe.ingredient_lines() {
        println!("  - {line}");
    }
    println!();
    println!("Steps:");
    for (i, step) in recipe.steps().iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
    if let Some(url) = recipe.youtube.as_deref().filter(|u| !u.is_empty()) {
        println!();
        println!("video: {url}");
    }
    Ok(())
}

fn cmd_recommend(
    cli: &Cli,
    count: usize,
    prefs: Option<&Path>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let profile = load_prefs(prefs)?;
    let store = open_store(cli)?;
    let index = load_index(&store)?;

    let candidates = QueryEngine::run(&index, &RecipeQuery::new());
    let candidates = apply_preferences(&index, candidates, profile.as_ref());
    let picked = match seed {
        Some(seed) => sample_with(candidates, count, &mut SmallRng::seed_from_u64(seed)),
        None => sample(candidates, count),
    };

    print_recipes(&picked, json)
}

fn cmd_facets(
    cli: &Cli,
    kind: Option<FacetKind>,
    query: Option<&str>,
    selected: &[String],
) -> Result<()> {
    let store = open_store(cli)?;
    let index = load_index(&store)?;

    let Some(kind) = kind else {
        if query.is_some() {
            bail!("--query requires --kind");
        }
        println!("categories:  {}", index.categories().join(", "));
        println!("areas:       {}", index.areas().join(", "));
        println!("ingredients: {}", index.ingredient_display_names().len());
        return Ok(());
    };

    let candidates = match kind {
        FacetKind::Category => index.categories(),
        FacetKind::Area => index.areas(),
        FacetKind::Ingredient => index.ingredient_display_names(),
    };

    let values = match (query, kind) {
        (Some(q), _) => suggest(&candidates, q, selected, SUGGESTION_LIMIT),
        (None, FacetKind::Ingredient) => ingredient_examples(&candidates, selected),
        (None, _) => examples(&candidates, selected, EXAMPLE_LIMIT),
    };
    for v in values {
        println!("{v}");
    }
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let counts = store.counts().context("failed to count rows")?;
    let index = load_index(&store)?;
    let stats = index.stats();

    println!("meals:       {}", counts.meals);
    println!("ingredients: {}", counts.ingredients);
    println!("links:       {}", counts.links);
    println!("unresolved:  {}", stats.unresolved_links);
    println!("orphaned:    {}", stats.orphan_links);
    println!("truncated:   {}", stats.truncated_links);
    println!("categories:  {}", index.categories().len());
    println!("areas:       {}", index.areas().len());
    if let Some(source) = store.get_metadata("seeded_from")? {
        println!("source:      {source}");
    }
    Ok(())
}
