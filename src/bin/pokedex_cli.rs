//! Pokedex Command Line Interface
//!
//! Terminal front end for the catalog: one-shot listing, detail pages and
//! favorite toggles, plus an interactive `browse` session.
//!
//! # Usage
//!
//! ```bash
//! # First page of the catalog
//! pokedex list
//!
//! # Every fire-type entity (category listings are not paged)
//! pokedex list --category fire
//!
//! # Detail page with evolution levels
//! pokedex show 25
//!
//! # Star / unstar an entity
//! pokedex favorite 25
//!
//! # Interactive list view
//! pokedex browse
//!
//! # Offline, against a JSON fixture catalog
//! pokedex --offline catalog.json browse
//! ```
//!
//! ## Environment Variables
//!
//! See `PokedexConfig`; `RUST_LOG` controls log output (default `warn`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use pokedex::catalog::visible_list;
use pokedex::{
    CatalogError, CatalogFetcher, CatalogSession, Category, DetailPage, DetailView,
    DispatchOutcome, EntityId, FavoritesStore, FileKeyValueStore, FixtureApi, HttpPokeApi,
    PokeApi, PokedexConfig, ViewEvent, ViewState, VisibleEntry,
};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(version)]
#[command(about = "Browse the PokeAPI catalog: pages, categories, favorites and evolution trees")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Serve the catalog from a JSON fixture file instead of the network
    #[arg(long, global = true, env = "POKEDEX_OFFLINE")]
    offline: Option<PathBuf>,

    /// Favorites store file (overrides POKEDEX_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Entries per page (overrides POKEDEX_PAGE_SIZE)
    #[arg(long, global = true)]
    page_size: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of the catalog, or a whole category
    List {
        /// Offset into the global list (ignored with --category)
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Category filter: fire, water, grass, ...
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Show the detail page for an id
    Show {
        /// Numeric id, e.g. 25
        id: String,
    },

    /// Toggle an id in the favorites set
    Favorite { id: EntityId },

    /// Show every favorite with its details
    Favorites,

    /// List the selectable categories
    Categories,

    /// Interactive list view
    Browse,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = PokedexConfig::from_env().context("Failed to load configuration")?;
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }
    if let Some(store) = cli.store {
        config = config.with_store_path(store);
    }
    config.validate()?;

    let api: Box<dyn PokeApi> = match &cli.offline {
        Some(path) => Box::new(
            FixtureApi::from_json_file(path)
                .with_context(|| format!("Failed to load fixture catalog {}", path.display()))?,
        ),
        None => Box::new(HttpPokeApi::new(&config)?),
    };
    let store = FileKeyValueStore::new(&config.store_path);

    match cli.command {
        Commands::List { offset, category } => {
            cmd_list(api.as_ref(), store, &config, offset, category, cli.format).await
        }
        Commands::Show { id } => cmd_show(api.as_ref(), &id, cli.format).await,
        Commands::Favorite { id } => cmd_favorite(store, id, cli.format),
        Commands::Favorites => cmd_favorites(api.as_ref(), store, &config, cli.format).await,
        Commands::Categories => cmd_categories(cli.format),
        Commands::Browse => cmd_browse(api, store, &config).await,
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn cmd_list(
    api: &dyn PokeApi,
    store: FileKeyValueStore,
    config: &PokedexConfig,
    offset: usize,
    category: Option<Category>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let favorites = FavoritesStore::new(store).load();
    let refs = CatalogFetcher::new(api)
        .fetch_page(offset, config.page_size, category)
        .await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "offset": if category.is_some() { 0 } else { offset },
                "category": category,
                "count": refs.len(),
                "results": refs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            let rows: Vec<VisibleEntry> = refs.into_iter().map(VisibleEntry::Ref).collect();
            let heading = match category {
                Some(c) => format!("{} ({} entries)", c.as_str().to_uppercase(), rows.len()),
                None => page_heading(offset, rows.len()),
            };
            println!("{}", heading.bold());
            print_rows(&rows, |id| favorites.contains(id));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_show(api: &dyn PokeApi, raw_id: &str, format: OutputFormat) -> Result<ExitCode> {
    match DetailView::new(api).open_route(raw_id).await {
        Ok(page) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
                OutputFormat::Pretty => print_detail(&page),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(CatalogError::NotFound { .. }) => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "error": "not_found", "id": raw_id }))
                }
                OutputFormat::Pretty => {
                    println!("{} No entity with id '{}'", "404".yellow().bold(), raw_id)
                }
            }
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_favorite(store: FileKeyValueStore, id: EntityId, format: OutputFormat) -> Result<ExitCode> {
    let favorites = FavoritesStore::new(store);
    let mut current = favorites.load();
    let now_favorite = favorites
        .toggle_and_persist(id, &mut current)
        .context("Failed to save favorites")?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "id": id, "favorite": now_favorite, "favorites": current })
        ),
        OutputFormat::Pretty => {
            if now_favorite {
                println!("{} {} added to favorites", "★".yellow(), id);
            } else {
                println!("{} {} removed from favorites", "☆".dimmed(), id);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_favorites(
    api: &dyn PokeApi,
    store: FileKeyValueStore,
    config: &PokedexConfig,
    format: OutputFormat,
) -> Result<ExitCode> {
    let favorites = FavoritesStore::new(store).load();
    let mut view = ViewState::new(config.page_size);
    view.begin(ViewEvent::ToggleFavoritesOnly);
    let rows = visible_list(api, &view, &favorites).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Pretty => {
            println!("{}", format!("favorites ({} of {})", rows.len(), favorites.len()).bold());
            print_rows(&rows, |_| true);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_categories(format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&Category::ALL)?),
        OutputFormat::Pretty => {
            let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
            println!("{}", names.join(" "));
        }
    }
    Ok(ExitCode::SUCCESS)
}

const BROWSE_HELP: &str = "\
commands:
  type <category>   show every member of a category
  all               back to the paged global list
  more              load the next page
  favs              toggle favorites-only view
  star <id>         toggle a favorite
  show <id>         detail page
  help              this text
  quit              leave";

async fn cmd_browse(
    api: Box<dyn PokeApi>,
    store: FileKeyValueStore,
    config: &PokedexConfig,
) -> Result<ExitCode> {
    let mut session = CatalogSession::start(api, store, config.page_size).await;
    render_session(&session).await;

    let mut editor = DefaultEditor::new()
        .map_err(|e| anyhow::anyhow!("Failed to start line editor: {}", e))?;
    loop {
        let line = match editor.readline("pokedex> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("Line editor failed: {}", e)),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line) {
            tracing::debug!(error = %e, "History entry not recorded");
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();

        let event = match (command, arg) {
            ("quit" | "exit" | "q", _) => break,
            ("help" | "?", _) => {
                println!("{}", BROWSE_HELP);
                continue;
            }
            ("type", Some(name)) => match name.parse::<Category>() {
                Ok(category) => ViewEvent::SelectCategory(category),
                Err(e) => {
                    println!("{} {}", "!".red(), e);
                    continue;
                }
            },
            ("all", _) => ViewEvent::ClearCategory,
            ("more", _) => ViewEvent::LoadMore,
            ("favs", _) => ViewEvent::ToggleFavoritesOnly,
            ("star", Some(raw)) => {
                match raw.parse::<EntityId>() {
                    Ok(id) => match session.toggle_favorite(id) {
                        Ok(true) => println!("{} {} added to favorites", "★".yellow(), id),
                        Ok(false) => println!("{} {} removed from favorites", "☆".dimmed(), id),
                        Err(e) => println!("{} {}", "!".red(), e),
                    },
                    Err(_) => println!("{} '{}' is not an id", "!".red(), raw),
                }
                continue;
            }
            ("show", Some(raw)) => {
                match DetailView::new(session.api()).open_route(raw).await {
                    Ok(page) => print_detail(&page),
                    Err(CatalogError::NotFound { .. }) => {
                        println!("{} No entity with id '{}'", "404".yellow().bold(), raw)
                    }
                    Err(e) => println!("{} {}", "!".red(), e),
                }
                continue;
            }
            _ => {
                println!("{} unknown command; try 'help'", "?".yellow());
                continue;
            }
        };

        match session.dispatch(event).await {
            DispatchOutcome::Ignored(reason) => println!("{} {}", "·".dimmed(), reason),
            DispatchOutcome::Fetched(pokedex::catalog::Completion::Failed) => {
                let reason = session.view().last_error().unwrap_or("unknown error");
                println!("{} fetch failed, list unchanged: {}", "!".red(), reason);
            }
            DispatchOutcome::Fetched(_) | DispatchOutcome::Updated => {
                render_session(&session).await
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// RENDERING
// =============================================================================

async fn render_session<A: PokeApi, S: pokedex::KeyValueStore>(session: &CatalogSession<A, S>) {
    let view = session.view();
    let rows = session.visible().await;

    let scope = if view.favorites_only() {
        "favorites".to_string()
    } else {
        match view.active_category() {
            Some(c) => format!("type {}", c),
            None => "all".to_string(),
        }
    };
    println!(
        "{} {} shown",
        format!("[{}]", scope).cyan().bold(),
        rows.len()
    );
    print_rows(&rows, |id| session.is_favorite(id));

    if view.active_category().is_none() && !view.favorites_only() && view.has_more() {
        println!("{}", "(more: load next page)".dimmed());
    }
}

/// Heading for a global page: 1-based inclusive range of the rows shown
fn page_heading(offset: usize, shown: usize) -> String {
    if shown == 0 {
        return format!("no entries at offset {}", offset);
    }
    format!(
        "entries {}..{}",
        offset.saturating_add(1),
        offset.saturating_add(shown)
    )
}

fn print_rows(rows: &[VisibleEntry], is_favorite: impl Fn(EntityId) -> bool) {
    for row in rows {
        let id = row.id().unwrap_or_default();
        let star = if is_favorite(id) {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        match row {
            VisibleEntry::Ref(r) => println!("{} {:>5}  {}", star, id, r.name),
            VisibleEntry::Detail(d) => println!(
                "{} {:>5}  {:<16} {}",
                star,
                id,
                d.name,
                d.types.join("/").dimmed()
            ),
        }
    }
}

fn print_detail(page: &DetailPage) {
    let d = &page.detail;
    println!("{}", d.name.to_uppercase().bold());
    println!("  {:<7} {}", "ID:".dimmed(), d.id);
    println!("  {:<7} {} m", "Height:".dimmed(), d.height_m());
    println!("  {:<7} {} kg", "Weight:".dimmed(), d.weight_kg());
    println!("  {:<7} {}", "Type:".dimmed(), d.types.join(", "));
    println!("  {:<7} {}", "Image:".dimmed(), d.image_url);

    if page.has_relationships() {
        let chain: Vec<String> = page
            .levels
            .iter()
            .map(|level| level.names().join(" / "))
            .collect();
        println!("  {:<7} {}", "Chain:".dimmed(), chain.join(" → "));
    } else {
        println!("  {:<7} {}", "Chain:".dimmed(), "no chain to show".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_heading_range() {
        assert_eq!(page_heading(0, 20), "entries 1..20");
        assert_eq!(page_heading(140, 11), "entries 141..151");
    }

    #[test]
    fn test_page_heading_past_end() {
        assert_eq!(page_heading(9999, 0), "no entries at offset 9999");
    }

    #[test]
    fn test_page_heading_huge_offset_does_not_overflow() {
        assert_eq!(
            page_heading(usize::MAX, 0),
            format!("no entries at offset {}", usize::MAX)
        );
        assert_eq!(
            page_heading(usize::MAX - 1, 3),
            format!("entries {}..{}", usize::MAX, usize::MAX)
        );
    }
}
