//! Admin CLI for the retrieval engine.
//!
//! Builds and inspects the per-corpus indexes that the `area-search` and
//! `first-aid-search` binaries answer from.

use anyhow::{Context, anyhow};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use refuge::config::CONFIG_DIR;
use refuge::display::{
    THEME, create_index_summary_table, create_progress_bar, create_results_table,
};
use refuge::logging::init_logging;
use refuge::semantic::snapshot_exists;
use refuge::{
    AssemblyArea, CorpusKind, CorpusProfile, FirstAidSection, SearchError, SearchService, Settings,
};
use std::path::PathBuf;
use std::time::Instant;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Disaster assembly area and first-aid retrieval
#[derive(Parser)]
#[command(
    name = "refuge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Semantic retrieval for assembly areas and first-aid knowledge",
    long_about = "Build, inspect and query the assembly area and first-aid indexes.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Examples:\n  refuge init\n  refuge index areas --progress\n  refuge search areas \"Kadıköy park\"\n  refuge search first-aid \"kanama\" --json"
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Set up .refuge directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Display active settings")]
    Config,

    #[command(about = "Build and save the index of a corpus")]
    Index {
        /// Corpus to index
        #[arg(value_enum)]
        corpus: CorpusKind,

        /// Rebuild even if a usable index exists
        #[arg(short, long)]
        force: bool,

        /// Show progress while encoding documents
        #[arg(short, long)]
        progress: bool,
    },

    #[command(about = "Query a corpus through its saved index")]
    Search {
        /// Corpus to query
        #[arg(value_enum)]
        corpus: CorpusKind,

        /// Free-text query
        query: String,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(config_path) => Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {e}",
                config_path.display()
            );
            std::process::exit(1);
        }),
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };

    init_logging("info", settings.debug || cli.debug);

    if let Err(e) = run(cli.command, &settings) {
        eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));

        if let Some(search_error) = e.downcast_ref::<SearchError>() {
            let suggestions = search_error.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }
        }

        std::process::exit(1);
    }
}

fn run(command: Commands, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| anyhow!("{e}"))?;
            println!(
                "{}",
                THEME.success_with_icon(&format!(
                    "Created configuration file at: {}",
                    path.display()
                ))
            );
            println!("Edit this file to customize your settings.");
            Ok(())
        }

        Commands::Config => {
            if !PathBuf::from(CONFIG_DIR).is_dir() {
                eprintln!(
                    "{}",
                    THEME.warning_with_icon("No .refuge directory found, showing defaults")
                );
            }
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(settings)?);
            Ok(())
        }

        Commands::Index {
            corpus,
            force,
            progress,
        } => match corpus {
            CorpusKind::Areas => index_corpus::<AssemblyArea>(settings, force, progress),
            CorpusKind::FirstAid => index_corpus::<FirstAidSection>(settings, force, progress),
        },

        Commands::Search {
            corpus,
            query,
            json,
        } => match corpus {
            CorpusKind::Areas => search_corpus::<AssemblyArea>(settings, &query, json),
            CorpusKind::FirstAid => search_corpus::<FirstAidSection>(settings, &query, json),
        },
    }
}

fn index_corpus<R: CorpusProfile>(
    settings: &Settings,
    force: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let mut service = SearchService::<R>::open(settings)
        .with_context(|| format!("Could not read the {} corpus", R::KIND))?;

    if !force && snapshot_exists(service.index_dir()) && service.load() {
        println!(
            "{}",
            THEME.warning_with_icon(&format!(
                "Index for {} already exists at {} ({} documents). Use --force to rebuild",
                R::KIND,
                service.index_dir().display(),
                service.index().size()
            ))
        );
        return Ok(());
    }

    let start = Instant::now();
    let documents = if progress {
        let total: usize = service.groups().iter().map(|g| g.items.len()).sum();
        let pb = create_progress_bar(total as u64, "Encoding documents");
        let documents = service.rebuild_with_progress(|done, _| pb.set_position(done as u64))?;
        pb.finish_and_clear();
        documents
    } else {
        service.rebuild()?
    };

    let index = service.index();
    let embedder = index
        .descriptor()
        .map_or_else(|| "-".to_string(), |d| d.label());
    println!(
        "{}",
        create_index_summary_table(
            R::KIND.name(),
            documents,
            index.dimension(),
            &embedder,
            &service.index_dir().display().to_string(),
            start.elapsed(),
        )
    );
    println!("{}", THEME.success_with_icon("Index saved"));
    Ok(())
}

fn search_corpus<R: CorpusProfile>(
    settings: &Settings,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let mut service = SearchService::<R>::open_lenient(settings);
    if !service.load() {
        eprintln!(
            "{}",
            THEME.warning_with_icon(&format!(
                "No usable index for {}; run `refuge index {}`. Using fallback search.",
                R::KIND,
                R::KIND
            ))
        );
    }

    let results = service.search(query);
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results for '{query}'");
    } else {
        println!("{}", create_results_table(&results));
    }
    Ok(())
}
