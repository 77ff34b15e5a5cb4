use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docdb_core::config::{resolve_with_base, Config, Settings};
use docdb_core::scanner::FsSource;
use docdb_core::types::Category;
use docdb_service::request::{
    ContentFormat, ContentParams, ListParams, OverviewParams, SearchParams, SortBy, SuggestParams, ViewType,
};
use docdb_service::sync::{corpus_version, ensure_corpus};
use docdb_service::{Corpus, DocService};
use docdb_suggest::SuggestionKind;

#[derive(Parser)]
#[command(name = "docdb")]
#[command(about = "Search and browse a local markdown documentation corpus", long_about = None)]
struct Cli {
    /// Corpus root; overrides `corpus.root` from configuration
    #[arg(long, global = true, env = "DOCDB_ROOT")]
    root: Option<String>,

    /// Clone the corpus when missing and refresh it before loading
    #[arg(long, global = true)]
    sync: bool,

    /// Show a progress bar while the corpus is indexed
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ranked search over titles, descriptions, keywords and content
    Search {
        query: String,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        max_results: Option<usize>,
        #[arg(long)]
        min_confidence: Option<f64>,
    },
    /// Category overview, document map or navigation tree
    Overview {
        category: Category,
        #[arg(long, value_enum, default_value_t = View::Overview)]
        view: View,
        #[arg(long)]
        max_items: Option<usize>,
        /// Tree depth, 0 for unlimited
        #[arg(long)]
        level: Option<usize>,
    },
    /// Tables of subcategories, directories or documents
    List {
        category: Category,
        /// Path below the category, e.g. `std/collection`
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = Sort::Title)]
        sort_by: Sort,
        #[arg(long)]
        preview: bool,
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Print one document or one of its sections
    Content {
        doc_id: String,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        #[arg(long)]
        no_metadata: bool,
        /// Heading prefix such as `2.1`
        #[arg(long)]
        section: Option<String>,
    },
    /// Learning path, related documents or prerequisites for a context
    Suggest {
        context: String,
        /// learning_path, related or prerequisite
        #[arg(long = "type", default_value = "related")]
        kind: SuggestionKind,
        #[arg(long)]
        max: Option<usize>,
    },
    /// Corpus counts after indexing
    Stats,
    /// Tool and corpus versions
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Overview,
    Map,
    Navigation,
    Tree,
}

impl From<View> for ViewType {
    fn from(v: View) -> Self {
        match v {
            View::Overview => ViewType::Overview,
            View::Map => ViewType::Map,
            View::Navigation => ViewType::Navigation,
            View::Tree => ViewType::Tree,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Sort {
    Title,
    Difficulty,
    LastModified,
}

impl From<Sort> for SortBy {
    fn from(s: Sort) -> Self {
        match s {
            Sort::Title => SortBy::Title,
            Sort::Difficulty => SortBy::Difficulty,
            Sort::LastModified => SortBy::LastModified,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
    Plain,
}

impl From<Format> for ContentFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Markdown => ContentFormat::Markdown,
            Format::Json => ContentFormat::Json,
            Format::Plain => ContentFormat::Plain,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(env::var("RUST_LOG").ok()))
        .init();

    let cli = Cli::parse();
    let settings = Config::load()?.settings()?;
    let root = corpus_root(&cli, &settings)?;

    if cli.sync {
        ensure_corpus(&root, &settings.corpus.repo_url, true).context("corpus sync failed")?;
    } else if settings.corpus.auto_update || !root.exists() {
        ensure_corpus(&root, &settings.corpus.repo_url, settings.corpus.auto_update)?;
    }

    if let Command::Version = cli.command {
        println!("docdb {}", env!("CARGO_PKG_VERSION"));
        println!("corpus: {}", corpus_version(&root).unwrap_or_else(|| "unknown".to_string()));
        return Ok(());
    }

    info!(root = %root.display(), "loading corpus");
    let source = FsSource::new(&root);
    let corpus = if cli.progress {
        Corpus::build_with_progress(&source, &settings)
    } else {
        Corpus::build(&source, &settings)
    }
    .with_context(|| format!("failed to load corpus from {}", root.display()))?;
    let service = DocService::new(corpus, settings);

    match cli.command {
        Command::Search { query, category, max_results, min_confidence } => {
            let params = SearchParams { query, category, max_results, min_confidence };
            print_json(&service.search(&params)?)?;
        }
        Command::Overview { category, view, max_items, level } => {
            let params = OverviewParams { category, view_type: view.into(), max_items, level };
            println!("{}", service.get_overview(&params)?);
        }
        Command::List { category, path, sort_by, preview, max_items } => {
            let params = ListParams { category, subcategory: path, sort_by: sort_by.into(), include_preview: preview, max_items };
            println!("{}", service.list_documents(&params)?);
        }
        Command::Content { doc_id, format, no_metadata, section } => {
            let params = ContentParams { doc_id, include_metadata: !no_metadata, format: format.into(), section };
            println!("{}", service.get_content(&params)?);
        }
        Command::Suggest { context, kind, max } => {
            let params = SuggestParams { context, kind, max_suggestions: max };
            print_json(&service.suggest(&params)?)?;
        }
        Command::Stats => print_json(&service.stats())?,
        Command::Version => {}
    }
    Ok(())
}

fn corpus_root(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match cli.root.as_deref() {
        Some(root) => {
            let cwd = env::current_dir().context("failed to read current directory")?;
            Ok(resolve_with_base(&cwd, root))
        }
        None => Ok(settings.corpus.root_path()),
    }
}

/// `RUST_LOG` directives when present and valid, `info` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some(" ".into())).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(log_filter(Some("warn".into())).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("debug".into())).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
