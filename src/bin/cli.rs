//! CLI binary for dentfaq.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dentfaq::{AppConfig, Locale, SearchOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// dentfaq: bilingual dental FAQ lookup.
#[derive(Parser)]
#[command(name = "dentfaq", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Corpus directory, overriding the config file.
    #[arg(long)]
    corpus_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Answer a question and print the result as JSON.
    Search {
        /// Free-text question.
        query: String,

        /// Locale to search first (en or zh).
        #[arg(short, long)]
        locale: Option<Locale>,

        /// Maximum number of hits (never more than the configured cap).
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Only consider entries carrying this tag. Repeatable.
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Load both corpora and print their entry counts.
    Warm,

    /// Write the default configuration to the config path.
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dentfaq=info,dentfaq_search=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);

    match cli.command {
        Command::InitConfig => init_config(&config_path),
        Command::Search {
            query,
            locale,
            limit,
            tags,
        } => {
            let config = load_config(&config_path, cli.config.is_some(), cli.corpus_dir)?;
            let kb = dentfaq::open_knowledge_base(&config)?;
            let locale = locale.unwrap_or(config.corpus.default_locale);
            let options = SearchOptions {
                tags: tags.into_iter().collect::<HashSet<_>>(),
                limit,
            };
            let result = kb.search(locale, &query, &options).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Warm => {
            let config = load_config(&config_path, cli.config.is_some(), cli.corpus_dir)?;
            let kb = dentfaq::open_knowledge_base(&config)?;
            for (locale, count) in dentfaq::warm_up(&kb).await? {
                println!("{locale}: {count} entries");
            }
            Ok(())
        }
    }
}

/// Read the config file, or use defaults when the implicit path is absent.
/// An explicitly named file must exist.
fn load_config(
    path: &Path,
    explicit: bool,
    corpus_dir: Option<PathBuf>,
) -> anyhow::Result<AppConfig> {
    let mut config = if path.exists() {
        AppConfig::from_file(path)?
    } else if explicit {
        anyhow::bail!("config file not found: {}", path.display());
    } else {
        AppConfig::default()
    };
    if let Some(dir) = corpus_dir {
        config.corpus.dir = dir;
    }
    Ok(config)
}

fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing config: {}", path.display());
    }
    AppConfig::default().save_to_file(path)?;
    info!(path = %path.display(), "wrote default config");
    println!("{}", path.display());
    Ok(())
}
