use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use agentic_rag::core::config::{AppPaths, ConfigService};
use agentic_rag::core::logging;
use agentic_rag::rag::INDEX_FILE;
use agentic_rag::AppState;

#[derive(Parser, Debug)]
#[command(version, about = "Agentic retrieval-augmented question answering", long_about = None)]
struct Args {
    /// Data directory (config, logs, default index location); overrides RAG_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load sources, build the index and save it
    Ingest {
        /// URL, PDF directory or .txt file; repeatable. Defaults to the configured sources
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Index directory
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Answer a question from the index, falling back to Wikipedia
    Ask {
        question: String,
        /// Index directory; built from the sources first if it does not exist
        #[arg(long)]
        index: Option<PathBuf>,
        /// Sources used when no saved index is found
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Print the retrieved chunks after the answer
        #[arg(long)]
        show_sources: bool,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let paths = Arc::new(match &args.data_dir {
        Some(dir) => AppPaths::with_data_dir(dir),
        None => AppPaths::new(),
    });
    logging::init(&paths);

    match args.command {
        Commands::Config => {
            let service = ConfigService::new(paths.clone());
            let raw = service.load_raw();
            let shown = service.redact_sensitive_values(&raw);
            println!(
                "# {}\n{}",
                service.config_path().display(),
                serde_yaml::to_string(&shown).context("Failed to render config")?
            );
        }
        Commands::Ingest { sources, index } => {
            let state = AppState::with_paths(paths).context("Failed to initialize")?;
            let index_dir = index.unwrap_or_else(|| state.index_dir());

            let count = state.ingest(&sources).await.context("Failed to build index")?;
            state
                .save_index(&index_dir)
                .await
                .with_context(|| format!("Failed to save index to {}", index_dir.display()))?;
            println!("Indexed {} chunk(s) into {}", count, index_dir.display());
        }
        Commands::Ask {
            question,
            index,
            sources,
            show_sources,
        } => {
            let state = AppState::with_paths(paths).context("Failed to initialize")?;
            let index_dir = index.unwrap_or_else(|| state.index_dir());

            if index_dir.join(INDEX_FILE).is_file() {
                state
                    .load_index(&index_dir)
                    .await
                    .with_context(|| format!("Failed to load index from {}", index_dir.display()))?;
            } else {
                tracing::info!("No index at {}, ingesting sources", index_dir.display());
                state.ingest(&sources).await.context("Failed to build index")?;
            }

            let result = state.ask(&question).await.context("Failed to answer")?;
            println!("{}", result.answer);

            if show_sources {
                for (i, doc) in result.retrieved_docs.iter().enumerate() {
                    let preview: String = doc.content.chars().take(200).collect();
                    println!("\n[{}] {}\n{}", i + 1, doc.source(), preview);
                }
            }
        }
    }

    Ok(())
}
