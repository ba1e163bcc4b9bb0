//! Catalog RAG command-line interface
//!
//! Run with: cargo run -p catalog-rag --bin catalog-rag-cli -- \
//!     --data products.json ask --question "What bikes do you have?"

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_rag::catalog;
use catalog_rag::config::RagConfig;
use catalog_rag::generation::{ContextAssembler, RagOrchestrator};
use catalog_rag::indexing::{ReconcileObserver, VectorIndexReconciler};
use catalog_rag::providers::{CollectionStore, MemoryStore, OllamaClient, OllamaProvider};
use catalog_rag::retrieval::VectorSearchEngine;
use catalog_rag::EmbeddingGenerator;

#[derive(Parser)]
#[command(name = "catalog-rag", version, about = "Catalog Q&A with vector retrieval")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a JSON catalog file (array of records)
    #[arg(long)]
    data: PathBuf,

    /// Collection name
    #[arg(long, default_value = "products")]
    collection: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Backfill embeddings and ensure the vector index exists
    Reconcile,
    /// Run a top-k similarity search
    Search {
        /// Query text
        #[arg(long)]
        query: String,
        /// Number of results
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: usize,
    },
    /// Ask a question grounded in the catalog
    Ask {
        /// The question
        #[arg(long)]
        question: String,
        /// Number of records to ground the answer in
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

/// Reconcile observer that drives an indicatif progress bar
struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")?.progress_chars("=> "),
        );
        bar.set_message("Embedding records");
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ReconcileObserver for ProgressBarObserver {
    fn on_progress(&self, processed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(processed as u64);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RagConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - Chat model: {}", config.llm.chat_model);
    tracing::info!("  - Index: {} ({:?})", config.index.name, config.index.metric);

    // Check Ollama availability up front
    let client = OllamaClient::new(&config.llm)?;
    if !client.health_check().await? {
        tracing::warn!("Ollama not available at {}", config.llm.base_url);
        tracing::warn!("Start it with: ollama serve");
        tracing::warn!(
            "Then pull models: ollama pull {} && ollama pull {}",
            config.llm.embed_model,
            config.llm.chat_model
        );
    }

    // Load the catalog into the in-process store
    let store = Arc::new(MemoryStore::new());
    let raw = std::fs::read_to_string(&cli.data)
        .with_context(|| format!("failed to read catalog from {}", cli.data.display()))?;
    let records = catalog::parse_catalog(&raw)?;
    catalog::load_catalog(store.as_ref(), &cli.collection, records, false).await?;

    // Wire providers
    let provider = OllamaProvider::new(&config.llm, config.embeddings.dimensions)?;
    let (ollama_embedder, ollama_completion) = provider.split();
    let embedder = Arc::new(EmbeddingGenerator::new(Arc::new(ollama_embedder)));
    let descriptor = config.index_descriptor();
    let store: Arc<dyn CollectionStore> = store;

    // The in-process store starts cold every run, so search/ask reconcile first
    let observer = Arc::new(ProgressBarObserver::new()?);
    let reconciler = VectorIndexReconciler::new(
        Arc::clone(&store),
        Arc::clone(&embedder),
        descriptor.clone(),
        config.reconcile.clone(),
    )
    .with_observer(Arc::clone(&observer) as Arc<dyn ReconcileObserver>);

    let report = reconciler.reconcile(&cli.collection).await?;
    observer.finish();
    tracing::info!(
        "Reconciled '{}': {} of {} records embedded, index {}",
        cli.collection,
        report.embedded,
        report.total_records,
        if report.index_created { "created" } else { "already present" }
    );

    match cli.command {
        Command::Reconcile => {
            if !report.skipped_ids.is_empty() {
                println!("Skipped records: {}", report.skipped_ids.join(", "));
            }
            println!(
                "{} embedded, {} written ({} modified, {} upserted)",
                report.embedded,
                report.write_summary.total(),
                report.write_summary.modified,
                report.write_summary.upserted
            );
        }
        Command::Search { query, top_k } => {
            let engine = VectorSearchEngine::new(store, embedder, descriptor)
                .with_embeddings(config.retrieval.keep_embeddings);
            let results = engine.search(&cli.collection, &query, top_k).await?;
            for result in results {
                println!(
                    "{:.4}  {}",
                    result.score,
                    serde_json::to_string(&result.record)?
                );
            }
        }
        Command::Ask { question, top_k } => {
            let engine = VectorSearchEngine::new(store, embedder, descriptor);
            let orchestrator = RagOrchestrator::new(
                engine,
                ContextAssembler::new(config.persona.clone()),
                Arc::new(ollama_completion),
                &config.retrieval,
            );
            let answer = match top_k {
                Some(k) => orchestrator.answer_top_k(&cli.collection, &question, k).await?,
                None => orchestrator.answer(&cli.collection, &question).await?,
            };
            println!("{}", answer);
        }
    }

    Ok(())
}
