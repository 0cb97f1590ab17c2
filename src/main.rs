use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hotelrag_engine::{
    Embedder, EngineConfig, EngineContext, Generator, HashingEmbedder, OllamaConfig,
    OllamaEmbedder, OllamaModel, QueryEngine,
};
use hotelrag_storage::Dataset;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Answer questions about hotel bookings and report booking analytics
#[derive(Parser, Debug)]
#[command(name = "hotelrag")]
#[command(about = "Hotel booking question answering over a precomputed index", long_about = None)]
struct Args {
    /// Row store file (JSON lines or JSON array)
    #[arg(long, env = "HOTELRAG_ROWS", default_value = "./data/hotel_rows.jsonl")]
    rows: PathBuf,

    /// Index snapshot aligned with the row store
    #[arg(long, env = "HOTELRAG_INDEX", default_value = "./data/hotel.index")]
    index: PathBuf,

    /// Optional JSON engine config (top_k, max_output_tokens, ...)
    #[arg(long, env = "HOTELRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Embedding model used for queries; must match the one that built the index
    #[arg(long, value_enum, default_value_t = EmbedderChoice::Hashing)]
    embedder: EmbedderChoice,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_URL", default_value = "http://127.0.0.1:11434")]
    ollama_url: String,

    /// Completion model name
    #[arg(long, default_value = "phi")]
    model: String,

    /// Embedding model name when --embedder=ollama
    #[arg(long, default_value = "all-minilm")]
    embedding_model: String,

    /// Embedding dimension when --embedder=ollama
    #[arg(long, default_value_t = 384)]
    embedding_dim: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a question from the retrieved bookings
    Ask {
        query: String,
    },
    /// Print revenue, cancellation rate and average lead time
    Analytics,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EmbedderChoice {
    Hashing,
    Ollama,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting hotelrag v{}", env!("CARGO_PKG_VERSION"));
    info!("Row store: {:?}", args.rows);
    info!("Index: {:?}", args.index);

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    let ollama = OllamaConfig {
        base_url: args.ollama_url.clone(),
        model: args.model.clone(),
        embedding_model: args.embedding_model.clone(),
        embedding_dim: args.embedding_dim,
        ..OllamaConfig::default()
    };

    // Startup failures end the process here; nothing is served half-loaded.
    let dataset = Dataset::load(&args.rows, &args.index).context("loading dataset")?;

    let embedder: Box<dyn Embedder> = match args.embedder {
        EmbedderChoice::Hashing => Box::new(HashingEmbedder::new(dataset.index.dim())?),
        EmbedderChoice::Ollama => Box::new(OllamaEmbedder::new(&ollama)?),
    };
    let generator = Generator::new(Box::new(OllamaModel::new(&ollama)?));

    let context = EngineContext::new(dataset, embedder, generator).context("building engine")?;
    let engine = QueryEngine::new(Arc::new(context), config)?;

    match args.command {
        Command::Analytics => {
            println!("{}", serde_json::to_string_pretty(&engine.analytics())?);
        }
        Command::Ask { query } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(engine.ask(query));
            drop(runtime);

            match outcome {
                Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
                Err(failure) => {
                    println!("{}", serde_json::to_string_pretty(&failure)?);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
