//! conceptmap CLI: topic analysis and evidence queries over extracted text.
//!
//! Usage:
//!   conceptmap analyze --input documents.json [--config config.yaml] [--relationships judgments.json]
//!   conceptmap query --input documents.json --topic <name> [--with <name>] [-k N]

use clap::{Parser, Subcommand};
use conceptmap::{
    AnalysisBundle, AnalysisInput, AnalysisPipeline, ConceptMapConfig, ConnectionEvidence,
    DocumentSet, Embedder, HashingEmbedder, RelationshipJudgment,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "conceptmap",
    version,
    about = "Topic importance, concept graphs and evidence retrieval for course material"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML configuration file (default: ~/.config/conceptmap/config.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank topics and build the concept graph; prints the bundle as JSON
    Analyze {
        /// Documents JSON (`{"documents": [...]}`)
        #[arg(long)]
        input: PathBuf,
        /// Parent→child judgments JSON (`[{"parent": ..., "child": ...}]`)
        #[arg(long)]
        relationships: Option<PathBuf>,
    },
    /// Retrieve evidence for a topic, or for the connection between two
    Query {
        /// Documents JSON (`{"documents": [...]}`)
        #[arg(long)]
        input: PathBuf,
        /// Topic to find evidence for
        #[arg(long)]
        topic: String,
        /// Second topic; switches to a pairwise query
        #[arg(long)]
        with: Option<String>,
        /// Number of snippets (default from configuration)
        #[arg(short)]
        k: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .init();
}

#[cfg(feature = "embeddings")]
fn open_embedder() -> Arc<dyn Embedder> {
    match conceptmap::FastEmbedEmbedder::default_model() {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::warn!(error = %e, "fastembed unavailable, using hashing embedder");
            Arc::new(HashingEmbedder::default())
        }
    }
}

#[cfg(not(feature = "embeddings"))]
fn open_embedder() -> Arc<dyn Embedder> {
    Arc::new(HashingEmbedder::default())
}

fn open_pipeline(config: Option<&Path>) -> Result<AnalysisPipeline, String> {
    let config =
        ConceptMapConfig::load(config).map_err(|e| format!("Failed to load configuration: {}", e))?;
    AnalysisPipeline::new(config, open_embedder()).map_err(|e| e.to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

fn analyze_file(
    pipeline: &AnalysisPipeline,
    input: &Path,
    relationships: Option<&Path>,
) -> Result<AnalysisBundle, String> {
    let documents: DocumentSet = read_json(input)?;
    let relationships: Vec<RelationshipJudgment> = match relationships {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let input = AnalysisInput::new(documents).with_relationships(relationships);
    pipeline.analyze(&input).map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_analyze(pipeline: &AnalysisPipeline, input: &Path, relationships: Option<&Path>) -> i32 {
    match analyze_file(pipeline, input, relationships) {
        Ok(bundle) => print_json(&bundle),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_query(
    pipeline: &AnalysisPipeline,
    input: &Path,
    topic: &str,
    with: Option<&str>,
    k: Option<usize>,
) -> i32 {
    let bundle = match analyze_file(pipeline, input, None) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let retriever = pipeline.retriever(&bundle);
    let k = k.unwrap_or_else(|| retriever.default_k());

    match with {
        None => match retriever.retrieve(topic, k) {
            Ok(snippets) if snippets.is_empty() => {
                println!("No evidence found for '{}'", topic);
                0
            }
            Ok(snippets) => print_json(&snippets),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Some(other) => match retriever.retrieve_pair(topic, other, k) {
            Ok(ConnectionEvidence::NoSharedEvidence) => {
                println!("No shared evidence between '{}' and '{}'", topic, other);
                0
            }
            Ok(evidence) => print_json(&evidence),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pipeline = match open_pipeline(cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Analyze {
            input,
            relationships,
        } => cmd_analyze(&pipeline, &input, relationships.as_deref()),
        Commands::Query {
            input,
            topic,
            with,
            k,
        } => cmd_query(&pipeline, &input, &topic, with.as_deref(), k),
    };
    std::process::exit(code);
}
