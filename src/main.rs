use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use scenar::{
    process, process_with_backend, read_document, AnthropicClient, AnthropicConfig, ChunkConfig,
    HumanDocument, MachineDocument, PipelineConfig, PipelineResult, RecordKind,
};

#[derive(Parser)]
#[command(name = "scenar")]
#[command(author, version, about = "Screenplay transcript segmentation and normalization pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a transcript into a normalized record list
    Process {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the machine-readable record list (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable rendering (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Character budget per chunk when no marker boundaries are found
        #[arg(long, default_value = "4000")]
        chunk_size: usize,

        /// Classify chunks with the Anthropic backend instead of the local
        /// classifier
        #[arg(long)]
        llm: bool,

        /// Episode tag to carry into the output metadata
        #[arg(long)]
        episode: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a transcript without writing output
    Analyze {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            human_readable,
            chunk_size,
            llm,
            episode,
            verbose,
        } => {
            setup_logging(verbose);
            process_document(input, output, human_readable, chunk_size, llm, episode).await
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze_document(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn process_document(
    input: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    chunk_size: usize,
    llm: bool,
    episode: Option<String>,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let document = read_document(&input).context("Failed to read input transcript")?;

    let config = PipelineConfig {
        chunk: ChunkConfig {
            target_size: chunk_size,
            ..Default::default()
        },
    };

    let result = if llm {
        info!("Classifying chunks with the Anthropic backend");
        let api_config = AnthropicConfig::from_env()?;
        let client = AnthropicClient::new(api_config);
        process_with_backend(&client, &document, &config).await
    } else {
        process(&document, &config)
    };

    info!(
        "Produced {} records across {} chunks ({} speakers known, {} segments)",
        result.records.len(),
        result.chunks_processed,
        result.registry.len(),
        result.segment_count
    );
    if result.chunks_degraded > 0 {
        info!(
            "{} chunks degraded to verbatim text records",
            result.chunks_degraded
        );
    }

    let machine = MachineDocument::from_result(&result, episode);
    machine.write_json(&output)?;
    info!("Output written to {:?}", output);

    if let Some(human_path) = human_readable {
        HumanDocument::new(&result.records).write_file(&human_path)?;
        info!("Human-readable output written to {:?}", human_path);
    }

    Ok(())
}

fn analyze_document(input: PathBuf) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let document = read_document(&input).context("Failed to read input transcript")?;
    let result = process(&document, &PipelineConfig::default());

    println!("Transcript Analysis");
    println!("===================");
    println!("Total records: {}", result.records.len());
    println!("Chunks: {}", result.chunks_processed);
    println!("Segments: {}", result.segment_count);
    println!();

    println!("Record Kinds");
    println!("------------");
    for kind in [
        RecordKind::Dialogue,
        RecordKind::SceneHeader,
        RecordKind::SegmentMarker,
        RecordKind::Text,
    ] {
        let count = result.records.iter().filter(|r| r.kind() == kind).count();
        println!("{}: {}", kind.as_str(), count);
    }
    println!();

    println!("Cast List");
    println!("---------");
    if result.registry.is_empty() {
        println!("No cast list found (generic speaker patterns were used)");
    } else {
        for name in result.registry.names() {
            println!("- {}", name);
        }
    }
    println!();

    println!("Dialogue by Speaker");
    println!("-------------------");
    for (speaker, count) in dialogue_counts(&result) {
        println!("{}: {} lines", speaker, count);
    }

    Ok(())
}

/// Dialogue line counts per speaker, alphabetical.
fn dialogue_counts(result: &PipelineResult) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in &result.records {
        if let Some(speaker) = record.speaker() {
            if !record.text().is_empty() {
                *counts.entry(speaker.to_string()).or_insert(0) += 1;
            }
        }
    }
    counts
}
