use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fmshard::index::IndexConfig;
use fmshard::shard::{BuildOptions, build_shards};
use fmshard::{Engine, EngineConfig, LoadMode, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fmshard")]
#[command(about = "Sharded FM-index substring search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log: String,
}

/// Which shards to open
#[derive(Args)]
struct IndexArgs {
    /// Engine configuration file (JSON)
    #[arg(short, long, conflicts_with = "index")]
    config: Option<PathBuf>,

    /// Index name inside a configuration file with several indexes
    #[arg(long, requires = "config")]
    name: Option<String>,

    /// Shard directories, in shard order
    #[arg(short, long, num_args = 1..)]
    index: Vec<PathBuf>,

    /// Read shard files into memory instead of mapping them
    #[arg(long)]
    load_to_ram: bool,

    /// Skip loading metadata
    #[arg(long)]
    no_metadata: bool,

    /// Split long extractions across threads
    #[arg(long)]
    parallel_extract: bool,
}

impl IndexArgs {
    fn open(&self) -> Result<Engine> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file_named(path, self.name.as_deref())
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => EngineConfig::new(
                self.index.clone(),
                LoadMode::from_load_to_ram(self.load_to_ram),
                !self.no_metadata,
            ),
        };
        if self.load_to_ram {
            config.load_mode = LoadMode::Resident;
        }
        if self.no_metadata {
            config.get_metadata = false;
        }
        config.parallel_extract |= self.parallel_extract;

        Engine::open(&config).context("Failed to open index")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build shards from JSONL documents
    Build {
        /// JSONL file, or directory searched for *.jsonl files
        input: PathBuf,

        /// Output directory for shard_NNNN directories and fmshard.json
        out_dir: PathBuf,

        /// Start a new shard after this many text bytes
        #[arg(long, default_value_t = 1 << 30)]
        shard_size: u64,

        /// Suffix array sampling step
        #[arg(long, default_value_t = 32)]
        sample_step: u64,

        /// Skip malformed lines instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Show occurrence segments per shard
    Find {
        query: String,

        #[command(flatten)]
        index: IndexArgs,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Count occurrences
    Count {
        query: String,

        #[command(flatten)]
        index: IndexArgs,
    },
    /// Show the context window around a rank of one shard
    Doc {
        shard: usize,
        rank: u64,

        #[arg(long, default_value_t = 0)]
        needle_len: u64,

        #[arg(long, default_value_t = 100)]
        max_ctx_len: u64,

        #[command(flatten)]
        index: IndexArgs,

        /// Print JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show the context window around the n-th occurrence of a query
    Locate {
        query: String,

        /// Occurrence index, counted across all shards
        #[arg(default_value_t = 0)]
        occ: u64,

        #[arg(long, default_value_t = 100)]
        max_ctx_len: u64,

        #[command(flatten)]
        index: IndexArgs,

        /// Print JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show shard statistics
    Stats {
        #[command(flatten)]
        index: IndexArgs,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Commands::Build {
            input,
            out_dir,
            shard_size,
            sample_step,
            skip_invalid,
        } => {
            if sample_step == 0 {
                anyhow::bail!("--sample-step must be positive");
            }
            let options = BuildOptions {
                shard_size,
                index: IndexConfig { sample_step },
                skip_invalid,
            };
            let report = build_shards(&input, &out_dir, &options)?;
            println!(
                "Built {} shards with {} documents in {}",
                report.shard_dirs.len(),
                report.doc_count,
                out_dir.display()
            );
            if report.skipped > 0 {
                println!("Skipped {} invalid lines", report.skipped);
            }
        }
        Commands::Find { query, index, json } => {
            let engine = index.open()?;
            let found = engine.find(query.as_bytes());
            if json {
                print_json(&found)?;
            } else {
                output::print_find(&found, true)?;
            }
        }
        Commands::Count { query, index } => {
            let engine = index.open()?;
            println!("{}", engine.count(query.as_bytes()));
        }
        Commands::Doc {
            shard,
            rank,
            needle_len,
            max_ctx_len,
            index,
            json,
            no_color,
        } => {
            let engine = index.open()?;
            let doc = engine.get_doc_by_rank(shard, rank, needle_len, max_ctx_len)?;
            if json {
                print_json(&doc)?;
            } else {
                output::print_doc_at(&doc, needle_len, !no_color)?;
            }
        }
        Commands::Locate {
            query,
            occ,
            max_ctx_len,
            index,
            json,
            no_color,
        } => {
            let engine = index.open()?;
            let doc = engine.get_doc_by_occurrence(query.as_bytes(), occ, max_ctx_len)?;
            if json {
                print_json(&doc)?;
            } else {
                output::print_doc(&doc, query.as_bytes(), !no_color)?;
            }
        }
        Commands::Stats { index, json } => {
            let engine = index.open()?;
            let stats = engine.stats();
            if json {
                print_json(&stats)?;
            } else {
                output::print_stats(&stats)?;
            }
        }
    }

    Ok(())
}
