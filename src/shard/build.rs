//! Corpus ingestion
//!
//! Turns JSONL files into shard directories. Each line is a JSON object with
//! a `text` field; every other field is kept as the document's metadata,
//! stored as `{"path": ..., "linenum": ..., "metadata": {...}}`.
//!
//! Documents are appended to the current shard until its text reaches
//! `shard_size`, then the shard is written and a new one started.

use super::writer::ShardWriter;
use crate::config::{EngineConfig, LoadMode};
use crate::index::types::IndexConfig;
use crate::utils::file_progress;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Name of the engine configuration written next to the shards
pub const CONFIG_FILE: &str = "fmshard.json";

/// Options for building shards from a corpus
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Start a new shard once the current one holds this many text bytes
    pub shard_size: u64,
    /// Index configuration for every shard
    pub index: IndexConfig,
    /// Skip lines that fail to parse instead of aborting
    pub skip_invalid: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            shard_size: 1 << 30, // 1GB
            index: IndexConfig::default(),
            skip_invalid: false,
        }
    }
}

/// Result of a corpus build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub shard_dirs: Vec<PathBuf>,
    pub doc_count: u64,
    pub skipped: u64,
}

/// Collect JSONL input files: `input` itself, or every `*.jsonl` below it
pub fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input path {} does not exist", input.display());
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(input)
        .hidden(false)
        .git_ignore(false)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jsonl"))
        .collect();
    files.sort();
    Ok(files)
}

/// Split one JSONL line into document text and metadata record
pub fn parse_line(line: &str, rel_path: &str, linenum: u64) -> Result<(String, Vec<u8>)> {
    let mut object: Map<String, Value> =
        serde_json::from_str(line).context("Line is not a JSON object")?;
    let text = match object.remove("text") {
        Some(Value::String(text)) => text,
        Some(_) => anyhow::bail!("Field 'text' is not a string"),
        None => anyhow::bail!("Missing field 'text'"),
    };
    let meta = json!({
        "path": rel_path,
        "linenum": linenum,
        "metadata": Value::Object(object),
    });
    Ok((text, serde_json::to_vec(&meta)?))
}

/// Build shard directories `out_dir/shard_NNNN` from a JSONL corpus
pub fn build_shards(input: &Path, out_dir: &Path, options: &BuildOptions) -> Result<BuildReport> {
    let files = collect_input_files(input)?;
    if files.is_empty() {
        anyhow::bail!("No .jsonl files found under {}", input.display());
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let pb = file_progress(files.len() as u64);

    let mut report = BuildReport {
        shard_dirs: Vec::new(),
        doc_count: 0,
        skipped: 0,
    };
    let mut writer = ShardWriter::new(options.index.clone());

    for path in &files {
        let rel_path = path
            .strip_prefix(input)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let reader = BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        );

        for (linenum, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = parse_line(&line, &rel_path, linenum as u64)
                .and_then(|(text, meta)| Ok(writer.add_document(text.as_bytes(), &meta)?));
            if let Err(e) = parsed {
                if options.skip_invalid {
                    tracing::warn!(path = %rel_path, linenum, error = %e, "skipping document");
                    report.skipped += 1;
                    continue;
                }
                return Err(e.context(format!("{}:{}", rel_path, linenum + 1)));
            }
            report.doc_count += 1;

            if writer.text_len() as u64 >= options.shard_size {
                flush_shard(&mut writer, out_dir, options, &mut report)?;
            }
        }

        pb.inc(1);
        pb.set_message(format!("{} shards", report.shard_dirs.len()));
    }

    if !writer.is_empty() {
        flush_shard(&mut writer, out_dir, options, &mut report)?;
    }
    pb.finish_and_clear();

    let config = EngineConfig::new(report.shard_dirs.clone(), LoadMode::Mapped, true);
    let config_path = out_dir.join(CONFIG_FILE);
    serde_json::to_writer_pretty(File::create(&config_path)?, &config)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    tracing::info!(
        shards = report.shard_dirs.len(),
        docs = report.doc_count,
        skipped = report.skipped,
        "corpus build finished"
    );
    Ok(report)
}

fn flush_shard(
    writer: &mut ShardWriter,
    out_dir: &Path,
    options: &BuildOptions,
    report: &mut BuildReport,
) -> Result<()> {
    let dir = out_dir.join(format!("shard_{:04}", report.shard_dirs.len()));
    let full = std::mem::replace(writer, ShardWriter::new(options.index.clone()));
    full.write(&dir)?;
    report.shard_dirs.push(dir);
    Ok(())
}
