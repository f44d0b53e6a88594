//! Command line tests: build a corpus, then query it through the binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn fmshard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fmshard"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run fmshard")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "fmshard failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn build_corpus(root: &Path) -> String {
    let input = root.join("corpus.jsonl");
    fs::write(
        &input,
        concat!(
            "{\"text\": \"hello world\", \"source\": \"a\"}\n",
            "{\"text\": \"world peace\", \"source\": \"b\"}\n",
            "{\"text\": \"say hello\", \"source\": \"c\"}\n",
        ),
    )
    .unwrap();

    let out = root.join("index");
    stdout(&fmshard(&[
        "build",
        input.to_str().unwrap(),
        out.to_str().unwrap(),
        "--sample-step",
        "4",
    ]));
    out.join("fmshard.json").to_string_lossy().into_owned()
}

#[test]
fn test_build_then_count() {
    let temp_dir = tempdir().unwrap();
    let config = build_corpus(temp_dir.path());

    let out = stdout(&fmshard(&["count", "hello", "--config", &config]));
    assert_eq!(out.trim(), "2");

    let out = stdout(&fmshard(&["count", "missing", "--config", &config]));
    assert_eq!(out.trim(), "0");
}

#[test]
fn test_locate_json() {
    let temp_dir = tempdir().unwrap();
    let config = build_corpus(temp_dir.path());

    let out = stdout(&fmshard(&[
        "locate", "peace", "0", "--config", &config, "--json",
    ]));
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["doc_ix"], 1);
    assert_eq!(doc["text"], "world peace");

    let meta: serde_json::Value =
        serde_json::from_str(doc["metadata"].as_str().unwrap()).unwrap();
    assert_eq!(meta["linenum"], 1);
    assert_eq!(meta["metadata"]["source"], "b");
}

#[test]
fn test_locate_out_of_range_fails() {
    let temp_dir = tempdir().unwrap();
    let config = build_corpus(temp_dir.path());

    let output = fmshard(&["locate", "hello", "2", "--config", &config]);
    assert!(!output.status.success());
}

#[test]
fn test_stats_json() {
    let temp_dir = tempdir().unwrap();
    let config = build_corpus(temp_dir.path());

    let out = stdout(&fmshard(&["stats", "--config", &config, "--json"]));
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["doc_count"], 3);
    assert_eq!(stats["text_len"], 34);
    assert_eq!(stats["load_mode"], "mapped");
}

#[test]
fn test_doc_by_rank_plain() {
    let temp_dir = tempdir().unwrap();
    let config = build_corpus(temp_dir.path());

    let out = stdout(&fmshard(&["find", "peace", "--config", &config, "--json"]));
    let found: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rank = found["segment_by_shard"][0]["lo"].as_u64().unwrap().to_string();

    let out = stdout(&fmshard(&[
        "doc",
        "0",
        &rank,
        "--needle-len",
        "5",
        "--max-ctx-len",
        "3",
        "--no-color",
        "--config",
        &config,
    ]));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "doc 1 [3..11 of 11]");
    assert!(lines[1].contains("\"linenum\":1"));
    assert_eq!(lines[2], "ld peace");
    assert!(!out.contains('\x1b'));
}
