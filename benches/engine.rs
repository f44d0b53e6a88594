//! Performance benchmarks for fmshard
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fmshard::index::{FmIndex, FmIndexBuilder, IndexConfig, SelfIndex};
use fmshard::shard::ShardWriter;
use fmshard::{Engine, EngineConfig, LoadMode};
use std::path::PathBuf;
use tempfile::TempDir;

/// Deterministic English-like documents
fn corpus(docs: usize) -> Vec<String> {
    const WORDS: &[&str] = &[
        "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "search", "index",
        "shard", "needle", "haystack", "compressed", "suffix", "array",
    ];
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..docs)
        .map(|_| {
            let mut doc = Vec::new();
            for _ in 0..64 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                doc.push(WORDS[(state % WORDS.len() as u64) as usize]);
            }
            doc.join(" ")
        })
        .collect()
}

/// Write `shards` shards of `docs` documents each
fn create_benchmark_fixtures(shards: usize, docs: usize) -> (TempDir, Vec<PathBuf>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let documents = corpus(shards * docs);

    let dirs = documents
        .chunks(docs)
        .enumerate()
        .map(|(i, chunk)| {
            let dir = temp_dir.path().join(format!("shard_{:04}", i));
            let mut writer = ShardWriter::with_defaults();
            for (d, doc) in chunk.iter().enumerate() {
                let meta = format!("{{\"doc\":{}}}", d);
                writer
                    .add_document(doc.as_bytes(), meta.as_bytes())
                    .expect("Failed to add document");
            }
            writer.write(&dir).expect("Failed to write shard");
            dir
        })
        .collect();

    (temp_dir, dirs)
}

fn bench_index_build(c: &mut Criterion) {
    let text = corpus(200).join("\n");

    let mut group = c.benchmark_group("index_build");
    group.sample_size(10);
    for step in [8u64, 32, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, &step| {
            let builder = FmIndexBuilder::new(IndexConfig { sample_step: step });
            b.iter(|| builder.build(black_box(text.as_bytes())).unwrap())
        });
    }
    group.finish();
}

fn bench_fm_index(c: &mut Criterion) {
    let text = corpus(200).join(" ");
    let built = FmIndexBuilder::with_defaults().build(text.as_bytes()).unwrap();
    let index = FmIndex::from_built(&built).unwrap();

    let mut group = c.benchmark_group("fm_index");
    for pattern in ["fox", "compressed suffix", "needle in the haystack"] {
        group.bench_with_input(
            BenchmarkId::new("backward_search", pattern),
            &pattern,
            |b, &p| b.iter(|| index.backward_search(black_box(p.as_bytes()))),
        );
    }

    let range = index.backward_search(b"needle");
    group.bench_function("invert", |b| {
        b.iter(|| {
            for rank in range.clone().take(64) {
                black_box(index.invert(rank));
            }
        })
    });

    for len in [64u64, 1024] {
        group.bench_with_input(BenchmarkId::new("extract", len), &len, |b, &len| {
            b.iter(|| index.extract(black_box(1000), black_box(1000 + len)))
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let (_temp_dir, dirs) = create_benchmark_fixtures(4, 100);

    let mut group = c.benchmark_group("engine");
    for mode in [LoadMode::Resident, LoadMode::Mapped] {
        let config = EngineConfig::new(dirs.clone(), mode, true);
        let engine = Engine::open(&config).expect("Failed to open engine");

        group.bench_function(BenchmarkId::new("find", format!("{:?}", mode)), |b| {
            b.iter(|| engine.find(black_box(b"lazy dog")))
        });
        group.bench_function(BenchmarkId::new("get_doc", format!("{:?}", mode)), |b| {
            b.iter(|| engine.get_doc_by_occurrence(black_box(b"needle"), 0, 100))
        });
    }

    let config = EngineConfig::new(dirs.clone(), LoadMode::Mapped, true);
    group.bench_function("open_mapped", |b| {
        b.iter(|| Engine::open(black_box(&config)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_index_build, bench_fm_index, bench_engine);
criterion_main!(benches);
