//! Benchmarks for discovery and batch operations.
//!
//! Run with: cargo bench --bench discovery_benchmarks

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sheaf::domain::SelectionCriteria;
use sheaf::engine::{ExecOptions, Mutation, discover, run_batch};
use sheaf::store::{FsStore, MemoryStore, NoteStore};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Folders notes are spread across
const FOLDERS: &[&str] = &["Projects", "Projects/Alpha", "Research", "Inbox", "Archive/2023"];

/// Tags to assign to notes
const TAGS: &[&str] = &[
    "draft",
    "review",
    "published",
    "important",
    "rust",
    "cli",
    "async",
    "database",
];

/// Sample words for generating realistic note content
const WORDS: &[&str] = &[
    "architecture",
    "design",
    "pattern",
    "system",
    "component",
    "interface",
    "module",
    "function",
    "performance",
    "optimization",
];

fn note_path(index: usize) -> String {
    format!("{}/note-{:04}.md", FOLDERS[index % FOLDERS.len()], index)
}

/// Generate frontmatter content for a note
fn generate_note_content(index: usize) -> String {
    let title = format!("Note {} - {}", index, WORDS[index % WORDS.len()]);
    let tag1 = TAGS[index % TAGS.len()];
    let tag2 = TAGS[(index + 2) % TAGS.len()];
    let body: Vec<&str> = (0..50).map(|j| WORDS[(index + j) % WORDS.len()]).collect();

    format!(
        "---\ncreated: 2024-01-{:02}\ntags:\n- {}\n- {}\ntitle: {}\n---\n# {}\n\n{}\n",
        index % 28 + 1,
        tag1,
        tag2,
        title,
        title,
        body.join(" ")
    )
}

/// Create a temporary vault with N note files
fn create_test_vault(count: usize) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for folder in FOLDERS {
        fs::create_dir_all(dir.path().join(folder)).expect("Failed to create folder");
    }
    for i in 0..count {
        fs::write(dir.path().join(note_path(i)), generate_note_content(i))
            .expect("Failed to write note");
    }
    dir
}

fn criteria_cases() -> Vec<(&'static str, SelectionCriteria)> {
    vec![
        ("tag", SelectionCriteria::new().with_tags(["rust"])),
        ("folder", SelectionCriteria::new().with_folder("Projects")),
        ("glob", SelectionCriteria::new().with_path_pattern("Research/*.md")),
        ("content", SelectionCriteria::new().with_content("optimization")),
        (
            "date_range",
            SelectionCriteria::new()
                .with_created_after("2024-01-05")
                .with_created_before("2024-01-10"),
        ),
    ]
}

// =============================================================================
// Discovery Benchmarks
// =============================================================================

fn bench_discover_fs(c: &mut Criterion) {
    let mut group = c.benchmark_group("discover_fs");

    for size in [100, 500, 1000] {
        let dir = create_test_vault(size);
        let store = FsStore::open(dir.path()).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        for (name, criteria) in criteria_cases() {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| discover(&store, &criteria).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_discover_limit(c: &mut Criterion) {
    let dir = create_test_vault(1000);
    let store = FsStore::open(dir.path()).unwrap();

    let mut group = c.benchmark_group("discover_limit");
    let unlimited = SelectionCriteria::new().with_tags(["rust"]);
    let limited = unlimited.clone().with_limit(10);

    group.bench_function("unlimited", |b| {
        b.iter(|| discover(&store, &unlimited).unwrap())
    });
    group.bench_function("limit_10", |b| b.iter(|| discover(&store, &limited).unwrap()));

    group.finish();
}

// =============================================================================
// Batch Benchmarks
// =============================================================================

fn memory_vault(count: usize) -> MemoryStore {
    let store = FOLDERS
        .iter()
        .fold(MemoryStore::new(), |store, folder| store.with_folder(folder));
    (0..count).fold(store, |store, i| {
        store.with_note(&note_path(i), "body", None)
    })
}

fn bench_tag_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_merge");

    for size in [100, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("memory", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let store = memory_vault(size);
                    let targets = store.list().unwrap();
                    (store, targets)
                },
                |(mut store, targets)| {
                    run_batch(
                        &mut store,
                        &targets,
                        &Mutation::merge_tags(["bench"]),
                        ExecOptions::default(),
                    )
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("fs", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let dir = create_test_vault(size);
                    let store = FsStore::open(dir.path()).unwrap();
                    let targets = store.list().unwrap();
                    (dir, store, targets)
                },
                |(_dir, mut store, targets)| {
                    run_batch(
                        &mut store,
                        &targets,
                        &Mutation::merge_tags(["bench"]),
                        ExecOptions::default(),
                    )
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(discovery_benches, bench_discover_fs, bench_discover_limit);

criterion_group!(batch_benches, bench_tag_merge);

criterion_main!(discovery_benches, batch_benches);
