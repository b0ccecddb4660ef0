//! Latency benchmarks for the moderation pipeline
//!
//! Measures per-request normalization, feature assembly and full inference
//! against a model trained on the bundled dataset.
//!
//! Run with: cargo bench -p moderation-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use moderation_classifiers::{train, DatasetSpec, ModerationModel, TextNormalizer, TrainingConfig};

const LEMMATIZER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../resources/lemmatizer/fr.yaml");
const DATASET: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../resources/moderation/dataset.yaml");

const TEST_CASES: &[(&str, &str)] = &[
    ("short_flagged", "il faut tuer"),
    ("short_clean", "construction d une école"),
    ("lingala", "mbwa na yo"),
    (
        "medium_clean",
        "Le gouvernement a annoncé la construction de nouvelles écoles et de routes dans la province.",
    ),
    (
        "medium_flagged",
        "Ce ministre est un menteur et un traître, il faut propager la haine contre lui.",
    ),
];

fn trained_model() -> ModerationModel {
    let normalizer = TextNormalizer::from_file(LEMMATIZER).expect("Failed to load lemmatizer");
    let spec = DatasetSpec::from_file(DATASET).expect("Failed to load dataset");
    let outcome = train(&spec, &normalizer, &TrainingConfig::default()).expect("Training failed");
    ModerationModel::new(normalizer, outcome.artifacts)
}

/// Benchmark text normalization alone
fn benchmark_normalizer(c: &mut Criterion) {
    let normalizer = TextNormalizer::from_file(LEMMATIZER).expect("Failed to load lemmatizer");

    let mut group = c.benchmark_group("Normalizer");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("normalize", name), text, |b, text| {
            b.iter(|| normalizer.normalize(black_box(text)));
        });
    }

    group.finish();
}

/// Benchmark full inference: normalize, assemble, classify
fn benchmark_prediction(c: &mut Criterion) {
    let model = trained_model();

    let mut group = c.benchmark_group("Prediction");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("predict", name), text, |b, text| {
            b.iter(|| model.predict(black_box(text)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark feature assembly on pre-normalized text
fn benchmark_features(c: &mut Criterion) {
    let model = trained_model();
    let normalized: Vec<(&str, String)> = TEST_CASES
        .iter()
        .map(|(name, text)| (*name, model.normalizer().normalize(text)))
        .collect();

    let mut group = c.benchmark_group("Features");
    for (name, text) in &normalized {
        group.bench_with_input(BenchmarkId::new("assemble", name), text, |b, text| {
            b.iter(|| model.features(black_box(text)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalizer,
    benchmark_prediction,
    benchmark_features
);
criterion_main!(benches);
