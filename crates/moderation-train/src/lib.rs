//! Moderation Train
//!
//! One-shot training entrypoint: assemble the dataset, fit the vectorizer and
//! classifier, evaluate on the holdout split and overwrite the artifacts in
//! the output directory.

pub mod cli;

use anyhow::{Context, Result};
use moderation_classifiers::{train, ArtifactStore, DatasetSpec, TextNormalizer, TrainingReport};
use tracing::info;

use crate::cli::Cli;

/// Train with the command-line settings and persist the artifacts
pub fn run(cli: &Cli) -> Result<TrainingReport> {
    let normalizer = TextNormalizer::from_file(&cli.lemmatizer)
        .with_context(|| format!("cannot train without the lemmatizer model {}", cli.lemmatizer))?;
    let spec = DatasetSpec::from_file(&cli.dataset)
        .with_context(|| format!("cannot load dataset {}", cli.dataset))?;

    let outcome = train(&spec, &normalizer, &cli.training_config())?;

    let store = ArtifactStore::new(&cli.output);
    store
        .save(&outcome.artifacts)
        .with_context(|| format!("failed to write artifacts to {}", cli.output))?;
    info!("Artifacts written to {}", store.dir().display());

    Ok(outcome.report)
}
