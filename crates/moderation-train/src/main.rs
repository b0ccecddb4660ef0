use clap::Parser;
use moderation_train::cli::Cli;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    info!("Training moderation model");
    info!("Dataset: {}", cli.dataset);
    info!("Lemmatizer: {}", cli.lemmatizer);

    let report = moderation_train::run(&cli)?;

    info!(
        "Trained on {} samples, evaluated on {} ({} flagged / {} benign overall)",
        report.train_size, report.test_size, report.positives, report.negatives
    );
    info!(
        "Accuracy on test set: {:.2}%",
        report.metrics.accuracy * 100.0
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("moderation_train=debug,moderation_classifiers=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("moderation_train=info,moderation_classifiers=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
