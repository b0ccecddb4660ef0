use clap::Parser;
use moderation_classifiers::{TrainingConfig, DEFAULT_DATASET_PATH, DEFAULT_LEMMATIZER_PATH, DEFAULT_MODEL_DIR};

#[derive(Parser, Debug)]
#[command(name = "moderation-train")]
#[command(
    author,
    version,
    about = "Train the moderation classifier and persist its artifacts"
)]
pub struct Cli {
    /// Dataset definition (lexicon and labeled phrases)
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    pub dataset: String,

    /// Lemmatizer model path
    #[arg(short, long, default_value = DEFAULT_LEMMATIZER_PATH)]
    pub lemmatizer: String,

    /// Output directory for the trained artifacts
    #[arg(short, long, default_value = DEFAULT_MODEL_DIR)]
    pub output: String,

    /// Seed of the train/test split
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Gradient descent iteration cap
    #[arg(long, default_value = "500")]
    pub max_iter: usize,

    /// Probability above which a text is flagged
    #[arg(short, long, default_value = "0.5")]
    pub threshold: f64,

    /// Print the training report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Training configuration with the command-line values applied
    pub fn training_config(&self) -> TrainingConfig {
        let mut config = TrainingConfig {
            seed: self.seed,
            ..TrainingConfig::default()
        };
        config.classifier.max_iter = self.max_iter;
        config.classifier.threshold = self.threshold;
        config
    }
}
