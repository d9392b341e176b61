use {clap::Parser, std::path::PathBuf};

/// Train a hand gesture classifier from encoded CSV files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Number of epochs to train the model for
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Number of gesture classes in the data
    #[arg(long = "n_classes")]
    pub n_classes: usize,

    /// Path to the training data CSV
    #[arg(long = "train_data_path")]
    pub train_data_path: PathBuf,

    /// Path to the test data CSV
    #[arg(long = "test_data_path")]
    pub test_data_path: PathBuf,

    /// Directory the trained model is saved to
    #[arg(long = "model_save_path")]
    pub model_save_path: PathBuf,
}
