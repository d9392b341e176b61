use {
    crate::trainer::{DEFAULT_BATCH_SIZE, DEFAULT_LEARNING_RATE, DEFAULT_SEED, DEFAULT_SHUFFLE_BUFFER},
    std::{path::PathBuf, time::Duration},
};

/// Runtime settings shared by the detection loop and the training service.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where `train.csv` and `test.csv` are written.
    pub data_dir: PathBuf,
    /// Root of statically served files; models go under `models/<recordId>`.
    pub static_root: PathBuf,
    pub epoch_count: usize,
    pub batch_size: usize,
    pub shuffle_buffer: usize,
    pub learning_rate: f64,
    pub seed: u64,
    /// Hands at or below this detector confidence are ignored.
    pub confidence_threshold: f32,
    /// Detection loop period.
    pub tick: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            static_root: PathBuf::from("public"),
            epoch_count: 25,
            batch_size: DEFAULT_BATCH_SIZE,
            shuffle_buffer: DEFAULT_SHUFFLE_BUFFER,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: DEFAULT_SEED,
            confidence_threshold: 0.8,
            tick: Duration::from_millis(16),
        }
    }
}

impl Settings {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_static_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_root = dir.into();
        self
    }

    pub fn with_epoch_count(mut self, epoch_count: usize) -> Self {
        self.epoch_count = epoch_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Directory holding all saved models.
    pub fn models_dir(&self) -> PathBuf {
        self.static_root.join("models")
    }

    /// Directory of the model trained for `record_id`.
    pub fn model_dir(&self, record_id: u64) -> PathBuf {
        self.models_dir().join(record_id.to_string())
    }

    /// URL path under which the model for `record_id` is served.
    pub fn model_url(record_id: u64) -> String {
        format!("/models/{record_id}")
    }
}
