pub mod classifier;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod hand;
pub mod meta;
pub mod normalize;
pub mod predict;
pub mod recorder;
pub mod service;
pub mod settings;
pub mod topology;
pub mod trainer;

pub use classifier::Classifier;
pub use dataset::{DatasetRow, EncodedDataset, encode, header, read_csv};
pub use detection::{DetectionHandle, DetectionLoop, HandDetector, Observation};
pub use error::GestureError;
pub use hand::{FEATURE_WIDTH, Hand, HandPrediction, LANDMARK_COUNT};
pub use meta::{GestureLabel, SessionMeta, load_meta};
pub use normalize::{BoundingBox, NormalizedHand, normalize};
pub use predict::{Prediction, Predictor, UNKNOWN_LABEL, argmax, predict};
pub use recorder::{ClassId, GestureClass, Recorder, Sample};
pub use service::{RecordedGesture, TrainingRequest, TrainingResponse, TrainingService};
pub use settings::Settings;
pub use topology::Topology;
pub use trainer::{EpochProgress, Evaluation, TrainConfig, TrainedModel, TrainingReport, train};
