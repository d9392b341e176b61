use std::fmt;

#[derive(Debug)]
pub enum GestureError {
    /// A hand did not carry exactly the expected number of joints.
    JointCount { expected: usize, actual: usize },
    /// A feature vector or dataset row has the wrong width.
    FeatureWidth { expected: usize, actual: usize },
    /// The bounding box of a hand has zero (or non-finite) width or height.
    DegenerateHand { width: f32, height: f32 },
    /// A sample contains NaN or infinite coordinates.
    InvalidSample(String),
    ClassCount(usize),
    EpochCount(usize),
    EmptyDataset,
    LabelOutOfRange { label: u32, class_count: usize },
    EmptyLabel,
    UnknownClass(u32),
    Csv { line: usize, message: String },
    /// Another training run holds the single-flight slot.
    Busy,
    Cancelled,
    Candle(String),
    Io(String),
    Json(String),
    Runtime(String),
}

impl GestureError {
    /// Whether the error stems from the caller's input rather than the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GestureError::JointCount { .. }
                | GestureError::FeatureWidth { .. }
                | GestureError::DegenerateHand { .. }
                | GestureError::InvalidSample(_)
                | GestureError::ClassCount(_)
                | GestureError::EpochCount(_)
                | GestureError::EmptyDataset
                | GestureError::LabelOutOfRange { .. }
                | GestureError::EmptyLabel
                | GestureError::UnknownClass(_)
                | GestureError::Csv { .. }
        )
    }
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureError::JointCount { expected, actual } => {
                write!(f, "expected {expected} joints, got {actual}")
            }
            GestureError::FeatureWidth { expected, actual } => {
                write!(f, "expected {expected} features, got {actual}")
            }
            GestureError::DegenerateHand { width, height } => {
                write!(f, "degenerate hand bounding box ({width} x {height})")
            }
            GestureError::InvalidSample(msg) => write!(f, "invalid sample: {msg}"),
            GestureError::ClassCount(n) => write!(f, "invalid gesture class count: {n}"),
            GestureError::EpochCount(n) => write!(f, "invalid epoch count: {n}"),
            GestureError::EmptyDataset => write!(f, "training dataset is empty"),
            GestureError::LabelOutOfRange { label, class_count } => {
                write!(f, "label {label} out of range for {class_count} classes")
            }
            GestureError::EmptyLabel => write!(f, "gesture label must not be empty"),
            GestureError::UnknownClass(id) => write!(f, "unknown gesture class {id}"),
            GestureError::Csv { line, message } => write!(f, "csv error at line {line}: {message}"),
            GestureError::Busy => write!(f, "a training run is already in progress"),
            GestureError::Cancelled => write!(f, "training cancelled"),
            GestureError::Candle(msg) => write!(f, "candle error: {msg}"),
            GestureError::Io(msg) => write!(f, "io error: {msg}"),
            GestureError::Json(msg) => write!(f, "json error: {msg}"),
            GestureError::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for GestureError {}

impl From<candle_core::Error> for GestureError {
    fn from(err: candle_core::Error) -> Self {
        GestureError::Candle(err.to_string())
    }
}

impl From<std::io::Error> for GestureError {
    fn from(err: std::io::Error) -> Self {
        GestureError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GestureError {
    fn from(err: serde_json::Error) -> Self {
        GestureError::Json(err.to_string())
    }
}
