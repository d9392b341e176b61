mod cancel;
pub use cancel::*;

pub mod logging;
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

mod vec2;
pub use vec2::*;

mod vec3;
pub use vec3::*;

// Re-export so downstream crates can use base::log::info! and friends
pub use log;
