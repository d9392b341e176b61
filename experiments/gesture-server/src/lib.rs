mod error;
pub use error::ApiError;

use {
    axum::{Json, Router, extract::DefaultBodyLimit, extract::State, routing::post},
    gesture::{Settings, TrainingRequest, TrainingResponse, TrainingService},
    std::{env, path::PathBuf, sync::Arc},
    tower_http::{cors::CorsLayer, services::ServeDir},
};

pub const DEFAULT_ADDR: &str = "0.0.0.0:4000";

pub const ADDR_VAR: &str = "GESTURE_ADDR";
pub const DATA_DIR_VAR: &str = "GESTURE_DATA_DIR";
pub const STATIC_ROOT_VAR: &str = "GESTURE_STATIC_ROOT";
pub const EPOCHS_VAR: &str = "GESTURE_EPOCHS";
/// When set, logs go to dated files in this directory instead of stdout.
pub const LOG_DIR_VAR: &str = "GESTURE_LOG_DIR";

/// Upper bound on an uploaded session.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Build `Settings` from the defaults, overridden by `GESTURE_*` variables.
pub fn settings_from_env() -> Result<Settings, String> {
    let mut settings = Settings::default();
    if let Ok(dir) = env::var(DATA_DIR_VAR) {
        settings = settings.with_data_dir(dir);
    }
    if let Ok(dir) = env::var(STATIC_ROOT_VAR) {
        settings = settings.with_static_root(dir);
    }
    if let Ok(epochs) = env::var(EPOCHS_VAR) {
        let epochs = epochs
            .parse()
            .map_err(|e| format!("invalid {EPOCHS_VAR} '{epochs}': {e}"))?;
        settings = settings.with_epoch_count(epochs);
    }
    Ok(settings)
}

pub fn listen_addr() -> String {
    env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_string())
}

/// `POST /training` plus static files (trained models included) from `static_root`.
pub fn router(service: Arc<TrainingService>, static_root: impl Into<PathBuf>) -> Router {
    Router::new()
        .route("/training", post(training))
        .with_state(service)
        .fallback_service(ServeDir::new(static_root.into()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
}

/// The capture client posts the session as text, so the body is parsed here
/// rather than by the `Json` extractor.
pub async fn training(
    State(service): State<Arc<TrainingService>>,
    body: String,
) -> Result<Json<TrainingResponse>, ApiError> {
    let request: TrainingRequest = serde_json::from_str(&body)?;
    let response = service.train(request, None).await?;
    Ok(Json(response))
}
