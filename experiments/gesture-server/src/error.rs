use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    base::log,
    gesture::GestureError,
    serde_json::json,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed training request: {0}")]
    BadRequest(#[from] serde_json::Error),

    #[error(transparent)]
    Gesture(#[from] GestureError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Gesture(GestureError::Busy) => StatusCode::CONFLICT,
            Self::Gesture(e) if e.is_configuration() => StatusCode::BAD_REQUEST,
            Self::Gesture(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("training request failed: {}", self);
        } else {
            log::warn!("training request rejected: {}", self);
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
