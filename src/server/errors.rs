use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deckstat_core::DeckstatError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let body = ApiError {
            status: status.as_u16(),
            message: message.into(),
        };
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DeckstatError> for HttpError {
    fn from(err: DeckstatError) -> Self {
        if err.is_client_error() {
            Self::new(StatusCode::BAD_REQUEST, err.to_string())
        } else {
            error!("Request failed: {err}");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let err = HttpError::from(DeckstatError::InvalidDate("x".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body.status, 400);

        let err = HttpError::from(DeckstatError::NoDataDirectory);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, "No Claude data directory found");
    }
}
