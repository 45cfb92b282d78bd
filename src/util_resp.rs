use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

pub fn created(message: impl Into<String>) -> StandardResponse {
    Ok(SuccessResponse::Created(message.into()))
}

pub fn success<T: Serialize>(body: T) -> StandardResponse {
    match serde_json::to_value(body) {
        Ok(value) => Ok(SuccessResponse::Success(value)),
        Err(e) => {
            tracing::error!("failed to serialize response body: {e}");
            Err(FailureResponse::ServerError)
        }
    }
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

#[derive(Debug)]
pub enum SuccessResponse {
    /// `200` with the given JSON document.
    Success(Value),
    /// `201` with `{"message": ...}`.
    Created(String),
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(value) => {
                (StatusCode::OK, Json(value)).into_response()
            }
            SuccessResponse::Created(message) => {
                (StatusCode::CREATED, Json(json!({ "message": message })))
                    .into_response()
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FailureResponse {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Erro interno do servidor")]
    ServerError,
}

impl FailureResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            FailureResponse::BadRequest(_) => StatusCode::BAD_REQUEST,
            FailureResponse::NotFound(_) => StatusCode::NOT_FOUND,
            FailureResponse::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<diesel::result::Error> for FailureResponse {
    fn from(e: diesel::result::Error) -> Self {
        tracing::error!("database error: {e}");
        FailureResponse::ServerError
    }
}

impl From<diesel::r2d2::PoolError> for FailureResponse {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        tracing::error!("failed to check out a database connection: {e}");
        FailureResponse::ServerError
    }
}
