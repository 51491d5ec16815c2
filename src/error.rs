// src/error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized access")]
    Unauthorized(#[from] AuthError),
    #[error("forbidden access")]
    Forbidden,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Invalid task id")]
    InvalidTaskId(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("credential could not be issued: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),
    #[error("{0}")]
    Internal(&'static str),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::InvalidTaskId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Credential(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
            return HttpResponse::build(status).json(json!({
                "error": "An error occurred",
                "message": "Internal server error",
            }));
        }
        HttpResponse::build(status).json(json!({ "message": self.to_string() }))
    }
}
