use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::ModelError;
use crate::models::Envelope;
use crate::policy::PolicyError;

/// Everything that can end a request without a prediction.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Model sunucuda yüklü değil.")]
    ModelUnavailable,
    #[error("Resim verisi bulunamadı.")]
    MissingImage,
    /// The client sent something that is not a usable image request.
    #[error("{0}")]
    BadInput(String),
    /// The body could not be read, e.g. it exceeded the payload limit.
    #[error("{0}")]
    Payload(actix_web::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::BadInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Payload(e) => e.as_response_error().status_code(),
            ApiError::ModelUnavailable
            | ApiError::Model(_)
            | ApiError::Policy(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::failure(self.to_string()))
    }
}
