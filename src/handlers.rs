use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::error::ApiError;
use crate::knowledge::KnowledgeBase;
use crate::model::ModelHost;
use crate::models::{Envelope, PredictRequest, RockInfo};
use crate::policy::{self, Prediction};
use crate::preprocess;

/// Shared, read-only state injected into every request.
pub struct AppState {
    pub model: ModelHost,
    pub knowledge: KnowledgeBase,
    /// Report client input errors as 500, like the first deployment did.
    pub legacy_status_codes: bool,
}

impl AppState {
    pub fn new(model: ModelHost, knowledge: KnowledgeBase) -> Self {
        Self {
            model,
            knowledge,
            legacy_status_codes: false,
        }
    }

    pub fn with_legacy_status_codes(mut self, enabled: bool) -> Self {
        self.legacy_status_codes = enabled;
        self
    }

    fn rejected_input(&self, message: String) -> ApiError {
        if self.legacy_status_codes {
            ApiError::Internal(message)
        } else {
            ApiError::BadInput(message)
        }
    }

    /// Decode, preprocess, score and gate one image. Blocking.
    fn identify(&self, encoded: &str) -> Result<Prediction, ApiError> {
        let bytes =
            preprocess::decode_base64(encoded).map_err(|e| self.rejected_input(e.to_string()))?;
        let tensor = preprocess::prepare(&bytes).map_err(|e| self.rejected_input(e.to_string()))?;
        let scores = self.model.classify(&tensor)?;
        Ok(policy::decide(&scores, &self.knowledge)?)
    }
}

/// Only a JSON object is a request; arrays and scalars are rejected even if serde
/// could map them onto [`PredictRequest`]. The content type is not checked.
fn parse_request(body: &[u8]) -> Result<PredictRequest, String> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("request body must be a JSON object".to_owned());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn predict(
    state: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    if !state.model.is_available() {
        warn!("Rejecting prediction: model is not loaded");
        return Err(ApiError::ModelUnavailable);
    }

    let body = body.map_err(|e| {
        warn!("Unreadable request body: {}", e);
        ApiError::Payload(e)
    })?;
    let request = parse_request(&body).map_err(|e| {
        warn!("Malformed request body: {}", e);
        state.rejected_input(e)
    })?;
    let encoded = match request.image {
        Some(image) if !image.is_empty() => image,
        _ => return Err(ApiError::MissingImage),
    };

    let worker = state.clone();
    let prediction = web::block(move || worker.identify(&encoded))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!("Prediction failed: {}", e);
            e
        })?;

    if prediction.is_identified() {
        info!("Prediction: {} (confidence {:.1}%)", prediction.name(), prediction.confidence);
    } else {
        info!("Low confidence {:.1}%, result withheld", prediction.confidence);
    }

    Ok(HttpResponse::Ok().json(Envelope::ok(RockInfo::from(&prediction))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_must_be_an_object() {
        assert_eq!(
            parse_request(br#"{"image":"aGVsbG8="}"#).unwrap().image.as_deref(),
            Some("aGVsbG8=")
        );
        assert!(parse_request(b"{}").unwrap().image.is_none());
        assert!(parse_request(br#"["aGVsbG8="]"#).is_err());
        assert!(parse_request(b"[]").is_err());
        assert!(parse_request(b"\"aGVsbG8=\"").is_err());
        assert!(parse_request(b"{broken").is_err());
    }
}
