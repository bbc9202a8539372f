use serde::{Deserialize, Serialize};

use crate::policy::Prediction;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RockInfo {
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "detay")]
    pub detail: String,
}

impl From<&Prediction> for RockInfo {
    fn from(prediction: &Prediction) -> Self {
        Self {
            name: prediction.name().to_owned(),
            detail: prediction.detail(),
        }
    }
}

/// JSON envelope shared by every response of the service.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            detail: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            detail: Some(detail.into()),
        }
    }
}
