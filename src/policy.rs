//! Confidence gate between raw classifier scores and what the client sees.

use thiserror::Error;

use crate::knowledge::KnowledgeBase;

/// Minimum confidence, in percent, for a class to be reported.
pub const CONFIDENCE_THRESHOLD: f64 = 60.0;

/// Label reported when the winning class is below the threshold.
pub const UNIDENTIFIED_LABEL: &str = "Tanımlanamadı ❓";

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("classifier returned no usable scores")]
    EmptyScores,
    #[error("classifier returned {got} scores but {expected} classes are known")]
    ClassCountMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    Rock { label: String, description: String },
    Unidentified,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub identification: Identification,
    /// Winning probability as a percentage in `[0, 100]`.
    pub confidence: f64,
}

impl Prediction {
    pub fn is_identified(&self) -> bool {
        matches!(self.identification, Identification::Rock { .. })
    }

    pub fn name(&self) -> &str {
        match &self.identification {
            Identification::Rock { label, .. } => label,
            Identification::Unidentified => UNIDENTIFIED_LABEL,
        }
    }

    pub fn detail(&self) -> String {
        match &self.identification {
            Identification::Rock { description, .. } => {
                format!("{}\n(Güven Oranı: %{:.1})", description, self.confidence)
            }
            Identification::Unidentified => format!(
                "Bu görüntüden tam emin olamadım (Güven: %{:.1}).\n\
                 Lütfen taşı daha yakından, iyi bir ışıkta ve net çekmeyi dene.",
                self.confidence
            ),
        }
    }
}

/// Index and value of the highest score. Ties go to the lowest index and NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}

pub fn decide(scores: &[f32], knowledge: &KnowledgeBase) -> Result<Prediction, PolicyError> {
    if scores.len() != knowledge.len() {
        return Err(PolicyError::ClassCountMismatch {
            expected: knowledge.len(),
            got: scores.len(),
        });
    }
    let (index, probability) = argmax(scores).ok_or(PolicyError::EmptyScores)?;
    let confidence = f64::from(probability * 100.0).clamp(0.0, 100.0);

    if confidence < CONFIDENCE_THRESHOLD {
        return Ok(Prediction {
            identification: Identification::Unidentified,
            confidence,
        });
    }

    let (label, description) = knowledge
        .label(index)
        .zip(knowledge.description(index))
        .ok_or(PolicyError::ClassCountMismatch {
            expected: knowledge.len(),
            got: scores.len(),
        })?;
    Ok(Prediction {
        identification: Identification::Rock {
            label: label.to_owned(),
            description: description.to_owned(),
        },
        confidence,
    })
}
