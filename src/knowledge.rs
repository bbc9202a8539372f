use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

const BUILTIN: &str = include_str!("../assets/rocks.json");

/// Number of classes the deployed network scores.
pub const CLASS_COUNT: usize = 11;

/// Shown when a class has no description of its own.
pub const FALLBACK_DESCRIPTION: &str = "Bu taş hakkında detaylı bilgi veritabanında yok.";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("knowledge base has no classes")]
    Empty,
    #[error("duplicate class label: {0}")]
    DuplicateLabel(String),
    #[error("knowledge base lists {got} classes but the classifier scores {expected}")]
    ClassCount { expected: usize, got: usize },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RockClass {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Read-only table of rock classes, indexed the same way as the classifier output.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBase {
    classes: Vec<RockClass>,
}

impl KnowledgeBase {
    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_json(BUILTIN)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeError> {
        let kb: KnowledgeBase = serde_json::from_str(raw)?;
        kb.validate()?;
        Ok(kb)
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        if self.classes.is_empty() {
            return Err(KnowledgeError::Empty);
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.label.as_str()) {
                return Err(KnowledgeError::DuplicateLabel(class.label.clone()));
            }
        }
        Ok(())
    }

    /// Fails unless the table lines up one-to-one with a classifier of `expected` outputs.
    pub fn ensure_class_count(&self, expected: usize) -> Result<(), KnowledgeError> {
        if self.classes.len() != expected {
            return Err(KnowledgeError::ClassCount {
                expected,
                got: self.classes.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.label.as_str())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|c| c.label.as_str())
    }

    /// Description for the class at `index`, falling back to a generic sentence
    /// when the entry has none.
    pub fn description(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|c| match c.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => FALLBACK_DESCRIPTION,
        })
    }
}
