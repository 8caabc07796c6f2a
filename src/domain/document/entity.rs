use serde::{Deserialize, Serialize};

/// A passage with its embedding, as written by the indexer
///
/// Documents are immutable once stored and carry no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    embedding: Vec<f32>,
    metadata: Option<serde_json::Value>,
}

impl Document {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            embedding,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
}

/// A stored passage ranked against a query embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub content: String,
    pub distance: f32,
    pub metadata: Option<serde_json::Value>,
}

impl ScoredDocument {
    pub fn new(content: impl Into<String>, distance: f32) -> Self {
        Self {
            content: content.into(),
            distance,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_with_metadata() {
        let doc = Document::new("Paris is the capital of France.", vec![1.0, 0.0])
            .with_metadata(Some(serde_json::json!({"source": "atlas"})));

        assert_eq!(doc.content(), "Paris is the capital of France.");
        assert_eq!(doc.embedding(), &[1.0, 0.0]);
        assert_eq!(doc.metadata().unwrap()["source"], "atlas");
    }
}
