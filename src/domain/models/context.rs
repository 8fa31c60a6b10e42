use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A chunk of a knowledge-base document returned by the retriever. The
/// metadata object is free-form; the keys used for citations are
/// `source_filename`, `page_label` and `titulo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A scored retrieval citation attached to the generation it supported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub document: ContextDocument,
    pub score: f64,
}

impl ContextItem {
    pub fn source_filename(&self) -> Option<&str> {
        return self
            .document
            .metadata
            .get("source_filename")
            .and_then(|val| return val.as_str());
    }

    pub fn page_label(&self) -> Option<String> {
        return self.document.metadata.get("page_label").map(|val| {
            if let Some(text) = val.as_str() {
                return text.to_string();
            }
            return val.to_string();
        });
    }
}
