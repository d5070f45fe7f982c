use serde::{Deserialize, Serialize};

/// A chunk's embedding plus metadata, as delivered to the vector store.
///
/// Ids are assigned by the pipeline's single consumer path: process-local,
/// starting at 1, strictly increasing within a run. File processors leave
/// the id at 0 as a placeholder.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: RecordPayload,
}

/// Payload stored alongside the vector.
///
/// `content` and `document` both carry the context-annotated chunk (header
/// plus text) for different downstream consumers; `raw_content` is the
/// chunk exactly as cut from the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordPayload {
    pub path: String,
    pub repo: String,
    pub ext: String,
    pub title: String,
    pub language: String,
    pub path_prefix: String,
    pub content: String,
    pub document: String,
    pub raw_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_all_fields() {
        let payload = RecordPayload {
            path: "src/lib.rs".into(),
            repo: "demo_mpnet".into(),
            ext: "rs".into(),
            title: "lib.rs".into(),
            language: "rust".into(),
            path_prefix: "src".into(),
            content: "header\n---\nfn main() {}".into(),
            document: "header\n---\nfn main() {}".into(),
            raw_content: "fn main() {}".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        for key in [
            "path",
            "repo",
            "ext",
            "title",
            "language",
            "path_prefix",
            "content",
            "document",
            "raw_content",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
