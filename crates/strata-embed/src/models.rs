//! Static model metadata: vector dimensions and collection-name suffixes.

/// Vector dimension for a known embedding model.
///
/// BGE models: small=384, base=768, large=1024. MiniLM uses 384, MPNet 768.
/// Unknown models default to 768.
#[must_use]
pub fn dimension_for(model_id: &str) -> usize {
    let id = model_id.to_lowercase();
    if id.contains("bge-small") {
        384
    } else if id.contains("bge-base") {
        768
    } else if id.contains("bge-large") {
        1024
    } else if id.contains("bge") {
        384
    } else if id.contains("minilm") {
        384
    } else {
        768
    }
}

/// Short suffix identifying the model family in collection names.
#[must_use]
pub fn model_suffix(model_id: &str) -> &'static str {
    let id = model_id.to_lowercase();
    if id.contains("paraphrase-multilingual-mpnet-base-v2") {
        "mpnet"
    } else if id.contains("bge-small") {
        "bge"
    } else {
        "unknown"
    }
}

/// Append the model suffix to a collection name, replacing any stale one.
///
/// Collections are keyed per model family so that vectors from different
/// models never land in the same collection under the wrong schema.
#[must_use]
pub fn suffixed_collection(collection: &str, model_id: &str) -> String {
    let suffix = model_suffix(model_id);

    let mut base = collection;
    for old in ["_mpnet", "_bge"] {
        if let Some(stripped) = base.strip_suffix(old) {
            base = stripped;
        }
    }

    if base.ends_with(&format!("_{suffix}")) {
        base.to_string()
    } else {
        format!("{base}_{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bge_dimensions() {
        assert_eq!(dimension_for("BAAI/bge-small-en-v1.5"), 384);
        assert_eq!(dimension_for("BAAI/bge-base-en"), 768);
        assert_eq!(dimension_for("BAAI/bge-large-en"), 1024);
    }

    #[test]
    fn mpnet_dimension() {
        assert_eq!(
            dimension_for("sentence-transformers/paraphrase-multilingual-mpnet-base-v2"),
            768
        );
    }

    #[test]
    fn unknown_model_defaults_to_768() {
        assert_eq!(dimension_for("acme/experimental-embedder"), 768);
    }

    #[test]
    fn suffix_appended() {
        assert_eq!(
            suffixed_collection(
                "docs",
                "sentence-transformers/paraphrase-multilingual-mpnet-base-v2"
            ),
            "docs_mpnet"
        );
    }

    #[test]
    fn stale_suffix_replaced() {
        assert_eq!(
            suffixed_collection(
                "docs_bge",
                "sentence-transformers/paraphrase-multilingual-mpnet-base-v2"
            ),
            "docs_mpnet"
        );
    }

    #[test]
    fn existing_suffix_kept() {
        assert_eq!(
            suffixed_collection(
                "docs_mpnet",
                "sentence-transformers/paraphrase-multilingual-mpnet-base-v2"
            ),
            "docs_mpnet"
        );
    }
}
