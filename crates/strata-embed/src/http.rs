//! OpenAI-compatible `/embeddings` endpoint adapter.

use serde::{Deserialize, Serialize};

use crate::embedder::Embedder;
use crate::error::EmbedError;
use crate::models::dimension_for;

/// Embedding provider backed by an OpenAI-compatible HTTP endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    #[must_use]
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let dimension = dimension_for(&model);
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            dimension,
        }
    }
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(EmbedError::Http)?;

        if !status.is_success() {
            tracing::error!("embedding API error {status}: {text}");
            return Err(EmbedError::Status {
                status: status.as_u16(),
            });
        }

        let resp: EmbeddingResponse = serde_json::from_str(&text)?;

        if resp.data.is_empty() {
            return Err(EmbedError::EmptyResponse { provider: "http" });
        }
        if resp.data.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                sent: texts.len(),
                received: resp.data.len(),
            });
        }

        // The API is not required to preserve input order; `index` is.
        let mut data = resp.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chunk {i}")).collect()
    }

    #[tokio::test]
    async fn embeds_batch_in_index_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "embedding": [0.0, 1.0], "index": 1 },
                    { "embedding": [1.0, 0.0], "index": 0 },
                ]
            })))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(server.uri(), "key".into(), "bge-small".into());
        let out = embedder.embed_batch(&texts(2)).await.unwrap();
        assert_eq!(out[0], vec![1.0, 0.0]);
        assert_eq!(out[1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn non_success_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(server.uri(), "key".into(), "bge-small".into());
        let err = embedder.embed_batch(&texts(1)).await.unwrap_err();
        assert!(matches!(err, EmbedError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn count_mismatch_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "embedding": [0.5], "index": 0 } ]
            })))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(server.uri(), "key".into(), "bge-small".into());
        let err = embedder.embed_batch(&texts(3)).await.unwrap_err();
        assert!(matches!(
            err,
            EmbedError::CountMismatch {
                sent: 3,
                received: 1
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_errors() {
        let embedder = HttpEmbedder::new(
            "http://127.0.0.1:1".into(),
            "key".into(),
            "bge-small".into(),
        );
        assert!(embedder.embed_batch(&texts(1)).await.is_err());
    }

    #[test]
    fn dimension_follows_model() {
        let embedder = HttpEmbedder::new("http://localhost".into(), String::new(), "bge-small".into());
        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.model_id(), "bge-small");
    }
}
