//! HTTP client for the external scoring service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use examscore_core::error::RemoteError;
use examscore_core::model::{BatchResult, QuestionAnswerPair};
use examscore_core::traits::ScoringBackend;

/// Long enough to absorb the cold start of an on-demand scoring function.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Error bodies longer than this are cut before they reach the logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Scores a whole submission with one POST to the external service.
pub struct HttpScorer {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpScorer {
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn request(&self, pairs: &[QuestionAnswerPair]) -> Result<BatchResult, RemoteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RequestBody { answers: pairs })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let result: BatchResult = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;

        if !result.is_success() {
            return Err(RemoteError::Logic(
                result
                    .error_detail
                    .unwrap_or_else(|| "no error detail".to_string()),
            ));
        }

        Ok(result)
    }

    fn transport_error(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    answers: &'a [QuestionAnswerPair],
}

#[async_trait]
impl ScoringBackend for HttpScorer {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, pairs), fields(endpoint = %self.endpoint, questions = pairs.len()))]
    async fn score_batch(&self, pairs: &[QuestionAnswerPair]) -> anyhow::Result<BatchResult> {
        Ok(self.request(pairs).await?)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pairs() -> Vec<QuestionAnswerPair> {
        vec![QuestionAnswerPair::new("q1", "The sky is blue", "sky is blue", 10.0)
            .with_question("What colour is the sky?")]
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "results": [
                {"question_id": "q1", "similarity_score": 0.91, "final_score": 9, "max_score": 10}
            ],
            "total_score": 9,
            "total_max_score": 10,
            "status": "success"
        })
    }

    async fn scorer_for(server: &MockServer) -> HttpScorer {
        HttpScorer::new(&format!("{}/score_exam", server.uri())).unwrap()
    }

    fn remote_error(err: anyhow::Error) -> RemoteError {
        err.downcast::<RemoteError>().expect("expected a RemoteError")
    }

    #[tokio::test]
    async fn successful_scoring() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score_exam"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "answers": [{
                    "question_id": "q1",
                    "key_answer": "The sky is blue",
                    "student_answer": "sky is blue",
                    "max_score": 10.0
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let scorer = scorer_for(&server).await;
        let result = scorer.score_batch(&pairs()).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.outcomes[0].final_score, 9);
        assert_eq!(result.total_score, 9);
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("cold start failed"))
            .mount(&server)
            .await;

        let err = scorer_for(&server).await.score_batch(&pairs()).await.unwrap_err();
        match remote_error(err) {
            RemoteError::Http { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("cold start failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_error_is_logic_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [],
                "total_score": 0,
                "total_max_score": 0,
                "status": "error",
                "error": "embedding model unavailable"
            })))
            .mount(&server)
            .await;

        let err = scorer_for(&server).await.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(
            remote_error(err),
            RemoteError::Logic(ref m) if m == "embedding model unavailable"
        ));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = scorer_for(&server).await.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(remote_error(err), RemoteError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let scorer = HttpScorer::with_timeout(
            &format!("{}/score_exam", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = scorer.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(remote_error(err), RemoteError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        // Grab a free port and release it so nothing is listening there.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let scorer = HttpScorer::new(&format!("http://127.0.0.1:{port}/score_exam")).unwrap();
        let err = scorer.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(remote_error(err), RemoteError::Network(_)));
    }

    #[test]
    fn truncate_long_bodies() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
