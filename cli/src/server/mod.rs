//! HTTP boundary of the generator

pub mod handlers;
pub mod payload;

use axum::routing::{get, post};
use axum::Router;
use datagen_core::Orchestrator;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state of every request; runs themselves share nothing else
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use datagen_core::aiconfig::{
        AiConfig, AiTracker, ConfigSource, ConfigSourceConnector, EvaluationContext,
        FeedbackKind, ResolvedAiConfig,
    };
    use datagen_core::config::{ModelParams, Protocol, RunSettings};
    use datagen_core::generation::Pacer;
    use datagen_core::llm::{
        ChatOptions, CompletionClientFactory, LlmClient, LlmMessage, LlmResponse, Usage,
    };
    use datagen_core::{Error, Result};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopTracker;

    #[async_trait]
    impl AiTracker for NoopTracker {
        async fn track_duration(&self, _duration: Duration) {}
        async fn track_tokens(&self, _usage: Usage) {}
        async fn track_success(&self) {}
        async fn track_error(&self) {}
        async fn track_feedback(&self, _kind: FeedbackKind) -> Result<()> {
            Ok(())
        }
    }

    struct MockConnector;

    impl ConfigSourceConnector for MockConnector {
        fn connect(&self, service_key: &str) -> Result<Box<dyn ConfigSource>> {
            Ok(Box::new(MockSource {
                reject: service_key == "sdk-bad",
            }))
        }
    }

    struct MockSource {
        reject: bool,
    }

    #[async_trait]
    impl ConfigSource for MockSource {
        async fn initialize(&mut self) -> Result<()> {
            if self.reject {
                return Err(Error::Generic("invalid sdk key".to_string()));
            }
            Ok(())
        }

        async fn resolve_config(
            &self,
            _config_key: &str,
            _context: &EvaluationContext,
            fallback: AiConfig,
            _variables: &serde_json::Map<String, Value>,
        ) -> Result<ResolvedAiConfig> {
            Ok(ResolvedAiConfig {
                config: fallback,
                tracker: Arc::new(NoopTracker),
            })
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockFactory {
        calls: Arc<AtomicUsize>,
    }

    impl CompletionClientFactory for MockFactory {
        fn create(
            &self,
            _protocol: Protocol,
            _api_key: &str,
            model: &str,
            _params: ModelParams,
        ) -> Result<Arc<dyn LlmClient>> {
            Ok(Arc::new(MockLlmClient {
                model: model.to_string(),
                calls: self.calls.clone(),
            }))
        }
    }

    struct MockLlmClient {
        model: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn chat_completion(
            &self,
            _messages: Vec<LlmMessage>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LlmResponse {
                message: LlmMessage::assistant("ok"),
                usage: None,
                model: self.model.clone(),
                finish_reason: None,
            })
        }

        fn model_name(&self) -> &str {
            &self.model
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    struct InstantPacer;

    #[async_trait]
    impl Pacer for InstantPacer {
        async fn pause(&self, _delay: Duration) {}
    }

    async fn spawn_server() -> (SocketAddr, Arc<AtomicUsize>) {
        let factory = MockFactory::default();
        let calls = factory.calls.clone();
        let orchestrator = Orchestrator::new(
            Arc::new(MockConnector),
            Arc::new(factory),
            RunSettings::default(),
        )
        .with_pacer(Arc::new(InstantPacer));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(
            listener,
            AppState::new(orchestrator),
            std::future::pending(),
        ));
        (addr, calls)
    }

    fn body(sdk_key: &str, count: i64) -> Value {
        json!({
            "aiModel": "openai",
            "aiSdkKey": "sk-test",
            "ldSdkKey": sdk_key,
            "configClientId": "support-bot",
            "numGenerations": count,
            "goodFeedbackRatio": 50
        })
    }

    async fn post(addr: SocketAddr, body: reqwest::Body) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/generate", addr))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_generate_success() {
        let (addr, calls) = spawn_server().await;

        let (status, json) = post(addr, body("sdk-good", 4).to_string().into()).await;

        assert_eq!(status, 200);
        assert_eq!(json["success"], true);
        assert_eq!(json["completedGenerations"], 4);
        assert_eq!(json["errors"], Value::Null);
        assert_eq!(json["positiveFeedback"], 2);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_setup_failure_is_500() {
        let (addr, calls) = spawn_server().await;

        let (status, json) = post(addr, body("sdk-bad", 4).to_string().into()).await;

        assert_eq!(status, 500);
        assert_eq!(json, json!({ "success": false, "error": "invalid sdk key" }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_400_json() {
        let (addr, calls) = spawn_server().await;

        let (status, json) = post(addr, body("sdk-good", 0).to_string().into()).await;
        assert_eq!(status, 400);
        assert_eq!(json["success"], false);

        let (status, json) = post(addr, "{ not json".into()).await;
        assert_eq!(status, 400);
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let (addr, _) = spawn_server().await;

        let json: Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], datagen_core::VERSION);
    }
}
