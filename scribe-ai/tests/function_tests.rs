//! Integration tests for the AI function endpoints
//!
//! The router runs against a scripted gateway, so requests never leave the
//! process.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use scribe_ai::config::FunctionSettings;
use scribe_ai::{build_router, AppState, ChatCompletion, ChatRequest, GatewayError};
use scribe_common::api::ServiceKey;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

type Responder = Box<dyn Fn(&ChatRequest) -> Result<String, GatewayError> + Send + Sync>;

/// Gateway that answers from a closure and records every request
struct FakeGateway {
    respond: Responder,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeGateway {
    fn new(
        respond: impl Fn(&ChatRequest) -> Result<String, GatewayError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeGateway {
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError> {
        let reply = (self.respond)(&request);
        self.requests.lock().unwrap().push(request);
        reply
    }
}

fn app(gateway: Arc<FakeGateway>, service_key: Option<&str>) -> Router {
    build_router(AppState::new(
        gateway,
        FunctionSettings::default(),
        ServiceKey::new(service_key),
    ))
}

async fn post(app: Router, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", key));
    }
    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const LONG_TEXT: &str = "A metodologia adotada consistiu em entrevistas semiestruturadas com vinte docentes.";

#[tokio::test]
async fn test_health_endpoint() {
    let response = app(FakeGateway::new(|_| Ok(String::new())), Some("k"))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "scribe-ai");
}

#[tokio::test]
async fn test_short_content_skips_gateway() {
    let gateway = FakeGateway::new(|_| panic!("gateway must not be called"));
    let (status, body) = post(
        app(gateway.clone(), None),
        "/analyze-text",
        json!({"section": "introduction", "content": "   curto demais   "}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": []}));
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_only_reported_for_long_content() {
    let gateway = FakeGateway::new(|_| Err(GatewayError::MissingApiKey));

    let (status, body) = post(
        app(gateway.clone(), None),
        "/analyze-text",
        json!({"section": "results", "content": "curto"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": []}));

    let (status, body) = post(
        app(gateway.clone(), None),
        "/analyze-text",
        json!({"section": "results", "content": LONG_TEXT}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "API key não configurada");
    assert_eq!(body["suggestions"], json!([]));
    assert_eq!(gateway.requests().len(), 1);
}

#[tokio::test]
async fn test_analyze_text_relays_and_parses() {
    let gateway = FakeGateway::new(|_| {
        Ok("```json\n[{\"type\":\"clareza\",\"title\":\"Tempo verbal\",\"content\":\"Use o passado.\",\"icon\":\"AlertCircle\"}]\n```".to_string())
    });
    let (status, body) = post(
        app(gateway.clone(), None),
        "/analyze-text",
        json!({"section": "methodology", "content": LONG_TEXT}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"][0]["type"], "clareza");
    assert_eq!(body["suggestions"][0]["title"], "Tempo verbal");
    assert!(body.get("error").is_none());

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "google/gemini-2.5-flash");
    assert_eq!(requests[0].max_tokens, 800);
    assert_eq!(requests[0].temperature, None);
    assert!(requests[0].messages[1].content.contains("seção \"methodology\""));
}

#[tokio::test]
async fn test_rate_limit_maps_to_failure_shape() {
    let gateway = FakeGateway::new(|_| Err(GatewayError::RateLimited));
    let (status, body) = post(
        app(gateway, None),
        "/analyze-text",
        json!({"section": "results", "content": LONG_TEXT}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Limite de requisições excedido. Tente novamente em alguns instantes."
    );
    assert_eq!(body["suggestions"], json!([]));
}

#[tokio::test]
async fn test_unparseable_reply_is_error() {
    let gateway = FakeGateway::new(|_| Ok("Desculpe, não posso ajudar.".to_string()));
    let (status, body) = post(
        app(gateway, None),
        "/analyze-document",
        json!({"documentText": LONG_TEXT, "area": "Engenharias", "premise": "p"}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Resposta inválida da IA"));
    assert_eq!(body["tips"], json!([]));
}

#[tokio::test]
async fn test_analyze_document_returns_sorted_tips() {
    let gateway = FakeGateway::new(|_| {
        Ok(json!({"tips": [
            {"id": "tip-2", "number": 2, "category": "Redação", "title": "B", "description": "b", "icon": "CheckCircle"},
            {"id": "tip-1", "number": 1, "category": "Metodologia", "title": "A", "description": "a", "icon": "Lightbulb"}
        ]})
        .to_string())
    });
    let (status, body) = post(
        app(gateway.clone(), None),
        "/analyze-document",
        json!({"documentText": LONG_TEXT, "area": "Ciências Humanas", "premise": "Premissa"}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"][0]["number"], 1);
    assert_eq!(body["tips"][1]["category"], "Redação");

    let requests = gateway.requests();
    assert_eq!(requests[0].max_tokens, 2000);
    assert!(requests[0].messages[1].content.contains("área de Ciências Humanas"));
}

fn abstract_body(language: &str) -> Value {
    json!({
        "language": language,
        "input": {
            "title": "IA na educação",
            "premise": "Premissa",
            "area": "Ciências Humanas",
            "objectives": "<p>Analisar a adoção</p>",
            "introduction": "<p>Contexto</p>",
            "methodology": "<p>Entrevistas</p>",
            "results": "<p>Adoção ampla</p>"
        }
    })
}

#[tokio::test]
async fn test_generate_both_languages() {
    let gateway = FakeGateway::new(|request| {
        if request.messages[0].content.contains("ABNT") {
            Ok("  Resumo em português.  ".to_string())
        } else {
            Ok("English abstract.".to_string())
        }
    });
    let (status, body) = post(
        app(gateway.clone(), None),
        "/generate-abstract",
        abstract_body("Ambos"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resumoPT"], "Resumo em português.");
    assert_eq!(body["resumoEN"], "English abstract.");
    assert_eq!(body["warnings"], json!([]));

    let requests = gateway.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.7));
        // Section HTML is sent as text
        assert!(!request.messages[1].content.contains("<p>"));
    }
}

#[tokio::test]
async fn test_generate_single_language() {
    let gateway = FakeGateway::new(|_| Ok("Only English.".to_string()));
    let (status, body) = post(
        app(gateway.clone(), None),
        "/generate-abstract",
        abstract_body("Inglês"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("resumoPT").is_none());
    assert_eq!(body["resumoEN"], "Only English.");
    assert_eq!(gateway.requests().len(), 1);
}

#[tokio::test]
async fn test_generate_both_fails_if_one_fails() {
    let gateway = FakeGateway::new(|request| {
        if request.messages[0].content.contains("ABNT") {
            Ok("Resumo".to_string())
        } else {
            Err(GatewayError::PaymentRequired)
        }
    });
    let (status, body) = post(app(gateway, None), "/generate-abstract", abstract_body("Ambos"), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Créditos insuficientes. Adicione créditos ao workspace."}));
}

#[tokio::test]
async fn test_long_abstract_warns() {
    let long = vec!["palavra"; 520].join(" ");
    let gateway = FakeGateway::new(move |_| Ok(long.clone()));
    let (status, body) = post(app(gateway, None), "/generate-abstract", abstract_body("Português"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    assert!(body["warnings"][0].as_str().unwrap().contains("520"));
}

#[tokio::test]
async fn test_unknown_language_rejected() {
    let gateway = FakeGateway::new(|_| panic!("gateway must not be called"));
    let (status, body) = post(app(gateway, None), "/generate-abstract", abstract_body("Espanhol"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_service_key_required_when_configured() {
    let gateway = FakeGateway::new(|_| Ok("[]".to_string()));
    let body = json!({"section": "results", "content": LONG_TEXT});

    let (status, json) = post(app(gateway.clone(), Some("segredo")), "/analyze-text", body.clone(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Missing service key");

    let (status, _) = post(app(gateway.clone(), Some("segredo")), "/analyze-text", body.clone(), Some("errado")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = post(app(gateway, Some("segredo")), "/analyze-text", body, Some("segredo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["suggestions"], json!([]));
}

#[tokio::test]
async fn test_cors_preflight_answered() {
    let gateway = FakeGateway::new(|_| panic!("gateway must not be called"));
    let response = app(gateway, Some("segredo"))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze-text")
                .header("origin", "http://localhost:8080")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "authorization, content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
