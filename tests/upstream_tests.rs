//! Real HTTP clients against a local axum server standing in for the
//! model gateway, the email provider and the hosted database.

mod support;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use bizlaunch360::email::{EmailSender, OutgoingEmail, ResendClient};
use bizlaunch360::gateway::{ChatGateway, ChatMessage, GatewayError, HttpGateway, Provider};
use bizlaunch360::model::{Appointment, AppointmentStatus};
use bizlaunch360::storage::{RestBackend, Session, StorageError, Store};
use bizlaunch360::{AppState, ServerConfig, build_router};
use futures::TryStreamExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use support::{all_secrets, post_json};
use tokio::net::TcpListener;

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";

/// Completion endpoint whose behaviour depends on the path prefix.
fn fake_provider(seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>) -> Router {
    Router::new().route(
        "/{mode}/chat/completions",
        post(
            move |Path(mode): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    let streaming = body["stream"] == json!(true);
                    seen.lock().push((headers, body));
                    match mode.as_str() {
                        "limited" => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
                        "billing" => (StatusCode::PAYMENT_REQUIRED, "pay up").into_response(),
                        "broken" => (StatusCode::BAD_GATEWAY, "oops").into_response(),
                        "empty" => Json(json!({ "choices": [] })).into_response(),
                        _ if streaming => (
                            [("content-type", "text/event-stream")],
                            SSE_BODY,
                        )
                            .into_response(),
                        _ => Json(json!({
                            "choices": [{ "message": { "role": "assistant",
                                "content": "```json\n[{\"title\": \"Post on Instagram\"}]\n```" } }]
                        }))
                        .into_response(),
                    }
                }
            },
        ),
    )
}

fn config_for(base: &str, mode: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.gateway.base_url = format!("{base}/{mode}");
    config.openai.base_url = format!("{base}/{mode}");
    config.email.base_url = base.to_string();
    config
}

#[tokio::test]
async fn completion_sends_model_and_bearer_key() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(fake_provider(seen.clone())).await;
    let config = config_for(&base, "ok");
    let gateway = HttpGateway::new(&config, Arc::new(all_secrets())).unwrap();

    let content = gateway
        .complete(Provider::Gateway, vec![ChatMessage::user("ideas?")])
        .await
        .unwrap();
    assert!(content.contains("Post on Instagram"));

    let (headers, body) = seen.lock()[0].clone();
    assert_eq!(headers["authorization"], "Bearer gateway-key");
    assert_eq!(body["model"], json!(config.gateway.model));
    assert_eq!(body["messages"][0], json!({ "role": "user", "content": "ideas?" }));
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn openai_provider_uses_its_own_key() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(fake_provider(seen.clone())).await;
    let config = config_for(&base, "ok");
    let gateway = HttpGateway::new(&config, Arc::new(all_secrets())).unwrap();

    gateway
        .complete(Provider::OpenAi, vec![ChatMessage::user("plan")])
        .await
        .unwrap();

    let (headers, body) = seen.lock()[0].clone();
    assert_eq!(headers["authorization"], "Bearer openai-key");
    assert_eq!(body["model"], json!(config.openai.model));
}

#[tokio::test]
async fn status_codes_map_onto_gateway_errors() {
    let base = spawn(fake_provider(Arc::new(Mutex::new(Vec::new())))).await;

    for mode in ["limited", "billing", "broken", "empty"] {
        let config = config_for(&base, mode);
        let gateway = HttpGateway::new(&config, Arc::new(all_secrets())).unwrap();
        let error = gateway
            .complete(Provider::Gateway, vec![ChatMessage::user("x")])
            .await
            .unwrap_err();
        match (mode, &error) {
            ("limited", GatewayError::RateLimited)
            | ("billing", GatewayError::QuotaExceeded)
            | ("broken", GatewayError::Status { status: 502, .. })
            | ("empty", GatewayError::Malformed(_)) => {}
            _ => panic!("{mode}: unexpected {error}"),
        }
    }
}

#[tokio::test]
async fn stream_requests_stream_and_forwards_bytes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(fake_provider(seen.clone())).await;
    let config = config_for(&base, "ok");
    let gateway = HttpGateway::new(&config, Arc::new(all_secrets())).unwrap();

    let stream = gateway
        .stream(Provider::Gateway, vec![ChatMessage::user("hi")])
        .await
        .unwrap();
    let chunks: Vec<_> = stream.try_collect().await.unwrap();
    let body: Vec<u8> = chunks.concat();

    assert_eq!(body, SSE_BODY.as_bytes());
    assert_eq!(seen.lock()[0].1["stream"], json!(true));
}

#[tokio::test]
async fn task_suggestions_end_to_end() {
    let base = spawn(fake_provider(Arc::new(Mutex::new(Vec::new())))).await;
    let state = AppState::new(Arc::new(config_for(&base, "ok")), Arc::new(all_secrets())).unwrap();
    let router = build_router(Arc::new(state));

    let response = post_json(
        router,
        "/functions/v1/ai-task-suggestions",
        json!({ "businessData": { "openInvoices": 2 } }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "tasks": [{ "title": "Post on Instagram" }] })
    );
}

#[tokio::test]
async fn resend_client_posts_the_message() {
    let seen = Arc::new(Mutex::new(Vec::<(HeaderMap, Value)>::new()));
    let captured = seen.clone();
    let router = Router::new().route(
        "/emails",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                captured.lock().push((headers, body));
                Json(json!({ "id": "msg_123" }))
            }
        }),
    );
    let base = spawn(router).await;
    let client = ResendClient::new(&config_for(&base, "ok"), Arc::new(all_secrets())).unwrap();

    let id = client
        .send(OutgoingEmail {
            from: client.default_from().to_string(),
            to: vec!["ada@example.com".into()],
            subject: "Booked".into(),
            html: None,
            text: Some("See you".into()),
        })
        .await
        .unwrap();
    assert_eq!(id, "msg_123");

    let (headers, body) = seen.lock()[0].clone();
    assert_eq!(headers["authorization"], "Bearer email-key");
    assert_eq!(body["to"], json!(["ada@example.com"]));
    assert!(body.get("html").is_none());
}

/// Minimal auth + table endpoints for the appointments adapter.
fn fake_database(seen: Arc<Mutex<Vec<(String, HashMap<String, String>, Value)>>>) -> Router {
    let patch_seen = seen.clone();
    let select_seen = seen.clone();
    Router::new()
        .route(
            "/auth/v1/user",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .is_some_and(|value| value == "Bearer good-token");
                if authorized && headers.get("apikey").is_some_and(|v| v == "anon-key") {
                    Json(json!({ "id": "user-1", "email": "owner@example.com" })).into_response()
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "invalid JWT" })))
                        .into_response()
                }
            }),
        )
        .route(
            "/rest/v1/appointments",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().push(("POST".into(), HashMap::new(), body.clone()));
                    let mut row = body;
                    row["id"] = json!("appt-1");
                    Json(json!([row]))
                }
            })
            .patch(
                move |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                    let seen = patch_seen.clone();
                    async move {
                        seen.lock().push(("PATCH".into(), query, body));
                        Json(json!([{
                            "id": "appt-1", "user_id": "user-1", "title": "Cut",
                            "customer_name": "Ada", "appointment_date": "2024-06-01",
                            "appointment_time": "10:00:00", "duration": 30, "status": "cancelled"
                        }]))
                    }
                },
            )
            .get(move |Query(query): Query<HashMap<String, String>>| {
                let seen = select_seen.clone();
                async move {
                    seen.lock().push(("GET".into(), query, Value::Null));
                    Json(json!([]))
                }
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
}

fn appointment() -> Appointment {
    Appointment {
        id: None,
        title: "Cut".into(),
        customer_name: "Ada".into(),
        customer_email: None,
        customer_phone: None,
        date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        time: "10:00".into(),
        duration: 30,
        status: AppointmentStatus::Pending,
        service_name: None,
        notes: None,
    }
}

#[tokio::test]
async fn rest_backend_speaks_postgrest() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(fake_database(seen.clone())).await;
    let backend = RestBackend::new(base, "anon-key", None).unwrap();
    let store = Store::new(Arc::new(backend));
    let session = Session::new("good-token");

    let saved = store.save_appointment(&session, &appointment()).await.unwrap();
    assert_eq!(saved.id.as_deref(), Some("appt-1"));

    let updated = store
        .update_appointment_status(&session, "appt-1", AppointmentStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(updated.status, AppointmentStatus::Cancelled);
    assert_eq!(updated.time, "10:00");

    let loaded = store.load_appointments(&session).await.unwrap();
    assert!(loaded.is_empty());

    store.delete_appointment(&session, "appt-1").await.unwrap();

    let seen = seen.lock();
    let (_, _, inserted) = &seen[0];
    assert_eq!(inserted["user_id"], "user-1");
    assert_eq!(inserted["appointment_date"], "2024-06-01");
    assert!(inserted.get("id").is_none());

    let (_, patch_query, patch_body) = &seen[1];
    assert_eq!(patch_query["id"], "eq.appt-1");
    assert_eq!(patch_body, &json!({ "status": "cancelled" }));

    let (_, select_query, _) = &seen[2];
    assert_eq!(select_query["user_id"], "eq.user-1");
    assert_eq!(select_query["order"], "appointment_date.asc");
}

#[tokio::test]
async fn rest_backend_without_user_is_not_authenticated() {
    let base = spawn(fake_database(Arc::new(Mutex::new(Vec::new())))).await;
    let backend = RestBackend::new(base, "anon-key", None).unwrap();
    let store = Store::new(Arc::new(backend));

    let error = store
        .load_appointments(&Session::new("expired"))
        .await
        .unwrap_err();
    assert!(matches!(error, StorageError::NotAuthenticated));
}
