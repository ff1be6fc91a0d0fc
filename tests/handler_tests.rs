mod support;

use axum::body::Body;
use axum::http::{Method, StatusCode, header};
use bizlaunch360::gateway::{Provider, Role};
use bizlaunch360::model::PlanSections;
use bizlaunch360::server::{ALLOW_HEADERS, ALLOW_METHODS, function_names};
use serde_json::json;
use std::sync::Arc;
use support::{FakeEmail, FakeGateway, Reply, app, app_with, post_json, send, unconfigured_app};

fn assert_cors(headers: &axum::http::HeaderMap) {
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
}

/// A body that passes validation for each handler.
fn valid_body(name: &str) -> serde_json::Value {
    match name {
        "ai-assistant" => json!({ "message": "How do I price a haircut?" }),
        "generate-business-plan" => json!({ "title": "Corner Cafe" }),
        "generate-content" => json!({ "prompt": "Write a tagline" }),
        "streaming-chat" => json!({ "messages": [{ "role": "user", "content": "Hi" }] }),
        "send-email" => json!({ "to": "ada@example.com", "subject": "Hi", "text": "Hello" }),
        _ => json!({}),
    }
}

#[tokio::test]
async fn preflight_is_empty_200_with_cors_everywhere() {
    for name in function_names() {
        let router = app(FakeGateway::content("unused"));
        let response = send(
            router,
            Method::OPTIONS,
            &format!("/functions/v1/{name}"),
            Body::empty(),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK, "{name}");
        assert!(response.body.is_empty(), "{name}");
        assert_cors(&response.headers);
    }
}

#[tokio::test]
async fn missing_secret_is_a_configuration_error_for_every_handler() {
    for name in function_names() {
        let response = post_json(
            unconfigured_app(),
            &format!("/functions/v1/{name}"),
            valid_body(name),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{name}");
        assert_cors(&response.headers);
        let error = response.json()["error"].as_str().unwrap().to_string();
        assert!(error.contains("configuration"), "{name}: {error}");
    }
}

#[tokio::test]
async fn unparseable_body_is_a_server_error() {
    let router = app(FakeGateway::content("unused"));
    let response = send(
        router,
        Method::POST,
        "/functions/v1/ai-task-suggestions",
        Body::from("{not json"),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json()["error"].as_str().unwrap().contains("Invalid request body"));
    assert_cors(&response.headers);
}

#[tokio::test]
async fn missing_required_field_is_a_server_error() {
    let gateway = FakeGateway::content("unused");
    let response = post_json(
        app(gateway.clone()),
        "/functions/v1/ai-assistant",
        json!({ "conversation": [] }),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "error": "message is required" }));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn upstream_rate_limit_is_429() {
    let router = app(FakeGateway::new(Reply::RateLimited));
    let response = post_json(router, "/functions/v1/ai-marketing-ideas", json!({})).await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    let error = response.json()["error"].as_str().unwrap().to_lowercase();
    assert!(error.contains("rate limit"));
    assert_cors(&response.headers);
}

#[tokio::test]
async fn upstream_quota_is_402() {
    let router = app(FakeGateway::new(Reply::QuotaExceeded));
    let response = post_json(router, "/functions/v1/streaming-chat", valid_body("streaming-chat")).await;

    assert_eq!(response.status, StatusCode::PAYMENT_REQUIRED);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn other_upstream_status_is_500() {
    let router = app(FakeGateway::new(Reply::Status(503)));
    let response = post_json(router, "/functions/v1/ai-customer-messaging", json!({})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json()["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn assistant_extends_the_conversation() {
    let gateway = FakeGateway::content("Charge by the hour.");
    let response = post_json(
        app(gateway.clone()),
        "/functions/v1/ai-assistant",
        json!({
            "message": "How do I price a haircut?",
            "conversation": [
                { "role": "user", "content": "Hello" },
                { "role": "assistant", "content": "Hi! How can I help?" }
            ]
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["response"], "Charge by the hour.");
    assert_eq!(body["conversation"].as_array().unwrap().len(), 4);
    assert_eq!(body["conversation"][3]["role"], "assistant");

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Provider::Gateway);
    assert_eq!(calls[0].1[0].role, Role::System);
    assert_eq!(calls[0].1.len(), 4);
}

#[tokio::test]
async fn business_plan_is_coerced_to_eight_strings() {
    let gateway = FakeGateway::content(
        "Here is your plan:\n```json\n{\"executiveSummary\": \"Coffee for commuters.\", \
         \"marketAnalysis\": [\"not\", \"a\", \"string\"], \"bonus\": \"ignored\"}\n```",
    );
    let response = post_json(
        app(gateway.clone()),
        "/functions/v1/generate-business-plan",
        json!({ "title": "Corner Cafe", "context": "Downtown, 20 seats" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let plan = response.json()["plan"].clone();
    let keys: Vec<String> = plan.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), PlanSections::KEYS.len());
    for key in PlanSections::KEYS {
        assert!(plan[key].is_string(), "{key}");
    }
    assert_eq!(plan["executiveSummary"], "Coffee for commuters.");
    assert_eq!(plan["marketAnalysis"], "");

    assert_eq!(gateway.calls()[0].0, Provider::OpenAi);
}

#[tokio::test]
async fn list_handlers_fall_back_to_empty_arrays() {
    let response = post_json(
        app(FakeGateway::content("I would focus on social media.")),
        "/functions/v1/ai-marketing-ideas",
        json!({ "budget": 200 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "ideas": [] }));

    let response = post_json(
        app(FakeGateway::content("No tasks today.")),
        "/functions/v1/ai-task-suggestions",
        json!({ "businessData": { "appointments": 3 } }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "tasks": [] }));
}

#[tokio::test]
async fn forecast_without_json_is_wrapped_raw() {
    let response = post_json(
        app(FakeGateway::content("Expect modest growth.")),
        "/functions/v1/ai-financial-forecast",
        json!({}),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "forecast": { "raw": "Expect modest growth." } })
    );
}

#[tokio::test]
async fn reminder_and_message_return_text() {
    let response = post_json(
        app(FakeGateway::content("See you tomorrow at 10!")),
        "/functions/v1/ai-appointment-reminders",
        json!({ "reminderType": "24h", "appointment": { "title": "Trim" } }),
    )
    .await;
    assert_eq!(response.json(), json!({ "reminder": "See you tomorrow at 10!" }));

    let response = post_json(
        app(FakeGateway::content("Thanks for visiting!")),
        "/functions/v1/ai-customer-messaging",
        json!({ "messageType": "thank_you" }),
    )
    .await;
    assert_eq!(response.json(), json!({ "message": "Thanks for visiting!" }));
}

#[tokio::test]
async fn streams_pass_through_unchanged() {
    let chunks = vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: [DONE]\n\n",
    ];
    let expected = chunks.concat();

    for (name, provider) in [
        ("generate-content", Provider::OpenAi),
        ("streaming-chat", Provider::Gateway),
    ] {
        let gateway = FakeGateway::new(Reply::Chunks(chunks.clone()));
        let response = post_json(
            app(gateway.clone()),
            &format!("/functions/v1/{name}"),
            valid_body(name),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK, "{name}");
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/event-stream");
        assert_cors(&response.headers);
        assert_eq!(response.body, expected.as_bytes(), "{name}");
        assert_eq!(gateway.calls()[0].0, provider);
    }
}

#[tokio::test]
async fn send_email_uses_default_sender() {
    let email = Arc::new(FakeEmail::default());
    let router = app_with(FakeGateway::content("unused"), email.clone());
    let response = post_json(
        router,
        "/functions/v1/send-email",
        json!({ "to": ["ada@example.com"], "subject": "Booked", "html": "<p>Done</p>" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "id": "email-1" }));

    let sent = email.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "BizLaunch360 <noreply@bizlaunch360.test>");
}

#[tokio::test]
async fn get_is_not_allowed() {
    let router = app(FakeGateway::content("unused"));
    let response = send(router, Method::GET, "/functions/v1/ai-assistant", Body::empty()).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn null_optional_objects_fall_back_like_absent_ones() {
    let cases = [
        (
            "ai-marketing-ideas",
            json!({ "businessInfo": null, "budget": 100 }),
            "Our Business",
        ),
        (
            "ai-financial-forecast",
            json!({ "businessInfo": null, "financialData": null }),
            "Our Business",
        ),
        (
            "ai-customer-messaging",
            json!({ "customerInfo": null, "businessInfo": null, "messageType": "welcome" }),
            "Valued Customer",
        ),
        (
            "ai-appointment-reminders",
            json!({ "appointment": null, "businessInfo": null }),
            "Our Business",
        ),
    ];

    for (name, body, fallback) in cases {
        let gateway = FakeGateway::content("[]");
        let response = post_json(app(gateway.clone()), &format!("/functions/v1/{name}"), body).await;

        assert_eq!(response.status, StatusCode::OK, "{name}");
        let calls = gateway.calls();
        assert!(calls[0].1[1].content.contains(fallback), "{name}");
    }
}

#[tokio::test]
async fn null_conversation_starts_a_new_one() {
    let gateway = FakeGateway::content("Welcome aboard.");
    let response = post_json(
        app(gateway.clone()),
        "/functions/v1/ai-assistant",
        json!({ "message": "Where do I start?", "conversation": null }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["conversation"].as_array().unwrap().len(), 2);
    assert_eq!(gateway.calls()[0].1.len(), 2);
}

#[tokio::test]
async fn null_chat_messages_is_a_validation_error() {
    let response = post_json(
        app(FakeGateway::content("unused")),
        "/functions/v1/streaming-chat",
        json!({ "messages": null }),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "error": "messages is required" }));
}
