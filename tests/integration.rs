use actix_web::{test, web, App};

use paystream_gateway::config::GatewayConfig;
use paystream_gateway::providers::payment::Currency;
use paystream_gateway::routes;
use paystream_gateway::signature;
use paystream_gateway::state::AppState;

fn test_config() -> GatewayConfig {
    GatewayConfig {
        port: 0,
        payment_key_id: Some("key_test".to_string()),
        payment_key_secret: Some("test-secret".to_string()),
        payment_api_base: "http://localhost:1".to_string(),
        generation_api_key: None,
        generation_model: "test-model".to_string(),
        generation_api_base: "http://localhost:1".to_string(),
        order_currency: Currency::Inr,
        allowed_origins: vec![],
        rate_limit_rpm: 120,
        metrics_token: None,
    }
}

fn make_state(config: GatewayConfig) -> web::Data<AppState> {
    web::Data::new(AppState::from_config(config))
}

#[actix_rt::test]
async fn test_health_reports_ok() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], true);
}

#[actix_rt::test]
async fn test_orders_rejects_non_positive_amount() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    for amount in [0.0, -19.99] {
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(serde_json::json!({ "amount": amount }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation");
    }
}

#[actix_rt::test]
async fn test_orders_requires_provider_credentials() {
    let config = GatewayConfig {
        payment_key_id: None,
        payment_key_secret: None,
        ..test_config()
    };
    let app = test::init_service(
        App::new()
            .app_data(make_state(config))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "amount": 19.99 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration");
}

#[actix_rt::test]
async fn test_verify_rejects_missing_fields() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    let bodies = [
        serde_json::json!({}),
        serde_json::json!({ "orderId": "order_1" }),
        serde_json::json!({ "orderId": "order_1", "referenceId": "pay_1", "suppliedSignature": "" }),
    ];
    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/payments/verify")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation");
    }
}

#[actix_rt::test]
async fn test_verify_accepts_valid_signature_and_publishes_exactly_once() {
    let state = make_state(test_config());
    let mut rx = state.dispatcher.subscribe();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure),
    )
    .await;

    let sig = signature::compute_signature(b"test-secret", "order_1", "pay_1");
    let req = test::TestRequest::post()
        .uri("/payments/verify")
        .set_json(serde_json::json!({
            "orderId": "order_1",
            "referenceId": "pay_1",
            "suppliedSignature": sig,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.order_id, "order_1");
    assert_eq!(event.reference_id, "pay_1");
    assert!(rx.try_recv().is_err(), "expected exactly one published event");
}

#[actix_rt::test]
async fn test_verify_rejects_bad_signature_and_publishes_nothing() {
    let state = make_state(test_config());
    let mut rx = state.dispatcher.subscribe();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/payments/verify")
        .set_json(serde_json::json!({
            "orderId": "order_1",
            "referenceId": "pay_1",
            "suppliedSignature": "deadbeef",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Failure to verify is not a transport error
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    assert!(rx.try_recv().is_err(), "no event may be published on failure");
}

#[actix_rt::test]
async fn test_verify_requires_secret_configuration() {
    let config = GatewayConfig {
        payment_key_id: None,
        payment_key_secret: None,
        ..test_config()
    };
    let app = test::init_service(
        App::new()
            .app_data(make_state(config))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/payments/verify")
        .set_json(serde_json::json!({
            "orderId": "order_1",
            "referenceId": "pay_1",
            "suppliedSignature": "deadbeef",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration");
}

#[actix_rt::test]
async fn test_generate_rejects_empty_prompt_before_stream_start() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    for prompt in ["", "   "] {
        let req = test::TestRequest::post()
            .uri("/generate")
            .set_json(serde_json::json!({ "prompt": prompt }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation");
    }
}

#[actix_rt::test]
async fn test_generate_requires_api_key() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(serde_json::json!({ "prompt": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration");
}

#[actix_rt::test]
async fn test_chat_requires_api_key() {
    let app = test::init_service(
        App::new()
            .app_data(make_state(test_config()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(serde_json::json!({ "prompt": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration");
}

#[actix_rt::test]
async fn test_events_opens_sse_stream() {
    let state = make_state(test_config());
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/events").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
}

#[actix_rt::test]
async fn test_metrics_gated_by_bearer_token() {
    let config = GatewayConfig {
        metrics_token: Some("metrics-token-123".to_string()),
        ..test_config()
    };
    let app = test::init_service(
        App::new()
            .app_data(make_state(config))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer wrong-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer metrics-token-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
