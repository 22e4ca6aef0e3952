mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use common::{create_open_event, guest_payload, parse_body, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn register_guest(app: &TestApp, event_id: &str, category_id: &str) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

async fn create_payment(app: &TestApp, event_id: &str, inscription_id: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/payment", event_id, inscription_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_create_pix_payment() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let res = create_payment(&app, &event_id, inscription_id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let payment = parse_body(res).await;

    assert_eq!(payment["status"], "PENDING");
    assert_eq!(payment["amount_cents"], 5000);
    assert_eq!(payment["billing_type"], "PIX");
    assert_eq!(
        payment["external_reference"],
        format!("{}:{}", event_id, inscription_id).as_str()
    );
    assert!(payment["pix_payload"].as_str().unwrap().contains("pix"));
    assert!(payment["charge_id"].as_str().unwrap().starts_with("ch_"));

    // Due date sits three days out.
    let due: DateTime<Utc> = payment["due_date"].as_str().unwrap().parse().unwrap();
    let offset = due - Utc::now();
    assert!(offset > Duration::days(2) && offset <= Duration::days(3), "due in {:?}", offset);

    // The inscription now references its payment.
    let ins = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/events/{}/inscriptions/{}", event_id, inscription_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let ins_body = parse_body(ins).await;
    assert_eq!(ins_body["payment_id"], payment["id"]);
    assert_eq!(ins_body["status"], "PENDING");
}

#[tokio::test]
async fn test_repeated_calls_reuse_charge_while_unpaid() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let first = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    let second = parse_body(create_payment(&app, &event_id, inscription_id).await).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["charge_id"], second["charge_id"]);
    assert_eq!(second["status"], "PENDING");
}

#[tokio::test]
async fn test_pull_reconciliation_confirms_inscription() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let payment = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    let charge_id = payment["charge_id"].as_str().unwrap();

    // Money arrives at the gateway; no webhook is delivered.
    app.gateway.set_poll_status(charge_id, "RECEIVED");

    let res = create_payment(&app, &event_id, inscription_id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let reconciled = parse_body(res).await;
    assert_eq!(reconciled["status"], "RECEIVED");
    assert!(!reconciled["paid_at"].is_null());

    let ins = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/events/{}/inscriptions/{}", event_id, inscription_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let ins_body = parse_body(ins).await;
    assert_eq!(ins_body["status"], "CONFIRMED");

    // A further call returns the confirmed payment untouched.
    let again = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    assert_eq!(again["id"], reconciled["id"]);
    assert_eq!(again["status"], "RECEIVED");
}

#[tokio::test]
async fn test_pull_reconciliation_marks_overdue() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let payment = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    app.gateway.set_poll_status(payment["charge_id"].as_str().unwrap(), "OVERDUE");

    let reconciled = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    assert_eq!(reconciled["status"], "OVERDUE");

    // The registration stays pending; an overdue charge is not a cancellation.
    let ins = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/events/{}/inscriptions/{}", event_id, inscription_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(ins).await["status"], "PENDING");
}

#[tokio::test]
async fn test_cash_inscription_gets_no_gateway_charge() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let mut payload = guest_payload(&category_id, "529.982.247-25");
    payload["payment_method"] = json!("CASH");
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap();
    let inscription = parse_body(res).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let res = create_payment(&app, &event_id, inscription_id).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_payment_by_id() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let payment = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    let payment_id = payment["id"].as_str().unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/payments/{}", payment_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["charge_id"], payment["charge_id"]);

    let missing = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/payments/no-such-payment")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_summary_counts_and_revenue() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;
    let inscription = register_guest(&app, &event_id, &category_id).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let payment = parse_body(create_payment(&app, &event_id, inscription_id).await).await;
    app.gateway.set_poll_status(payment["charge_id"].as_str().unwrap(), "CONFIRMED");
    create_payment(&app, &event_id, inscription_id).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/events/{}/summary", event_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let summary = parse_body(res).await;
    assert_eq!(summary["confirmed"], 1);
    assert_eq!(summary["pending"], 0);
    assert_eq!(summary["confirmed_revenue_cents"], 5000);
    assert_eq!(summary["confirmed_revenue"], "R$ 50,00");
}
