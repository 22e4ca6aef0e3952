mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{create_open_event, guest_payload, parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_guest_inscription_flow() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["amount_cents"], 5000);
    assert_eq!(body["cpf"], "52998224725");
    assert_eq!(body["guest_name"], "Joana Prado");
    assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn test_duplicate_guest_rejected() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let first = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Same CPF in a different formatting still collides.
    let second = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "52998224725").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = parse_body(second).await;
    assert!(body["recovery"].as_str().unwrap().contains("lookup"));
}

#[tokio::test]
async fn test_concurrent_duplicate_attempts_only_one_wins() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let payload = guest_payload(&category_id, "529.982.247-25").to_string();
    let make_request = |payload: String| {
        app.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
                .header("Content-Type", "application/json")
                .body(Body::from(payload)).unwrap()
        )
    };

    let (r1, r2) = tokio::join!(make_request(payload.clone()), make_request(payload));
    let statuses = [r1.unwrap().status(), r2.unwrap().status()];

    assert!(statuses.contains(&StatusCode::OK), "one attempt must succeed: {:?}", statuses);
    assert!(statuses.contains(&StatusCode::CONFLICT), "one attempt must lose: {:?}", statuses);
}

#[tokio::test]
async fn test_ended_event_rejects_registration() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let close = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/close", event_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(close.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("not open"));
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, _) = create_open_event(&app, &auth).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload("no-such-category", "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_guest_fields_surface_per_field() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "category_id": category_id,
                "payment_method": "PIX",
                "guest": {
                    "full_name": "X",
                    "email": "not-an-email",
                    "phone": "123",
                    "cpf": "111.111.111-11",
                    "birth_date": "1990-01-01",
                    "gender": "FEMALE"
                }
            }).to_string())).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    let details = body["details"].as_array().unwrap();
    let fields: Vec<&str> = details.iter().map(|d| d["field"].as_str().unwrap()).collect();
    assert!(fields.contains(&"cpf"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"phone"));
}

#[tokio::test]
async fn test_member_and_guest_cross_duplicate() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    // Seed a member profile with the CPF.
    let member_res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/users")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "name": "Carlos Mota",
                "email": "carlos@example.com",
                "cpf": "529.982.247-25",
                "phone": "(21) 91234-5678"
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(member_res.status(), StatusCode::OK);
    let member = parse_body(member_res).await;
    let member_id = member["id"].as_str().unwrap();

    // The member registers while logged in (no guest payload needed).
    let member_auth = app.login(member_id);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header(header::COOKIE, format!("access_token={}", member_auth.access_token))
            .header("X-CSRF-Token", &member_auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "category_id": category_id,
                "payment_method": "PIX"
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["user_id"], member_id);
    assert_eq!(body["cpf"], "52998224725");

    // A guest registration with the member's CPF must be rejected.
    let guest = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(guest.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_member_double_registration_rejected() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let member_res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/users")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "name": "Carlos Mota",
                "email": "carlos@example.com",
                "cpf": "529.982.247-25",
                "phone": "(21) 91234-5678"
            }).to_string())).unwrap()
    ).await.unwrap();
    let member = parse_body(member_res).await;
    let member_auth = app.login(member["id"].as_str().unwrap());

    let register = || {
        app.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
                .header(header::COOKIE, format!("access_token={}", member_auth.access_token))
                .header("X-CSRF-Token", &member_auth.csrf_token)
                .header("Content-Type", "application/json")
                .body(Body::from(json!({
                    "category_id": category_id,
                    "payment_method": "PIX"
                }).to_string())).unwrap()
        )
    };

    assert_eq!(register().await.unwrap().status(), StatusCode::OK);
    assert_eq!(register().await.unwrap().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_lookup_by_cpf() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri("/api/v1/inscriptions/lookup?cpf=529.982.247-25")
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["event_id"], event_id.as_str());
}

#[tokio::test]
async fn test_cancel_then_manual_confirm_fails() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let created = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    let inscription = parse_body(created).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let cancel = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/cancel", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);
    let body = parse_body(cancel).await;
    assert_eq!(body["status"], "CANCELLED");

    // Neither a second cancel nor a confirm is legal after cancellation.
    let cancel_again = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/cancel", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(cancel_again.status(), StatusCode::BAD_REQUEST);

    let confirm = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/confirm", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(confirm.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_manual_confirmation_for_cash() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-9");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let mut payload = guest_payload(&category_id, "529.982.247-25");
    payload["payment_method"] = json!("CASH");

    let created = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap();
    let inscription = parse_body(created).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    let confirm = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/confirm", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(confirm.status(), StatusCode::OK);
    let body = parse_body(confirm).await;
    assert_eq!(body["status"], "CONFIRMED");
    assert!(body["payment_id"].as_str().unwrap().starts_with("MANUAL-organizer-9-"));
}

#[tokio::test]
async fn test_delete_cancelled_inscription_allows_re_registration() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let created = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    let inscription = parse_body(created).await;
    let inscription_id = inscription["id"].as_str().unwrap();

    app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/events/{}/inscriptions/{}/cancel", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    // The cancelled row still holds the (event, cpf) slot.
    let blocked = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    let deleted = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/events/{}/inscriptions/{}", event_id, inscription_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let retry = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header("Content-Type", "application/json")
            .body(Body::from(guest_payload(&category_id, "529.982.247-25").to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(retry.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_my_inscriptions_lists_own_registrations() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, category_id) = create_open_event(&app, &auth).await;

    let member_res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/users")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "name": "Carlos Mota",
                "email": "carlos@example.com",
                "cpf": "529.982.247-25",
                "phone": "(21) 91234-5678"
            }).to_string())).unwrap()
    ).await.unwrap();
    let member = parse_body(member_res).await;
    let member_id = member["id"].as_str().unwrap();
    let member_auth = app.login(member_id);

    app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .header(header::COOKIE, format!("access_token={}", member_auth.access_token))
            .header("X-CSRF-Token", &member_auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "category_id": category_id,
                "payment_method": "PIX"
            }).to_string())).unwrap()
    ).await.unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/me/inscriptions")
            .header(header::COOKIE, format!("access_token={}", member_auth.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_id"], member_id);
}

#[tokio::test]
async fn test_list_inscriptions_requires_auth() {
    let app = TestApp::new().await;
    let auth = app.login("organizer-1");
    let (event_id, _) = create_open_event(&app, &auth).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/events/{}/inscriptions", event_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
