use inscription_backend::{
    api::router::create_router,
    config::Config,
    domain::models::auth::Claims,
    domain::models::payment::{GatewayCharge, GatewayPaymentStatus, NewChargeRequest, PixQrCode},
    domain::ports::PaymentGateway,
    error::AppError,
    infra::repositories::{
        sqlite_event_repo::SqliteEventRepo,
        sqlite_inscription_repo::SqliteInscriptionRepo,
        sqlite_payment_repo::SqlitePaymentRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const WEBHOOK_TOKEN: &str = "test-webhook-token";

/// Scriptable gateway double. Charges are minted locally; poll results are
/// whatever the test last configured per charge id.
pub struct MockPaymentGateway {
    poll_status: Mutex<HashMap<String, String>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self { poll_status: Mutex::new(HashMap::new()) }
    }

    pub fn set_poll_status(&self, charge_id: &str, status: &str) {
        self.poll_status.lock().unwrap().insert(charge_id.to_string(), status.to_string());
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn find_or_create_customer(
        &self,
        _name: &str,
        _email: &str,
        cpf: &str,
        _phone: &str,
    ) -> Result<String, AppError> {
        Ok(format!("cus_{}", cpf))
    }

    async fn create_charge(&self, request: &NewChargeRequest) -> Result<GatewayCharge, AppError> {
        let id = format!("ch_{}", Uuid::new_v4());
        self.poll_status.lock().unwrap().insert(id.clone(), "PENDING".to_string());
        assert!(!request.external_reference.is_empty());
        Ok(GatewayCharge {
            id,
            status: "PENDING".to_string(),
            slip_url: None,
        })
    }

    async fn get_pix_qr_code(&self, _charge_id: &str) -> Result<PixQrCode, AppError> {
        Ok(PixQrCode {
            payload: "00020126580014br.gov.bcb.pix-mock-payload".to_string(),
            encoded_image: "aVZCT1J3MEtHZ29BQUFBTg==".to_string(),
        })
    }

    async fn get_payment(&self, charge_id: &str) -> Result<GatewayPaymentStatus, AppError> {
        let status = self.poll_status.lock().unwrap()
            .get(charge_id)
            .cloned()
            .unwrap_or_else(|| "PENDING".to_string());
        let payment_date = if status == "RECEIVED" || status == "CONFIRMED" {
            Some(Utc::now())
        } else {
            None
        };
        Ok(GatewayPaymentStatus { status, payment_date })
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub gateway: Arc<MockPaymentGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            gateway_url: "http://localhost".to_string(),
            gateway_api_key: "test-key".to_string(),
            gateway_webhook_token: WEBHOOK_TOKEN.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_audience: "inscription-frontend".to_string(),
        };

        let gateway = Arc::new(MockPaymentGateway::new());

        let state = Arc::new(AppState::build(
            config,
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteInscriptionRepo::new(pool.clone())),
            Arc::new(SqlitePaymentRepo::new(pool.clone())),
            Arc::new(SqliteUserRepo::new(pool.clone())),
            gateway.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            gateway,
        }
    }

    /// Mint an access token locally with the committed test key; in
    /// production the identity provider issues these.
    pub fn login(&self, user_id: &str) -> AuthHeaders {
        let csrf_token = "test-csrf".to_string();
        let claims = Claims {
            sub: user_id.to_string(),
            role: "ORGANIZER".to_string(),
            csrf_token: csrf_token.clone(),
            aud: "inscription-frontend".to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };

        let priv_key_pem = include_str!("keys/test_private.pem");
        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).unwrap();
        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap();

        AuthHeaders { access_token, csrf_token }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an event with one 5000-cent category and move it to OPEN.
/// Returns (event_id, category_id).
#[allow(dead_code)]
pub async fn create_open_event(app: &TestApp, auth: &AuthHeaders) -> (String, String) {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::json!({
                "title": "Community Retreat",
                "description": "Annual community retreat",
                "location": "Sitio Boa Vista",
                "starts_at": (Utc::now() + chrono::Duration::days(30)).to_rfc3339(),
                "ends_at": (Utc::now() + chrono::Duration::days(32)).to_rfc3339(),
                "payment_methods": ["PIX", "CASH"],
                "categories": [
                    { "name": "Adult", "price_cents": 5000 }
                ]
            }).to_string())).unwrap()
    ).await.unwrap();
    assert!(res.status().is_success(), "event creation failed: {}", res.status());

    let body = parse_body(res).await;
    let event_id = body["id"].as_str().unwrap().to_string();
    let category_id = body["categories"][0]["id"].as_str().unwrap().to_string();

    let open = app.router.clone().oneshot(
        Request::builder().method("PATCH").uri(format!("/api/v1/events/{}/status", event_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::json!({ "status": "OPEN" }).to_string())).unwrap()
    ).await.unwrap();
    assert!(open.status().is_success(), "opening event failed: {}", open.status());

    (event_id, category_id)
}

/// Guest registration payload with a valid CPF.
#[allow(dead_code)]
pub fn guest_payload(category_id: &str, cpf: &str) -> Value {
    serde_json::json!({
        "category_id": category_id,
        "payment_method": "PIX",
        "guest": {
            "full_name": "Joana Prado",
            "email": "joana@example.com",
            "phone": "(11) 98765-4321",
            "cpf": cpf,
            "birth_date": "1992-03-14",
            "gender": "FEMALE"
        }
    })
}
