use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub gateway_webhook_token: String,
    pub jwt_public_key: String, // Public key only (PEM); token issuance lives outside this service
    pub auth_audience: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            gateway_url: env::var("GATEWAY_URL").unwrap_or_else(|_| "https://api.payment-gateway.local/v3".to_string()),
            gateway_api_key: env::var("GATEWAY_API_KEY").expect("GATEWAY_API_KEY must be set"),
            gateway_webhook_token: env::var("GATEWAY_WEBHOOK_TOKEN").unwrap_or_default(),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "inscription-frontend".to_string()),
        }
    }
}
