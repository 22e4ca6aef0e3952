use serde::{Deserialize, Serialize};

/// Claims of the externally issued access token. Only verification happens
/// in this service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub csrf_token: String,
    pub aud: String,
    pub exp: usize,
}

/// Verified caller identity resolved from an access token.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub id: String,
    pub role: String,
}
