use serde::{Deserialize, Serialize};

/// LoginRequest for authenticating an operator against a controller
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub server: String,
    pub username: String,
    pub password: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub server: String,
}

/// JWT claims structure
///
/// `sub` carries the workflow session id, not a user id: two logins by the
/// same operator get two independent sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// A selectable controller as shown on the login page
#[derive(Debug, Clone, Serialize)]
pub struct ServerOption {
    pub key: String,
    pub name: String,
    pub address: String,
}

/// ServerListResponse for the login page
#[derive(Debug, Clone, Serialize)]
pub struct ServerListResponse {
    pub customer_name: String,
    pub servers: Vec<ServerOption>,
}
