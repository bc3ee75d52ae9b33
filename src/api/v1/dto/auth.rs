/*
 * Responsibility
 * - /auth 系の request/response DTO
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `/auth/token`: the identity to sign.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required");
        }
        if email.len() > 254 || !email.contains('@') {
            return Err("email is malformed");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    // credential exp, unix seconds
    pub expires_at: i64,
    pub account: Option<Value>,
}
