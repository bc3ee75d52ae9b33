/*
 * Responsibility
 * - 決済まわりの request/response DTO (client は camelCase)
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    // number or numeric string, in dollars
    #[serde(default)]
    pub price: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentResponse {
    pub payment: Value,
    // false when classId no longer exists (payment is still recorded)
    pub enrolment_updated: bool,
}
