/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, id_codec: IdCodec, auth: AuthService (署名シークレット + account store), payments
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - グローバル変数は使わず、app::build_state で組み立てて注入する
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, id_codec::IdCodec, payment::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("id_codec", &self.id_codec)
            .field("auth", &self.auth)
            .finish()
    }
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        id_codec: IdCodec,
        auth: Arc<AuthService>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            id_codec,
            auth,
            payments,
        }
    }
}
