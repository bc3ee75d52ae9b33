/*
 * Responsibility
 * - Path の String を公開 ID 型として受け、復号して内部 ID (BIGSERIAL) へ変換する
 * - 失敗時は AppError (400 INVALID_PUBLIC_ID) へ変換
 * 置くもの
 *  - PublicId<T> の定義（ジェネリック本体）
 *  - impl FromRequestParts<AppState> for PublicId<T>
 * 置かないもの
 *  - Class / Payment といった具体リソース名 (types.rs 側)
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::AppState;

/// `id` は内部 ID、`public` はクライアントが送ってきた正規形の公開 ID
/// (子コレクションの classId などは公開 ID 文字列で保存されている)
#[derive(Clone)]
pub struct PublicId<T> {
    pub id: i64,
    pub public: String,
    _marker: PhantomData<T>,
}

impl<T> PublicId<T> {
    fn new(id: i64, public: String) -> Self {
        Self {
            id,
            public,
            _marker: PhantomData,
        }
    }
}

impl<T> FromRequestParts<AppState> for PublicId<T>
where
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(public_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_PUBLIC_ID", "invalid id"))?;
        let id = state.id_codec.decode(&public_id)?;
        Ok(Self::new(id, public_id))
    }
}

impl<T> std::fmt::Debug for PublicId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicId")
            .field("id", &self.id)
            .field("public", &self.public)
            .finish()
    }
}
