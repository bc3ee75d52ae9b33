/*
 * Responsibility
 * - JSONB ドキュメントを持つコレクション共通の CRUD
 * - テーブル名は Collection enum の閉じた集合からのみ組み立てる (ユーザー入力は必ず bind)
 * - 部分更新は `doc || patch` の shallow merge ($set 相当)
 */
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Classes,
    Feedbacks,
    Assignments,
    Submissions,
    InstructorRequests,
    Payments,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Classes => "classes",
            Collection::Feedbacks => "feedbacks",
            Collection::Assignments => "assignments",
            Collection::Submissions => "submissions",
            Collection::InstructorRequests => "instructor_requests",
            Collection::Payments => "payments",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub doc: Value,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl DocumentRow {
    /// Look up a top-level string field of the document.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(Value::as_str)
    }
}

pub fn ensure_object(doc: Value) -> RepoResult<Map<String, Value>> {
    match doc {
        Value::Object(map) => Ok(map),
        _ => Err(RepoError::NotAnObject),
    }
}

pub async fn insert(db: &PgPool, coll: Collection, doc: Value) -> RepoResult<DocumentRow> {
    let doc = Value::Object(ensure_object(doc)?);
    let sql = format!(
        r#"
        INSERT INTO {} (doc)
        VALUES ($1)
        RETURNING id, doc, "createdAt"
        "#,
        coll.table()
    );

    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(doc)
        .fetch_one(db)
        .await?;

    Ok(row)
}

pub async fn list(db: &PgPool, coll: Collection) -> RepoResult<Vec<DocumentRow>> {
    let sql = format!(
        r#"
        SELECT id, doc, "createdAt"
        FROM {}
        ORDER BY id DESC
        "#,
        coll.table()
    );

    let rows = sqlx::query_as::<_, DocumentRow>(&sql).fetch_all(db).await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, coll: Collection, id: i64) -> RepoResult<Option<DocumentRow>> {
    let sql = format!(
        r#"
        SELECT id, doc, "createdAt"
        FROM {}
        WHERE id = $1
        "#,
        coll.table()
    );

    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// All documents whose top-level `field` equals `value` (string comparison).
pub async fn find_by_field(
    db: &PgPool,
    coll: Collection,
    field: &str,
    value: &str,
) -> RepoResult<Vec<DocumentRow>> {
    let sql = format!(
        r#"
        SELECT id, doc, "createdAt"
        FROM {}
        WHERE doc ->> $1 = $2
        ORDER BY id DESC
        "#,
        coll.table()
    );

    let rows = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(field)
        .bind(value)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn find_one_by_field(
    db: &PgPool,
    coll: Collection,
    field: &str,
    value: &str,
) -> RepoResult<Option<DocumentRow>> {
    let sql = format!(
        r#"
        SELECT id, doc, "createdAt"
        FROM {}
        WHERE doc ->> $1 = $2
        ORDER BY id ASC
        LIMIT 1
        "#,
        coll.table()
    );

    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(field)
        .bind(value)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Shallow-merge `patch` into the document with `id`. Returns `None` when nothing matched.
pub async fn merge(
    db: &PgPool,
    coll: Collection,
    id: i64,
    patch: Value,
) -> RepoResult<Option<DocumentRow>> {
    let patch = Value::Object(ensure_object(patch)?);
    let sql = format!(
        r#"
        UPDATE {}
        SET doc = doc || $2
        WHERE id = $1
        RETURNING id, doc, "createdAt"
        "#,
        coll.table()
    );

    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id)
        .bind(patch)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Shallow-merge `patch` into every document whose `field` equals `value`.
pub async fn merge_by_field(
    db: &PgPool,
    coll: Collection,
    field: &str,
    value: &str,
    patch: Value,
) -> RepoResult<u64> {
    let patch = Value::Object(ensure_object(patch)?);
    let sql = format!(
        r#"
        UPDATE {}
        SET doc = doc || $3
        WHERE doc ->> $1 = $2
        "#,
        coll.table()
    );

    let result = sqlx::query(&sql)
        .bind(field)
        .bind(value)
        .bind(patch)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete(db: &PgPool, coll: Collection, id: i64) -> RepoResult<bool> {
    let sql = format!(
        r#"
        DELETE FROM {}
        WHERE id = $1
        "#,
        coll.table()
    );

    let result = sqlx::query(&sql).bind(id).execute(db).await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(db: &PgPool, coll: Collection) -> RepoResult<i64> {
    let sql = format!(r#"SELECT COUNT(*) FROM {}"#, coll.table());

    let n: i64 = sqlx::query_scalar(&sql).fetch_one(db).await?;

    Ok(n)
}

pub async fn count_by_field(
    db: &PgPool,
    coll: Collection,
    field: &str,
    value: &str,
) -> RepoResult<i64> {
    let sql = format!(
        r#"
        SELECT COUNT(*)
        FROM {}
        WHERE doc ->> $1 = $2
        "#,
        coll.table()
    );

    let n: i64 = sqlx::query_scalar(&sql)
        .bind(field)
        .bind(value)
        .fetch_one(db)
        .await?;

    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_objects_are_accepted_as_documents() {
        assert!(ensure_object(json!({"title": "Rust 101"})).is_ok());
        assert!(matches!(
            ensure_object(json!(["not", "a", "doc"])),
            Err(RepoError::NotAnObject)
        ));
        assert!(matches!(ensure_object(json!("x")), Err(RepoError::NotAnObject)));
    }

    #[test]
    fn every_collection_maps_to_its_own_table() {
        let all = [
            Collection::Users,
            Collection::Classes,
            Collection::Feedbacks,
            Collection::Assignments,
            Collection::Submissions,
            Collection::InstructorRequests,
            Collection::Payments,
        ];
        let mut tables: Vec<_> = all.iter().map(|c| c.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), all.len());
    }
}
