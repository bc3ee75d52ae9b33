/*
 * Responsibility
 * - users コレクション (= Account) 向けの操作
 * - email を identity key として扱う
 * - 初回接触時の upsert と status 更新
 * - role は初回作成時にも受け取らない (role 変更は admin gate の内側の PATCH のみ)
 */
use chrono::Utc;
use serde_json::{Value, json};
use sqlx::PgPool;

use crate::repos::document_repo::{self, Collection, DocumentRow};
use crate::repos::error::{RepoError, RepoResult};

/// Status value the client sends when a user asks to become an instructor.
pub const STATUS_REQUESTED: &str = "Requested";

#[derive(Debug)]
pub enum UpsertOutcome {
    Created(DocumentRow),
    StatusUpdated(DocumentRow),
    Existing(DocumentRow),
}

/// What first contact should do, given whether the account already exists.
#[derive(Debug, PartialEq, Eq)]
enum UpsertPlan {
    Create,
    SetStatus(String),
    Keep,
}

fn plan_upsert(exists: bool, profile: &Value) -> UpsertPlan {
    if !exists {
        return UpsertPlan::Create;
    }

    match profile.get("status").and_then(Value::as_str) {
        Some(status) if status == STATUS_REQUESTED => UpsertPlan::SetStatus(status.to_owned()),
        _ => UpsertPlan::Keep,
    }
}

/// The document stored for a brand-new account.
fn new_account_doc(email: &str, profile: Value) -> RepoResult<Value> {
    let mut doc = document_repo::ensure_object(profile)?;
    doc.remove("role");
    doc.insert("email".into(), Value::String(email.to_owned()));
    doc.insert("timestamp".into(), json!(Utc::now().timestamp_millis()));
    Ok(Value::Object(doc))
}

pub async fn find_by_email(db: &PgPool, email: &str) -> RepoResult<Option<DocumentRow>> {
    document_repo::find_one_by_field(db, Collection::Users, "email", email).await
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<DocumentRow>> {
    document_repo::list(db, Collection::Users).await
}

/// Insert the account on first contact.
///
/// - 既存 + status == "Requested" → status のみ更新
/// - 既存 + それ以外            → 既存をそのまま返す
/// - 未登録                      → timestamp (ms) を付けて作成
///
/// 同じ email の同時作成は ON CONFLICT で片方だけが作成し、もう片方は既存扱いになる
pub async fn upsert_on_first_contact(
    db: &PgPool,
    email: &str,
    profile: Value,
) -> RepoResult<UpsertOutcome> {
    let existing = find_by_email(db, email).await?;

    let existing = match existing {
        Some(row) => row,
        None => {
            let doc = new_account_doc(email, profile.clone())?;
            if let Some(row) = insert_if_absent(db, doc).await? {
                return Ok(UpsertOutcome::Created(row));
            }
            // lost the race to a concurrent first contact
            find_by_email(db, email)
                .await?
                .ok_or(RepoError::Db(sqlx::Error::RowNotFound))?
        }
    };

    match plan_upsert(true, &profile) {
        UpsertPlan::SetStatus(status) => {
            let row =
                document_repo::merge(db, Collection::Users, existing.id, json!({ "status": status }))
                    .await?
                    .unwrap_or(existing);
            Ok(UpsertOutcome::StatusUpdated(row))
        }
        UpsertPlan::Keep | UpsertPlan::Create => Ok(UpsertOutcome::Existing(existing)),
    }
}

async fn insert_if_absent(db: &PgPool, doc: Value) -> RepoResult<Option<DocumentRow>> {
    let row = sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO users (doc)
        VALUES ($1)
        ON CONFLICT ((doc ->> 'email')) DO NOTHING
        RETURNING id, doc, "createdAt"
        "#,
    )
    .bind(doc)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn merge_by_email(db: &PgPool, email: &str, patch: Value) -> RepoResult<u64> {
    document_repo::merge_by_field(db, Collection::Users, "email", email, patch).await
}
