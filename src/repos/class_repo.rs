/*
 * Responsibility
 * - classes コレクション固有のクエリ (承認済み一覧, 人気順, 受講者数の加算)
 * - 汎用 CRUD は document_repo を使う
 */
use sqlx::PgPool;

use crate::repos::document_repo::DocumentRow;
use crate::repos::error::RepoResult;

pub async fn list_accepted(db: &PgPool) -> RepoResult<Vec<DocumentRow>> {
    // legacy clients wrote "acceped"
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, doc, "createdAt"
        FROM classes
        WHERE doc ->> 'status' IN ('accepted', 'acceped')
        ORDER BY id DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_popular(db: &PgPool) -> RepoResult<Vec<DocumentRow>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, doc, "createdAt"
        FROM classes
        ORDER BY COALESCE((doc ->> 'total_enrolment')::BIGINT, 0) DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// `$inc: { total_enrolment: 1 }`. Returns false when the class does not exist.
pub async fn increment_enrolment(db: &PgPool, class_id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET doc = jsonb_set(
            doc,
            '{total_enrolment}',
            to_jsonb(COALESCE((doc ->> 'total_enrolment')::BIGINT, 0) + 1)
        )
        WHERE id = $1
        "#,
    )
    .bind(class_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
