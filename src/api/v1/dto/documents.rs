/*
 * Responsibility
 * - JSONB ドキュメントの request/response 整形
 * - response は `{ "_id": <公開 ID>, "createdAt": ..., ...doc }` (内部 ID は漏らさない)
 * - doc 自身が createdAt を持っていればそちらを優先する
 * - request 側はオブジェクトであること・`_id` を書き換えさせないことだけを保証する
 */
use serde_json::Value;

use crate::error::AppError;
use crate::repos::document_repo::DocumentRow;
use crate::services::id_codec::IdCodec;

pub fn render(codec: &IdCodec, row: DocumentRow) -> Result<Value, AppError> {
    let public_id = codec.encode(row.id)?;

    let mut doc = match row.doc {
        Value::Object(map) => map,
        _ => return Err(AppError::Internal),
    };
    doc.insert("_id".into(), Value::String(public_id));
    doc.entry("createdAt")
        .or_insert_with(|| Value::String(row.created_at.to_rfc3339()));

    Ok(Value::Object(doc))
}

pub fn render_all(codec: &IdCodec, rows: Vec<DocumentRow>) -> Result<Vec<Value>, AppError> {
    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(render(codec, row)?);
    }
    Ok(res)
}

/// Accept a client document: must be an object, `_id` is server-owned.
pub fn accept(body: Value) -> Result<Value, AppError> {
    match body {
        Value::Object(mut map) => {
            map.remove("_id");
            Ok(Value::Object(map))
        }
        _ => Err(AppError::bad_request(
            "INVALID_DOCUMENT",
            "body must be a JSON object",
        )),
    }
}

/// A required, non-blank top-level string field.
pub fn required_str<'a>(doc: &'a Value, key: &'static str) -> Result<&'a str, AppError> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("MISSING_FIELD", format!("{key} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn codec() -> IdCodec {
        IdCodec::new(
            10,
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
        )
        .unwrap()
    }

    #[test]
    fn rendered_document_carries_public_id_only() {
        let codec = codec();
        let row = DocumentRow {
            id: 3,
            doc: json!({ "title": "Intro to Rust", "price": 25 }),
            created_at: Utc::now(),
        };

        let out = render(&codec, row).unwrap();
        let public = out["_id"].as_str().unwrap();
        assert_eq!(codec.decode(public).unwrap(), 3);
        assert_eq!(out["title"], "Intro to Rust");
        assert_eq!(out["price"], 25);
        assert!(out["createdAt"].is_string());
    }

    #[test]
    fn client_created_at_is_kept() {
        let row = DocumentRow {
            id: 4,
            doc: json!({ "createdAt": "2024-01-01" }),
            created_at: Utc::now(),
        };

        let out = render(&codec(), row).unwrap();
        assert_eq!(out["createdAt"], "2024-01-01");
    }

    #[test]
    fn client_cannot_set_id() {
        let doc = accept(json!({ "_id": "spoofed", "title": "x" })).unwrap();
        assert!(doc.get("_id").is_none());
        assert!(accept(json!([1, 2])).is_err());
    }

    #[test]
    fn required_fields_must_be_non_blank_strings() {
        let doc = json!({ "email": "a@x.com", "blank": "  ", "n": 1 });
        assert_eq!(required_str(&doc, "email").unwrap(), "a@x.com");
        assert!(required_str(&doc, "blank").is_err());
        assert!(required_str(&doc, "n").is_err());
        assert!(required_str(&doc, "missing").is_err());
    }
}
