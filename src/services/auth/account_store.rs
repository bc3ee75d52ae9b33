use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

use crate::repos::document_repo::DocumentRow;
use crate::repos::error::RepoResult;
use crate::repos::user_repo;

/// Closed set of roles. Any other stored value is read as "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Teacher,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "teacher" => Some(Self::Teacher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

/// The slice of a users document the gate cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub role: Option<Role>,
}

impl Account {
    pub fn from_row(row: &DocumentRow) -> Self {
        Self {
            id: row.id,
            email: row.str_field("email").unwrap_or_default().to_string(),
            role: row.str_field("role").and_then(Role::parse),
        }
    }
}

/// Read-only credential store used by the role gate.
///
/// - `Ok(None)`: no Account for this identity (caller fails closed)
/// - `Err(_)`: backend failure (caller reports it as a server fault, not as forbidden)
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
}

/// Postgres-backed store over the `users` collection.
#[derive(Clone, Debug)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let row = user_repo::find_by_email(&self.db, email).await?;
        Ok(row.as_ref().map(Account::from_row))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn unknown_roles_read_as_no_role() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("teacher"), Some(Role::Teacher));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn account_is_read_from_users_document() {
        let row = DocumentRow {
            id: 7,
            doc: json!({
                "email": "t@x.com",
                "role": "teacher",
                "status": "Requested",
                "name": "T"
            }),
            created_at: Utc::now(),
        };

        let account = Account::from_row(&row);
        assert_eq!(account.id, 7);
        assert_eq!(account.email, "t@x.com");
        assert_eq!(account.role, Some(Role::Teacher));
    }

    #[test]
    fn account_without_role_field_has_no_role() {
        let row = DocumentRow {
            id: 1,
            doc: json!({ "email": "a@x.com" }),
            created_at: Utc::now(),
        };
        assert_eq!(Account::from_row(&row).role, None);
    }
}
