/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - unique 制約違反だけは Conflict として区別する (例: users の email)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(sqlx::Error),
    #[error("unique constraint violated")]
    Conflict,
    // JSONB の doc はオブジェクトのみ受け付ける ($set 相当の merge が前提)
    #[error("document must be a JSON object")]
    NotAnObject,
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            RepoError::Conflict
        } else {
            RepoError::Db(err)
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_stay_db_errors() {
        assert!(matches!(
            RepoError::from(sqlx::Error::RowNotFound),
            RepoError::Db(_)
        ));
        assert!(matches!(
            RepoError::from(sqlx::Error::PoolTimedOut),
            RepoError::Db(_)
        ));
    }
}
