use bastion_core::errors::{AppException, DATABASE_ERROR, INTERNAL_SERVER_ERROR};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("invalid SQL identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("predicate {predicate:?} has {placeholders} placeholders but {values} values")]
    PlaceholderMismatch {
        predicate: String,
        placeholders: usize,
        values: usize,
    },

    #[error("table {0} does not support soft delete")]
    SoftDeleteUnsupported(&'static str),
}

impl From<RepoError> for AppException {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Database(e) => AppException::from(e),
            // malformed queries are programming errors, not store failures
            other => AppException::new(INTERNAL_SERVER_ERROR).with_detail(other.to_string()),
        }
    }
}

impl RepoError {
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_app_exception() {
        let db: AppException = RepoError::Database(sqlx::Error::RowNotFound).into();
        assert!(db.is(DATABASE_ERROR));

        let ident: AppException = RepoError::InvalidIdentifier("a;b".into()).into();
        assert!(ident.is(INTERNAL_SERVER_ERROR));
    }
}
