//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

impl DbError {
    /// Map an insert failure, turning unique constraint violations into `Duplicate`
    pub(crate) fn from_insert(err: sqlx::Error, what: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(what.into())
            }
            _ => DbError::Connection(err),
        }
    }
}
