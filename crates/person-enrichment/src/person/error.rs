use thiserror::Error;

use super::PersonId;

#[derive(Error, Debug)]
pub enum PersonError {
    #[error("Person not found: {0}")]
    NotFound(PersonId),

    #[error("Invalid person data: {0}")]
    InvalidData(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type PersonResult<T> = Result<T, PersonError>;
