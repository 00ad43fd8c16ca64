use thiserror::Error;

use super::LookupKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("{kind} lookup failed: {message}")]
    Network { kind: LookupKind, message: String },

    #[error("{kind} lookup returned HTTP {status}: {body}")]
    Status {
        kind: LookupKind,
        status: u16,
        body: String,
    },

    #[error("{kind} lookup returned an unexpected body: {message}")]
    Parse { kind: LookupKind, message: String },

    #[error("no nationality data found")]
    NoNationality,
}

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;
