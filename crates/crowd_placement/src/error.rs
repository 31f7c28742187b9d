//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed geometry, invalid configuration, precondition violations at call
//! boundaries, unknown body types and field lifecycle misuse.
//!
//! Running out of space is not an error: a full agent store is reported through
//! [`crate::agent::AgentStore::add`] returning `Ok(false)` and through placement
//! returning fewer agents than requested.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("unknown body type '{name}'")]
    UnknownBodyType { name: String },

    #[error("domain has already been set")]
    DomainAlreadySet,

    #[error("domain has not been set")]
    MissingDomain,

    #[error("sampling surface is not contained in the domain")]
    SurfaceOutsideDomain,

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
