//! Error types for `detax-core`.

use strum::{AsRefStr, Display};
use thiserror::Error;

/// The kind of row a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Document,
  Project,
  ProjectFile,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: i64 },

  #[error("invalid command: {0}")]
  Validation(String),

  /// The backing store could not complete the operation. Never retried.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("unknown event type discriminant: {0:?}")]
  UnknownEventType(String),

  #[error("channel catalog has no {0:?} channel")]
  MissingDefaultChannel(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: i64) -> Self {
    Self::NotFound { kind, id }
  }

  /// Wrap a backend error; usable directly as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(err))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
