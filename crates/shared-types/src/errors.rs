//! Error taxonomy shared by the replay crates
//!
//! Integrity violations mean the trace is malformed and the session cannot
//! continue. Lookup failures are recoverable and only concern the caller
//! that asked.

use crate::entities::EntityKind;
use crate::{EntityId, Nanoseconds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ReplayError {
    // Integrity violations
    #[error("Event at {time} references unknown entity {id}")]
    UnknownEntity { id: EntityId, time: Nanoseconds },

    #[error("Collection {collection} references unknown member {member}")]
    UnknownMember {
        collection: EntityId,
        member: EntityId,
    },

    #[error("Collection {collection} member {member} is a {actual}, expected a point series")]
    MemberNotPointSeries {
        collection: EntityId,
        member: EntityId,
        actual: EntityKind,
    },

    #[error("Entity id {id} is registered more than once")]
    DuplicateEntity { id: EntityId },

    #[error("{event} event for entity {id} expects a {expected} but found a {actual}")]
    EventKindMismatch {
        id: EntityId,
        event: String,
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("Category {category} is not defined on category series {id}")]
    UnknownCategory { id: EntityId, category: u32 },

    #[error("Category series {id} auto-advances with a non-positive interval {interval}")]
    InvalidAdvanceInterval { id: EntityId, interval: Nanoseconds },

    #[error("Replay session aborted: {reason}")]
    SessionAborted { reason: String },

    // Recoverable lookups
    #[error("Entity not found: {id}")]
    NotFound { id: EntityId },

    #[error("View not found: {view}")]
    ViewNotFound { view: u32 },

    // Loading
    #[error("Trace parse error: {message}")]
    TraceParse {
        message: String,
        line: Option<usize>,
    },

    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Result type alias for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

impl ReplayError {
    /// Whether this error means the loaded trace cannot be replayed
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ReplayError::UnknownEntity { .. }
                | ReplayError::UnknownMember { .. }
                | ReplayError::MemberNotPointSeries { .. }
                | ReplayError::DuplicateEntity { .. }
                | ReplayError::EventKindMismatch { .. }
                | ReplayError::UnknownCategory { .. }
                | ReplayError::InvalidAdvanceInterval { .. }
                | ReplayError::SessionAborted { .. }
        )
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(err: serde_json::Error) -> Self {
        ReplayError::TraceParse {
            message: err.to_string(),
            line: Some(err.line()),
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(err: std::io::Error) -> Self {
        ReplayError::Io {
            message: err.to_string(),
        }
    }
}
