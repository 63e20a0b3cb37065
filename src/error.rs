//! Client-facing refusal taxonomy.
//!
//! Every request either succeeds or comes back as exactly one of these
//! kinds. Validation refusals carry a human-readable message and are never
//! written to the event log.

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// Referenced match, stack, or player does not exist.
    NotFound(String),
    /// Caller is not the current actor or does not own the stack.
    Forbidden(String),
    /// Destination blocked, out of range, dead stack, defer-twice, etc.
    Illegal(String),
    /// Precondition held at read time but not inside the lock.
    Stale(String),
    /// The match's exclusive lock could not be acquired in time.
    Busy,
    /// Optimistic version mismatch persisted through all retries.
    Conflict,
    /// Unexpected programmer error; details go to the log, not the client.
    Internal(String),
}

impl Refusal {
    /// Stable wire identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Refusal::NotFound(_) => "not_found",
            Refusal::Forbidden(_) => "forbidden",
            Refusal::Illegal(_) => "illegal_action",
            Refusal::Stale(_) => "stale_state",
            Refusal::Busy => "busy",
            Refusal::Conflict => "conflict",
            Refusal::Internal(_) => "internal",
        }
    }
    /// Message safe to show to the caller.
    pub fn message(&self) -> String {
        match self {
            Refusal::NotFound(m) => m.clone(),
            Refusal::Forbidden(m) => m.clone(),
            Refusal::Illegal(m) => m.clone(),
            Refusal::Stale(m) => m.clone(),
            Refusal::Busy => "match is busy, try again".to_string(),
            Refusal::Conflict => "match changed concurrently, try again".to_string(),
            Refusal::Internal(_) => "internal error".to_string(),
        }
    }
}

impl std::fmt::Display for Refusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for Refusal {}

impl From<tokio_postgres::Error> for Refusal {
    fn from(e: tokio_postgres::Error) -> Self {
        Refusal::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for Refusal {
    fn from(e: anyhow::Error) -> Self {
        Refusal::Internal(e.to_string())
    }
}
