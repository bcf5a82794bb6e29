//! Error handling subsystem. Implements a custom Error type for the sync engine.

use std::fmt;

pub type SyncResult<T> = std::result::Result<T, Error>;

/// Errors surfaced by the storage traits, the queue processor and the coordinator.
///
/// Mirrors the error taxonomy in the distilled spec: storage failures are
/// surfaced as-is, network/auth failures are distinguished so the coordinator
/// can map them to the right retry/event behavior.
#[derive(Debug)]
pub enum Error {
	/// Storage-adapter failure (database open/read/write).
	Storage(String),

	/// Outbound HTTP request failed before a response was received.
	Network(String),

	/// JSON (de)serialization failure.
	Serialization(String),

	/// The processor was invoked with no credential available.
	NotAuthenticated,

	/// `createDocumentOffline` was called while the repo accessor returned `None`.
	RepoUnavailable,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Storage(msg) => write!(f, "storage error: {}", msg),
			Error::Network(msg) => write!(f, "network error: {}", msg),
			Error::Serialization(msg) => write!(f, "serialization error: {}", msg),
			Error::NotAuthenticated => write!(f, "Not authenticated"),
			Error::RepoUnavailable => write!(f, "document repo unavailable"),
		}
	}
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}

// vim: ts=4
