//! Error types for the redb storage adapter.

use std::fmt;

/// Adapter-local error type; folded into [`ratatoskr_types::error::Error`] at
/// the trait boundary so callers never see a redb type.
#[derive(Debug)]
pub enum Error {
	DbError(String),
	SerializationError(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::DbError(msg) => write!(f, "Database error: {}", msg),
			Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::SerializationError(err.to_string())
	}
}

impl From<redb::DatabaseError> for Error {
	fn from(err: redb::DatabaseError) -> Self {
		Error::DbError(err.to_string())
	}
}

impl From<redb::TransactionError> for Error {
	fn from(err: redb::TransactionError) -> Self {
		Error::DbError(err.to_string())
	}
}

impl From<redb::TableError> for Error {
	fn from(err: redb::TableError) -> Self {
		Error::DbError(err.to_string())
	}
}

impl From<redb::StorageError> for Error {
	fn from(err: redb::StorageError) -> Self {
		Error::DbError(err.to_string())
	}
}

impl From<redb::CommitError> for Error {
	fn from(err: redb::CommitError) -> Self {
		Error::DbError(err.to_string())
	}
}

impl From<Error> for ratatoskr_types::error::Error {
	fn from(err: Error) -> Self {
		ratatoskr_types::error::Error::Storage(err.to_string())
	}
}

// vim: ts=4
