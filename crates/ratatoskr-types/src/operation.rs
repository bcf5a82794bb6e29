//! Pending operations queue (C3) types.

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// The only operation kind the core currently dispatches; kept as an enum
/// (rather than a bare string) so adding a second kind later is a compile-time
/// exhaustiveness check at every match site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
	RegisterDocument,
}

impl OperationType {
	pub fn as_str(&self) -> &'static str {
		match self {
			OperationType::RegisterDocument => "register_document",
		}
	}
}

/// Bag of fields attached to a `register_document` operation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OperationPayload {
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub doc_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<Timestamp>,
}

/// A server-bound intent record, persisted until it succeeds, is removed, or
/// reaches [`crate::queue::MAX_ATTEMPTS`] and becomes terminal-failed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingOperation {
	pub id: Box<str>,
	pub op_type: OperationType,
	pub document_id: Box<str>,
	pub payload: OperationPayload,
	pub created_at: Timestamp,
	pub attempts: u32,
	pub last_attempt: Option<Timestamp>,
	pub next_retry: Option<Timestamp>,
	pub error: Option<String>,
}

impl PendingOperation {
	pub fn new_register_document(
		id: impl Into<Box<str>>,
		document_id: impl Into<Box<str>>,
		payload: OperationPayload,
	) -> Self {
		Self {
			id: id.into(),
			op_type: OperationType::RegisterDocument,
			document_id: document_id.into(),
			payload,
			created_at: Timestamp::now(),
			attempts: 0,
			last_attempt: None,
			next_retry: None,
			error: None,
		}
	}

	/// Whether this operation is due for another attempt: no `next_retry` was
	/// ever set, or it's already in the past.
	pub fn is_retryable(&self) -> bool {
		match self.next_retry {
			None => true,
			Some(t) => t.is_past(),
		}
	}
}

/// Outcome reported by an [`crate::queue::OperationProcessor`].
#[derive(Clone, Debug)]
pub enum ProcessOutcome {
	Success,
	Failure { error: String },
}

// vim: ts=4
