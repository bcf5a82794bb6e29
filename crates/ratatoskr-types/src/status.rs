//! Document status tracker (C2) types.

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Where a document's server-registration stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
	/// Exists only on this replica; never attempted registration.
	Local,
	/// A `register_document` attempt is in flight.
	Syncing,
	/// The server has acknowledged the document.
	Synced,
}

impl SyncStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			SyncStatus::Local => "local",
			SyncStatus::Syncing => "syncing",
			SyncStatus::Synced => "synced",
		}
	}
}

impl std::fmt::Display for SyncStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// One document's sync-status record.
///
/// `created_at` is immutable across updates; `server_registered` is sticky
/// unless explicitly overridden by [`StatusUpdate::server_registered`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentStatusEntry {
	pub document_id: Box<str>,
	pub status: SyncStatus,
	pub server_registered: bool,
	pub created_at: Timestamp,
	pub last_sync_attempt: Option<Timestamp>,
	pub error: Option<String>,
}

impl DocumentStatusEntry {
	pub fn new(document_id: impl Into<Box<str>>, status: SyncStatus) -> Self {
		Self {
			document_id: document_id.into(),
			status,
			server_registered: false,
			created_at: Timestamp::now(),
			last_sync_attempt: None,
			error: None,
		}
	}
}

/// Optional overrides accepted by `setStatus`.
///
/// `error: None` means "clear any previously stored error"; `server_registered: None`
/// means "preserve the prior value, or `false` if this is a new entry".
#[derive(Clone, Debug, Default)]
pub struct StatusUpdate {
	pub server_registered: Option<bool>,
	pub error: Option<String>,
	pub last_sync_attempt: Option<Timestamp>,
}

impl StatusUpdate {
	pub fn with_error(error: impl Into<String>) -> Self {
		Self { error: Some(error.into()), ..Default::default() }
	}

	pub fn with_server_registered(registered: bool) -> Self {
		Self { server_registered: Some(registered), ..Default::default() }
	}
}

// vim: ts=4
