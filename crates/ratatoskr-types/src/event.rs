//! Sync coordinator (C5) event bus payload.

use crate::connectivity::ConnectivityState;
use crate::status::DocumentStatusEntry;

/// One tagged event from the coordinator's event bus.
///
/// Modeled as a closed enum rather than a dynamic field bag: every variant
/// documents exactly the payload it carries.
#[derive(Clone, Debug)]
pub enum SyncEvent {
	SyncStarted,
	SyncCompleted { processed: usize, failed: usize },
	SyncError { message: String },
	DocumentStatusChanged { document_id: Box<str>, entry: DocumentStatusEntry, error: Option<String> },
	ConnectivityChanged { state: ConnectivityState },
	AuthRequired,
	AuthTokenExpired,
}

impl SyncEvent {
	/// The event's stable string tag, used for host-side logging and dispatch.
	pub fn tag(&self) -> &'static str {
		match self {
			SyncEvent::SyncStarted => "sync:started",
			SyncEvent::SyncCompleted { .. } => "sync:completed",
			SyncEvent::SyncError { .. } => "sync:error",
			SyncEvent::DocumentStatusChanged { .. } => "document:status-changed",
			SyncEvent::ConnectivityChanged { .. } => "connectivity:changed",
			SyncEvent::AuthRequired => "auth:required",
			SyncEvent::AuthTokenExpired => "auth:token-expired",
		}
	}
}

// vim: ts=4
