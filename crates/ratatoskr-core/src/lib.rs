//! Host-agnostic offline-first sync engine core.
//!
//! Wires together the durable chunk store (C1), document status tracker
//! (C2), pending operations queue (C3) and connectivity manager (C4) behind
//! the sync coordinator (C5). Every storage-facing trait here
//! (`ChunkStore`, `StatusStore`, `QueueStore`) is host-agnostic; a concrete
//! storage adapter crate (e.g. `ratatoskr-storage-redb`) provides the one
//! implementation this workspace ships.

pub mod chunk_store;
pub mod connectivity;
pub mod coordinator;
pub mod http;
pub mod listener;
pub mod queue;
pub mod repo;
pub mod status;

pub mod prelude {
	pub use crate::chunk_store::ChunkStore;
	pub use crate::connectivity::ConnectivityManager;
	pub use crate::coordinator::{CoordinatorConfig, RepoAccessor, SyncCoordinator, TokenAccessor};
	pub use crate::http::{HyperRegistrationClient, RegistrationClient, RegistrationOutcome};
	pub use crate::listener::{ListenerRegistry, Subscription};
	pub use crate::queue::{OperationProcessor, PendingQueue, QueueStore, BASE_DELAY_MS, MAX_ATTEMPTS, MAX_DELAY_MS};
	pub use crate::repo::{DocumentHandle, DocumentRepo};
	pub use crate::status::{StatusChange, StatusStore, StatusTracker};
	pub use ratatoskr_types::prelude::*;
}

// vim: ts=4
