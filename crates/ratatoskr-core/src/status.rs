//! Document status tracker (C2): per-document sync-status records with an
//! in-memory cache and synchronous pub/sub.

use async_trait::async_trait;
use ratatoskr_types::prelude::*;
use std::fmt::Debug;

use crate::listener::{ListenerRegistry, Subscription};

/// Storage seam for [`DocumentStatusEntry`] records.
#[async_trait]
pub trait StatusStore: Debug + Send + Sync {
	async fn load(&self, document_id: &str) -> SyncResult<Option<DocumentStatusEntry>>;
	async fn save(&self, entry: &DocumentStatusEntry) -> SyncResult<()>;
	async fn remove(&self, document_id: &str) -> SyncResult<()>;
	async fn load_by_status(&self, status: SyncStatus) -> SyncResult<Vec<DocumentStatusEntry>>;
	async fn load_unregistered(&self) -> SyncResult<Vec<DocumentStatusEntry>>;
}

/// One `(document_id, entry)` notification delivered to status subscribers.
pub type StatusChange = (Box<str>, DocumentStatusEntry);

/// Host-agnostic cache and pub/sub layer sitting on top of a [`StatusStore`].
///
/// The cache is a [`dashmap::DashMap`] rather than a plain `HashMap` behind a
/// mutex: multiple coordinator operations can read/update status concurrently
/// on a multi-threaded runtime without serializing on a single lock.
#[derive(Debug)]
pub struct StatusTracker {
	store: std::sync::Arc<dyn StatusStore>,
	cache: dashmap::DashMap<Box<str>, DocumentStatusEntry>,
	listeners: ListenerRegistry<StatusChange>,
}

impl StatusTracker {
	pub fn new(store: std::sync::Arc<dyn StatusStore>) -> Self {
		Self { store, cache: dashmap::DashMap::new(), listeners: ListenerRegistry::new() }
	}

	/// Upsert a document's status, merging `update` over the prior entry per
	/// the field rules in the data model: `created_at` is preserved,
	/// `server_registered` is sticky unless overridden (and always `true` once
	/// `status` is [`SyncStatus::Synced`]), `error` is cleared unless supplied.
	pub async fn set_status(&self, document_id: &str, status: SyncStatus, update: StatusUpdate) -> SyncResult<DocumentStatusEntry> {
		let prior = self.get_status(document_id).await?;

		let server_registered = if status == SyncStatus::Synced {
			true
		} else {
			update.server_registered.unwrap_or_else(|| prior.as_ref().map(|e| e.server_registered).unwrap_or(false))
		};

		let entry = DocumentStatusEntry {
			document_id: document_id.into(),
			status,
			server_registered,
			created_at: prior.as_ref().map(|e| e.created_at).unwrap_or_else(Timestamp::now),
			last_sync_attempt: update.last_sync_attempt.or_else(|| prior.as_ref().and_then(|e| e.last_sync_attempt)),
			error: update.error,
		};

		self.store.save(&entry).await?;
		self.cache.insert(entry.document_id.clone(), entry.clone());
		self.listeners.notify(&(entry.document_id.clone(), entry.clone()));
		Ok(entry)
	}

	/// Current record for `document_id`, checking the cache before falling
	/// back to the store (and warming the cache on a hit).
	pub async fn get_status(&self, document_id: &str) -> SyncResult<Option<DocumentStatusEntry>> {
		if let Some(entry) = self.cache.get(document_id) {
			return Ok(Some(entry.clone()));
		}
		let loaded = self.store.load(document_id).await?;
		if let Some(entry) = &loaded {
			self.cache.insert(entry.document_id.clone(), entry.clone());
		}
		Ok(loaded)
	}

	/// Shorthand for `set_status(id, Synced, {server_registered: true})`.
	pub async fn mark_server_registered(&self, document_id: &str) -> SyncResult<DocumentStatusEntry> {
		self.set_status(document_id, SyncStatus::Synced, StatusUpdate::with_server_registered(true)).await
	}

	pub async fn get_by_status(&self, status: SyncStatus) -> SyncResult<Vec<DocumentStatusEntry>> {
		let entries = self.store.load_by_status(status).await?;
		for entry in &entries {
			self.cache.insert(entry.document_id.clone(), entry.clone());
		}
		Ok(entries)
	}

	/// Every entry with `server_registered == false`. A full scan is
	/// acceptable; the result also warms the cache.
	pub async fn get_unregistered(&self) -> SyncResult<Vec<DocumentStatusEntry>> {
		let entries = self.store.load_unregistered().await?;
		for entry in &entries {
			self.cache.insert(entry.document_id.clone(), entry.clone());
		}
		Ok(entries)
	}

	pub async fn remove_status(&self, document_id: &str) -> SyncResult<()> {
		self.store.remove(document_id).await?;
		self.cache.remove(document_id);
		Ok(())
	}

	/// Subscribe to every successful `set_status`. Listener panics are caught
	/// and logged; they never prevent other listeners from firing.
	pub fn subscribe(&self, listener: impl Fn(&StatusChange) + Send + Sync + 'static) -> Subscription<StatusChange> {
		self.listeners.subscribe(listener)
	}

	pub fn clear_cache(&self) {
		self.cache.clear();
	}

	/// Drops the in-memory cache. The underlying [`StatusStore`]'s database
	/// handle is released by the storage adapter itself, not by this layer.
	pub fn close(&self) {
		self.cache.clear();
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;
	use std::sync::Mutex;

	#[derive(Debug, Default)]
	pub struct MemoryStatusStore {
		data: Mutex<std::collections::HashMap<Box<str>, DocumentStatusEntry>>,
	}

	#[async_trait]
	impl StatusStore for MemoryStatusStore {
		async fn load(&self, document_id: &str) -> SyncResult<Option<DocumentStatusEntry>> {
			let data = self.data.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
			Ok(data.get(document_id).cloned())
		}

		async fn save(&self, entry: &DocumentStatusEntry) -> SyncResult<()> {
			let mut data = self.data.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
			data.insert(entry.document_id.clone(), entry.clone());
			Ok(())
		}

		async fn remove(&self, document_id: &str) -> SyncResult<()> {
			let mut data = self.data.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
			data.remove(document_id);
			Ok(())
		}

		async fn load_by_status(&self, status: SyncStatus) -> SyncResult<Vec<DocumentStatusEntry>> {
			let data = self.data.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
			Ok(data.values().filter(|e| e.status == status).cloned().collect())
		}

		async fn load_unregistered(&self) -> SyncResult<Vec<DocumentStatusEntry>> {
			let data = self.data.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
			Ok(data.values().filter(|e| !e.server_registered).cloned().collect())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::test_support::MemoryStatusStore;
	use super::*;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn tracker() -> StatusTracker {
		StatusTracker::new(Arc::new(MemoryStatusStore::default()))
	}

	#[tokio::test]
	async fn set_status_then_get_round_trips() {
		let tracker = tracker();
		tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::default()).await.unwrap();
		let entry = tracker.get_status("doc-1").await.unwrap().unwrap();
		assert_eq!(entry.status, SyncStatus::Local);
		assert!(!entry.server_registered);
	}

	#[tokio::test]
	async fn created_at_is_preserved_across_updates() {
		let tracker = tracker();
		let first = tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::default()).await.unwrap();
		let second = tracker.set_status("doc-1", SyncStatus::Syncing, StatusUpdate::default()).await.unwrap();
		assert_eq!(first.created_at, second.created_at);
	}

	#[tokio::test]
	async fn server_registered_is_sticky_unless_overridden() {
		let tracker = tracker();
		tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::with_server_registered(true)).await.unwrap();
		let entry = tracker.set_status("doc-1", SyncStatus::Syncing, StatusUpdate::default()).await.unwrap();
		assert!(entry.server_registered);
	}

	#[tokio::test]
	async fn synced_status_forces_server_registered() {
		let tracker = tracker();
		let entry = tracker.set_status("doc-1", SyncStatus::Synced, StatusUpdate::default()).await.unwrap();
		assert!(entry.server_registered);
	}

	#[tokio::test]
	async fn error_is_cleared_when_not_supplied() {
		let tracker = tracker();
		tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::with_error("boom")).await.unwrap();
		let entry = tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::default()).await.unwrap();
		assert_eq!(entry.error, None);
	}

	#[tokio::test]
	async fn mark_server_registered_yields_synced_and_registered() {
		let tracker = tracker();
		let entry = tracker.mark_server_registered("doc-1").await.unwrap();
		assert_eq!(entry.status, SyncStatus::Synced);
		assert!(entry.server_registered);
	}

	#[tokio::test]
	async fn remove_status_purges_store_and_cache() {
		let tracker = tracker();
		tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::default()).await.unwrap();
		tracker.remove_status("doc-1").await.unwrap();
		assert!(tracker.get_status("doc-1").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn subscribers_are_notified_on_successful_set_status() {
		let tracker = tracker();
		let calls = Arc::new(AtomicUsize::new(0));
		let c1 = Arc::clone(&calls);
		let _sub = tracker.subscribe(move |(id, entry)| {
			assert_eq!(id.as_ref(), "doc-1");
			assert_eq!(entry.status, SyncStatus::Local);
			c1.fetch_add(1, Ordering::SeqCst);
		});

		tracker.set_status("doc-1", SyncStatus::Local, StatusUpdate::default()).await.unwrap();
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}

// vim: ts=4
