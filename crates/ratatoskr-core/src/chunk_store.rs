//! Durable chunk store (C1): the append-only byte blob table every other
//! component is built on top of.

use async_trait::async_trait;
use ratatoskr_types::prelude::*;
use std::fmt::Debug;

/// Storage seam for raw chunk bytes, keyed by [`ChunkKey`].
///
/// Every `ChunkStore` implementation is required to satisfy this trait. An
/// implementation owns persistence only — it has no opinion on what a chunk
/// represents; that's the CRDT library's job, sitting on the other side of
/// [`crate::repo`].
#[async_trait]
pub trait ChunkStore: Debug + Send + Sync {
	/// The current value for an exact key, or `None` if absent.
	async fn load(&self, key: &ChunkKey) -> SyncResult<Option<Vec<u8>>>;

	/// Idempotent upsert; overwrites any prior value.
	async fn save(&self, key: &ChunkKey, value: &[u8]) -> SyncResult<()>;

	/// Remove the value stored under `key`. Succeeds whether or not the key exists.
	async fn remove(&self, key: &ChunkKey) -> SyncResult<()>;

	/// Every `(key, value)` whose key is `prefix` itself or extends it by one
	/// or more whole segments.
	async fn load_range(&self, prefix: &ChunkKey) -> SyncResult<Vec<(ChunkKey, Vec<u8>)>>;

	/// Delete every entry matched by [`Self::load_range`] for the same prefix.
	async fn remove_range(&self, prefix: &ChunkKey) -> SyncResult<()>;

	/// Release the underlying database handle. Subsequent operations must be
	/// able to reopen transparently.
	fn close(&self);
}


#[cfg(test)]
mod tests {
	use super::test_support::MemoryChunkStore;
	use super::*;

	#[tokio::test]
	async fn save_then_load_round_trips() {
		let store = MemoryChunkStore::default();
		let key = ChunkKey::new(["doc", "a"]);
		store.save(&key, b"hello").await.unwrap();
		assert_eq!(store.load(&key).await.unwrap(), Some(b"hello".to_vec()));
	}

	#[tokio::test]
	async fn remove_is_silent_on_missing_key() {
		let store = MemoryChunkStore::default();
		store.remove(&ChunkKey::new(["doc", "ghost"])).await.unwrap();
	}

	#[tokio::test]
	async fn load_range_only_returns_segment_exact_matches() {
		let store = MemoryChunkStore::default();
		store.save(&ChunkKey::new(["doc", "a"]), b"1").await.unwrap();
		store.save(&ChunkKey::new(["doc", "b"]), b"2").await.unwrap();
		store.save(&ChunkKey::new(["document", "c"]), b"3").await.unwrap();

		let mut found = store.load_range(&ChunkKey::new(["doc"])).await.unwrap();
		found.sort_by_key(|(k, _)| k.encode());
		assert_eq!(found, vec![(ChunkKey::new(["doc", "a"]), b"1".to_vec()), (ChunkKey::new(["doc", "b"]), b"2".to_vec())]);
	}

	#[tokio::test]
	async fn remove_range_deletes_every_matching_entry() {
		let store = MemoryChunkStore::default();
		store.save(&ChunkKey::new(["doc", "a"]), b"1").await.unwrap();
		store.save(&ChunkKey::new(["doc", "b"]), b"2").await.unwrap();
		store.save(&ChunkKey::new(["document", "c"]), b"3").await.unwrap();

		store.remove_range(&ChunkKey::new(["doc"])).await.unwrap();

		assert_eq!(store.load(&ChunkKey::new(["doc", "a"])).await.unwrap(), None);
		assert_eq!(store.load(&ChunkKey::new(["document", "c"])).await.unwrap(), Some(b"3".to_vec()));
	}

	#[tokio::test]
	async fn empty_segment_key_round_trips() {
		let store = MemoryChunkStore::default();
		let key = ChunkKey(Vec::new());
		store.save(&key, b"root").await.unwrap();
		assert_eq!(store.load(&key).await.unwrap(), Some(b"root".to_vec()));
	}
}

// vim: ts=4
