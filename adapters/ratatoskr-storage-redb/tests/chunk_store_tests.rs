//! Durable chunk store persistence tests.
//!
//! Covers write/read round-trips and prefix-scan boundary behaviors against
//! a real on-disk `redb::Database`, not the in-memory stub used by
//! `ratatoskr-core`'s unit tests.

use ratatoskr_core::chunk_store::ChunkStore;
use ratatoskr_types::chunk::ChunkKey;
use ratatoskr_storage_redb::{RedbStorage, StorageConfig};
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
	dir.path().join("ratatoskr.redb")
}

#[tokio::test]
async fn save_then_load_round_trips() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());

	let key = ChunkKey::new(["doc", "a"]);
	storage.save(&key, b"hello").await.expect("save");
	assert_eq!(storage.load(&key).await.expect("load"), Some(b"hello".to_vec()));
}

#[tokio::test]
async fn save_persists_across_storage_instances() {
	let dir = TempDir::new().expect("tempdir");
	let key = ChunkKey::new(["doc", "a"]);

	{
		let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());
		storage.save(&key, b"persisted").await.expect("save");
		storage.close();
	}

	let reopened = RedbStorage::new(db_path(&dir), StorageConfig::default());
	assert_eq!(reopened.load(&key).await.expect("load"), Some(b"persisted".to_vec()));
}

#[tokio::test]
async fn empty_segment_key_round_trips() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());

	let root = ChunkKey(Vec::new());
	storage.save(&root, b"root value").await.expect("save");
	assert_eq!(storage.load(&root).await.expect("load"), Some(b"root value".to_vec()));
}

#[tokio::test]
async fn remove_is_silent_on_missing_key() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());
	storage.remove(&ChunkKey::new(["doc", "ghost"])).await.expect("remove of missing key must not fail");
}

#[tokio::test]
async fn load_range_matches_segments_not_string_prefixes() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());

	storage.save(&ChunkKey::new(["doc"]), b"root").await.expect("save");
	storage.save(&ChunkKey::new(["doc", "a"]), b"1").await.expect("save");
	storage.save(&ChunkKey::new(["doc", "b"]), b"2").await.expect("save");
	storage.save(&ChunkKey::new(["document", "c"]), b"3").await.expect("save");

	let mut found = storage.load_range(&ChunkKey::new(["doc"])).await.expect("load_range");
	found.sort_by_key(|(k, _)| k.encode());

	assert_eq!(
		found,
		vec![
			(ChunkKey::new(["doc"]), b"root".to_vec()),
			(ChunkKey::new(["doc", "a"]), b"1".to_vec()),
			(ChunkKey::new(["doc", "b"]), b"2".to_vec()),
		]
	);
}

#[tokio::test]
async fn remove_range_deletes_every_matching_entry_atomically() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());

	storage.save(&ChunkKey::new(["doc", "a"]), b"1").await.expect("save");
	storage.save(&ChunkKey::new(["doc", "b"]), b"2").await.expect("save");
	storage.save(&ChunkKey::new(["document", "c"]), b"3").await.expect("save");

	storage.remove_range(&ChunkKey::new(["doc"])).await.expect("remove_range");

	assert_eq!(storage.load(&ChunkKey::new(["doc", "a"])).await.expect("load"), None);
	assert_eq!(storage.load(&ChunkKey::new(["doc", "b"])).await.expect("load"), None);
	assert_eq!(storage.load(&ChunkKey::new(["document", "c"])).await.expect("load"), Some(b"3".to_vec()));
}

#[tokio::test]
async fn save_is_idempotent_upsert() {
	let dir = TempDir::new().expect("tempdir");
	let storage = RedbStorage::new(db_path(&dir), StorageConfig::default());

	let key = ChunkKey::new(["doc", "a"]);
	storage.save(&key, b"first").await.expect("save");
	storage.save(&key, b"second").await.expect("save");

	assert_eq!(storage.load(&key).await.expect("load"), Some(b"second".to_vec()));
}

#[tokio::test]
async fn concurrent_first_operations_share_one_open() {
	let dir = TempDir::new().expect("tempdir");
	let storage = std::sync::Arc::new(RedbStorage::new(db_path(&dir), StorageConfig::default()));

	let mut handles = Vec::new();
	for i in 0..8u8 {
		let storage = std::sync::Arc::clone(&storage);
		handles.push(tokio::spawn(async move {
			let key = ChunkKey::new(vec!["doc".to_string(), i.to_string()]);
			storage.save(&key, &[i]).await.expect("save");
		}));
	}
	for handle in handles {
		handle.await.expect("task panicked");
	}

	let found = storage.load_range(&ChunkKey::new(["doc"])).await.expect("load_range");
	assert_eq!(found.len(), 8);
}

// vim: ts=4
