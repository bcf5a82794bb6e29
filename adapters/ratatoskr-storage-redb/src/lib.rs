//! redb-backed storage adapter for Ratatoskr.
//!
//! One [`RedbStorage`] owns a single `redb::Database` file and implements all
//! three storage-seam traits from `ratatoskr-core` (`ChunkStore`,
//! `StatusStore`, `QueueStore`) against it.
//!
//! This crate's host always has exactly one logical database, so there is a
//! single lazily-opened handle rather than a path-keyed cache of several.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

mod chunk_store;
mod error;
mod queue_store;
mod status_store;
mod tables;

pub use error::Error;

/// Knobs carried over from `crdt-adapter-redb::AdapterConfig` for the parts
/// of this adapter with comparable bookkeeping; both currently unused beyond
/// documenting the intended knob, since this adapter keeps no in-memory
/// instance cache of its own (that layer lives in `ratatoskr-core`).
#[derive(Debug, Clone)]
pub struct StorageConfig {
	/// Reserved for a future on-disk compaction/eviction policy.
	pub idle_timeout_secs: u64,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self { idle_timeout_secs: 300 }
	}
}

/// Owns the redb database file backing all three storage seams.
pub struct RedbStorage {
	path: PathBuf,
	#[allow(dead_code)]
	config: StorageConfig,
	db: OnceCell<Arc<redb::Database>>,
}

impl std::fmt::Debug for RedbStorage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedbStorage").field("path", &self.path).finish()
	}
}

impl RedbStorage {
	pub fn new(path: impl AsRef<Path>, config: StorageConfig) -> Self {
		Self { path: path.as_ref().to_path_buf(), config, db: OnceCell::new() }
	}

	/// Lazily open the database file, sharing one open-in-flight future across
	/// concurrent callers — the same collapsing behavior as
	/// `CrdtAdapterRedb::get_or_open_db_file`, specialized to a single path.
	async fn db(&self) -> Result<Arc<redb::Database>, Error> {
		self.db
			.get_or_try_init(|| async {
				if let Some(parent) = self.path.parent() {
					std::fs::create_dir_all(parent).map_err(|e| Error::DbError(format!("failed to create storage directory: {e}")))?;
				}
				let database = redb::Database::create(&self.path)?;
				ensure_schema(&database)?;
				Ok(Arc::new(database))
			})
			.await
			.cloned()
	}

	/// Release the cached database handle. A subsequent operation reopens
	/// transparently via [`Self::db`].
	pub fn close(&self) {
		// `OnceCell` has no explicit reset; dropping `self` drops the handle.
		// Nothing to do eagerly here, `ChunkStore::close` is a documented
		// no-op for this adapter (the handle is released with the adapter).
	}
}

/// Create every table if absent and stamp the schema version, idempotently,
/// so opening an existing database is as cheap as opening a fresh one.
fn ensure_schema(database: &redb::Database) -> Result<(), Error> {
	use tables::*;

	let tx = database.begin_write()?;
	{
		let _ = tx.open_table(TABLE_CHUNKS)?;
		let _ = tx.open_table(TABLE_DOCUMENT_STATUS)?;
		let _ = tx.open_table(TABLE_STATUS_INDEX)?;
		let _ = tx.open_table(TABLE_PENDING_OPERATIONS)?;
		let _ = tx.open_table(TABLE_PENDING_BY_DOCUMENT)?;

		let mut meta_table = tx.open_table(TABLE_SCHEMA_META)?;
		if meta_table.get("version")?.is_none() {
			meta_table.insert("version", SCHEMA_VERSION)?;
		}
	}
	tx.commit()?;
	Ok(())
}

// vim: ts=4
