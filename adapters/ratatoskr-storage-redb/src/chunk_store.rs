//! [`ratatoskr_core::chunk_store::ChunkStore`] backed by `TABLE_CHUNKS`.

use async_trait::async_trait;
use ratatoskr_core::chunk_store::ChunkStore;
use ratatoskr_types::prelude::*;
use redb::{ReadableDatabase, ReadableTable};

use crate::tables::TABLE_CHUNKS;
use crate::RedbStorage;

#[async_trait]
impl ChunkStore for RedbStorage {
	async fn load(&self, key: &ChunkKey) -> SyncResult<Option<Vec<u8>>> {
		let db = self.db().await?;
		let encoded = key.encode();

		let tx = db.begin_read().map_err(crate::Error::from)?;
		let table = tx.open_table(TABLE_CHUNKS).map_err(crate::Error::from)?;
		let value = table.get(encoded.as_str()).map_err(crate::Error::from)?;
		Ok(value.map(|v| v.value().to_vec()))
	}

	async fn save(&self, key: &ChunkKey, value: &[u8]) -> SyncResult<()> {
		let db = self.db().await?;
		let encoded = key.encode();

		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut table = tx.open_table(TABLE_CHUNKS).map_err(crate::Error::from)?;
			table.insert(encoded.as_str(), value).map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn remove(&self, key: &ChunkKey) -> SyncResult<()> {
		let db = self.db().await?;
		let encoded = key.encode();

		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut table = tx.open_table(TABLE_CHUNKS).map_err(crate::Error::from)?;
			table.remove(encoded.as_str()).map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn load_range(&self, prefix: &ChunkKey) -> SyncResult<Vec<(ChunkKey, Vec<u8>)>> {
		let db = self.db().await?;
		let encoded_prefix = prefix.encode();

		let tx = db.begin_read().map_err(crate::Error::from)?;
		let table = tx.open_table(TABLE_CHUNKS).map_err(crate::Error::from)?;
		let range = table.range(encoded_prefix.as_str()..).map_err(crate::Error::from)?;

		let mut out = Vec::new();
		for item in range {
			let (key, value) = item.map_err(crate::Error::from)?;
			let key_str = key.value();
			if !ChunkKey::encoded_matches_prefix(key_str, &encoded_prefix) {
				break;
			}
			out.push((ChunkKey::decode(key_str), value.value().to_vec()));
		}
		Ok(out)
	}

	async fn remove_range(&self, prefix: &ChunkKey) -> SyncResult<()> {
		let db = self.db().await?;
		let encoded_prefix = prefix.encode();

		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut table = tx.open_table(TABLE_CHUNKS).map_err(crate::Error::from)?;

			let keys_to_delete: Vec<String> = {
				let range = table.range(encoded_prefix.as_str()..).map_err(crate::Error::from)?;
				let mut keys = Vec::new();
				for item in range {
					let (key, _) = item.map_err(crate::Error::from)?;
					let key_str = key.value();
					if !ChunkKey::encoded_matches_prefix(key_str, &encoded_prefix) {
						break;
					}
					keys.push(key_str.to_string());
				}
				keys
			};

			for key in keys_to_delete {
				table.remove(key.as_str()).map_err(crate::Error::from)?;
			}
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	fn close(&self) {
		RedbStorage::close(self);
	}
}

// vim: ts=4
