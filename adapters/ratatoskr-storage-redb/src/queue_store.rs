//! [`ratatoskr_core::queue::QueueStore`] backed by `TABLE_PENDING_OPERATIONS`,
//! with `TABLE_PENDING_BY_DOCUMENT` as a secondary index so
//! `has_pending_for_document`/`remove_for_document` don't need a full scan.

use async_trait::async_trait;
use ratatoskr_core::queue::QueueStore;
use ratatoskr_types::prelude::*;
use redb::{ReadableDatabase, ReadableTable};

use crate::tables::{TABLE_PENDING_BY_DOCUMENT, TABLE_PENDING_OPERATIONS};
use crate::RedbStorage;

fn document_index_key(document_id: &str, id: &str) -> String {
	format!("{}\0{}", document_id, id)
}

#[async_trait]
impl QueueStore for RedbStorage {
	async fn insert(&self, op: &PendingOperation) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;
			let mut index_table = tx.open_table(TABLE_PENDING_BY_DOCUMENT).map_err(crate::Error::from)?;

			let json = serde_json::to_string(op).map_err(crate::Error::from)?;
			ops_table.insert(op.id.as_ref(), json.as_str()).map_err(crate::Error::from)?;
			index_table.insert(document_index_key(&op.document_id, &op.id).as_str(), "").map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn update(&self, op: &PendingOperation) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;
			let json = serde_json::to_string(op).map_err(crate::Error::from)?;
			ops_table.insert(op.id.as_ref(), json.as_str()).map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn remove(&self, id: &str) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;
			let mut index_table = tx.open_table(TABLE_PENDING_BY_DOCUMENT).map_err(crate::Error::from)?;

			if let Some(value) = ops_table.get(id).map_err(crate::Error::from)? {
				let op: PendingOperation = serde_json::from_str(value.value()).map_err(crate::Error::from)?;
				index_table.remove(document_index_key(&op.document_id, &op.id).as_str()).map_err(crate::Error::from)?;
			}
			ops_table.remove(id).map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn remove_for_document(&self, document_id: &str) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;
			let mut index_table = tx.open_table(TABLE_PENDING_BY_DOCUMENT).map_err(crate::Error::from)?;

			let prefix = format!("{}\0", document_id);
			let ids_to_delete: Vec<(String, String)> = {
				let range = index_table.range(prefix.as_str()..).map_err(crate::Error::from)?;
				let mut matches = Vec::new();
				for item in range {
					let (key, _) = item.map_err(crate::Error::from)?;
					let key_str = key.value();
					if !key_str.starts_with(&prefix) {
						break;
					}
					matches.push((key_str.to_string(), key_str[prefix.len()..].to_string()));
				}
				matches
			};

			for (index_key, id) in ids_to_delete {
				index_table.remove(index_key.as_str()).map_err(crate::Error::from)?;
				ops_table.remove(id.as_str()).map_err(crate::Error::from)?;
			}
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn load_all(&self) -> SyncResult<Vec<PendingOperation>> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;

		let mut ops = Vec::new();
		for item in ops_table.iter().map_err(crate::Error::from)? {
			let (_, value) = item.map_err(crate::Error::from)?;
			ops.push(serde_json::from_str::<PendingOperation>(value.value()).map_err(crate::Error::from)?);
		}
		ops.sort_by_key(|o| o.created_at);
		Ok(ops)
	}

	async fn load_retryable(&self) -> SyncResult<Vec<PendingOperation>> {
		let mut ops = self.load_all().await?;
		ops.retain(PendingOperation::is_retryable);
		Ok(ops)
	}

	async fn has_pending_for_document(&self, document_id: &str) -> SyncResult<bool> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let index_table = tx.open_table(TABLE_PENDING_BY_DOCUMENT).map_err(crate::Error::from)?;

		let prefix = format!("{}\0", document_id);
		let mut range = index_table.range(prefix.as_str()..).map_err(crate::Error::from)?;
		match range.next() {
			Some(item) => {
				let (key, _) = item.map_err(crate::Error::from)?;
				Ok(key.value().starts_with(&prefix))
			}
			None => Ok(false),
		}
	}

	async fn len(&self) -> SyncResult<usize> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let ops_table = tx.open_table(TABLE_PENDING_OPERATIONS).map_err(crate::Error::from)?;
		Ok(ops_table.len().map_err(crate::Error::from)? as usize)
	}
}

// vim: ts=4
