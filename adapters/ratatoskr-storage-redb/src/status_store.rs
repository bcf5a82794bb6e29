//! [`ratatoskr_core::status::StatusStore`] backed by `TABLE_DOCUMENT_STATUS`,
//! with `TABLE_STATUS_INDEX` as a secondary index over `status` so
//! `load_by_status` doesn't need a full table scan.

use async_trait::async_trait;
use ratatoskr_core::status::StatusStore;
use ratatoskr_types::prelude::*;
use redb::{ReadableDatabase, ReadableTable};

use crate::tables::{TABLE_DOCUMENT_STATUS, TABLE_STATUS_INDEX};
use crate::RedbStorage;

fn index_key(status: SyncStatus, document_id: &str) -> String {
	format!("{}\0{}", status.as_str(), document_id)
}

#[async_trait]
impl StatusStore for RedbStorage {
	async fn load(&self, document_id: &str) -> SyncResult<Option<DocumentStatusEntry>> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let table = tx.open_table(TABLE_DOCUMENT_STATUS).map_err(crate::Error::from)?;
		match table.get(document_id).map_err(crate::Error::from)? {
			Some(value) => Ok(Some(serde_json::from_str(value.value()).map_err(crate::Error::from)?)),
			None => Ok(None),
		}
	}

	async fn save(&self, entry: &DocumentStatusEntry) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut status_table = tx.open_table(TABLE_DOCUMENT_STATUS).map_err(crate::Error::from)?;
			let mut index_table = tx.open_table(TABLE_STATUS_INDEX).map_err(crate::Error::from)?;

			if let Some(prior) = status_table.get(entry.document_id.as_ref()).map_err(crate::Error::from)? {
				let prior: DocumentStatusEntry = serde_json::from_str(prior.value()).map_err(crate::Error::from)?;
				if prior.status != entry.status {
					index_table.remove(index_key(prior.status, &prior.document_id).as_str()).map_err(crate::Error::from)?;
				}
			}

			let json = serde_json::to_string(entry).map_err(crate::Error::from)?;
			status_table.insert(entry.document_id.as_ref(), json.as_str()).map_err(crate::Error::from)?;
			index_table.insert(index_key(entry.status, &entry.document_id).as_str(), "").map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn remove(&self, document_id: &str) -> SyncResult<()> {
		let db = self.db().await?;
		let tx = db.begin_write().map_err(crate::Error::from)?;
		{
			let mut status_table = tx.open_table(TABLE_DOCUMENT_STATUS).map_err(crate::Error::from)?;
			let mut index_table = tx.open_table(TABLE_STATUS_INDEX).map_err(crate::Error::from)?;

			if let Some(prior) = status_table.get(document_id).map_err(crate::Error::from)? {
				let prior: DocumentStatusEntry = serde_json::from_str(prior.value()).map_err(crate::Error::from)?;
				index_table.remove(index_key(prior.status, document_id).as_str()).map_err(crate::Error::from)?;
			}
			status_table.remove(document_id).map_err(crate::Error::from)?;
		}
		tx.commit().map_err(crate::Error::from)?;
		Ok(())
	}

	async fn load_by_status(&self, status: SyncStatus) -> SyncResult<Vec<DocumentStatusEntry>> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let index_table = tx.open_table(TABLE_STATUS_INDEX).map_err(crate::Error::from)?;
		let status_table = tx.open_table(TABLE_DOCUMENT_STATUS).map_err(crate::Error::from)?;

		let prefix = format!("{}\0", status.as_str());
		let range = index_table.range(prefix.as_str()..).map_err(crate::Error::from)?;

		let mut out = Vec::new();
		for item in range {
			let (key, _) = item.map_err(crate::Error::from)?;
			let key_str = key.value();
			if !key_str.starts_with(&prefix) {
				break;
			}
			let document_id = &key_str[prefix.len()..];
			if let Some(value) = status_table.get(document_id).map_err(crate::Error::from)? {
				out.push(serde_json::from_str(value.value()).map_err(crate::Error::from)?);
			}
		}
		Ok(out)
	}

	async fn load_unregistered(&self) -> SyncResult<Vec<DocumentStatusEntry>> {
		let db = self.db().await?;
		let tx = db.begin_read().map_err(crate::Error::from)?;
		let status_table = tx.open_table(TABLE_DOCUMENT_STATUS).map_err(crate::Error::from)?;

		let mut out = Vec::new();
		for item in status_table.iter().map_err(crate::Error::from)? {
			let (_, value) = item.map_err(crate::Error::from)?;
			let entry: DocumentStatusEntry = serde_json::from_str(value.value()).map_err(crate::Error::from)?;
			if !entry.server_registered {
				out.push(entry);
			}
		}
		Ok(out)
	}
}

// vim: ts=4
