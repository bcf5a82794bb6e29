//! Demonstrates that `DocumentRepo`/`DocumentHandle` (`ratatoskr-core::repo`)
//! is satisfiable by a real op-based CRDT library, not just the in-memory
//! stub used by the other test suites. CRDT merge semantics themselves are
//! out of scope for this crate; `yrs` here only stands in for "some real
//! external document library" on the other side of the seam.

use async_trait::async_trait;
use ratatoskr_core::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use yrs::updates::decoder::Decode;
use yrs::{Doc, ReadTxn, StateVector, Text, Transact, TransactionMut, Update};

#[derive(Debug)]
struct YrsDocumentHandle {
	document_id: String,
	doc: Mutex<Doc>,
}

#[async_trait]
impl DocumentHandle for YrsDocumentHandle {
	fn document_id(&self) -> &str {
		&self.document_id
	}

	/// Applies `value` as a yrs v1-encoded update against this document's
	/// single `Doc`, the same decode-then-apply shape any op-based CRDT
	/// integration would use at its own sync boundary.
	async fn apply(&self, value: &[u8]) -> SyncResult<()> {
		let update = Update::decode_v1(value).map_err(|e| Error::Storage(format!("invalid yrs update: {e}")))?;
		let doc = self.doc.lock().map_err(|_| Error::Storage("poisoned lock".into()))?;
		let mut txn: TransactionMut<'_> = doc.transact_mut();
		txn.apply_update(update).map_err(|e| Error::Storage(format!("apply_update failed: {e}")))?;
		Ok(())
	}
}

#[derive(Debug, Default)]
struct YrsDocumentRepo {
	next_id: AtomicU64,
}

#[async_trait]
impl DocumentRepo for YrsDocumentRepo {
	async fn create_document(&self) -> SyncResult<Box<dyn DocumentHandle>> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		Ok(Box::new(YrsDocumentHandle { document_id: format!("doc-{id}"), doc: Mutex::new(Doc::new()) }))
	}
}

#[tokio::test]
async fn yrs_backed_repo_satisfies_the_document_repo_seam() {
	let repo = YrsDocumentRepo::default();
	let handle = repo.create_document().await.unwrap();

	// Build a standalone Y.Doc with some content, encode it as an update,
	// and hand that update to the handle exactly as the coordinator's
	// `create_document_offline` would with its `initial_value` bytes.
	let source = Doc::new();
	let body = source.get_or_insert_text("body");
	{
		let mut txn = source.transact_mut();
		body.insert(&mut txn, 0, "hello offline world");
	}
	let update = source.transact().encode_state_as_update_v1(&StateVector::default());

	handle.apply(&update).await.unwrap();
}

#[tokio::test]
async fn create_document_yields_unique_ids_for_a_real_crdt_backend() {
	let repo = YrsDocumentRepo::default();
	let a = repo.create_document().await.unwrap();
	let b = repo.create_document().await.unwrap();
	assert_ne!(a.document_id(), b.document_id());
}
