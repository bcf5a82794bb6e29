//! Document repository seam: the boundary between the coordinator and
//! whatever CRDT library actually owns document content.
//!
//! The sync engine never reads or mutates document content itself — it only
//! needs a fresh handle to apply the initial mutation to, and a stable id to
//! enqueue a `register_document` operation against. `yrs` (used in this
//! crate's dev-dependencies) is one concrete library that can sit behind
//! these traits; any other op-based CRDT engine works equally well as long
//! as it's wrapped the same way.

use async_trait::async_trait;
use ratatoskr_types::prelude::*;
use std::fmt::Debug;

/// A freshly created document replica, owned by the host application's CRDT library.
#[async_trait]
pub trait DocumentHandle: Debug + Send + Sync {
	/// Stable identifier assigned to this document.
	fn document_id(&self) -> &str;

	/// Apply `value` as the document's initial mutation.
	async fn apply(&self, value: &[u8]) -> SyncResult<()>;
}

/// Factory for [`DocumentHandle`]s, injected into the coordinator via an
/// accessor closure rather than held directly (see [`crate::coordinator`]).
#[async_trait]
pub trait DocumentRepo: Debug + Send + Sync {
	/// Create a new document replica and return a handle to it. The returned
	/// handle's [`DocumentHandle::document_id`] becomes the id the coordinator
	/// records status under and enqueues a registration operation for.
	async fn create_document(&self) -> SyncResult<Box<dyn DocumentHandle>>;
}



// vim: ts=4
