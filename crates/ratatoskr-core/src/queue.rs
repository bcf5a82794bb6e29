//! Pending operations queue (C3): persistent FIFO of server-bound
//! operations with retry scheduling.

use async_trait::async_trait;
use ratatoskr_types::prelude::*;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// An operation is abandoned as terminal-failed once it reaches this many attempts.
pub const MAX_ATTEMPTS: u32 = 10;
/// Base exponential-backoff delay, milliseconds.
pub const BASE_DELAY_MS: i64 = 1_000;
/// Backoff delay ceiling, milliseconds.
pub const MAX_DELAY_MS: i64 = 60_000;

/// Storage seam for [`PendingOperation`] records.
#[async_trait]
pub trait QueueStore: Debug + Send + Sync {
	async fn insert(&self, op: &PendingOperation) -> SyncResult<()>;
	async fn update(&self, op: &PendingOperation) -> SyncResult<()>;
	async fn remove(&self, id: &str) -> SyncResult<()>;
	async fn remove_for_document(&self, document_id: &str) -> SyncResult<()>;

	/// All operations, ordered by `created_at` ascending.
	async fn load_all(&self) -> SyncResult<Vec<PendingOperation>>;

	/// Subset whose `next_retry` is absent or already in the past.
	async fn load_retryable(&self) -> SyncResult<Vec<PendingOperation>>;

	async fn has_pending_for_document(&self, document_id: &str) -> SyncResult<bool>;
	async fn len(&self) -> SyncResult<usize>;
}

/// Installed on a [`PendingQueue`] to actually dispatch an operation to the
/// server. Typed as a trait object rather than a bare closure so the
/// coordinator can hold it across `.await` points.
#[async_trait]
pub trait OperationProcessor: Debug + Send + Sync {
	async fn process(&self, op: &PendingOperation) -> ProcessOutcome;
}

/// Compute `next_retry` delay for an operation that has just reached
/// `attempts`: `min(BASE * 2^attempts, MAX)` plus uniform jitter in
/// `[0, 0.1 * delay)`, to avoid thundering-herd retries on mass reconnection.
pub fn calculate_backoff_ms(attempts: u32) -> i64 {
	let exponent = attempts.min(32);
	let scaled = BASE_DELAY_MS.saturating_mul(1i64 << exponent);
	let delay = scaled.clamp(BASE_DELAY_MS, MAX_DELAY_MS);

	use rand::Rng;
	let jitter_fraction: f64 = rand::rng().random();
	let jitter = (jitter_fraction * 0.1 * delay as f64) as i64;
	delay + jitter
}

/// Host-agnostic drain loop, backoff scheduling and re-entrancy guard sitting
/// on top of a [`QueueStore`].
#[derive(Debug)]
pub struct PendingQueue {
	store: Arc<dyn QueueStore>,
	processor: RwLock<Option<Arc<dyn OperationProcessor>>>,
	processing: AtomicBool,
}

impl PendingQueue {
	pub fn new(store: Arc<dyn QueueStore>) -> Self {
		Self { store, processor: RwLock::new(None), processing: AtomicBool::new(false) }
	}

	/// Install the function invoked by [`Self::process_queue`] for every
	/// retryable operation. Must be set before any drain.
	pub async fn set_processor(&self, processor: Arc<dyn OperationProcessor>) {
		*self.processor.write().await = Some(processor);
	}

	pub async fn enqueue_document_registration(&self, document_id: &str, payload: OperationPayload) -> SyncResult<PendingOperation> {
		let op = PendingOperation::new_register_document(uuid::Uuid::new_v4().to_string(), document_id, payload);
		self.store.insert(&op).await?;
		Ok(op)
	}

	pub async fn get_pending_operations(&self) -> SyncResult<Vec<PendingOperation>> {
		self.store.load_all().await
	}

	pub async fn get_retryable_operations(&self) -> SyncResult<Vec<PendingOperation>> {
		self.store.load_retryable().await
	}

	pub async fn remove_operation(&self, id: &str) -> SyncResult<()> {
		self.store.remove(id).await
	}

	pub async fn remove_operations_for_document(&self, document_id: &str) -> SyncResult<()> {
		self.store.remove_for_document(document_id).await
	}

	pub async fn has_pending_operation(&self, document_id: &str) -> SyncResult<bool> {
		self.store.has_pending_for_document(document_id).await
	}

	pub async fn get_queue_length(&self) -> SyncResult<usize> {
		self.store.len().await
	}

	/// Releases the installed processor. Mirrors [`crate::status::StatusTracker::close`]:
	/// the underlying [`QueueStore`]'s database handle is released by the
	/// storage adapter itself, not by this layer, but a torn-down queue must
	/// not go on invoking a processor that belongs to a destroyed coordinator.
	pub async fn close(&self) {
		*self.processor.write().await = None;
	}

	/// Drain every currently-retryable operation sequentially, in order.
	///
	/// Guarded by a boolean re-entry flag: a call that overlaps an in-flight
	/// drain returns `(0, 0)` immediately without touching the store. The
	/// flag is released even if the processor panics, so a crash inside one
	/// operation cannot deadlock future drains.
	pub async fn process_queue(&self) -> SyncResult<(usize, usize)> {
		if self.processing.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
			return Ok((0, 0));
		}
		let _guard = ReleaseOnDrop(&self.processing);

		let Some(processor) = self.processor.read().await.clone() else {
			return Ok((0, 0));
		};

		let mut processed = 0usize;
		let mut failed = 0usize;

		for mut op in self.store.load_retryable().await? {
			if op.attempts >= MAX_ATTEMPTS {
				failed += 1;
				continue;
			}

			op.attempts += 1;
			op.last_attempt = Some(Timestamp::now());

			match processor.process(&op).await {
				ProcessOutcome::Success => {
					self.store.remove(&op.id).await?;
					processed += 1;
				}
				ProcessOutcome::Failure { error } => {
					let delay_ms = calculate_backoff_ms(op.attempts);
					op.next_retry = Some(Timestamp::from_now_ms(delay_ms));
					op.error = Some(error);
					self.store.update(&op).await?;
					failed += 1;
				}
			}
		}

		Ok((processed, failed))
	}
}

struct ReleaseOnDrop<'a>(&'a AtomicBool);

impl Drop for ReleaseOnDrop<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::SeqCst);
	}
}



// vim: ts=4
