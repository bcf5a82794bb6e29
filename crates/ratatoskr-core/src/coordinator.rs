//! Sync coordinator (C5): orchestrates the status tracker, pending queue and
//! connectivity manager, and exposes the offline-create API.

use async_trait::async_trait;
use ratatoskr_types::prelude::*;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::connectivity::ConnectivityManager;
use crate::http::{RegistrationClient, RegistrationOutcome};
use crate::listener::{ListenerRegistry, Subscription};
use crate::queue::{OperationProcessor, PendingQueue};
use crate::repo::DocumentRepo;
use crate::status::StatusTracker;

/// Token and repo accessors. The coordinator never caches either value; it
/// calls these fresh on every use, so credential rotation and repo
/// availability never require reconstructing the coordinator.
pub type TokenAccessor = Arc<dyn Fn() -> Option<String> + Send + Sync>;
pub type RepoAccessor = Arc<dyn Fn() -> Option<Arc<dyn DocumentRepo>> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
	/// Coalescing window for `schedule_sync_processing`. Default 100 ms per
	/// the debounce invariant; overridable so tests don't need to sleep 100ms.
	pub debounce_ms: u64,
}

impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self { debounce_ms: 100 }
	}
}

pub struct SyncCoordinator {
	server_url: String,
	get_token: TokenAccessor,
	get_repo: RepoAccessor,
	status: Arc<StatusTracker>,
	queue: Arc<PendingQueue>,
	connectivity: Arc<ConnectivityManager>,
	registration_client: Arc<dyn RegistrationClient>,
	events: ListenerRegistry<SyncEvent>,
	initialized: AtomicBool,
	debounce_ms: u64,
	debounce_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
	connectivity_subscription: Mutex<Option<Subscription<ConnectivityState>>>,
	status_subscription: Mutex<Option<Subscription<(Box<str>, DocumentStatusEntry)>>>,
	/// Self-reference used to hand spawned tasks (the debounce timer, the
	/// connectivity/status re-emitters) an owned `Arc` without requiring
	/// every caller to hold one. Populated by [`Self::new`] via
	/// `Arc::new_cyclic`.
	self_ref: Weak<SyncCoordinator>,
}

impl Debug for SyncCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SyncCoordinator").field("server_url", &self.server_url).field("initialized", &self.initialized.load(Ordering::SeqCst)).finish()
	}
}

impl SyncCoordinator {
	pub fn new(
		server_url: impl Into<String>,
		get_token: TokenAccessor,
		get_repo: RepoAccessor,
		status: Arc<StatusTracker>,
		queue: Arc<PendingQueue>,
		connectivity: Arc<ConnectivityManager>,
		registration_client: Arc<dyn RegistrationClient>,
		config: CoordinatorConfig,
	) -> Arc<Self> {
		Arc::new_cyclic(|weak| Self {
			server_url: server_url.into(),
			get_token,
			get_repo,
			status,
			queue,
			connectivity,
			registration_client,
			events: ListenerRegistry::new(),
			initialized: AtomicBool::new(false),
			debounce_ms: config.debounce_ms,
			debounce_handle: Mutex::new(None),
			connectivity_subscription: Mutex::new(None),
			status_subscription: Mutex::new(None),
			self_ref: weak.clone(),
		})
	}

	/// Wire the queue processor and subscribe to C4/C2. Idempotent: a second
	/// call is a no-op.
	///
	/// A no-op (beyond installing the processor) if the coordinator's own
	/// `Arc` has already been dropped by the time this runs — unreachable in
	/// practice since `&self` requires a live `Arc` somewhere, but handled
	/// rather than assumed.
	pub async fn initialize(&self) {
		if self.initialized.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
			return;
		}

		let processor = Arc::new(DocumentRegistrationProcessor {
			server_url: self.server_url.clone(),
			get_token: Arc::clone(&self.get_token),
			registration_client: Arc::clone(&self.registration_client),
			status: Arc::clone(&self.status),
			events: self.events.clone(),
		});
		self.queue.set_processor(processor).await;

		let Some(this) = self.self_ref.upgrade() else { return };
		let connectivity_sub = self.connectivity.subscribe(move |state| {
			this.events.notify(&SyncEvent::ConnectivityChanged { state: *state });
			if *state == ConnectivityState::Online {
				this.schedule_sync_processing();
			}
		});
		*self.connectivity_subscription.lock().unwrap_or_else(|e| e.into_inner()) = Some(connectivity_sub);

		let Some(this) = self.self_ref.upgrade() else { return };
		let status_sub = self.status.subscribe(move |(document_id, entry)| {
			this.events.notify(&SyncEvent::DocumentStatusChanged { document_id: document_id.clone(), entry: entry.clone(), error: entry.error.clone() });
		});
		*self.status_subscription.lock().unwrap_or_else(|e| e.into_inner()) = Some(status_sub);
	}

	/// Create a document locally and enqueue its server registration.
	/// Fails synchronously if the repo accessor currently returns `None`.
	pub async fn create_document_offline(&self, initial_value: &[u8], payload: OperationPayload) -> SyncResult<Box<str>> {
		let repo = (self.get_repo)().ok_or(Error::RepoUnavailable)?;
		let handle = repo.create_document().await?;
		handle.apply(initial_value).await?;
		let document_id: Box<str> = handle.document_id().into();

		self.status.set_status(&document_id, SyncStatus::Local, StatusUpdate::default()).await?;
		self.queue.enqueue_document_registration(&document_id, payload).await?;

		if self.connectivity.state() == ConnectivityState::Online && (self.get_token)().is_some() {
			self.schedule_sync_processing();
		}

		Ok(document_id)
	}

	/// Drain the pending queue once. Returns `(0, 0)` without touching the
	/// queue when offline or tokenless (emitting `auth:required` in the
	/// latter case).
	pub async fn process_pending_operations(&self) -> SyncResult<(usize, usize)> {
		if self.connectivity.state() != ConnectivityState::Online {
			return Ok((0, 0));
		}
		if (self.get_token)().is_none() {
			self.events.notify(&SyncEvent::AuthRequired);
			return Ok((0, 0));
		}

		self.events.notify(&SyncEvent::SyncStarted);
		match self.queue.process_queue().await {
			Ok((processed, failed)) => {
				self.events.notify(&SyncEvent::SyncCompleted { processed, failed });
				Ok((processed, failed))
			}
			Err(e) => {
				self.events.notify(&SyncEvent::SyncError { message: e.to_string() });
				Err(e)
			}
		}
	}

	/// Clear any pending debounce timer and arm a new one for
	/// `debounce_ms`. Multiple rapid calls coalesce into one drain.
	///
	/// A no-op if the coordinator is already being dropped (its last `Arc`
	/// went away between the caller's reference and this call).
	pub fn schedule_sync_processing(&self) {
		let Some(this) = self.self_ref.upgrade() else { return };

		let mut guard = self.debounce_handle.lock().unwrap_or_else(|e| e.into_inner());
		if let Some(handle) = guard.take() {
			handle.abort();
		}

		let delay = Duration::from_millis(self.debounce_ms);
		*guard = Some(tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			let _ = this.process_pending_operations().await;
		}));
	}

	pub async fn get_status(&self, document_id: &str) -> SyncResult<Option<DocumentStatusEntry>> {
		self.status.get_status(document_id).await
	}

	pub fn connectivity_state(&self) -> ConnectivityState {
		self.connectivity.state()
	}

	/// The [`ConnectivityManager`] (C4) this coordinator owns, so a transport
	/// adapter can drive `set_server_connected`/`set_server_connecting`
	/// directly instead of going through per-signal pass-throughs here.
	pub fn connectivity(&self) -> &Arc<ConnectivityManager> {
		&self.connectivity
	}

	/// Pass-through to [`ConnectivityManager::set_browser_online`] — the host's
	/// `online`/`offline` reachability events land here.
	pub fn set_browser_online(&self, online: bool) {
		self.connectivity.set_browser_online(online);
	}

	/// Pass-through to [`ConnectivityManager::set_server_connected`] — called
	/// by the transport adapter when the server session opens/closes.
	pub fn set_server_connected(&self, connected: bool) {
		self.connectivity.set_server_connected(connected);
	}

	/// Pass-through to [`ConnectivityManager::set_server_connecting`] — called
	/// by the transport adapter while a connection attempt is in flight.
	pub fn set_server_connecting(&self, connecting: bool) {
		self.connectivity.set_server_connecting(connecting);
	}

	pub async fn get_pending_operations_count(&self) -> SyncResult<usize> {
		self.queue.get_queue_length().await
	}

	pub async fn get_unsynced_documents(&self) -> SyncResult<Vec<DocumentStatusEntry>> {
		self.status.get_unregistered().await
	}

	/// Inject an `auth:token-expired` event from outside, e.g. when the host
	/// application detects its bearer token has expired independently.
	pub fn emit_token_expired(&self) {
		self.events.notify(&SyncEvent::AuthTokenExpired);
	}

	pub fn subscribe(&self, listener: impl Fn(&SyncEvent) + Send + Sync + 'static) -> Subscription<SyncEvent> {
		self.events.subscribe(listener)
	}

	/// Cancel the debounce timer, unsubscribe from C4, and close C2 and C3.
	/// Flips `initialized` back so a fresh coordinator can be constructed in
	/// the same process.
	pub async fn destroy(&self) {
		if let Some(handle) = self.debounce_handle.lock().unwrap_or_else(|e| e.into_inner()).take() {
			handle.abort();
		}
		if let Some(sub) = self.connectivity_subscription.lock().unwrap_or_else(|e| e.into_inner()).take() {
			sub.unsubscribe();
		}
		if let Some(sub) = self.status_subscription.lock().unwrap_or_else(|e| e.into_inner()).take() {
			sub.unsubscribe();
		}
		self.connectivity.destroy();
		self.status.close();
		self.queue.close().await;
		self.initialized.store(false, Ordering::SeqCst);
	}
}

/// Installed on the [`PendingQueue`] by [`SyncCoordinator::initialize`].
/// Implements the HTTP status mapping table: 2xx/409 register the document,
/// 401 emits `auth:required`, other HTTP failures and network errors are
/// retried with backoff.
#[derive(Debug)]
struct DocumentRegistrationProcessor {
	server_url: String,
	get_token: TokenAccessor,
	registration_client: Arc<dyn RegistrationClient>,
	status: Arc<StatusTracker>,
	events: ListenerRegistry<SyncEvent>,
}

#[async_trait]
impl OperationProcessor for DocumentRegistrationProcessor {
	async fn process(&self, op: &PendingOperation) -> ProcessOutcome {
		let Some(token) = (self.get_token)() else {
			self.events.notify(&SyncEvent::AuthRequired);
			return ProcessOutcome::Failure { error: "Not authenticated".into() };
		};

		if let Err(e) = self
			.status
			.set_status(&op.document_id, SyncStatus::Syncing, StatusUpdate { last_sync_attempt: Some(Timestamp::now()), ..Default::default() })
			.await
		{
			return ProcessOutcome::Failure { error: e.to_string() };
		}

		match self.registration_client.register_document(&self.server_url, &token, &op.document_id, &op.payload).await {
			RegistrationOutcome::Success => match self.status.mark_server_registered(&op.document_id).await {
				Ok(_) => ProcessOutcome::Success,
				Err(e) => ProcessOutcome::Failure { error: e.to_string() },
			},
			RegistrationOutcome::Unauthorized => {
				self.events.notify(&SyncEvent::AuthRequired);
				ProcessOutcome::Failure { error: "Not authenticated".into() }
			}
			RegistrationOutcome::OtherFailure { message } => ProcessOutcome::Failure { error: message.unwrap_or_else(|| "document registration failed".into()) },
			RegistrationOutcome::NetworkError { message } => {
				let _ = self.status.set_status(&op.document_id, SyncStatus::Local, StatusUpdate::with_error(message.clone())).await;
				ProcessOutcome::Failure { error: message }
			}
		}
	}
}

// vim: ts=4
