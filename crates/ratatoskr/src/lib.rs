//! Ratatoskr is an offline-first synchronization engine core for
//! collaborative document services.
//!
//! This facade crate wires the host-agnostic engine (`ratatoskr-core`) to
//! the one storage adapter this workspace ships (`ratatoskr-storage-redb`)
//! behind a single builder.

use std::path::PathBuf;
use std::sync::Arc;

pub use ratatoskr_core::prelude::*;
pub use ratatoskr_storage_redb::{Error as StorageError, RedbStorage, StorageConfig};

/// Builds a [`SyncCoordinator`] backed by the redb storage adapter.
///
/// Setter methods return `&mut Self` so they can be chained, and
/// [`Self::build`] consumes the accumulated configuration.
pub struct RatatoskrBuilder {
	storage_path: PathBuf,
	storage_config: StorageConfig,
	server_url: String,
	coordinator_config: CoordinatorConfig,
	browser_online: bool,
	get_token: Option<TokenAccessor>,
	get_repo: Option<RepoAccessor>,
	registration_client: Option<Arc<dyn RegistrationClient>>,
	storage: Option<Arc<RedbStorage>>,
}

impl RatatoskrBuilder {
	pub fn new(storage_path: impl Into<PathBuf>, server_url: impl Into<String>) -> Self {
		Self {
			storage_path: storage_path.into(),
			storage_config: StorageConfig::default(),
			server_url: server_url.into(),
			coordinator_config: CoordinatorConfig::default(),
			browser_online: true,
			get_token: None,
			get_repo: None,
			registration_client: None,
			storage: None,
		}
	}

	pub fn storage_config(&mut self, config: StorageConfig) -> &mut Self {
		self.storage_config = config;
		self
	}

	pub fn coordinator_config(&mut self, config: CoordinatorConfig) -> &mut Self {
		self.coordinator_config = config;
		self
	}

	/// Initial browser-reachability signal; see
	/// [`ConnectivityManager::new`] for why this can't be observed directly
	/// on a generic host.
	pub fn browser_online(&mut self, online: bool) -> &mut Self {
		self.browser_online = online;
		self
	}

	pub fn token_accessor(&mut self, get_token: TokenAccessor) -> &mut Self {
		self.get_token = Some(get_token);
		self
	}

	pub fn repo_accessor(&mut self, get_repo: RepoAccessor) -> &mut Self {
		self.get_repo = Some(get_repo);
		self
	}

	/// Override the HTTP client used for `register_document` dispatch.
	/// Defaults to [`HyperRegistrationClient`] if never called.
	pub fn registration_client(&mut self, client: Arc<dyn RegistrationClient>) -> &mut Self {
		self.registration_client = Some(client);
		self
	}

	/// Open the redb database, wire every component together and call
	/// [`SyncCoordinator::initialize`].
	///
	/// The same database file backs the chunk store the host's CRDT adapter
	/// needs; retrieve it with [`Self::chunk_store`] after building.
	pub async fn build(&mut self) -> SyncResult<Arc<SyncCoordinator>> {
		let storage = Arc::new(RedbStorage::new(&self.storage_path, self.storage_config.clone()));
		self.storage = Some(Arc::clone(&storage));

		let status_store: Arc<dyn StatusStore> = Arc::clone(&storage) as Arc<dyn StatusStore>;
		let queue_store: Arc<dyn QueueStore> = Arc::clone(&storage) as Arc<dyn QueueStore>;

		let status = Arc::new(StatusTracker::new(status_store));
		let queue = Arc::new(PendingQueue::new(queue_store));
		let connectivity = Arc::new(ConnectivityManager::new(self.browser_online));

		let registration_client = match self.registration_client.take() {
			Some(client) => client,
			None => Arc::new(HyperRegistrationClient::new()?),
		};

		let get_token = self.get_token.take().unwrap_or_else(|| Arc::new(|| None));
		let get_repo = self.get_repo.take().unwrap_or_else(|| Arc::new(|| None));

		let coordinator = SyncCoordinator::new(
			self.server_url.clone(),
			get_token,
			get_repo,
			status,
			queue,
			connectivity,
			registration_client,
			self.coordinator_config,
		);
		coordinator.initialize().await;
		Ok(coordinator)
	}

	/// The chunk store (C1) backing the database this builder just opened.
	/// `None` until [`Self::build`] has run. Shares the same redb file as the
	/// coordinator's status and queue stores, so the host's CRDT adapter can
	/// persist document chunks alongside the sync engine's own bookkeeping.
	pub fn chunk_store(&self) -> Option<Arc<dyn ChunkStore>> {
		self.storage.clone().map(|s| s as Arc<dyn ChunkStore>)
	}
}

// vim: ts=4
