//! Connectivity manager (C4): fuses browser reachability and transport
//! session signals into one [`ConnectivityState`].

use ratatoskr_types::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::listener::{ListenerRegistry, Subscription};

/// Tracks the three raw signals and republishes their fused
/// [`ConnectivityState`] to subscribers whenever it actually changes.
///
/// `browser_online` has no platform source on a generic host, so it's
/// supplied externally: the constructor takes an initial value (default
/// `true`, matching "default true when unobservable") and [`Self::set_browser_online`]
/// updates it, standing in for the platform's `online`/`offline` events.
#[derive(Debug)]
pub struct ConnectivityManager {
	browser_online: AtomicBool,
	server_connected: AtomicBool,
	server_connecting: AtomicBool,
	destroyed: AtomicBool,
	current: Mutex<ConnectivityState>,
	listeners: ListenerRegistry<ConnectivityState>,
	online_waiters: ListenerRegistry<()>,
}

impl ConnectivityManager {
	pub fn new(browser_online: bool) -> Self {
		let current = ConnectivityState::derive(browser_online, false, false);
		Self {
			browser_online: AtomicBool::new(browser_online),
			server_connected: AtomicBool::new(false),
			server_connecting: AtomicBool::new(false),
			destroyed: AtomicBool::new(false),
			current: Mutex::new(current),
			listeners: ListenerRegistry::new(),
			online_waiters: ListenerRegistry::new(),
		}
	}

	pub fn state(&self) -> ConnectivityState {
		self.current.lock().map(|s| *s).unwrap_or(ConnectivityState::Offline)
	}

	pub fn set_browser_online(&self, online: bool) {
		self.browser_online.store(online, Ordering::SeqCst);
		self.recompute();
	}

	pub fn set_server_connected(&self, connected: bool) {
		self.server_connected.store(connected, Ordering::SeqCst);
		self.recompute();
	}

	pub fn set_server_connecting(&self, connecting: bool) {
		self.server_connecting.store(connecting, Ordering::SeqCst);
		self.recompute();
	}

	fn recompute(&self) {
		let next = ConnectivityState::derive(
			self.browser_online.load(Ordering::SeqCst),
			self.server_connected.load(Ordering::SeqCst),
			self.server_connecting.load(Ordering::SeqCst),
		);

		let changed = {
			let Ok(mut current) = self.current.lock() else { return };
			if *current == next {
				false
			} else {
				*current = next;
				true
			}
		};

		if !changed || self.destroyed.load(Ordering::SeqCst) {
			return;
		}

		self.listeners.notify(&next);
		if next == ConnectivityState::Online {
			self.online_waiters.notify(&());
		}
	}

	/// Subscribe to fused-state transitions. Repeated transitions to the same
	/// value never notify.
	pub fn subscribe(&self, listener: impl Fn(&ConnectivityState) + Send + Sync + 'static) -> Subscription<ConnectivityState> {
		self.listeners.subscribe(listener)
	}

	/// Resolve once the state becomes [`ConnectivityState::Online`], with a
	/// same-tick fast path if it already is.
	pub async fn wait_for_online(&self) {
		if self.state() == ConnectivityState::Online {
			return;
		}
		let (tx, rx) = tokio::sync::oneshot::channel();
		let tx = Mutex::new(Some(tx));
		let subscription = self.online_waiters.subscribe(move |()| {
			if let Ok(mut slot) = tx.lock() {
				if let Some(tx) = slot.take() {
					let _ = tx.send(());
				}
			}
		});

		if self.state() == ConnectivityState::Online {
			subscription.unsubscribe();
			return;
		}

		let _ = rx.await;
		subscription.unsubscribe();
	}

	/// Stop notifying subscribers; `set_server_*` calls remain legal but are
	/// silently absorbed.
	pub fn destroy(&self) {
		self.destroyed.store(true, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use std::sync::atomic::AtomicUsize;

	#[test]
	fn starts_offline_when_browser_offline() {
		let manager = ConnectivityManager::new(false);
		assert_eq!(manager.state(), ConnectivityState::Offline);
	}

	#[test]
	fn transitions_to_online_when_server_connects() {
		let manager = ConnectivityManager::new(true);
		manager.set_server_connected(true);
		assert_eq!(manager.state(), ConnectivityState::Online);
	}

	#[test]
	fn repeated_identical_transitions_do_not_notify() {
		let manager = ConnectivityManager::new(true);
		let calls = Arc::new(AtomicUsize::new(0));
		let c1 = Arc::clone(&calls);
		let _sub = manager.subscribe(move |_| {
			c1.fetch_add(1, Ordering::SeqCst);
		});

		manager.set_server_connecting(true);
		manager.set_server_connecting(true);
		manager.set_server_connecting(true);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn wait_for_online_resolves_immediately_when_already_online() {
		let manager = ConnectivityManager::new(true);
		manager.set_server_connected(true);
		tokio::time::timeout(std::time::Duration::from_millis(50), manager.wait_for_online()).await.unwrap();
	}

	#[tokio::test]
	async fn wait_for_online_resolves_once_state_transitions() {
		let manager = Arc::new(ConnectivityManager::new(true));
		let waiter = Arc::clone(&manager);
		let handle = tokio::spawn(async move { waiter.wait_for_online().await });

		tokio::time::sleep(std::time::Duration::from_millis(10)).await;
		manager.set_server_connected(true);

		tokio::time::timeout(std::time::Duration::from_millis(100), handle).await.unwrap().unwrap();
	}

	#[test]
	fn destroy_suppresses_further_notifications() {
		let manager = ConnectivityManager::new(true);
		let calls = Arc::new(AtomicUsize::new(0));
		let c1 = Arc::clone(&calls);
		let _sub = manager.subscribe(move |_| {
			c1.fetch_add(1, Ordering::SeqCst);
		});

		manager.destroy();
		manager.set_server_connected(true);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}
}

// vim: ts=4
