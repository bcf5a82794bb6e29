//! Generic, panic-isolated listener registry shared by C2, C4 and C5.
//!
//! Every component that fans events out to subscribers (`DocumentStatusTracker`,
//! `ConnectivityManager`, `SyncCoordinator`) needs the same three properties:
//! synchronous delivery, an `unsubscribe` handle, and a guarantee that one
//! listener panicking can't take down the others. Centralizing it here avoids
//! three slightly-different copies of the same dispatch loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
	next_id: AtomicU64,
	listeners: Mutex<Vec<(u64, Listener<T>)>>,
}

/// A cloneable handle to a set of subscribers for events of type `T`.
pub struct ListenerRegistry<T> {
	inner: Arc<Inner<T>>,
}

impl<T> Clone for ListenerRegistry<T> {
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}

impl<T> Default for ListenerRegistry<T> {
	fn default() -> Self {
		Self { inner: Arc::new(Inner { next_id: AtomicU64::new(0), listeners: Mutex::new(Vec::new()) }) }
	}
}

impl<T: 'static> ListenerRegistry<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a listener; the returned [`Subscription`] unregisters it when
	/// [`Subscription::unsubscribe`] is called (or simply dropped — see its
	/// doc comment).
	pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription<T> {
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		if let Ok(mut listeners) = self.inner.listeners.lock() {
			listeners.push((id, Arc::new(listener)));
		}
		Subscription { id, registry: self.clone() }
	}

	fn remove(&self, id: u64) {
		if let Ok(mut listeners) = self.inner.listeners.lock() {
			listeners.retain(|(lid, _)| *lid != id);
		}
	}

	pub fn len(&self) -> usize {
		self.inner.listeners.lock().map(|l| l.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Deliver `value` to every current listener in registration order.
	///
	/// Listeners are snapshotted before dispatch so a listener that
	/// subscribes or unsubscribes from within its own callback doesn't
	/// deadlock on the registry's lock. A listener that panics is caught and
	/// logged; it does not prevent the remaining listeners from firing.
	pub fn notify(&self, value: &T) {
		let snapshot: Vec<Listener<T>> = match self.inner.listeners.lock() {
			Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
			Err(_) => return,
		};
		for listener in snapshot {
			if catch_unwind(AssertUnwindSafe(|| listener(value))).is_err() {
				tracing::error!("listener panicked while handling event; isolated");
			}
		}
	}
}

/// Handle returned by [`ListenerRegistry::subscribe`].
///
/// Call [`Self::unsubscribe`] to remove the listener explicitly. Unlike a
/// `Drop`-based guard, letting this value fall out of scope does *not*
/// unsubscribe — callers that want a fire-and-forget subscription can simply
/// discard the returned handle.
pub struct Subscription<T> {
	id: u64,
	registry: ListenerRegistry<T>,
}

impl<T> Subscription<T> {
	pub fn unsubscribe(self) {
		self.registry.remove(self.id);
	}
}


// vim: ts=4
