//! Common imports re-exported for every crate in the workspace.

pub use crate::chunk::ChunkKey;
pub use crate::connectivity::ConnectivityState;
pub use crate::error::{Error, SyncResult};
pub use crate::event::SyncEvent;
pub use crate::operation::{OperationPayload, OperationType, PendingOperation, ProcessOutcome};
pub use crate::status::{DocumentStatusEntry, StatusUpdate, SyncStatus};
pub use crate::timestamp::Timestamp;

// vim: ts=4
