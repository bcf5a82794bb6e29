//! redb table definitions shared by the three storage-seam implementations.
//!
//! redb has no native secondary-index construct, so `TABLE_STATUS_INDEX` and
//! `TABLE_PENDING_BY_DOCUMENT` realize one each as composite-key ranges
//! (`"{indexed_value}\0{primary_key}" -> ""`), the same scheme
//! `rtdb-adapter-redb::index.rs` uses for its `TABLE_INDEXES`.

use redb::TableDefinition;

/// Chunk bytes: encoded `ChunkKey` -> raw value.
pub const TABLE_CHUNKS: TableDefinition<&str, &[u8]> = TableDefinition::new("chunks");

/// Document status records: `document_id` -> JSON-encoded `DocumentStatusEntry`.
pub const TABLE_DOCUMENT_STATUS: TableDefinition<&str, &str> = TableDefinition::new("document_status");

/// Secondary index over status: `"{status}\0{document_id}"` -> `""`.
pub const TABLE_STATUS_INDEX: TableDefinition<&str, &str> = TableDefinition::new("document_status_index");

/// Pending operations: `id` -> JSON-encoded `PendingOperation`.
pub const TABLE_PENDING_OPERATIONS: TableDefinition<&str, &str> = TableDefinition::new("pending_operations");

/// Secondary index by document: `"{document_id}\0{id}"` -> `""`.
pub const TABLE_PENDING_BY_DOCUMENT: TableDefinition<&str, &str> = TableDefinition::new("pending_operations_by_document");

/// Single-key schema version record; whichever instance opens the database
/// first performs any needed migration and stamps the current version.
pub const TABLE_SCHEMA_META: TableDefinition<&str, &str> = TableDefinition::new("schema_meta");

pub const SCHEMA_VERSION: &str = "2";

// vim: ts=4
