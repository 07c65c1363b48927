//! Size limits for inbound analytics payloads.
//!
//! These bound memory use on a process-lifetime in-memory store: every
//! accepted record lives until the server restarts, so oversized payloads
//! accumulate instead of aging out.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated there. Keep both in sync when modifying.

/// Maximum request body size in bytes (64KB).
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Maximum serialized size of the free-form `eventData` map (16KB).
pub const MAX_EVENT_DATA_BYTES: usize = 16 * 1024;

/// Maximum user-agent string length.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Maximum client-supplied session id length.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Default result count for event listing.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard ceiling on event listing, whatever the query string asks for.
pub const MAX_LIST_LIMIT: usize = 1000;
