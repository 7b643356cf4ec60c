//! Cursor-based pagination for the audit trail.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Opaque cursor from a previous response (base64-encoded offset).
    pub cursor: Option<String>,
    /// Number of items per page (default 100, max 1000).
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Resolve effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Decode the cursor to a ledger offset.
    ///
    /// An absent cursor starts from the beginning; a malformed one is `None`
    /// so the caller can reject it instead of silently restarting.
    pub fn decode_offset(&self) -> Option<u64> {
        match self.cursor.as_deref() {
            None | Some("") => Some(0),
            Some(c) => decode_cursor(c),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Cursor to pass for the next page, or `None` if this is the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl PaginationMeta {
    pub fn from_next_offset(next: Option<u64>) -> Self {
        Self {
            cursor: next.map(encode_cursor),
        }
    }
}

/// Encode a ledger offset into an opaque cursor string.
pub fn encode_cursor(offset: u64) -> String {
    STANDARD.encode(offset.to_string())
}

/// Decode a cursor string back to a ledger offset.
pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes = STANDARD.decode(cursor).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse::<u64>().ok()
}
