//! Shared constants for the storage and ingestion layers.

/// Chunk size used when splitting an uploaded file, unless the caller
/// provides one. Matches the classic GridFS default.
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 261_120;

/// Maximum number of characters returned by the raw-UTF8 fallback when the
/// extraction service is unavailable.
pub const RAW_TEXT_FALLBACK_MAX_CHARS: usize = 5_000;

/// Number of leading characters returned by `select_relevant_section` when no
/// block matches the query.
pub const SECTION_FALLBACK_CHARS: usize = 2_000;

/// Magic marker identifying a PDF payload. Raw bytes starting with this are
/// never served through the plain-text fallback.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";
