//! Size and concurrency limits for the attribution engine.

/// Maximum customer upload size in bytes (16MB).
pub const MAX_UPLOAD_SIZE_BYTES: usize = 16 * 1024 * 1024;

/// Default number of concurrent store lookups per stage.
///
/// Keep at or below the database pool size, otherwise lookups queue on
/// the pool instead of the stream.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

/// Default capacity of the per-run ad-set lookup cache.
pub const DEFAULT_ADSET_CACHE_CAPACITY: u64 = 10_000;

/// Missing emails listed individually in a validation report.
pub const MAX_REPORTED_MISSING_EMAILS: usize = 5;

/// Rows returned by the export preview endpoint.
pub const PREVIEW_ROWS: usize = 50;
