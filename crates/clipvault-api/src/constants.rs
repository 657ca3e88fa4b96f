//! API constants

/// Versioned prefix for every JSON endpoint.
pub const API_PREFIX: &str = "/api/v0";

/// Route prefix that serves signed local-storage objects.
pub const ASSETS_PREFIX: &str = "/assets";

/// Headroom over the video ceiling for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Server-wide cap on in-flight requests.
pub const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Upper bound for each dependency probe in `/health`.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
