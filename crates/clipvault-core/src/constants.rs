//! Shared constants

/// Multipart field carrying the video body.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Suffix appended to a scratch file name for its fast-start rewrite.
pub const PROCESSED_SUFFIX: &str = ".processed";

/// Default upload ceiling for videos (1 GiB).
pub const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 1024;

/// Default lifetime of a signed playback URL.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60;

/// Default upper bound for a single ffmpeg/ffprobe invocation.
pub const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 600;

/// Number of random bytes behind every generated object name.
pub const RANDOM_TOKEN_BYTES: usize = 32;
