/// Default envelope message for successful operations
pub const SUCCESS_MESSAGE: &str = "Operation successful";

/// Hard upper bound for presigned URL expiry (7 days, the SigV4 limit)
pub const MAX_PRESIGNED_EXPIRY_SECS: u32 = 604_800;

/// Default presigned URL lifetime in minutes (1 hour)
pub const DEFAULT_EXPIRY_MINUTES: u32 = 60;

/// Chunk size used when relaying downloads to the client
pub const DOWNLOAD_BUFFER_SIZE: usize = 8 * 1024;

/// Content type used when the store reports none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
