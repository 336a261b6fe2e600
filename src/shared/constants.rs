/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum accepted size for an image attached to a service request
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Path prefix recorded for service request image references
pub const UPLOADS_PREFIX: &str = "uploads";
