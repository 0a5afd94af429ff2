//! Configuration constants for bget.

use std::time::Duration;

/// Default gateway endpoint used to resolve allocations.
pub const DEFAULT_GATEWAY: &str = "http://localhost:9091";

/// Environment variable overriding the gateway endpoint.
pub const GATEWAY_ENV: &str = "BGET_GATEWAY";

/// Attempts per blobber before failing over to the next one.
pub const BLOBBER_ATTEMPTS: u32 = 2;

/// Delay between attempts against the same blobber.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// HTTP connect timeout for gateway and blobber requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extension appended to in-flight downloads before the final rename.
pub const PARTIAL_EXTENSION: &str = "bget.partial";
