// Worker constants (no magic values)
use std::time::Duration;

/// How long shutdown waits for in-flight units before giving up (5s)
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Poll interval while waiting for in-flight units to drain (50ms)
pub const IN_FLIGHT_POLL_INTERVAL: Duration = Duration::from_millis(50);
