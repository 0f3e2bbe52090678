use std::time::Duration;

/// How long a run keeps probing when no `--duration` is given.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(15 * 60);

/// Pause between two probe requests, so the target is not overloaded.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
