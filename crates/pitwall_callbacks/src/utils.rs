//! Utility functions shared across the pitwall crates.

/// Returns the current Unix timestamp in seconds.
///
/// All pitwall components use this for timestamp generation so that ages and
/// orderings are comparable across crates.
///
/// # Panics
///
/// Panics if the system clock is set to a time before the Unix epoch
/// (January 1, 1970). This should never happen in practice on modern systems.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
