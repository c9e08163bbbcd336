/// Dispatcher statistics
///
/// Counters useful for monitoring dispatch health and for verifying the cheap
/// drop path: `payloads_decoded` only moves when a listened-for callback was
/// actually translated.
#[derive(Debug, Default, Clone)]
pub struct DispatcherStats {
    /// Total number of currently registered listeners
    pub total_listeners: usize,
    /// Raw payloads decoded into typed events since startup
    pub payloads_decoded: u64,
    /// Typed events broadcast to at least one listener since startup
    pub broadcasts: u64,
    /// Listener callbacks that reported a failure since startup
    pub handler_failures: u64,
}
