use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag for the frame loop.
///
/// The sampler is re-scheduled on every frame for as long as the loop runs;
/// this handle makes the teardown explicit instead of relying on process
/// lifetime. Clones observe the same flag, so an event handler can stop a
/// loop owned elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// True once any clone has called [`stop`](Self::stop).
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        assert!(!StopToken::new().is_stopped());
    }

    #[test]
    fn stop_is_visible_through_clones() {
        let token = StopToken::new();
        let handle = token.clone();
        handle.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn stop_is_idempotent() {
        let token = StopToken::new();
        token.stop();
        token.stop();
        assert!(token.is_stopped());
    }
}
