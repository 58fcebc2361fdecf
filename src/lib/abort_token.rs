use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that upload workers check before taking more work.
/// Once raised it stays raised for the rest of the run.
#[derive(Clone)]
pub struct AbortToken {
    token: Arc<AtomicBool>,
}

impl AbortToken {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            token: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.token.load(Ordering::SeqCst)
    }

    /// Raises the flag. Returns true for the caller that raised it first.
    pub fn abort(&self) -> bool {
        !self.token.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_abort_wins() {
        let token = AbortToken::new();
        let clone = token.clone();
        assert!(!token.is_aborted());
        assert!(clone.abort());
        assert!(!token.abort());
        assert!(token.is_aborted());
    }
}
