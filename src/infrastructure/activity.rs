//! Network activity flag.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use crate::domain::ports::ActivityIndicator;

/// Shared boolean raised while downloads are on the wire.
#[derive(Debug, Default)]
pub struct NetworkActivityFlag {
    visible: AtomicBool,
}

impl NetworkActivityFlag {
    /// Creates a hidden flag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visible: AtomicBool::new(false),
        }
    }

    /// Returns whether the indicator is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl ActivityIndicator for NetworkActivityFlag {
    fn set_visible(&self, visible: bool) {
        trace!(visible, "Network activity indicator");
        self.visible.store(visible, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let flag = NetworkActivityFlag::new();
        assert!(!flag.is_visible());

        flag.set_visible(true);
        assert!(flag.is_visible());

        flag.set_visible(false);
        assert!(!flag.is_visible());
    }
}
