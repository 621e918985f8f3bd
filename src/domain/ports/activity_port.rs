//! Network activity indicator port definition.

/// Visibility signal raised while a download is on the wire.
#[cfg_attr(test, mockall::automock)]
pub trait ActivityIndicator: Send + Sync {
    /// Shows or hides the indicator.
    fn set_visible(&self, visible: bool);
}
