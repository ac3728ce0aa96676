//! Error types for layout mutations.

use thiserror::Error;

/// Errors raised by layout operations.
///
/// None of these are fatal: callers log them and keep the current layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),
    #[error("Duplicate widget id: {0}")]
    DuplicateId(String),
    #[error("Unknown widget type: {0}")]
    UnknownWidgetType(String),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
