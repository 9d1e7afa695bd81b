//! Editor errors.

use thiserror::Error;

/// Errors from configuring an editor.
///
/// Editing commands never fail; only dimensions and tab size are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("invalid editor dimensions {width}x{height}: width and height must be at least 1")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid tab size {0}: must be at least 1")]
    InvalidTabSize(usize),
}

/// Editor result.
pub type EditorResult<T> = Result<T, EditorError>;

/// Check a width/height pair.
pub(crate) const fn check_dimensions(width: usize, height: usize) -> EditorResult<()> {
    if width == 0 || height == 0 {
        return Err(EditorError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Check a tab size.
pub(crate) const fn check_tab_size(tab_size: usize) -> EditorResult<()> {
    if tab_size == 0 {
        return Err(EditorError::InvalidTabSize(tab_size));
    }
    Ok(())
}
