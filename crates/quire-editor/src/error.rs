//! Edit errors.
//!
//! Every failure here is a caller defect: the UI asked for a position or
//! paragraph that does not exist, or for a style nobody registered. Edit
//! primitives validate before they mutate, so an `Err` always means the
//! document is exactly as it was.

use thiserror::Error;

use crate::position::Position;
use crate::style::StyleId;

/// Why an edit primitive rejected its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A position outside the current paragraph sequence.
    #[error("position {position} is out of range")]
    OutOfRange { position: Position },

    /// A paragraph index outside the current paragraph sequence.
    #[error("paragraph {index} is out of range (document has {count})")]
    ParagraphOutOfRange { index: usize, count: usize },

    /// A style id that is not in the registry.
    #[error("unknown style {0}")]
    UnknownStyle(StyleId),
}

impl EditError {
    /// Whether this is one of the out-of-range variants.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::ParagraphOutOfRange { .. })
    }
}
