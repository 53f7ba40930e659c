//! Configuration errors.
//!
//! These are raised by the call that introduces the invalid state (style
//! lookup, width override), never later during rendering.

use std::fmt;

/// Invalid renderer or style configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No style is registered under this name.
    StyleNotDefined(String),
    /// A column's minimum width would exceed its maximum width.
    InvalidWidthBounds {
        /// Column index.
        column: usize,
        /// Requested or existing minimum width.
        min: usize,
        /// Requested or existing maximum width.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StyleNotDefined(name) => write!(f, "style \"{name}\" is not defined"),
            Self::InvalidWidthBounds { column, min, max } => write!(
                f,
                "minimum width ({min}) of column {column} must not exceed its maximum width ({max})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
