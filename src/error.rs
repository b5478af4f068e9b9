//! Crate-level error types.

use std::fmt;

/// Errors produced by the splatmap crate.
///
/// Most runtime paths in the tile lifecycle are fail-soft and only log;
/// this type covers the operations that hand a failure back to the caller
/// (options presets, metadata transport).
#[derive(Debug)]
pub enum SplatMapError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// A metadata or scene index document could not be decoded.
    Metadata(String),
    /// HTTP transport failure while fetching a document.
    Http(String),
}

impl fmt::Display for SplatMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Metadata(msg) => write!(f, "metadata error: {msg}"),
            Self::Http(msg) => write!(f, "http error: {msg}"),
        }
    }
}

impl std::error::Error for SplatMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SplatMapError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SplatMapError {
    fn from(e: serde_json::Error) -> Self {
        Self::Metadata(e.to_string())
    }
}

#[cfg(feature = "http")]
impl From<ureq::Error> for SplatMapError {
    fn from(e: ureq::Error) -> Self {
        Self::Http(e.to_string())
    }
}
