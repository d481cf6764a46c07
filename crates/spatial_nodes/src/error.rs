//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed layout and distribution specifications, dimension mismatches found while
//! resolving expressions, failures reported by the node kernel, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid layout specification: {0}")]
    InvalidLayoutSpec(String),

    #[error("invalid distribution specification: {0}")]
    InvalidDistributionSpec(String),

    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: String,
    },

    #[error("unknown model '{model}'")]
    UnknownModel { model: String },

    #[error("node instantiation failed: {0}")]
    InstantiationFailure(String),

    #[error("parameter '{name}': {message}")]
    Parameter { name: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A failure raised while resolving or applying a value for one node.
    #[error("node {ordinal} ({target}): {source}")]
    Resolution {
        ordinal: usize,
        target: String,
        #[source]
        source: Box<Error>,
    },

    #[cfg(feature = "ron")]
    #[error(transparent)]
    Ron(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wraps `self` with the ordinal of the node and the name of the value being produced.
    pub fn at_node(self, ordinal: usize, target: impl Into<String>) -> Self {
        Error::Resolution {
            ordinal,
            target: target.into(),
            source: Box::new(self),
        }
    }

    /// Node ordinal at which a resolution-time failure occurred, if any.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Error::Resolution { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }

    /// The innermost error, skipping any [`Error::Resolution`] wrappers.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Resolution { source, .. } = current {
            current = source;
        }
        current
    }

    pub(crate) fn dimension(expected: usize, found: usize, context: impl Into<String>) -> Self {
        Error::DimensionMismatch {
            expected,
            found,
            context: context.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
