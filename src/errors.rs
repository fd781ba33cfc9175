//! Definition of errors.

use core::fmt;

#[cfg(feature = "std")]
use std::error::Error;

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    msg: &'static str,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}", self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for InvalidArgumentError {}

/// Error used when a head assignment does not form a tree rooted at ROOT.
#[derive(Debug)]
pub struct InvalidTreeError {
    /// Dependent at which the violation was detected.
    pub dependent: usize,
    msg: &'static str,
}

impl fmt::Display for InvalidTreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidTreeError: {} (dependent {})",
            self.msg, self.dependent
        )
    }
}

#[cfg(feature = "std")]
impl Error for InvalidTreeError {}

/// Error used when the decoder cannot find a spanning arborescence.
#[derive(Debug)]
pub struct NoArborescenceError {
    /// Node of the (possibly contracted) candidate graph with no incoming edge.
    pub node: usize,
}

impl fmt::Display for NoArborescenceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NoArborescenceError: node {} has no candidate head",
            self.node
        )
    }
}

#[cfg(feature = "std")]
impl Error for NoArborescenceError {}

/// Error used when the model exceeds its addressable size.
#[derive(Debug)]
pub struct ModelScaleError {
    msg: &'static str,
}

impl fmt::Display for ModelScaleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ModelScaleError: {}", self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for ModelScaleError {}

/// Error used when a corpus block cannot be turned into a sentence.
#[derive(Debug)]
pub struct CorpusError {
    /// 1-based line number in the corpus.
    pub line: usize,
    msg: &'static str,
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CorpusError: {} at line {}", self.msg, self.line)
    }
}

#[cfg(feature = "std")]
impl Error for CorpusError {}

/// The error type for Rudep.
#[derive(Debug)]
pub enum RudepError {
    /// The argument is invalid.
    InvalidArgument(InvalidArgumentError),

    /// The head assignment is not a tree.
    InvalidTree(InvalidTreeError),

    /// The candidate graph has no spanning arborescence.
    NoArborescence(NoArborescenceError),

    /// The feature vector is too large.
    ModelScale(ModelScaleError),

    /// The corpus is malformed.
    Corpus(CorpusError),

    /// I/O error.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl RudepError {
    /// Creates a new [`InvalidArgumentError`].
    pub const fn invalid_argument(msg: &'static str) -> Self {
        Self::InvalidArgument(InvalidArgumentError { msg })
    }

    /// Creates a new [`InvalidTreeError`].
    pub const fn invalid_tree(dependent: usize, msg: &'static str) -> Self {
        Self::InvalidTree(InvalidTreeError { dependent, msg })
    }

    /// Creates a new [`NoArborescenceError`].
    pub const fn no_arborescence(node: usize) -> Self {
        Self::NoArborescence(NoArborescenceError { node })
    }

    /// Creates a new [`ModelScaleError`].
    pub const fn model_scale(msg: &'static str) -> Self {
        Self::ModelScale(ModelScaleError { msg })
    }

    /// Creates a new [`CorpusError`].
    pub const fn corpus(line: usize, msg: &'static str) -> Self {
        Self::Corpus(CorpusError { line, msg })
    }
}

impl fmt::Display for RudepError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidTree(e) => e.fmt(f),
            Self::NoArborescence(e) => e.fmt(f),
            Self::ModelScale(e) => e.fmt(f),
            Self::Corpus(e) => e.fmt(f),
            #[cfg(feature = "std")]
            Self::Io(e) => e.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl Error for RudepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for RudepError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A specialized Result type.
pub type Result<T, E = RudepError> = core::result::Result<T, E>;
