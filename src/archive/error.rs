// Archive-level error taxonomy.
//
// Lower layers report their own errors (`BitIoError`, `TreeError`,
// `EmptyQueue`, `MalformedHistogram`); they are folded in here so callers
// see one type. Running out of bits and falling off the code tree both mean
// the archive is damaged and surface as `CorruptArchive`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bitio::BitIoError;
use crate::heap::EmptyQueue;
use crate::huffman::{MalformedHistogram, Symbol, TreeError};

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An input file disappeared between validation and reading.
    #[error("no such file: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The encoder was used out of order (e.g. finished with no files).
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    #[error("malformed code length histogram: {0}")]
    MalformedHistogram(#[from] MalformedHistogram),

    /// Two symbols were mapped onto the same code tree leaf.
    #[error("code table assigns {symbol} to an occupied leaf")]
    DuplicateAssignment { symbol: Symbol },

    #[error("corrupt archive: {0}")]
    CorruptArchive(#[from] Corruption),

    /// The input path has no UTF-8 final component to store.
    #[error("cannot store file name of {}", path.display())]
    InvalidFileName { path: PathBuf },

    /// A stored name would escape the extraction directory.
    #[error("refusing unsafe file name {name:?}")]
    UnsafeFileName { name: String },

    #[error("output file exists: {}", path.display())]
    OutputExists { path: PathBuf },

    #[error("internal error: {0}")]
    EmptyQueue(#[from] EmptyQueue),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why an archive failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("stream ended before the archive terminator")]
    UnexpectedEnd,

    #[error("bit sequence does not match any symbol")]
    InvalidSymbol,

    #[error("record declares {0} symbols")]
    BadSymbolCount(u64),

    #[error("symbol value {0} is outside the alphabet")]
    SymbolOutOfRange(u64),

    #[error("unexpected {symbol} while reading {context}")]
    UnexpectedSentinel {
        symbol: Symbol,
        context: &'static str,
    },

    #[error("record alphabet holds only {symbol}, so it has no terminator")]
    Unterminated { symbol: Symbol },

    #[error("file name is not valid UTF-8")]
    NonUtf8Name,
}

impl From<BitIoError> for ArchiveError {
    fn from(e: BitIoError) -> Self {
        match e {
            BitIoError::EndOfStream => Self::CorruptArchive(Corruption::UnexpectedEnd),
            BitIoError::Io(e) => Self::Io(e),
        }
    }
}

impl From<TreeError> for ArchiveError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::DuplicateAssignment { symbol } => Self::DuplicateAssignment { symbol },
            TreeError::InvalidSymbol => Self::CorruptArchive(Corruption::InvalidSymbol),
            TreeError::Empty(e) => Self::EmptyQueue(e),
            TreeError::BitIo(e) => e.into(),
        }
    }
}

impl ArchiveError {
    /// True for errors caused by damaged archive contents rather than the
    /// environment or API misuse.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CorruptArchive(_) | Self::MalformedHistogram(_) | Self::DuplicateAssignment { .. }
        )
    }
}
