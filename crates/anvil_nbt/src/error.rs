//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::tag::TagType;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    ///
    /// I/O failures raised inside binrw are unwrapped into [`Error::IOError`] instead.
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// unsupported compression method {0}, must be between 0 and 2 (inclusive)
    #[error("unsupported compression method {0}, must be between 0 and 2 (inclusive)")]
    UnsupportedCompression(u8),

    /// invalid tag type {id} at {path}
    #[error("invalid tag type {id} at {path}")]
    UnknownTagType { id: u8, path: String },

    /// TAG_End found without a TAG_Compound/TAG_List preceding it at {path}
    #[error("TAG_End found without a TAG_Compound/TAG_List preceding it at {path}")]
    UnexpectedEnd { path: String },

    /// TAG_End not permitted in a list at {path}
    #[error("TAG_End not permitted in a list at {path}")]
    EndInList { path: String },

    /// negative length {length} at {path}
    #[error("negative length {length} at {path}")]
    NegativeLength { length: i32, path: String },

    /// invalid modified UTF-8 string at {path}
    #[error("invalid modified UTF-8 string at {path}")]
    InvalidString { path: String },

    /// nesting deeper than {limit} at {path}
    #[error("nesting deeper than {limit} at {path}")]
    DepthLimitExceeded { limit: usize, path: String },

    /// mixed tag types within a list, expected {expected:?} but found {found:?}
    #[error("mixed tag types within a list, expected {expected:?} but found {found:?}")]
    MixedListTypes { expected: TagType, found: TagType },

    /// string of {0} bytes does not fit a 16 bit length prefix
    #[error("string of {0} bytes does not fit a 16 bit length prefix")]
    StringTooLong(usize),

    /// sequence of {0} elements does not fit a 32 bit length prefix
    #[error("sequence of {0} elements does not fit a 32 bit length prefix")]
    ArrayTooLong(usize),
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value {
            binrw::Error::Io(e) => Error::IOError(e),
            other => Error::BinRWError(other),
        }
    }
}

impl Error {
    /// Whether this error describes malformed NBT data rather than a bad argument or a stream fault
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownTagType { .. }
                | Error::UnexpectedEnd { .. }
                | Error::EndInList { .. }
                | Error::NegativeLength { .. }
                | Error::InvalidString { .. }
                | Error::DepthLimitExceeded { .. }
        )
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
