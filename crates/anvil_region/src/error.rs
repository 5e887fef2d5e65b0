//! Error types that can be emitted from this library

use anvil_nbt::TagType;
use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`anvil_nbt::error::Error`]
    #[error(transparent)]
    Nbt(#[from] anvil_nbt::error::Error),

    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// coordinates must be in range [0..32), but were x={x}, z={z}
    #[error("coordinates must be in range [0..32), but were x={x}, z={z}")]
    InvalidCoordinates { x: i32, z: i32 },

    /// data buffer size must be a non-zero multiple of 4096, but is {0}
    #[error("data buffer size must be a non-zero multiple of 4096, but is {0}")]
    InvalidBufferSize(usize),

    /// record claims {length} payload bytes but only {available} are stored
    #[error("record claims {length} payload bytes but only {available} are stored")]
    InvalidLength { length: usize, available: usize },

    /// payload of {0} bytes does not fit a record length field
    #[error("payload of {0} bytes does not fit a record length field")]
    PayloadTooLarge(usize),

    /// cannot unpack indices from {0} words
    #[error("cannot unpack indices from {0} words")]
    InvalidWordCount(usize),

    /// palette size {0} cannot index anything
    #[error("palette size {0} cannot index anything")]
    InvalidPaletteSize(usize),

    /// chunk root must be a compound, found {0:?}
    #[error("chunk root must be a compound, found {0:?}")]
    UnexpectedRootType(TagType),
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value {
            binrw::Error::Io(e) => Error::IOError(e),
            other => Error::BinRWError(other),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
