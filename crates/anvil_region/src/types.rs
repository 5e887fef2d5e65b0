//! Base types for the on-disk structure of a chunk record.

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};

/// Chunk record header
///
/// Every record inside a region file starts with these five bytes. All data is stored in big endian
/// format.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct RecordHeader {
    /// Number of bytes following the length field, the compression byte included
    pub length: u32,

    /// The compression code of the payload, see [`anvil_nbt::CompressionMethod`]
    pub compression: u8,
}

impl RecordHeader {
    /// Size of the header on disk
    pub const SIZE: usize = 5;

    /// Header for a payload of `payload_length` bytes
    pub fn for_payload(payload_length: usize, compression: u8) -> Result<RecordHeader> {
        let length = payload_length
            .checked_add(1)
            .and_then(|length| u32::try_from(length).ok())
            .ok_or(Error::PayloadTooLarge(payload_length))?;

        Ok(RecordHeader {
            length,
            compression,
        })
    }

    /// Number of payload bytes following the header
    pub fn real_length(&self) -> usize {
        (self.length as usize).saturating_sub(1)
    }
}
