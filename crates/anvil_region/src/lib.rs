//! This library handles the chunk records stored in **region** (`.mca`) files of *Minecraft* worlds, and
//! the packed block state indices found inside decoded chunks.
//!
//! # Chunk Record Format Documentation
//!
//! A region file holds the chunks of a 32x32 area. The file is divided into sectors of 4096 bytes, and
//! each chunk is stored as one record spanning a whole number of consecutive sectors. Locating a record
//! through the region header is left to the caller; this crate handles the record itself.
//!
//! ## Record Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Length                 | 4 bytes: Byte count of compression method plus payload     |
//! | 0x0004         | Compression            | 1 byte: Compression method of the payload                  |
//! | 0x0005         | Payload                | `Length - 1` bytes: Compressed NBT, see [`anvil_nbt`]      |
//! | ...            | Padding                | Zero bytes up to the end of the last sector                |
//!
//! The number of sectors a record occupies is `(Length - 1 + 5) / 4096 + 1`. A record that ends exactly
//! on a sector boundary is therefore still given an extra sector.
//!
//! ## Block States
//!
//! Each 16x16x16 section of a decoded chunk stores the palette index of its 4096 blocks packed into a
//! long array, see [`palette`] for the two packing conventions.
//!
//! ## Additional Information
//!
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Compression Methods**:
//!   - `0`: None (no compression)
//!   - `1`: Gzip
//!   - `2`: Zlib, used by Minecraft itself
//!

pub mod chunk;
pub mod error;
pub mod palette;
pub mod types;

pub use chunk::Chunk;
pub use palette::DenseIndexDecoder;
pub use types::RecordHeader;
