//! This library handles reading and writing **NBT** (Named Binary Tag) streams, the structured
//! storage format of *Minecraft* save files.
//!
//! # NBT Format Documentation
//!
//! An NBT stream is a single named tag, in practice always a compound, optionally wrapped in a Gzip or
//! Zlib stream. Standalone files such as `level.dat` are Gzip compressed, chunks inside region files
//! are usually Zlib compressed.
//!
//! ## Named Tags
//!
//! Every tag outside a list is written with a header naming its type and its name.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Type                   | 1 byte: Tag type id, see below                             |
//! | 0x0001         | Name Length            | 2 bytes: Unsigned length of the name in bytes              |
//! | 0x0003         | Name                   | Modified UTF-8 encoded name                                |
//! | ...            | Payload                | Depends on the tag type                                    |
//!
//! A type id of `0` (`TAG_End`) has neither name nor payload. It terminates a compound and may not
//! appear anywhere else.
//!
//! ## Tag Types
//!
//! | Id  | Type          | Payload                                                              |
//! |-----|---------------|----------------------------------------------------------------------|
//! | 0   | End           | None                                                                 |
//! | 1   | Byte          | 1 byte signed integer                                                |
//! | 2   | Short         | 2 byte signed integer                                                |
//! | 3   | Int           | 4 byte signed integer                                                |
//! | 4   | Long          | 8 byte signed integer                                                |
//! | 5   | Float         | 4 byte IEEE-754 float                                                |
//! | 6   | Double        | 8 byte IEEE-754 float                                                |
//! | 7   | ByteArray     | 4 byte signed count, then that many bytes                            |
//! | 8   | String        | 2 byte unsigned length, then that many bytes of modified UTF-8       |
//! | 9   | List          | 1 byte element type, 4 byte signed count, then unnamed payloads      |
//! | 10  | Compound      | Named tags until a `TAG_End`                                         |
//! | 11  | IntArray      | 4 byte signed count, then that many 4 byte integers                  |
//! | 12  | LongArray     | 4 byte signed count, then that many 8 byte integers                  |
//! | 100 | ShortArray    | 4 byte signed count, then that many 2 byte integers (non-standard)   |
//!
//! An empty list may declare `TAG_End` as its element type. A non-empty list may not.
//!
//! ## Additional Information
//!
//! - **Endianness**: Big-endian for all multi-byte fields. Bedrock edition writes little-endian, which
//!   can be selected through [`read::ReaderOptions`] and [`write::WriterOptions`].
//! - **Compression Methods**:
//!   - `0`: None (no compression)
//!   - `1`: Gzip
//!   - `2`: Zlib
//!
//! ```
//! # fn doit() -> anvil_nbt::error::Result<()>
//! # {
//! use anvil_nbt::{tag::Compound, NamedTag, Tag};
//!
//! let mut root = Compound::new();
//! root.insert("DataVersion", 3465i32);
//!
//! let bytes = anvil_nbt::to_vec(&NamedTag::new("", root.clone()))?;
//! let decoded = anvil_nbt::from_slice(&bytes)?;
//!
//! assert_eq!(decoded.tag, Tag::Compound(root));
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

use std::io::{Read, Write};

pub mod compression;
pub mod error;
pub mod mutf8;
pub mod read;
pub mod tag;
pub mod write;

pub use compression::CompressionMethod;
pub use read::NbtReader;
pub use tag::{Compound, List, NamedTag, RawArray, Tag, TagType};
pub use write::NbtWriter;

/// Read one Gzip compressed, big-endian tag from `reader`
pub fn from_reader<R: Read>(reader: R) -> error::Result<NamedTag> {
    NbtReader::new(reader, read::ReaderOptions::default()).read_tag()
}

/// Read one Gzip compressed, big-endian tag from a byte slice
pub fn from_slice(bytes: &[u8]) -> error::Result<NamedTag> {
    from_reader(bytes)
}

/// Write `tag` to `writer` Gzip compressed and big-endian, returning the writer
pub fn to_writer<W: Write>(writer: W, tag: &NamedTag) -> error::Result<W> {
    let mut nbt = NbtWriter::new(writer, write::WriterOptions::default());
    nbt.write_tag(tag)?;
    nbt.finish()
}

/// Encode `tag` Gzip compressed and big-endian into a new buffer
pub fn to_vec(tag: &NamedTag) -> error::Result<Vec<u8>> {
    to_writer(Vec::new(), tag)
}
