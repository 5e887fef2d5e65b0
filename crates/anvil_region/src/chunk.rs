//! Self-contained, sector aligned chunk records

use std::{
    io::{Cursor, Read, Seek, SeekFrom},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anvil_nbt::{
    read::ReaderOptions,
    write::{NbtWriter, WriterOptions},
    CompressionMethod, NamedTag, NbtReader, Tag,
};
use binrw::{BinRead, BinWrite};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result},
    types::RecordHeader,
};

/// Size of one storage unit in a region file
pub const SECTOR_SIZE: usize = 4096;

/// Number of chunks along each axis of a region
pub const REGION_WIDTH: i32 = 32;

/// Name given to the root compound returned by [`Chunk::read_tag`]
pub const ROOT_NAME: &str = "chunk";

/// One chunk of a region file, stored as its raw on-disk record
///
/// The record buffer always spans a whole number of sectors. It starts with a [`RecordHeader`],
/// followed by the compressed NBT payload and zero padding. Decoding is deferred until
/// [`Chunk::read_tag`] is called.
///
/// A chunk never changes after construction. Copies made through [`Clone`] or
/// [`Chunk::with_timestamp`] share the record buffer.
#[derive(Clone, Debug)]
pub struct Chunk {
    x: i32,
    z: i32,
    timestamp: i32,
    header: RecordHeader,
    data: Arc<[u8]>,
}

fn check_coordinates(x: i32, z: i32) -> Result<()> {
    if !(0..REGION_WIDTH).contains(&x) || !(0..REGION_WIDTH).contains(&z) {
        return Err(Error::InvalidCoordinates { x, z });
    }
    Ok(())
}

impl Chunk {
    /// Wrap a record buffer exactly as it is stored on disk
    ///
    /// The buffer length must be a non-zero multiple of [`SECTOR_SIZE`]. The payload itself is not
    /// inspected.
    #[instrument(skip(data), err)]
    pub fn from_storage(
        x: i32,
        z: i32,
        timestamp: i32,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<Chunk> {
        check_coordinates(x, z)?;

        let data = data.into();
        if data.is_empty() || data.len() % SECTOR_SIZE != 0 {
            return Err(Error::InvalidBufferSize(data.len()));
        }

        let header = RecordHeader::read(&mut Cursor::new(&data[..RecordHeader::SIZE]))?;
        trace!(?header, sectors = data.len() / SECTOR_SIZE, "wrapped chunk record");

        Ok(Chunk {
            x,
            z,
            timestamp,
            header,
            data,
        })
    }

    /// Read `sector_count` sectors starting at sector `sector_offset` of a region file
    #[instrument(skip(reader), err)]
    pub fn from_sectors<R: Read + Seek>(
        x: i32,
        z: i32,
        timestamp: i32,
        reader: &mut R,
        sector_offset: u32,
        sector_count: u32,
    ) -> Result<Chunk> {
        check_coordinates(x, z)?;

        let mut data = vec![0u8; sector_count as usize * SECTOR_SIZE];
        reader.seek(SeekFrom::Start(sector_offset as u64 * SECTOR_SIZE as u64))?;
        reader.read_exact(&mut data)?;

        Self::from_storage(x, z, timestamp, data)
    }

    /// Encode `tag` into a fresh record buffer using `compression`
    #[instrument(skip(tag), err)]
    pub fn from_tag(
        x: i32,
        z: i32,
        timestamp: i32,
        tag: &NamedTag,
        compression: CompressionMethod,
    ) -> Result<Chunk> {
        check_coordinates(x, z)?;

        let mut nbt = NbtWriter::new(
            Vec::with_capacity(SECTOR_SIZE),
            WriterOptions::builder().compression(compression).build(),
        );
        nbt.write_tag(tag)?;
        let payload = nbt.finish()?;

        let sectors = (payload.len() + RecordHeader::SIZE) / SECTOR_SIZE + 1;
        let header = RecordHeader::for_payload(payload.len(), compression.into())?;
        debug!(payload = payload.len(), sectors, "encoded chunk");

        let mut data = vec![0u8; sectors * SECTOR_SIZE];
        header.write(&mut Cursor::new(&mut data[..RecordHeader::SIZE]))?;
        data[RecordHeader::SIZE..RecordHeader::SIZE + payload.len()].copy_from_slice(&payload);

        Ok(Chunk {
            x,
            z,
            timestamp,
            header,
            data: data.into(),
        })
    }

    /// A copy of this chunk carrying a different timestamp, sharing the record buffer
    pub fn with_timestamp(&self, timestamp: i32) -> Chunk {
        Chunk {
            timestamp,
            data: Arc::clone(&self.data),
            ..*self
        }
    }

    /// X coordinate relative to the region origin
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Z coordinate relative to the region origin
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Seconds since the epoch at which the chunk was last written, see
    /// [`Chunk::current_timestamp`]
    pub fn timestamp(&self) -> i32 {
        self.timestamp
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// The raw compression code stored in the header
    pub fn compression(&self) -> u8 {
        self.header.compression
    }

    /// Number of payload bytes following the header
    pub fn real_length(&self) -> usize {
        self.header.real_length()
    }

    /// Number of sectors this record occupies when written to disk
    ///
    /// This is always at least one, and one more than strictly needed when the record ends exactly
    /// on a sector boundary.
    pub fn sector_length(&self) -> usize {
        (self.real_length() + RecordHeader::SIZE) / SECTOR_SIZE + 1
    }

    /// The whole record buffer, header and padding included
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The compressed payload without header or padding
    pub fn payload(&self) -> Result<&[u8]> {
        let length = self.real_length();
        self.data
            .get(RecordHeader::SIZE..RecordHeader::SIZE + length)
            .ok_or(Error::InvalidLength {
                length,
                available: self.data.len() - RecordHeader::SIZE,
            })
    }

    /// An NBT reader positioned at the start of the payload
    pub fn reader(&self, raw_arrays: bool) -> Result<NbtReader<&[u8]>> {
        let compression = CompressionMethod::try_from(self.compression())?;
        Ok(NbtReader::new(
            self.payload()?,
            ReaderOptions::builder()
                .compression(compression)
                .raw_arrays(raw_arrays)
                .build(),
        ))
    }

    /// Decode the payload
    ///
    /// The root tag must be a compound. It is returned under the name [`ROOT_NAME`] regardless of
    /// the name stored on disk, which is usually empty.
    #[instrument(skip(self), fields(x = self.x, z = self.z), err)]
    pub fn read_tag(&self) -> Result<NamedTag> {
        match self.reader(false)?.read_tag()?.tag {
            Tag::Compound(root) => Ok(NamedTag::new(ROOT_NAME, root)),
            other => Err(Error::UnexpectedRootType(other.tag_type())),
        }
    }

    /// The current time in the format of [`Chunk::timestamp`]
    pub fn current_timestamp() -> i32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i32)
    }
}
