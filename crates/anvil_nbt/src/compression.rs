//! Stream compression and decompression handling.

use std::io::{self, Read, Seek, Write};

use binrw::io::NoSeek;
use flate2::{
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use tracing::instrument;

use crate::error::Error;

/// Identifies the compression wrapped around an NBT stream
///
/// The same codes are stored in the header of every chunk inside a region file.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionMethod {
    /// Stores the data as it is
    None = 0,

    /// Compress the data using Gzip, the default for standalone `.dat` files
    #[default]
    Gzip = 1,

    /// Compress the data using Zlib, the default for region file chunks
    Zlib = 2,
}

impl TryFrom<u8> for CompressionMethod {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionMethod::None),
            1 => Ok(CompressionMethod::Gzip),
            2 => Ok(CompressionMethod::Zlib),
            other => Err(Error::UnsupportedCompression(other)),
        }
    }
}

impl From<CompressionMethod> for u8 {
    fn from(value: CompressionMethod) -> Self {
        value as u8
    }
}

/// Decompressing view over an NBT source
///
/// Only forward reads are supported; the [`Seek`] implementation exists so binrw can query the
/// current position while parsing primitives.
pub enum NbtBlockReader<R: Read> {
    Raw(R),
    Gzip(Box<GzDecoder<R>>),
    Zlib(Box<ZlibDecoder<R>>),
}

impl<R: Read> NbtBlockReader<R> {
    #[instrument(skip(reader))]
    pub fn new(reader: R, compression: CompressionMethod) -> Self {
        match compression {
            CompressionMethod::None => NbtBlockReader::Raw(reader),
            CompressionMethod::Gzip => NbtBlockReader::Gzip(Box::new(GzDecoder::new(reader))),
            CompressionMethod::Zlib => NbtBlockReader::Zlib(Box::new(ZlibDecoder::new(reader))),
        }
    }

    /// Unwrap and return the underlying source
    ///
    /// Any data buffered by the decompressor is lost.
    pub fn into_inner(self) -> R {
        match self {
            NbtBlockReader::Raw(r) => r,
            NbtBlockReader::Gzip(r) => r.into_inner(),
            NbtBlockReader::Zlib(r) => r.into_inner(),
        }
    }
}

impl<R: Read> Seek for NbtBlockReader<R> {
    #[instrument(skip(self), err)]
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        match self {
            NbtBlockReader::Raw(r) => NoSeek::new(r).seek(pos),
            NbtBlockReader::Gzip(r) => NoSeek::new(r).seek(pos),
            NbtBlockReader::Zlib(r) => NoSeek::new(r).seek(pos),
        }
    }
}

impl<R: Read> Read for NbtBlockReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            NbtBlockReader::Raw(r) => r.read(buf),
            NbtBlockReader::Gzip(r) => r.read(buf),
            NbtBlockReader::Zlib(r) => r.read(buf),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        match self {
            NbtBlockReader::Raw(r) => r.read_exact(buf),
            NbtBlockReader::Gzip(r) => r.read_exact(buf),
            NbtBlockReader::Zlib(r) => r.read_exact(buf),
        }
    }
}

/// Compressing view over an NBT sink
pub enum NbtBlockWriter<W: Write> {
    Raw(W, usize),
    Gzip(Box<GzEncoder<W>>, usize),
    Zlib(Box<ZlibEncoder<W>>),
}

impl<W: Write> NbtBlockWriter<W> {
    #[instrument(skip(writer))]
    pub fn new(writer: W, compression: CompressionMethod) -> Self {
        match compression {
            CompressionMethod::None => NbtBlockWriter::Raw(writer, 0),
            CompressionMethod::Gzip => NbtBlockWriter::Gzip(
                Box::new(GzEncoder::new(writer, Compression::default())),
                0,
            ),
            CompressionMethod::Zlib => NbtBlockWriter::Zlib(Box::new(ZlibEncoder::new(
                writer,
                Compression::default(),
            ))),
        }
    }

    /// Flush any pending compressed data, write the stream trailer and return the sink
    #[instrument(skip(self), err)]
    pub fn finalize(self) -> io::Result<W> {
        match self {
            NbtBlockWriter::Raw(w, _) => Ok(w),
            NbtBlockWriter::Gzip(w, _) => w.finish(),
            NbtBlockWriter::Zlib(w) => w.finish(),
        }
    }

    /// Number of uncompressed bytes written so far
    pub fn total_in(&self) -> u64 {
        match self {
            NbtBlockWriter::Raw(_, c) => *c as u64,
            NbtBlockWriter::Gzip(_, c) => *c as u64,
            NbtBlockWriter::Zlib(w) => w.total_in(),
        }
    }
}

impl<W: Write> Seek for NbtBlockWriter<W> {
    #[instrument(skip(self), err)]
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        match self {
            NbtBlockWriter::Raw(w, _) => NoSeek::new(w).seek(pos),
            NbtBlockWriter::Gzip(w, _) => NoSeek::new(w).seek(pos),
            NbtBlockWriter::Zlib(w) => NoSeek::new(w).seek(pos),
        }
    }
}

impl<W: Write> Write for NbtBlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            NbtBlockWriter::Raw(w, c) => {
                let written = w.write(buf)?;
                *c += written;
                Ok(written)
            }
            NbtBlockWriter::Gzip(w, c) => {
                let written = w.write(buf)?;
                *c += written;
                Ok(written)
            }
            NbtBlockWriter::Zlib(w) => w.write(buf),
        }
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            NbtBlockWriter::Raw(w, _) => w.flush(),
            NbtBlockWriter::Gzip(w, _) => w.flush(),
            NbtBlockWriter::Zlib(w) => w.flush(),
        }
    }
}
