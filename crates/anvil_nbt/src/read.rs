//! Types for reading NBT streams
//!

use binrw::{BinRead, Endian};
use bon::Builder;
use byteorder::ReadBytesExt;
use std::{
    fmt::{self, Debug, Write as _},
    io::{self, Read},
};
use tracing::{debug, instrument, trace};

use crate::{
    compression::{CompressionMethod, NbtBlockReader},
    error::{Error, Result},
    mutf8,
    tag::{Compound, List, NamedTag, RawArray, Tag, TagType},
};

/// Nesting depth at which decoding gives up, matching the limit Minecraft itself enforces
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Upper bound for speculative preallocation driven by untrusted length fields
const MAX_PREALLOCATION: usize = 1 << 16;

/// Options for how an NBT stream should be read
#[derive(Debug, Clone, Copy, Builder)]
pub struct ReaderOptions {
    /// The compression wrapped around the stream
    #[builder(default)]
    pub compression: CompressionMethod,

    /// Keep short, int and long arrays as undecoded bytes, see [`RawArray`]
    #[builder(default)]
    pub raw_arrays: bool,

    /// Byte order of every fixed width field
    #[builder(default = Endian::Big)]
    pub endian: Endian,

    /// Deepest nesting of lists and compounds that will be decoded
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions::builder().build()
    }
}

enum PathSegment {
    Name(String),
    Index(usize),
}

/// A list or compound whose children are still being read
enum Frame {
    List {
        element_type: TagType,
        length: usize,
        elements: Vec<Tag>,
    },
    /// `name` holds the key of the child currently being read
    Compound { compound: Compound, name: String },
}

impl Frame {
    fn attach(&mut self, tag: Tag) {
        match self {
            Frame::List { elements, .. } => elements.push(tag),
            Frame::Compound { compound, name } => {
                compound.insert(std::mem::take(name), tag);
            }
        }
    }

    fn into_tag(self) -> Tag {
        match self {
            Frame::List {
                element_type,
                elements,
                ..
            } => Tag::List(List::from_decoded(element_type, elements)),
            Frame::Compound { compound, .. } => Tag::Compound(compound),
        }
    }
}

enum Payload {
    Value(Tag),
    Nested(Frame),
}

/// NBT stream reader
///
/// ```no_run
/// use anvil_nbt::{read::ReaderOptions, CompressionMethod, NbtReader};
///
/// fn print_root(reader: impl std::io::Read) -> anvil_nbt::error::Result<()> {
///     let mut nbt = NbtReader::new(
///         reader,
///         ReaderOptions::builder()
///             .compression(CompressionMethod::Gzip)
///             .build(),
///     );
///
///     let root = nbt.read_tag()?;
///     println!("{}: {:?}", root.name, root.tag.tag_type());
///
///     Ok(())
/// }
/// ```
pub struct NbtReader<R: Read> {
    reader: NbtBlockReader<R>,
    options: ReaderOptions,
    path: Vec<PathSegment>,
}

impl<R: Read> Debug for NbtReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NbtReader({:?})", self.options)
    }
}

impl<R: Read> NbtReader<R> {
    /// Wrap a source, inserting the decompressor selected in `options`
    pub fn new(reader: R, options: ReaderOptions) -> NbtReader<R> {
        NbtReader {
            reader: NbtBlockReader::new(reader, options.compression),
            options,
            path: Vec::new(),
        }
    }

    /// Wrap a source whose compression is given as a raw on-disk code
    pub fn with_compression_code(reader: R, compression: u8) -> Result<NbtReader<R>> {
        let options = ReaderOptions::builder()
            .compression(CompressionMethod::try_from(compression)?)
            .build();
        Ok(Self::new(reader, options))
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Read one complete named tag, normally the root compound of the stream
    ///
    /// Nested lists and compounds are decoded with an explicit stack, so deeply nested input
    /// cannot exhaust the thread stack.
    #[instrument(skip(self), err)]
    pub fn read_tag(&mut self) -> Result<NamedTag> {
        self.path.clear();

        let tag_type = self.read_tag_type()?;
        if tag_type == TagType::End {
            return Err(Error::UnexpectedEnd { path: self.path() });
        }

        let name = self.read_string()?;
        debug!(%name, ?tag_type, "reading root tag");

        self.path.push(PathSegment::Name(name.clone()));
        let tag = match self.read_start(tag_type)? {
            Payload::Value(tag) => tag,
            Payload::Nested(frame) => self.read_nested(frame)?,
        };
        self.path.pop();

        Ok(NamedTag { name, tag })
    }

    /// Drive the decoding of a list or compound and everything nested inside it
    fn read_nested(&mut self, root: Frame) -> Result<Tag> {
        let mut current = root;
        let mut parents: Vec<Frame> = Vec::new();

        loop {
            let child_type = match &mut current {
                Frame::List {
                    element_type,
                    length,
                    elements,
                } => {
                    if elements.len() < *length {
                        self.path.push(PathSegment::Index(elements.len()));
                        Some(*element_type)
                    } else {
                        None
                    }
                }
                Frame::Compound { name, .. } => {
                    let tag_type = self.read_tag_type()?;
                    if tag_type == TagType::End {
                        None
                    } else {
                        *name = self.read_string()?;
                        self.path.push(PathSegment::Name(name.clone()));
                        Some(tag_type)
                    }
                }
            };

            let finished = match child_type {
                Some(tag_type) => {
                    if parents.len() + 1 > self.options.max_depth {
                        return Err(Error::DepthLimitExceeded {
                            limit: self.options.max_depth,
                            path: self.path(),
                        });
                    }
                    match self.read_start(tag_type)? {
                        Payload::Value(tag) => tag,
                        Payload::Nested(frame) => {
                            parents.push(std::mem::replace(&mut current, frame));
                            continue;
                        }
                    }
                }
                None => match parents.pop() {
                    Some(parent) => std::mem::replace(&mut current, parent).into_tag(),
                    None => return Ok(current.into_tag()),
                },
            };

            current.attach(finished);
            self.path.pop();
        }
    }

    /// Read a scalar or array payload, or the header of a list or compound
    fn read_start(&mut self, tag_type: TagType) -> Result<Payload> {
        Ok(Payload::Value(match tag_type {
            TagType::End => return Err(Error::UnexpectedEnd { path: self.path() }),
            TagType::Byte => Tag::Byte(self.reader.read_i8()?),
            TagType::Short => Tag::Short(self.read_value()?),
            TagType::Int => Tag::Int(self.read_value()?),
            TagType::Long => Tag::Long(self.read_value()?),
            TagType::Float => Tag::Float(self.read_value()?),
            TagType::Double => Tag::Double(self.read_value()?),
            TagType::String => Tag::String(self.read_string()?),
            TagType::List => return Ok(Payload::Nested(self.read_list_header()?)),
            TagType::Compound => {
                return Ok(Payload::Nested(Frame::Compound {
                    compound: Compound::new(),
                    name: String::new(),
                }))
            }
            TagType::ByteArray => {
                let length = self.read_length()?;
                let bytes = self.read_bytes(length)?;
                Tag::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
            }
            TagType::ShortArray | TagType::IntArray | TagType::LongArray
                if self.options.raw_arrays =>
            {
                let length = self.read_length()?;
                let size = tag_type.element_size().unwrap_or(1);
                let bytes = self.read_bytes(length * size)?;
                Tag::RawArray(RawArray::new(tag_type, self.options.endian, bytes))
            }
            TagType::ShortArray => Tag::ShortArray(self.read_array()?),
            TagType::IntArray => Tag::IntArray(self.read_array()?),
            TagType::LongArray => Tag::LongArray(self.read_array()?),
        }))
    }

    fn read_list_header(&mut self) -> Result<Frame> {
        let element_type = self.read_tag_type()?;
        let length = self.read_length()?;
        trace!(?element_type, length, "reading list");

        if element_type == TagType::End && length > 0 {
            return Err(Error::EndInList { path: self.path() });
        }

        Ok(Frame::List {
            element_type,
            length,
            elements: Vec::with_capacity(length.min(MAX_PREALLOCATION)),
        })
    }

    fn read_tag_type(&mut self) -> Result<TagType> {
        let id = self.reader.read_u8()?;
        TagType::from_id(id).ok_or_else(|| Error::UnknownTagType {
            id,
            path: self.path(),
        })
    }

    fn read_string(&mut self) -> Result<String> {
        let length: u16 = self.read_value()?;
        let bytes = self.read_bytes(length as usize)?;
        mutf8::decode(&bytes).ok_or_else(|| Error::InvalidString { path: self.path() })
    }

    fn read_length(&mut self) -> Result<usize> {
        let length: i32 = self.read_value()?;
        usize::try_from(length).map_err(|_| Error::NegativeLength {
            length,
            path: self.path(),
        })
    }

    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOCATION));
        (&mut self.reader)
            .take(length as u64)
            .read_to_end(&mut bytes)?;
        if bytes.len() != length {
            return Err(Error::IOError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes but the stream ended after {}", length, bytes.len()),
            )));
        }
        Ok(bytes)
    }

    fn read_array<T>(&mut self) -> Result<Vec<T>>
    where
        T: for<'a> BinRead<Args<'a> = ()>,
    {
        let length = self.read_length()?;
        let mut values = Vec::with_capacity(length.min(MAX_PREALLOCATION));
        for _ in 0..length {
            values.push(self.read_value()?);
        }
        Ok(values)
    }

    fn read_value<T>(&mut self) -> Result<T>
    where
        T: for<'a> BinRead<Args<'a> = ()>,
    {
        Ok(T::read_options(&mut self.reader, self.options.endian, ())?)
    }

    fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Name(name) if out.is_empty() && name.is_empty() => {
                    out.push_str("<root>")
                }
                PathSegment::Name(name) if out.is_empty() => out.push_str(name),
                PathSegment::Name(name) => {
                    let _ = write!(out, ".{}", name);
                }
                PathSegment::Index(index) => {
                    let _ = write!(out, "[{}]", index);
                }
            }
        }
        if out.is_empty() {
            out.push_str("<root>");
        }
        out
    }
}
