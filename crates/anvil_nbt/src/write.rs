//! Types for writing NBT streams
//!

use binrw::{BinWrite, Endian};
use bon::Builder;
use byteorder::WriteBytesExt;
use std::fmt::{self, Debug};
use std::io::Write;
use tracing::{debug, instrument};

use crate::compression::{CompressionMethod, NbtBlockWriter};
use crate::error::{Error, Result};
use crate::mutf8;
use crate::tag::{Compound, List, NamedTag, Tag, TagType};

/// Options for how an NBT stream should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct WriterOptions {
    /// The compression to wrap around the stream
    #[builder(default)]
    pub compression: CompressionMethod,

    /// Byte order of every fixed width field
    #[builder(default = Endian::Big)]
    pub endian: Endian,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions::builder().build()
    }
}

/// NBT stream generator
///
/// ```
/// # fn doit() -> anvil_nbt::error::Result<()>
/// # {
/// use anvil_nbt::{tag::Compound, write::WriterOptions, CompressionMethod, NamedTag, NbtWriter};
///
/// let mut level = Compound::new();
/// level.insert("xPos", 3i32);
/// level.insert("zPos", -7i32);
///
/// let mut nbt = NbtWriter::new(
///     Vec::new(),
///     WriterOptions::builder()
///         .compression(CompressionMethod::Zlib)
///         .build(),
/// );
/// nbt.write_tag(&NamedTag::new("", level))?;
///
/// let bytes = nbt.finish()?;
/// assert!(!bytes.is_empty());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct NbtWriter<W: Write> {
    writer: NbtBlockWriter<W>,
    options: WriterOptions,
}

impl<W: Write> Debug for NbtWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NbtWriter({:?})", self.options)
    }
}

impl<W: Write> NbtWriter<W> {
    /// Wrap a sink, inserting the compressor selected in `options`
    pub fn new(writer: W, options: WriterOptions) -> NbtWriter<W> {
        NbtWriter {
            writer: NbtBlockWriter::new(writer, options.compression),
            options,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Write one complete named tag, normally the root compound of the stream
    #[instrument(skip_all, err, fields(name = %tag.name))]
    pub fn write_tag(&mut self, tag: &NamedTag) -> Result<()> {
        self.writer.write_u8(tag.tag.tag_type().into())?;
        self.write_string(&tag.name)?;
        self.write_payload(&tag.tag)
    }

    /// Finish compression and return the inner writer
    #[instrument(skip(self), err)]
    pub fn finish(self) -> Result<W> {
        debug!(uncompressed = self.writer.total_in(), "finishing nbt stream");
        Ok(self.writer.finalize()?)
    }

    fn write_payload(&mut self, tag: &Tag) -> Result<()> {
        match tag {
            Tag::Byte(v) => self.writer.write_i8(*v)?,
            Tag::Short(v) => self.write_value(v)?,
            Tag::Int(v) => self.write_value(v)?,
            Tag::Long(v) => self.write_value(v)?,
            Tag::Float(v) => self.write_value(v)?,
            Tag::Double(v) => self.write_value(v)?,
            Tag::String(v) => self.write_string(v)?,
            Tag::List(list) => self.write_list(list)?,
            Tag::Compound(compound) => self.write_compound(compound)?,
            Tag::ByteArray(values) => {
                self.write_length(values.len())?;
                let bytes = values.iter().map(|b| *b as u8).collect::<Vec<_>>();
                self.writer.write_all(&bytes)?;
            }
            Tag::ShortArray(values) => self.write_array(values)?,
            Tag::IntArray(values) => self.write_array(values)?,
            Tag::LongArray(values) => self.write_array(values)?,
            Tag::RawArray(raw) if raw.endian() != self.options.endian => {
                self.write_payload(&raw.to_tag())?
            }
            Tag::RawArray(raw) => {
                let size = raw.tag_type().element_size().unwrap_or(1);
                self.write_length(raw.len())?;
                self.writer.write_all(&raw.bytes()[..raw.len() * size])?;
            }
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<()> {
        self.writer.write_u8(list.element_type().into())?;
        self.write_length(list.len())?;
        for element in list.iter() {
            self.write_payload(element)?;
        }
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound) -> Result<()> {
        for (name, tag) in compound.iter() {
            self.writer.write_u8(tag.tag_type().into())?;
            self.write_string(name)?;
            self.write_payload(tag)?;
        }
        self.writer.write_u8(TagType::End.into())?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = mutf8::encode(value);
        let length = u16::try_from(bytes.len()).map_err(|_| Error::StringTooLong(bytes.len()))?;
        self.write_value(&length)?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    fn write_length(&mut self, length: usize) -> Result<()> {
        let length = i32::try_from(length).map_err(|_| Error::ArrayTooLong(length))?;
        self.write_value(&length)
    }

    fn write_array<T>(&mut self, values: &[T]) -> Result<()>
    where
        T: for<'a> BinWrite<Args<'a> = ()>,
    {
        self.write_length(values.len())?;
        for value in values {
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: for<'a> BinWrite<Args<'a> = ()>,
    {
        Ok(value.write_options(&mut self.writer, self.options.endian, ())?)
    }
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::compression::CompressionMethod;
    use crate::error::{Error, Result};
    use crate::read::{NbtReader, ReaderOptions};
    use crate::tag::{Compound, List, NamedTag, RawArray, Tag, TagType};
    use crate::write::{NbtWriter, WriterOptions};

    fn write(tag: &NamedTag, options: WriterOptions) -> Result<Vec<u8>> {
        let mut writer = NbtWriter::new(Vec::new(), options);
        writer.write_tag(tag)?;
        writer.finish()
    }

    fn uncompressed() -> WriterOptions {
        WriterOptions::builder()
            .compression(CompressionMethod::None)
            .build()
    }

    #[traced_test]
    #[test]
    fn write_hello_world() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x0A, 0x00, 0x0B, b'h', b'e', b'l', b'l', b'o', b' ', b'w', b'o', b'r', b'l', b'd',
            0x08, 0x00, 0x04, b'n', b'a', b'm', b'e',
            0x00, 0x09, b'B', b'a', b'n', b'a', b'n', b'r', b'a', b'm', b'a',
            0x00,
        ];

        let mut root = Compound::new();
        root.insert("name", "Bananrama");

        let actual = write(&NamedTag::new("hello world", root), uncompressed())?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_little_endian_list() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x09, 0x01, 0x00, b'l',
            0x02, 0x02, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0xFE, 0xFF,
        ];

        let list = List::new(TagType::Short, vec![Tag::Short(1), Tag::Short(-2)])?;
        let actual = write(
            &NamedTag::new("l", list),
            WriterOptions::builder()
                .compression(CompressionMethod::None)
                .endian(Endian::Little)
                .build(),
        )?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_empty_list_and_arrays() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x0A, 0x00, 0x00,
            0x09, 0x00, 0x01, b'e', 0x00, 0x00, 0x00, 0x00, 0x00,
            0x07, 0x00, 0x01, b'b', 0x00, 0x00, 0x00, 0x02, 0xFF, 0x01,
            0x64, 0x00, 0x01, b's', 0x00, 0x00, 0x00, 0x01, 0x80, 0x00,
            0x00,
        ];

        let mut root = Compound::new();
        root.insert("e", List::empty());
        root.insert("b", vec![-1i8, 1]);
        root.insert("s", vec![i16::MIN]);

        let actual = write(&NamedTag::new("", root), uncompressed())?;
        assert_eq!(actual, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn raw_arrays_write_back_unchanged() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            0x0A, 0x00, 0x00,
            0x0B, 0x00, 0x01, b'i', 0x00, 0x00, 0x00, 0x02,
                0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
            0x00,
        ];

        let mut reader = NbtReader::new(
            input.as_slice(),
            ReaderOptions::builder()
                .compression(CompressionMethod::None)
                .raw_arrays(true)
                .build(),
        );
        let tag = reader.read_tag()?;

        assert_eq!(write(&tag, uncompressed())?, input);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn raw_arrays_convert_between_byte_orders() -> Result<()> {
        #[rustfmt::skip]
        let little = vec![
            0x0B, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
        ];

        let tag = NamedTag::new(
            "",
            RawArray::new(TagType::IntArray, Endian::Little, vec![0x02, 0x00, 0x00, 0x00]),
        );

        assert_eq!(
            write(
                &tag,
                WriterOptions::builder()
                    .compression(CompressionMethod::None)
                    .endian(Endian::Little)
                    .build()
            )?,
            little
        );
        assert_eq!(
            write(&tag, uncompressed())?,
            vec![0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn string_too_long() {
        let tag = NamedTag::new("", "x".repeat(u16::MAX as usize + 1));

        assert!(matches!(
            write(&tag, uncompressed()),
            Err(Error::StringTooLong(65536))
        ));
    }
}
