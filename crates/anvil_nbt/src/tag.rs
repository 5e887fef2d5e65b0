//! Base types for the in-memory NBT tree.

use binrw::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Wire identifier of every tag kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    /// Terminates a compound, or marks the element type of an empty list
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
    /// Non-standard extension, not understood by Minecraft itself
    ShortArray = 100,
}

impl TagType {
    /// Width in bytes of one element of an array type, `None` for everything else
    pub fn element_size(self) -> Option<usize> {
        match self {
            TagType::ByteArray => Some(1),
            TagType::ShortArray => Some(2),
            TagType::IntArray => Some(4),
            TagType::LongArray => Some(8),
            _ => None,
        }
    }

    /// Look up a wire id, returning `None` if it is not a known tag type
    pub fn from_id(id: u8) -> Option<TagType> {
        Some(match id {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            100 => TagType::ShortArray,
            _ => return None,
        })
    }
}

impl TryFrom<u8> for TagType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        TagType::from_id(value).ok_or_else(|| Error::UnknownTagType {
            id: value,
            path: String::new(),
        })
    }
}

impl From<TagType> for u8 {
    fn from(value: TagType) -> Self {
        value as u8
    }
}

/// One decoded NBT value
///
/// Names are not part of the value: elements of a [`List`] are unnamed, children of a
/// [`Compound`] are named by their key and the root is wrapped in a [`NamedTag`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    ShortArray(Vec<i16>),
    /// A short, int or long array left undecoded by a reader in raw array mode
    RawArray(RawArray),
}

impl Tag {
    /// The wire type this value is written as
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::String(_) => TagType::String,
            Tag::List(_) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
            Tag::ShortArray(_) => TagType::ShortArray,
            Tag::RawArray(raw) => raw.tag_type(),
        }
    }
}

/// An ordered sequence of unnamed tags which all share one type
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element_type: TagType,
    elements: Vec<Tag>,
}

impl List {
    /// Create a list, checking that every element is of `element_type`
    pub fn new(element_type: TagType, elements: Vec<Tag>) -> Result<Self> {
        if let Some(found) = elements
            .iter()
            .map(Tag::tag_type)
            .find(|t| *t != element_type)
        {
            return Err(Error::MixedListTypes {
                expected: element_type,
                found,
            });
        }

        Ok(List {
            element_type,
            elements,
        })
    }

    /// An empty list, written with an element type of [`TagType::End`]
    pub fn empty() -> Self {
        List {
            element_type: TagType::End,
            elements: Vec::new(),
        }
    }

    pub(crate) fn from_decoded(element_type: TagType, elements: Vec<Tag>) -> Self {
        List {
            element_type,
            elements,
        }
    }

    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.elements.iter()
    }

    pub fn into_inner(self) -> Vec<Tag> {
        self.elements
    }
}

/// A mapping of unique names to tags
///
/// Insertion order is preserved so that a decoded tree re-encodes byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound(IndexMap<String, Tag>);

impl Compound {
    pub fn new() -> Self {
        Compound(IndexMap::new())
    }

    /// Insert a child, returning the previous value stored under that name
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        self.0.insert(name.into(), tag.into())
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Tag)> for Compound {
    fn from_iter<T: IntoIterator<Item = (String, Tag)>>(iter: T) -> Self {
        Compound(iter.into_iter().collect())
    }
}

/// The root of an NBT stream together with its name
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
    pub name: String,
    pub tag: Tag,
}

impl NamedTag {
    pub fn new(name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        NamedTag {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

/// Undecoded element bytes of a short, int or long array
///
/// Produced instead of a typed array when a reader runs in raw array mode. The bytes are kept in
/// the order they were read with, so the array can be converted lazily or written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    array_type: TagType,
    endian: Endian,
    bytes: Vec<u8>,
}

impl RawArray {
    pub(crate) fn new(array_type: TagType, endian: Endian, bytes: Vec<u8>) -> Self {
        RawArray {
            array_type,
            endian,
            bytes,
        }
    }

    /// The array type this data was declared as
    pub fn tag_type(&self) -> TagType {
        self.array_type
    }

    /// Byte order of the elements in [`RawArray::bytes`]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of elements, not bytes
    pub fn len(&self) -> usize {
        self.array_type
            .element_size()
            .map_or(0, |size| self.bytes.len() / size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_short_array(&self) -> Vec<i16> {
        let mut out = vec![0; self.bytes.len() / 2];
        match self.endian {
            Endian::Big => BigEndian::read_i16_into(&self.bytes[..out.len() * 2], &mut out),
            Endian::Little => LittleEndian::read_i16_into(&self.bytes[..out.len() * 2], &mut out),
        }
        out
    }

    pub fn to_int_array(&self) -> Vec<i32> {
        let mut out = vec![0; self.bytes.len() / 4];
        match self.endian {
            Endian::Big => BigEndian::read_i32_into(&self.bytes[..out.len() * 4], &mut out),
            Endian::Little => LittleEndian::read_i32_into(&self.bytes[..out.len() * 4], &mut out),
        }
        out
    }

    pub fn to_long_array(&self) -> Vec<i64> {
        let mut out = vec![0; self.bytes.len() / 8];
        match self.endian {
            Endian::Big => BigEndian::read_i64_into(&self.bytes[..out.len() * 8], &mut out),
            Endian::Little => LittleEndian::read_i64_into(&self.bytes[..out.len() * 8], &mut out),
        }
        out
    }

    /// Decode into the typed tag this array would have been read as outside raw array mode
    pub fn to_tag(&self) -> Tag {
        match self.array_type {
            TagType::ShortArray => Tag::ShortArray(self.to_short_array()),
            TagType::IntArray => Tag::IntArray(self.to_int_array()),
            _ => Tag::LongArray(self.to_long_array()),
        }
    }
}

macro_rules! impl_from_for_tag {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_tag! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<i16> => ShortArray,
    RawArray => RawArray,
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_owned())
    }
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::assert_eq;

    use crate::error::Error;
    use crate::tag::{Compound, List, RawArray, Tag, TagType};

    #[test]
    fn tag_type_ids() {
        for id in (0..=12).chain([100]) {
            let tag_type = TagType::from_id(id).expect("known id");
            assert_eq!(u8::from(tag_type), id);
        }

        assert!(TagType::from_id(13).is_none());
        assert!(matches!(
            TagType::try_from(99),
            Err(Error::UnknownTagType { id: 99, .. })
        ));
    }

    #[test]
    fn list_rejects_mixed_types() {
        let result = List::new(TagType::Int, vec![Tag::Int(1), Tag::String("a".into())]);

        assert!(matches!(
            result,
            Err(Error::MixedListTypes {
                expected: TagType::Int,
                found: TagType::String
            })
        ));
    }

    #[test]
    fn list_rejects_elements_of_end_type() {
        assert!(List::new(TagType::End, vec![Tag::Byte(0)]).is_err());
        assert!(List::new(TagType::End, Vec::new()).is_ok());
    }

    #[test]
    fn raw_arrays_count_as_their_declared_type() {
        let raw = RawArray::new(TagType::LongArray, Endian::Big, vec![0; 16]);
        let list = List::new(TagType::LongArray, vec![Tag::RawArray(raw)]);

        assert!(list.is_ok());
    }

    #[test]
    fn raw_array_conversion() {
        #[rustfmt::skip]
        let big = RawArray::new(TagType::IntArray, Endian::Big, vec![
            0x00, 0x00, 0x00, 0x01,
            0xFF, 0xFF, 0xFF, 0xFE,
        ]);
        #[rustfmt::skip]
        let little = RawArray::new(TagType::IntArray, Endian::Little, vec![
            0x01, 0x00, 0x00, 0x00,
            0xFE, 0xFF, 0xFF, 0xFF,
        ]);

        assert_eq!(big.len(), 2);
        assert_eq!(big.to_int_array(), vec![1, -2]);
        assert_eq!(little.to_int_array(), vec![1, -2]);
        assert_eq!(big.to_tag(), Tag::IntArray(vec![1, -2]));
    }

    #[test]
    fn compound_preserves_insertion_order() {
        let mut compound = Compound::new();
        compound.insert("z", 1i32);
        compound.insert("a", "text");
        compound.insert("m", 2.5f64);

        let names = compound.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(names, vec!["z", "a", "m"]);

        assert_eq!(compound.insert("a", 3i8), Some(Tag::String("text".into())));
        assert_eq!(compound.len(), 3);
    }
}
