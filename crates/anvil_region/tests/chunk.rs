use std::io::{Cursor, Seek, SeekFrom, Write};

use anvil_nbt::{CompressionMethod, Compound, List, NamedTag, Tag, TagType};
use anvil_region::{
    chunk::SECTOR_SIZE,
    error::Error,
    palette::{extract_dense, extract_padded, DenseIndexDecoder},
    Chunk,
};
use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

/// Pack 4096 values of `bits` each into one contiguous bit string
fn pack_dense(values: &[u64], bits: usize) -> Vec<i64> {
    let mut words = vec![0u64; values.len() * bits / 64];
    for (i, value) in values.iter().enumerate() {
        for b in 0..bits {
            let n = i * bits + b;
            words[n / 64] |= ((value >> b) & 1) << (n % 64);
        }
    }
    words.into_iter().map(|w| w as i64).collect()
}

/// Pack 4096 values of `bits` each, never splitting a value across two words
fn pack_padded(values: &[u64], bits: usize) -> Vec<i64> {
    values
        .chunks(64 / bits)
        .map(|values| {
            values
                .iter()
                .enumerate()
                .fold(0u64, |acc, (k, v)| acc | v << (k * bits)) as i64
        })
        .collect()
}

fn section(block_states: Tag) -> Result<NamedTag> {
    let mut section = Compound::new();
    section.insert("Y", 0i8);
    section.insert("BlockStates", block_states);

    let mut level = Compound::new();
    level.insert("xPos", 3i32);
    level.insert("zPos", 5i32);
    level.insert(
        "Sections",
        List::new(TagType::Compound, vec![Tag::Compound(section)])?,
    );

    let mut root = Compound::new();
    root.insert("DataVersion", 2230i32);
    root.insert("Level", level);

    Ok(NamedTag::new("", root))
}

fn block_states(root: &NamedTag) -> Option<&Tag> {
    let Tag::Compound(root) = &root.tag else {
        return None;
    };
    let Some(Tag::Compound(level)) = root.get("Level") else {
        return None;
    };
    let Some(Tag::List(sections)) = level.get("Sections") else {
        return None;
    };
    let Some(Tag::Compound(section)) = sections.get(0) else {
        return None;
    };
    section.get("BlockStates")
}

#[traced_test]
#[test]
fn chunk_round_trip() -> Result<()> {
    let values = (0..4096u64).map(|i| (i * 7) % 26).collect::<Vec<_>>();
    let words = pack_dense(&values, 5);
    let tag = section(Tag::LongArray(words))?;

    for compression in [
        CompressionMethod::None,
        CompressionMethod::Gzip,
        CompressionMethod::Zlib,
    ] {
        let chunk = Chunk::from_tag(3, 5, 1_600_000_000, &tag, compression)?;
        info!(?compression, length = chunk.real_length(), "encoded");

        assert_eq!(chunk.data().len(), chunk.sector_length() * SECTOR_SIZE);
        assert_eq!(chunk.compression(), u8::from(compression));

        let decoded = chunk.read_tag()?;
        assert_eq!(decoded.name, "chunk");
        assert_eq!(decoded.tag, tag.tag);

        let Some(Tag::LongArray(words)) = block_states(&decoded) else {
            panic!("missing block states");
        };
        assert_eq!(DenseIndexDecoder::new(words)?.decode_all(), values);
    }

    Ok(())
}

#[traced_test]
#[test]
fn large_chunk_spans_sectors() -> Result<()> {
    let words = (0..2048i64)
        .map(|i| i.wrapping_mul(0x5851_F42D_4C95_7F2D))
        .collect::<Vec<_>>();
    let chunk = Chunk::from_tag(
        0,
        0,
        0,
        &section(Tag::LongArray(words))?,
        CompressionMethod::None,
    )?;

    let expected_sectors = (chunk.real_length() + 5) / SECTOR_SIZE + 1;
    assert!(expected_sectors >= 5);
    assert_eq!(chunk.sector_length(), expected_sectors);
    assert_eq!(chunk.data().len(), expected_sectors * SECTOR_SIZE);

    Ok(())
}

#[traced_test]
#[test]
fn read_from_region_sectors() -> Result<()> {
    let values = (0..4096u64).map(|i| i % 17).collect::<Vec<_>>();
    let chunk = Chunk::from_tag(
        31,
        0,
        42,
        &section(Tag::LongArray(pack_padded(&values, 5)))?,
        CompressionMethod::Zlib,
    )?;

    // two header sectors, one unused sector, then the record
    let mut region = Cursor::new(vec![0u8; 3 * SECTOR_SIZE]);
    region.seek(SeekFrom::End(0)).into_diagnostic()?;
    region.write_all(chunk.data()).into_diagnostic()?;

    let loaded = Chunk::from_sectors(31, 0, 42, &mut region, 3, chunk.sector_length() as u32)?;
    assert_eq!(loaded.data(), chunk.data());

    // raw array mode leaves the words undecoded
    let raw = loaded.reader(true)?.read_tag()?;
    let Some(Tag::RawArray(block_states)) = block_states(&raw) else {
        panic!("missing block states");
    };
    assert_eq!(block_states.tag_type(), TagType::LongArray);
    assert_eq!(extract_padded(&block_states.to_long_array(), 17)?, values);

    Ok(())
}

#[traced_test]
#[test]
fn read_past_end_of_region() {
    let mut region = Cursor::new(vec![0u8; 2 * SECTOR_SIZE]);

    assert!(matches!(
        Chunk::from_sectors(0, 0, 0, &mut region, 2, 1),
        Err(Error::IOError(_))
    ));
}

#[traced_test]
#[test]
fn timestamps() -> Result<()> {
    let tag = section(Tag::LongArray(vec![0; 256]))?;
    let chunk = Chunk::from_tag(0, 0, 7, &tag, CompressionMethod::Zlib)?;
    let now = Chunk::current_timestamp();
    let touched = chunk.with_timestamp(now);

    assert!(now > 1_600_000_000);
    assert_eq!(touched.timestamp(), now);
    assert_eq!(chunk.timestamp(), 7);
    assert_eq!(touched.read_tag()?, chunk.read_tag()?);

    Ok(())
}

#[test]
fn dense_values_cross_words() {
    let values = (0..4096u64).map(|i| i % 128).collect::<Vec<_>>();
    let words = pack_dense(&values, 7);

    for (i, value) in values.iter().enumerate() {
        assert_eq!(extract_dense(&words, i, 7), *value);
    }
}
