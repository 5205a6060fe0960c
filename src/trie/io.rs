//! Flat `SFTI` persistence.
//!
//! The on-disk image is a 28-byte header followed by the raw little-endian
//! node array and, for maps, the packed value array:
//!
//! ```text
//! offset  size  field
//! 0       4     magic = "SFTI"
//! 4       1     version_major
//! 5       1     version_minor
//! 6       1     container kind: 0=set, 1=map
//! 7       1     index kind: 0=basic, 1=tail, 2=decomp (only basic here)
//! 8       1     charset: 0=system, 1=unicode
//! 9       1     encoding: 0=system, 1=utf8, 2=utf16, 3=utf32
//! 10      1     integer type tag (uint8..int64)
//! 11      1     value type tag (uint8..int64; 0 for sets)
//! 12      8     text count
//! 20      8     node count (sentinel included)
//! 28      ...   packed nodes, then packed values (map only)
//! ```
//!
//! The loader refuses any mismatched tag and propagates I/O failures; a
//! refused load leaves nothing half-built.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use super::node::{IndexUnit, Node};
use super::{TrieMap, TrieSet};
use crate::text::Symbol;

pub(crate) const MAGIC: [u8; 4] = *b"SFTI";
pub(crate) const VERSION_MAJOR: u8 = 0;
pub(crate) const VERSION_MINOR: u8 = 0;

pub(crate) const CONTAINER_SET: u8 = 0;
pub(crate) const CONTAINER_MAP: u8 = 1;
pub(crate) const INDEX_BASIC: u8 = 0;

/// Failures while saving or loading a trie image.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The underlying stream failed.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// The stream does not start with the `SFTI` magic.
    #[error("not an SFTI image (bad magic)")]
    BadMagic,

    /// The image was written by an incompatible version.
    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version found in the image.
        major: u8,
        /// Minor version found in the image.
        minor: u8,
    },

    /// Set/map kind of the image does not match the requested type.
    #[error("container kind mismatch: expected {expected}, found {found}")]
    ContainerMismatch {
        /// Kind implied by the requested type.
        expected: u8,
        /// Kind found in the image.
        found: u8,
    },

    /// Only the basic flat layout is supported.
    #[error("unsupported index kind {0}")]
    UnsupportedIndexKind(u8),

    /// Charset or encoding tag does not match the unit type.
    #[error("text encoding mismatch: expected charset/encoding {expected:?}, found {found:?}")]
    EncodingMismatch {
        /// (charset, encoding) implied by the requested unit type.
        expected: (u8, u8),
        /// (charset, encoding) found in the image.
        found: (u8, u8),
    },

    /// Offset integer tag does not match the requested offset type.
    #[error("integer type mismatch: expected tag {expected}, found {found}")]
    IntegerMismatch {
        /// Tag implied by the requested offset type.
        expected: u8,
        /// Tag found in the image.
        found: u8,
    },

    /// Value tag does not match the requested value type.
    #[error("value type mismatch: expected tag {expected}, found {found}")]
    ValueMismatch {
        /// Tag implied by the requested value type.
        expected: u8,
        /// Tag found in the image.
        found: u8,
    },

    /// Structurally impossible node array.
    #[error("corrupt node array")]
    Corrupt,
}

/// Plain-old-data value types storable in a map image.
pub trait ValueUnit: Copy + Clone + Send + Sync + 'static {
    /// Value type tag recorded in the persistence header.
    const TYPE_TAG: u8;

    /// Write in little-endian form.
    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()>;

    /// Read in little-endian form.
    fn read_le<R: Read>(reader: &mut R) -> io::Result<Self>;
}

macro_rules! impl_value_unit {
    ($($ty:ty => $tag:expr),+ $(,)?) => {
        $(
            impl ValueUnit for $ty {
                const TYPE_TAG: u8 = $tag;

                #[inline]
                fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()> {
                    writer.write_all(&self.to_le_bytes())
                }

                #[inline]
                fn read_le<R: Read>(reader: &mut R) -> io::Result<Self> {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    reader.read_exact(&mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )+
    };
}

impl_value_unit! {
    u8 => 0, i8 => 1, u16 => 2, i16 => 3,
    u32 => 4, i32 => 5, u64 => 6, i64 => 7,
}

struct Header {
    container: u8,
    charset: u8,
    encoding: u8,
    integer: u8,
    value: u8,
    text_count: u64,
    node_count: u64,
}

impl Header {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[
            VERSION_MAJOR,
            VERSION_MINOR,
            self.container,
            INDEX_BASIC,
            self.charset,
            self.encoding,
            self.integer,
            self.value,
        ])?;
        writer.write_all(&self.text_count.to_le_bytes())?;
        writer.write_all(&self.node_count.to_le_bytes())
    }

    fn read<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(PersistError::BadMagic);
        }
        let mut tags = [0u8; 8];
        reader.read_exact(&mut tags)?;
        let [major, minor, container, index_kind, charset, encoding, integer, value] = tags;
        if (major, minor) != (VERSION_MAJOR, VERSION_MINOR) {
            return Err(PersistError::UnsupportedVersion { major, minor });
        }
        if index_kind != INDEX_BASIC {
            return Err(PersistError::UnsupportedIndexKind(index_kind));
        }
        let mut count = [0u8; 8];
        reader.read_exact(&mut count)?;
        let text_count = u64::from_le_bytes(count);
        reader.read_exact(&mut count)?;
        let node_count = u64::from_le_bytes(count);
        Ok(Header {
            container,
            charset,
            encoding,
            integer,
            value,
            text_count,
            node_count,
        })
    }

    fn expect<U: Symbol, I: IndexUnit>(&self, container: u8) -> Result<(), PersistError> {
        if self.container != container {
            return Err(PersistError::ContainerMismatch {
                expected: container,
                found: self.container,
            });
        }
        if (self.charset, self.encoding) != (U::CHARSET_TAG, U::ENCODING_TAG) {
            return Err(PersistError::EncodingMismatch {
                expected: (U::CHARSET_TAG, U::ENCODING_TAG),
                found: (self.charset, self.encoding),
            });
        }
        if self.integer != I::TYPE_TAG {
            return Err(PersistError::IntegerMismatch {
                expected: I::TYPE_TAG,
                found: self.integer,
            });
        }
        Ok(())
    }
}

fn read_nodes<U: Symbol, I: IndexUnit, R: Read>(
    reader: &mut R,
    count: u64,
    with_value_ids: bool,
) -> Result<(Vec<Node<U, I>>, Vec<I>), PersistError> {
    if count < 2 {
        return Err(PersistError::Corrupt);
    }
    let count = count as usize;
    let mut nodes = Vec::with_capacity(count);
    let mut value_ids = Vec::with_capacity(if with_value_ids { count } else { 0 });
    for _ in 0..count {
        let data = I::read_le(reader)?;
        if with_value_ids {
            value_ids.push(I::read_le(reader)?);
        }
        let label = U::read_unit(reader)?;
        nodes.push(Node::from_parts(data, label));
    }
    // The sentinel's next equals the array length; anything else means the
    // image was truncated or rearranged.
    if nodes[count - 1].next() != count {
        return Err(PersistError::Corrupt);
    }
    Ok((nodes, value_ids))
}

impl<U: Symbol, I: IndexUnit> TrieSet<U, I> {
    /// Dump the trie to a writer in the `SFTI` format.
    pub fn save_to<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        Header {
            container: CONTAINER_SET,
            charset: U::CHARSET_TAG,
            encoding: U::ENCODING_TAG,
            integer: I::TYPE_TAG,
            value: 0,
            text_count: self.key_count as u64,
            node_count: self.nodes.len() as u64,
        }
        .write(writer)?;
        for node in &self.nodes {
            node.data().write_le(writer)?;
            node.label().write_unit(writer)?;
        }
        Ok(())
    }

    /// Load a set image from a reader, refusing mismatched tags.
    pub fn load_from<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        let header = Header::read(reader)?;
        header.expect::<U, I>(CONTAINER_SET)?;
        let (nodes, _) = read_nodes::<U, I, R>(reader, header.node_count, false)?;
        Ok(TrieSet {
            nodes,
            key_count: header.text_count as usize,
        })
    }

    /// Save to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::load_from(&mut reader)
    }
}

impl<V: ValueUnit, U: Symbol, I: IndexUnit> TrieMap<V, U, I> {
    /// Dump the trie and its value array to a writer in the `SFTI` format.
    pub fn save_to<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        Header {
            container: CONTAINER_MAP,
            charset: U::CHARSET_TAG,
            encoding: U::ENCODING_TAG,
            integer: I::TYPE_TAG,
            value: V::TYPE_TAG,
            text_count: self.key_count as u64,
            node_count: self.nodes.len() as u64,
        }
        .write(writer)?;
        for (node, &value_id) in self.nodes.iter().zip(&self.value_ids) {
            node.data().write_le(writer)?;
            value_id.write_le(writer)?;
            node.label().write_unit(writer)?;
        }
        for value in &self.values {
            value.write_le(writer)?;
        }
        Ok(())
    }

    /// Load a map image from a reader, refusing mismatched tags.
    pub fn load_from<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        let header = Header::read(reader)?;
        header.expect::<U, I>(CONTAINER_MAP)?;
        if header.value != V::TYPE_TAG {
            return Err(PersistError::ValueMismatch {
                expected: V::TYPE_TAG,
                found: header.value,
            });
        }
        let (nodes, value_ids) = read_nodes::<U, I, R>(reader, header.node_count, true)?;
        let mut values = Vec::with_capacity(header.text_count as usize);
        for _ in 0..header.text_count {
            values.push(V::read_le(reader)?);
        }
        Ok(TrieMap {
            nodes,
            value_ids,
            values,
            key_count: header.text_count as usize,
        })
    }

    /// Save to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::load_from(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_round_trip() {
        let trie: TrieSet = TrieSet::from_sorted(&["am", "amd", "cad", "cm"]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        let loaded = TrieSet::<u8, u32>::load_from(&mut &image[..]).unwrap();
        assert_eq!(loaded.len(), 4);
        for key in ["am", "amd", "cad", "cm"] {
            assert!(loaded.contains(key));
        }
        assert!(!loaded.contains("ca"));
    }

    #[test]
    fn map_round_trip() {
        let trie: TrieMap<u32> =
            TrieMap::from_sorted(&[("am", 1), ("amd", 2), ("cad", 3)]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        let loaded = TrieMap::<u32, u8, u32>::load_from(&mut &image[..]).unwrap();
        assert_eq!(loaded.get("amd"), Some(&2));
        assert_eq!(loaded.get("cad"), Some(&3));
        assert_eq!(loaded.get("a"), None);
    }

    #[test]
    fn header_is_28_bytes() {
        let trie: TrieSet = TrieSet::from_sorted::<&str>(&[]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        // header + (root + sentinel) * (4-byte data + 1-byte label)
        assert_eq!(image.len(), 28 + 2 * 5);
        assert_eq!(&image[..4], b"SFTI");
    }

    #[test]
    fn refuses_bad_magic() {
        let image = b"NOPE".to_vec();
        let err = TrieSet::<u8, u32>::load_from(&mut &image[..]).unwrap_err();
        assert!(matches!(err, PersistError::BadMagic));
    }

    #[test]
    fn refuses_container_mismatch() {
        let trie: TrieSet = TrieSet::from_sorted(&["a"]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        let err = TrieMap::<u32, u8, u32>::load_from(&mut &image[..]).unwrap_err();
        assert!(matches!(err, PersistError::ContainerMismatch { .. }));
    }

    #[test]
    fn refuses_integer_mismatch() {
        let trie: TrieSet = TrieSet::from_sorted(&["a"]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        let err = TrieSet::<u8, u64>::load_from(&mut &image[..]).unwrap_err();
        assert!(matches!(err, PersistError::IntegerMismatch { .. }));
    }

    #[test]
    fn refuses_truncated_nodes() {
        let trie: TrieSet = TrieSet::from_sorted(&["abc", "abd"]).unwrap();
        let mut image = Vec::new();
        trie.save_to(&mut image).unwrap();
        image.truncate(image.len() - 3);
        let err = TrieSet::<u8, u32>::load_from(&mut &image[..]).unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
