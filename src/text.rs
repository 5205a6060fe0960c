//! Code-unit abstraction and key preparation.
//!
//! The trie is generic over [`Symbol`], a fixed-width code unit: [`u8`] for
//! byte-level indexing (fastest, UTF-8 bytes) or [`char`] for
//! character-level indexing (edit distances counted in scalar values).
//! Higher-level Unicode normalization is a caller concern; units are
//! compared and hashed by value only.

use std::fmt::Debug;
use std::hash::Hash;
use std::io::{self, Read, Write};

/// A fixed-width code unit used as a trie edge label.
///
/// The zero unit ([`Symbol::NULL`]) is reserved: it labels the root slot
/// and serves as the wildcard edge of the Levenshtein automaton, so keys
/// containing it are not indexable.
pub trait Symbol:
    Copy + Clone + Ord + Eq + Hash + Debug + Send + Sync + 'static
{
    /// The reserved zero unit (root slot label, automaton wildcard).
    const NULL: Self;

    /// Charset tag recorded in the persistence header.
    const CHARSET_TAG: u8;

    /// Encoding tag recorded in the persistence header.
    const ENCODING_TAG: u8;

    /// Width of one unit on disk, in bytes.
    const WIDTH: usize;

    /// Decompose a string into units.
    fn units_of(s: &str) -> Vec<Self>;

    /// Render a unit sequence back into a string.
    ///
    /// For `u8` this is lossy UTF-8 decoding; for `char` it is lossless.
    fn render(units: &[Self]) -> String;

    /// Write one unit in little-endian form.
    fn write_unit<W: Write>(self, writer: &mut W) -> io::Result<()>;

    /// Read one unit in little-endian form.
    fn read_unit<R: Read>(reader: &mut R) -> io::Result<Self>;
}

impl Symbol for u8 {
    const NULL: Self = 0;
    const CHARSET_TAG: u8 = 0; // system default
    const ENCODING_TAG: u8 = 1; // utf8
    const WIDTH: usize = 1;

    #[inline]
    fn units_of(s: &str) -> Vec<Self> {
        s.as_bytes().to_vec()
    }

    #[inline]
    fn render(units: &[Self]) -> String {
        String::from_utf8_lossy(units).into_owned()
    }

    #[inline]
    fn write_unit<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self])
    }

    #[inline]
    fn read_unit<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl Symbol for char {
    const NULL: Self = '\0';
    const CHARSET_TAG: u8 = 1; // unicode
    const ENCODING_TAG: u8 = 3; // utf32
    const WIDTH: usize = 4;

    #[inline]
    fn units_of(s: &str) -> Vec<Self> {
        s.chars().collect()
    }

    #[inline]
    fn render(units: &[Self]) -> String {
        units.iter().collect()
    }

    #[inline]
    fn write_unit<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&(self as u32).to_le_bytes())
    }

    #[inline]
    fn read_unit<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        char::from_u32(u32::from_le_bytes(buf)).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "invalid scalar value")
        })
    }
}

/// Sort keys lexicographically and drop duplicates, in place.
///
/// Build preparation for [`crate::trie::TrieSet::from_sorted`] and friends.
/// UTF-8 byte order and scalar-value order agree, so one sort serves both
/// unit types.
pub fn sort_keys<S: AsRef<str> + Ord>(keys: &mut Vec<S>) {
    keys.sort();
    keys.dedup_by(|a, b| a.as_ref() == b.as_ref());
}

/// Sort key–value pairs key-major and drop duplicate keys, keeping the
/// first value of each key.
pub fn sort_pairs<S: AsRef<str> + Ord, V>(pairs: &mut Vec<(S, V)>) {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs.dedup_by(|a, b| a.0.as_ref() == b.0.as_ref());
}
