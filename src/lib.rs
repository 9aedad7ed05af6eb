/*!
A reader, in-memory model and writer for TrueType and OpenType fonts.

## Features

- Parses an SFNT file into an owned [`Font`] model: metadata tables,
  `glyf`/`loca` or `CFF ` outlines, `cmap`, and the OpenType layout
  tables (GDEF, GSUB, GPOS).
- Applies GSUB substitution and GPOS positioning lookups to a glyph
  run, honouring lookup flags, mark filtering and nested contextual
  actions.
- Writes the model back out with recomputed checksums, byte-identical
  for the subtable formats it round-trips.
- Subsets a font to a glyph closure, rewriting `glyf`, `loca`, `hmtx`
  and `cmap`.

## Error handling

All public read/write operations return [`Result`]. Parsing is strict:
a structural violation aborts with [`Error::InvalidFont`] rather than
producing a partial `Font`. The two documented exceptions (duplicate
coverage glyphs, oversized `hmtx` width arrays) are tolerated and
logged through the `log` crate.

## Safety

- The library must not panic on any input. Any panic is considered
  a critical bug.
- The library forbids the unsafe code.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::field_reassign_with_default)]

mod directory;
mod error;
mod font;
mod ggg;
mod parser;
mod subset;
mod tables;
mod writer;

pub use directory::{TableDirectory, TableRecord};
pub use error::{Error, Result};
pub use font::{Font, Outlines, WriteOptions};
pub use ggg::{
    Anchor, ClassDef, Coverage, Feature, GlyphRun, Gpos, GposSubtable, Gsub, GsubSubtable,
    LangSys, LayoutTable, Lookup, LookupFlags, MarkArray, MarkRecord, RunGlyph, Script,
    ValueFormat, ValueRecord,
};
pub use subset::{SubsetOptions, Subsetting};
pub use tables::cff::{CffOutlines, CharStringInterpreter};
pub use tables::cmap::Cmap;
pub use tables::gdef::{Gdef, GlyphClass};
pub use tables::glyf::{Component, Glyf, Glyph, GlyphKind, Point, SimpleGlyph};
pub use tables::head::Head;
pub use tables::hhea::Hhea;
pub use tables::hmtx::Hmtx;
pub use tables::maxp::Maxp;
pub use tables::name::{NameRecord, Naming};
pub use tables::os2::{Os2, Permissions, Weight, Width};
pub use tables::post::Post;

/// A type-safe wrapper for glyph ID.
///
/// Glyph 0 is reserved for `.notdef` and is always kept by subsetting.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug)]
pub struct GlyphId(pub u16);

/// A 4-byte tag.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Tag(pub u32);

impl Tag {
    /// Creates a `Tag` from bytes.
    #[inline]
    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32))
    }

    /// Returns the tag as 4 bytes.
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [
            (self.0 >> 24 & 0xFF) as u8,
            (self.0 >> 16 & 0xFF) as u8,
            (self.0 >> 8 & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ]
    }
}

impl core::fmt::Display for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let b = self.to_bytes();
        for c in &b {
            if c.is_ascii_graphic() || *c == b' ' {
                write!(f, "{}", *c as char)?;
            } else {
                write!(f, "\\x{:02X}", c)?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// A rectangle in font design units.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[allow(missing_docs)]
pub struct Rect {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// A line metrics.
///
/// Used for underline and strikeout.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LineMetrics {
    /// Line position.
    pub position: i16,

    /// Line thickness.
    pub thickness: i16,
}

/// A random-access byte source with `pread` semantics.
///
/// The whole file is read once during parsing; nothing is kept open
/// afterwards, so all acquired resources stay with the caller.
pub trait ByteSource {
    /// Fills `buf` from `offset`. Returns the number of bytes read.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize>;

    /// Total source length in bytes.
    fn len(&self) -> std::io::Result<u64>;

    /// Whether the source is empty.
    fn is_empty(&self) -> std::io::Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ByteSource for [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        let offset = offset.min(self.len() as u64) as usize;
        let n = buf.len().min(self.len() - offset);
        buf[..n].copy_from_slice(&self[offset..offset + n]);
        Ok(n)
    }

    fn len(&self) -> std::io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }
}
