// https://docs.microsoft.com/en-us/typography/opentype/spec/gdef

use crate::ggg::{ClassDef, Coverage};
use crate::parser::{Offset16, Offset32, Stream};
use crate::writer::Writer;
use crate::{Error, GlyphId, Result};

/// A [glyph class](https://docs.microsoft.com/en-us/typography/opentype/spec/gdef#glyph-class-definition-table).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[allow(missing_docs)]
pub enum GlyphClass {
    Base = 1,
    Ligature = 2,
    Mark = 3,
    Component = 4,
}

/// A [Glyph Definition Table](https://docs.microsoft.com/en-us/typography/opentype/spec/gdef).
///
/// Everything is optional; encoding picks the minimal version that
/// carries the populated fields.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Gdef {
    /// Maps glyphs to Base/Ligature/Mark/Component.
    pub glyph_classes: Option<ClassDef>,
    /// Classes used by the mark-attachment-type lookup filter.
    pub mark_attach_classes: Option<ClassDef>,
    /// Coverage sets used by the mark-filtering-set lookup filter.
    pub mark_glyph_sets: Vec<Coverage>,
}

impl Gdef {
    /// Parses the table. Versions 1.0, 1.2 and 1.3; the 1.3 item
    /// variation store is skipped.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "GDEF");
        let major: u16 = s.read()?;
        let minor: u16 = s.read()?;
        if major != 1 || !(minor == 0 || minor == 2 || minor == 3) {
            return Err(Error::NotSupported { subsystem: "GDEF", feature: "table version" });
        }

        let glyph_class_offset: Offset16 = s.read()?;
        s.skip::<Offset16>()?; // attachListOffset
        s.skip::<Offset16>()?; // ligCaretListOffset
        let mark_attach_offset: Offset16 = s.read()?;

        let mut mark_glyph_sets_offset = Offset16(0);
        if minor >= 2 {
            mark_glyph_sets_offset = s.read()?;
        }

        if minor >= 3 {
            s.skip::<Offset32>()?; // itemVarStoreOffset
        }

        let mut table = Gdef::default();

        if !glyph_class_offset.is_null() {
            let subdata = data.get(glyph_class_offset.to_usize()..).ok_or(
                Error::UnexpectedEof { subsystem: "GDEF", offset: glyph_class_offset.to_usize() },
            )?;
            table.glyph_classes = Some(ClassDef::parse(subdata)?);
        }

        if !mark_attach_offset.is_null() {
            let subdata = data.get(mark_attach_offset.to_usize()..).ok_or(
                Error::UnexpectedEof { subsystem: "GDEF", offset: mark_attach_offset.to_usize() },
            )?;
            table.mark_attach_classes = Some(ClassDef::parse(subdata)?);
        }

        if !mark_glyph_sets_offset.is_null() {
            let subdata = data.get(mark_glyph_sets_offset.to_usize()..).ok_or(
                Error::UnexpectedEof {
                    subsystem: "GDEF",
                    offset: mark_glyph_sets_offset.to_usize(),
                },
            )?;
            let mut s = Stream::new(subdata, "GDEF");
            let format: u16 = s.read()?;
            if format != 1 {
                return Err(Error::NotSupported {
                    subsystem: "GDEF",
                    feature: "mark glyph sets format",
                });
            }

            let offsets: Vec<Offset32> = s.read_vec16()?;
            for offset in offsets {
                let set_data = subdata.get(offset.to_usize()..).ok_or(Error::UnexpectedEof {
                    subsystem: "GDEF",
                    offset: offset.to_usize(),
                })?;
                table.mark_glyph_sets.push(Coverage::parse(set_data)?);
            }
        }

        Ok(table)
    }

    /// The glyph's class, when one is assigned.
    pub fn glyph_class(&self, glyph_id: GlyphId) -> Option<GlyphClass> {
        match self.glyph_classes.as_ref()?.class(glyph_id) {
            1 => Some(GlyphClass::Base),
            2 => Some(GlyphClass::Ligature),
            3 => Some(GlyphClass::Mark),
            4 => Some(GlyphClass::Component),
            _ => None,
        }
    }

    /// The glyph's mark attachment class. 0 when unassigned.
    pub fn mark_attach_class(&self, glyph_id: GlyphId) -> u16 {
        self.mark_attach_classes.as_ref().map_or(0, |def| def.class(glyph_id))
    }

    /// Whether the glyph belongs to the given mark glyph set.
    pub fn in_mark_glyph_set(&self, set_index: u16, glyph_id: GlyphId) -> bool {
        self.mark_glyph_sets
            .get(usize::from(set_index))
            .map_or(false, |set| set.contains(glyph_id))
    }

    /// Whether any field is populated.
    pub fn is_empty(&self) -> bool {
        self.glyph_classes.is_none()
            && self.mark_attach_classes.is_none()
            && self.mark_glyph_sets.is_empty()
    }

    /// Serializes the table as version 1.0, or 1.2 when mark glyph
    /// sets are present.
    pub fn encode(&self, w: &mut Writer) {
        let minor: u16 = if self.mark_glyph_sets.is_empty() { 0 } else { 2 };
        let header_len = if minor == 0 { 12 } else { 14 };

        let mut subtables = Writer::new();
        let mut glyph_class_offset = 0u16;
        if let Some(classes) = &self.glyph_classes {
            glyph_class_offset = (header_len + subtables.len()) as u16;
            classes.encode(&mut subtables);
        }

        let mut mark_attach_offset = 0u16;
        if let Some(classes) = &self.mark_attach_classes {
            mark_attach_offset = (header_len + subtables.len()) as u16;
            classes.encode(&mut subtables);
        }

        let mut mark_sets_offset = 0u16;
        if !self.mark_glyph_sets.is_empty() {
            mark_sets_offset = (header_len + subtables.len()) as u16;
            // MarkGlyphSets: format, count, then 32-bit offsets from
            // the start of this subtable.
            subtables.write_u16(1);
            subtables.write_u16(self.mark_glyph_sets.len() as u16);
            let mut at = 4 + 4 * self.mark_glyph_sets.len();
            for set in &self.mark_glyph_sets {
                subtables.write_u32(at as u32);
                at += set.encode_len();
            }
            for set in &self.mark_glyph_sets {
                set.encode(&mut subtables);
            }
        }

        w.write_u16(1); // majorVersion
        w.write_u16(minor);
        w.write_u16(glyph_class_offset);
        w.write_u16(0); // attachListOffset
        w.write_u16(0); // ligCaretListOffset
        w.write_u16(mark_attach_offset);
        if minor >= 2 {
            w.write_u16(mark_sets_offset);
        }
        w.write_bytes(subtables.as_bytes());
    }
}
