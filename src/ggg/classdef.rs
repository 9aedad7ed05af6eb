//! The Class Definition table.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#class-definition-table>

use std::collections::BTreeMap;

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, GlyphId, Result};

/// A mapping from glyph IDs to class numbers.
///
/// Unassigned glyphs belong to class 0; only non-zero classes are
/// stored. [`encode`](ClassDef::encode) evaluates both on-disk formats
/// and picks the smaller.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct ClassDef {
    classes: BTreeMap<GlyphId, u16>,
}

impl ClassDef {
    /// Builds a class definition from `(glyph, class)` pairs. Class 0
    /// entries are dropped.
    pub fn new(pairs: impl IntoIterator<Item = (GlyphId, u16)>) -> Self {
        ClassDef {
            classes: pairs.into_iter().filter(|&(_, class)| class != 0).collect(),
        }
    }

    /// Parses either on-disk format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "classdef");
        let format: u16 = s.read()?;
        let mut classes = BTreeMap::new();
        match format {
            1 => {
                let start: GlyphId = s.read()?;
                let values: Vec<u16> = s.read_vec16()?;
                if usize::from(start.0) + values.len() > usize::from(u16::MAX) + 1 {
                    return Err(Error::InvalidFont {
                        subsystem: "classdef",
                        reason: "glyph range overflow",
                    });
                }

                for (index, &class) in values.iter().enumerate() {
                    if class != 0 {
                        classes.insert(GlyphId(start.0 + index as u16), class);
                    }
                }
            }
            2 => {
                let count: u16 = s.read()?;
                let mut prev_end: Option<GlyphId> = None;
                for _ in 0..count {
                    let start: GlyphId = s.read()?;
                    let end: GlyphId = s.read()?;
                    let class: u16 = s.read()?;

                    if end < start {
                        return Err(Error::InvalidFont {
                            subsystem: "classdef",
                            reason: "range end before start",
                        });
                    }

                    if let Some(prev) = prev_end {
                        if start <= prev {
                            return Err(Error::InvalidFont {
                                subsystem: "classdef",
                                reason: "overlapping ranges",
                            });
                        }
                    }

                    if class != 0 {
                        for gid in start.0..=end.0 {
                            classes.insert(GlyphId(gid), class);
                        }
                    }
                    prev_end = Some(end);
                }
            }
            _ => {
                return Err(Error::InvalidFont { subsystem: "classdef", reason: "unknown format" })
            }
        }

        Ok(ClassDef { classes })
    }

    /// The glyph's class. Class 0 when unassigned.
    #[inline]
    pub fn class(&self, glyph_id: GlyphId) -> u16 {
        self.classes.get(&glyph_id).copied().unwrap_or(0)
    }

    /// The number of classes: the highest assigned class plus one.
    pub fn num_classes(&self) -> u16 {
        self.classes.values().max().map_or(1, |&max| max + 1)
    }

    /// Glyphs grouped by class. Index 0 is always empty.
    pub fn glyphs_per_class(&self) -> Vec<Vec<GlyphId>> {
        let mut per_class = vec![Vec::new(); usize::from(self.num_classes())];
        for (&gid, &class) in &self.classes {
            per_class[usize::from(class)].push(gid);
        }
        per_class
    }

    /// Whether no glyph has a non-zero class.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates `(glyph, class)` pairs, ascending by glyph.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, u16)> + '_ {
        self.classes.iter().map(|(&gid, &class)| (gid, class))
    }

    // Runs of consecutive glyphs sharing one class.
    fn ranges(&self) -> Vec<(GlyphId, GlyphId, u16)> {
        let mut ranges: Vec<(GlyphId, GlyphId, u16)> = Vec::new();
        for (&gid, &class) in &self.classes {
            match ranges.last_mut() {
                Some((_, end, last_class)) if end.0 + 1 == gid.0 && *last_class == class => {
                    *end = gid;
                }
                _ => ranges.push((gid, gid, class)),
            }
        }
        ranges
    }

    fn format1_len(&self) -> Option<usize> {
        let first = self.classes.keys().next()?;
        let last = self.classes.keys().next_back()?;
        Some(6 + 2 * (usize::from(last.0) - usize::from(first.0) + 1))
    }

    /// The exact byte length [`encode`](ClassDef::encode) will produce.
    pub fn encode_len(&self) -> usize {
        let format2 = 4 + 6 * self.ranges().len();
        match self.format1_len() {
            Some(format1) => format1.min(format2),
            None => format2,
        }
    }

    /// Serializes the smaller of the two formats.
    pub fn encode(&self, w: &mut Writer) {
        let format2 = 4 + 6 * self.ranges().len();
        if self.format1_len().map_or(false, |format1| format1 <= format2) {
            let first = *self.classes.keys().next().unwrap();
            let last = *self.classes.keys().next_back().unwrap();
            w.write_u16(1);
            w.write_glyph(first);
            w.write_u16(last.0 - first.0 + 1);
            for gid in first.0..=last.0 {
                w.write_u16(self.class(GlyphId(gid)));
            }
        } else {
            let ranges = self.ranges();
            w.write_u16(2);
            w.write_u16(ranges.len() as u16);
            for (start, end, class) in ranges {
                w.write_glyph(start);
                w.write_glyph(end);
                w.write_u16(class);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_default_class() {
        let def = ClassDef::new(vec![(GlyphId(5), 1), (GlyphId(6), 2)]);
        assert_eq!(def.class(GlyphId(5)), 1);
        assert_eq!(def.class(GlyphId(6)), 2);
        assert_eq!(def.class(GlyphId(7)), 0);
        assert_eq!(def.num_classes(), 3);
    }

    #[test]
    fn glyphs_per_class_keeps_index_zero_empty() {
        let def = ClassDef::new(vec![(GlyphId(5), 2), (GlyphId(9), 2), (GlyphId(1), 1)]);
        let per_class = def.glyphs_per_class();
        assert_eq!(per_class.len(), 3);
        assert!(per_class[0].is_empty());
        assert_eq!(per_class[1], vec![GlyphId(1)]);
        assert_eq!(per_class[2], vec![GlyphId(5), GlyphId(9)]);
    }

    #[test]
    fn format1_parse() {
        let data = &[
            0x00, 0x01, // format: 1
            0x00, 0x0A, // startGlyphID: 10
            0x00, 0x03, // glyphCount: 3
            0x00, 0x01, // class: 1
            0x00, 0x00, // class: 0
            0x00, 0x02, // class: 2
        ];
        let def = ClassDef::parse(data).unwrap();
        assert_eq!(def.class(GlyphId(10)), 1);
        assert_eq!(def.class(GlyphId(11)), 0);
        assert_eq!(def.class(GlyphId(12)), 2);
    }

    #[test]
    fn format2_overlap_rejected() {
        let data = &[
            0x00, 0x02, // format: 2
            0x00, 0x02, // rangeCount: 2
            0x00, 0x01, 0x00, 0x05, 0x00, 0x01, // 1..=5 -> 1
            0x00, 0x05, 0x00, 0x09, 0x00, 0x02, // 5..=9 -> 2, overlaps
        ];
        assert_eq!(
            ClassDef::parse(data).unwrap_err(),
            Error::InvalidFont { subsystem: "classdef", reason: "overlapping ranges" }
        );
    }

    #[test]
    fn encode_picks_smaller_format() {
        // Compact span: format 1 wins. 3 contiguous glyphs with
        // distinct classes would need 3 ranges (22 bytes) vs 12.
        let def =
            ClassDef::new(vec![(GlyphId(10), 1), (GlyphId(11), 2), (GlyphId(12), 1)]);
        assert_eq!(def.encode_len(), 12);
        let mut w = Writer::new();
        def.encode(&mut w);
        assert_eq!(w.as_bytes()[..2], [0x00, 0x01]);
        assert_eq!(ClassDef::parse(w.as_bytes()).unwrap(), def);

        // Two distant glyphs: format 2 wins.
        let def = ClassDef::new(vec![(GlyphId(10), 1), (GlyphId(500), 1)]);
        assert_eq!(def.encode_len(), 16);
        let mut w = Writer::new();
        def.encode(&mut w);
        assert_eq!(w.as_bytes()[..2], [0x00, 0x02]);
        assert_eq!(ClassDef::parse(w.as_bytes()).unwrap(), def);
    }

    #[test]
    fn round_trip_both_formats() {
        for def in [
            ClassDef::new(vec![(GlyphId(3), 1), (GlyphId(4), 1), (GlyphId(5), 2)]),
            ClassDef::new((100..140).map(|gid| (GlyphId(gid), 3))),
        ] {
            let mut w = Writer::new();
            def.encode(&mut w);
            assert_eq!(w.len(), def.encode_len());
            assert_eq!(ClassDef::parse(w.as_bytes()).unwrap(), def);
        }
    }
}
