//! The Coverage table.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table>

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, GlyphId, Result};

/// An ordered mapping from glyph IDs to dense coverage indices.
///
/// The in-memory form is format-agnostic; [`encode`](Coverage::encode)
/// picks whichever on-disk format is smaller. Glyph IDs are strictly
/// ascending, except that duplicates from quirky format 1 tables are
/// kept so later coverage indices still line up (the first occurrence
/// wins on lookup). When only membership matters (GDEF mark glyph
/// sets), the index is simply ignored.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Coverage {
    glyphs: Vec<GlyphId>,
}

impl Coverage {
    /// Builds a coverage from arbitrary glyphs, sorting and removing
    /// duplicates.
    pub fn new(mut glyphs: Vec<GlyphId>) -> Self {
        glyphs.sort();
        glyphs.dedup();
        Coverage { glyphs }
    }

    /// Parses either on-disk format.
    ///
    /// Format 1 tolerates duplicated glyph IDs (fonts like Roboto ship
    /// them); anything else out of order is rejected. Format 2
    /// additionally verifies that each range's start coverage index
    /// matches the running count.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "coverage");
        let format: u16 = s.read()?;
        match format {
            1 => {
                let glyphs: Vec<GlyphId> = s.read_vec16()?;
                for pair in glyphs.windows(2) {
                    if pair[1] < pair[0] {
                        return Err(Error::InvalidFont {
                            subsystem: "coverage",
                            reason: "unsorted glyphs",
                        });
                    }
                    if pair[1] == pair[0] {
                        log::warn!("coverage: duplicated glyph {}", pair[0].0);
                    }
                }
                Ok(Coverage { glyphs })
            }
            2 => {
                let count: u16 = s.read()?;
                let mut glyphs = Vec::new();
                let mut prev_end: Option<GlyphId> = None;
                for _ in 0..count {
                    let start: GlyphId = s.read()?;
                    let end: GlyphId = s.read()?;
                    let start_coverage_index: u16 = s.read()?;

                    if end < start {
                        return Err(Error::InvalidFont {
                            subsystem: "coverage",
                            reason: "range end before start",
                        });
                    }

                    if let Some(prev) = prev_end {
                        if start <= prev {
                            return Err(Error::InvalidFont {
                                subsystem: "coverage",
                                reason: "unsorted ranges",
                            });
                        }
                    }

                    if usize::from(start_coverage_index) != glyphs.len() {
                        return Err(Error::InvalidFont {
                            subsystem: "coverage",
                            reason: "non-contiguous coverage indices",
                        });
                    }

                    if glyphs.len() + usize::from(end.0 - start.0) >= usize::from(u16::MAX) {
                        return Err(Error::InvalidFont {
                            subsystem: "coverage",
                            reason: "too many covered glyphs",
                        });
                    }

                    for gid in start.0..=end.0 {
                        glyphs.push(GlyphId(gid));
                    }
                    prev_end = Some(end);
                }
                Ok(Coverage { glyphs })
            }
            _ => Err(Error::InvalidFont { subsystem: "coverage", reason: "unknown format" }),
        }
    }

    /// Whether the glyph is covered.
    #[inline]
    pub fn contains(&self, glyph_id: GlyphId) -> bool {
        self.glyphs.binary_search(&glyph_id).is_ok()
    }

    /// The glyph's coverage index. The first occurrence wins for
    /// duplicated glyphs.
    pub fn index(&self, glyph_id: GlyphId) -> Option<u16> {
        let mut at = self.glyphs.binary_search(&glyph_id).ok()?;
        while at > 0 && self.glyphs[at - 1] == glyph_id {
            at -= 1;
        }
        Some(at as u16)
    }

    /// All covered glyphs, ascending.
    #[inline]
    pub fn glyphs(&self) -> &[GlyphId] {
        &self.glyphs
    }

    /// The number of coverage entries.
    #[inline]
    pub fn len(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// Whether the coverage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Drops entries whose coverage index is `limit` or larger.
    ///
    /// Subtables use this when their per-index arrays are shorter than
    /// the coverage.
    pub fn prune(&mut self, limit: u16) {
        self.glyphs.truncate(usize::from(limit));
    }

    fn ranges(&self) -> usize {
        let mut ranges = 0;
        let mut prev: Option<GlyphId> = None;
        for &gid in &self.glyphs {
            if prev.map_or(true, |p| gid.0 != p.0 + 1) {
                ranges += 1;
            }
            prev = Some(gid);
        }
        ranges
    }

    fn has_duplicates(&self) -> bool {
        self.glyphs.windows(2).any(|pair| pair[0] == pair[1])
    }

    /// The exact byte length [`encode`](Coverage::encode) will produce.
    pub fn encode_len(&self) -> usize {
        let format1 = 4 + 2 * self.glyphs.len();
        if self.has_duplicates() {
            // Ranges cannot express duplicates.
            return format1;
        }

        format1.min(4 + 6 * self.ranges())
    }

    /// Serializes the smaller of the two formats.
    pub fn encode(&self, w: &mut Writer) {
        let format1 = 4 + 2 * self.glyphs.len();
        let format2 = 4 + 6 * self.ranges();
        if self.has_duplicates() || format1 <= format2 {
            w.write_u16(1);
            w.write_u16(self.glyphs.len() as u16);
            for &gid in &self.glyphs {
                w.write_glyph(gid);
            }
        } else {
            w.write_u16(2);
            w.write_u16(self.ranges() as u16);
            let mut index = 0u16;
            let mut i = 0;
            while i < self.glyphs.len() {
                let start = self.glyphs[i];
                let mut end = start;
                let mut len = 1;
                while i + len < self.glyphs.len() && self.glyphs[i + len].0 == end.0 + 1 {
                    end = self.glyphs[i + len];
                    len += 1;
                }
                w.write_glyph(start);
                w.write_glyph(end);
                w.write_u16(index);
                index += len as u16;
                i += len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gids(ids: &[u16]) -> Vec<GlyphId> {
        ids.iter().map(|&id| GlyphId(id)).collect()
    }

    #[test]
    fn format1_selected_for_scattered_glyphs() {
        let coverage = Coverage::new(gids(&[1, 2, 3]));
        // 3 glyphs: format 1 costs 10, format 2 costs 10; ties go to 1.
        let mut w = Writer::new();
        coverage.encode(&mut w);
        assert_eq!(
            w.as_bytes(),
            &[0x00, 0x01, 0x00, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03]
        );
        assert_eq!(coverage.encode_len(), w.len());

        let parsed = Coverage::parse(w.as_bytes()).unwrap();
        assert_eq!(parsed, coverage);
        assert_eq!(parsed.index(GlyphId(1)), Some(0));
        assert_eq!(parsed.index(GlyphId(2)), Some(1));
        assert_eq!(parsed.index(GlyphId(3)), Some(2));
    }

    #[test]
    fn format2_selected_for_long_run() {
        let coverage = Coverage::new(gids(&(10..=20).collect::<Vec<_>>()));
        let mut w = Writer::new();
        coverage.encode(&mut w);
        assert_eq!(w.as_bytes(), &[0x00, 0x02, 0x00, 0x01, 0x00, 0x0A, 0x00, 0x14, 0x00, 0x00]);
        assert_eq!(coverage.encode_len(), 10);

        let parsed = Coverage::parse(w.as_bytes()).unwrap();
        assert_eq!(parsed, coverage);
        assert_eq!(parsed.index(GlyphId(20)), Some(10));
    }

    #[test]
    fn format2_start_coverage_index_checked() {
        let data = &[
            0x00, 0x02, // format: 2
            0x00, 0x01, // rangeCount: 1
            0x00, 0x0A, // start: 10
            0x00, 0x14, // end: 20
            0x00, 0x05, // startCoverageIndex: 5, must be 0
        ];
        assert_eq!(
            Coverage::parse(data).unwrap_err(),
            Error::InvalidFont { subsystem: "coverage", reason: "non-contiguous coverage indices" }
        );
    }

    #[test]
    fn format1_duplicates_tolerated() {
        let data = &[
            0x00, 0x01, // format: 1
            0x00, 0x03, // glyphCount: 3
            0x00, 0x05, // glyph: 5
            0x00, 0x05, // glyph: 5, duplicated
            0x00, 0x09, // glyph: 9
        ];
        let coverage = Coverage::parse(data).unwrap();
        assert_eq!(coverage.len(), 3);
        // The lowest index wins; glyph 9 keeps its original index.
        assert_eq!(coverage.index(GlyphId(5)), Some(0));
        assert_eq!(coverage.index(GlyphId(9)), Some(2));

        // Duplicates force format 1 on re-encode.
        let mut w = Writer::new();
        coverage.encode(&mut w);
        assert_eq!(w.as_bytes(), data);
    }

    #[test]
    fn format1_unsorted_rejected() {
        let data = &[
            0x00, 0x01, // format: 1
            0x00, 0x02, // glyphCount: 2
            0x00, 0x09, // glyph: 9
            0x00, 0x05, // glyph: 5
        ];
        assert!(Coverage::parse(data).is_err());
    }

    #[test]
    fn prune_drops_high_indices() {
        let mut coverage = Coverage::new(gids(&[1, 2, 3, 4]));
        coverage.prune(2);
        assert_eq!(coverage.glyphs(), &[GlyphId(1), GlyphId(2)]);
    }

    #[test]
    fn mixed_runs_pick_smaller() {
        // 6 glyphs in 2 runs: format 1 costs 16, format 2 costs 16.
        let coverage = Coverage::new(gids(&[1, 2, 3, 10, 11, 12]));
        assert_eq!(coverage.encode_len(), 16);

        // 8 glyphs in 2 runs: format 2 wins (16 < 20).
        let coverage = Coverage::new(gids(&[1, 2, 3, 4, 10, 11, 12, 13]));
        assert_eq!(coverage.encode_len(), 16);
        let mut w = Writer::new();
        coverage.encode(&mut w);
        assert_eq!(Coverage::parse(w.as_bytes()).unwrap(), coverage);
    }
}
