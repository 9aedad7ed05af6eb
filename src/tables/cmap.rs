// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap

use core::convert::TryFrom;

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, GlyphId, Result};

// Caps the sum of all segment lengths in a format 4 subtable.
// Pathological fonts can claim the whole u16 range per segment.
const MAX_MAPPINGS: u32 = 70_000;

/// An encoding record: a platform/encoding pair plus its subtable.
#[derive(Clone, PartialEq, Debug)]
pub struct EncodingRecord {
    /// Platform ID.
    pub platform_id: u16,
    /// Platform-specific encoding ID.
    pub encoding_id: u16,
    /// The record's subtable.
    pub subtable: Subtable,
}

/// A character-to-glyph subtable.
///
/// Formats 0, 4, 6 and 12 are decoded; anything else is carried as an
/// opaque blob so the table re-emits losslessly.
#[derive(Clone, PartialEq, Debug)]
pub enum Subtable {
    /// Byte encoding table.
    Format0 {
        /// Language field, Macintosh-specific.
        language: u16,
        /// One glyph per byte code. Always 256 entries.
        glyph_ids: Vec<u8>,
    },
    /// Segment mapping to delta values, decoded to plain pairs.
    Format4 {
        /// Language field, Macintosh-specific.
        language: u16,
        /// `(code, glyph)` pairs sorted by code; zero glyphs omitted.
        mappings: Vec<(u16, GlyphId)>,
    },
    /// Trimmed table mapping.
    Format6 {
        /// Language field, Macintosh-specific.
        language: u16,
        /// First covered character code.
        first_code: u16,
        /// Consecutive glyphs starting at `first_code`.
        glyph_ids: Vec<GlyphId>,
    },
    /// Segmented coverage of the full Unicode range.
    Format12 {
        /// Language field, Macintosh-specific.
        language: u32,
        /// `(start_code, end_code, start_glyph)` groups, ascending.
        groups: Vec<(u32, u32, u32)>,
    },
    /// A well-formed but undecoded subtable (formats 2, 8, 10, 13, 14).
    Raw {
        /// The subtable's format number.
        format: u16,
        /// The whole subtable, including the format field.
        data: Vec<u8>,
    },
}

impl Subtable {
    fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap");
        let format: u16 = s.read()?;
        match format {
            0 => Self::parse_format0(data),
            4 => Self::parse_format4(data),
            6 => Self::parse_format6(data),
            12 => Self::parse_format12(data),
            2 | 8 | 10 | 13 | 14 => Ok(Subtable::Raw { format, data: data.to_vec() }),
            _ => Err(Error::InvalidFont { subsystem: "cmap", reason: "unknown subtable format" }),
        }
    }

    fn parse_format0(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap/0");
        s.skip::<u16>()?; // format
        let length: u16 = s.read()?;
        if usize::from(length) < 262 {
            return Err(Error::InvalidFont { subsystem: "cmap/0", reason: "truncated subtable" });
        }

        let language: u16 = s.read()?;
        let glyph_ids = s.read_bytes(256)?.to_vec();
        Ok(Subtable::Format0 { language, glyph_ids })
    }

    fn parse_format4(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap/4");
        s.skip::<u16>()?; // format
        s.skip::<u16>()?; // length; real fonts lie about it, so it's not trusted
        let language: u16 = s.read()?;
        let seg_count_x2: u16 = s.read()?;
        if seg_count_x2 % 2 != 0 {
            return Err(Error::InvalidFont { subsystem: "cmap/4", reason: "odd segCountX2" });
        }

        let seg_count = usize::from(seg_count_x2 / 2);
        if seg_count == 0 {
            return Err(Error::InvalidFont { subsystem: "cmap/4", reason: "no segments" });
        }

        s.advance(6)?; // searchRange + entrySelector + rangeShift

        let end_codes = s.read_vec::<u16>(seg_count)?;
        s.skip::<u16>()?; // reservedPad
        let start_codes = s.read_vec::<u16>(seg_count)?;
        let id_deltas = s.read_vec::<i16>(seg_count)?;
        let id_range_offset_pos = s.offset();
        let id_range_offsets = s.read_vec::<u16>(seg_count)?;

        let mut total: u32 = 0;
        let mut mappings = Vec::new();
        for k in 0..seg_count {
            let start = start_codes[k];
            let end = end_codes[k];
            if end < start {
                return Err(Error::InvalidFont { subsystem: "cmap/4", reason: "unsorted segment" });
            }

            total += u32::from(end - start) + 1;
            if total > MAX_MAPPINGS {
                return Err(Error::InvalidFont { subsystem: "cmap/4", reason: "too many mappings" });
            }

            for code in start..=end {
                let glyph = if id_range_offsets[k] == 0 {
                    code.wrapping_add(id_deltas[k] as u16)
                } else {
                    // The offset is relative to the idRangeOffset entry
                    // itself, in bytes.
                    let entry_pos = id_range_offset_pos + k * 2;
                    let pos = entry_pos
                        .wrapping_add(usize::from(id_range_offsets[k]))
                        .wrapping_add(usize::from(code - start) * 2);
                    let raw: u16 = Stream::read_at(data, pos, "cmap/4")?;
                    if raw == 0 {
                        continue;
                    }
                    raw.wrapping_add(id_deltas[k] as u16)
                };

                if glyph != 0 && code != 0xFFFF {
                    mappings.push((code, GlyphId(glyph)));
                }

                if code == u16::MAX {
                    break;
                }
            }
        }

        Ok(Subtable::Format4 { language, mappings })
    }

    fn parse_format6(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap/6");
        s.skip::<u16>()?; // format
        s.skip::<u16>()?; // length
        let language: u16 = s.read()?;
        let first_code: u16 = s.read()?;
        let glyph_ids = s.read_vec16::<GlyphId>()?;
        Ok(Subtable::Format6 { language, first_code, glyph_ids })
    }

    fn parse_format12(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap/12");
        s.skip::<u16>()?; // format
        s.skip::<u16>()?; // reserved
        s.skip::<u32>()?; // length
        let language: u32 = s.read()?;
        let num_groups: u32 = s.read()?;

        let mut groups = Vec::with_capacity(num_groups.min(1 << 16) as usize);
        let mut prev_end: Option<u32> = None;
        for _ in 0..num_groups {
            let start: u32 = s.read()?;
            let end: u32 = s.read()?;
            let start_glyph: u32 = s.read()?;

            if end < start {
                return Err(Error::InvalidFont { subsystem: "cmap/12", reason: "unsorted group" });
            }

            if end > 0x10_FFFF {
                return Err(Error::InvalidFont {
                    subsystem: "cmap/12",
                    reason: "group past the Unicode range",
                });
            }

            if let Some(prev) = prev_end {
                if start <= prev {
                    return Err(Error::InvalidFont {
                        subsystem: "cmap/12",
                        reason: "overlapping groups",
                    });
                }
            }

            prev_end = Some(end);
            groups.push((start, end, start_glyph));
        }

        Ok(Subtable::Format12 { language, groups })
    }

    /// Maps a character to a glyph.
    pub fn glyph_index(&self, code: u32) -> Option<GlyphId> {
        match self {
            Subtable::Format0 { glyph_ids, .. } => {
                let glyph = *glyph_ids.get(usize::try_from(code).ok()?)?;
                if glyph != 0 {
                    Some(GlyphId(u16::from(glyph)))
                } else {
                    None
                }
            }
            Subtable::Format4 { mappings, .. } => {
                let code = u16::try_from(code).ok()?;
                mappings
                    .binary_search_by_key(&code, |&(c, _)| c)
                    .ok()
                    .map(|index| mappings[index].1)
            }
            Subtable::Format6 { first_code, glyph_ids, .. } => {
                let index = code.checked_sub(u32::from(*first_code))?;
                let glyph = *glyph_ids.get(usize::try_from(index).ok()?)?;
                if glyph.0 != 0 {
                    Some(glyph)
                } else {
                    None
                }
            }
            Subtable::Format12 { groups, .. } => {
                let index = groups
                    .binary_search_by(|&(start, end, _)| {
                        if code < start {
                            core::cmp::Ordering::Greater
                        } else if code > end {
                            core::cmp::Ordering::Less
                        } else {
                            core::cmp::Ordering::Equal
                        }
                    })
                    .ok()?;
                let (start, _, start_glyph) = groups[index];
                let glyph = start_glyph.checked_add(code - start)?;
                u16::try_from(glyph).ok().map(GlyphId).filter(|g| g.0 != 0)
            }
            Subtable::Raw { .. } => None,
        }
    }

    /// Calls `f` for every `(code, glyph)` pair in the subtable.
    pub fn mappings(&self, mut f: impl FnMut(u32, GlyphId)) {
        match self {
            Subtable::Format0 { glyph_ids, .. } => {
                for (code, &glyph) in glyph_ids.iter().enumerate() {
                    if glyph != 0 {
                        f(code as u32, GlyphId(u16::from(glyph)));
                    }
                }
            }
            Subtable::Format4 { mappings, .. } => {
                for &(code, glyph) in mappings {
                    f(u32::from(code), glyph);
                }
            }
            Subtable::Format6 { first_code, glyph_ids, .. } => {
                for (index, &glyph) in glyph_ids.iter().enumerate() {
                    if glyph.0 != 0 {
                        f(u32::from(*first_code) + index as u32, glyph);
                    }
                }
            }
            Subtable::Format12 { groups, .. } => {
                for &(start, end, start_glyph) in groups {
                    for code in start..=end {
                        if let Ok(glyph) = u16::try_from(start_glyph + (code - start)) {
                            if glyph != 0 {
                                f(code, GlyphId(glyph));
                            }
                        }
                    }
                }
            }
            Subtable::Raw { .. } => {}
        }
    }

    /// Serializes the subtable.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Subtable::Format0 { language, glyph_ids } => {
                let mut w = Writer::with_capacity(262);
                w.write_u16(0);
                w.write_u16(262);
                w.write_u16(*language);
                w.write_bytes(glyph_ids);
                Ok(w.into_bytes())
            }
            Subtable::Format4 { language, mappings } => encode_format4(*language, mappings),
            Subtable::Format6 { language, first_code, glyph_ids } => {
                let mut w = Writer::new();
                w.write_u16(6);
                w.write_u16(10 + 2 * glyph_ids.len() as u16);
                w.write_u16(*language);
                w.write_u16(*first_code);
                w.write_u16(glyph_ids.len() as u16);
                for glyph in glyph_ids {
                    w.write_glyph(*glyph);
                }
                Ok(w.into_bytes())
            }
            Subtable::Format12 { language, groups } => {
                let mut w = Writer::new();
                w.write_u16(12);
                w.write_u16(0);
                w.write_u32(16 + 12 * groups.len() as u32);
                w.write_u32(*language);
                w.write_u32(groups.len() as u32);
                for &(start, end, start_glyph) in groups {
                    w.write_u32(start);
                    w.write_u32(end);
                    w.write_u32(start_glyph);
                }
                Ok(w.into_bytes())
            }
            Subtable::Raw { data, .. } => Ok(data.clone()),
        }
    }
}

/// A [Character to Glyph Index Mapping Table](
/// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap).
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Cmap {
    /// All encoding records, sorted by (platform, encoding).
    pub records: Vec<EncodingRecord>,
}

// The preference order of §select_cmap: full Unicode first, then BMP,
// then legacy Mac Roman.
const PREFERENCE: &[(u16, u16)] = &[(3, 10), (0, 4), (3, 1), (0, 3), (1, 0)];

impl Cmap {
    /// Parses the table.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "cmap");
        let version: u16 = s.read()?;
        if version != 0 {
            return Err(Error::NotSupported { subsystem: "cmap", feature: "table version" });
        }

        let count: u16 = s.read()?;
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let platform_id: u16 = s.read()?;
            let encoding_id: u16 = s.read()?;
            let offset: u32 = s.read()?;

            let subtable_data = data
                .get(offset as usize..)
                .ok_or(Error::UnexpectedEof { subsystem: "cmap", offset: offset as usize })?;
            let subtable = Subtable::parse(subtable_data)?;
            records.push(EncodingRecord { platform_id, encoding_id, subtable });
        }

        records.sort_by_key(|r| (r.platform_id, r.encoding_id));
        Ok(Cmap { records })
    }

    /// Walks the candidate list and returns the first subtable that
    /// decoded successfully.
    pub fn best_subtable(&self) -> Option<&Subtable> {
        for &(platform_id, encoding_id) in PREFERENCE {
            let found = self
                .records
                .iter()
                .find(|r| r.platform_id == platform_id && r.encoding_id == encoding_id);
            if let Some(record) = found {
                if !matches!(record.subtable, Subtable::Raw { .. }) {
                    return Some(&record.subtable);
                }
            }
        }

        None
    }

    /// Maps a character to a glyph through the best subtable.
    pub fn glyph_index(&self, code: u32) -> Option<GlyphId> {
        self.best_subtable()?.glyph_index(code)
    }

    /// Serializes the table. Identical subtables are stored once.
    pub fn encode(&self, w: &mut Writer) -> Result<()> {
        let mut records: Vec<&EncodingRecord> = self.records.iter().collect();
        records.sort_by_key(|r| (r.platform_id, r.encoding_id));

        let mut bodies: Vec<Vec<u8>> = Vec::new();
        let mut body_index = Vec::with_capacity(records.len());
        for record in &records {
            let body = record.subtable.encode()?;
            match bodies.iter().position(|b| *b == body) {
                Some(at) => body_index.push(at),
                None => {
                    bodies.push(body);
                    body_index.push(bodies.len() - 1);
                }
            }
        }

        let header_len = 4 + 8 * records.len() as u32;
        let mut offsets = Vec::with_capacity(bodies.len());
        let mut at = header_len;
        for body in &bodies {
            offsets.push(at);
            at += body.len() as u32;
        }

        w.write_u16(0); // version
        w.write_u16(records.len() as u16);
        for (record, index) in records.iter().zip(&body_index) {
            w.write_u16(record.platform_id);
            w.write_u16(record.encoding_id);
            w.write_u32(offsets[*index]);
        }

        for body in &bodies {
            w.write_bytes(body);
        }

        Ok(())
    }

    /// Builds a single-record `(1, 0)` table with a format 4 subtable,
    /// the shape emitted for subsetted fonts.
    pub fn from_mappings(mappings: &[(u32, GlyphId)]) -> Result<Self> {
        let mut pairs = Vec::with_capacity(mappings.len());
        for &(code, glyph) in mappings {
            let code = u16::try_from(code).map_err(|_| Error::ValueOutOfRange {
                subsystem: "cmap/4",
                what: "codepoint beyond the BMP",
            })?;
            if code == 0xFFFF {
                return Err(Error::ValueOutOfRange {
                    subsystem: "cmap/4",
                    what: "codepoint 0xFFFF",
                });
            }
            pairs.push((code, glyph));
        }

        pairs.sort();
        Ok(Cmap {
            records: vec![EncodingRecord {
                platform_id: 1,
                encoding_id: 0,
                subtable: Subtable::Format4 { language: 0, mappings: pairs },
            }],
        })
    }
}

// Legacy encodings switch code width at these points; runs are broken
// there so converted fonts keep their original segment boundaries.
const LEGACY_BREAKS: &[u16] = &[0x80, 0x0800];

/// One maximal arithmetic progression: consecutive codes whose glyphs
/// grow by one.
struct Cell {
    start: usize, // index into the mappings slice
    len: usize,
}

fn encode_format4(language: u16, mappings: &[(u16, GlyphId)]) -> Result<Vec<u8>> {
    for pair in mappings.windows(2) {
        if pair[1].0 <= pair[0].0 {
            return Err(Error::ValueOutOfRange {
                subsystem: "cmap/4",
                what: "unsorted or duplicate codepoints",
            });
        }
    }

    if mappings.last().map_or(false, |&(code, _)| code == 0xFFFF) {
        return Err(Error::ValueOutOfRange { subsystem: "cmap/4", what: "codepoint 0xFFFF" });
    }

    // Split into contiguous codepoint runs, then into constant-delta
    // cells inside each run. A run also breaks at the legacy
    // single/double-byte boundaries.
    let mut segments: Vec<(usize, usize, bool)> = Vec::new(); // (start, len, as_array)
    let mut run_start = 0;
    for i in 0..mappings.len() {
        let is_last = i + 1 == mappings.len();
        let breaks_here = is_last
            || mappings[i + 1].0 != mappings[i].0 + 1
            || LEGACY_BREAKS.contains(&mappings[i + 1].0);
        if breaks_here {
            segment_run(&mappings[run_start..=i], run_start, &mut segments);
            run_start = i + 1;
        }
    }

    let seg_count = segments.len() + 1; // plus the terminal 0xFFFF segment
    let mut glyph_id_array: Vec<u16> = Vec::new();

    let mut end_codes = Writer::new();
    let mut start_codes = Writer::new();
    let mut id_deltas = Writer::new();
    let mut id_range_offsets = Writer::new();

    for (index, &(start, len, as_array)) in segments.iter().enumerate() {
        let first = mappings[start];
        let last = mappings[start + len - 1];
        start_codes.write_u16(first.0);
        end_codes.write_u16(last.0);
        if as_array {
            // Offset from this idRangeOffset entry to the first array
            // element, in bytes.
            let remaining = seg_count - index;
            let offset = 2 * (remaining + glyph_id_array.len());
            id_deltas.write_i16(0);
            id_range_offsets.write_u16(offset as u16);
            glyph_id_array.extend(mappings[start..start + len].iter().map(|&(_, g)| g.0));
        } else {
            id_deltas.write_i16(first.1 .0.wrapping_sub(first.0) as i16);
            id_range_offsets.write_u16(0);
        }
    }

    // The terminal segment, mapping 0xFFFF to glyph 0 via delta 1.
    end_codes.write_u16(0xFFFF);
    start_codes.write_u16(0xFFFF);
    id_deltas.write_i16(1);
    id_range_offsets.write_u16(0);

    let length = 16 + 8 * seg_count + 2 * glyph_id_array.len();
    let mut w = Writer::with_capacity(length);
    w.write_u16(4);
    w.write_u16(u16::try_from(length).map_err(|_| Error::ValueOutOfRange {
        subsystem: "cmap/4",
        what: "subtable length",
    })?);
    w.write_u16(language);
    w.write_u16(2 * seg_count as u16);

    let mut search_range = 2u16;
    let mut entry_selector = 0u16;
    while usize::from(search_range) * 2 <= seg_count * 2 {
        search_range *= 2;
        entry_selector += 1;
    }
    w.write_u16(search_range);
    w.write_u16(entry_selector);
    w.write_u16(2 * seg_count as u16 - search_range);

    w.write_bytes(end_codes.as_bytes());
    w.write_u16(0); // reservedPad
    w.write_bytes(start_codes.as_bytes());
    w.write_bytes(id_deltas.as_bytes());
    w.write_bytes(id_range_offsets.as_bytes());
    for glyph in glyph_id_array {
        w.write_u16(glyph);
    }

    Ok(w.into_bytes())
}

/// Finds the cheapest segmentation of one contiguous run.
///
/// Cells are maximal constant-delta progressions. A cell alone becomes
/// a delta segment (8 bytes); adjacent cells can merge into one
/// GlyphIDArray segment (8 bytes + 2 per mapping), which wins only
/// while the merged cells stay short.
fn segment_run(run: &[(u16, GlyphId)], base: usize, out: &mut Vec<(usize, usize, bool)>) {
    let mut cells: Vec<Cell> = Vec::new();
    for i in 0..run.len() {
        let extends = i > 0 && {
            let prev = run[i - 1];
            run[i].1 .0.wrapping_sub(run[i].0) == prev.1 .0.wrapping_sub(prev.0)
        };
        if extends {
            if let Some(cell) = cells.last_mut() {
                cell.len += 1;
            }
        } else {
            cells.push(Cell { start: i, len: 1 });
        }
    }

    // DP over cells: best[i] covers cells[..i]; each step appends
    // either one delta segment or an array segment over a suffix of
    // cells. Ties prefer fewer segments.
    let n = cells.len();
    let mut best: Vec<(usize, usize, usize, bool)> = Vec::with_capacity(n + 1);
    best.push((0, 0, 0, false)); // (cost, segments, split, as_array)
    for i in 1..=n {
        let mut choice = (best[i - 1].0 + 8, best[i - 1].1 + 1, i - 1, false);
        let mut total_len = 0;
        for j in (0..i).rev() {
            total_len += cells[j].len;
            if j + 1 == i {
                continue; // a one-cell array never beats a delta
            }
            let candidate_cost = best[j].0 + 8 + 2 * total_len;
            let candidate = (candidate_cost, best[j].1 + 1, j, true);
            if candidate.0 < choice.0 || (candidate.0 == choice.0 && candidate.1 < choice.1) {
                choice = candidate;
            }
        }
        best.push(choice);
    }

    // Reconstruct in order.
    let mut splits = Vec::new();
    let mut i = n;
    while i > 0 {
        let (_, _, j, as_array) = best[i];
        splits.push((j, i, as_array));
        i = j;
    }
    splits.reverse();

    for (j, i, as_array) in splits {
        let start = base + cells[j].start;
        let len: usize = cells[j..i].iter().map(|c| c.len).sum();
        out.push((start, len, as_array));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format4_decode_delta_segment() {
        let data = &[
            0x00, 0x04, // format: 4
            0x00, 0x20, // subtable size: 32
            0x00, 0x00, // language ID: 0
            0x00, 0x04, // 2 x segCount: 4
            0x00, 0x02, // search range: 2
            0x00, 0x00, // entry selector: 0
            0x00, 0x02, // range shift: 2
            // End character codes
            0x00, 0x49, // char code [0]: 73
            0xFF, 0xFF, // char code [1]: 65535
            0x00, 0x00, // reserved: 0
            // Start character codes
            0x00, 0x41, // char code [0]: 65
            0xFF, 0xFF, // char code [1]: 65535
            // Deltas
            0xFF, 0xC0, // delta [0]: -64
            0x00, 0x01, // delta [1]: 1
            // Offsets into Glyph index array
            0x00, 0x00, // offset [0]: 0
            0x00, 0x00, // offset [1]: 0
        ];

        let subtable = Subtable::parse(data).unwrap();
        assert_eq!(subtable.glyph_index(0x40), None);
        assert_eq!(subtable.glyph_index(0x41), Some(GlyphId(1)));
        assert_eq!(subtable.glyph_index(0x49), Some(GlyphId(9)));
        assert_eq!(subtable.glyph_index(0x4A), None);
    }

    #[test]
    fn format4_decode_glyph_id_array() {
        let data = &[
            0x00, 0x04, // format: 4
            0x00, 0x2A, // subtable size: 42
            0x00, 0x00, // language ID: 0
            0x00, 0x04, // 2 x segCount: 4
            0x00, 0x02, // search range: 2
            0x00, 0x00, // entry selector: 0
            0x00, 0x02, // range shift: 2
            // End character codes
            0x00, 0x45, // char code [0]: 69
            0xFF, 0xFF, // char code [1]: 65535
            0x00, 0x00, // reserved: 0
            // Start character codes
            0x00, 0x41, // char code [0]: 65
            0xFF, 0xFF, // char code [1]: 65535
            // Deltas
            0x00, 0x00, // delta [0]: 0
            0x00, 0x01, // delta [1]: 1
            // Offsets into Glyph index array
            0x00, 0x04, // offset [0]: 4
            0x00, 0x00, // offset [1]: 0
            // Glyph index array
            0x00, 0x01, // glyph ID [0]: 1
            0x00, 0x0A, // glyph ID [1]: 10
            0x00, 0x64, // glyph ID [2]: 100
            0x03, 0xE8, // glyph ID [3]: 1000
            0x27, 0x10, // glyph ID [4]: 10000
        ];

        let subtable = Subtable::parse(data).unwrap();
        assert_eq!(subtable.glyph_index(0x41), Some(GlyphId(1)));
        assert_eq!(subtable.glyph_index(0x42), Some(GlyphId(10)));
        assert_eq!(subtable.glyph_index(0x45), Some(GlyphId(10000)));
    }

    #[test]
    fn format4_rejects_odd_seg_count() {
        let data = &[
            0x00, 0x04, 0x00, 0x10, 0x00, 0x00, //
            0x00, 0x03, // 2 x segCount: 3, odd
            0x00, 0x02, 0x00, 0x00, 0x00, 0x02,
        ];
        assert!(Subtable::parse(data).is_err());
    }

    #[test]
    fn format4_rejects_unsorted_segment() {
        let data = &[
            0x00, 0x04, 0x00, 0x20, 0x00, 0x00, //
            0x00, 0x02, // 2 x segCount: 2
            0x00, 0x02, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x41, // end: 65
            0x00, 0x00, // reserved
            0x00, 0x45, // start: 69 > end
            0x00, 0x00, // delta
            0x00, 0x00, // offset
        ];
        assert!(Subtable::parse(data).is_err());
    }

    #[test]
    fn format12_validations() {
        let mut w = Writer::new();
        w.write_u16(12);
        w.write_u16(0);
        w.write_u32(16 + 24);
        w.write_u32(0);
        w.write_u32(2);
        // Overlapping groups.
        w.write_u32(10);
        w.write_u32(20);
        w.write_u32(1);
        w.write_u32(15);
        w.write_u32(30);
        w.write_u32(11);
        assert!(Subtable::parse(w.as_bytes()).is_err());
    }

    #[test]
    fn format12_lookup() {
        let table = Subtable::Format12 {
            language: 0,
            groups: vec![(0x1F600, 0x1F64F, 100), (0x2_0000, 0x2_0001, 500)],
        };
        assert_eq!(table.glyph_index(0x1F600), Some(GlyphId(100)));
        assert_eq!(table.glyph_index(0x1F64F), Some(GlyphId(179)));
        assert_eq!(table.glyph_index(0x2_0001), Some(GlyphId(501)));
        assert_eq!(table.glyph_index(0x41), None);

        let bytes = table.encode().unwrap();
        assert_eq!(Subtable::parse(&bytes).unwrap(), table);
    }

    fn encode_pairs(pairs: &[(u16, u16)]) -> Subtable {
        let mappings = pairs.iter().map(|&(c, g)| (c, GlyphId(g))).collect();
        let table = Subtable::Format4 { language: 0, mappings };
        Subtable::parse(&table.encode().unwrap()).unwrap()
    }

    #[test]
    fn format4_encoder_lookups() {
        // The scattered mapping from the writer scenario.
        let pairs =
            [(32, 1), (65, 2), (66, 3), (67, 4), (68, 5), (70, 6), (71, 7), (90, 8), (92, 9)];
        let decoded = encode_pairs(&pairs);
        for &(code, glyph) in &pairs {
            assert_eq!(decoded.glyph_index(u32::from(code)), Some(GlyphId(glyph)), "{}", code);
        }
        assert_eq!(decoded.glyph_index(91), None);
        assert_eq!(decoded.glyph_index(0xFFFF), None);
    }

    #[test]
    fn format4_encoder_round_trip() {
        let mappings: Vec<(u16, GlyphId)> =
            vec![(65, GlyphId(1)), (66, GlyphId(2)), (67, GlyphId(3))];
        let table = Subtable::Format4 { language: 0, mappings: mappings.clone() };
        let decoded = Subtable::parse(&table.encode().unwrap()).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn format4_encoder_prefers_array_for_scattered_gids() {
        // Three one-long progressions merge into one array segment:
        // 8 + 2*3 = 14 bytes beats 3 deltas at 24 bytes.
        let pairs = [(65u16, 7u16), (66, 3), (67, 11)];
        let encoded = Subtable::Format4 {
            language: 0,
            mappings: pairs.iter().map(|&(c, g)| (c, GlyphId(g))).collect(),
        }
        .encode()
        .unwrap();
        // 2 segments (array + terminal): 16 + 8*2 + 2*3 = 38 bytes.
        assert_eq!(encoded.len(), 38);

        let decoded = Subtable::parse(&encoded).unwrap();
        for &(code, glyph) in &pairs {
            assert_eq!(decoded.glyph_index(u32::from(code)), Some(GlyphId(glyph)));
        }
    }

    #[test]
    fn format4_encoder_keeps_long_progressions_as_deltas() {
        // Two long progressions: deltas win over one big array.
        let mut pairs = Vec::new();
        for i in 0..10u16 {
            pairs.push((100 + i, GlyphId(1 + i)));
        }
        for i in 0..10u16 {
            pairs.push((110 + i, GlyphId(500 + i)));
        }
        let encoded = Subtable::Format4 { language: 0, mappings: pairs }.encode().unwrap();
        // 3 segments (2 deltas + terminal), no glyph array.
        assert_eq!(encoded.len(), 16 + 8 * 3);
    }

    #[test]
    fn format4_legacy_break_at_0x80() {
        // One progression crossing 0x80 must split into two segments.
        let pairs: Vec<(u16, GlyphId)> = (0x7E..=0x81).map(|c| (c, GlyphId(c))).collect();
        let encoded = Subtable::Format4 { language: 0, mappings: pairs.clone() }.encode().unwrap();
        assert_eq!(encoded.len(), 16 + 8 * 3); // two deltas + terminal

        let decoded = Subtable::parse(&encoded).unwrap();
        assert_eq!(decoded, Subtable::Format4 { language: 0, mappings: pairs });
    }

    #[test]
    fn cmap_selection_order() {
        let unicode = Subtable::Format4 { language: 0, mappings: vec![(65, GlyphId(1))] };
        let mac = Subtable::Format0 { language: 0, glyph_ids: vec![0; 256] };
        let cmap = Cmap {
            records: vec![
                EncodingRecord { platform_id: 1, encoding_id: 0, subtable: mac },
                EncodingRecord { platform_id: 3, encoding_id: 1, subtable: unicode.clone() },
            ],
        };
        assert_eq!(cmap.best_subtable(), Some(&unicode));
        assert_eq!(cmap.glyph_index(65), Some(GlyphId(1)));
    }

    #[test]
    fn cmap_table_round_trip() {
        let cmap = Cmap::from_mappings(&[(65, GlyphId(1)), (66, GlyphId(2))]).unwrap();
        let mut w = Writer::new();
        cmap.encode(&mut w).unwrap();
        let parsed = Cmap::parse(w.as_bytes()).unwrap();
        assert_eq!(parsed, cmap);
    }

    #[test]
    fn shared_subtable_bodies() {
        let subtable = Subtable::Format4 { language: 0, mappings: vec![(65, GlyphId(1))] };
        let cmap = Cmap {
            records: vec![
                EncodingRecord { platform_id: 0, encoding_id: 3, subtable: subtable.clone() },
                EncodingRecord { platform_id: 3, encoding_id: 1, subtable },
            ],
        };
        let mut w = Writer::new();
        cmap.encode(&mut w).unwrap();
        // Two records, one body.
        let body_len = 16 + 8 * 2;
        assert_eq!(w.len(), 4 + 8 * 2 + body_len);
    }
}
