// https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, GlyphId, Result};

/// A [Horizontal Metrics Table](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx).
///
/// Stored as a run of `(advance, lsb)` pairs followed by bare left
/// side bearings; every glyph past the pairs inherits the last pair's
/// advance.
#[derive(Clone, PartialEq, Debug)]
pub struct Hmtx {
    metrics: Vec<(u16, i16)>,
    bearings: Vec<i16>,
}

impl Hmtx {
    /// Parses the table.
    ///
    /// `number_of_h_metrics > num_glyphs` is a documented quirk and is
    /// truncated to `num_glyphs`; a zero count is rejected.
    pub fn parse(data: &[u8], number_of_h_metrics: u16, num_glyphs: u16) -> Result<Self> {
        if number_of_h_metrics == 0 {
            return Err(Error::InvalidFont { subsystem: "hmtx", reason: "no metrics" });
        }

        let number_of_h_metrics = if number_of_h_metrics > num_glyphs {
            log::warn!(
                "hmtx: {} metrics for {} glyphs, truncating",
                number_of_h_metrics,
                num_glyphs
            );
            num_glyphs
        } else {
            number_of_h_metrics
        };

        let mut s = Stream::new(data, "hmtx");
        let mut metrics = Vec::with_capacity(usize::from(number_of_h_metrics));
        for _ in 0..number_of_h_metrics {
            let advance: u16 = s.read()?;
            let lsb: i16 = s.read()?;
            metrics.push((advance, lsb));
        }

        let bearings = s.read_vec::<i16>(usize::from(num_glyphs - number_of_h_metrics))?;

        Ok(Hmtx { metrics, bearings })
    }

    /// Builds a table from one `(advance, lsb)` pair per glyph,
    /// compressing identical trailing advances into bare bearings.
    pub fn from_metrics(mut all: Vec<(u16, i16)>) -> Self {
        let mut split = all.len();
        while split > 1 && all[split - 1].0 == all[split - 2].0 {
            split -= 1;
        }

        let bearings = all.split_off(split).into_iter().map(|(_, lsb)| lsb).collect();
        Hmtx { metrics: all, bearings }
    }

    /// The number of long `(advance, lsb)` records.
    #[inline]
    pub fn number_of_h_metrics(&self) -> u16 {
        self.metrics.len() as u16
    }

    /// The number of glyphs this table covers.
    #[inline]
    pub fn num_glyphs(&self) -> u16 {
        (self.metrics.len() + self.bearings.len()) as u16
    }

    /// The glyph's advance width.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        let index = usize::from(glyph_id.0);
        if index >= usize::from(self.num_glyphs()) {
            return None;
        }

        match self.metrics.get(index) {
            Some(&(advance, _)) => Some(advance),
            // Trailing glyphs inherit the last pair's advance.
            None => self.metrics.last().map(|&(advance, _)| advance),
        }
    }

    /// The glyph's left side bearing.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let index = usize::from(glyph_id.0);
        match self.metrics.get(index) {
            Some(&(_, lsb)) => Some(lsb),
            None => self.bearings.get(index - self.metrics.len()).copied(),
        }
    }

    /// All `(advance, lsb)` pairs, one per glyph.
    pub fn all_metrics(&self) -> Vec<(u16, i16)> {
        let last_advance = self.metrics.last().map_or(0, |&(advance, _)| advance);
        let mut all = self.metrics.clone();
        all.extend(self.bearings.iter().map(|&lsb| (last_advance, lsb)));
        all
    }

    /// The largest advance width in the table.
    pub fn advance_width_max(&self) -> u16 {
        self.metrics.iter().map(|&(advance, _)| advance).max().unwrap_or(0)
    }

    /// Serializes the table.
    pub fn encode(&self, w: &mut Writer) {
        for &(advance, lsb) in &self.metrics {
            w.write_u16(advance);
            w.write_i16(lsb);
        }

        for &lsb in &self.bearings {
            w.write_i16(lsb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_case() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
        ];

        let table = Hmtx::parse(data, 1, 1).unwrap();
        assert_eq!(table.advance(GlyphId(0)), Some(1));
        assert_eq!(table.side_bearing(GlyphId(0)), Some(2));
        assert_eq!(table.advance(GlyphId(1)), None);
    }

    #[test]
    fn trailing_bearings_inherit_advance() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
            0x00, 0x03, // side bearing [1]: 3
        ];

        let table = Hmtx::parse(data, 1, 2).unwrap();
        assert_eq!(table.advance(GlyphId(1)), Some(1));
        assert_eq!(table.side_bearing(GlyphId(1)), Some(3));
    }

    #[test]
    fn truncation_quirk() {
        let data = &[
            0x00, 0x01, 0x00, 0x02, // glyph 0
            0x00, 0x03, 0x00, 0x04, // ignored: more metrics than glyphs
        ];

        let table = Hmtx::parse(data, 2, 1).unwrap();
        assert_eq!(table.number_of_h_metrics(), 1);
        assert_eq!(table.advance(GlyphId(0)), Some(1));
        assert_eq!(table.advance(GlyphId(1)), None);
    }

    #[test]
    fn zero_metrics_rejected() {
        assert!(Hmtx::parse(&[], 0, 1).is_err());
    }

    #[test]
    fn compression() {
        let table = Hmtx::from_metrics(vec![(10, 1), (20, 2), (20, 3), (20, 4)]);
        assert_eq!(table.number_of_h_metrics(), 2);
        assert_eq!(table.num_glyphs(), 4);
        assert_eq!(table.advance(GlyphId(3)), Some(20));
        assert_eq!(table.side_bearing(GlyphId(3)), Some(4));

        let mut w = Writer::new();
        table.encode(&mut w);
        assert_eq!(
            w.as_bytes(),
            &[
                0x00, 0x0A, 0x00, 0x01, // long metric 0
                0x00, 0x14, 0x00, 0x02, // long metric 1
                0x00, 0x03, // bearing
                0x00, 0x04, // bearing
            ]
        );
    }

    #[test]
    fn round_trip() {
        let table = Hmtx::from_metrics(vec![(5, -1), (6, 0), (6, 2)]);
        let mut w = Writer::new();
        table.encode(&mut w);
        let parsed = Hmtx::parse(w.as_bytes(), table.number_of_h_metrics(), 3).unwrap();
        assert_eq!(parsed, table);
    }
}
