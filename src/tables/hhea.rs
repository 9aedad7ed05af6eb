// https://docs.microsoft.com/en-us/typography/opentype/spec/hhea

use core::f64::consts::FRAC_PI_2;

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, Result};

/// A [Horizontal Header Table](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hhea {
    /// Typographic ascent in design units.
    pub ascender: i16,
    /// Typographic descent. Negative below the baseline.
    pub descender: i16,
    /// Extra interline spacing.
    pub line_gap: i16,
    /// Maximum advance width over all `hmtx` entries.
    pub advance_width_max: u16,
    /// Minimum left side bearing over glyphs with contours.
    pub min_left_side_bearing: i16,
    /// Minimum right side bearing over glyphs with contours.
    pub min_right_side_bearing: i16,
    /// Maximum of `lsb + (xMax - xMin)`.
    pub x_max_extent: i16,
    /// Caret slope rise. `(1, 0)` means a vertical caret.
    pub caret_slope_rise: i16,
    /// Caret slope run.
    pub caret_slope_run: i16,
    /// Caret shift for non-slanted glyphs. 0 for non-slanted fonts.
    pub caret_offset: i16,
    /// The number of advance/lsb pairs at the front of `hmtx`.
    pub number_of_h_metrics: u16,
}

impl Hhea {
    /// Parses the table.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "hhea");
        let major_version: u16 = s.read()?;
        let minor_version: u16 = s.read()?;
        if major_version != 1 || minor_version != 0 {
            return Err(Error::NotSupported { subsystem: "hhea", feature: "table version" });
        }

        let ascender: i16 = s.read()?;
        let descender: i16 = s.read()?;
        let line_gap: i16 = s.read()?;
        let advance_width_max: u16 = s.read()?;
        let min_left_side_bearing: i16 = s.read()?;
        let min_right_side_bearing: i16 = s.read()?;
        let x_max_extent: i16 = s.read()?;
        let caret_slope_rise: i16 = s.read()?;
        let caret_slope_run: i16 = s.read()?;
        let caret_offset: i16 = s.read()?;
        s.advance(8)?; // 4 reserved i16
        if s.read::<i16>()? != 0 {
            return Err(Error::NotSupported { subsystem: "hhea", feature: "metric data format" });
        }

        let number_of_h_metrics: u16 = s.read()?;

        Ok(Hhea {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            number_of_h_metrics,
        })
    }

    /// Serializes the table. 36 bytes.
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(1); // majorVersion
        w.write_u16(0); // minorVersion
        w.write_i16(self.ascender);
        w.write_i16(self.descender);
        w.write_i16(self.line_gap);
        w.write_u16(self.advance_width_max);
        w.write_i16(self.min_left_side_bearing);
        w.write_i16(self.min_right_side_bearing);
        w.write_i16(self.x_max_extent);
        w.write_i16(self.caret_slope_rise);
        w.write_i16(self.caret_slope_run);
        w.write_i16(self.caret_offset);
        w.write_i16(0);
        w.write_i16(0);
        w.write_i16(0);
        w.write_i16(0);
        w.write_i16(0); // metricDataFormat
        w.write_u16(self.number_of_h_metrics);
    }

    /// The caret angle in radians. 0 is upright, negative slants forward.
    pub fn caret_angle(&self) -> f64 {
        caret_to_angle(self.caret_slope_rise, self.caret_slope_run)
    }

    /// Replaces the caret slope with the best rational approximation
    /// of `angle`.
    pub fn set_caret_angle(&mut self, angle: f64) {
        let (rise, run) = caret_from_angle(angle);
        self.caret_slope_rise = rise;
        self.caret_slope_run = run;
    }
}

/// Converts a caret `(rise, run)` slope into an angle in radians.
///
/// 0 is an upright caret; negative angles slant forward like italics.
pub fn caret_to_angle(rise: i16, run: i16) -> f64 {
    if run == 0 {
        // Vertical caret, including the degenerate (0, 0).
        return 0.0;
    }

    // Widening first keeps the -32768 sentinel from overflowing.
    f64::from(rise).atan2(f64::from(run)) - FRAC_PI_2
}

/// Converts an angle in radians into the best caret `(rise, run)`
/// approximation with `|rise|, run <= 32767`.
///
/// Every denominator is tried and the minimum-distance fraction wins,
/// so the result is within `0.5 / 32767` of the requested slope.
pub fn caret_from_angle(angle: f64) -> (i16, i16) {
    let slope = {
        let t = angle + FRAC_PI_2;
        if t.cos().abs() < 1e-12 {
            return (1, 0);
        }
        t.tan()
    };

    if slope.abs() >= 32767.0 {
        return (1, 0);
    }

    let mut best = (0i16, 1i16);
    let mut best_dist = f64::INFINITY;
    for run in 1..=32767i32 {
        let rise = (slope * f64::from(run)).round();
        if rise.abs() > 32767.0 {
            break;
        }

        let dist = (slope - rise / f64::from(run)).abs();
        if dist < best_dist {
            best_dist = dist;
            best = (rise as i16, run as i16);
        }

        if dist == 0.0 {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]); // version 1.0
        data.extend_from_slice(&[0x03, 0x20]); // ascender: 800
        data.extend_from_slice(&[0xFF, 0x38]); // descender: -200
        data.extend_from_slice(&[0x00, 0x64]); // lineGap: 100
        data.extend_from_slice(&[0x04, 0x00]); // advanceWidthMax: 1024
        data.extend_from_slice(&[0xFF, 0xF6]); // minLeftSideBearing: -10
        data.extend_from_slice(&[0x00, 0x05]); // minRightSideBearing: 5
        data.extend_from_slice(&[0x04, 0x00]); // xMaxExtent
        data.extend_from_slice(&[0x00, 0x01]); // caretSlopeRise: 1
        data.extend_from_slice(&[0x00, 0x00]); // caretSlopeRun: 0
        data.extend_from_slice(&[0x00, 0x00]); // caretOffset
        data.extend_from_slice(&[0u8; 8]); // reserved
        data.extend_from_slice(&[0x00, 0x00]); // metricDataFormat
        data.extend_from_slice(&[0x00, 0x03]); // numberOfHMetrics: 3
        data
    }

    #[test]
    fn round_trip() {
        let data = sample();
        let hhea = Hhea::parse(&data).unwrap();
        assert_eq!(hhea.ascender, 800);
        assert_eq!(hhea.descender, -200);
        assert_eq!(hhea.number_of_h_metrics, 3);

        let mut w = Writer::new();
        hhea.encode(&mut w);
        assert_eq!(w.as_bytes(), &data[..]);
    }

    #[test]
    fn vertical_caret_is_upright() {
        assert_eq!(caret_to_angle(1, 0), 0.0);
        assert_eq!(caret_from_angle(0.0), (1, 0));
    }

    #[test]
    fn ten_degrees_forward() {
        let angle = -0.1745; // about -10 degrees
        let (rise, run) = caret_from_angle(angle);
        assert!(run >= 1);
        let back = caret_to_angle(rise, run);
        assert!((back - angle).abs() < 1.5e-5, "got {}", back);
    }

    #[test]
    fn steep_angles_round_trip() {
        for &angle in &[-1.5, -0.7, -0.3, -0.01, 0.01, 0.3, 0.7, 1.5] {
            let (rise, run) = caret_from_angle(angle);
            let back = caret_to_angle(rise, run);
            assert!((back - angle).abs() <= 0.5 / 32767.0 + 1e-9, "angle {}: {}", angle, back);
        }
    }

    #[test]
    fn sentinel_rise_does_not_overflow() {
        let angle = caret_to_angle(-32768, 1);
        assert!(angle.is_finite());
    }
}
