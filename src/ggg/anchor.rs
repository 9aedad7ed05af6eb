//! Anchor points and mark arrays.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#anchor-tables>

use crate::parser::{Offset16, Stream};
use crate::writer::Writer;
use crate::{Error, Result};

/// An attachment point in design units.
///
/// Format 2 adds a contour point, format 3 adds device table offsets
/// (carried verbatim, not interpreted). Encoding picks the minimal
/// format for the populated fields.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Anchor {
    /// X coordinate in design units.
    pub x: i16,
    /// Y coordinate in design units.
    pub y: i16,
    /// Format 2: a contour point to snap to when hinted.
    pub anchor_point: Option<u16>,
    /// Format 3: raw X/Y device table offsets.
    pub device: Option<(u16, u16)>,
}

impl Anchor {
    /// A plain format 1 anchor.
    pub fn new(x: i16, y: i16) -> Self {
        Anchor { x, y, anchor_point: None, device: None }
    }

    /// Parses any anchor format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "anchor");
        let format: u16 = s.read()?;
        let x: i16 = s.read()?;
        let y: i16 = s.read()?;
        match format {
            1 => Ok(Anchor::new(x, y)),
            2 => Ok(Anchor { x, y, anchor_point: Some(s.read()?), device: None }),
            3 => Ok(Anchor { x, y, anchor_point: None, device: Some((s.read()?, s.read()?)) }),
            _ => Err(Error::InvalidFont { subsystem: "anchor", reason: "unknown format" }),
        }
    }

    /// The exact byte length [`encode`](Anchor::encode) will produce.
    pub fn encode_len(&self) -> usize {
        if self.device.is_some() {
            10
        } else if self.anchor_point.is_some() {
            8
        } else {
            6
        }
    }

    /// Serializes the minimal format for the populated fields.
    pub fn encode(&self, w: &mut Writer) {
        if let Some((x_device, y_device)) = self.device {
            w.write_u16(3);
            w.write_i16(self.x);
            w.write_i16(self.y);
            w.write_u16(x_device);
            w.write_u16(y_device);
        } else if let Some(point) = self.anchor_point {
            w.write_u16(2);
            w.write_i16(self.x);
            w.write_i16(self.y);
            w.write_u16(point);
        } else {
            w.write_u16(1);
            w.write_i16(self.x);
            w.write_i16(self.y);
        }
    }
}

/// One mark glyph's class and attachment anchor.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MarkRecord {
    /// The mark class, below the subtable's class count.
    pub class: u16,
    /// Where the mark attaches.
    pub anchor: Anchor,
}

/// A [Mark Array](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#mark-array-table):
/// one record per mark glyph, indexed by the mark coverage index.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct MarkArray {
    /// The mark records.
    pub records: Vec<MarkRecord>,
}

impl MarkArray {
    /// Parses the array.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "mark-array");
        let count: u16 = s.read()?;
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let class: u16 = s.read()?;
            let offset: Offset16 = s.read()?;
            let anchor_data = data.get(offset.to_usize()..).ok_or(Error::UnexpectedEof {
                subsystem: "mark-array",
                offset: offset.to_usize(),
            })?;
            records.push(MarkRecord { class, anchor: Anchor::parse(anchor_data)? });
        }

        Ok(MarkArray { records })
    }

    /// The highest mark class plus one.
    pub fn num_classes(&self) -> u16 {
        self.records.iter().map(|r| r.class).max().map_or(0, |max| max + 1)
    }

    /// Serializes the array. Anchors follow the record list.
    pub fn encode(&self, w: &mut Writer) {
        let base = w.len();
        w.write_u16(self.records.len() as u16);
        let mut anchor_at = 2 + 4 * self.records.len();
        for record in &self.records {
            w.write_u16(record.class);
            w.write_u16(anchor_at as u16);
            anchor_at += record.anchor.encode_len();
        }

        for record in &self.records {
            record.anchor.encode(w);
        }

        debug_assert_eq!(w.len() - base, anchor_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_formats_round_trip() {
        for anchor in [
            Anchor::new(120, -40),
            Anchor { x: 1, y: 2, anchor_point: Some(7), device: None },
            Anchor { x: 1, y: 2, anchor_point: None, device: Some((12, 0)) },
        ] {
            let mut w = Writer::new();
            anchor.encode(&mut w);
            assert_eq!(w.len(), anchor.encode_len());
            assert_eq!(Anchor::parse(w.as_bytes()).unwrap(), anchor);
        }
    }

    #[test]
    fn anchor_unknown_format() {
        let data = &[0x00, 0x04, 0x00, 0x01, 0x00, 0x02];
        assert!(Anchor::parse(data).is_err());
    }

    #[test]
    fn mark_array_round_trip() {
        let array = MarkArray {
            records: vec![
                MarkRecord { class: 0, anchor: Anchor::new(10, 20) },
                MarkRecord { class: 1, anchor: Anchor::new(-5, 0) },
                MarkRecord { class: 0, anchor: Anchor::new(0, 450) },
            ],
        };
        assert_eq!(array.num_classes(), 2);

        let mut w = Writer::new();
        array.encode(&mut w);
        assert_eq!(MarkArray::parse(w.as_bytes()).unwrap(), array);
    }
}
