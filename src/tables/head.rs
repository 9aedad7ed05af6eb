// https://docs.microsoft.com/en-us/typography/opentype/spec/head

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, Rect, Result};

const MAGIC: u32 = 0x5F0F_3CF5;

/// An index format of the `loca` table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexToLocationFormat {
    /// Offsets are stored as `u16 / 2`.
    Short,
    /// Offsets are stored as plain `u32`.
    Long,
}

/// A [Font Header Table](https://docs.microsoft.com/en-us/typography/opentype/spec/head).
///
/// `checksum_adjustment` is kept verbatim from the source file; the
/// font writer zeroes and repatches it, so the stored value only
/// matters for byte-level inspection of an unmodified font.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Head {
    /// Raw 16.16 font revision bits.
    pub font_revision: i32,
    /// Patched by the writer so the whole file sums to `0xB1B0AFBA`.
    pub checksum_adjustment: u32,
    /// Various legacy layout flags.
    pub flags: u16,
    /// Design units per em. Always in `64..=16384`.
    pub units_per_em: u16,
    /// Seconds since 1904-01-01 00:00 UTC.
    pub created: i64,
    /// Seconds since 1904-01-01 00:00 UTC.
    pub modified: i64,
    /// Union of all glyph bounding boxes.
    pub bbox: Rect,
    /// Bold/italic bits, mirrored in `OS/2` `fsSelection`.
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated; 2 in modern fonts.
    pub font_direction_hint: i16,
    /// The `loca` offset format.
    pub index_to_location_format: IndexToLocationFormat,
}

impl Head {
    pub(crate) const BOLD: u16 = 1 << 0;
    pub(crate) const ITALIC: u16 = 1 << 1;

    /// Parses the table.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "head");
        let major_version: u16 = s.read()?;
        let minor_version: u16 = s.read()?;
        if major_version != 1 || minor_version != 0 {
            return Err(Error::NotSupported { subsystem: "head", feature: "table version" });
        }

        let font_revision: i32 = s.read()?;
        let checksum_adjustment: u32 = s.read()?;
        let magic: u32 = s.read()?;
        if magic != MAGIC {
            return Err(Error::InvalidFont { subsystem: "head", reason: "magic number mismatch" });
        }

        let flags: u16 = s.read()?;
        let units_per_em: u16 = s.read()?;
        if !(64..=16384).contains(&units_per_em) {
            return Err(Error::InvalidFont { subsystem: "head", reason: "invalid unitsPerEm" });
        }

        let created: i64 = s.read()?;
        let modified: i64 = s.read()?;
        let x_min: i16 = s.read()?;
        let y_min: i16 = s.read()?;
        let x_max: i16 = s.read()?;
        let y_max: i16 = s.read()?;
        let mac_style: u16 = s.read()?;
        let lowest_rec_ppem: u16 = s.read()?;
        let font_direction_hint: i16 = s.read()?;
        let index_to_location_format = match s.read::<i16>()? {
            0 => IndexToLocationFormat::Short,
            1 => IndexToLocationFormat::Long,
            _ => {
                return Err(Error::InvalidFont {
                    subsystem: "head",
                    reason: "unknown index format",
                })
            }
        };

        if s.read::<i16>()? != 0 {
            return Err(Error::NotSupported { subsystem: "head", feature: "glyph data format" });
        }

        Ok(Head {
            font_revision,
            checksum_adjustment,
            flags,
            units_per_em,
            created,
            modified,
            bbox: Rect { x_min, y_min, x_max, y_max },
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_location_format,
        })
    }

    /// Serializes the table. 54 bytes.
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(1); // majorVersion
        w.write_u16(0); // minorVersion
        w.write_u32(self.font_revision as u32);
        w.write_u32(self.checksum_adjustment);
        w.write_u32(MAGIC);
        w.write_u16(self.flags);
        w.write_u16(self.units_per_em);
        w.write_i64(self.created);
        w.write_i64(self.modified);
        w.write_i16(self.bbox.x_min);
        w.write_i16(self.bbox.y_min);
        w.write_i16(self.bbox.x_max);
        w.write_i16(self.bbox.y_max);
        w.write_u16(self.mac_style);
        w.write_u16(self.lowest_rec_ppem);
        w.write_i16(self.font_direction_hint);
        w.write_i16(match self.index_to_location_format {
            IndexToLocationFormat::Short => 0,
            IndexToLocationFormat::Long => 1,
        });
        w.write_i16(0); // glyphDataFormat
    }

    /// Offset of `checksum_adjustment` inside the encoded table.
    pub(crate) const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

    #[inline]
    pub(crate) fn is_bold(&self) -> bool {
        self.mac_style & Self::BOLD != 0
    }

    #[inline]
    pub(crate) fn is_italic(&self) -> bool {
        self.mac_style & Self::ITALIC != 0
    }
}
