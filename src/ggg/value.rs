//! Value records: the variable-shape positioning adjustments of GPOS.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#value-record>

use crate::parser::Stream;
use crate::writer::Writer;
use crate::Result;

bitflags::bitflags! {
    /// Declares which [`ValueRecord`] fields are present on disk.
    ///
    /// One mask is shared by all records of a subtable.
    pub struct ValueFormat: u16 {
        /// `x_placement` is present.
        const X_PLACEMENT = 1 << 0;
        /// `y_placement` is present.
        const Y_PLACEMENT = 1 << 1;
        /// `x_advance` is present.
        const X_ADVANCE = 1 << 2;
        /// `y_advance` is present.
        const Y_ADVANCE = 1 << 3;
        /// `x_placement_device` is present.
        const X_PLACEMENT_DEVICE = 1 << 4;
        /// `y_placement_device` is present.
        const Y_PLACEMENT_DEVICE = 1 << 5;
        /// `x_advance_device` is present.
        const X_ADVANCE_DEVICE = 1 << 6;
        /// `y_advance_device` is present.
        const Y_ADVANCE_DEVICE = 1 << 7;
    }
}

impl ValueFormat {
    /// The on-disk record size for this mask, in bytes.
    #[inline]
    pub fn record_size(self) -> usize {
        2 * self.bits().count_ones() as usize
    }
}

/// A positioning adjustment. Absent fields read as zero.
///
/// Device table offsets are carried verbatim; this library does not
/// interpret device tables.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct ValueRecord {
    /// Horizontal placement adjustment, in design units.
    pub x_placement: i16,
    /// Vertical placement adjustment, in design units.
    pub y_placement: i16,
    /// Horizontal advance adjustment, in design units.
    pub x_advance: i16,
    /// Vertical advance adjustment, in design units.
    pub y_advance: i16,
    /// Raw offset to an X placement device table.
    pub x_placement_device: u16,
    /// Raw offset to a Y placement device table.
    pub y_placement_device: u16,
    /// Raw offset to an X advance device table.
    pub x_advance_device: u16,
    /// Raw offset to a Y advance device table.
    pub y_advance_device: u16,
}

impl ValueRecord {
    /// Reads a record shaped by `format`.
    pub fn parse(s: &mut Stream, format: ValueFormat) -> Result<Self> {
        let mut record = ValueRecord::default();
        if format.contains(ValueFormat::X_PLACEMENT) {
            record.x_placement = s.read()?;
        }
        if format.contains(ValueFormat::Y_PLACEMENT) {
            record.y_placement = s.read()?;
        }
        if format.contains(ValueFormat::X_ADVANCE) {
            record.x_advance = s.read()?;
        }
        if format.contains(ValueFormat::Y_ADVANCE) {
            record.y_advance = s.read()?;
        }
        if format.contains(ValueFormat::X_PLACEMENT_DEVICE) {
            record.x_placement_device = s.read()?;
        }
        if format.contains(ValueFormat::Y_PLACEMENT_DEVICE) {
            record.y_placement_device = s.read()?;
        }
        if format.contains(ValueFormat::X_ADVANCE_DEVICE) {
            record.x_advance_device = s.read()?;
        }
        if format.contains(ValueFormat::Y_ADVANCE_DEVICE) {
            record.y_advance_device = s.read()?;
        }
        Ok(record)
    }

    /// Writes the fields selected by `format`.
    pub fn encode(&self, format: ValueFormat, w: &mut Writer) {
        if format.contains(ValueFormat::X_PLACEMENT) {
            w.write_i16(self.x_placement);
        }
        if format.contains(ValueFormat::Y_PLACEMENT) {
            w.write_i16(self.y_placement);
        }
        if format.contains(ValueFormat::X_ADVANCE) {
            w.write_i16(self.x_advance);
        }
        if format.contains(ValueFormat::Y_ADVANCE) {
            w.write_i16(self.y_advance);
        }
        if format.contains(ValueFormat::X_PLACEMENT_DEVICE) {
            w.write_u16(self.x_placement_device);
        }
        if format.contains(ValueFormat::Y_PLACEMENT_DEVICE) {
            w.write_u16(self.y_placement_device);
        }
        if format.contains(ValueFormat::X_ADVANCE_DEVICE) {
            w.write_u16(self.x_advance_device);
        }
        if format.contains(ValueFormat::Y_ADVANCE_DEVICE) {
            w.write_u16(self.y_advance_device);
        }
    }

    /// The minimal mask that carries this record's non-zero fields.
    pub fn required_format(&self) -> ValueFormat {
        let mut format = ValueFormat::empty();
        if self.x_placement != 0 {
            format |= ValueFormat::X_PLACEMENT;
        }
        if self.y_placement != 0 {
            format |= ValueFormat::Y_PLACEMENT;
        }
        if self.x_advance != 0 {
            format |= ValueFormat::X_ADVANCE;
        }
        if self.y_advance != 0 {
            format |= ValueFormat::Y_ADVANCE;
        }
        if self.x_placement_device != 0 {
            format |= ValueFormat::X_PLACEMENT_DEVICE;
        }
        if self.y_placement_device != 0 {
            format |= ValueFormat::Y_PLACEMENT_DEVICE;
        }
        if self.x_advance_device != 0 {
            format |= ValueFormat::X_ADVANCE_DEVICE;
        }
        if self.y_advance_device != 0 {
            format |= ValueFormat::Y_ADVANCE_DEVICE;
        }
        format
    }

    /// Whether every field is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.required_format().is_empty()
    }

    /// The mask covering every field any of `records` needs.
    pub fn combined_format<'a>(records: impl IntoIterator<Item = &'a ValueRecord>) -> ValueFormat {
        records
            .into_iter()
            .fold(ValueFormat::empty(), |format, record| format | record.required_format())
    }
}
