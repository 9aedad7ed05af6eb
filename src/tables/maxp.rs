// https://docs.microsoft.com/en-us/typography/opentype/spec/maxp

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, Result};

const VERSION_0_5: u32 = 0x0000_5000;
const VERSION_1_0: u32 = 0x0001_0000;

/// Version 1.0 profile limits, kept only for re-emission.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[allow(missing_docs)]
pub struct Profile {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

/// A [Maximum Profile Table](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Maxp {
    /// Total number of glyphs. Never zero.
    pub num_glyphs: u16,
    /// Present for version 1.0 (TrueType outline) tables.
    pub profile: Option<Profile>,
}

impl Maxp {
    /// Parses the table. Accepts versions 0.5 and 1.0.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "maxp");
        let version: u32 = s.read()?;
        if version != VERSION_0_5 && version != VERSION_1_0 {
            return Err(Error::NotSupported { subsystem: "maxp", feature: "table version" });
        }

        let num_glyphs: u16 = s.read()?;
        if num_glyphs == 0 {
            return Err(Error::InvalidFont { subsystem: "maxp", reason: "no glyphs" });
        }

        let profile = if version == VERSION_1_0 {
            Some(Profile {
                max_points: s.read()?,
                max_contours: s.read()?,
                max_composite_points: s.read()?,
                max_composite_contours: s.read()?,
                max_zones: s.read()?,
                max_twilight_points: s.read()?,
                max_storage: s.read()?,
                max_function_defs: s.read()?,
                max_instruction_defs: s.read()?,
                max_stack_elements: s.read()?,
                max_size_of_instructions: s.read()?,
                max_component_elements: s.read()?,
                max_component_depth: s.read()?,
            })
        } else {
            None
        };

        Ok(Maxp { num_glyphs, profile })
    }

    /// Serializes the table.
    pub fn encode(&self, w: &mut Writer) {
        match self.profile {
            Some(p) => {
                w.write_u32(VERSION_1_0);
                w.write_u16(self.num_glyphs);
                w.write_u16(p.max_points);
                w.write_u16(p.max_contours);
                w.write_u16(p.max_composite_points);
                w.write_u16(p.max_composite_contours);
                w.write_u16(p.max_zones);
                w.write_u16(p.max_twilight_points);
                w.write_u16(p.max_storage);
                w.write_u16(p.max_function_defs);
                w.write_u16(p.max_instruction_defs);
                w.write_u16(p.max_stack_elements);
                w.write_u16(p.max_size_of_instructions);
                w.write_u16(p.max_component_elements);
                w.write_u16(p.max_component_depth);
            }
            None => {
                w.write_u32(VERSION_0_5);
                w.write_u16(self.num_glyphs);
            }
        }
    }
}
