// https://docs.microsoft.com/en-us/typography/opentype/spec/os2

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, LineMetrics, Result, Tag};

/// A font [weight](https://docs.microsoft.com/en-us/typography/opentype/spec/os2#usweightclass).
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
    Other(u16),
}

impl Weight {
    /// Returns a numeric representation of a weight.
    #[inline]
    pub fn to_number(self) -> u16 {
        match self {
            Weight::Thin => 100,
            Weight::ExtraLight => 200,
            Weight::Light => 300,
            Weight::Normal => 400,
            Weight::Medium => 500,
            Weight::SemiBold => 600,
            Weight::Bold => 700,
            Weight::ExtraBold => 800,
            Weight::Black => 900,
            Weight::Other(n) => n,
        }
    }
}

impl From<u16> for Weight {
    #[inline]
    fn from(value: u16) -> Self {
        match value {
            100 => Weight::Thin,
            200 => Weight::ExtraLight,
            300 => Weight::Light,
            400 => Weight::Normal,
            500 => Weight::Medium,
            600 => Weight::SemiBold,
            700 => Weight::Bold,
            800 => Weight::ExtraBold,
            900 => Weight::Black,
            _ => Weight::Other(value),
        }
    }
}

impl Default for Weight {
    #[inline]
    fn default() -> Self {
        Weight::Normal
    }
}

/// A font [width](https://docs.microsoft.com/en-us/typography/opentype/spec/os2#uswidthclass).
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
#[allow(missing_docs)]
pub enum Width {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl Width {
    /// Returns a numeric representation of a width.
    #[inline]
    pub fn to_number(self) -> u16 {
        match self {
            Width::UltraCondensed => 1,
            Width::ExtraCondensed => 2,
            Width::Condensed => 3,
            Width::SemiCondensed => 4,
            Width::Normal => 5,
            Width::SemiExpanded => 6,
            Width::Expanded => 7,
            Width::ExtraExpanded => 8,
            Width::UltraExpanded => 9,
        }
    }
}

impl Default for Width {
    #[inline]
    fn default() -> Self {
        Width::Normal
    }
}

/// Embedding permissions from `fsType`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Permissions {
    /// Installable embedding.
    Installable,
    /// May be embedded, but only for preview and print.
    PrintAndPreview,
    /// May be embedded and the document may be edited.
    Editable,
    /// Must not be embedded.
    Restricted,
}

// https://docs.microsoft.com/en-us/typography/opentype/spec/os2#fsselection
#[derive(Clone, Copy)]
struct SelectionFlags(u16);

impl SelectionFlags {
    #[inline] fn italic(self) -> bool { self.0 & (1 << 0) != 0 }
    #[inline] fn bold(self) -> bool { self.0 & (1 << 5) != 0 }
    #[inline] fn regular(self) -> bool { self.0 & (1 << 6) != 0 }
    #[inline] fn oblique(self) -> bool { self.0 & (1 << 9) != 0 }
}

/// An [OS/2 and Windows Metrics Table](https://docs.microsoft.com/en-us/typography/opentype/spec/os2).
///
/// All versions from 0 to 5 are accepted; fields past the version's
/// length are `None` and are not emitted back.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Os2 {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range: [u32; 4],
    pub ach_vend_id: Tag,
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// Version 1 and later.
    pub ul_code_page_range: Option<[u32; 2]>,
    /// Version 2 and later.
    pub extra: Option<Os2V2>,
    /// Version 5 only.
    pub optical_range: Option<(u16, u16)>,
}

/// OS/2 fields added by version 2.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Os2V2 {
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

impl Os2 {
    /// Parses the table.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "OS/2");
        let version: u16 = s.read()?;
        if version > 5 {
            return Err(Error::NotSupported { subsystem: "OS/2", feature: "table version" });
        }

        let x_avg_char_width: i16 = s.read()?;
        let us_weight_class: u16 = s.read()?;
        let us_width_class: u16 = s.read()?;
        let fs_type: u16 = s.read()?;
        let y_subscript_x_size: i16 = s.read()?;
        let y_subscript_y_size: i16 = s.read()?;
        let y_subscript_x_offset: i16 = s.read()?;
        let y_subscript_y_offset: i16 = s.read()?;
        let y_superscript_x_size: i16 = s.read()?;
        let y_superscript_y_size: i16 = s.read()?;
        let y_superscript_x_offset: i16 = s.read()?;
        let y_superscript_y_offset: i16 = s.read()?;
        let y_strikeout_size: i16 = s.read()?;
        let y_strikeout_position: i16 = s.read()?;
        let s_family_class: i16 = s.read()?;

        let mut panose = [0u8; 10];
        panose.copy_from_slice(s.read_bytes(10)?);

        let ul_unicode_range = [s.read()?, s.read()?, s.read()?, s.read()?];
        let ach_vend_id: Tag = s.read()?;
        let fs_selection: u16 = s.read()?;
        let us_first_char_index: u16 = s.read()?;
        let us_last_char_index: u16 = s.read()?;
        let s_typo_ascender: i16 = s.read()?;
        let s_typo_descender: i16 = s.read()?;
        let s_typo_line_gap: i16 = s.read()?;
        let us_win_ascent: u16 = s.read()?;
        let us_win_descent: u16 = s.read()?;

        let ul_code_page_range = if version >= 1 { Some([s.read()?, s.read()?]) } else { None };

        let extra = if version >= 2 {
            Some(Os2V2 {
                sx_height: s.read()?,
                s_cap_height: s.read()?,
                us_default_char: s.read()?,
                us_break_char: s.read()?,
                us_max_context: s.read()?,
            })
        } else {
            None
        };

        let optical_range = if version == 5 { Some((s.read()?, s.read()?)) } else { None };

        Ok(Os2 {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_subscript_x_offset,
            y_subscript_y_offset,
            y_superscript_x_size,
            y_superscript_y_size,
            y_superscript_x_offset,
            y_superscript_y_offset,
            y_strikeout_size,
            y_strikeout_position,
            s_family_class,
            panose,
            ul_unicode_range,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            ul_code_page_range,
            extra,
            optical_range,
        })
    }

    /// Serializes the table.
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.version);
        w.write_i16(self.x_avg_char_width);
        w.write_u16(self.us_weight_class);
        w.write_u16(self.us_width_class);
        w.write_u16(self.fs_type);
        w.write_i16(self.y_subscript_x_size);
        w.write_i16(self.y_subscript_y_size);
        w.write_i16(self.y_subscript_x_offset);
        w.write_i16(self.y_subscript_y_offset);
        w.write_i16(self.y_superscript_x_size);
        w.write_i16(self.y_superscript_y_size);
        w.write_i16(self.y_superscript_x_offset);
        w.write_i16(self.y_superscript_y_offset);
        w.write_i16(self.y_strikeout_size);
        w.write_i16(self.y_strikeout_position);
        w.write_i16(self.s_family_class);
        w.write_bytes(&self.panose);
        for range in &self.ul_unicode_range {
            w.write_u32(*range);
        }
        w.write_tag(self.ach_vend_id);
        w.write_u16(self.fs_selection);
        w.write_u16(self.us_first_char_index);
        w.write_u16(self.us_last_char_index);
        w.write_i16(self.s_typo_ascender);
        w.write_i16(self.s_typo_descender);
        w.write_i16(self.s_typo_line_gap);
        w.write_u16(self.us_win_ascent);
        w.write_u16(self.us_win_descent);

        if let Some(ranges) = self.ul_code_page_range {
            w.write_u32(ranges[0]);
            w.write_u32(ranges[1]);
        }

        if let Some(extra) = self.extra {
            w.write_i16(extra.sx_height);
            w.write_i16(extra.s_cap_height);
            w.write_u16(extra.us_default_char);
            w.write_u16(extra.us_break_char);
            w.write_u16(extra.us_max_context);
        }

        if let Some((lower, upper)) = self.optical_range {
            w.write_u16(lower);
            w.write_u16(upper);
        }
    }

    /// The font's weight class.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from(self.us_weight_class)
    }

    /// The font's width class. Out-of-range values map to `Normal`.
    #[inline]
    pub fn width(&self) -> Width {
        match self.us_width_class {
            1 => Width::UltraCondensed,
            2 => Width::ExtraCondensed,
            3 => Width::Condensed,
            4 => Width::SemiCondensed,
            5 => Width::Normal,
            6 => Width::SemiExpanded,
            7 => Width::Expanded,
            8 => Width::ExtraExpanded,
            9 => Width::UltraExpanded,
            _ => Width::Normal,
        }
    }

    /// Embedding permissions. The licensing bits of `fsType`.
    pub fn permissions(&self) -> Permissions {
        // Only bits 0..3 are licensing; 0x2 wins over the others.
        if self.fs_type & 0x0002 != 0 {
            Permissions::Restricted
        } else if self.fs_type & 0x0004 != 0 {
            Permissions::PrintAndPreview
        } else if self.fs_type & 0x0008 != 0 {
            Permissions::Editable
        } else {
            Permissions::Installable
        }
    }

    /// Checks that font is marked as *Regular*.
    #[inline]
    pub fn is_regular(&self) -> bool {
        SelectionFlags(self.fs_selection).regular()
    }

    /// Checks that font is marked as *Italic*.
    #[inline]
    pub fn is_italic(&self) -> bool {
        SelectionFlags(self.fs_selection).italic()
    }

    /// Checks that font is marked as *Bold*.
    #[inline]
    pub fn is_bold(&self) -> bool {
        SelectionFlags(self.fs_selection).bold()
    }

    /// Checks that font is marked as *Oblique*. Version 4 and later.
    #[inline]
    pub fn is_oblique(&self) -> bool {
        self.version >= 4 && SelectionFlags(self.fs_selection).oblique()
    }

    /// The font's X height, when the table version carries it.
    #[inline]
    pub fn x_height(&self) -> Option<i16> {
        self.extra.map(|e| e.sx_height)
    }

    /// The font's capital height, when the table version carries it.
    #[inline]
    pub fn cap_height(&self) -> Option<i16> {
        self.extra.map(|e| e.s_cap_height)
    }

    /// The font's strikeout metrics.
    #[inline]
    pub fn strikeout_metrics(&self) -> LineMetrics {
        LineMetrics {
            thickness: self.y_strikeout_size,
            position: self.y_strikeout_position,
        }
    }
}
