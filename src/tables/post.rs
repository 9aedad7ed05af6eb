// https://docs.microsoft.com/en-us/typography/opentype/spec/post

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, GlyphId, LineMetrics, Result};

const VERSION_2_0: u32 = 0x0002_0000;
const VERSION_3_0: u32 = 0x0003_0000;

/// The 258 standard Macintosh glyph names referenced by version 2.0
/// name indices below 258.
#[rustfmt::skip]
pub(crate) const MACINTOSH_NAMES: &[&str] = &[
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign",
    "dollar", "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk",
    "plus", "comma", "hyphen", "period", "slash", "zero", "one", "two", "three", "four",
    "five", "six", "seven", "eight", "nine", "colon", "semicolon", "less", "equal",
    "greater", "question", "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K",
    "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    "bracketleft", "backslash", "bracketright", "asciicircum", "underscore", "grave",
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
    "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis",
    "Udieresis", "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring",
    "ccedilla", "eacute", "egrave", "ecircumflex", "edieresis", "iacute", "igrave",
    "icircumflex", "idieresis", "ntilde", "oacute", "ograve", "ocircumflex", "odieresis",
    "otilde", "uacute", "ugrave", "ucircumflex", "udieresis", "dagger", "degree", "cent",
    "sterling", "section", "bullet", "paragraph", "germandbls", "registered", "copyright",
    "trademark", "acute", "dieresis", "notequal", "AE", "Oslash", "infinity", "plusminus",
    "lessequal", "greaterequal", "yen", "mu", "partialdiff", "summation", "product", "pi",
    "integral", "ordfeminine", "ordmasculine", "Omega", "ae", "oslash", "questiondown",
    "exclamdown", "logicalnot", "radical", "florin", "approxequal", "Delta",
    "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered",
    "quotesinglbase", "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex",
    "Aacute", "Edieresis", "Egrave", "Iacute", "Icircumflex", "Idieresis", "Igrave",
    "Oacute", "Ocircumflex", "apple", "Ograve", "Uacute", "Ucircumflex", "Ugrave",
    "dotlessi", "circumflex", "tilde", "macron", "breve", "dotaccent", "ring", "cedilla",
    "hungarumlaut", "ogonek", "caron", "Lslash", "lslash", "Scaron", "scaron", "Zcaron",
    "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn", "thorn", "minus",
    "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf", "onequarter",
    "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla", "scedilla",
    "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];

/// A [PostScript Table](https://docs.microsoft.com/en-us/typography/opentype/spec/post).
#[derive(Clone, PartialEq, Debug)]
pub struct Post {
    /// Raw 16.16 italic angle in degrees. 0 is upright, negative
    /// slants forward.
    pub italic_angle: i32,
    /// Underline metrics.
    pub underline: LineMetrics,
    /// Non-zero for monospaced fonts.
    pub is_fixed_pitch: u32,
    /// Memory usage hints, kept for re-emission.
    pub memory: [u32; 4],
    /// Version 2.0 name indices, one per glyph. Empty for version 3.0.
    pub name_indices: Vec<u16>,
    /// Version 2.0 custom names referenced by indices >= 258.
    pub names: Vec<String>,
}

impl Post {
    /// Parses the table. Versions 2.0 and 3.0.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "post");
        let version: u32 = s.read()?;
        if version != VERSION_2_0 && version != VERSION_3_0 {
            return Err(Error::NotSupported { subsystem: "post", feature: "table version" });
        }

        let italic_angle: i32 = s.read()?;
        let underline_position: i16 = s.read()?;
        let underline_thickness: i16 = s.read()?;
        let is_fixed_pitch: u32 = s.read()?;
        let memory = [s.read()?, s.read()?, s.read()?, s.read()?];

        let mut name_indices = Vec::new();
        let mut names = Vec::new();
        if version == VERSION_2_0 {
            name_indices = s.read_vec16::<u16>()?;

            // Pascal strings until the region ends.
            while !s.at_end() {
                let len: u8 = s.read()?;
                let bytes = s.read_bytes(usize::from(len))?;
                names.push(String::from_utf8_lossy(bytes).into_owned());
            }
        }

        Ok(Post {
            italic_angle,
            underline: LineMetrics { position: underline_position, thickness: underline_thickness },
            is_fixed_pitch,
            memory,
            name_indices,
            names,
        })
    }

    /// The italic angle in degrees as a float.
    #[inline]
    pub fn italic_angle_degrees(&self) -> f32 {
        self.italic_angle as f32 / 65536.0
    }

    /// Returns the glyph's PostScript name.
    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&str> {
        let index = *self.name_indices.get(usize::from(glyph_id.0))?;
        if usize::from(index) < MACINTOSH_NAMES.len() {
            Some(MACINTOSH_NAMES[usize::from(index)])
        } else {
            self.names.get(usize::from(index) - MACINTOSH_NAMES.len()).map(String::as_str)
        }
    }

    /// Serializes the table. Version 2.0 when names are present,
    /// version 3.0 otherwise.
    pub fn encode(&self, w: &mut Writer) {
        let version = if self.name_indices.is_empty() { VERSION_3_0 } else { VERSION_2_0 };
        w.write_u32(version);
        w.write_u32(self.italic_angle as u32);
        w.write_i16(self.underline.position);
        w.write_i16(self.underline.thickness);
        w.write_u32(self.is_fixed_pitch);
        for n in &self.memory {
            w.write_u32(*n);
        }

        if version == VERSION_2_0 {
            w.write_u16(self.name_indices.len() as u16);
            for index in &self.name_indices {
                w.write_u16(*index);
            }

            for name in &self.names {
                let len = name.len().min(255);
                w.write_u8(len as u8);
                w.write_bytes(&name.as_bytes()[..len]);
            }
        }
    }

    /// Drops all glyph names, demoting the table to version 3.0.
    pub fn strip_names(&mut self) {
        self.name_indices.clear();
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&version.to_be_bytes());
        data.extend_from_slice(&(-0x000A_0000i32).to_be_bytes()); // italicAngle: -10.0
        data.extend_from_slice(&[0xFF, 0x9C]); // underlinePosition: -100
        data.extend_from_slice(&[0x00, 0x32]); // underlineThickness: 50
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // isFixedPitch
        data.extend_from_slice(&[0u8; 16]); // memory hints
        data
    }

    #[test]
    fn version_3() {
        let data = header(VERSION_3_0);
        let post = Post::parse(&data).unwrap();
        assert_eq!(post.italic_angle_degrees(), -10.0);
        assert_eq!(post.underline, LineMetrics { position: -100, thickness: 50 });
        assert_eq!(post.glyph_name(GlyphId(0)), None);

        let mut w = Writer::new();
        post.encode(&mut w);
        assert_eq!(w.as_bytes(), &data[..]);
    }

    #[test]
    fn version_2_names() {
        let mut data = header(VERSION_2_0);
        data.extend_from_slice(&[0x00, 0x03]); // numberOfGlyphs
        data.extend_from_slice(&[0x00, 0x00]); // glyph 0 -> .notdef
        data.extend_from_slice(&[0x00, 0x24]); // glyph 1 -> 'A'
        data.extend_from_slice(&[0x01, 0x02]); // glyph 2 -> custom name 0
        data.extend_from_slice(&[5]); // pascal string
        data.extend_from_slice(b"A.alt");

        let post = Post::parse(&data).unwrap();
        assert_eq!(post.glyph_name(GlyphId(0)), Some(".notdef"));
        assert_eq!(post.glyph_name(GlyphId(1)), Some("A"));
        assert_eq!(post.glyph_name(GlyphId(2)), Some("A.alt"));
        assert_eq!(post.glyph_name(GlyphId(3)), None);

        let mut w = Writer::new();
        post.encode(&mut w);
        assert_eq!(w.as_bytes(), &data[..]);
    }

    #[test]
    fn standard_names_count() {
        assert_eq!(MACINTOSH_NAMES.len(), 258);
    }

    #[test]
    fn version_1_unsupported() {
        let data = header(0x0001_0000);
        assert_eq!(
            Post::parse(&data).unwrap_err(),
            Error::NotSupported { subsystem: "post", feature: "table version" }
        );
    }
}
