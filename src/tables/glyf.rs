// https://docs.microsoft.com/en-us/typography/opentype/spec/glyf

use std::collections::HashMap;

use crate::parser::{F2Dot14, Stream};
use crate::writer::Writer;
use crate::{Error, GlyphId, Rect, Result};

bitflags::bitflags! {
    // https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#simple-glyph-description
    struct SimpleFlags: u8 {
        const ON_CURVE_POINT = 1 << 0;
        const X_SHORT_VECTOR = 1 << 1;
        const Y_SHORT_VECTOR = 1 << 2;
        const REPEAT_FLAG = 1 << 3;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 1 << 4;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Composite glyph component flags.
    ///
    /// <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#composite-glyph-description>
    pub struct ComponentFlags: u16 {
        /// Arguments are 16-bit.
        const ARG_1_AND_2_ARE_WORDS = 1 << 0;
        /// Arguments are an x/y offset, not point numbers.
        const ARGS_ARE_XY_VALUES = 1 << 1;
        /// Round the offset to the pixel grid.
        const ROUND_XY_TO_GRID = 1 << 2;
        /// A single scale follows.
        const WE_HAVE_A_SCALE = 1 << 3;
        /// Another component follows this one.
        const MORE_COMPONENTS = 1 << 5;
        /// Separate x and y scales follow.
        const WE_HAVE_AN_X_AND_Y_SCALE = 1 << 6;
        /// A full 2x2 matrix follows.
        const WE_HAVE_A_TWO_BY_TWO = 1 << 7;
        /// Instructions trail the last component.
        const WE_HAVE_INSTRUCTIONS = 1 << 8;
        /// The composite inherits this component's metrics.
        const USE_MY_METRICS = 1 << 9;
        /// Component outlines overlap.
        const OVERLAP_COMPOUND = 1 << 10;
    }
}

/// A point of a simple glyph contour.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    /// X coordinate in design units.
    pub x: i16,
    /// Y coordinate in design units.
    pub y: i16,
    /// Whether the point lies on the curve.
    pub on_curve: bool,
}

/// A decoded simple glyph.
#[derive(Clone, PartialEq, Debug)]
pub struct SimpleGlyph {
    /// The glyph's contours. Each has at least one point.
    pub contours: Vec<Vec<Point>>,
    /// Opaque hinting bytecode.
    pub instructions: Vec<u8>,
}

/// An affine 2x2 transform of a composite component.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0 }
    }
}

/// Where a composite component attaches.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ComponentArgs {
    /// A translation in design units.
    Offsets {
        /// X translation.
        dx: i16,
        /// Y translation.
        dy: i16,
    },
    /// Two anchor point numbers to align.
    Points {
        /// Point number in the compound so far.
        parent: u16,
        /// Point number in the child glyph.
        child: u16,
    },
}

/// One component of a composite glyph.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Component {
    /// The referenced glyph.
    pub glyph: GlyphId,
    /// The component's 2x2 transform.
    pub transform: Transform,
    /// Translation or anchor points.
    pub args: ComponentArgs,
    /// Raw component flags.
    pub flags: ComponentFlags,
}

/// A decoded view of one glyph body.
#[derive(Clone, PartialEq, Debug)]
pub enum GlyphKind {
    /// No contour data at all.
    Empty,
    /// Plain contours.
    Simple(SimpleGlyph),
    /// References to other glyphs.
    Composite(Vec<Component>),
}

/// One glyph of the `glyf` table.
///
/// The raw body is kept verbatim, so unmodified glyphs re-emit
/// byte-identically; decoding is done on demand and validates the
/// whole coordinate stream.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Glyph {
    data: Vec<u8>,
}

impl Glyph {
    /// Wraps a raw glyph body. Empty data means an empty glyph.
    pub fn new(data: Vec<u8>) -> Self {
        Glyph { data }
    }

    /// The raw body bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the glyph has no contour data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bounding box from the glyph header. `None` for empty glyphs.
    pub fn bbox(&self) -> Result<Option<Rect>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut s = Stream::new(&self.data, "glyf");
        s.skip::<i16>()?; // numberOfContours
        Ok(Some(Rect {
            x_min: s.read()?,
            y_min: s.read()?,
            x_max: s.read()?,
            y_max: s.read()?,
        }))
    }

    /// Decodes the glyph body.
    pub fn kind(&self) -> Result<GlyphKind> {
        if self.is_empty() {
            return Ok(GlyphKind::Empty);
        }

        let mut s = Stream::new(&self.data, "glyf");
        let number_of_contours: i16 = s.read()?;
        s.advance(8)?; // bbox

        if number_of_contours > 0 {
            Ok(GlyphKind::Simple(parse_simple(&mut s, number_of_contours as u16)?))
        } else if number_of_contours < 0 {
            Ok(GlyphKind::Composite(parse_components(&mut s)?))
        } else {
            // A header-only body. Treated like a missing glyph.
            Ok(GlyphKind::Empty)
        }
    }

    /// The glyphs referenced by a composite body. Empty for simple
    /// glyphs.
    pub fn component_glyphs(&self) -> Result<Vec<GlyphId>> {
        match self.kind()? {
            GlyphKind::Composite(components) => {
                Ok(components.iter().map(|c| c.glyph).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Rewrites composite component glyph IDs in place through `map`.
    ///
    /// Everything else in the body stays byte-identical.
    pub fn remap_components(&mut self, map: &HashMap<GlyphId, GlyphId>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let mut s = Stream::new(&self.data, "glyf");
        let number_of_contours: i16 = s.read()?;
        if number_of_contours >= 0 {
            return Ok(());
        }

        s.advance(8)?; // bbox
        let mut patches: Vec<(usize, GlyphId)> = Vec::new();
        loop {
            let flags = ComponentFlags::from_bits_truncate(s.read::<u16>()?);
            let gid_at = s.offset();
            let glyph: GlyphId = s.read()?;

            let new = *map.get(&glyph).ok_or(Error::InvalidFont {
                subsystem: "glyf",
                reason: "composite references a glyph outside the subset",
            })?;
            patches.push((gid_at, new));

            skip_component_args(&mut s, flags)?;
            if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
                break;
            }
        }

        for (at, glyph) in patches {
            self.data[at..at + 2].copy_from_slice(&glyph.0.to_be_bytes());
        }

        Ok(())
    }
}

fn parse_simple(s: &mut Stream, number_of_contours: u16) -> Result<SimpleGlyph> {
    let end_points = s.read_vec::<u16>(usize::from(number_of_contours))?;

    let mut last = 0u16;
    for (index, &end) in end_points.iter().enumerate() {
        if index > 0 && end <= last {
            return Err(Error::InvalidFont { subsystem: "glyf", reason: "unsorted endpoints" });
        }
        last = end;
    }

    // The last endpoint determines the point count.
    if last == u16::MAX {
        return Err(Error::InvalidFont { subsystem: "glyf", reason: "point count overflow" });
    }
    let points_total = usize::from(last) + 1;

    let instructions_len: u16 = s.read()?;
    let instructions = s.read_bytes(usize::from(instructions_len))?.to_vec();

    // Run-length decode the flag bytes.
    let mut flags = Vec::with_capacity(points_total);
    while flags.len() < points_total {
        let byte_flags = SimpleFlags::from_bits_truncate(s.read()?);
        flags.push(byte_flags);
        if byte_flags.contains(SimpleFlags::REPEAT_FLAG) {
            let repeats: u8 = s.read()?;
            for _ in 0..repeats {
                flags.push(byte_flags);
            }
        }
    }

    if flags.len() != points_total {
        return Err(Error::InvalidFont { subsystem: "glyf", reason: "flag run overflow" });
    }

    let mut xs = Vec::with_capacity(points_total);
    let mut x = 0i16;
    for flag in &flags {
        let delta = if flag.contains(SimpleFlags::X_SHORT_VECTOR) {
            let value = i16::from(s.read::<u8>()?);
            if flag.contains(SimpleFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR) {
                value
            } else {
                -value
            }
        } else if flag.contains(SimpleFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR) {
            0
        } else {
            s.read::<i16>()?
        };
        x = x.wrapping_add(delta);
        xs.push(x);
    }

    let mut ys = Vec::with_capacity(points_total);
    let mut y = 0i16;
    for flag in &flags {
        let delta = if flag.contains(SimpleFlags::Y_SHORT_VECTOR) {
            let value = i16::from(s.read::<u8>()?);
            if flag.contains(SimpleFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR) {
                value
            } else {
                -value
            }
        } else if flag.contains(SimpleFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR) {
            0
        } else {
            s.read::<i16>()?
        };
        y = y.wrapping_add(delta);
        ys.push(y);
    }

    // The streams must consume the body exactly; only 2-byte alignment
    // padding may remain, and it must be zero.
    let tail = s.tail();
    if tail.len() > 3 || tail.iter().any(|&b| b != 0) {
        return Err(Error::InvalidFont {
            subsystem: "glyf",
            reason: "coordinate streams do not match the glyph length",
        });
    }

    let mut contours = Vec::with_capacity(end_points.len());
    let mut from = 0usize;
    for &end in &end_points {
        let to = usize::from(end) + 1;
        let contour = (from..to)
            .map(|i| Point {
                x: xs[i],
                y: ys[i],
                on_curve: flags[i].contains(SimpleFlags::ON_CURVE_POINT),
            })
            .collect();
        contours.push(contour);
        from = to;
    }

    Ok(SimpleGlyph { contours, instructions })
}

fn parse_components(s: &mut Stream) -> Result<Vec<Component>> {
    let mut components = Vec::new();
    loop {
        let flags = ComponentFlags::from_bits_truncate(s.read::<u16>()?);
        let glyph: GlyphId = s.read()?;

        let args = if flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES) {
            if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
                ComponentArgs::Offsets { dx: s.read()?, dy: s.read()? }
            } else {
                ComponentArgs::Offsets {
                    dx: i16::from(s.read::<i8>()?),
                    dy: i16::from(s.read::<i8>()?),
                }
            }
        } else {
            if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
                ComponentArgs::Points { parent: s.read()?, child: s.read()? }
            } else {
                ComponentArgs::Points {
                    parent: u16::from(s.read::<u8>()?),
                    child: u16::from(s.read::<u8>()?),
                }
            }
        };

        let mut transform = Transform::default();
        if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.a = s.read::<F2Dot14>()?.0;
            transform.b = s.read::<F2Dot14>()?.0;
            transform.c = s.read::<F2Dot14>()?.0;
            transform.d = s.read::<F2Dot14>()?.0;
        } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.a = s.read::<F2Dot14>()?.0;
            transform.d = s.read::<F2Dot14>()?.0;
        } else if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            transform.a = s.read::<F2Dot14>()?.0;
            transform.d = transform.a;
        }

        components.push(Component { glyph, transform, args, flags });

        if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
            return Ok(components);
        }
    }
}

fn skip_component_args(s: &mut Stream, flags: ComponentFlags) -> Result<()> {
    let mut skip = if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) { 4 } else { 2 };
    if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
        skip += 8;
    } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
        skip += 4;
    } else if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
        skip += 2;
    }

    s.advance(skip)
}

/// A [Glyph Data Table](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf).
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Glyf {
    /// One entry per glyph ID.
    pub glyphs: Vec<Glyph>,
}

impl Glyf {
    /// Slices the table into per-glyph bodies using `loca` offsets.
    pub fn parse(data: &[u8], loca: &[u32]) -> Result<Self> {
        let mut glyphs = Vec::with_capacity(loca.len().saturating_sub(1));
        for pair in loca.windows(2) {
            let (start, end) = (pair[0] as usize, pair[1] as usize);
            let body = data.get(start..end).ok_or(Error::UnexpectedEof {
                subsystem: "glyf",
                offset: start,
            })?;
            glyphs.push(Glyph::new(body.to_vec()));
        }

        Ok(Glyf { glyphs })
    }

    /// The number of glyphs.
    #[inline]
    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// Returns a glyph by ID.
    #[inline]
    pub fn glyph(&self, glyph_id: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(usize::from(glyph_id.0))
    }

    /// Serializes the table, returning the body and fresh `loca`
    /// offsets. Bodies are zero-padded to 2-byte alignment.
    pub fn encode(&self) -> (Vec<u8>, Vec<u32>) {
        let mut w = Writer::new();
        let mut offsets = Vec::with_capacity(self.glyphs.len() + 1);
        for glyph in &self.glyphs {
            offsets.push(w.len() as u32);
            w.write_bytes(&glyph.data);
            if w.len() % 2 != 0 {
                w.write_u8(0);
            }
        }
        offsets.push(w.len() as u32);
        (w.into_bytes(), offsets)
    }

    /// The union of all glyph header bounding boxes.
    pub fn bbox(&self) -> Result<Rect> {
        let mut rect: Option<Rect> = None;
        for glyph in &self.glyphs {
            if let Some(bbox) = glyph.bbox()? {
                rect = Some(match rect {
                    None => bbox,
                    Some(r) => Rect {
                        x_min: r.x_min.min(bbox.x_min),
                        y_min: r.y_min.min(bbox.y_min),
                        x_max: r.x_max.max(bbox.x_max),
                        y_max: r.y_max.max(bbox.y_max),
                    },
                });
            }
        }

        Ok(rect.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single triangle contour with 2-byte coordinates.
    fn simple_glyph() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x00, 0x01]); // numberOfContours: 1
        data.extend_from_slice(&[0x00, 0x00]); // xMin
        data.extend_from_slice(&[0x00, 0x00]); // yMin
        data.extend_from_slice(&[0x00, 0x64]); // xMax: 100
        data.extend_from_slice(&[0x00, 0x64]); // yMax: 100
        data.extend_from_slice(&[0x00, 0x02]); // endPtsOfContours: [2]
        data.extend_from_slice(&[0x00, 0x00]); // instructionLength: 0
        data.extend_from_slice(&[0x01, 0x01, 0x01]); // flags: on-curve x3
        data.extend_from_slice(&[0x00, 0x00]); // x [0]: 0
        data.extend_from_slice(&[0x00, 0x64]); // x [1]: +100
        data.extend_from_slice(&[0xFF, 0xCE]); // x [2]: -50
        data.extend_from_slice(&[0x00, 0x00]); // y [0]: 0
        data.extend_from_slice(&[0x00, 0x00]); // y [1]: 0
        data.extend_from_slice(&[0x00, 0x64]); // y [2]: +100
        data
    }

    #[test]
    fn decode_simple() {
        let glyph = Glyph::new(simple_glyph());
        match glyph.kind().unwrap() {
            GlyphKind::Simple(simple) => {
                assert_eq!(simple.contours.len(), 1);
                let points = &simple.contours[0];
                assert_eq!(points[0], Point { x: 0, y: 0, on_curve: true });
                assert_eq!(points[1], Point { x: 100, y: 0, on_curve: true });
                assert_eq!(points[2], Point { x: 50, y: 100, on_curve: true });
            }
            other => panic!("expected a simple glyph, got {:?}", other),
        }

        assert_eq!(
            glyph.bbox().unwrap(),
            Some(Rect { x_min: 0, y_min: 0, x_max: 100, y_max: 100 })
        );
    }

    #[test]
    fn decode_repeat_flags_and_short_coords() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x00, 0x01]); // numberOfContours: 1
        data.extend_from_slice(&[0u8; 8]); // bbox
        data.extend_from_slice(&[0x00, 0x03]); // endPtsOfContours: [3]
        data.extend_from_slice(&[0x00, 0x00]); // instructionLength: 0
        // One flag byte with repeat: on-curve | x-short | y-short |
        // repeat | x-positive | y-positive, repeated 3 more times.
        data.extend_from_slice(&[0x3F, 0x03]);
        data.extend_from_slice(&[10, 10, 10, 10]); // x deltas
        data.extend_from_slice(&[1, 1, 1, 1]); // y deltas

        let glyph = Glyph::new(data);
        match glyph.kind().unwrap() {
            GlyphKind::Simple(simple) => {
                let points = &simple.contours[0];
                assert_eq!(points.len(), 4);
                assert_eq!(points[3], Point { x: 40, y: 4, on_curve: true });
            }
            other => panic!("expected a simple glyph, got {:?}", other),
        }
    }

    #[test]
    fn excess_bytes_rejected() {
        let mut data = simple_glyph();
        data.extend_from_slice(&[0xAA; 4]);
        assert!(Glyph::new(data).kind().is_err());
    }

    #[test]
    fn truncated_coords_rejected() {
        let mut data = simple_glyph();
        data.truncate(data.len() - 2);
        assert!(Glyph::new(data).kind().is_err());
    }

    fn composite_glyph(child: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xFF, 0xFF]); // numberOfContours: -1
        data.extend_from_slice(&[0u8; 8]); // bbox
        data.extend_from_slice(&[0x00, 0x03]); // flags: words | xy values
        data.extend_from_slice(&child.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x05]); // dx: 5
        data.extend_from_slice(&[0xFF, 0xFB]); // dy: -5
        data
    }

    #[test]
    fn decode_composite() {
        let glyph = Glyph::new(composite_glyph(7));
        match glyph.kind().unwrap() {
            GlyphKind::Composite(components) => {
                assert_eq!(components.len(), 1);
                assert_eq!(components[0].glyph, GlyphId(7));
                assert_eq!(components[0].args, ComponentArgs::Offsets { dx: 5, dy: -5 });
                assert_eq!(components[0].transform, Transform::default());
            }
            other => panic!("expected a composite glyph, got {:?}", other),
        }

        assert_eq!(glyph.component_glyphs().unwrap(), vec![GlyphId(7)]);
    }

    #[test]
    fn remap_components_patches_in_place() {
        let mut glyph = Glyph::new(composite_glyph(7));
        let mut map = HashMap::new();
        map.insert(GlyphId(7), GlyphId(2));
        glyph.remap_components(&map).unwrap();
        assert_eq!(glyph.component_glyphs().unwrap(), vec![GlyphId(2)]);

        // Only the glyph index changed.
        let original = composite_glyph(7);
        assert_eq!(&glyph.data()[..12], &original[..12]);
        assert_eq!(&glyph.data()[14..], &original[14..]);
    }

    #[test]
    fn remap_unknown_component_fails() {
        let mut glyph = Glyph::new(composite_glyph(7));
        assert!(glyph.remap_components(&HashMap::new()).is_err());
    }

    #[test]
    fn table_slicing_and_encode() {
        let body = simple_glyph();
        let mut table_data = body.clone();
        table_data.push(0); // 2-byte alignment
        let loca = vec![0, 0, body.len() as u32];

        let glyf = Glyf::parse(&table_data, &loca).unwrap();
        assert_eq!(glyf.num_glyphs(), 2);
        assert!(glyf.glyphs[0].is_empty());
        assert!(!glyf.glyphs[1].is_empty());

        let (encoded, offsets) = glyf.encode();
        assert_eq!(offsets, vec![0, 0, body.len() as u32 + 1]);
        assert_eq!(&encoded[..body.len()], &body[..]);
    }
}
