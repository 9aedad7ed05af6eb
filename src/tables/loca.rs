// https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use crate::parser::Stream;
use crate::tables::head::IndexToLocationFormat;
use crate::writer::Writer;
use crate::{Error, Result};

/// Parses the `loca` table into `num_glyphs + 1` byte offsets into
/// `glyf`.
///
/// Offsets must be non-decreasing; short-format values are stored
/// halved on disk.
pub fn parse(data: &[u8], num_glyphs: u16, format: IndexToLocationFormat) -> Result<Vec<u32>> {
    let count = usize::from(num_glyphs) + 1;
    let mut s = Stream::new(data, "loca");
    let offsets: Vec<u32> = match format {
        IndexToLocationFormat::Short => {
            s.read_vec::<u16>(count)?.into_iter().map(|n| u32::from(n) * 2).collect()
        }
        IndexToLocationFormat::Long => s.read_vec::<u32>(count)?,
    };

    for pair in offsets.windows(2) {
        if pair[1] < pair[0] {
            return Err(Error::InvalidFont { subsystem: "loca", reason: "unsorted offsets" });
        }
    }

    Ok(offsets)
}

/// Serializes offsets in the given format.
///
/// Short-format offsets must be even and below `2 * 65535`; the caller
/// picks the format accordingly.
pub fn encode(offsets: &[u32], format: IndexToLocationFormat, w: &mut Writer) -> Result<()> {
    match format {
        IndexToLocationFormat::Short => {
            for &offset in offsets {
                if offset % 2 != 0 || offset / 2 > u32::from(u16::MAX) {
                    return Err(Error::ValueOutOfRange {
                        subsystem: "loca",
                        what: "offset in short format",
                    });
                }
                w.write_u16((offset / 2) as u16);
            }
        }
        IndexToLocationFormat::Long => {
            for &offset in offsets {
                w.write_u32(offset);
            }
        }
    }

    Ok(())
}

/// The cheapest format able to address `glyf_len` bytes.
pub fn pick_format(glyf_len: usize) -> IndexToLocationFormat {
    if glyf_len <= 2 * 65535 {
        IndexToLocationFormat::Short
    } else {
        IndexToLocationFormat::Long
    }
}
