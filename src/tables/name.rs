// https://docs.microsoft.com/en-us/typography/opentype/spec/name

use crate::parser::Stream;
use crate::writer::Writer;
use crate::{Error, Result};

/// Well-known name IDs.
pub mod name_id {
    #![allow(missing_docs)]

    pub const COPYRIGHT: u16 = 0;
    pub const FAMILY: u16 = 1;
    pub const SUBFAMILY: u16 = 2;
    pub const UNIQUE_ID: u16 = 3;
    pub const FULL_NAME: u16 = 4;
    pub const VERSION: u16 = 5;
    pub const POST_SCRIPT_NAME: u16 = 6;
    pub const TRADEMARK: u16 = 7;
}

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

/// One record of the `name` table, with its raw string bytes.
#[derive(Clone, PartialEq, Debug)]
pub struct NameRecord {
    /// Platform ID.
    pub platform_id: u16,
    /// Platform-specific encoding ID.
    pub encoding_id: u16,
    /// Language ID.
    pub language_id: u16,
    /// Name ID. See [`name_id`].
    pub name_id: u16,
    /// The string in its on-disk encoding.
    pub value: Vec<u8>,
}

impl NameRecord {
    /// Decodes the record's string, when the encoding is supported.
    ///
    /// Unicode and Windows strings are UTF-16 BE; Macintosh strings
    /// with encoding 0 are Mac Roman.
    pub fn to_string(&self) -> Option<String> {
        if self.is_unicode() {
            let (text, _, had_errors) = encoding_rs::UTF_16BE.decode(&self.value);
            if had_errors {
                return None;
            }
            Some(text.into_owned())
        } else if self.platform_id == PLATFORM_MACINTOSH && self.encoding_id == 0 {
            let (text, _, _) = encoding_rs::MACINTOSH.decode(&self.value);
            Some(text.into_owned())
        } else {
            None
        }
    }

    fn is_unicode(&self) -> bool {
        self.platform_id == PLATFORM_UNICODE
            || (self.platform_id == PLATFORM_WINDOWS && (self.encoding_id == 1 || self.encoding_id == 10))
    }

    fn sort_key(&self) -> (u16, u16, u16, u16) {
        (self.platform_id, self.encoding_id, self.language_id, self.name_id)
    }
}

/// A [Naming Table](https://docs.microsoft.com/en-us/typography/opentype/spec/name).
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Naming {
    /// All records, in file order.
    pub records: Vec<NameRecord>,
}

impl Naming {
    /// Parses the table. Formats 0 and 1 (the language-tag records of
    /// format 1 are skipped).
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut s = Stream::new(data, "name");
        let format: u16 = s.read()?;
        if format > 1 {
            return Err(Error::NotSupported { subsystem: "name", feature: "table format" });
        }

        let count: u16 = s.read()?;
        let storage_offset: u16 = s.read()?;

        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let platform_id: u16 = s.read()?;
            let encoding_id: u16 = s.read()?;
            let language_id: u16 = s.read()?;
            let name_id: u16 = s.read()?;
            let length: u16 = s.read()?;
            let offset: u16 = s.read()?;

            let start = usize::from(storage_offset) + usize::from(offset);
            let end = start + usize::from(length);
            let value = data
                .get(start..end)
                .ok_or(Error::UnexpectedEof { subsystem: "name", offset: start })?
                .to_vec();

            records.push(NameRecord { platform_id, encoding_id, language_id, name_id, value });
        }

        Ok(Naming { records })
    }

    /// Returns the best record for `name_id`, decoded.
    ///
    /// Windows/Unicode UTF-16 records win over Mac Roman ones.
    pub fn name(&self, name_id: u16) -> Option<String> {
        self.records
            .iter()
            .filter(|r| r.name_id == name_id)
            .find(|r| r.is_unicode())
            .or_else(|| self.records.iter().find(|r| r.name_id == name_id))
            .and_then(|r| r.to_string())
    }

    /// The font family name.
    pub fn family(&self) -> Option<String> {
        self.name(name_id::FAMILY)
    }

    /// The font subfamily (style) name.
    pub fn subfamily(&self) -> Option<String> {
        self.name(name_id::SUBFAMILY)
    }

    /// Serializes the table as format 0 with records sorted by
    /// (platform, encoding, language, name). Identical strings share
    /// storage.
    pub fn encode(&self, w: &mut Writer) {
        let mut sorted: Vec<&NameRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.sort_key());

        let mut storage: Vec<u8> = Vec::new();
        let mut offsets = Vec::with_capacity(sorted.len());
        for record in &sorted {
            let offset = find_subslice(&storage, &record.value).unwrap_or_else(|| {
                let at = storage.len();
                storage.extend_from_slice(&record.value);
                at
            });
            offsets.push(offset as u16);
        }

        w.write_u16(0); // format
        w.write_u16(sorted.len() as u16);
        w.write_u16(6 + 12 * sorted.len() as u16); // storage offset

        for (record, offset) in sorted.iter().zip(offsets) {
            w.write_u16(record.platform_id);
            w.write_u16(record.encoding_id);
            w.write_u16(record.language_id);
            w.write_u16(record.name_id);
            w.write_u16(record.value.len() as u16);
            w.write_u16(offset);
        }

        w.write_bytes(&storage);
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack.windows(needle.len()).position(|window| window == needle)
}
