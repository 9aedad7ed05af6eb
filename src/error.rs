use crate::Tag;

/// A list of errors that can occur while reading or writing a font.
///
/// Every variant except [`MissingTable`](Error::MissingTable) carries a
/// *subsystem* tag like `cmap/4` that names the table or subtable where
/// diagnosis originated.
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// A region ended before a structural read completed.
    UnexpectedEof {
        /// The subsystem that was reading.
        subsystem: &'static str,
        /// Byte offset of the failed read, relative to the region start.
        offset: usize,
    },

    /// A structural invariant failed.
    InvalidFont {
        /// The subsystem that detected the violation.
        subsystem: &'static str,
        /// What exactly was violated.
        reason: &'static str,
    },

    /// A well-formed but unimplemented construct.
    NotSupported {
        /// The subsystem that met the construct.
        subsystem: &'static str,
        /// The construct itself.
        feature: &'static str,
    },

    /// A table required by the current operation is absent.
    MissingTable {
        /// The table's tag.
        name: Tag,
    },

    /// A numeric precondition failed on encode.
    ValueOutOfRange {
        /// The subsystem that was encoding.
        subsystem: &'static str,
        /// The offending value.
        what: &'static str,
    },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::UnexpectedEof { subsystem, offset } => {
                write!(f, "{}: unexpected end of data at offset {}", subsystem, offset)
            }
            Error::InvalidFont { subsystem, reason } => {
                write!(f, "{}: invalid font: {}", subsystem, reason)
            }
            Error::NotSupported { subsystem, feature } => {
                write!(f, "{}: unsupported: {}", subsystem, feature)
            }
            Error::MissingTable { name } => {
                write!(f, "required table '{}' is missing", name)
            }
            Error::ValueOutOfRange { subsystem, what } => {
                write!(f, "{}: value out of range: {}", subsystem, what)
            }
        }
    }
}

impl std::error::Error for Error {}

/// A specialized `Result` for font reading and writing.
pub type Result<T> = core::result::Result<T, Error>;
