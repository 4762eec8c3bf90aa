use std::fmt;

/// A format error from the `.vox` reader.
///
/// Every variant is fatal for the load call that produced it; the reader
/// never substitutes a fallback model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The file does not start with the `VOX ` tag.
    BadMagic([u8; 4]),

    /// The header carries a version this reader does not understand.
    UnsupportedVersion(i32),

    /// A chunk the model needs (`MAIN`, `SIZE`, `XYZI`) was not found.
    MissingChunk(&'static str),

    /// A read ran past the end of the buffer or of the enclosing chunk.
    Truncated {
        /// Byte offset at which the read started.
        offset: usize,
        /// Number of bytes the read needed.
        needed: usize,
    },

    /// A `SIZE` chunk or chunk header carried a non-positive or absurd value.
    InvalidSize {
        offset: usize,
        value: i32,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadMagic(tag) => {
                write!(f, "vox format error: bad magic {:?}, expected \"VOX \"", String::from_utf8_lossy(tag))
            }
            FormatError::UnsupportedVersion(v) => {
                write!(f, "vox format error: unsupported version {v}")
            }
            FormatError::MissingChunk(id) => {
                write!(f, "vox format error: required chunk {id} not found")
            }
            FormatError::Truncated { offset, needed } => {
                write!(f, "vox format error: truncated at byte {offset} ({needed} more bytes needed)")
            }
            FormatError::InvalidSize { offset, value } => {
                write!(f, "vox format error: invalid size {value} at byte {offset}")
            }
        }
    }
}

impl std::error::Error for FormatError {}
