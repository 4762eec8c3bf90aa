use std::fmt;
use std::path::PathBuf;

use voxmarch_vox::FormatError;

/// Error returned by volume construction and model loading.
#[derive(Debug)]
pub enum VolumeError {
    /// One of the requested dimensions is zero.
    InvalidSize([u32; 3]),

    /// The model file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The model file was read but is not a valid `.vox` model.
    Format {
        path: PathBuf,
        source: FormatError,
    },
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeError::InvalidSize(s) => {
                write!(f, "invalid volume size {}x{}x{}: every dimension must be > 0", s[0], s[1], s[2])
            }
            VolumeError::Io { path, source } => {
                write!(f, "failed to read model {}: {source}", path.display())
            }
            VolumeError::Format { path, source } => {
                write!(f, "failed to load model {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VolumeError::InvalidSize(_) => None,
            VolumeError::Io { source, .. } => Some(source),
            VolumeError::Format { source, .. } => Some(source),
        }
    }
}
