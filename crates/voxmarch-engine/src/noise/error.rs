use std::fmt;
use std::path::PathBuf;

/// Error returned when building noise layers.
#[derive(Debug)]
pub enum NoiseError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    /// A layer's dimensions differ from the first layer's.
    MismatchedLayer {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// No layers were produced (empty directory, zero layers or zero extent).
    Empty,
}

impl fmt::Display for NoiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseError::Io { path, source } => {
                write!(f, "failed to read noise source {}: {source}", path.display())
            }
            NoiseError::Image { path, source } => {
                write!(f, "failed to decode noise image {}: {source}", path.display())
            }
            NoiseError::MismatchedLayer { path, expected, found } => write!(
                f,
                "noise image {} is {}x{}, expected {}x{}",
                path.display(),
                found.0,
                found.1,
                expected.0,
                expected.1
            ),
            NoiseError::Empty => f.write_str("noise source produced no layers"),
        }
    }
}

impl std::error::Error for NoiseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NoiseError::Io { source, .. } => Some(source),
            NoiseError::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}
