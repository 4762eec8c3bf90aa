//! Reader for the chunked binary **`.vox`** voxel model format.
//!
//! Dependency-free: converters and asset tooling can use it without any
//! engine or GPU code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | `FormatError` |
//! | [`model`] | `VoxModel`, `Voxel` |
//! | [`parser`] | `parse_bytes` entry point |
//! | [`reader`] | `ByteReader`, the bounds-checked cursor |
//!
//! # Quick start
//!
//! ```rust
//! use voxmarch_vox::parse_bytes;
//!
//! let mut bytes = Vec::new();
//! bytes.extend_from_slice(b"VOX ");
//! bytes.extend_from_slice(&150i32.to_le_bytes());
//! bytes.extend_from_slice(b"MAIN");
//! bytes.extend_from_slice(&0i32.to_le_bytes());
//! bytes.extend_from_slice(&40i32.to_le_bytes());
//! bytes.extend_from_slice(b"SIZE");
//! bytes.extend_from_slice(&12i32.to_le_bytes());
//! bytes.extend_from_slice(&0i32.to_le_bytes());
//! for n in [1i32, 1, 1] { bytes.extend_from_slice(&n.to_le_bytes()); }
//! bytes.extend_from_slice(b"XYZI");
//! bytes.extend_from_slice(&4i32.to_le_bytes());
//! bytes.extend_from_slice(&0i32.to_le_bytes());
//! bytes.extend_from_slice(&0i32.to_le_bytes());
//!
//! let model = parse_bytes(&bytes).unwrap();
//! assert_eq!(model.size, [1, 1, 1]);
//! assert!(model.voxels.is_empty());
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod reader;

pub use error::FormatError;
pub use model::{Voxel, VoxModel};
pub use parser::{parse_bytes, MAGIC, SUPPORTED_VERSIONS};

#[cfg(test)]
mod parse_tests {
    use super::*;

    // ── fixtures ──────────────────────────────────────────────────────────

    fn chunk(id: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&(content.len() as i32).to_le_bytes());
        out.extend_from_slice(&(children.len() as i32).to_le_bytes());
        out.extend_from_slice(content);
        out.extend_from_slice(children);
        out
    }

    fn size_chunk(x: i32, y: i32, z: i32) -> Vec<u8> {
        let mut content = Vec::new();
        for n in [x, y, z] {
            content.extend_from_slice(&n.to_le_bytes());
        }
        chunk(b"SIZE", &content, &[])
    }

    fn xyzi_chunk(voxels: &[[u8; 4]]) -> Vec<u8> {
        let mut content = (voxels.len() as i32).to_le_bytes().to_vec();
        for v in voxels {
            content.extend_from_slice(v);
        }
        chunk(b"XYZI", &content, &[])
    }

    fn file(version: i32, children: &[Vec<u8>]) -> Vec<u8> {
        let mut out = b"VOX ".to_vec();
        out.extend_from_slice(&version.to_le_bytes());
        out.extend(chunk(b"MAIN", &[], &children.concat()));
        out
    }

    // ── valid input ───────────────────────────────────────────────────────

    #[test]
    fn minimal_model() {
        let bytes = file(150, &[size_chunk(2, 2, 2), xyzi_chunk(&[[0, 0, 0, 5]])]);
        let model = parse_bytes(&bytes).unwrap();
        assert_eq!(model.version, 150);
        assert_eq!(model.size, [2, 2, 2]);
        assert_eq!(model.voxels, vec![Voxel { x: 0, y: 0, z: 0, color_index: 5 }]);
    }

    #[test]
    fn version_200_is_accepted() {
        let bytes = file(200, &[size_chunk(1, 2, 3), xyzi_chunk(&[])]);
        assert_eq!(parse_bytes(&bytes).unwrap().size, [1, 2, 3]);
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let pack = chunk(b"PACK", &1i32.to_le_bytes(), &[]);
        let rgba = chunk(b"RGBA", &[0xff; 1024], &[]);
        let bytes = file(150, &[pack, size_chunk(4, 4, 4), xyzi_chunk(&[[3, 2, 1, 200]]), rgba]);
        let model = parse_bytes(&bytes).unwrap();
        assert_eq!(model.voxels[0], Voxel { x: 3, y: 2, z: 1, color_index: 200 });
    }

    #[test]
    fn first_model_wins() {
        let bytes = file(
            150,
            &[
                size_chunk(2, 2, 2),
                xyzi_chunk(&[[1, 1, 1, 9]]),
                size_chunk(8, 8, 8),
                xyzi_chunk(&[[7, 7, 7, 1]]),
            ],
        );
        let model = parse_bytes(&bytes).unwrap();
        assert_eq!(model.size, [2, 2, 2]);
        assert_eq!(model.voxels.len(), 1);
    }

    #[test]
    fn color_indices_above_127_are_unsigned() {
        let bytes = file(150, &[size_chunk(1, 1, 1), xyzi_chunk(&[[0, 0, 0, 255]])]);
        assert_eq!(parse_bytes(&bytes).unwrap().voxels[0].color_index, 255);
    }

    // ── rejected input ────────────────────────────────────────────────────

    #[test]
    fn err_wrong_magic() {
        let mut bytes = file(150, &[size_chunk(2, 2, 2), xyzi_chunk(&[])]);
        bytes[..4].copy_from_slice(b"VOXX");
        assert_eq!(parse_bytes(&bytes).unwrap_err(), FormatError::BadMagic(*b"VOXX"));
    }

    #[test]
    fn err_unsupported_version() {
        let bytes = file(42, &[size_chunk(2, 2, 2), xyzi_chunk(&[])]);
        assert_eq!(parse_bytes(&bytes).unwrap_err(), FormatError::UnsupportedVersion(42));
    }

    #[test]
    fn err_missing_main() {
        let mut bytes = b"VOX ".to_vec();
        bytes.extend_from_slice(&150i32.to_le_bytes());
        bytes.extend(size_chunk(2, 2, 2));
        assert_eq!(parse_bytes(&bytes).unwrap_err(), FormatError::MissingChunk("MAIN"));
    }

    #[test]
    fn err_missing_xyzi() {
        let bytes = file(150, &[size_chunk(2, 2, 2)]);
        assert_eq!(parse_bytes(&bytes).unwrap_err(), FormatError::MissingChunk("XYZI"));
    }

    #[test]
    fn err_xyzi_before_size() {
        let bytes = file(150, &[xyzi_chunk(&[[0, 0, 0, 1]]), size_chunk(2, 2, 2)]);
        assert_eq!(parse_bytes(&bytes).unwrap_err(), FormatError::MissingChunk("SIZE"));
    }

    #[test]
    fn err_zero_dimension() {
        let bytes = file(150, &[size_chunk(2, 0, 2), xyzi_chunk(&[])]);
        assert!(matches!(parse_bytes(&bytes).unwrap_err(), FormatError::InvalidSize { value: 0, .. }));
    }

    #[test]
    fn err_voxel_count_overstates_content() {
        let mut xyzi_content = 1000i32.to_le_bytes().to_vec();
        xyzi_content.extend_from_slice(&[0, 0, 0, 1]);
        let bytes = file(150, &[size_chunk(2, 2, 2), chunk(b"XYZI", &xyzi_content, &[])]);
        assert!(matches!(parse_bytes(&bytes).unwrap_err(), FormatError::Truncated { .. }));
    }

    #[test]
    fn err_truncated_file() {
        let bytes = file(150, &[size_chunk(2, 2, 2), xyzi_chunk(&[[0, 0, 0, 1]])]);
        for cut in [3, 7, 12, 30, bytes.len() - 1] {
            assert!(parse_bytes(&bytes[..cut]).is_err(), "cut at {cut} should fail");
        }
    }

    #[test]
    fn error_display_names_the_problem() {
        let msg = FormatError::MissingChunk("XYZI").to_string();
        assert!(msg.contains("XYZI"));
    }
}
