use std::path::Path;

use glam::UVec3;
use voxmarch_vox::VoxModel;

use super::error::VolumeError;
use super::fill::FillRule;
use super::palette::Palette;

/// Dense voxel grid of palette indices plus the palette they address.
///
/// Cells are stored flat in `z`-major order: cell `(x, y, z)` lives at
/// `z * size.y * size.x + y * size.x + x`. Index 0 means "empty".
///
/// Built once at load time and read-only while rendering, apart from
/// explicit [`VoxelVolume::set`] edits.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelVolume {
    size: UVec3,
    indices: Vec<u8>,
    palette: Palette,
}

impl VoxelVolume {
    /// Creates an all-empty volume.
    pub fn new(size: UVec3) -> Result<Self, VolumeError> {
        if size.cmpeq(UVec3::ZERO).any() {
            return Err(VolumeError::InvalidSize(size.to_array()));
        }
        let len = size.x as usize * size.y as usize * size.z as usize;
        Ok(Self {
            size,
            indices: vec![0; len],
            palette: Palette::default(),
        })
    }

    /// Builds a volume by asking `rule` for every cell.
    pub fn build(size: UVec3, rule: &mut impl FillRule) -> Result<Self, VolumeError> {
        let mut volume = Self::new(size)?;
        let mut i = 0;
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    volume.indices[i] = rule.index_at(UVec3::new(x, y, z), size);
                    i += 1;
                }
            }
        }
        Ok(volume)
    }

    /// Reads and imports a `.vox` model file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, VolumeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| VolumeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = voxmarch_vox::parse_bytes(&bytes).map_err(|source| VolumeError::Format {
            path: path.to_path_buf(),
            source,
        })?;

        let volume = Self::from_vox(&model);
        log::info!(
            "loaded {} ({}x{}x{}, {} occupied cells)",
            path.display(),
            volume.size.x,
            volume.size.y,
            volume.size.z,
            volume.occupied_count(),
        );
        Ok(volume)
    }

    /// Imports a parsed `.vox` model.
    ///
    /// The file is Z-up; the engine is Y-up. File axes map as
    /// `x -> size.x - 1 - x` (mirrored), `y -> z`, `z -> y`, so the engine
    /// extent is `(file.x, file.z, file.y)`. Voxels outside the declared
    /// extent are dropped.
    ///
    /// Any palette embedded in the file is not read; the default palette is used.
    pub fn from_vox(model: &VoxModel) -> Self {
        let [fx, fy, fz] = model.size;
        let size = UVec3::new(fx, fz, fy);
        let len = size.x as usize * size.y as usize * size.z as usize;
        let mut volume = Self {
            size,
            indices: vec![0; len],
            palette: Palette::default(),
        };

        let mut dropped = 0usize;
        for v in &model.voxels {
            if !model.contains(v) {
                dropped += 1;
                continue;
            }
            let x = fx - 1 - v.x as u32;
            let y = v.z as u32;
            let z = v.y as u32;
            volume.set(x, y, z, v.color_index);
        }
        if dropped > 0 {
            log::warn!("dropped {dropped} voxels outside the model extent");
        }

        volume
    }

    #[inline]
    pub fn size(&self) -> UVec3 {
        self.size
    }

    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Flat index of `(x, y, z)`, or `None` outside the grid.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        let (sx, sy) = (self.size.x as usize, self.size.y as usize);
        Some(z as usize * sy * sx + y as usize * sx + x as usize)
    }

    /// Palette index at `(x, y, z)`; out-of-range cells read as empty.
    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> u8 {
        self.index_of(x, y, z).map_or(0, |i| self.indices[i])
    }

    /// Writes one cell. Returns `false` (and changes nothing) outside the grid.
    pub fn set(&mut self, x: u32, y: u32, z: u32, index: u8) -> bool {
        match self.index_of(x, y, z) {
            Some(i) => {
                self.indices[i] = index;
                true
            }
            None => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i != 0).count()
    }

    /// Packs the indices four to a little-endian `u32`, zero-padded, for a
    /// storage buffer (WGSL has no byte arrays).
    pub fn packed_words(&self) -> Vec<u32> {
        self.indices
            .chunks(4)
            .map(|c| {
                let mut b = [0u8; 4];
                b[..c.len()].copy_from_slice(c);
                u32::from_le_bytes(b)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use voxmarch_vox::Voxel;

    use super::*;
    use crate::volume::SphereShell;

    fn sphere_scene() -> VoxelVolume {
        let mut rule = SphereShell::new(Vec3::splat(16.0), 14.0, 7);
        VoxelVolume::build(UVec3::splat(32), &mut rule).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            VoxelVolume::new(UVec3::new(4, 0, 4)),
            Err(VolumeError::InvalidSize([4, 0, 4]))
        ));
    }

    #[test]
    fn new_volume_is_empty() {
        let v = VoxelVolume::new(UVec3::new(3, 4, 5)).unwrap();
        assert_eq!(v.indices().len(), 60);
        assert_eq!(v.occupied_count(), 0);
    }

    #[test]
    fn flat_index_is_z_major() {
        let v = VoxelVolume::new(UVec3::new(3, 4, 5)).unwrap();
        assert_eq!(v.index_of(1, 2, 3), Some(3 * 4 * 3 + 2 * 3 + 1));
        assert_eq!(v.index_of(3, 0, 0), None);
    }

    #[test]
    fn build_visits_cells_in_flat_order() {
        let mut next = 0u8;
        let v = VoxelVolume::build(UVec3::new(2, 2, 2), &mut |_c: UVec3, _s: UVec3| {
            next += 1;
            next
        })
        .unwrap();
        assert_eq!(v.indices(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(v.get(1, 0, 0), 2);
        assert_eq!(v.get(0, 1, 0), 3);
        assert_eq!(v.get(0, 0, 1), 5);
    }

    // ── procedural sphere scene ───────────────────────────────────────────

    #[test]
    fn sphere_center_is_filled() {
        assert_ne!(sphere_scene().get(16, 16, 16), 0);
    }

    #[test]
    fn floor_corner_is_filled() {
        assert_ne!(sphere_scene().get(0, 0, 0), 0);
    }

    #[test]
    fn interior_cell_outside_sphere_is_empty() {
        // |(5,5,5) - (16,16,16)| ≈ 19.05 > 14, and not on the floor or far walls.
        assert_eq!(sphere_scene().get(5, 5, 5), 0);
    }

    #[test]
    fn occupancy_matches_geometric_predicate() {
        let size = UVec3::splat(32);
        let v = sphere_scene();
        let shell = SphereShell::new(Vec3::splat(16.0), 14.0, 0);
        for z in 0..32 {
            for y in 0..32 {
                for x in 0..32 {
                    let c = UVec3::new(x, y, z);
                    let expected = shell.in_sphere(c) || SphereShell::on_shell(c, size);
                    assert_eq!(v.get(x, y, z) != 0, expected, "cell {c}");
                }
            }
        }
    }

    #[test]
    fn same_seed_same_colors() {
        assert_eq!(sphere_scene(), sphere_scene());
    }

    // ── edits ─────────────────────────────────────────────────────────────

    #[test]
    fn out_of_range_reads_empty_and_writes_fail() {
        let mut v = VoxelVolume::new(UVec3::splat(2)).unwrap();
        assert_eq!(v.get(5, 0, 0), 0);
        assert!(!v.set(0, 2, 0, 9));
        assert!(v.set(1, 1, 1, 9));
        assert_eq!(v.get(1, 1, 1), 9);
    }

    #[test]
    fn packed_words_are_little_endian_and_padded() {
        let mut v = VoxelVolume::new(UVec3::new(5, 1, 1)).unwrap();
        for (x, i) in [(0, 1u8), (1, 2), (2, 3), (3, 4), (4, 5)] {
            v.set(x, 0, 0, i);
        }
        assert_eq!(v.packed_words(), vec![0x0403_0201, 0x0000_0005]);
    }

    // ── .vox import ───────────────────────────────────────────────────────

    #[test]
    fn vox_import_mirrors_x_and_swaps_y_z() {
        let model = VoxModel {
            version: 150,
            size: [2, 2, 2],
            voxels: vec![Voxel { x: 0, y: 0, z: 0, color_index: 5 }],
        };
        let v = VoxelVolume::from_vox(&model);
        assert_eq!(v.size(), UVec3::new(2, 2, 2));
        assert_eq!(v.get(1, 0, 0), 5);
        assert_eq!(v.indices()[1], 5);
        assert_eq!(v.occupied_count(), 1);
    }

    #[test]
    fn vox_import_uses_file_z_as_height() {
        let model = VoxModel {
            version: 150,
            size: [4, 3, 2],
            voxels: vec![Voxel { x: 1, y: 2, z: 1, color_index: 77 }],
        };
        let v = VoxelVolume::from_vox(&model);
        assert_eq!(v.size(), UVec3::new(4, 2, 3));
        assert_eq!(v.get(2, 1, 2), 77);
    }

    #[test]
    fn vox_import_drops_out_of_extent_voxels() {
        let model = VoxModel {
            version: 150,
            size: [2, 2, 2],
            voxels: vec![
                Voxel { x: 9, y: 0, z: 0, color_index: 1 },
                Voxel { x: 0, y: 1, z: 1, color_index: 2 },
            ],
        };
        let v = VoxelVolume::from_vox(&model);
        assert_eq!(v.occupied_count(), 1);
        assert_eq!(v.get(1, 1, 1), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = VoxelVolume::load_from_file("/nonexistent/model.vox").unwrap_err();
        assert!(matches!(err, VolumeError::Io { .. }));
        assert!(err.to_string().contains("model.vox"));
    }

    #[test]
    fn bad_magic_file_is_a_format_error() {
        let path = std::env::temp_dir().join("voxmarch-bad-magic.vox");
        std::fs::write(&path, b"NOPE\x96\0\0\0").unwrap();
        let err = VoxelVolume::load_from_file(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            err,
            VolumeError::Format { source: voxmarch_vox::FormatError::BadMagic(_), .. }
        ));
    }

    #[test]
    fn valid_file_round_trips_through_disk() {
        let mut bytes = b"VOX ".to_vec();
        bytes.extend_from_slice(&150i32.to_le_bytes());
        bytes.extend_from_slice(b"MAIN");
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&44i32.to_le_bytes());
        bytes.extend_from_slice(b"SIZE");
        bytes.extend_from_slice(&12i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        for n in [2i32, 2, 2] {
            bytes.extend_from_slice(&n.to_le_bytes());
        }
        bytes.extend_from_slice(b"XYZI");
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 5]);

        let path = std::env::temp_dir().join("voxmarch-minimal.vox");
        std::fs::write(&path, &bytes).unwrap();
        let v = VoxelVolume::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        let v = v.unwrap();
        assert_eq!(v.size(), UVec3::splat(2));
        assert_eq!(v.get(1, 0, 0), 5);
        assert_eq!(v.occupied_count(), 1);
    }
}
