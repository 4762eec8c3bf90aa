/// One occupied cell as stored in an `XYZI` chunk.
///
/// Coordinates are in the file's native axis order (Z up).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Voxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// Palette index, `1..=255` in well-formed files.
    pub color_index: u8,
}

/// A parsed `.vox` model: grid extent plus the sparse list of occupied cells.
///
/// No axis remapping happens here; consumers decide how to place the
/// file's axes into their own convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxModel {
    /// Header version the model was read from.
    pub version: i32,
    /// Grid extent `[x, y, z]` in file axes; every component is `> 0`.
    pub size: [u32; 3],
    pub voxels: Vec<Voxel>,
}

impl VoxModel {
    /// Returns `true` when `v` lies inside `size`.
    #[inline]
    pub fn contains(&self, v: &Voxel) -> bool {
        (v.x as u32) < self.size[0] && (v.y as u32) < self.size[1] && (v.z as u32) < self.size[2]
    }
}
