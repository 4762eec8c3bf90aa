//! Runtime volume edits.

use glam::UVec3;

use voxmarch_engine::volume::{Palette, VoxelVolume};

/// Cell-level access to the displayed volume.
///
/// Only cells and the palette can change; the extent is fixed because the
/// GPU copy is sized once. Tracks whether anything actually changed so the
/// viewer only re-uploads and restarts accumulation when needed.
pub struct VolumeEditor<'a> {
    volume: &'a mut VoxelVolume,
    changed: bool,
}

impl<'a> VolumeEditor<'a> {
    pub fn new(volume: &'a mut VoxelVolume) -> Self {
        Self {
            volume,
            changed: false,
        }
    }

    #[inline]
    pub fn size(&self) -> UVec3 {
        self.volume.size()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> u8 {
        self.volume.get(x, y, z)
    }

    /// Writes one cell. Returns `false` when the cell is out of range.
    pub fn set(&mut self, x: u32, y: u32, z: u32, index: u8) -> bool {
        if self.volume.index_of(x, y, z).is_none() {
            return false;
        }
        if self.volume.get(x, y, z) != index {
            self.volume.set(x, y, z, index);
            self.changed = true;
        }
        true
    }

    pub fn set_palette(&mut self, palette: Palette) {
        if *self.volume.palette() != palette {
            self.volume.set_palette(palette);
            self.changed = true;
        }
    }

    /// Whether any cell or palette entry differs from before the edit.
    #[inline]
    pub fn changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmarch_engine::volume::DEFAULT_PALETTE;

    fn volume() -> VoxelVolume {
        VoxelVolume::new(UVec3::new(4, 3, 2)).unwrap()
    }

    #[test]
    fn writing_a_new_value_marks_changed() {
        let mut v = volume();
        let mut ed = VolumeEditor::new(&mut v);
        assert!(!ed.changed());
        assert!(ed.set(3, 2, 1, 7));
        assert!(ed.changed());
        assert_eq!(ed.get(3, 2, 1), 7);
        assert_eq!(v.get(3, 2, 1), 7);
    }

    #[test]
    fn rewriting_the_same_value_is_not_a_change() {
        let mut v = volume();
        let mut ed = VolumeEditor::new(&mut v);
        assert!(ed.set(0, 0, 0, 0));
        assert!(!ed.changed());
    }

    #[test]
    fn out_of_range_write_is_rejected() {
        let mut v = volume();
        let mut ed = VolumeEditor::new(&mut v);
        assert!(!ed.set(4, 0, 0, 1));
        assert!(!ed.changed());
        assert_eq!(ed.size(), UVec3::new(4, 3, 2));
    }

    #[test]
    fn palette_swap_marks_changed() {
        let mut v = volume();
        let mut ed = VolumeEditor::new(&mut v);
        ed.set_palette(Palette::default());
        assert!(!ed.changed());

        let mut colors = DEFAULT_PALETTE;
        colors[1] = 0xff0000ff;
        ed.set_palette(Palette::new(colors));
        assert!(ed.changed());
        assert_eq!(v.palette().color(1), 0xff0000ff);
    }
}
