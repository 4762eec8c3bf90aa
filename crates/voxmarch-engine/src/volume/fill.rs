use glam::{UVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides the palette index of each cell while a volume is being built.
///
/// Called once per cell in `z`, `y`, `x` order. Returning 0 leaves the cell empty.
pub trait FillRule {
    fn index_at(&mut self, cell: UVec3, size: UVec3) -> u8;
}

impl<F> FillRule for F
where
    F: FnMut(UVec3, UVec3) -> u8,
{
    fn index_at(&mut self, cell: UVec3, size: UVec3) -> u8 {
        self(cell, size)
    }
}

/// Synthetic test scene: a solid ball of randomly colored voxels standing in
/// an open box made of the floor (`y == 0`) and the two far walls
/// (`x == size.x - 1`, `z == size.z - 1`).
///
/// Shape is fully determined by `center` and `radius`; only the colors come
/// from the seeded generator.
#[derive(Debug, Clone)]
pub struct SphereShell {
    pub center: Vec3,
    pub radius: f32,
    rng: StdRng,
}

impl SphereShell {
    pub fn new(center: Vec3, radius: f32, seed: u64) -> Self {
        Self {
            center,
            radius,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns whether `cell` lies strictly inside the ball.
    #[inline]
    pub fn in_sphere(&self, cell: UVec3) -> bool {
        cell.as_vec3().distance(self.center) < self.radius
    }

    /// Returns whether `cell` lies on the floor or one of the far walls.
    #[inline]
    pub fn on_shell(cell: UVec3, size: UVec3) -> bool {
        cell.y == 0 || cell.x == size.x - 1 || cell.z == size.z - 1
    }
}

impl FillRule for SphereShell {
    fn index_at(&mut self, cell: UVec3, size: UVec3) -> u8 {
        if self.in_sphere(cell) || Self::on_shell(cell, size) {
            self.rng.gen_range(1..=255)
        } else {
            0
        }
    }
}
