use glam::{Mat4, Quat, Vec3};

/// Translation + rotation pair used for bone rest poses, sampled locals and
/// bind offsets.
///
/// There is no scale component: rigs driven by this crate are translate/rotate
/// only, and scale found in source data is discarded on decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Decomposes an affine matrix, dropping scale and shear.
    #[must_use]
    pub fn from_mat4_discarding_scale(mat: Mat4) -> Self {
        let (_scale, rotation, position) = mat.to_scale_rotation_translation();
        Self {
            position,
            rotation: rotation.normalize(),
        }
    }

    /// `Translation(position) * Rotation(rotation)`: rotate first, then translate.
    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Composes `self * local` without going through matrices.
    #[inline]
    #[must_use]
    pub fn mul_transform(&self, local: &RigidTransform) -> RigidTransform {
        RigidTransform {
            position: self.position + self.rotation * local.position,
            rotation: self.rotation * local.rotation,
        }
    }

    #[must_use]
    pub fn inverse(&self) -> RigidTransform {
        let rotation = self.rotation.inverse();
        RigidTransform {
            position: rotation * -self.position,
            rotation,
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<RigidTransform> for Mat4 {
    fn from(t: RigidTransform) -> Self {
        t.to_mat4()
    }
}
