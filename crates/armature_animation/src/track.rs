use glam::{Quat, Vec3};

use armature_core::{ClipDefect, KeyKind, RigidTransform};

use crate::keyframe::{KeyframeCursor, KeyframeTrack};

/// Per-track playback state kept by each player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCursor {
    pub position: KeyframeCursor,
    pub rotation: KeyframeCursor,
}

/// Animation curve for one bone: position keys lerp, rotation keys slerp.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
    bone_name: String,
    bone_index: usize,
    positions: KeyframeTrack<Vec3>,
    rotations: KeyframeTrack<Quat>,
}

impl BoneTrack {
    /// Builds a track from already-validated key sequences.
    ///
    /// Use [`BoneTrack::try_new`] when the keys come from outside the crate.
    #[must_use]
    pub(crate) fn from_parts(
        bone_name: String,
        bone_index: usize,
        positions: KeyframeTrack<Vec3>,
        rotations: KeyframeTrack<Quat>,
    ) -> Self {
        Self {
            bone_name,
            bone_index,
            positions,
            rotations,
        }
    }

    /// Builds a track, rejecting empty, unordered or non-finite key sequences.
    pub fn try_new(
        bone_name: impl Into<String>,
        bone_index: usize,
        position_keys: &[(f32, Vec3)],
        rotation_keys: &[(f32, Quat)],
    ) -> Result<Self, ClipDefect> {
        let bone_name = bone_name.into();
        let positions = KeyframeTrack::validated(
            &bone_name,
            KeyKind::Position,
            position_keys.iter().map(|(t, _)| *t).collect(),
            position_keys.iter().map(|(_, v)| *v).collect(),
        )?;
        let rotations = KeyframeTrack::validated(
            &bone_name,
            KeyKind::Rotation,
            rotation_keys.iter().map(|(t, _)| *t).collect(),
            rotation_keys.iter().map(|(_, v)| *v).collect(),
        )?;
        Ok(Self::from_parts(bone_name, bone_index, positions, rotations))
    }

    #[inline]
    #[must_use]
    pub fn bone_name(&self) -> &str {
        &self.bone_name
    }

    /// Slot in the bone index table, resolved when the clip was built.
    #[inline]
    #[must_use]
    pub fn bone_index(&self) -> usize {
        self.bone_index
    }

    #[must_use]
    pub fn positions(&self) -> &KeyframeTrack<Vec3> {
        &self.positions
    }

    #[must_use]
    pub fn rotations(&self) -> &KeyframeTrack<Quat> {
        &self.rotations
    }

    /// Time of the last key across both sequences.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        let p = self.positions.last_time().unwrap_or(0.0);
        let r = self.rotations.last_time().unwrap_or(0.0);
        p.max(r)
    }

    /// Interpolated local `(position, rotation)` at `time_in_ticks`.
    ///
    /// Times before the first key hold the first key, times at or past the last
    /// key hold the last one. The rotation is always unit length.
    #[must_use]
    pub fn evaluate_local_transform(&self, time_in_ticks: f32) -> (Vec3, Quat) {
        (
            self.positions.sample(time_in_ticks),
            self.rotations.sample(time_in_ticks),
        )
    }

    /// Same result as [`BoneTrack::evaluate_local_transform`], reusing the
    /// previous frame's key intervals.
    #[inline]
    pub fn evaluate_with_cursor(&self, time_in_ticks: f32, cursor: &mut TrackCursor) -> RigidTransform {
        RigidTransform {
            position: self
                .positions
                .sample_with_cursor(time_in_ticks, &mut cursor.position),
            rotation: self
                .rotations
                .sample_with_cursor(time_in_ticks, &mut cursor.rotation),
        }
    }
}
