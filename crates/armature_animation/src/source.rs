//! Input data handed over by the model/scene loader.
//!
//! These types mirror what a scene importer extracts from a model file: the
//! bind hierarchy, and per clip a list of channels with raw key lists. Nothing
//! here is validated; [`AnimationClip::build`](crate::clip::AnimationClip::build)
//! does that.

use glam::{Quat, Vec3};

use crate::hierarchy::SkeletonNode;

/// One raw keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceKey<T> {
    pub time: f32,
    pub value: T,
}

impl<T> SourceKey<T> {
    #[inline]
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Keys animating one bone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceChannel {
    pub bone_name: String,
    pub position_keys: Vec<SourceKey<Vec3>>,
    pub rotation_keys: Vec<SourceKey<Quat>>,
}

impl SourceChannel {
    #[must_use]
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            position_keys: Vec::new(),
            rotation_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_position_key(mut self, time: f32, position: Vec3) -> Self {
        self.position_keys.push(SourceKey::new(time, position));
        self
    }

    #[must_use]
    pub fn with_rotation_key(mut self, time: f32, rotation: Quat) -> Self {
        self.rotation_keys.push(SourceKey::new(time, rotation));
        self
    }
}

/// One animation as extracted from a scene file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceAnimation {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub duration_in_ticks: f32,
    pub ticks_per_second: f32,
    pub hierarchy: SkeletonNode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: Vec<SourceChannel>,
}

impl SourceAnimation {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        duration_in_ticks: f32,
        ticks_per_second: f32,
        hierarchy: SkeletonNode,
    ) -> Self {
        Self {
            name: name.into(),
            duration_in_ticks,
            ticks_per_second,
            hierarchy,
            channels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: SourceChannel) -> Self {
        self.channels.push(channel);
        self
    }
}
