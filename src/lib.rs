#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Skeletal animation sampling and bone-matrix propagation.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use armature::prelude::*;
//!
//! let mut bones = BoneIndexTable::new();
//! bones.seed_all(&skin_offsets);
//!
//! let clip = Arc::new(AnimationClip::build(&walk, &mut bones, &AnimationSettings::default())?);
//! let mut player = AnimationPlayer::with_clip(clip, AnimationSettings::default());
//!
//! player.update(frame_dt);
//! queue.write_buffer(&bone_buffer, 0, player.final_bone_matrices_bytes());
//! ```

pub use armature_animation as animation;

pub use armature_core::{ArmatureError, ClipDefect, KeyKind, Result, RigidTransform};

pub use armature_animation::{
    AnimationClip, AnimationPlayer, AnimationSettings, BindOffset, BoneBindInfo, BoneIndexTable,
    BoneLookup, BoneTrack, CompressedTrack, MAX_BONES, NodeId, PlaybackState, Pose,
    QuantizationSettings, SharedBoneIndexTable, SkeletonHierarchy, SkeletonNode,
    SourceAnimation, SourceChannel, SourceKey, TickRatePolicy, evaluate,
};

pub mod prelude {
    pub use crate::{
        AnimationClip, AnimationPlayer, AnimationSettings, ArmatureError, BindOffset,
        BoneIndexTable, SkeletonNode, SourceAnimation, SourceChannel,
    };
    pub use glam::{Mat4, Quat, Vec3};
}
