//! Skeletal animation for skinned meshes.
//!
//! A [`SourceAnimation`] (keyframes plus the bind hierarchy) is validated into an
//! [`AnimationClip`] against the model's [`BoneIndexTable`]. Any number of
//! [`AnimationPlayer`]s can then share the clip, each advancing its own clock and
//! filling its own array of skinning matrices.

mod values;
pub mod keyframe;
pub mod track;
pub mod hierarchy;
pub mod bone_table;
pub mod source;
pub mod settings;
pub mod clip;
pub mod pose;
pub mod player;
pub mod compression;

pub use values::Interpolatable;
pub use keyframe::{KeyframeCursor, KeyframeTrack};
pub use track::{BoneTrack, TrackCursor};
pub use hierarchy::{HierarchyNode, NodeId, SkeletonHierarchy, SkeletonNode};
pub use bone_table::{BindOffset, BoneBindInfo, BoneIndexTable, BoneLookup, SharedBoneIndexTable};
pub use source::{SourceAnimation, SourceChannel, SourceKey};
pub use settings::{AnimationSettings, MAX_BONES, TickRatePolicy};
pub use clip::AnimationClip;
pub use pose::{Pose, evaluate};
pub use player::{AnimationPlayer, PlaybackState};
pub use compression::{CompressedKey, CompressedTrack, QuantizationSettings};
