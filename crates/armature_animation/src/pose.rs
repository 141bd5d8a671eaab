//! Pose sampling and hierarchical propagation.
//!
//! A frame is evaluated in three passes over the clip's pre-ordered nodes:
//! 1. [`Pose::sample`]: each node's local transform, from its track or its rest
//!    pose
//! 2. [`Pose::local_to_model`]: `model[i] = model[parent] * local[i]`; parents
//!    come first in pre-order, so one forward sweep is enough
//! 3. [`Pose::write_skinning_matrices`]: `model[i] * bind_offset` into the
//!    node's bone slot
//!
//! Nodes without a track pass their rest transform through to descendants, and
//! nodes without a bone slot never write.

use glam::Mat4;

use armature_core::RigidTransform;

use crate::bone_table::BoneLookup;
use crate::clip::AnimationClip;
use crate::hierarchy::{NodeId, SkeletonHierarchy};
use crate::track::TrackCursor;

#[derive(Debug, Clone, Default)]
pub struct Pose {
    locals: Vec<RigidTransform>,
    model: Vec<Mat4>,
}

impl Pose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            locals: vec![RigidTransform::IDENTITY; len],
            model: vec![Mat4::IDENTITY; len],
        }
    }

    fn resize(&mut self, len: usize) {
        self.locals.resize(len, RigidTransform::IDENTITY);
        self.model.resize(len, Mat4::IDENTITY);
    }

    /// Local transforms, indexed by [`NodeId`].
    #[inline]
    #[must_use]
    pub fn locals(&self) -> &[RigidTransform] {
        &self.locals
    }

    /// Model-space matrices from the last [`Pose::local_to_model`].
    #[inline]
    #[must_use]
    pub fn model_matrices(&self) -> &[Mat4] {
        &self.model
    }

    #[inline]
    #[must_use]
    pub fn model_matrix(&self, node: NodeId) -> Option<Mat4> {
        self.model.get(node.index()).copied()
    }

    /// Fills local transforms at `time_in_ticks`, reusing `cursors`
    /// (one per clip track).
    pub fn sample(&mut self, clip: &AnimationClip, time_in_ticks: f32, cursors: &mut [TrackCursor]) {
        let hierarchy = clip.hierarchy();
        self.resize(hierarchy.len());

        for (node, local) in hierarchy.nodes().iter().zip(&mut self.locals) {
            *local = match clip.track_index_for_node(node.id) {
                Some(track_idx) => {
                    let track = &clip.tracks()[track_idx];
                    match cursors.get_mut(track_idx) {
                        Some(cursor) => track.evaluate_with_cursor(time_in_ticks, cursor),
                        None => {
                            let (position, rotation) = track.evaluate_local_transform(time_in_ticks);
                            RigidTransform::new(position, rotation)
                        }
                    }
                }
                None => node.rest,
            };
        }
    }

    /// Composes local transforms down the hierarchy.
    pub fn local_to_model(&mut self, hierarchy: &SkeletonHierarchy) {
        self.resize(hierarchy.len());

        for node in hierarchy.nodes() {
            let i = node.id.index();
            let local = self.locals[i].to_mat4();
            self.model[i] = match node.parent {
                Some(parent) => self.model[parent.index()] * local,
                None => local,
            };
        }
    }

    /// Writes `model * bind_offset` into each bound node's slot of `out`.
    ///
    /// Returns how many bound nodes were skipped because their slot lies beyond
    /// `out`.
    pub fn write_skinning_matrices<L: BoneLookup + ?Sized>(
        &self,
        hierarchy: &SkeletonHierarchy,
        bones: &L,
        out: &mut [Mat4],
    ) -> usize {
        let mut skipped = 0;
        for node in hierarchy.nodes() {
            let Some(info) = bones.bind_info(node) else {
                continue;
            };
            match out.get_mut(info.index) {
                Some(slot) => *slot = self.model[node.id.index()] * info.offset_matrix(),
                None => skipped += 1,
            }
        }
        skipped
    }
}

/// Evaluates `clip` at `time_in_ticks` into `out`, resolving bone slots through
/// `bones` (a [`BoneIndexTable`](crate::bone_table::BoneIndexTable) or the clip
/// itself).
///
/// Stateless: no cursors are kept, every call recomputes the full hierarchy.
pub fn evaluate<L: BoneLookup + ?Sized>(
    clip: &AnimationClip,
    time_in_ticks: f32,
    bones: &L,
    out: &mut [Mat4],
) {
    let mut pose = Pose::with_len(clip.hierarchy().len());
    pose.sample(clip, time_in_ticks, &mut []);
    pose.local_to_model(clip.hierarchy());
    let skipped = pose.write_skinning_matrices(clip.hierarchy(), bones, out);
    if skipped > 0 {
        log::warn!(
            "Clip '{}': {} bones fall outside the {}-slot output",
            clip.name(),
            skipped,
            out.len()
        );
    }
}
