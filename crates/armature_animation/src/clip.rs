use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use armature_core::{ArmatureError, ClipDefect, KeyKind, Result};

use crate::bone_table::{BoneBindInfo, BoneIndexTable, BoneLookup, SharedBoneIndexTable};
use crate::hierarchy::{HierarchyNode, NodeId, SkeletonHierarchy};
use crate::keyframe::KeyframeTrack;
use crate::settings::{AnimationSettings, TickRatePolicy};
use crate::source::{SourceAnimation, SourceChannel};
use crate::track::BoneTrack;

/// An animation ready for playback.
///
/// Built once per source animation against the skinned model's
/// [`BoneIndexTable`], then shared read-only (typically behind an `Arc`) by any
/// number of players.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration_in_ticks: f32,
    ticks_per_second: f32,
    hierarchy: SkeletonHierarchy,
    tracks: Vec<BoneTrack>,
    track_by_name: FxHashMap<String, usize>,
    // Indexed by NodeId
    node_tracks: Vec<Option<usize>>,
    node_bindings: Vec<Option<BoneBindInfo>>,
}

struct PendingTrack<'a> {
    name: &'a str,
    positions: KeyframeTrack<Vec3>,
    rotations: KeyframeTrack<Quat>,
}

impl AnimationClip {
    /// Validates `source`, registers its channels in `table` and builds the clip.
    ///
    /// The table is only modified when the build succeeds.
    pub fn build(
        source: &SourceAnimation,
        table: &mut BoneIndexTable,
        settings: &AnimationSettings,
    ) -> Result<Self> {
        let malformed = |reason: ClipDefect| ArmatureError::MalformedClip {
            clip: source.name.clone(),
            reason,
        };

        let ticks_per_second = resolve_tick_rate(source, settings).map_err(malformed)?;

        let mut validated = Vec::with_capacity(source.channels.len());
        for channel in &source.channels {
            validated.push(validate_channel(channel).map_err(malformed)?);
        }

        let hierarchy = SkeletonHierarchy::new(source.hierarchy.clone());

        let mut pending: Vec<PendingTrack<'_>> = Vec::with_capacity(validated.len());
        for track in validated {
            if !hierarchy.contains_name(track.name) {
                log::warn!(
                    "Clip '{}': channel '{}' has no matching skeleton node, skipping",
                    source.name,
                    track.name
                );
                continue;
            }
            if pending.iter().any(|p| p.name == track.name) {
                log::warn!(
                    "Clip '{}': duplicate channel '{}', keeping the first one",
                    source.name,
                    track.name
                );
                continue;
            }
            pending.push(track);
        }

        let required = table.len() + table.count_new(pending.iter().map(|p| p.name));
        if required > settings.max_bones {
            return Err(ArmatureError::BoneCapacityExceeded {
                required,
                capacity: settings.max_bones,
            });
        }

        let slots = table.register_channels(pending.iter().map(|p| p.name));

        let mut tracks = Vec::with_capacity(pending.len());
        let mut track_by_name = FxHashMap::default();
        for (track, slot) in pending.into_iter().zip(slots) {
            track_by_name.insert(track.name.to_string(), tracks.len());
            tracks.push(BoneTrack::from_parts(
                track.name.to_string(),
                slot,
                track.positions,
                track.rotations,
            ));
        }

        let node_tracks = hierarchy
            .nodes()
            .iter()
            .map(|node| track_by_name.get(node.name.as_str()).copied())
            .collect();
        let node_bindings = hierarchy
            .nodes()
            .iter()
            .map(|node| table.get(&node.name).copied())
            .collect();

        let clip = Self {
            name: source.name.clone(),
            duration_in_ticks: source.duration_in_ticks,
            ticks_per_second,
            hierarchy,
            tracks,
            track_by_name,
            node_tracks,
            node_bindings,
        };

        log::debug!(
            "Built clip '{}': {} ticks at {} ticks/s, {} tracks, {} nodes, {} bones in table",
            clip.name,
            clip.duration_in_ticks,
            clip.ticks_per_second,
            clip.tracks.len(),
            clip.hierarchy.len(),
            table.len()
        );

        Ok(clip)
    }

    /// Same as [`AnimationClip::build`], holding the shared table's lock for the
    /// whole registration.
    pub fn build_shared(
        source: &SourceAnimation,
        table: &SharedBoneIndexTable,
        settings: &AnimationSettings,
    ) -> Result<Self> {
        let mut guard = table.lock();
        Self::build(source, &mut guard, settings)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn duration_in_ticks(&self) -> f32 {
        self.duration_in_ticks
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration_in_ticks / self.ticks_per_second.abs()
    }

    #[inline]
    #[must_use]
    pub fn hierarchy(&self) -> &SkeletonHierarchy {
        &self.hierarchy
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn track(&self, bone_name: &str) -> Option<&BoneTrack> {
        self.track_by_name.get(bone_name).map(|&i| &self.tracks[i])
    }

    /// Index into [`AnimationClip::tracks`] driving `node`, if any.
    #[inline]
    #[must_use]
    pub fn track_index_for_node(&self, node: NodeId) -> Option<usize> {
        self.node_tracks.get(node.index()).copied().flatten()
    }

    /// Bind entry captured for `node` when the clip was built.
    #[inline]
    #[must_use]
    pub fn binding_for_node(&self, node: NodeId) -> Option<&BoneBindInfo> {
        self.node_bindings.get(node.index()).and_then(Option::as_ref)
    }

    /// Skeleton node names shared by several nodes.
    #[must_use]
    pub fn duplicate_bone_names(&self) -> Vec<&str> {
        self.hierarchy.duplicate_names()
    }
}

/// Evaluating with the clip itself uses the bind entries captured at build time.
impl BoneLookup for AnimationClip {
    #[inline]
    fn bind_info(&self, node: &HierarchyNode) -> Option<&BoneBindInfo> {
        self.binding_for_node(node.id)
    }
}

fn resolve_tick_rate(
    source: &SourceAnimation,
    settings: &AnimationSettings,
) -> std::result::Result<f32, ClipDefect> {
    let duration = source.duration_in_ticks;
    let ticks_per_second = source.ticks_per_second;

    if !duration.is_finite() || !ticks_per_second.is_finite() {
        return Err(ClipDefect::NonFiniteTiming {
            duration,
            ticks_per_second,
        });
    }
    if duration <= 0.0 {
        return Err(ClipDefect::NonPositiveDuration(duration));
    }
    if ticks_per_second == 0.0 {
        return match settings.tick_rate_policy {
            TickRatePolicy::Reject => Err(ClipDefect::ZeroTickRate),
            TickRatePolicy::FallbackToOne => {
                log::warn!(
                    "Clip '{}' declares 0 ticks per second, playing at 1 tick/s",
                    source.name
                );
                Ok(1.0)
            }
        };
    }
    Ok(ticks_per_second)
}

fn validate_channel(channel: &SourceChannel) -> std::result::Result<PendingTrack<'_>, ClipDefect> {
    let name = channel.bone_name.as_str();
    let positions = KeyframeTrack::validated(
        name,
        KeyKind::Position,
        channel.position_keys.iter().map(|k| k.time).collect(),
        channel.position_keys.iter().map(|k| k.value).collect(),
    )?;
    let rotations = KeyframeTrack::validated(
        name,
        KeyKind::Rotation,
        channel.rotation_keys.iter().map(|k| k.time).collect(),
        channel.rotation_keys.iter().map(|k| k.value).collect(),
    )?;
    Ok(PendingTrack {
        name,
        positions,
        rotations,
    })
}
