//! Skeleton & Bone Table Tests
//!
//! Tests for:
//! - Parent-before-child propagation of local transforms
//! - Inverse bind offset composition
//! - Bone index stability across clips sharing one table
//! - Pass-through nodes and nodes without bind entries
//! - Duplicate node names
//! - Bind offset decomposition (scale discarded)

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use armature::animation::pose::{Pose, evaluate};
use armature::{
    AnimationClip, AnimationSettings, BindOffset, BoneIndexTable, RigidTransform,
    SkeletonHierarchy, SkeletonNode, SourceAnimation, SourceChannel,
};

const EPSILON: f32 = 1e-5;

fn translation_of(m: Mat4) -> Vec3 {
    m.w_axis.truncate()
}

fn assert_translation(m: Mat4, expected: Vec3, what: &str) {
    let t = translation_of(m);
    assert!(
        t.abs_diff_eq(expected, EPSILON),
        "{what}: expected translation {expected:?}, got {t:?}"
    );
}

fn still(name: &str, position: Vec3) -> SourceChannel {
    SourceChannel::new(name)
        .with_position_key(0.0, position)
        .with_rotation_key(0.0, Quat::IDENTITY)
}

fn build(source: &SourceAnimation, table: &mut BoneIndexTable) -> AnimationClip {
    AnimationClip::build(source, table, &AnimationSettings::default()).unwrap()
}

// ============================================================================
// Hierarchical propagation
// ============================================================================

#[test]
fn child_composes_with_parent_translation() {
    let source = SourceAnimation::new(
        "Reach",
        10.0,
        25.0,
        SkeletonNode::new("Root").with_child(SkeletonNode::new("Child")),
    )
    .with_channel(still("Root", Vec3::new(1.0, 0.0, 0.0)))
    .with_channel(still("Child", Vec3::new(0.0, 1.0, 0.0)));

    let mut table = BoneIndexTable::new();
    let clip = build(&source, &mut table);

    let mut out = vec![Mat4::IDENTITY; 4];
    evaluate(&clip, 0.0, &table, &mut out);

    let child = table.index_of("Child").unwrap();
    let root = table.index_of("Root").unwrap();
    assert_translation(out[child], Vec3::new(1.0, 1.0, 0.0), "Child");
    assert_translation(out[root], Vec3::new(1.0, 0.0, 0.0), "Root");
}

#[test]
fn parent_rotation_carries_child_offset() {
    let source = SourceAnimation::new(
        "Turn",
        1.0,
        1.0,
        SkeletonNode::new("Root").with_child(SkeletonNode::new("Arm")),
    )
    .with_channel(
        SourceChannel::new("Root")
            .with_position_key(0.0, Vec3::ZERO)
            .with_rotation_key(0.0, Quat::from_rotation_z(FRAC_PI_2)),
    )
    .with_channel(still("Arm", Vec3::new(2.0, 0.0, 0.0)));

    let mut table = BoneIndexTable::new();
    let clip = build(&source, &mut table);
    let mut out = vec![Mat4::IDENTITY; 2];
    evaluate(&clip, 0.0, &clip, &mut out);

    // +X rotated 90° about Z lands on +Y
    assert_translation(out[table.index_of("Arm").unwrap()], Vec3::new(0.0, 2.0, 0.0), "Arm");
}

#[test]
fn bind_offset_cancels_model_translation() {
    let mut table = BoneIndexTable::new();
    table.seed(&BindOffset::new("Bone", Vec3::new(-2.0, 0.0, 0.0), Quat::IDENTITY));

    let source = SourceAnimation::new("Hold", 5.0, 1.0, SkeletonNode::new("Bone"))
        .with_channel(still("Bone", Vec3::new(2.0, 0.0, 0.0)));
    let clip = build(&source, &mut table);

    let mut out = vec![Mat4::IDENTITY; 1];
    evaluate(&clip, 0.0, &clip, &mut out);
    assert_translation(out[0], Vec3::ZERO, "Bone");
}

#[test]
fn untracked_nodes_pass_their_rest_transform_through() {
    let root = SkeletonNode::new("Armature")
        .with_rest(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY)
        .with_child(
            SkeletonNode::new("Helper")
                .with_rest(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY)
                .with_child(SkeletonNode::new("Hand")),
        );
    let source = SourceAnimation::new("Wave", 4.0, 1.0, root)
        .with_channel(still("Hand", Vec3::new(0.0, 3.0, 0.0)));

    let mut table = BoneIndexTable::new();
    let clip = build(&source, &mut table);
    assert_eq!(table.len(), 1, "Only channels are registered");
    assert!(!table.contains("Helper"));

    let mut out = vec![Mat4::IDENTITY; 1];
    evaluate(&clip, 1.0, &table, &mut out);
    assert_translation(out[0], Vec3::new(1.0, 3.0, 5.0), "Hand");
}

#[test]
fn seeded_bone_without_track_still_writes_its_slot() {
    let mut table = BoneIndexTable::new();
    table.seed(&BindOffset::new("Tail", Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY));

    let root = SkeletonNode::new("Root")
        .with_child(SkeletonNode::new("Tail").with_rest(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY));
    let source = SourceAnimation::new("Idle", 2.0, 1.0, root)
        .with_channel(still("Root", Vec3::new(4.0, 0.0, 0.0)));
    let clip = build(&source, &mut table);

    let mut out = vec![Mat4::from_scale(Vec3::splat(9.0)); 2];
    evaluate(&clip, 0.0, &clip, &mut out);
    assert_translation(out[table.index_of("Tail").unwrap()], Vec3::new(4.0, 0.0, 0.0), "Tail");
}

#[test]
fn pose_keeps_model_matrices_per_node() {
    let hierarchy = SkeletonHierarchy::new(
        SkeletonNode::new("A")
            .with_rest(Vec3::X, Quat::IDENTITY)
            .with_child(SkeletonNode::new("B").with_rest(Vec3::Y, Quat::IDENTITY)),
    );
    let source = SourceAnimation::new("Rest", 1.0, 1.0, hierarchy.root().clone());
    let clip = build(&source, &mut BoneIndexTable::new());

    let mut pose = Pose::new();
    pose.sample(&clip, 0.0, &mut []);
    pose.local_to_model(clip.hierarchy());

    let b = clip.hierarchy().find_by_name("B").unwrap();
    assert_eq!(pose.locals().len(), 2);
    assert_translation(pose.model_matrix(b).unwrap(), Vec3::new(1.0, 1.0, 0.0), "B");
}

// ============================================================================
// Bone index table
// ============================================================================

#[test]
fn shared_bone_keeps_its_index_across_clips() {
    let mut table = BoneIndexTable::new();

    let walk = SourceAnimation::new(
        "Walk",
        30.0,
        30.0,
        SkeletonNode::new("Hips").with_child(SkeletonNode::new("Spine")),
    )
    .with_channel(still("Hips", Vec3::ZERO))
    .with_channel(still("Spine", Vec3::Y));

    let wave = SourceAnimation::new(
        "Wave",
        12.0,
        24.0,
        SkeletonNode::new("Root")
            .with_child(SkeletonNode::new("Spine").with_child(SkeletonNode::new("Hand"))),
    )
    .with_channel(still("Hand", Vec3::X))
    .with_channel(still("Spine", Vec3::Y));

    let walk_clip = build(&walk, &mut table);
    let spine = table.index_of("Spine").unwrap();
    let wave_clip = build(&wave, &mut table);

    assert_eq!(table.index_of("Spine"), Some(spine));
    assert_eq!(walk_clip.track("Spine").unwrap().bone_index(), spine);
    assert_eq!(wave_clip.track("Spine").unwrap().bone_index(), spine);
    assert_eq!(table.index_of("Hand"), Some(2));
    assert_eq!(table.len(), 3);
}

#[test]
fn seed_from_matrix_discards_scale() {
    let inverse_bind = Mat4::from_scale_rotation_translation(
        Vec3::splat(3.0),
        Quat::from_rotation_y(0.5),
        Vec3::new(1.0, 2.0, 3.0),
    );
    let mut table = BoneIndexTable::new();
    let slot = table.seed_from_matrix("Head", inverse_bind);
    assert_eq!(slot, 0);

    let offset: RigidTransform = table.get("Head").unwrap().bind_offset;
    assert!(offset.position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));
    assert!(offset.rotation.angle_between(Quat::from_rotation_y(0.5)) < 1e-3);

    let (scale, _, _) = table.get("Head").unwrap().offset_matrix().to_scale_rotation_translation();
    assert!(scale.abs_diff_eq(Vec3::ONE, 1e-4), "Scale should be dropped, got {scale:?}");
}

// ============================================================================
// Duplicate names
// ============================================================================

#[test]
fn duplicate_names_share_track_and_last_node_owns_slot() {
    let root = SkeletonNode::new("Root")
        .with_child(
            SkeletonNode::new("ArmL")
                .with_rest(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY)
                .with_child(SkeletonNode::new("Hand")),
        )
        .with_child(
            SkeletonNode::new("ArmR")
                .with_rest(Vec3::new(-1.0, 0.0, 0.0), Quat::IDENTITY)
                .with_child(SkeletonNode::new("Hand")),
        );
    let source = SourceAnimation::new("Clap", 1.0, 1.0, root)
        .with_channel(still("Hand", Vec3::new(0.0, 1.0, 0.0)));

    let mut table = BoneIndexTable::new();
    let clip = build(&source, &mut table);
    assert_eq!(clip.duplicate_bone_names(), ["Hand"]);

    let hands = clip.hierarchy().find_all("Hand");
    assert_eq!(hands.len(), 2);
    for &hand in hands {
        assert_eq!(clip.track_index_for_node(hand), Some(0));
    }

    let mut out = vec![Mat4::IDENTITY; 1];
    evaluate(&clip, 0.0, &table, &mut out);
    assert_translation(out[0], Vec3::new(-1.0, 1.0, 0.0), "Hand (last in pre-order)");

    let left = clip.hierarchy().find_by_path("Root/ArmL/Hand").unwrap();
    let mut pose = Pose::new();
    pose.sample(&clip, 0.0, &mut []);
    pose.local_to_model(clip.hierarchy());
    assert_translation(pose.model_matrix(left).unwrap(), Vec3::new(1.0, 1.0, 0.0), "ArmL/Hand");
}
