//! Key Quantization Tests
//!
//! Tests for:
//! - Compressing clip tracks and rebuilding a clip from the decoded keys
//! - Playback error introduced by 16-bit keys
//! - Out-of-range times and invalid settings
//! - Keys collapsing onto the same quantized time

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use armature::animation::compression::{CompressedKey, CompressedTrack, QuantizationSettings};
use armature::{
    AnimationClip, AnimationSettings, ArmatureError, BoneIndexTable, BoneTrack, SkeletonNode,
    SourceAnimation, SourceChannel,
};

fn swing_channel() -> SourceChannel {
    SourceChannel::new("Arm")
        .with_position_key(0.0, Vec3::new(0.0, 1.5, 0.0))
        .with_position_key(12.0, Vec3::new(3.25, 1.5, -2.0))
        .with_position_key(24.0, Vec3::new(0.0, 1.5, 0.0))
        .with_rotation_key(0.0, Quat::IDENTITY)
        .with_rotation_key(8.0, Quat::from_rotation_z(FRAC_PI_2))
        .with_rotation_key(16.0, Quat::from_rotation_x(-2.5))
        .with_rotation_key(24.0, Quat::IDENTITY)
}

fn swing_source() -> SourceAnimation {
    SourceAnimation::new(
        "Swing",
        24.0,
        24.0,
        SkeletonNode::new("Root").with_child(SkeletonNode::new("Arm")),
    )
    .with_channel(swing_channel())
}

#[test]
fn decoded_clip_plays_back_close_to_the_original() {
    let settings = QuantizationSettings::default();
    let mut table = BoneIndexTable::new();
    let clip = AnimationClip::build(&swing_source(), &mut table, &AnimationSettings::default())
        .unwrap();

    let compressed = CompressedTrack::compress(clip.track("Arm").unwrap(), &settings).unwrap();
    assert_eq!(compressed.bone_name, "Arm");
    assert_eq!(compressed.position_keys.len(), 3);
    assert_eq!(compressed.rotation_keys.len(), 4);

    let mut decoded_source = swing_source();
    decoded_source.channels = vec![compressed.to_source_channel(&settings)];
    let decoded =
        AnimationClip::build(&decoded_source, &mut table, &AnimationSettings::default()).unwrap();

    assert_eq!(
        decoded.track("Arm").unwrap().bone_index(),
        clip.track("Arm").unwrap().bone_index(),
        "Rebuilt clip reuses the bone slot"
    );

    let original = clip.track("Arm").unwrap();
    let restored = decoded.track("Arm").unwrap();
    for i in 0..=48 {
        let t = i as f32 * 0.5;
        let (p0, r0) = original.evaluate_local_transform(t);
        let (p1, r1) = restored.evaluate_local_transform(t);
        assert!(
            p0.distance(p1) < 1e-3,
            "Position drifted at t={t}: {p0:?} vs {p1:?}"
        );
        assert!(
            r0.angle_between(r1) < 1e-2,
            "Rotation drifted at t={t}: {r0:?} vs {r1:?}"
        );
    }
}

#[test]
fn raw_bytes_are_eight_per_key() {
    let track = BoneTrack::try_new(
        "Arm",
        0,
        &[(0.0, Vec3::ZERO), (1.0, Vec3::X)],
        &[(0.0, Quat::IDENTITY)],
    )
    .unwrap();
    let compressed = CompressedTrack::compress(&track, &QuantizationSettings::default()).unwrap();

    assert_eq!(compressed.position_bytes().len(), 2 * 8);
    assert_eq!(compressed.rotation_bytes().len(), 8);

    let keys: &[CompressedKey] = bytemuck::cast_slice(compressed.position_bytes());
    assert_eq!(keys, compressed.position_keys.as_slice());
    assert_eq!(keys[1].time, 24);
}

#[test]
fn times_beyond_the_u16_range_are_rejected() {
    let settings = QuantizationSettings::default();
    let late = settings.max_time() + 10.0;
    let track = BoneTrack::try_new(
        "Arm",
        0,
        &[(0.0, Vec3::ZERO), (late, Vec3::X)],
        &[(0.0, Quat::IDENTITY)],
    )
    .unwrap();

    let err = CompressedTrack::compress(&track, &settings).unwrap_err();
    assert!(matches!(err, ArmatureError::Quantization(_)), "Unexpected error: {err:?}");
}

#[test]
fn invalid_settings_are_rejected() {
    let track = BoneTrack::try_new("Arm", 0, &[(0.0, Vec3::ZERO)], &[(0.0, Quat::IDENTITY)])
        .unwrap();
    let settings = QuantizationSettings {
        position_range: 0.0,
        ..QuantizationSettings::default()
    };
    assert!(matches!(
        CompressedTrack::compress(&track, &settings),
        Err(ArmatureError::Quantization(_))
    ));
}

#[test]
fn colliding_times_keep_the_first_key() {
    let settings = QuantizationSettings {
        time_resolution: 1.0,
        ..QuantizationSettings::default()
    };
    let track = BoneTrack::try_new(
        "Arm",
        0,
        &[
            (0.0, Vec3::ZERO),
            (0.2, Vec3::splat(5.0)),
            (1.0, Vec3::X),
        ],
        &[(0.0, Quat::IDENTITY)],
    )
    .unwrap();

    let compressed = CompressedTrack::compress(&track, &settings).unwrap();
    let times: Vec<u16> = compressed.position_keys.iter().map(|k| k.time).collect();
    assert_eq!(times, [0, 1]);

    let channel = compressed.to_source_channel(&settings);
    assert!(channel.position_keys[0].value.abs_diff_eq(Vec3::ZERO, 1e-3));
}

#[test]
fn positions_outside_the_range_are_clamped() {
    let settings = QuantizationSettings {
        position_range: 2.0,
        ..QuantizationSettings::default()
    };
    let track = BoneTrack::try_new(
        "Arm",
        0,
        &[(0.0, Vec3::new(10.0, -1.0, 0.0))],
        &[(0.0, Quat::IDENTITY)],
    )
    .unwrap();

    let compressed = CompressedTrack::compress(&track, &settings).unwrap();
    let channel = compressed.to_source_channel(&settings);
    assert!(channel.position_keys[0].value.abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-3));
}
