//! 16-bit keyframe quantization.
//!
//! Every key packs into 8 bytes ([`CompressedKey`]): a `u16` timestamp and three
//! `u16` components.
//!
//! - Times are stored in steps of `1 / time_resolution` ticks.
//! - Positions are divided by `position_range` and quantized in `[-1, 1]`.
//! - Rotations use the hemispherical mapping: the quaternion is flipped to
//!   `w >= 0`, then its axis is scaled by `(√2 + 1) · tan(angle / 4)`, which
//!   lands inside the unit ball and drops `w` entirely.
//!
//! Decoded keys feed back into clip building through
//! [`CompressedTrack::to_source_channel`].

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use armature_core::{ArmatureError, Result};

use crate::source::{SourceChannel, SourceKey};
use crate::track::BoneTrack;

// 4(√2 - 1)
const KM: f32 = 4.0 * 0.414_213_57;
// √2 + 1 = 1 / (√2 - 1)
const KHF: f32 = 2.414_213_7;
// 3 - 2√2
const KHI: f32 = 0.171_572_88;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationSettings {
    /// Positions must lie in `[-position_range, position_range]` per axis.
    pub position_range: f32,
    /// Timestamp steps per tick.
    pub time_resolution: f32,
}

impl Default for QuantizationSettings {
    fn default() -> Self {
        Self {
            position_range: 20.0,
            time_resolution: 24.0,
        }
    }
}

impl QuantizationSettings {
    fn check(&self) -> Result<()> {
        if !(self.position_range.is_finite() && self.position_range > 0.0) {
            return Err(ArmatureError::Quantization(format!(
                "position range must be positive, got {}",
                self.position_range
            )));
        }
        if !(self.time_resolution.is_finite() && self.time_resolution > 0.0) {
            return Err(ArmatureError::Quantization(format!(
                "time resolution must be positive, got {}",
                self.time_resolution
            )));
        }
        Ok(())
    }

    /// Last representable key time, in ticks.
    #[must_use]
    pub fn max_time(&self) -> f32 {
        f32::from(u16::MAX) / self.time_resolution
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct CompressedKey {
    pub time: u16,
    pub data: [u16; 3],
}

#[inline]
#[must_use]
pub fn quantize_unit(value: f32) -> u16 {
    ((value.clamp(-1.0, 1.0) + 1.0) * 0.5 * 65535.0).round() as u16
}

#[inline]
#[must_use]
pub fn dequantize_unit(value: u16) -> f32 {
    f32::from(value) / 65535.0 * 2.0 - 1.0
}

/// Maps a rotation to three components in the unit ball.
#[must_use]
pub fn encode_rotation(rotation: Quat) -> Vec3 {
    let q = rotation.normalize();
    // q and -q are the same rotation; keep the w >= 0 hemisphere
    let q = if q.w < 0.0 { -q } else { q };
    let s = KHF / (1.0 + q.w + (2.0 + 2.0 * q.w).sqrt());
    Vec3::new(q.x * s, q.y * s, q.z * s)
}

/// Inverse of [`encode_rotation`].
#[must_use]
pub fn decode_rotation(v: Vec3) -> Quat {
    let d = KHI * v.dot(v);
    let a = 1.0 + d;
    let b = (1.0 - d) * KM;
    let c = 1.0 / (a * a);
    let bc = b * c;

    Quat::from_xyzw(v.x * bc, v.y * bc, v.z * bc, (1.0 + d * (d - 6.0)) * c).normalize()
}

fn encode_time(time: f32, settings: &QuantizationSettings) -> Result<u16> {
    let steps = (time * settings.time_resolution).round();
    if !steps.is_finite() || steps < 0.0 || steps > f32::from(u16::MAX) {
        return Err(ArmatureError::Quantization(format!(
            "key time {time} outside [0, {}]",
            settings.max_time()
        )));
    }
    Ok(steps as u16)
}

#[inline]
fn decode_time(time: u16, settings: &QuantizationSettings) -> f32 {
    f32::from(time) / settings.time_resolution
}

/// Quantized keys of one bone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedTrack {
    pub bone_name: String,
    pub position_keys: Vec<CompressedKey>,
    pub rotation_keys: Vec<CompressedKey>,
}

impl CompressedTrack {
    pub fn compress(track: &BoneTrack, settings: &QuantizationSettings) -> Result<Self> {
        settings.check()?;
        let name = track.bone_name();
        let positions = track.positions();
        let rotations = track.rotations();

        let range = settings.position_range;
        let mut clamped = false;
        let position_keys = pack_keys(name, &positions.times, settings, |i| {
            let scaled = positions.values[i] / range;
            clamped |= scaled.abs().max_element() > 1.0;
            [quantize_unit(scaled.x), quantize_unit(scaled.y), quantize_unit(scaled.z)]
        })?;
        if clamped {
            log::warn!(
                "Bone '{name}': positions exceed the ±{range} quantization range and were clamped"
            );
        }

        let rotation_keys = pack_keys(name, &rotations.times, settings, |i| {
            let v = encode_rotation(rotations.values[i]);
            [quantize_unit(v.x), quantize_unit(v.y), quantize_unit(v.z)]
        })?;

        Ok(Self {
            bone_name: name.to_string(),
            position_keys,
            rotation_keys,
        })
    }

    /// Decodes the keys into a channel for [`AnimationClip::build`](crate::clip::AnimationClip::build).
    #[must_use]
    pub fn to_source_channel(&self, settings: &QuantizationSettings) -> SourceChannel {
        let unpack = |data: [u16; 3]| {
            Vec3::new(
                dequantize_unit(data[0]),
                dequantize_unit(data[1]),
                dequantize_unit(data[2]),
            )
        };

        SourceChannel {
            bone_name: self.bone_name.clone(),
            position_keys: self
                .position_keys
                .iter()
                .map(|k| {
                    SourceKey::new(
                        decode_time(k.time, settings),
                        unpack(k.data) * settings.position_range,
                    )
                })
                .collect(),
            rotation_keys: self
                .rotation_keys
                .iter()
                .map(|k| {
                    SourceKey::new(
                        decode_time(k.time, settings),
                        decode_rotation(unpack(k.data)),
                    )
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position_keys)
    }

    #[must_use]
    pub fn rotation_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.rotation_keys)
    }
}

fn pack_keys(
    bone: &str,
    times: &[f32],
    settings: &QuantizationSettings,
    mut encode: impl FnMut(usize) -> [u16; 3],
) -> Result<Vec<CompressedKey>> {
    let mut keys: Vec<CompressedKey> = Vec::with_capacity(times.len());
    for (i, &time) in times.iter().enumerate() {
        let time = encode_time(time, settings)?;
        if keys.last().is_some_and(|prev| prev.time == time) {
            log::debug!(
                "Bone '{bone}': key {i} collapses onto the previous key after quantization, dropped"
            );
            continue;
        }
        keys.push(CompressedKey {
            time,
            data: encode(i),
        });
    }
    Ok(keys)
}
