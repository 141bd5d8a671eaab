use glam::{Quat, Vec3};

/// Key value types a [`KeyframeTrack`](crate::keyframe::KeyframeTrack) can blend.
pub trait Interpolatable: Copy + Sized {
    /// Blends two keys; `t` is in `[0, 1]`.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Value returned for a lone key held for the whole clip.
    #[inline]
    fn hold(value: &Self) -> Self {
        *value
    }

    fn is_finite(&self) -> bool;
}

impl Interpolatable for Vec3 {
    #[inline]
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        Vec3::is_finite(*self)
    }
}

impl Interpolatable for Quat {
    /// Spherical blend, re-normalized to keep drift from accumulating.
    #[inline]
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t).normalize()
    }

    #[inline]
    fn hold(value: &Self) -> Self {
        value.normalize()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        Quat::is_finite(*self)
    }
}
