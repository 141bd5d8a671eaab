//! Clip build & playback configuration
//!
//! ```rust,ignore
//! use armature_animation::settings::{AnimationSettings, TickRatePolicy};
//!
//! // Defaults: 512 output slots, zero tick rates rejected
//! let settings = AnimationSettings::default();
//!
//! // Accept files that leave the tick rate unspecified
//! let settings = AnimationSettings::default()
//!     .with_tick_rate_policy(TickRatePolicy::FallbackToOne)
//!     .with_max_bones(128);
//! ```

/// Size of the bone matrix array uploaded to the skinning shader.
pub const MAX_BONES: usize = 512;

/// What to do with a clip whose source declares zero ticks per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickRatePolicy {
    /// Reject the clip as malformed.
    #[default]
    Reject,
    /// Play it at one tick per second, logging a warning.
    FallbackToOne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    /// Output matrix capacity, and the most bones a clip may register.
    pub max_bones: usize,
    pub tick_rate_policy: TickRatePolicy,
    /// Playback speed multiplier on top of the clip's ticks per second.
    pub time_scale: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            max_bones: MAX_BONES,
            tick_rate_policy: TickRatePolicy::Reject,
            time_scale: 1.0,
        }
    }
}

impl AnimationSettings {
    #[must_use]
    pub fn with_max_bones(mut self, max_bones: usize) -> Self {
        self.max_bones = max_bones;
        self
    }

    #[must_use]
    pub fn with_tick_rate_policy(mut self, policy: TickRatePolicy) -> Self {
        self.tick_rate_policy = policy;
        self
    }

    #[must_use]
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
