use std::sync::Arc;

use glam::Mat4;

use crate::clip::AnimationClip;
use crate::pose::Pose;
use crate::settings::AnimationSettings;
use crate::track::TrackCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No clip bound; updates do nothing.
    Idle,
    /// A clip is bound and loops indefinitely.
    Playing,
}

/// Drives one clip and owns the bone matrices handed to the skinning shader.
///
/// Several players may share one [`AnimationClip`]; each keeps its own time,
/// key cursors and output buffer.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: Option<Arc<AnimationClip>>,
    current_time: f32,
    settings: AnimationSettings,

    track_cursors: Vec<TrackCursor>,
    pose: Pose,
    final_bone_matrices: Vec<Mat4>,
    overflow_reported: bool,
}

impl AnimationPlayer {
    /// Idle player with `settings.max_bones` identity matrices.
    #[must_use]
    pub fn new(settings: AnimationSettings) -> Self {
        Self {
            clip: None,
            current_time: 0.0,
            settings,
            track_cursors: Vec::new(),
            pose: Pose::new(),
            final_bone_matrices: vec![Mat4::IDENTITY; settings.max_bones],
            overflow_reported: false,
        }
    }

    /// Player already playing `clip` from time 0.
    #[must_use]
    pub fn with_clip(clip: Arc<AnimationClip>, settings: AnimationSettings) -> Self {
        let mut player = Self::new(settings);
        player.play(clip);
        player
    }

    /// Switches to `clip` and rewinds to 0. Output matrices are left untouched
    /// until the next [`AnimationPlayer::update`].
    pub fn play(&mut self, clip: Arc<AnimationClip>) {
        log::trace!("Playing clip '{}'", clip.name());
        self.track_cursors.clear();
        self.track_cursors
            .resize(clip.tracks().len(), TrackCursor::default());
        self.current_time = 0.0;
        self.overflow_reported = false;
        self.clip = Some(clip);
    }

    /// Unbinds the clip; the last computed matrices stay readable.
    pub fn stop(&mut self) {
        if let Some(clip) = self.clip.take() {
            log::trace!("Stopped clip '{}'", clip.name());
        }
        self.current_time = 0.0;
    }

    /// Advances time by `dt` seconds and recomputes every bone matrix.
    ///
    /// A step that does not produce a finite time keeps the previous time.
    pub fn update(&mut self, dt: f32) {
        let Some(clip) = self.clip.as_deref() else {
            return;
        };

        let advanced =
            self.current_time + clip.ticks_per_second() * dt * self.settings.time_scale;
        if advanced.is_finite() {
            self.current_time = wrap_time(advanced, clip.duration_in_ticks());
        } else {
            log::warn!(
                "Clip '{}': non-finite time step (dt {}, time scale {}), holding at {} ticks",
                clip.name(),
                dt,
                self.settings.time_scale,
                self.current_time
            );
        }

        self.pose
            .sample(clip, self.current_time, &mut self.track_cursors);
        self.pose.local_to_model(clip.hierarchy());
        let skipped =
            self.pose
                .write_skinning_matrices(clip.hierarchy(), clip, &mut self.final_bone_matrices);

        if skipped > 0 && !self.overflow_reported {
            log::warn!(
                "Clip '{}': {} bones fall outside the {}-slot output and are not written",
                clip.name(),
                skipped,
                self.final_bone_matrices.len()
            );
            self.overflow_reported = true;
        }
    }

    /// Jumps to `time_in_ticks` (wrapped into the clip). Takes effect on the next
    /// update; ignored while idle or when the time is not finite.
    pub fn seek(&mut self, time_in_ticks: f32) {
        let Some(clip) = &self.clip else {
            return;
        };
        if time_in_ticks.is_finite() {
            self.current_time = wrap_time(time_in_ticks, clip.duration_in_ticks());
        } else {
            log::warn!(
                "Clip '{}': ignoring seek to non-finite time {}",
                clip.name(),
                time_in_ticks
            );
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        if self.clip.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.clip.is_some()
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.clip.as_ref()
    }

    /// Playback position in ticks, in `[0, duration)`.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.settings.time_scale = time_scale;
    }

    /// Bone matrices indexed by bone table slot. Slots the active clip does not
    /// write keep their previous value (identity until first written).
    #[inline]
    #[must_use]
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_bone_matrices
    }

    /// [`AnimationPlayer::final_bone_matrices`] as raw bytes for a buffer upload.
    #[inline]
    #[must_use]
    pub fn final_bone_matrices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.final_bone_matrices)
    }

    /// Pose of the last update.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new(AnimationSettings::default())
    }
}

/// Wraps `time` into `[0, duration)`, for negative playback too.
fn wrap_time(time: f32, duration: f32) -> f32 {
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if wrapped >= duration { 0.0 } else { wrapped }
}
