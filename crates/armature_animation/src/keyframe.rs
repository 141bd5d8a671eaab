use armature_core::{ClipDefect, KeyKind};

use crate::values::Interpolatable;

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last bracketing interval so sequential playback finds the next
/// one in O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-keyed values with linear blending between neighbours.
///
/// Timestamps are in clip ticks. A track built through [`KeyframeTrack::validated`]
/// is non-empty, finite and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track without checking it; see [`KeyframeTrack::validated`].
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>) -> Self {
        Self { times, values }
    }

    /// Builds a track and checks the invariants sampling relies on.
    pub fn validated(
        bone: &str,
        kind: KeyKind,
        times: Vec<f32>,
        values: Vec<T>,
    ) -> Result<Self, ClipDefect> {
        let track = Self { times, values };
        track.check(bone, kind)?;
        Ok(track)
    }

    pub(crate) fn check(&self, bone: &str, kind: KeyKind) -> Result<(), ClipDefect> {
        if self.times.is_empty() || self.values.is_empty() {
            return Err(ClipDefect::EmptyKeys {
                bone: bone.to_string(),
                kind,
            });
        }
        if self.times.len() != self.values.len() {
            return Err(ClipDefect::MismatchedKeys {
                bone: bone.to_string(),
                kind,
                times: self.times.len(),
                values: self.values.len(),
            });
        }
        for (index, (time, value)) in self.times.iter().zip(&self.values).enumerate() {
            if !time.is_finite() || !value.is_finite() {
                return Err(ClipDefect::NonFiniteKey {
                    bone: bone.to_string(),
                    kind,
                    index,
                });
            }
            if index > 0 && *time <= self.times[index - 1] {
                return Err(ClipDefect::NonMonotonicKeys {
                    bone: bone.to_string(),
                    kind,
                    index,
                });
            }
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn first_time(&self) -> Option<f32> {
        self.times.first().copied()
    }

    #[must_use]
    pub fn last_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Index `i` of the interval `[times[i], times[i+1]]` used for `time`.
    ///
    /// This is the smallest `i` with `time < times[i + 1]`, clamped to
    /// `[0, len - 2]` so that times at or past the last key reuse the final
    /// interval. Tracks with fewer than two keys always report 0.
    #[inline]
    #[must_use]
    pub fn segment_index(&self, time: f32) -> usize {
        let len = self.times.len();
        if len < 2 {
            return 0;
        }
        // partition_point returns the count of keys with t <= time
        let next_idx = self.times.partition_point(|&t| t <= time);
        next_idx.saturating_sub(1).min(len - 2)
    }

    /// Stateless sampling.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        assert!(!self.times.is_empty(), "Track is empty");

        if self.times.len() == 1 {
            return T::hold(&self.values[0]);
        }

        self.sample_segment(self.segment_index(time), time)
    }

    /// Sampling with a cursor; returns exactly what [`KeyframeTrack::sample`] does.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        assert!(!self.times.is_empty(), "Track is empty");

        let len = self.times.len();
        // Fast path: static data (single keyframe)
        if len == 1 {
            return T::hold(&self.values[0]);
        }

        let last_segment = len - 2;
        // Cursor may be stale if it was used with another track
        let i = cursor.last_index.min(last_segment);

        let found_index = if time >= self.times[i] {
            // Forward: time increasing, check [i, i+1), [i+1, i+2)...
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= last_segment {
                    res = Some(last_segment);
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: loop wrap or reverse playback
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    // Before times[i] with i == 0, or ran off the front
                    if i == offset - 1 {
                        res = Some(0);
                    }
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found_index.unwrap_or_else(|| self.segment_index(time));
        cursor.last_index = index;

        self.sample_segment(index, time)
    }

    fn sample_segment(&self, index: usize, time: f32) -> T {
        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        // Prevent division by zero
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        // Outside the key range the nearest key is held
        let t = t.clamp(0.0, 1.0);

        T::interpolate_linear(&self.values[index], &self.values[next_idx], t)
    }
}
