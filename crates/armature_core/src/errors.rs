//! Error Types
//!
//! This module defines the error types used throughout the animation crates.
//!
//! # Overview
//!
//! The main error type [`ArmatureError`] covers every failure that can be
//! reported while building animation data:
//! - Malformed clips (empty or unordered keys, invalid timing)
//! - Skeletons that do not fit the configured bone capacity
//! - Key quantization failures
//!
//! Per-frame evaluation never returns an error: sampling clamps defensively so
//! that playback cannot stall a render loop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use armature_core::errors::{ArmatureError, Result};
//!
//! fn build() -> Result<()> {
//!     // Clip construction returns Result
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// The main error type for the animation crates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmatureError {
    // ========================================================================
    // Clip Construction Errors
    // ========================================================================
    /// The source animation cannot be played back safely.
    #[error("Malformed clip '{clip}': {reason}")]
    MalformedClip {
        /// Name of the rejected clip
        clip: String,
        /// What was wrong with it
        reason: ClipDefect,
    },

    /// Registering the clip's bones would overflow the output matrix array.
    #[error("Bone capacity exceeded: {required} bones required, capacity is {capacity}")]
    BoneCapacityExceeded {
        /// Bone count after registration
        required: usize,
        /// Configured output capacity
        capacity: usize,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Key data cannot be represented in the quantized format.
    #[error("Quantization error: {0}")]
    Quantization(String),
}

/// Which key sequence of a track a [`ClipDefect`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Position,
    Rotation,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Position => f.write_str("position"),
            KeyKind::Rotation => f.write_str("rotation"),
        }
    }
}

/// Reason attached to [`ArmatureError::MalformedClip`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipDefect {
    #[error("bone '{bone}' has no {kind} keys")]
    EmptyKeys { bone: String, kind: KeyKind },

    #[error("bone '{bone}' {kind} key {index} is not after the previous key")]
    NonMonotonicKeys {
        bone: String,
        kind: KeyKind,
        index: usize,
    },

    #[error("bone '{bone}' {kind} key {index} is not finite")]
    NonFiniteKey {
        bone: String,
        kind: KeyKind,
        index: usize,
    },

    #[error("bone '{bone}' has {times} {kind} timestamps but {values} values")]
    MismatchedKeys {
        bone: String,
        kind: KeyKind,
        times: usize,
        values: usize,
    },

    #[error("duration must be positive, got {0} ticks")]
    NonPositiveDuration(f32),

    #[error("ticks per second is zero")]
    ZeroTickRate,

    #[error("timing values must be finite (duration {duration}, ticks per second {ticks_per_second})")]
    NonFiniteTiming { duration: f32, ticks_per_second: f32 },
}

/// Alias for `Result<T, ArmatureError>`.
pub type Result<T> = std::result::Result<T, ArmatureError>;
