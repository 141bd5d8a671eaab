//! Foundational types shared by the Armature crates.

pub mod errors;
pub mod transform;

pub use errors::{ArmatureError, ClipDefect, KeyKind, Result};
pub use transform::RigidTransform;
