//! Bone index table shared by a skinned model and its clips.
//!
//! The table maps bone names to dense output slots. The skin loader seeds it
//! with every bone referenced by vertex weights (together with the inverse bind
//! offset), then each clip built against the model registers its channels.
//! A slot, once assigned, never changes, so any clip can write into the same
//! matrix array the shader reads.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use parking_lot::{Mutex, MutexGuard};
use rustc_hash::{FxHashMap, FxHashSet};

use armature_core::RigidTransform;

use crate::hierarchy::HierarchyNode;

/// Slot and inverse bind offset for one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneBindInfo {
    pub index: usize,
    /// Model space to bone space at bind time, without scale.
    pub bind_offset: RigidTransform,
}

impl BoneBindInfo {
    #[inline]
    #[must_use]
    pub fn offset_matrix(&self) -> Mat4 {
        self.bind_offset.to_mat4()
    }
}

/// Inverse bind data for one skinned bone, as produced by the skin loader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindOffset {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverse_bind_position: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverse_bind_rotation: Quat,
}

impl BindOffset {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Vec3, rotation: Quat) -> Self {
        Self {
            name: name.into(),
            inverse_bind_position: position,
            inverse_bind_rotation: rotation,
        }
    }

    /// Decomposes an inverse bind matrix, dropping its scale.
    #[must_use]
    pub fn from_matrix(name: impl Into<String>, inverse_bind: Mat4) -> Self {
        let t = RigidTransform::from_mat4_discarding_scale(inverse_bind);
        Self::new(name, t.position, t.rotation)
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(self.inverse_bind_position, self.inverse_bind_rotation)
    }
}

/// Resolves hierarchy nodes to output slots during evaluation.
pub trait BoneLookup {
    fn bind_info(&self, node: &HierarchyNode) -> Option<&BoneBindInfo>;
}

/// Name → slot mapping with first-seen, dense index assignment.
#[derive(Debug, Clone, Default)]
pub struct BoneIndexTable {
    entries: FxHashMap<String, BoneBindInfo>,
    names: Vec<String>,
}

impl BoneIndexTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoneBindInfo> {
        self.entries.get(name)
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get(name).map(|info| info.index)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bone name stored in `index`.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneBindInfo)> + '_ {
        self.names
            .iter()
            .map(|name| (name.as_str(), &self.entries[name.as_str()]))
    }

    /// Returns the slot for `name`, appending it with `bind_offset` if unseen.
    ///
    /// An existing entry keeps both its slot and its offset.
    pub fn get_or_insert(&mut self, name: &str, bind_offset: RigidTransform) -> usize {
        if let Some(info) = self.entries.get(name) {
            return info.index;
        }
        let index = self.names.len();
        self.names.push(name.to_string());
        self.entries.insert(
            name.to_string(),
            BoneBindInfo { index, bind_offset },
        );
        index
    }

    /// Adds a skinned bone ahead of clip registration.
    pub fn seed(&mut self, offset: &BindOffset) -> usize {
        self.get_or_insert(&offset.name, offset.transform())
    }

    pub fn seed_all<'a>(&mut self, offsets: impl IntoIterator<Item = &'a BindOffset>) {
        for offset in offsets {
            self.seed(offset);
        }
    }

    /// Adds a skinned bone from its inverse bind matrix; scale is discarded.
    pub fn seed_from_matrix(&mut self, name: &str, inverse_bind: Mat4) -> usize {
        self.get_or_insert(name, RigidTransform::from_mat4_discarding_scale(inverse_bind))
    }

    /// Assigns slots to animation channels, returning one slot per name.
    ///
    /// Bones already present keep their slot; new ones get the next index and an
    /// identity bind offset.
    pub fn register_channels<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
        names
            .into_iter()
            .map(|name| self.get_or_insert(name, RigidTransform::IDENTITY))
            .collect()
    }

    /// How many of `names` are not in the table yet (duplicates counted once).
    #[must_use]
    pub fn count_new<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> usize {
        names
            .into_iter()
            .filter(|name| !self.contains(name))
            .collect::<FxHashSet<&str>>()
            .len()
    }
}

impl BoneLookup for BoneIndexTable {
    #[inline]
    fn bind_info(&self, node: &HierarchyNode) -> Option<&BoneBindInfo> {
        self.entries.get(node.name.as_str())
    }
}

/// [`BoneIndexTable`] behind one lock, for models whose clips load on several
/// threads. The lock is held for a whole registration, never per bone.
#[derive(Debug, Clone, Default)]
pub struct SharedBoneIndexTable {
    inner: Arc<Mutex<BoneIndexTable>>,
}

impl SharedBoneIndexTable {
    #[must_use]
    pub fn new(table: BoneIndexTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, BoneIndexTable> {
        self.inner.lock()
    }

    pub fn register_channels<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
        self.inner.lock().register_channels(names)
    }

    /// Copy of the current table.
    #[must_use]
    pub fn snapshot(&self) -> BoneIndexTable {
        self.inner.lock().clone()
    }
}

impl From<BoneIndexTable> for SharedBoneIndexTable {
    fn from(table: BoneIndexTable) -> Self {
        Self::new(table)
    }
}
