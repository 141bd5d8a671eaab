//! Bind-pose skeleton hierarchy.
//!
//! [`SkeletonNode`] is the owned tree handed over by the scene loader.
//! [`SkeletonHierarchy`] flattens it once into depth-first pre-order, so every
//! node is stored after its parent and gets a stable [`NodeId`]. Evaluation walks
//! that array front to back instead of recursing.

use std::fmt;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use armature_core::RigidTransform;

/// One joint of the bind hierarchy, owning its children.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonNode {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rest_position: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rest_rotation: Quat,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<SkeletonNode>,
}

impl SkeletonNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest_position: Vec3::ZERO,
            rest_rotation: Quat::IDENTITY,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rest(mut self, position: Vec3, rotation: Quat) -> Self {
        self.rest_position = position;
        self.rest_rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SkeletonNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SkeletonNode>) -> Self {
        self.children.extend(children);
        self
    }

    #[inline]
    #[must_use]
    pub fn rest_transform(&self) -> RigidTransform {
        RigidTransform::new(self.rest_position, self.rest_rotation)
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SkeletonNode::subtree_len).sum::<usize>()
    }
}

/// Pre-order position of a node inside a [`SkeletonHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flattened view of one [`SkeletonNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub name: String,
    /// Slash-separated names from the root, e.g. `Armature/Hips/Spine`.
    pub path: String,
    pub parent: Option<NodeId>,
    pub depth: u32,
    pub rest: RigidTransform,
    pub children: SmallVec<[NodeId; 4]>,
}

/// Immutable bind hierarchy in depth-first pre-order.
#[derive(Debug, Clone)]
pub struct SkeletonHierarchy {
    root: SkeletonNode,
    nodes: Vec<HierarchyNode>,
    by_name: FxHashMap<String, SmallVec<[NodeId; 1]>>,
}

impl SkeletonHierarchy {
    #[must_use]
    pub fn new(root: SkeletonNode) -> Self {
        let mut nodes = Vec::with_capacity(root.subtree_len());
        // Explicit stack: (node, parent, depth)
        let mut stack: Vec<(&SkeletonNode, Option<NodeId>, u32)> = vec![(&root, None, 0)];

        while let Some((node, parent, depth)) = stack.pop() {
            let id = NodeId(nodes.len() as u32);
            let path = match parent {
                Some(p) => {
                    let parent_node: &mut HierarchyNode = &mut nodes[p.index()];
                    parent_node.children.push(id);
                    format!("{}/{}", parent_node.path, node.name)
                }
                None => node.name.clone(),
            };

            nodes.push(HierarchyNode {
                id,
                name: node.name.clone(),
                path,
                parent,
                depth,
                rest: node.rest_transform(),
                children: SmallVec::new(),
            });

            // Reverse so the first child is popped first
            for child in node.children.iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        let mut by_name: FxHashMap<String, SmallVec<[NodeId; 1]>> = FxHashMap::default();
        for node in &nodes {
            by_name.entry(node.name.clone()).or_default().push(node.id);
        }

        let hierarchy = Self {
            root,
            nodes,
            by_name,
        };

        for name in hierarchy.duplicate_names() {
            log::warn!(
                "Skeleton node name '{}' is used by {} nodes; name lookups resolve to all of them",
                name,
                hierarchy.find_all(name).len()
            );
        }

        hierarchy
    }

    /// The tree this hierarchy was built from.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &SkeletonNode {
        &self.root
    }

    /// Nodes in pre-order; a parent always precedes its children.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a hierarchy has a root.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// First node in pre-order carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).and_then(|ids| ids.first().copied())
    }

    /// Every node carrying `name`, in pre-order.
    #[must_use]
    pub fn find_all(&self, name: &str) -> &[NodeId] {
        match self.by_name.get(name) {
            Some(ids) => ids.as_slice(),
            None => &[],
        }
    }

    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let leaf = path.rsplit('/').next()?;
        self.find_all(leaf)
            .iter()
            .copied()
            .find(|id| self.nodes[id.index()].path == path)
    }

    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names shared by more than one node, sorted.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl From<SkeletonNode> for SkeletonHierarchy {
    fn from(root: SkeletonNode) -> Self {
        Self::new(root)
    }
}
