use slab::Slab;

/// Points to a [`Node`] owned by a [`NodeArena`].
pub type NodeHandle = u32;

/// Points to a child group (8 [`NodeHandle`]s) owned by a [`NodeArena`].
pub type GroupHandle = u32;

/// Ternary occupancy state of a leaf.
///
/// The discriminants are `{-1, 0, +1}` so that a future probabilistic
/// (log-odds) update can be expressed as a plain additive step. Use
/// [`Occupancy::as_i8`] for the numeric face.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(i8)]
pub enum Occupancy {
    Free = -1,
    Unknown = 0,
    Occupied = 1,
}

impl Occupancy {
    /// One-way numeric conversion, suitable as an additive occupancy delta.
    #[inline]
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

/// A single octree node.
///
/// A node is *internal* iff `children` is `Some`, in which case exactly
/// eight children are reachable through that group handle. Otherwise it is
/// a *leaf* and `state` is its occupancy. An internal node's `state` is
/// stale and is never consulted by queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Node {
    pub children: Option<GroupHandle>,
    pub state: Occupancy,
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Owns every [`Node`] and every child-group array of one octree.
///
/// Nodes and child groups live in two separate slabs, so their handle
/// namespaces never interfere. Handles are stable for the lifetime of the
/// node; slots freed by pruning may be reused for later allocations.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Slab<Node>,
    groups: Slab<[NodeHandle; 8]>,
}

impl NodeArena {
    /// Allocates a fresh `Unknown` leaf.
    #[inline]
    pub fn new_node(&mut self) -> NodeHandle {
        self.nodes.insert(Node {
            children: None,
            state: Occupancy::Unknown,
        }) as NodeHandle
    }

    /// Registers an ordered 8-tuple of children.
    #[inline]
    pub fn new_child_group(&mut self, children: [NodeHandle; 8]) -> GroupHandle {
        self.groups.insert(children) as GroupHandle
    }

    /// # Panics
    ///
    /// If `handle` is stale.
    #[inline]
    pub fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle as usize]
    }

    /// # Panics
    ///
    /// If `handle` is stale.
    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle as usize]
    }

    /// # Panics
    ///
    /// If `handle` is stale.
    #[inline]
    pub fn children(&self, handle: GroupHandle) -> &[NodeHandle; 8] {
        &self.groups[handle as usize]
    }

    #[inline]
    pub fn contains_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(handle as usize)
    }

    #[inline]
    pub fn remove_node(&mut self, handle: NodeHandle) -> Option<Node> {
        self.nodes.try_remove(handle as usize)
    }

    #[inline]
    pub fn remove_child_group(&mut self, handle: GroupHandle) -> Option<[NodeHandle; 8]> {
        self.groups.try_remove(handle as usize)
    }

    /// Total number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live nodes that currently have a child group.
    #[inline]
    pub fn internal_count(&self) -> usize {
        self.nodes.iter().filter(|(_, n)| n.children.is_some()).count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_node_is_unknown_leaf() {
        let mut arena = NodeArena::default();
        let h = arena.new_node();
        assert!(arena.contains_node(h));
        assert_eq!(
            arena.node(h),
            &Node {
                children: None,
                state: Occupancy::Unknown
            }
        );
    }

    #[test]
    fn node_and_group_namespaces_are_independent() {
        let mut arena = NodeArena::default();
        let n = arena.new_node();
        let g = arena.new_child_group([n; 8]);
        // Both slabs start issuing from slot 0.
        assert_eq!(n, 0);
        assert_eq!(g, 0);
        assert_eq!(arena.children(g), &[n; 8]);
    }

    #[test]
    fn remove_node_frees_the_slot() {
        let mut arena = NodeArena::default();
        let h = arena.new_node();
        assert_eq!(
            arena.remove_node(h),
            Some(Node {
                children: None,
                state: Occupancy::Unknown
            })
        );
        assert!(!arena.contains_node(h));
        assert_eq!(arena.remove_node(h), None);
    }

    #[test]
    fn internal_count_tracks_child_groups() {
        let mut arena = NodeArena::default();
        let parent = arena.new_node();
        let children = [0u32; 8].map(|_| arena.new_node());
        let group = arena.new_child_group(children);
        arena.node_mut(parent).children = Some(group);
        assert_eq!(arena.node_count(), 9);
        assert_eq!(arena.internal_count(), 1);
    }

    #[test]
    fn occupancy_numeric_face() {
        assert_eq!(Occupancy::Free.as_i8(), -1);
        assert_eq!(Occupancy::Unknown.as_i8(), 0);
        assert_eq!(Occupancy::Occupied.as_i8(), 1);
    }
}
