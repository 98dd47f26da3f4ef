use crate::arena::{GroupHandle, NodeArena, NodeHandle, Occupancy};
use crate::bounds::{Aabb, Ray};
use crate::octant;
use crate::OctreeError;

use glam::Vec3;
use smallvec::SmallVec;

/// Growth cap per insertion. Each growth doubles the root edge, so 20
/// doublings cover a million-fold span; needing more indicates numeric
/// pathology in the input.
const MAX_ROOT_GROWTHS: u32 = 20;

/// An occupied leaf cube, as reported by [`OccupancyTree::leaves`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leaf {
    pub center: Vec3,
    pub extent: f32,
}

/// A sparse octree over a cubic volume, storing ternary occupancy at the
/// leaves.
///
/// The root cube doubles in size on demand to cover inserted points, and
/// sibling groups that agree on a `Free` or `Occupied` state collapse back
/// into their parent. All nodes live in one [`NodeArena`]; recursion
/// carries each node's center and extent through the call stack, so nodes
/// store no coordinates of their own.
#[derive(Clone, Debug)]
pub struct OccupancyTree {
    pub(crate) arena: NodeArena,
    pub(crate) root: NodeHandle,
    pub(crate) root_center: Vec3,
    pub(crate) root_extent: f32,
    pub(crate) min_leaf_extent: f32,
}

impl OccupancyTree {
    /// An empty tree: a single `Unknown` leaf covering the cube of edge
    /// `root_extent` around `root_center`.
    ///
    /// Subdivision stops at nodes with an edge shorter than
    /// `min_leaf_extent`, so the finest cells have an edge in
    /// `[min_leaf_extent / 2, min_leaf_extent)`.
    ///
    /// # Panics
    ///
    /// If either extent is not positive.
    pub fn new(root_center: Vec3, root_extent: f32, min_leaf_extent: f32) -> Self {
        assert!(root_extent > 0.0);
        assert!(min_leaf_extent > 0.0);
        let mut arena = NodeArena::default();
        let root = arena.new_node();
        Self {
            arena,
            root,
            root_center,
            root_extent,
            min_leaf_extent,
        }
    }

    #[inline]
    pub fn root_center(&self) -> Vec3 {
        self.root_center
    }

    /// Edge length of the root cube.
    #[inline]
    pub fn root_extent(&self) -> f32 {
        self.root_extent
    }

    #[inline]
    pub fn min_leaf_extent(&self) -> f32 {
        self.min_leaf_extent
    }

    /// Total number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// The volume currently covered by the root.
    #[inline]
    pub fn root_volume(&self) -> Aabb {
        Aabb::cube(self.root_center, self.root_extent)
    }

    /// Marks the finest cell containing `point` as `Occupied`, growing the
    /// root first if the point lies outside it.
    ///
    /// On [`OctreeError::GrowthLimitExceeded`] the insertion is abandoned
    /// but the root keeps the growth already performed.
    pub fn add_point(&mut self, point: Vec3) -> Result<(), OctreeError> {
        let mut growths = 0;
        while !self.root_volume().contains_point(point) {
            if growths == MAX_ROOT_GROWTHS {
                return Err(OctreeError::GrowthLimitExceeded { point });
            }
            self.grow_root(point - self.root_center);
            growths += 1;
        }
        self.insert(point, self.root_extent, self.root_center, self.root);
        Ok(())
    }

    /// Marks every finest cell crossed by the half-line from `origin`
    /// through `hit` as `Free`, except a cell whose center equals `hit`
    /// exactly (that cell is the sensed obstacle and is left untouched).
    ///
    /// Does not prune and does not grow the root; a degenerate ray with
    /// `hit == origin` is a no-op.
    pub fn add_ray(&mut self, origin: Vec3, hit: Vec3) {
        let dir = (hit - origin).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        let ray = Ray::new(origin, dir);
        self.free_ray(&ray, hit, self.root_extent, self.root_center, self.root);
    }

    /// Center of the first occupied leaf the depth-first descent meets on
    /// `ray`, visiting children in slot order 0..7.
    ///
    /// This is the smallest-extent node the traversal encounters, not
    /// necessarily the hit nearest to the ray origin.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<Vec3> {
        self.ray_descend(ray, self.root_extent, self.root_center, self.root)
    }

    /// Occupancy of the finest cell containing `point`, or `Unknown` for
    /// points outside the root volume.
    pub fn occupancy_at(&self, point: Vec3) -> Occupancy {
        if !self.root_volume().contains_point(point) {
            return Occupancy::Unknown;
        }
        let mut handle = self.root;
        let mut center = self.root_center;
        let mut extent = self.root_extent;
        loop {
            match self.arena.node(handle).children {
                Some(group) => {
                    let slot = octant::octant_for(point, center);
                    handle = self.arena.children(group)[slot as usize];
                    extent *= 0.5;
                    center = octant::octant_center(slot, extent, center);
                }
                None => return self.arena.node(handle).state,
            }
        }
    }

    /// Visits `(center, extent)` of every `Occupied` leaf.
    pub fn visit_occupied(&self, mut visitor: impl FnMut(Vec3, f32)) {
        let mut stack = SmallVec::<[(NodeHandle, Vec3, f32); 32]>::new();
        stack.push((self.root, self.root_center, self.root_extent));
        while let Some((handle, center, extent)) = stack.pop() {
            let node = self.arena.node(handle);
            match node.children {
                Some(group) => {
                    let child_extent = extent * 0.5;
                    for (slot, &child) in self.arena.children(group).iter().enumerate() {
                        let child_center =
                            octant::octant_center(slot as u8, child_extent, center);
                        stack.push((child, child_center, child_extent));
                    }
                }
                None if node.state == Occupancy::Occupied => visitor(center, extent),
                None => {}
            }
        }
    }

    /// All `Occupied` leaves.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        self.visit_occupied(|center, extent| leaves.push(Leaf { center, extent }));
        leaves
    }

    /// Replaces the leaf at `handle` with an internal node over eight fresh
    /// `Unknown` leaves.
    pub(crate) fn subdivide(&mut self, handle: NodeHandle) -> GroupHandle {
        let children = std::array::from_fn(|_| self.arena.new_node());
        let group = self.arena.new_child_group(children);
        self.arena.node_mut(handle).children = Some(group);
        group
    }

    fn insert(&mut self, point: Vec3, extent: f32, center: Vec3, handle: NodeHandle) {
        if extent < self.min_leaf_extent {
            self.arena.node_mut(handle).state = Occupancy::Occupied;
            return;
        }
        if !Aabb::cube(center, extent).contains_point(point) {
            return;
        }
        let children = self.arena.node(handle).children;
        let group = match children {
            Some(group) => group,
            None => self.subdivide(handle),
        };
        let slot = octant::octant_for(point, center);
        let child = self.arena.children(group)[slot as usize];
        let child_extent = extent * 0.5;
        let child_center = octant::octant_center(slot, child_extent, center);
        self.insert(point, child_extent, child_center, child);

        self.try_prune(handle);
    }

    /// Collapses `handle`'s children into it when all eight are leaves
    /// agreeing on a `Free` or `Occupied` state. All-`Unknown` groups stay:
    /// that is the state of every fresh subdivision.
    fn try_prune(&mut self, handle: NodeHandle) {
        let Some(group) = self.arena.node(handle).children else {
            return;
        };
        let children = *self.arena.children(group);
        let state = self.arena.node(children[0]).state;
        if state == Occupancy::Unknown {
            return;
        }
        for &child in &children {
            let node = self.arena.node(child);
            if node.children.is_some() || node.state != state {
                return;
            }
        }
        for child in children {
            self.arena.remove_node(child);
        }
        self.arena.remove_child_group(group);
        let node = self.arena.node_mut(handle);
        node.children = None;
        node.state = state;
    }

    fn free_ray(&mut self, ray: &Ray, hit: Vec3, extent: f32, center: Vec3, handle: NodeHandle) {
        if extent < self.min_leaf_extent {
            if center != hit {
                self.arena.node_mut(handle).state = Occupancy::Free;
            }
            return;
        }
        let existing = self.arena.node(handle).children;
        let group = match existing {
            Some(group) => group,
            None => self.subdivide(handle),
        };
        let children = *self.arena.children(group);
        let child_extent = extent * 0.5;
        for (slot, &child) in children.iter().enumerate() {
            let child_center = octant::octant_center(slot as u8, child_extent, center);
            if Aabb::cube(child_center, child_extent).intersects_ray(ray) {
                self.free_ray(ray, hit, child_extent, child_center, child);
            }
        }
    }

    /// Doubles the root extent toward `direction`, re-parenting the old
    /// root as one octant of the new one. A zero component grows toward
    /// `+1` on that axis.
    fn grow_root(&mut self, direction: Vec3) {
        let signs = octant::growth_signs(direction);
        let half = self.root_extent * 0.5;
        let new_center = self.root_center + signs * half;

        let old_root = self.root;
        let old_root_slot = octant::old_root_octant(signs) as usize;
        let new_root = self.arena.new_node();
        let children = std::array::from_fn(|slot| {
            if slot == old_root_slot {
                old_root
            } else {
                self.arena.new_node()
            }
        });
        let group = self.arena.new_child_group(children);
        self.arena.node_mut(new_root).children = Some(group);

        self.root = new_root;
        self.root_center = new_center;
        self.root_extent *= 2.0;
    }

    fn ray_descend(&self, ray: &Ray, extent: f32, center: Vec3, handle: NodeHandle) -> Option<Vec3> {
        if !Aabb::cube(center, extent).intersects_ray(ray) {
            return None;
        }
        let node = self.arena.node(handle);
        match node.children {
            Some(group) => {
                let child_extent = extent * 0.5;
                for (slot, &child) in self.arena.children(group).iter().enumerate() {
                    let child_center = octant::octant_center(slot as u8, child_extent, center);
                    if let Some(hit) = self.ray_descend(ray, child_extent, child_center, child) {
                        return Some(hit);
                    }
                }
                None
            }
            None if node.state == Occupancy::Occupied => Some(center),
            None => None,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
