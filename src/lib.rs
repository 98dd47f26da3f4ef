//! [![Crates.io](https://img.shields.io/crates/v/occupancy-tree.svg)](https://crates.io/crates/occupancy-tree)
//! [![Docs.rs](https://docs.rs/occupancy-tree/badge.svg)](https://docs.rs/occupancy-tree)
//!
//! Sparse voxel octrees for probabilistic 3D occupancy mapping.
//!
//! An [`OccupancyTree`](crate::OccupancyTree) partitions a cubic volume into octants recursively and stores a
//! ternary occupancy state (`Free` / `Unknown` / `Occupied`) at the leaves. Sensor-style updates drive the map:
//! [`add_point`](crate::OccupancyTree::add_point) marks the finest cell containing a point as occupied, growing the
//! root volume on demand, and [`add_ray`](crate::OccupancyTree::add_ray) carves the free space a sensor beam passed
//! through. Homogeneous sibling groups collapse back into their parent, so the map stays sparse under dense input.
//! The whole tree round-trips through a compact bit stream (2 bytes per internal node) via
//! [`encode`](crate::OccupancyTree::encode) and [`from_bitstream`](crate::OccupancyTree::from_bitstream).
//!
//! # Design Advantages
//!
//! - All nodes live in a [`NodeArena`](crate::NodeArena) and refer to each other through `u32` handles, so the
//!   structure is completely local: no boxes, no parent pointers, trivially cloneable.
//! - Nodes store no coordinates. Traversals derive each child's center and extent from its slot on the way down,
//!   which keeps a node at a handful of bytes and makes the serialized form purely topological.
//! - The root volume is not fixed at construction: inserting a point outside it re-parents the root into a doubled
//!   cube toward the point, so the addressable space follows the data.
//! - The child-slot bit mapping is shared by insertion, growth, queries, and the codec, so the wire format needs no
//!   per-node addressing.
//!
//! # Performance
//!
//! - point insertion / point query: O(depth)
//! - ray carving and ray queries: O(nodes overlapping the ray)
//! - encode / decode: O(nodes)
//! - memory per node: `size_of::<Node>()`, plus 32 bytes per internal node for its child group

mod arena;
mod bitstream;
mod bounds;
mod codec;
mod octant;
mod tree;

pub use arena::*;
pub use bitstream::*;
pub use bounds::*;
pub use octant::*;
pub use tree::*;

pub use glam;

use glam::Vec3;
use thiserror::Error;

/// A child slot 0..7, identifying one octant of a parent cube.
pub type Octant = u8;

/// Errors reported by tree operations.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OctreeError {
    /// An insertion kept growing the root without reaching the point. The
    /// root keeps the growth already performed; retrying with a larger
    /// starting extent is valid.
    #[error("point {point} is still outside the root volume after 20 growth steps")]
    GrowthLimitExceeded { point: Vec3 },

    /// A serialized tree ended in the middle of a child descriptor.
    #[error("bit stream truncated at bit {bit_offset}")]
    CorruptBitstream { bit_offset: usize },
}
