//! Octant bit math shared by insertion, growth, queries, and the codec.
//!
//! A child slot 0..7 encodes which half of the parent cube the child
//! occupies on each axis:
//!
//! - bit 0 (value 1): `+x` half, else `-x`
//! - bit 1 (value 2): `+z` half, else `-z`
//! - bit 2 (value 4): `-y` half, else `+y`
//!
//! Every function here must agree on this mapping bit-for-bit; it is also
//! the slot order of the serialized stream.

use crate::Octant;

use glam::Vec3;

/// The slot of the child cube that contains `point`.
///
/// Points exactly on a center plane resolve to the `+x`/`+z`/`+y` half.
#[inline]
pub fn octant_for(point: Vec3, parent_center: Vec3) -> Octant {
    let mut octant = 0;
    if point.x >= parent_center.x {
        octant |= 1;
    }
    if point.z >= parent_center.z {
        octant |= 2;
    }
    if point.y < parent_center.y {
        octant |= 4;
    }
    octant
}

/// Center of the child cube in slot `octant`, where `child_extent` is the
/// child's edge length (half the parent's).
#[inline]
pub fn octant_center(octant: Octant, child_extent: f32, parent_center: Vec3) -> Vec3 {
    let half = child_extent * 0.5;
    let x = if octant & 1 != 0 { half } else { -half };
    let z = if octant & 2 != 0 { half } else { -half };
    let y = if octant & 4 != 0 { -half } else { half };
    parent_center + Vec3::new(x, y, z)
}

/// Per-axis growth signs for a direction vector. A zero component grows
/// toward `+1`.
#[inline]
pub fn growth_signs(direction: Vec3) -> Vec3 {
    Vec3::new(axis_sign(direction.x), axis_sign(direction.y), axis_sign(direction.z))
}

#[inline]
fn axis_sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// The slot of a grown root's child group that holds the old root.
///
/// When the root grows toward `signs`, the new center moves by
/// `signs * old_extent / 2`, so the old root center sits on the opposite
/// side of the new center on every axis. This is the inverse of
/// [`octant_center`] evaluated at the old root center.
#[inline]
pub fn old_root_octant(signs: Vec3) -> Octant {
    let mut octant = 0;
    if signs.x < 0.0 {
        octant |= 1;
    }
    if signs.z < 0.0 {
        octant |= 2;
    }
    if signs.y > 0.0 {
        octant |= 4;
    }
    octant
}
