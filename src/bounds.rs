//! Axis-aligned cube volumes and the rays cast against them.

use glam::Vec3;

/// Axis-aligned bounding box with inclusive boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner (inclusive).
    pub min: Vec3,
    /// Maximum corner (inclusive).
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "AABB min must be <= max on all axes"
        );
        Self { min, max }
    }

    /// The cube of edge length `extent` centered on `center`.
    #[inline]
    pub fn cube(center: Vec3, extent: f32) -> Self {
        let half = Vec3::splat(extent * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closed-interval containment: boundary points are inside.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Slab test against the half-line `ray`, clamped to `t >= 0`.
    ///
    /// Grazing the boundary counts as a hit, matching the closed-interval
    /// containment above.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let origin = ray.origin.to_array();
        let dir = ray.dir.to_array();
        let min = self.min.to_array();
        let max = self.max.to_array();

        let mut t_enter = 0.0f32;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            if dir[axis] == 0.0 {
                // Parallel to this slab; hit only if the origin lies inside it.
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return false;
                }
            } else {
                let inv = 1.0 / dir[axis];
                let mut t0 = (min[axis] - origin[axis]) * inv;
                let mut t1 = (max[axis] - origin[axis]) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_enter = t_enter.max(t0);
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return false;
                }
            }
        }
        true
    }
}

/// A half-line from `origin` in direction `dir`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Expected to be normalized; only its direction matters for
    /// intersection tests.
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cube_corners() {
        let aabb = Aabb::cube(Vec3::new(1.0, 2.0, 3.0), 4.0);
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.size(), Vec3::splat(4.0));
    }

    #[test]
    fn contains_point_is_closed() {
        let aabb = Aabb::cube(Vec3::ZERO, 8.0);
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::splat(4.0)));
        assert!(aabb.contains_point(Vec3::splat(-4.0)));
        assert!(!aabb.contains_point(Vec3::new(4.1, 0.0, 0.0)));
    }

    #[test]
    fn ray_hits_box_ahead() {
        let aabb = Aabb::cube(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(aabb.intersects_ray(&ray));
    }

    #[test]
    fn ray_misses_box_behind_origin() {
        let aabb = Aabb::cube(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X);
        assert!(!aabb.intersects_ray(&ray));
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let aabb = Aabb::cube(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::X);
        assert!(!aabb.intersects_ray(&ray));
    }

    #[test]
    fn parallel_ray_inside_slab_hits() {
        let aabb = Aabb::cube(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::X);
        assert!(aabb.intersects_ray(&ray));
    }

    #[test]
    fn origin_inside_box_hits() {
        let aabb = Aabb::cube(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(aabb.intersects_ray(&ray));
    }

    #[test]
    fn diagonal_ray_hits() {
        let aabb = Aabb::cube(Vec3::splat(2.0), 2.0);
        let dir = Vec3::splat(1.0).normalize();
        assert!(aabb.intersects_ray(&Ray::new(Vec3::ZERO, dir)));
        assert!(!aabb.intersects_ray(&Ray::new(Vec3::ZERO, -dir)));
    }
}
