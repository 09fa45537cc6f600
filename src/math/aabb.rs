//! Axis-aligned bounding box

use crate::core::types::{Mat4, Vec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Tight box around a point set. `None` for an empty set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for p in rest {
            aabb.include_point(*p);
        }
        Some(aabb)
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if two AABBs intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Grow to include point
    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Same center, half-extent grown by `amount` on every axis
    pub fn expanded(&self, amount: f32) -> Aabb {
        Aabb::from_center_half_extent(self.center(), self.half_extent() + Vec3::splat(amount))
    }

    /// Axis-aligned box enclosing this box after `transform`.
    ///
    /// Center goes through the full transform. Each local extent axis is
    /// transformed as a vector and the absolute components are summed per
    /// world axis. Exact for axis-aligned transforms, loose under rotation.
    pub fn transformed(&self, transform: &Mat4) -> Aabb {
        let center = transform.transform_point3(self.center());
        let extent = self.half_extent();

        let axis_x = transform.transform_vector3(Vec3::new(extent.x, 0.0, 0.0));
        let axis_y = transform.transform_vector3(Vec3::new(0.0, extent.y, 0.0));
        let axis_z = transform.transform_vector3(Vec3::new(0.0, 0.0, extent.z));

        let world_extent = axis_x.abs() + axis_y.abs() + axis_z.abs();
        Aabb::from_center_half_extent(center, world_extent)
    }

    /// The eight corners, bit 0=x, bit 1=y, bit 2=z selects max
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Quat;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
    }

    #[test]
    fn test_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.5),
        ]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 0.5));
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        let c = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        assert!(a.contains_point(Vec3::splat(0.5)));
        assert!(!a.contains_point(Vec3::splat(2.0)));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_expanded_keeps_center() {
        let aabb = Aabb::new(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(3.0, 0.0, 2.0));
        let grown = aabb.expanded(0.5);
        assert_eq!(grown.center(), aabb.center());
        assert_eq!(grown.half_extent(), aabb.half_extent() + Vec3::splat(0.5));
    }

    #[test]
    fn test_transformed_translation_scale_is_exact() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 0.5),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, -4.0),
        );
        let world = aabb.transformed(&m);
        assert!((world.center() - Vec3::new(10.0, 0.0, -4.0)).length() < 1e-5);
        assert!((world.half_extent() - Vec3::new(2.0, 6.0, 1.5)).length() < 1e-5);
    }

    #[test]
    fn test_transformed_rotation_encloses_corners() {
        let aabb = Aabb::new(Vec3::new(-1.0, -0.5, -2.0), Vec3::new(1.0, 0.5, 2.0));
        let m = Mat4::from_rotation_translation(
            Quat::from_euler(glam::EulerRot::YXZ, 0.7, 0.3, -1.1),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let world = aabb.transformed(&m);
        for corner in aabb.corners() {
            let p = m.transform_point3(corner);
            assert!(p.cmpge(world.min - Vec3::splat(1e-4)).all());
            assert!(p.cmple(world.max + Vec3::splat(1e-4)).all());
        }
    }
}
