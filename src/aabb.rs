use crate::math::Vector3;

/// An axis-aligned bounding volume, stored as a centre point and
/// half-extents along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub origin: Vector3,
    pub extents: Vector3,
}

impl Aabb {
    pub fn new(origin: Vector3, extents: Vector3) -> Aabb {
        Aabb { origin, extents }
    }

    pub fn from_min_max(min: Vector3, max: Vector3) -> Aabb {
        Aabb {
            origin: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Smallest bounds enclosing all of the points, or `None` for an
    /// empty slice.
    pub fn from_points(points: &[Vector3]) -> Option<Aabb> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for point in &points[1..] {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            min.z = min.z.min(point.z);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
            max.z = max.z.max(point.z);
        }
        Some(Aabb::from_min_max(min, max))
    }

    pub fn mins(&self) -> Vector3 {
        self.origin - self.extents
    }

    pub fn maxs(&self) -> Vector3 {
        self.origin + self.extents
    }

    pub fn corners(&self) -> [Vector3; 8] {
        let min = self.mins();
        let max = self.maxs();
        [
            Vector3::new(min.x, min.y, min.z),
            Vector3::new(min.x, min.y, max.z),
            Vector3::new(min.x, max.y, min.z),
            Vector3::new(min.x, max.y, max.z),
            Vector3::new(max.x, min.y, min.z),
            Vector3::new(max.x, min.y, max.z),
            Vector3::new(max.x, max.y, min.z),
            Vector3::new(max.x, max.y, max.z),
        ]
    }
}
