use arrayvec::ArrayVec;
use cgmath::InnerSpace;

use crate::math::{Plane, Vector3, THRESH_POINT_ON_PLANE};

/// Maximum points a face winding may have. A convex face of a brush with
/// F faces is bounded by at most F-1 edges, so this also caps the brush
/// face count.
pub const MAX_WINDING_POINTS: usize = 64;

/// Half-extent of the base quad a winding is clipped down from. Anything
/// this far out is "at infinity" for map purposes.
const BASE_EXTENT: f32 = 65536.0;

/// The ordered vertex loop bounding a brush face, wound counter-clockwise
/// when viewed from outside the brush. Derived from the owning brush's
/// planes rather than stored; a winding of two or fewer points means the
/// face does not contribute to the solid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Winding {
    pub points: ArrayVec<Vector3, MAX_WINDING_POINTS>,
}

impl Winding {
    pub fn new() -> Winding {
        Winding {
            points: ArrayVec::new(),
        }
    }

    /// A large quad lying on the plane, oriented so the winding order
    /// matches the plane normal. Starting point for clipping against the
    /// rest of a brush's half-spaces.
    pub fn for_plane(plane: &Plane) -> Winding {
        let normal = plane.normal;

        // Pick the axis the normal is most aligned with, then span the
        // plane with an up vector orthogonal to that axis.
        let mut up = if normal.z.abs() > normal.x.abs() && normal.z.abs() > normal.y.abs() {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };
        up -= normal * up.dot(normal);
        let up = up.normalize() * BASE_EXTENT;

        let org = normal * plane.dist;
        let right = up.cross(normal);

        let mut winding = Winding::new();
        winding.points.push(org - right + up);
        winding.points.push(org + right + up);
        winding.points.push(org + right - up);
        winding.points.push(org - right - up);
        winding
    }

    /// Clip the winding, keeping the part behind the plane. The clipped
    /// winding may collapse to fewer than three points, in which case
    /// the face is non-contributing.
    pub fn clip(&mut self, plane: &Plane) {
        if self.points.is_empty() {
            return;
        }

        let mut clipped: ArrayVec<Vector3, MAX_WINDING_POINTS> = ArrayVec::new();

        for i in 0..self.points.len() {
            let p0 = self.points[i];
            let p1 = self.points[(i + 1) % self.points.len()];
            let d0 = plane.distance_to(p0);
            let d1 = plane.distance_to(p1);

            if d0 <= THRESH_POINT_ON_PLANE {
                let _ = clipped.try_push(p0);
            }

            // Edge crosses the plane; insert the intersection point.
            if (d0 > THRESH_POINT_ON_PLANE && d1 < -THRESH_POINT_ON_PLANE)
                || (d0 < -THRESH_POINT_ON_PLANE && d1 > THRESH_POINT_ON_PLANE)
            {
                let t = d0 / (d0 - d1);
                let _ = clipped.try_push(p0 + (p1 - p0) * t);
            }
        }

        self.points = clipped;
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// A winding bounded by two or fewer points encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() <= 2
    }
}
