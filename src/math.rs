use cgmath::{InnerSpace, Vector3 as CgVector3};

pub type Vector3 = CgVector3<f32>;

// Magic numbers for numerical precision.

/// Thickness of a plane for in-front/behind classification when clipping
/// windings. Points closer than this are treated as lying on the plane.
pub const THRESH_POINT_ON_PLANE: f32 = 0.1;
/// Size of a plane normal that is considered "zero", squared.
/// A face whose defining points are collinear produces such a normal.
pub const THRESH_ZERO_NORM_SQUARED: f32 = 0.0001;

/// A plane in normal/distance form. Points p on the plane satisfy
/// `normal . p == dist`; the half-space of a brush face is
/// `normal . p <= dist`, with the normal pointing out of the solid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub dist: f32,
}

impl Plane {
    pub fn new(normal: Vector3, dist: f32) -> Plane {
        Plane { normal, dist }
    }

    /// Plane through three points wound counter-clockwise when viewed from
    /// the outside. Returns `None` if the points are (nearly) collinear.
    pub fn from_points(p0: Vector3, p1: Vector3, p2: Vector3) -> Option<Plane> {
        let normal = (p2 - p0).cross(p1 - p0);
        if normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            return None;
        }
        let normal = normal.normalize();
        Some(Plane {
            normal,
            dist: normal.dot(p0),
        })
    }

    /// Signed distance of a point from the plane, positive on the
    /// outside (the side the normal points into).
    pub fn distance_to(&self, p: Vector3) -> f32 {
        self.normal.dot(p) - self.dist
    }

    /// The plane facing the opposite way.
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            dist: -self.dist,
        }
    }
}

/// Unit vector for a latitude/longitude pair: `theta` sweeps around the
/// up axis, `phi` runs from the south pole (-pi/2) to the north (pi/2).
pub fn vector_for_spherical(theta: f64, phi: f64) -> Vector3 {
    Vector3::new(
        (theta.cos() * phi.cos()) as f32,
        (theta.sin() * phi.cos()) as f32,
        phi.sin() as f32,
    )
}
