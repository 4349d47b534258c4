use bitflags::bitflags;

use crate::math::{Plane, Vector3};
use crate::texdef::TextureProjection;
use crate::winding::Winding;

/// Hard cap on the number of faces a single brush may carry; also bounds
/// the vertex count of any face winding.
pub const BRUSH_MAX_FACES: usize = 64;

/// idTech content bits attached to brush faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentFlags(u32);

bitflags! {
    impl ContentFlags : u32 {
        /// Blocks movement and line of sight.
        const Solid         = 0x00000001;
        /// Excluded from structural vis splitting.
        const Detail        = 0x08000000;
        /// Participates in translucent sorting.
        const Translucent   = 0x20000000;
    }
}

/// A single planar half-space of a brush together with its surface
/// binding. The face's boundary polygon (winding) is not stored here;
/// it is derived from the owning brush's other planes.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub plane: Plane,
    pub shader: String,
    pub projection: TextureProjection,
    pub flags: ContentFlags,
}

/// A convex solid defined as the intersection of its faces' half-spaces.
/// Face order is the order of insertion and is never re-sorted; winding
/// derivation and export both depend on it.
///
/// No convexity or closure check is performed: callers feeding
/// inconsistent planes get degenerate geometry, not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    faces: Vec<Face>,
    contents: ContentFlags,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new()
    }
}

impl Brush {
    pub fn new() -> Brush {
        Brush {
            faces: Vec::new(),
            contents: ContentFlags::Solid,
        }
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.faces.reserve(additional);
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Append the half-space through three counter-clockwise points.
    /// Returns false without modifying the brush if the points are
    /// collinear or the face limit is reached.
    pub fn add_plane(
        &mut self,
        p0: Vector3,
        p1: Vector3,
        p2: Vector3,
        shader: &str,
        projection: &TextureProjection,
    ) -> bool {
        if self.faces.len() >= BRUSH_MAX_FACES {
            log::warn!("brush: face limit {} reached", BRUSH_MAX_FACES);
            return false;
        }
        let Some(plane) = Plane::from_points(p0, p1, p2) else {
            return false;
        };
        self.faces.push(Face {
            plane,
            shader: shader.to_owned(),
            projection: *projection,
            flags: self.contents,
        });
        true
    }

    /// Derive the boundary polygon of one face by clipping a plane-sized
    /// quad against every other face's half-space.
    pub fn winding(&self, face_index: usize) -> Winding {
        let mut winding = Winding::for_plane(&self.faces[face_index].plane);
        for (i, face) in self.faces.iter().enumerate() {
            if i == face_index {
                continue;
            }
            winding.clip(&face.plane);
        }
        winding
    }

    /// Apply an operation to every face, in face order.
    pub fn for_each_face(&mut self, mut op: impl FnMut(&mut Face)) {
        for face in &mut self.faces {
            op(face);
        }
    }

    pub fn set_shader(&mut self, shader: &str) {
        self.for_each_face(|face| face.shader = shader.to_owned());
    }

    pub fn set_projection(&mut self, projection: &TextureProjection) {
        let projection = *projection;
        self.for_each_face(|face| face.projection = projection);
    }

    pub fn set_flags(&mut self, flags: ContentFlags) {
        self.contents = flags;
        self.for_each_face(|face| face.flags = flags);
    }

    pub fn contents(&self) -> ContentFlags {
        self.contents
    }

    pub fn set_detail(&mut self, detail: bool) {
        let mut flags = self.contents;
        flags.set(ContentFlags::Detail, detail);
        self.set_flags(flags);
    }

    /// The detail content bit as exported into the portable map format:
    /// the raw bit value when set, zero otherwise.
    pub fn detail_flag(&self) -> u32 {
        (self.contents & ContentFlags::Detail).bits()
    }
}
