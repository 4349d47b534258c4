use std::f64::consts::PI;

use crate::aabb::Aabb;
use crate::brush::{Brush, BRUSH_MAX_FACES};
use crate::math::{vector_for_spherical, Vector3};
use crate::texdef::TextureProjection;

pub const PRISM_MIN_SIDES: usize = 3;
pub const PRISM_MAX_SIDES: usize = BRUSH_MAX_FACES - 2;
pub const CONE_MIN_SIDES: usize = 3;
pub const CONE_MAX_SIDES: usize = 32;
pub const SPHERE_MIN_SIDES: usize = 3;
pub const SPHERE_MAX_SIDES: usize = 7;

/// The primitive shapes a brush can be constructed as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefabKind {
    Cuboid,
    Prism,
    Cone,
    Sphere,
}

fn max_extent(extents: Vector3) -> f32 {
    extents.x.max(extents.y).max(extents.z)
}

fn max_extent_2d(extents: Vector3, axis: usize) -> f32 {
    match axis {
        0 => extents.y.max(extents.z),
        1 => extents.x.max(extents.z),
        _ => extents.x.max(extents.y),
    }
}

/// Snap a sampled circle coordinate to the integer lattice. Keeps side
/// plane points consistent between faces that share an edge.
fn snap(value: f64) -> f32 {
    (value + 0.5).floor() as f32
}

/// Replace the brush's faces with the six axis-aligned planes of the
/// bounding box.
pub fn construct_cuboid(
    brush: &mut Brush,
    bounds: &Aabb,
    shader: &str,
    projection: &TextureProjection,
) {
    // For each axis pair, two of the remaining coordinates are pulled to
    // the opposite corner to pick three points spanning the face.
    const BOX: [[usize; 2]; 3] = [[0, 1], [2, 0], [1, 2]];

    let mins = bounds.mins();
    let maxs = bounds.maxs();

    brush.clear();
    brush.reserve(6);

    for pair in BOX {
        let mut planepts1 = maxs;
        let mut planepts2 = maxs;
        planepts2[pair[0]] = mins[pair[0]];
        planepts1[pair[1]] = mins[pair[1]];

        brush.add_plane(maxs, planepts1, planepts2, shader, projection);
    }
    for pair in BOX {
        let mut planepts1 = mins;
        let mut planepts2 = mins;
        planepts1[pair[0]] = maxs[pair[0]];
        planepts2[pair[1]] = maxs[pair[1]];

        brush.add_plane(mins, planepts1, planepts2, shader, projection);
    }
}

/// Replace the brush's faces with two end caps and `sides` side planes
/// extruded along `axis`, sampled on the largest circle that fits the
/// bounds. Out-of-range side counts warn and leave the brush untouched.
pub fn construct_prism(
    brush: &mut Brush,
    bounds: &Aabb,
    sides: usize,
    axis: usize,
    shader: &str,
    projection: &TextureProjection,
) {
    if sides < PRISM_MIN_SIDES {
        log::warn!(
            "brushPrism: sides {}: too few sides, minimum is {}",
            sides,
            PRISM_MIN_SIDES
        );
        return;
    }
    if sides > PRISM_MAX_SIDES {
        log::warn!(
            "brushPrism: sides {}: too many sides, maximum is {}",
            sides,
            PRISM_MAX_SIDES
        );
        return;
    }

    brush.clear();
    brush.reserve(sides + 2);

    let mins = bounds.mins();
    let maxs = bounds.maxs();

    let radius = f64::from(max_extent_2d(bounds.extents, axis));
    let mid = bounds.origin;
    let mut planepts = [Vector3::new(0.0, 0.0, 0.0); 3];

    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;

    // Top cap.
    planepts[2][u] = mins[u];
    planepts[2][v] = mins[v];
    planepts[2][axis] = maxs[axis];
    planepts[1][u] = maxs[u];
    planepts[1][v] = mins[v];
    planepts[1][axis] = maxs[axis];
    planepts[0][u] = maxs[u];
    planepts[0][v] = maxs[v];
    planepts[0][axis] = maxs[axis];

    brush.add_plane(planepts[0], planepts[1], planepts[2], shader, projection);

    // Bottom cap.
    planepts[0][u] = mins[u];
    planepts[0][v] = mins[v];
    planepts[0][axis] = mins[axis];
    planepts[1][u] = maxs[u];
    planepts[1][v] = mins[v];
    planepts[1][axis] = mins[axis];
    planepts[2][u] = maxs[u];
    planepts[2][v] = maxs[v];
    planepts[2][axis] = mins[axis];

    brush.add_plane(planepts[0], planepts[1], planepts[2], shader, projection);

    for i in 0..sides {
        let sv = (i as f64 * PI * 2.0 / sides as f64).sin();
        let cv = (i as f64 * PI * 2.0 / sides as f64).cos();

        planepts[0][u] = snap(f64::from(mid[u]) + radius * cv);
        planepts[0][v] = snap(f64::from(mid[v]) + radius * sv);
        planepts[0][axis] = mins[axis];

        planepts[1][u] = planepts[0][u];
        planepts[1][v] = planepts[0][v];
        planepts[1][axis] = maxs[axis];

        planepts[2][u] = snap(f64::from(planepts[0][u]) - radius * sv);
        planepts[2][v] = snap(f64::from(planepts[0][v]) + radius * cv);
        planepts[2][axis] = maxs[axis];

        brush.add_plane(planepts[0], planepts[1], planepts[2], shader, projection);
    }
}

/// Replace the brush's faces with a base plane and `sides` planes
/// converging on the centre of the bounding box's top face.
pub fn construct_cone(
    brush: &mut Brush,
    bounds: &Aabb,
    sides: usize,
    shader: &str,
    projection: &TextureProjection,
) {
    if sides < CONE_MIN_SIDES {
        log::warn!(
            "brushCone: sides {}: too few sides, minimum is {}",
            sides,
            CONE_MIN_SIDES
        );
        return;
    }
    if sides > CONE_MAX_SIDES {
        log::warn!(
            "brushCone: sides {}: too many sides, maximum is {}",
            sides,
            CONE_MAX_SIDES
        );
        return;
    }

    brush.clear();
    brush.reserve(sides + 1);

    let mins = bounds.mins();
    let maxs = bounds.maxs();

    let radius = f64::from(max_extent(bounds.extents));
    let mid = bounds.origin;

    brush.add_plane(
        Vector3::new(mins.x, mins.y, mins.z),
        Vector3::new(maxs.x, mins.y, mins.z),
        Vector3::new(maxs.x, maxs.y, mins.z),
        shader,
        projection,
    );

    let mut planepts = [Vector3::new(0.0, 0.0, 0.0); 3];
    for i in 0..sides {
        let sv = (i as f64 * PI * 2.0 / sides as f64).sin();
        let cv = (i as f64 * PI * 2.0 / sides as f64).cos();

        planepts[0].x = snap(f64::from(mid.x) + radius * cv);
        planepts[0].y = snap(f64::from(mid.y) + radius * sv);
        planepts[0].z = mins.z;

        planepts[1].x = mid.x;
        planepts[1].y = mid.y;
        planepts[1].z = maxs.z;

        planepts[2].x = snap(f64::from(planepts[0].x) - radius * sv);
        planepts[2].y = snap(f64::from(planepts[0].y) + radius * cv);
        planepts[2].z = maxs.z;

        brush.add_plane(planepts[0], planepts[1], planepts[2], shader, projection);
    }
}

/// Replace the brush's faces with a latitude/longitude grid of planes
/// approximating a sphere: `sides` x (`sides` - 1) band planes plus
/// `sides` planes closing the polar cap.
pub fn construct_sphere(
    brush: &mut Brush,
    bounds: &Aabb,
    sides: usize,
    shader: &str,
    projection: &TextureProjection,
) {
    if sides < SPHERE_MIN_SIDES {
        log::warn!(
            "brushSphere: sides {}: too few sides, minimum is {}",
            sides,
            SPHERE_MIN_SIDES
        );
        return;
    }
    if sides > SPHERE_MAX_SIDES {
        log::warn!(
            "brushSphere: sides {}: too many sides, maximum is {}",
            sides,
            SPHERE_MAX_SIDES
        );
        return;
    }

    brush.clear();
    brush.reserve(sides * sides);

    let radius = max_extent(bounds.extents);
    let mid = bounds.origin;

    let dt = 2.0 * PI / sides as f64;
    let dp = PI / sides as f64;

    for i in 0..sides {
        for j in 0..sides - 1 {
            let t = i as f64 * dt;
            let p = j as f64 * dp - PI / 2.0;

            brush.add_plane(
                mid + vector_for_spherical(t, p) * radius,
                mid + vector_for_spherical(t, p + dp) * radius,
                mid + vector_for_spherical(t + dt, p + dp) * radius,
                shader,
                projection,
            );
        }
    }

    let p = (sides - 1) as f64 * dp - PI / 2.0;
    for i in 0..sides {
        let t = i as f64 * dt;

        brush.add_plane(
            mid + vector_for_spherical(t, p) * radius,
            mid + vector_for_spherical(t + dt, p + dp) * radius,
            mid + vector_for_spherical(t + dt, p) * radius,
            shader,
            projection,
        );
    }
}

/// Construct any prefab shape. `sides` is ignored for cuboids; `axis`
/// only applies to prisms.
pub fn construct_prefab(
    brush: &mut Brush,
    kind: PrefabKind,
    bounds: &Aabb,
    sides: usize,
    axis: usize,
    shader: &str,
    projection: &TextureProjection,
) {
    match kind {
        PrefabKind::Cuboid => construct_cuboid(brush, bounds, shader, projection),
        PrefabKind::Prism => construct_prism(brush, bounds, sides, axis, shader, projection),
        PrefabKind::Cone => construct_cone(brush, bounds, sides, shader, projection),
        PrefabKind::Sphere => construct_sphere(brush, bounds, sides, shader, projection),
    }
}
