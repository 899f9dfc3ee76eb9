//! Vector helpers and separating-axis collision tests
//!
//! Everything here is pure and works on plain `(x, y)` tuples. Rectangles
//! are passed around as their four world-space corners, as produced by
//! [`rect_vertices`].

pub type Vec2 = (f64, f64);

/// Two axes whose normalized dot product is within this of ±1 are the same line.
pub const AXIS_EPSILON: f64 = 1e-6;

pub fn subtract(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 - b.0, a.1 - b.1)
}

pub fn dot(a: Vec2, b: Vec2) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

pub fn magnitude_sq(v: Vec2) -> f64 {
    v.0 * v.0 + v.1 * v.1
}

/// Unit vector in the direction of `v`, or `None` for the zero vector.
pub fn normalize(v: Vec2) -> Option<Vec2> {
    let mag_sq = magnitude_sq(v);
    if mag_sq == 0.0 {
        return None;
    }
    let mag = mag_sq.sqrt();
    Some((v.0 / mag, v.1 / mag))
}

/// Rotate `v` about the origin. Positive angles turn clockwise on a y-down screen.
pub fn rotate(v: Vec2, angle_degrees: f64) -> Vec2 {
    let (sin_a, cos_a) = angle_degrees.to_radians().sin_cos();
    (v.0 * cos_a - v.1 * sin_a, v.0 * sin_a + v.1 * cos_a)
}

/// Corners of a `width`×`height` rectangle centred on `center` and rotated
/// by `angle_degrees`, in winding order.
pub fn rect_vertices(center: Vec2, width: f64, height: f64, angle_degrees: f64) -> [Vec2; 4] {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let local = [
        (-half_w, -half_h),
        (half_w, -half_h),
        (half_w, half_h),
        (-half_w, half_h),
    ];
    local.map(|corner| {
        let (rx, ry) = rotate(corner, angle_degrees);
        (center.0 + rx, center.1 + ry)
    })
}

fn push_axis(axes: &mut Vec<Vec2>, axis: Vec2) {
    let duplicate = axes
        .iter()
        .any(|existing| (dot(*existing, axis).abs() - 1.0).abs() < AXIS_EPSILON);
    if !duplicate {
        axes.push(axis);
    }
}

/// Unit edge normals of a polygon with parallel duplicates removed.
pub fn polygon_axes(vertices: &[Vec2]) -> Vec<Vec2> {
    let mut axes = Vec::with_capacity(vertices.len());
    for (i, &p1) in vertices.iter().enumerate() {
        let p2 = vertices[(i + 1) % vertices.len()];
        let edge = subtract(p2, p1);
        if let Some(normal) = normalize((-edge.1, edge.0)) {
            push_axis(&mut axes, normal);
        }
    }
    axes
}

/// Min/max of the vertices projected onto `axis`.
pub fn project_polygon(axis: Vec2, vertices: &[Vec2]) -> (f64, f64) {
    vertices
        .iter()
        .map(|&v| dot(v, axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        })
}

fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    !(a.1 < b.0 || b.1 < a.0)
}

pub fn circles_collide(c1: Vec2, r1: f64, c2: Vec2, r2: f64) -> bool {
    let distance_sq = magnitude_sq(subtract(c1, c2));
    let radii = r1 + r2;
    distance_sq <= radii * radii
}

/// SAT test between two convex polygons.
pub fn polygons_collide(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let mut axes = polygon_axes(a);
    for axis in polygon_axes(b) {
        push_axis(&mut axes, axis);
    }
    axes.iter().all(|&axis| {
        intervals_overlap(project_polygon(axis, a), project_polygon(axis, b))
    })
}

/// Closest point to `p` on the segment `a`–`b`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = subtract(b, a);
    let ab_mag_sq = magnitude_sq(ab);
    if ab_mag_sq == 0.0 {
        return a;
    }
    let t = (dot(subtract(p, a), ab) / ab_mag_sq).clamp(0.0, 1.0);
    (a.0 + t * ab.0, a.1 + t * ab.1)
}

/// Circle against a convex polygon.
///
/// The edge-distance check only ever accepts; rejection is decided by the
/// full axis sweep (edge normals plus centre-to-vertex axes).
pub fn circle_polygon_collide(center: Vec2, radius: f64, vertices: &[Vec2]) -> bool {
    if vertices.is_empty() {
        return false;
    }

    let radius_sq = radius * radius;
    let touches_edge = vertices.iter().enumerate().any(|(i, &p1)| {
        let p2 = vertices[(i + 1) % vertices.len()];
        let closest = closest_point_on_segment(center, p1, p2);
        magnitude_sq(subtract(center, closest)) <= radius_sq
    });
    if touches_edge {
        return true;
    }

    let mut axes = polygon_axes(vertices);
    for &vertex in vertices {
        if let Some(axis) = normalize(subtract(vertex, center)) {
            push_axis(&mut axes, axis);
        }
    }

    axes.iter().all(|&axis| {
        let polygon = project_polygon(axis, vertices);
        let c = dot(center, axis);
        intervals_overlap((c - radius, c + radius), polygon)
    })
}
