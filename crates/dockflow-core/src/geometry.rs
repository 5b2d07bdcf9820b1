//! Pocket geometry — docking bounding boxes and convex-hull volumes.
//!
//! Coordinates come from the prediction/visualization layer; this
//! module treats them as plain points and never mutates them.

use serde::{Deserialize, Serialize};

// ── Points ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        self.sub(other).norm()
    }

    fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn cross(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

// ── Pockets ───────────────────────────────────────────────────────────────────

/// A predicted pocket as supplied by the visualization collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pocket {
    /// Stable name, e.g. "pocket3". Cache key for client computations —
    /// ranks could in principle be reassigned across re-derivations.
    pub name: String,
    /// 1-based rank, stable within a session.
    pub rank: u32,
    pub center: Point3,
    /// Surface atom coordinates.
    pub surface: Vec<Point3>,
}

impl Pocket {
    /// A pocket known only by rank — enough for tasks that never touch
    /// geometry.
    pub fn bare(rank: u32) -> Self {
        Self {
            name: format!("pocket{rank}"),
            rank,
            center: Point3::new(0.0, 0.0, 0.0),
            surface: Vec::new(),
        }
    }
}

// ── Bounding box ──────────────────────────────────────────────────────────────

/// Axis-aligned cubic search box for a docking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: Point3,
    pub size: Point3,
}

/// Cube around the pocket: twice the maximum center-to-surface-atom
/// distance is the cube diagonal, so the side is `2·d/√3`, rounded up
/// to a whole ångström.
pub fn bounding_box(pocket: &Pocket) -> BoundingBox {
    let max_distance = pocket
        .surface
        .iter()
        .map(|coord| coord.distance(&pocket.center))
        .fold(0.0_f64, f64::max);

    let diagonal = max_distance * 2.0;
    let side = (diagonal / 3.0_f64.sqrt()).ceil();

    BoundingBox {
        center: pocket.center,
        size: Point3::new(side, side, side),
    }
}

// ── Convex hull volume ────────────────────────────────────────────────────────

const EPS: f64 = 1e-9;

/// Volume enclosed by the convex hull of `points` (Å³ for atom
/// coordinates): build the hull, then sum signed tetrahedron volumes
/// over its outward-oriented faces.
///
/// Returns `None` for degenerate input — fewer than four distinct
/// points, or all points collinear/coplanar.
pub fn convex_hull_volume(points: &[Point3]) -> Option<f64> {
    let faces = convex_hull(points)?;
    let volume: f64 = faces
        .iter()
        .map(|&[a, b, c]| signed_tetra_volume(&points[a], &points[b], &points[c]))
        .sum();
    Some(volume.abs())
}

/// Signed volume of the tetrahedron (origin, a, b, c). Summed over a
/// closed, consistently oriented surface this telescopes to the
/// enclosed volume regardless of where the origin sits.
fn signed_tetra_volume(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    a.dot(&b.cross(c)) / 6.0
}

/// Normalized signed distance of `p` from the plane of `face`.
/// Positive means `p` sees the face from outside.
fn signed_dist(points: &[Point3], face: &[usize; 3], p: &Point3) -> f64 {
    let a = &points[face[0]];
    let normal = points[face[1]].sub(a).cross(&points[face[2]].sub(a));
    let len = normal.norm();
    if len < EPS {
        return 0.0;
    }
    normal.dot(&p.sub(a)) / len
}

/// Incremental convex hull. Returns outward-oriented triangular faces
/// as index triples into `points`, or `None` for degenerate input.
fn convex_hull(points: &[Point3]) -> Option<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 4 {
        return None;
    }

    // Initial simplex: a point, a second at distance, a third off the
    // line, a fourth off the plane.
    let i0 = 0;
    let i1 = (1..n).find(|&i| points[i].sub(&points[i0]).norm() > EPS)?;
    let edge = points[i1].sub(&points[i0]);
    let i2 = (1..n)
        .find(|&i| i != i1 && edge.cross(&points[i].sub(&points[i0])).norm() > EPS)?;
    let base = [i0, i1, i2];
    let i3 = (1..n)
        .find(|&i| i != i1 && i != i2 && signed_dist(points, &base, &points[i]).abs() > EPS)?;

    // Four faces of the tetrahedron, each oriented so its opposite
    // vertex lies on the negative (inner) side.
    let mut faces: Vec<[usize; 3]> = [
        ([i0, i1, i2], i3),
        ([i0, i1, i3], i2),
        ([i0, i2, i3], i1),
        ([i1, i2, i3], i0),
    ]
    .into_iter()
    .map(|(mut face, opposite)| {
        if signed_dist(points, &face, &points[opposite]) > 0.0 {
            face.swap(1, 2);
        }
        face
    })
    .collect();

    for p in 0..n {
        if p == i0 || p == i1 || p == i2 || p == i3 {
            continue;
        }

        let visible: Vec<usize> = (0..faces.len())
            .filter(|&f| signed_dist(points, &faces[f], &points[p]) > EPS)
            .collect();
        if visible.is_empty() {
            continue; // inside the hull so far
        }

        // Horizon: directed edges of visible faces whose reverse edge
        // belongs to a face that stays.
        let visible_edges: std::collections::HashSet<(usize, usize)> = visible
            .iter()
            .flat_map(|&f| {
                let [a, b, c] = faces[f];
                [(a, b), (b, c), (c, a)]
            })
            .collect();
        let horizon: Vec<(usize, usize)> = visible_edges
            .iter()
            .filter(|(u, v)| !visible_edges.contains(&(*v, *u)))
            .copied()
            .collect();

        let mut keep = vec![true; faces.len()];
        for &f in &visible {
            keep[f] = false;
        }
        let mut kept = 0;
        faces.retain(|_| {
            let k = keep[kept];
            kept += 1;
            k
        });

        for (u, v) in horizon {
            faces.push([u, v, p]);
        }
    }

    Some(faces)
}
