//! Planar polygon predicates for footprint blockers.
//!
//! Points are `[x, z]` ground coordinates.  Rings are implicitly closed (the
//! last vertex connects back to the first).

/// Ground polygon with optional holes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub exterior: Vec<[f64; 2]>,
    pub holes:    Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn new(exterior: Vec<[f64; 2]>, holes: Vec<Vec<[f64; 2]>>) -> Self {
        Self { exterior, holes }
    }

    /// `(min, max)` corners of the exterior ring.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in &self.exterior {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        (min, max)
    }

    /// Inside the exterior and outside every hole (boundary counts as inside).
    pub fn contains(&self, p: [f64; 2]) -> bool {
        if on_ring(p, &self.exterior) {
            return true;
        }
        if !in_ring(p, &self.exterior) {
            return false;
        }
        self.holes.iter().all(|h| on_ring(p, h) || !in_ring(p, h))
    }

    /// Euclidean distance from `p` to the nearest edge of any ring.
    pub fn boundary_distance(&self, p: [f64; 2]) -> f64 {
        self.rings()
            .flat_map(edges)
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Does the disc of `radius` around `p` touch the polygon?
    pub fn intersects_disc(&self, p: [f64; 2], radius: f64) -> bool {
        self.contains(p) || (radius > 0.0 && self.boundary_distance(p) <= radius)
    }

    /// Does the closed rectangle `[min, max]` touch the polygon?
    pub fn intersects_rect(&self, min: [f64; 2], max: [f64; 2]) -> bool {
        let corners = [min, [max[0], min[1]], max, [min[0], max[1]]];
        if corners.iter().any(|&c| self.contains(c)) {
            return true;
        }
        let inside = |p: &[f64; 2]| p[0] >= min[0] && p[0] <= max[0] && p[1] >= min[1] && p[1] <= max[1];
        if self.exterior.iter().any(inside) {
            return true;
        }
        let rect_edges: Vec<_> = edges(&corners).collect();
        self.rings()
            .flat_map(edges)
            .any(|(a, b)| rect_edges.iter().any(|&(c, d)| segments_intersect(a, b, c, d)))
    }

    fn rings(&self) -> impl Iterator<Item = &[[f64; 2]]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

fn edges(ring: &[[f64; 2]]) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Even-odd ray cast.
fn in_ring(p: [f64; 2], ring: &[[f64; 2]]) -> bool {
    let mut inside = false;
    for (a, b) in edges(ring) {
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x = a[0] + (p[1] - a[1]) / (b[1] - a[1]) * (b[0] - a[0]);
            if p[0] < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_ring(p: [f64; 2], ring: &[[f64; 2]]) -> bool {
    edges(ring).any(|(a, b)| segment_distance(p, a, b) <= f64::EPSILON)
}

fn segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    let s = if len2 == 0.0 { 0.0 } else { ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0) };
    let dx = ap[0] - s * ab[0];
    let dz = ap[1] - s * ab[1];
    (dx * dx + dz * dz).sqrt()
}

fn orientation(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn segments_intersect(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }
    // Collinear / touching cases.
    segment_distance(a, c, d) <= f64::EPSILON
        || segment_distance(b, c, d) <= f64::EPSILON
        || segment_distance(c, a, b) <= f64::EPSILON
        || segment_distance(d, a, b) <= f64::EPSILON
}
