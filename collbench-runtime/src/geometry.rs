//! 2D geometry used by the built-in planar scene.
//!
//! Links are capsules (a segment plus a radius), so every query reduces to a
//! distance between a segment and a point, segment or box.

pub use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Segment { start, end }
    }

    pub fn closest_point(&self, p: DVec2) -> DVec2 {
        let d = self.end - self.start;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return self.start;
        }
        let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        self.start + d * t
    }

    pub fn distance_to_point(&self, p: DVec2) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// Proper or touching intersection of two segments.
    pub fn intersects(&self, other: &Segment) -> bool {
        let d1 = orientation(other.start, other.end, self.start);
        let d2 = orientation(other.start, other.end, self.end);
        let d3 = orientation(self.start, self.end, other.start);
        let d4 = orientation(self.start, self.end, other.end);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && on_segment(other, self.start))
            || (d2 == 0.0 && on_segment(other, self.end))
            || (d3 == 0.0 && on_segment(self, other.start))
            || (d4 == 0.0 && on_segment(self, other.end))
    }

    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        self.distance_to_point(other.start)
            .min(self.distance_to_point(other.end))
            .min(other.distance_to_point(self.start))
            .min(other.distance_to_point(self.end))
    }
}

fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

// Assumes `p` is collinear with the segment.
fn on_segment(segment: &Segment, p: DVec2) -> bool {
    p.x >= segment.start.x.min(segment.end.x)
        && p.x <= segment.start.x.max(segment.end.x)
        && p.y >= segment.start.y.min(segment.end.y)
        && p.y <= segment.start.y.max(segment.end.y)
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Aabb { min, max }
    }

    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }

    pub fn distance_to_point(&self, p: DVec2) -> f64 {
        p.clamp(self.min, self.max).distance(p)
    }

    pub fn distance_to_segment(&self, segment: &Segment) -> f64 {
        if self.contains_point(segment.start) || self.contains_point(segment.end) {
            return 0.0;
        }

        let corners = self.corners();
        let crosses_edge = (0..4).any(|i| {
            let edge = Segment::new(corners[i], corners[(i + 1) % 4]);
            segment.intersects(&edge)
        });
        if crosses_edge {
            return 0.0;
        }

        // Disjoint convex shapes: the closest pair involves a vertex of one of them.
        let endpoint_distance = self
            .distance_to_point(segment.start)
            .min(self.distance_to_point(segment.end));
        corners
            .iter()
            .map(|&c| segment.distance_to_point(c))
            .fold(endpoint_distance, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let seg = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0));
        assert_eq!(seg.closest_point(DVec2::new(1.0, 3.0)), DVec2::new(1.0, 0.0));
        assert_eq!(seg.closest_point(DVec2::new(-5.0, 1.0)), DVec2::new(0.0, 0.0));
        assert_eq!(seg.closest_point(DVec2::new(7.0, -1.0)), DVec2::new(2.0, 0.0));
    }

    #[test]
    fn test_degenerate_segment_distance() {
        let seg = Segment::new(DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0));
        assert!((seg.distance_to_point(DVec2::new(4.0, 5.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_segment_intersection() {
        let a = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(2.0, 2.0));
        let b = Segment::new(DVec2::new(0.0, 2.0), DVec2::new(2.0, 0.0));
        assert!(a.intersects(&b));
        assert_eq!(a.distance_to_segment(&b), 0.0);

        // Touching at an endpoint
        let c = Segment::new(DVec2::new(2.0, 2.0), DVec2::new(3.0, 0.0));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_parallel_segment_distance() {
        let a = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0));
        let b = Segment::new(DVec2::new(1.0, 1.5), DVec2::new(3.0, 1.5));
        assert!(!a.intersects(&b));
        assert!((a.distance_to_segment(&b) - 1.5).abs() < EPS);
    }

    #[test]
    fn test_aabb_distance_to_point() {
        let aabb = Aabb::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        assert_eq!(aabb.distance_to_point(DVec2::new(0.5, 0.5)), 0.0);
        assert!((aabb.distance_to_point(DVec2::new(4.0, 5.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_aabb_segment_crossing() {
        let aabb = Aabb::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        // Passes straight through with both endpoints outside
        let seg = Segment::new(DVec2::new(-1.0, 0.5), DVec2::new(2.0, 0.5));
        assert_eq!(aabb.distance_to_segment(&seg), 0.0);
    }

    #[test]
    fn test_aabb_segment_near_corner() {
        let aabb = Aabb::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        // Diagonal segment passing by the (1, 1) corner
        let seg = Segment::new(DVec2::new(3.0, 1.0), DVec2::new(1.0, 3.0));
        let expected = (2.0_f64).sqrt();
        assert!((aabb.distance_to_segment(&seg) - expected).abs() < EPS);
    }
}
