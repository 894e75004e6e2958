//! Points, axis-aligned bounds, and the segment/polygon math shared by the
//! collision, interaction, and room extraction code.

use geo::{Area, Centroid, Contains, Coord, LineString, Polygon as GeoPolygon};
use nalgebra::{Rotation2, Vector2};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Cross products below this magnitude are treated as parallel
const PARALLEL_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate counter-clockwise (y-up) around `pivot` by `degrees`
    pub fn rotated_about(&self, pivot: &Point, degrees: f64) -> Point {
        let offset = Rotation2::new(degrees.to_radians())
            * Vector2::new(self.x - pivot.x, self.y - pivot.y);
        Point::new(pivot.x + offset.x, pivot.y + offset.y)
    }

    pub fn scaled_about(&self, pivot: &Point, factor: f64) -> Point {
        Point::new(
            pivot.x + (self.x - pivot.x) * factor,
            pivot.y + (self.y - pivot.y) * factor,
        )
    }

    pub fn approx_eq(&self, other: &Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    fn to_coord(self) -> Coord<f64> {
        Coord { x: self.x, y: self.y }
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Point::new(point.x(), point.y())
    }
}

/// Hashable cell of a snapping grid with pitch `tolerance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: OrderedFloat<f64>,
    y: OrderedFloat<f64>,
}

impl PointKey {
    pub fn snapped(point: &Point, tolerance: f64) -> Self {
        PointKey {
            x: OrderedFloat((point.x / tolerance).round()),
            y: OrderedFloat((point.y / tolerance).round()),
        }
    }

    /// This cell and its eight neighbours
    pub fn neighborhood(&self) -> impl Iterator<Item = PointKey> + '_ {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dy| PointKey {
                x: OrderedFloat(self.x.0 + dx as f64),
                y: OrderedFloat(self.y.0 + dy as f64),
            })
        })
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        for point in &points[1..] {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.max_y = bounds.max_y.max(point.y);
        }

        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow (positive) or shrink (negative) every side by `amount`
    pub fn expanded(&self, amount: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Shrink every side by `tolerance`. A box thinner than twice the
    /// tolerance collapses to its center line instead of inverting.
    pub fn inset(&self, tolerance: f64) -> Bounds {
        let center = self.center();
        let half_w = (self.width() / 2.0 - tolerance).max(0.0);
        let half_h = (self.height() / 2.0 - tolerance).max(0.0);
        Bounds {
            min_x: center.x - half_w,
            min_y: center.y - half_h,
            max_x: center.x + half_w,
            max_y: center.y + half_h,
        }
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Distance from `p` to the segment `[a, b]`; a degenerate segment behaves as a point
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return p.distance_to(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Parameters `(t, s)` of the intersection of `[a1, a2]` and `[b1, b2]`,
/// both in `[0, 1]`. Near-parallel segments never intersect.
pub fn segment_intersection(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<(f64, f64)> {
    let d1x = a2.x - a1.x;
    let d1y = a2.y - a1.y;
    let d2x = b2.x - b1.x;
    let d2y = b2.y - b1.y;

    let cross = d1x * d2y - d1y * d2x;
    if cross.abs() < PARALLEL_EPSILON {
        return None;
    }

    let dx = b1.x - a1.x;
    let dy = b1.y - a1.y;
    let t = (dx * d2y - dy * d2x) / cross;
    let s = (dx * d1y - dy * d1x) / cross;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        Some((t, s))
    } else {
        None
    }
}

pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    segment_intersection(a1, a2, b1, b2).is_some()
}

/// Proper crossing: the intersection lies strictly inside both segments,
/// so shared endpoints and T-junctions do not count.
pub fn segments_cross(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let interior = PARALLEL_EPSILON..=(1.0 - PARALLEL_EPSILON);
    matches!(
        segment_intersection(a1, a2, b1, b2),
        Some((t, s)) if interior.contains(&t) && interior.contains(&s)
    )
}

fn to_geo_polygon(points: &[Point]) -> GeoPolygon<f64> {
    let coords: Vec<Coord> = points.iter().map(|p| p.to_coord()).collect();
    GeoPolygon::new(LineString::from(coords), vec![])
}

/// Signed shoelace area; positive for counter-clockwise rings (y-up)
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    to_geo_polygon(points).signed_area()
}

/// Area centroid, or `None` for a degenerate (zero-area) ring
pub fn polygon_centroid(points: &[Point]) -> Option<Point> {
    if polygon_area(points).abs() < PARALLEL_EPSILON {
        return None;
    }
    to_geo_polygon(points).centroid().map(Point::from)
}

/// Strict containment; points on the boundary are outside
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    to_geo_polygon(polygon).contains(&geo::Point::new(point.x, point.y))
}
