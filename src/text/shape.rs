//! 2D outlines: paths made of line and Bézier segments, grouped into shapes with holes.

use crate::procedural::utils;
use glamx::Vec2;

/// Number of pieces curves are cut into when classifying sub-paths as solids or holes.
const CLASSIFICATION_DIVISIONS: u32 = 12;

/// One piece of a [`Path`], starting where the previous one ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    /// A straight line to the given point.
    Line(Vec2),
    /// A quadratic Bézier curve.
    Quadratic {
        /// The control point.
        control: Vec2,
        /// The end point.
        to: Vec2,
    },
    /// A cubic Bézier curve.
    Cubic {
        /// The first control point.
        control1: Vec2,
        /// The second control point.
        control2: Vec2,
        /// The end point.
        to: Vec2,
    },
}

/// A closed sequence of segments.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Where the first segment starts.
    pub start: Vec2,
    /// The segments, in drawing order. The path implicitly closes back to `start`.
    pub segments: Vec<Segment>,
}

impl Path {
    /// Creates an empty path starting at `start`.
    pub fn new(start: Vec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Flattens the path into a polygon.
    ///
    /// Curves are cut into `divisions` straight pieces, lines keep their end point.
    /// Consecutive duplicates and a trailing point equal to the first one are removed.
    pub fn points(&self, divisions: u32) -> Vec<Vec2> {
        let divisions = divisions.max(1);
        let mut points = vec![self.start];
        let mut from = self.start;

        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => {
                    push_distinct(&mut points, to);
                    from = to;
                }
                Segment::Quadratic { control, to } => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        push_distinct(&mut points, quadratic_bezier(from, control, to, t));
                    }
                    from = to;
                }
                Segment::Cubic {
                    control1,
                    control2,
                    to,
                } => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        push_distinct(
                            &mut points,
                            cubic_bezier(from, control1, control2, to, t),
                        );
                    }
                    from = to;
                }
            }
        }

        while points.len() > 1 && points.last() == points.first() {
            let _ = points.pop();
        }

        points
    }
}

fn push_distinct(points: &mut Vec<Vec2>, p: Vec2) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

/// A filled outline, possibly with holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// The outer boundary.
    pub outline: Path,
    /// Boundaries of the regions cut out of the outline.
    pub holes: Vec<Path>,
}

impl Shape {
    /// Creates a shape without holes.
    pub fn new(outline: Path) -> Self {
        Self {
            outline,
            holes: Vec::new(),
        }
    }

    /// Flattens the outline and the holes, see [`Path::points`].
    pub fn extract_points(&self, divisions: u32) -> (Vec<Vec2>, Vec<Vec<Vec2>>) {
        (
            self.outline.points(divisions),
            self.holes.iter().map(|h| h.points(divisions)).collect(),
        )
    }
}

/// A set of sub-paths built with pen-like commands, as found in glyph outlines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    subpaths: Vec<Path>,
}

impl ShapePath {
    /// Creates an empty shape path.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sub-paths drawn so far.
    pub fn subpaths(&self) -> &[Path] {
        &self.subpaths
    }

    /// Starts a new sub-path at `p`.
    pub fn move_to(&mut self, p: Vec2) {
        self.subpaths.push(Path::new(p));
    }

    /// Draws a line to `p`. Starts a new sub-path at `p` if none was started.
    pub fn line_to(&mut self, p: Vec2) {
        self.push(p, Segment::Line(p));
    }

    /// Draws a quadratic curve to `to`.
    pub fn quadratic_to(&mut self, control: Vec2, to: Vec2) {
        self.push(to, Segment::Quadratic { control, to });
    }

    /// Draws a cubic curve to `to`.
    pub fn cubic_to(&mut self, control1: Vec2, control2: Vec2, to: Vec2) {
        self.push(
            to,
            Segment::Cubic {
                control1,
                control2,
                to,
            },
        );
    }

    fn push(&mut self, to: Vec2, segment: Segment) {
        match self.subpaths.last_mut() {
            Some(path) => path.segments.push(segment),
            None => self.move_to(to),
        }
    }

    /// Groups the sub-paths into shapes.
    ///
    /// A single sub-path is always solid. Otherwise clockwise sub-paths are solids and
    /// counter-clockwise ones are holes, each hole belonging to the solid containing it.
    /// Sub-paths that flatten to fewer than three points are dropped.
    pub fn to_shapes(&self) -> Vec<Shape> {
        let subpaths: Vec<(&Path, Vec<Vec2>)> = self
            .subpaths
            .iter()
            .map(|p| (p, p.points(CLASSIFICATION_DIVISIONS)))
            .filter(|(_, points)| points.len() >= 3)
            .collect();

        if subpaths.len() == 1 {
            return vec![Shape::new(subpaths[0].0.clone())];
        }

        // Solids with their flattened outlines, in drawing order.
        let mut solids: Vec<(usize, Shape, &[Vec2])> = Vec::new();
        let mut holes: Vec<(usize, &Path, Vec2)> = Vec::new();

        for (order, (path, points)) in subpaths.iter().enumerate() {
            if utils::signed_area(points) < 0.0 {
                solids.push((order, Shape::new((*path).clone()), points.as_slice()));
            } else {
                holes.push((order, *path, points[0]));
            }
        }

        // Outlines wound the other way around: treat everything as solid.
        if solids.is_empty() {
            return subpaths
                .iter()
                .map(|(path, _)| Shape::new((*path).clone()))
                .collect();
        }

        for (order, hole, probe) in holes {
            let owner = if solids.len() == 1 {
                0
            } else {
                solids
                    .iter()
                    .position(|(_, _, outline)| utils::is_point_in_polygon(probe, outline))
                    .or_else(|| solids.iter().rposition(|(o, _, _)| *o < order))
                    .unwrap_or(0)
            };
            solids[owner].1.holes.push(hole.clone());
        }

        solids.into_iter().map(|(_, shape, _)| shape).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(path: &mut ShapePath, min: Vec2, max: Vec2, clockwise: bool) {
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ];
        path.move_to(corners[0]);
        if clockwise {
            for c in corners[1..].iter().rev() {
                path.line_to(*c);
            }
        } else {
            for c in &corners[1..] {
                path.line_to(*c);
            }
        }
    }

    #[test]
    fn curves_are_flattened_into_divisions() {
        let mut path = Path::new(Vec2::ZERO);
        path.segments.push(Segment::Quadratic {
            control: Vec2::new(1.0, 2.0),
            to: Vec2::new(2.0, 0.0),
        });
        let points = path.points(4);
        assert_eq!(points.len(), 5);
        assert_eq!(points[2], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn closing_point_is_dropped() {
        let mut path = ShapePath::new();
        rectangle(&mut path, Vec2::ZERO, Vec2::ONE, false);
        path.line_to(Vec2::ZERO);
        assert_eq!(path.subpaths()[0].points(12).len(), 4);
    }

    #[test]
    fn lone_subpath_is_solid_whatever_its_winding() {
        let mut path = ShapePath::new();
        rectangle(&mut path, Vec2::ZERO, Vec2::ONE, false);
        let shapes = path.to_shapes();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());
    }

    #[test]
    fn holes_go_to_the_solid_containing_them() {
        let mut path = ShapePath::new();
        rectangle(&mut path, Vec2::ZERO, Vec2::splat(4.0), true);
        rectangle(&mut path, Vec2::new(10.0, 0.0), Vec2::new(14.0, 4.0), true);
        rectangle(&mut path, Vec2::new(11.0, 1.0), Vec2::new(13.0, 3.0), false);
        rectangle(&mut path, Vec2::ONE, Vec2::splat(3.0), false);

        let shapes = path.to_shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert_eq!(shapes[0].holes[0].start, Vec2::ONE);
        assert_eq!(shapes[1].holes.len(), 1);
        assert_eq!(shapes[1].holes[0].start, Vec2::new(11.0, 1.0));
    }
}
