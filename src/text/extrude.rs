//! Extrusion of flat shapes into closed, optionally beveled, solids.

use super::shape::Shape;
use super::tessellate;
use crate::error::Result;
use crate::procedural::utils;
use crate::procedural::RenderMesh;
use glamx::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, SQRT_2};

/// Parameters of an extrusion along +Z.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtrudeOptions {
    /// Distance between the front and back faces, bevels excluded.
    pub depth: f32,
    /// Number of subdivisions along the depth.
    pub steps: u32,
    /// Number of straight pieces each curve is cut into.
    pub curve_segments: u32,
    /// Whether to round the front and back edges.
    pub bevel_enabled: bool,
    /// How far the bevel extends in front of and behind the body.
    pub bevel_thickness: f32,
    /// How far the bevel grows the outline.
    pub bevel_size: f32,
    /// How far the bevel starts from the outline.
    pub bevel_offset: f32,
    /// Number of layers on each bevel.
    pub bevel_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 1.0,
            steps: 1,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_offset: 0.0,
            bevel_segments: 3,
        }
    }
}

impl ExtrudeOptions {
    /// The `(z, outline offset)` of every ring layer, from front to back.
    ///
    /// With bevels the solid spans `-bevel_thickness ..= depth + bevel_thickness`,
    /// otherwise `0 ..= depth`.
    pub fn layers(&self) -> Vec<(f32, f32)> {
        let steps = self.steps.max(1);
        let body = |s: u32| self.depth * s as f32 / steps as f32;

        if !self.bevel_enabled {
            return (0..=steps).map(|s| (body(s), 0.0)).collect();
        }

        let segments = self.bevel_segments.max(1);
        let bevel = |b: u32| {
            let t = b as f32 / segments as f32;
            (
                self.bevel_thickness * (t * FRAC_PI_2).cos(),
                self.bevel_size * (t * FRAC_PI_2).sin() + self.bevel_offset,
            )
        };
        let body_offset = self.bevel_size + self.bevel_offset;

        let mut layers = Vec::with_capacity((segments * 2 + steps + 1) as usize);
        layers.extend((0..segments).map(bevel).map(|(z, d)| (-z, d)));
        layers.extend((0..=steps).map(|s| (body(s), body_offset)));
        layers.extend((0..segments).rev().map(bevel).map(|(z, d)| (self.depth + z, d)));
        layers
    }
}

/// Extrudes every shape and merges the result into a single flat-shaded mesh.
pub fn extrude_shapes(shapes: &[Shape], options: &ExtrudeOptions) -> Result<RenderMesh> {
    let mut coords = Vec::new();

    for shape in shapes {
        extrude_shape(shape, options, &mut coords)?;
    }

    let mut mesh = RenderMesh::new(coords, None, None, None);
    mesh.recompute_normals();
    Ok(mesh)
}

fn extrude_shape(shape: &Shape, options: &ExtrudeOptions, out: &mut Vec<Vec3>) -> Result<()> {
    let (mut contour, mut holes) = shape.extract_points(options.curve_segments);
    if contour.len() < 3 {
        return Ok(());
    }

    // Outer rings counter-clockwise, holes clockwise.
    if utils::signed_area(&contour) < 0.0 {
        contour.reverse();
    }
    holes.retain(|h| h.len() >= 3);
    for hole in holes.iter_mut() {
        if utils::signed_area(hole) > 0.0 {
            hole.reverse();
        }
    }

    let rings: Vec<&[Vec2]> = std::iter::once(contour.as_slice())
        .chain(holes.iter().map(Vec::as_slice))
        .collect();
    let bevels: Vec<Vec<Vec2>> = rings.iter().map(|r| bevel_vectors(r)).collect();
    let layers = options.layers();

    let offset_ring = |ring: usize, offset: f32| -> Vec<Vec2> {
        rings[ring]
            .iter()
            .zip(&bevels[ring])
            .map(|(p, m)| *p + *m * offset)
            .collect()
    };

    // Caps. The first and last layers share the same outline offset.
    let (front_z, cap_offset) = layers[0];
    let back_z = layers[layers.len() - 1].0;
    let cap_rings: Vec<Vec<Vec2>> = (0..rings.len()).map(|r| offset_ring(r, cap_offset)).collect();
    let (cap_vertices, cap_triangles) = tessellate::triangulate(&cap_rings[0], &cap_rings[1..])?;

    for [a, b, c] in cap_triangles.iter().map(|t| t.map(|i| cap_vertices[i as usize])) {
        out.extend([a.extend(front_z), c.extend(front_z), b.extend(front_z)]);
        out.extend([a.extend(back_z), b.extend(back_z), c.extend(back_z)]);
    }

    // Side walls, layer by layer.
    for ring in 0..rings.len() {
        let stack: Vec<Vec<Vec3>> = layers
            .iter()
            .map(|&(z, offset)| {
                offset_ring(ring, offset)
                    .into_iter()
                    .map(|p| p.extend(z))
                    .collect()
            })
            .collect();

        for pair in stack.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let n = lower.len();

            for j in 0..n {
                let k = (j + 1) % n;
                out.extend([lower[j], lower[k], upper[k]]);
                out.extend([lower[j], upper[k], upper[j]]);
            }
        }
    }

    Ok(())
}

/// Per-vertex directions along which a ring grows, with miter length clamped to `sqrt(2)`.
fn bevel_vectors(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    let right_normal = |e: Vec2| Vec2::new(e.y, -e.x).normalize_or_zero();

    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let n1 = right_normal(ring[i] - prev);
            let n2 = right_normal(next - ring[i]);
            let bisector = n1 + n2;

            if bisector.length_squared() < 1.0e-12 {
                return n1;
            }

            let dir = bisector.normalize();
            let cos = dir.dot(n1);
            if cos <= 0.0 {
                dir * SQRT_2
            } else {
                dir * (1.0 / cos).min(SQRT_2)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::shape::{Path, Segment};
    use approx::assert_relative_eq;

    fn square(size: f32) -> Shape {
        let mut path = Path::new(Vec2::ZERO);
        path.segments = vec![
            Segment::Line(Vec2::new(size, 0.0)),
            Segment::Line(Vec2::new(size, size)),
            Segment::Line(Vec2::new(0.0, size)),
        ];
        Shape::new(path)
    }

    fn flat() -> ExtrudeOptions {
        ExtrudeOptions {
            depth: 0.5,
            bevel_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn unbeveled_extrusion_spans_depth() {
        let mesh = extrude_shapes(&[square(2.0)], &flat()).unwrap();
        let aabb = mesh.bounding_box().unwrap();

        assert_eq!(aabb.mins, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.maxs, Vec3::new(2.0, 2.0, 0.5));
        // Two caps of at least two triangles, four walls of two triangles.
        assert!(mesh.num_triangles() >= 4 + 8);
    }

    #[test]
    fn bevel_grows_outline_and_depth() {
        let options = ExtrudeOptions {
            depth: 0.3,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.05,
            bevel_size: 0.03,
            bevel_offset: 0.0,
            bevel_segments: 5,
            steps: 1,
        };
        let mesh = extrude_shapes(&[square(1.0)], &options).unwrap();
        let aabb = mesh.bounding_box().unwrap();

        assert_relative_eq!(aabb.mins.z, -0.05, epsilon = 1.0e-6);
        assert_relative_eq!(aabb.maxs.z, 0.35, epsilon = 1.0e-6);
        assert_relative_eq!(aabb.mins.x, -0.03, epsilon = 1.0e-5);
        assert_relative_eq!(aabb.maxs.y, 1.03, epsilon = 1.0e-5);
    }

    #[test]
    fn layer_count_follows_segments_and_steps() {
        let options = ExtrudeOptions {
            bevel_segments: 5,
            steps: 2,
            ..Default::default()
        };
        let layers = options.layers();
        assert_eq!(layers.len(), 5 * 2 + 2 + 1);
        assert_eq!(layers[0].1, options.bevel_offset);
        assert_eq!(layers[layers.len() - 1].1, options.bevel_offset);
    }

    #[test]
    fn walls_face_outwards() {
        let mesh = extrude_shapes(&[square(1.0)], &flat()).unwrap();
        let normals = mesh.normals.as_ref().unwrap();
        let center = Vec3::new(0.5, 0.5, 0.25);

        for t in &mesh.indices {
            let a = mesh.coords[t[0] as usize];
            assert!(normals[t[0] as usize].dot(a - center) > 0.0);
        }
    }

    #[test]
    fn holes_get_inward_walls() {
        let mut shape = square(4.0);
        let mut hole = Path::new(Vec2::ONE);
        hole.segments = vec![
            Segment::Line(Vec2::new(3.0, 1.0)),
            Segment::Line(Vec2::new(3.0, 3.0)),
            Segment::Line(Vec2::new(1.0, 3.0)),
        ];
        shape.holes.push(hole);

        let mesh = extrude_shapes(&[shape], &flat()).unwrap();
        let normals = mesh.normals.as_ref().unwrap();
        let axis = Vec2::new(2.0, 2.0);

        for (i, c) in mesh.coords.iter().enumerate() {
            let radial = c.truncate() - axis;
            let on_hole_wall = radial.x.abs() <= 1.0 && radial.y.abs() <= 1.0;
            let n = normals[i];
            if on_hole_wall && n.z == 0.0 {
                // Hole walls face the hole axis.
                assert!(n.truncate().dot(radial) < 0.0);
            }
        }
    }
}
