//! Triangulation of flat polygons with holes, on top of lyon's fill tessellator.

use crate::error::{Error, Result};
use glamx::Vec2;
use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

/// Triangulates the region inside `contour` and outside every hole.
///
/// Returns the vertices and counter-clockwise triangles. Vertices may include points
/// created where rings intersect. Rings with fewer than three points are ignored.
pub fn triangulate(contour: &[Vec2], holes: &[Vec<Vec2>]) -> Result<(Vec<Vec2>, Vec<[u32; 3]>)> {
    let mut path_builder = Path::builder();

    for ring in std::iter::once(contour).chain(holes.iter().map(Vec::as_slice)) {
        if ring.len() < 3 {
            continue;
        }

        path_builder.begin(point(ring[0].x, ring[0].y));
        for vertex in ring.iter().skip(1) {
            path_builder.line_to(point(vertex.x, vertex.y));
        }
        path_builder.close();
    }

    let path = path_builder.build();
    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    tessellator
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                Vec2::new(vertex.position().x, vertex.position().y)
            }),
        )
        .map_err(|e| Error::Tessellation(format!("{:?}", e)))?;

    let vertices = buffers.vertices;
    let triangles = buffers
        .indices
        .chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| vertices[i as usize]);
            if (b - a).perp_dot(c - a) < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect();

    Ok((vertices, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn area(vertices: &[Vec2], triangles: &[[u32; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| vertices[i as usize]);
                (b - a).perp_dot(c - a) * 0.5
            })
            .sum()
    }

    #[test]
    fn square_with_hole() {
        let contour = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let hole = vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 1.0),
        ];

        let (vertices, triangles) = triangulate(&contour, &[hole]).unwrap();
        assert!(vertices.len() >= 8);
        assert_relative_eq!(area(&vertices, &triangles), 12.0, epsilon = 1.0e-4);

        for t in &triangles {
            let [a, b, c] = t.map(|i| vertices[i as usize]);
            assert!((b - a).perp_dot(c - a) >= 0.0);
        }
    }

    #[test]
    fn degenerate_rings_produce_nothing() {
        let (vertices, triangles) = triangulate(&[Vec2::ZERO, Vec2::X], &[]).unwrap();
        assert!(vertices.is_empty());
        assert!(triangles.is_empty());
    }
}
