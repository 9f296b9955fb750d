use super::RenderMesh;
use glamx::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Generates a UV sphere centered at the origin.
///
/// # Arguments
/// * `radius` - The radius of the sphere
/// * `width_segments` - Number of subdivisions around the vertical axis (at least 3)
/// * `height_segments` - Number of subdivisions from pole to pole (at least 2)
///
/// The mesh has `(width_segments + 1) * (height_segments + 1)` vertices: the seam and the
/// poles are duplicated so that texture coordinates stay continuous.
///
/// # Example
/// ```
/// # use wip3d::procedural::sphere;
/// let ball = sphere(0.5, 32, 32);
/// assert_eq!(ball.num_vertices(), 33 * 33);
/// ```
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> RenderMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row_len = width_segments + 1;

    let num_vertices = (row_len * (height_segments + 1)) as usize;
    let mut coords = Vec::with_capacity(num_vertices);
    let mut normals = Vec::with_capacity(num_vertices);
    let mut uvs = Vec::with_capacity(num_vertices);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;

        // Pole vertices take the texture coordinate of the middle of their segment.
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;

            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            coords.push(normal * radius);
            normals.push(normal);
            uvs.push(Vec2::new(u + u_offset, 1.0 - v));
        }
    }

    let mut faces = Vec::with_capacity((width_segments * (height_segments - 1) * 2) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row_len + ix + 1;
            let b = iy * row_len + ix;
            let c = (iy + 1) * row_len + ix;
            let d = (iy + 1) * row_len + ix + 1;

            if iy != 0 {
                faces.push([a, b, d]);
            }
            if iy != height_segments - 1 {
                faces.push([b, c, d]);
            }
        }
    }

    RenderMesh::new(coords, Some(normals), Some(uvs), Some(faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertices_lie_on_the_sphere() {
        let mesh = sphere(0.5, 32, 32);
        assert_eq!(mesh.num_vertices(), 33 * 33);
        assert_eq!(mesh.num_triangles(), 32 * 31 * 2);

        for c in &mesh.coords {
            assert_relative_eq!(c.length(), 0.5, epsilon = 1.0e-5);
        }
    }

    #[test]
    fn triangles_face_outwards() {
        let mesh = sphere(1.0, 8, 6);

        for t in &mesh.indices {
            let [a, b, c] = t.map(|i| mesh.coords[i as usize]);
            let normal = (b - a).cross(c - a);
            assert!(normal.dot(a + b + c) > 0.0);
        }
    }
}
