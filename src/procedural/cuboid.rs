use super::{utils, RenderMesh};
use glamx::{Vec2, Vec3};

/// Generates a cuboid (box) mesh with the specified extents.
///
/// Creates a rectangular box mesh centered at the origin with the given dimensions.
/// Each face has its own four vertices so that normals stay flat.
///
/// # Arguments
/// * `extents` - The full dimensions of the cuboid along each axis (width, height, depth)
///
/// # Example
/// ```
/// # use wip3d::procedural::cuboid;
/// # use glamx::Vec3;
/// let box_mesh = cuboid(Vec3::new(2.0, 3.0, 4.0));
/// assert_eq!(box_mesh.num_triangles(), 12);
/// ```
pub fn cuboid(extents: Vec3) -> RenderMesh {
    let mut cuboid = unit_cuboid();
    cuboid.scale_by(extents);

    cuboid
}

/// Generates a unit cuboid mesh.
///
/// Creates a cube mesh centered at the origin with dimensions 1x1x1 (half-extents of 0.5),
/// with normals and texture coordinates.
pub fn unit_cuboid() -> RenderMesh {
    // (normal, u, v) with u x v == normal so that every face winds counter-clockwise.
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut coords = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut faces = Vec::with_capacity(12);

    for (normal, u, v) in FACES {
        let base = coords.len() as u32;

        for uv in [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ] {
            coords.push(normal * 0.5 + u * (uv.x - 0.5) + v * (uv.y - 0.5));
            normals.push(normal);
            uvs.push(uv);
        }

        utils::push_rectangle_indices(base + 3, base + 2, base, base + 1, &mut faces);
    }

    RenderMesh::new(coords, Some(normals), Some(uvs), Some(faces))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cuboid_spans_half_extents() {
        let mesh = unit_cuboid();
        assert_eq!(mesh.num_vertices(), 24);
        assert_eq!(mesh.num_triangles(), 12);

        let aabb = mesh.bounding_box().unwrap();
        assert_eq!(aabb.mins, Vec3::splat(-0.5));
        assert_eq!(aabb.maxs, Vec3::splat(0.5));
    }

    #[test]
    fn faces_point_outwards() {
        let mesh = unit_cuboid();
        let normals = mesh.normals.as_ref().unwrap();

        for t in &mesh.indices {
            let [a, b, c] = t.map(|i| mesh.coords[i as usize]);
            let face_normal = (b - a).cross(c - a).normalize();
            assert!(face_normal.abs_diff_eq(normals[t[0] as usize], 1.0e-6));
            assert!(face_normal.dot(a) > 0.0);
        }
    }
}
