use super::utils;
use glamx::{Vec2, Vec3};

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// The smallest coordinates on each axis.
    pub mins: Vec3,
    /// The largest coordinates on each axis.
    pub maxs: Vec3,
}

impl Aabb {
    /// The point halfway between `mins` and `maxs`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.mins + self.maxs) * 0.5
    }

    /// The size of the box along each axis.
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.maxs - self.mins
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
/// Geometric description of a triangle mesh.
pub struct RenderMesh {
    /// Coordinates of the mesh vertices.
    pub coords: Vec<Vec3>,
    /// Per-vertex normals of the mesh.
    pub normals: Option<Vec<Vec3>>,
    /// Textures coordinates of the mesh.
    pub uvs: Option<Vec<Vec2>>,
    /// Counter-clockwise triangles, indexing `coords`, `normals` and `uvs` alike.
    pub indices: Vec<[u32; 3]>,
}

impl RenderMesh {
    /// Creates a new mesh.
    ///
    /// If no `indices` is provided, every three consecutive vertices form a triangle.
    pub fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        indices: Option<Vec<[u32; 3]>>,
    ) -> RenderMesh {
        let indices = indices.unwrap_or_else(|| {
            (0..coords.len() as u32 / 3)
                .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                .collect()
        });

        RenderMesh {
            coords,
            normals,
            uvs,
            indices,
        }
    }

    /// Whether or not this triangle mesh has normals.
    #[inline]
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// The number of vertices of this mesh.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.coords.len()
    }

    /// The number of triangles on this mesh.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Returns the index buffer flattened into a single list.
    #[inline]
    pub fn flat_indices(&self) -> Vec<u32> {
        self.indices.iter().flatten().copied().collect()
    }

    /// Translates each vertex of this mesh.
    #[inline]
    pub fn translate_by(&mut self, t: Vec3) {
        for c in self.coords.iter_mut() {
            *c += t;
        }
    }

    /// Scales each vertex of this mesh.
    ///
    /// For non-uniform scaling, normals are transformed by the inverse of the scale factors
    /// and then renormalized to remain perpendicular to the scaled surface.
    #[inline]
    pub fn scale_by(&mut self, s: Vec3) {
        for c in self.coords.iter_mut() {
            *c *= s;
        }

        if let Some(ref mut normals) = self.normals {
            let inv_scale = Vec3::new(1.0 / s.x, 1.0 / s.y, 1.0 / s.z);
            for n in normals.iter_mut() {
                *n = (*n * inv_scale).normalize_or_zero();
            }
        }
    }

    /// Recomputes the mesh normals using its vertex coordinates and adjacency information
    /// inferred from the index buffer.
    ///
    /// Vertices that are not shared between triangles end up with flat face normals.
    #[inline]
    pub fn recompute_normals(&mut self) {
        let mut new_normals = Vec::new();
        utils::compute_normals(&self.coords, &self.indices, &mut new_normals);
        self.normals = Some(new_normals);
    }

    /// Flips the orientation of every triangle of this mesh, and its normals.
    #[inline]
    pub fn flip_triangles(&mut self) {
        utils::reverse_clockwising(&mut self.indices);

        if let Some(ref mut normals) = self.normals {
            for n in normals {
                *n = -*n
            }
        }
    }

    /// Appends the vertices and triangles of `other` to this mesh.
    ///
    /// Normals and uvs are kept only if both meshes have them.
    pub fn append(&mut self, other: &RenderMesh) {
        let base = self.coords.len() as u32;
        let was_empty = self.coords.is_empty();

        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut ns), Some(other_ns)) => {
                ns.extend_from_slice(other_ns);
                Some(ns)
            }
            (None, Some(other_ns)) if was_empty => Some(other_ns.clone()),
            _ => None,
        };
        self.uvs = match (self.uvs.take(), &other.uvs) {
            (Some(mut uvs), Some(other_uvs)) => {
                uvs.extend_from_slice(other_uvs);
                Some(uvs)
            }
            (None, Some(other_uvs)) if was_empty => Some(other_uvs.clone()),
            _ => None,
        };

        self.coords.extend_from_slice(&other.coords);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
        );
    }

    /// The bounding box of the vertices, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.coords.first()?;
        let (mins, maxs) = self
            .coords
            .iter()
            .fold((first, first), |(mins, maxs), c| (mins.min(*c), maxs.max(*c)));

        Some(Aabb { mins, maxs })
    }

    /// Translates the mesh so that its bounding box is centered on the origin.
    ///
    /// Returns the applied translation.
    pub fn center(&mut self) -> Vec3 {
        let shift = self.bounding_box().map(|b| -b.center()).unwrap_or(Vec3::ZERO);
        self.translate_by(shift);
        shift
    }
}
