//! Drawable content of scene nodes: geometry plus the material it is drawn with.

use crate::color::{self, Color};
use crate::procedural::{PointCloud, RenderMesh};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a [`Geometry`] for the lifetime of the process.
///
/// Renderers key their GPU buffers on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        GeometryId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable triangle geometry shared by any number of meshes.
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    mesh: RenderMesh,
}

impl Geometry {
    /// Wraps `mesh`, computing its normals if it has none.
    pub fn new(mut mesh: RenderMesh) -> Rc<Self> {
        if !mesh.has_normals() {
            mesh.recompute_normals();
        }

        Rc::new(Self {
            id: GeometryId::next(),
            mesh,
        })
    }

    /// The unique id of this geometry.
    #[inline]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// The triangles of this geometry.
    #[inline]
    pub fn mesh(&self) -> &RenderMesh {
        &self.mesh
    }
}

/// Immutable point geometry shared by any number of point objects.
#[derive(Debug)]
pub struct PointGeometry {
    id: GeometryId,
    cloud: PointCloud,
}

impl PointGeometry {
    /// Wraps `cloud`.
    pub fn new(cloud: PointCloud) -> Rc<Self> {
        Rc::new(Self {
            id: GeometryId::next(),
            cloud,
        })
    }

    /// The unique id of this geometry.
    #[inline]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// The points of this geometry.
    #[inline]
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }
}

/// A physically based material: metallic/roughness workflow plus an emissive term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardMaterial {
    /// Base color.
    pub color: Color,
    /// 0 for dielectrics, 1 for metals.
    pub metalness: f32,
    /// 0 for mirror-like surfaces, 1 for fully diffuse ones.
    pub roughness: f32,
    /// Light emitted by the surface regardless of lighting.
    pub emissive: Color,
    /// Multiplier of `emissive`.
    pub emissive_intensity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            emissive: color::BLACK,
            emissive_intensity: 1.0,
        }
    }
}

impl StandardMaterial {
    /// Creates a material with the given base color and default parameters.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Sets metalness and roughness.
    pub fn with_metal_rough(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }

    /// Sets the emissive color and its intensity.
    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }
}

/// Appearance of point clouds: flat screen-aligned squares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointsMaterial {
    /// Color of every point.
    pub color: Color,
    /// Side of each square, in scene units with attenuation, in pixels otherwise.
    pub size: f32,
    /// Whether points shrink with distance to the camera.
    pub size_attenuation: bool,
    /// Whether `opacity` is honored.
    pub transparent: bool,
    /// Opacity of every point when `transparent` is set.
    pub opacity: f32,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            color: color::WHITE,
            size: 1.0,
            size_attenuation: true,
            transparent: false,
            opacity: 1.0,
        }
    }
}

impl PointsMaterial {
    /// The opacity used when drawing.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity
        } else {
            1.0
        }
    }
}

/// Something a scene node can draw.
#[derive(Clone, Debug)]
pub enum Object {
    /// A triangle mesh.
    Mesh {
        /// Its shape.
        geometry: Rc<Geometry>,
        /// How it looks.
        material: StandardMaterial,
    },
    /// A point cloud.
    Points {
        /// The points.
        geometry: Rc<PointGeometry>,
        /// How they look.
        material: PointsMaterial,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural;

    #[test]
    fn geometries_get_distinct_ids() {
        let a = Geometry::new(procedural::unit_cuboid());
        let b = Geometry::new(procedural::unit_cuboid());
        let c = PointGeometry::new(PointCloud::default());
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn geometry_gets_normals() {
        let mut mesh = procedural::unit_cuboid();
        mesh.normals = None;
        assert!(Geometry::new(mesh).mesh().has_normals());
    }

    #[test]
    fn opaque_points_ignore_opacity() {
        let material = PointsMaterial {
            opacity: 0.3,
            ..Default::default()
        };
        assert_eq!(material.effective_opacity(), 1.0);
    }
}
