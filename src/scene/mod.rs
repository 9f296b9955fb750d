//! Everything related to the scene graph.

pub use self::object::{
    Geometry, GeometryId, Object, PointGeometry, PointsMaterial, StandardMaterial,
};
pub use self::scene_node::{euler_xyz, SceneNode, SceneNodeData};

mod object;
mod scene_node;

use crate::color::{self, Color};
use crate::light::LightCollection;
use glamx::Vec3;

/// The root of everything that gets drawn, plus the color the frame is cleared with.
#[derive(Clone)]
pub struct Scene {
    root: SceneNode,
    /// Clear color of every frame.
    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene on a black background.
    pub fn new() -> Self {
        Self {
            root: SceneNode::empty(),
            background: color::BLACK,
        }
    }

    /// The root node. Every object of the scene is one of its descendants.
    #[inline]
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// The root node, mutably, to add children.
    #[inline]
    pub fn root_mut(&mut self) -> &mut SceneNode {
        &mut self.root
    }

    /// The number of direct children of the root.
    #[inline]
    pub fn num_children(&self) -> usize {
        self.root.num_children()
    }

    /// Gathers the enabled lights of all visible nodes, with their world positions.
    ///
    /// Point lights beyond [`crate::light::MAX_LIGHTS`] are dropped with a warning.
    pub fn collect_lights(&self) -> LightCollection {
        let mut lights = LightCollection::new();
        let mut dropped = 0;

        self.root.traverse(&mut |data, world| {
            if let Some(light) = data.light() {
                if !lights.add(light, world.transform_point3(Vec3::ZERO)) {
                    dropped += 1;
                }
            }
        });

        if dropped > 0 {
            log::warn!("Too many point lights: {} ignored.", dropped);
        }

        lights
    }
}
