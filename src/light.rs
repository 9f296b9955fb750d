//! Lighting configuration for the scene.
//!
//! Lights live in the scene tree like any other node. Ambient lights contribute a
//! uniform term to every lit surface; point lights take their position from the
//! world transform of the node that carries them.

use crate::color::Color;
use glamx::Vec3;

/// Maximum number of point lights supported in a scene.
pub const MAX_LIGHTS: usize = 8;

/// The type of light source.
#[derive(Clone, Debug, PartialEq)]
pub enum LightType {
    /// Uniform light hitting every surface from every direction.
    Ambient,

    /// A light that emits equally in all directions from a point.
    Point {
        /// Range of the light. `0.0` means unlimited.
        distance: f32,
        /// How fast the light dims with distance. `2.0` is physically correct.
        decay: f32,
    },
}

/// A light source that can be attached to a scene node.
///
/// # Examples
/// ```
/// # use wip3d::prelude::*;
/// let ambient = Light::ambient().with_intensity(0.5);
/// let bulb = Light::point().with_color(WHITE).with_intensity(2.0);
/// assert!(bulb.enabled);
/// # let _ = ambient;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// The type of light (ambient or point).
    pub light_type: LightType,
    /// The color of the light (RGBA, each component 0.0-1.0).
    pub color: Color,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// Whether the light is enabled.
    pub enabled: bool,
}

impl Light {
    /// Creates a white ambient light of intensity 1.
    pub fn ambient() -> Self {
        Self {
            light_type: LightType::Ambient,
            color: crate::color::WHITE,
            intensity: 1.0,
            enabled: true,
        }
    }

    /// Creates a white point light of intensity 1 with unlimited range and a decay of 2.
    pub fn point() -> Self {
        Self {
            light_type: LightType::Point {
                distance: 0.0,
                decay: 2.0,
            },
            color: crate::color::WHITE,
            intensity: 1.0,
            enabled: true,
        }
    }

    /// Sets the light color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the light intensity.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the range and decay of a point light. Has no effect on ambient lights.
    pub fn with_falloff(mut self, distance: f32, decay: f32) -> Self {
        if let LightType::Point { .. } = self.light_type {
            self.light_type = LightType::Point { distance, decay };
        }
        self
    }

    /// Sets whether the light is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The light color premultiplied by its intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::new(self.color.r, self.color.g, self.color.b) * self.intensity
    }
}

/// A point light that has been collected from the scene tree with its world-space position.
#[derive(Clone, Debug)]
pub struct CollectedLight {
    /// Color premultiplied by intensity.
    pub radiance: Vec3,
    /// World-space position of the light.
    pub world_position: Vec3,
    /// Range of the light, `0.0` for unlimited.
    pub distance: f32,
    /// Distance decay exponent.
    pub decay: f32,
}

/// Lights gathered from the scene tree before drawing.
#[derive(Clone, Debug, Default)]
pub struct LightCollection {
    /// The collected point lights with their world-space positions.
    pub lights: Vec<CollectedLight>,
    /// Sum of all ambient lights, premultiplied by intensity.
    pub ambient: Vec3,
}

impl LightCollection {
    /// Creates a new empty light collection.
    pub fn new() -> Self {
        Self {
            lights: Vec::with_capacity(MAX_LIGHTS),
            ambient: Vec3::ZERO,
        }
    }

    /// Accumulates `light` placed at `world_position`.
    ///
    /// Returns `false` if the light is a point light and the collection is full.
    pub fn add(&mut self, light: &Light, world_position: Vec3) -> bool {
        if !light.enabled {
            return true;
        }

        match light.light_type {
            LightType::Ambient => {
                self.ambient += light.radiance();
                true
            }
            LightType::Point { distance, decay } => {
                if self.lights.len() >= MAX_LIGHTS {
                    return false;
                }
                self.lights.push(CollectedLight {
                    radiance: light.radiance(),
                    world_position,
                    distance,
                    decay,
                });
                true
            }
        }
    }

    /// Returns the number of point lights in the collection.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns `true` if the collection holds no point light.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_lights_accumulate() {
        let mut lights = LightCollection::new();
        assert!(lights.add(&Light::ambient().with_intensity(0.5), Vec3::ZERO));
        assert!(lights.add(&Light::ambient().with_intensity(0.25), Vec3::ZERO));
        assert_eq!(lights.ambient, Vec3::splat(0.75));
        assert!(lights.is_empty());
    }

    #[test]
    fn point_lights_are_capped() {
        let mut lights = LightCollection::new();
        for _ in 0..MAX_LIGHTS {
            assert!(lights.add(&Light::point(), Vec3::ONE));
        }
        assert!(!lights.add(&Light::point(), Vec3::ONE));
        assert_eq!(lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn disabled_lights_are_skipped() {
        let mut lights = LightCollection::new();
        lights.add(&Light::point().with_enabled(false), Vec3::ONE);
        lights.add(&Light::ambient().with_enabled(false), Vec3::ONE);
        assert!(lights.is_empty());
        assert_eq!(lights.ambient, Vec3::ZERO);
    }
}
