//! Scene configuration: JSON file plus command-line overrides.
//!
//! Every field has a default, so an empty JSON object (or no file at all) describes the
//! stock scene.

use crate::color::{self, Color};
use crate::error::{Error, Result};
use crate::loader::FontSource;
use crate::text::{ExtrudeOptions, TextOptions};
use clap::Parser;
use glamx::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest particle cloud the point renderer accepts.
pub const MAX_PARTICLES: usize = 4_000_000;

/// Window and presentation settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title of the window.
    pub title: String,
    /// Initial width, in logical pixels.
    pub width: u32,
    /// Initial height, in logical pixels.
    pub height: u32,
    /// Samples per pixel. Only 1 and 4 are supported everywhere.
    pub msaa: u32,
    /// Whether presentation waits for the display refresh.
    pub vsync: bool,
    /// Upper bound on frames per second, on top of vsync.
    pub max_fps: Option<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Work IN Progress".to_string(),
            width: 1280,
            height: 720,
            msaa: 4,
            vsync: true,
            max_fps: None,
        }
    }
}

/// The two scene lights.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub point_color: Color,
    pub point_intensity: f32,
    pub point_position: Vec3,
    /// Range of the point light, 0 for unlimited.
    pub point_distance: f32,
    pub point_decay: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient_color: color::WHITE,
            ambient_intensity: 0.5,
            point_color: color::WHITE,
            point_intensity: 2.0,
            point_position: Vec3::new(5.0, 10.0, 5.0),
            point_distance: 0.0,
            point_decay: 2.0,
        }
    }
}

/// The particle cloud.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub count: usize,
    /// Side of the cube the particles are spread in, centered on the origin.
    pub spread: f32,
    pub color: Color,
    pub size: f32,
    pub size_attenuation: bool,
    pub opacity: f32,
    /// Seed of the placement, random when absent.
    pub seed: Option<u64>,
    /// Rotation speed about each axis, in radians per second.
    pub spin: Vec3,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            spread: 30.0,
            color: color::WHITE,
            size: 0.1,
            size_attenuation: true,
            opacity: 0.8,
            seed: None,
            spin: Vec3::new(0.05, 0.1, 0.0),
        }
    }
}

/// The rotating box.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Width, height and depth.
    pub extents: Vec3,
    pub position: Vec3,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Rotation speed about each axis, in radians per second.
    pub spin: Vec3,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            extents: Vec3::ONE,
            position: Vec3::new(-3.0, 1.0, -2.0),
            color: color::CYAN,
            metalness: 0.9,
            roughness: 0.2,
            spin: Vec3::new(0.5, 0.5, 0.0),
        }
    }
}

/// The rotating sphere.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub position: Vec3,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Rotation speed about each axis, in radians per second.
    pub spin: Vec3,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
            position: Vec3::new(3.0, -1.0, 2.0),
            color: color::MAGENTA,
            metalness: 0.9,
            roughness: 0.2,
            spin: Vec3::new(0.0, 0.5, 0.5),
        }
    }
}

/// Size and extrusion of the text banner.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextGeometryConfig {
    /// Em size, in scene units.
    pub size: f32,
    pub depth: f32,
    pub steps: u32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.3,
            steps: 1,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.05,
            bevel_size: 0.03,
            bevel_offset: 0.0,
            bevel_segments: 5,
        }
    }
}

impl TextGeometryConfig {
    /// The options handed to the text mesh builder.
    pub fn options(&self) -> TextOptions {
        TextOptions {
            size: self.size,
            extrude: ExtrudeOptions {
                depth: self.depth,
                steps: self.steps,
                curve_segments: self.curve_segments,
                bevel_enabled: self.bevel_enabled,
                bevel_thickness: self.bevel_thickness,
                bevel_size: self.bevel_size,
                bevel_offset: self.bevel_offset,
                bevel_segments: self.bevel_segments,
            },
        }
    }
}

/// The 3D text banner.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// The literal that gets extruded.
    pub text: String,
    pub font: FontSource,
    pub geometry: TextGeometryConfig,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text: "Work IN Progress".to_string(),
            font: FontSource::default(),
            geometry: TextGeometryConfig::default(),
            color: color::GOLD,
            metalness: 1.0,
            roughness: 0.1,
            emissive: color::YELLOW,
            emissive_intensity: 0.6,
        }
    }
}

/// The perspective camera and its orbit controls.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 35.0,
            near: 0.1,
            far: 200.0,
            position: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::ZERO,
            damping: true,
            damping_factor: 0.05,
        }
    }
}

/// Everything needed to build and run the scene.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub background: Color,
    pub lights: LightsConfig,
    pub particles: ParticlesConfig,
    pub cube: CubeConfig,
    pub sphere: SphereConfig,
    pub text: TextConfig,
    pub camera: CameraConfig,
}

impl SceneConfig {
    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str::<SceneConfig>(json)?.validated())
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        log::debug!("Read configuration from {}.", path.display());
        Self::from_json(&json)
    }

    /// Replaces values the hardware or the geometry builders cannot honor.
    pub fn validated(mut self) -> Self {
        if !matches!(self.window.msaa, 1 | 4) {
            log::warn!("Unsupported MSAA sample count {}, using 4.", self.window.msaa);
            self.window.msaa = 4;
        }

        if self.window.max_fps.is_some_and(|fps| fps <= 0.0) {
            log::warn!("Ignoring non-positive frame-rate cap.");
            self.window.max_fps = None;
        }

        if self.particles.count > MAX_PARTICLES {
            log::warn!(
                "Too many particles ({}), using {}.",
                self.particles.count,
                MAX_PARTICLES
            );
            self.particles.count = MAX_PARTICLES;
        }

        let sphere = &mut self.sphere;
        sphere.width_segments = sphere.width_segments.max(3);
        sphere.height_segments = sphere.height_segments.max(2);

        self
    }
}

/// Command-line arguments of the `wip3d` binary. Flags override the configuration file.
#[derive(Debug, Default, Parser)]
#[command(name = "wip3d", about = "A spinning scene with an extruded 3D text banner", version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// URL of the typeface JSON font
    #[arg(long, conflicts_with = "font_file")]
    pub font_url: Option<String>,

    /// Local typeface JSON font, used instead of downloading one
    #[arg(long)]
    pub font_file: Option<PathBuf>,

    /// Text of the banner
    #[arg(long)]
    pub text: Option<String>,

    /// Number of particles
    #[arg(long)]
    pub particles: Option<usize>,

    /// Seed of the particle placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frame-rate cap
    #[arg(long)]
    pub fps: Option<f64>,

    /// MSAA sample count (1 or 4)
    #[arg(long)]
    pub msaa: Option<u32>,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,
}

impl Cli {
    /// Loads the configuration file, if any, and applies the flags on top of it.
    pub fn load_config(&self) -> Result<SceneConfig> {
        let config = match &self.config {
            Some(path) => SceneConfig::from_file(path)?,
            None => SceneConfig::default(),
        };

        Ok(self.apply(config))
    }

    /// Applies the flags that were given to `config`.
    pub fn apply(&self, mut config: SceneConfig) -> SceneConfig {
        if let Some(url) = &self.font_url {
            config.text.font = FontSource::Url(url.clone());
        }
        if let Some(path) = &self.font_file {
            config.text.font = FontSource::File(path.clone());
        }
        if let Some(text) = &self.text {
            config.text.text = text.clone();
        }
        if let Some(count) = self.particles {
            config.particles.count = count;
        }
        if self.seed.is_some() {
            config.particles.seed = self.seed;
        }
        if self.fps.is_some() {
            config.window.max_fps = self.fps;
        }
        if let Some(msaa) = self.msaa {
            config.window.msaa = msaa;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }

        config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_stock_scene() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.particles.count, 1000);
        assert_eq!(config.camera.fov, 35.0);
        assert_eq!(config.background, color::BLACK);
        assert_eq!(config.text.geometry.bevel_segments, 5);
    }

    #[test]
    fn nested_fields_override_defaults() {
        let json = r#"{
            "particles": { "count": 10, "seed": 7 },
            "cube": { "position": [1, 2, 3], "metalness": 0.5 },
            "text": { "font": { "file": "fonts/helvetiker.json" }, "geometry": { "depth": 0.5 } }
        }"#;
        let config = SceneConfig::from_json(json).unwrap();

        assert_eq!(config.particles.count, 10);
        assert_eq!(config.particles.seed, Some(7));
        assert_eq!(config.particles.opacity, 0.8);
        assert_eq!(config.cube.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.cube.metalness, 0.5);
        assert_eq!(config.cube.color, color::CYAN);
        assert_eq!(config.cube.spin, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(
            config.text.font,
            FontSource::File(PathBuf::from("fonts/helvetiker.json"))
        );
        assert_eq!(config.text.geometry.depth, 0.5);
        assert_eq!(config.text.geometry.size, 1.0);
        assert_eq!(config.text.geometry.bevel_segments, 5);
        assert_eq!(config.text.geometry.bevel_thickness, 0.05);
    }

    #[test]
    fn partial_solids_keep_their_placement_and_spin() {
        let json = r#"{ "cube": { "metalness": 0.5 }, "sphere": {} }"#;
        let config = SceneConfig::from_json(json).unwrap();

        assert_eq!(config.cube.metalness, 0.5);
        assert_eq!(config.cube.position, Vec3::new(-3.0, 1.0, -2.0));
        assert_eq!(config.cube.color, color::CYAN);
        assert_eq!(config.cube.spin, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(config.sphere, SphereConfig::default());
        assert_eq!(config.sphere.spin, Vec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn text_geometry_resolves_to_extrude_options() {
        let json = r#"{ "text": { "geometry": { "bevel_enabled": false } } }"#;
        let options = SceneConfig::from_json(json).unwrap().text.geometry.options();

        assert_eq!(options.size, 1.0);
        assert_eq!(options.extrude.depth, 0.3);
        assert!(!options.extrude.bevel_enabled);
        assert_eq!(options.extrude.bevel_segments, 5);
    }

    #[test]
    fn unsupported_values_are_replaced() {
        let json = r#"{ "window": { "msaa": 3, "max_fps": 0 } }"#;
        let config = SceneConfig::from_json(json).unwrap();
        assert_eq!(config.window.msaa, 4);
        assert_eq!(config.window.max_fps, None);
    }

    #[test]
    fn particle_count_is_capped() {
        let json = format!(r#"{{ "particles": {{ "count": {} }} }}"#, MAX_PARTICLES + 1);
        let config = SceneConfig::from_json(&json).unwrap();
        assert_eq!(config.particles.count, MAX_PARTICLES);

        let cli = Cli::try_parse_from(["wip3d", "--particles", "800000000"]).unwrap();
        assert_eq!(cli.apply(SceneConfig::default()).particles.count, MAX_PARTICLES);
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "wip3d",
            "--text",
            "Hello",
            "--particles",
            "12",
            "--font-file",
            "local.json",
            "--msaa",
            "1",
        ])
        .unwrap();
        let config = cli.apply(SceneConfig::default());

        assert_eq!(config.text.text, "Hello");
        assert_eq!(config.particles.count, 12);
        assert_eq!(config.window.msaa, 1);
        assert_eq!(config.text.font, FontSource::File(PathBuf::from("local.json")));
    }

    #[test]
    fn font_url_and_file_conflict() {
        let res = Cli::try_parse_from(["wip3d", "--font-url", "http://x", "--font-file", "y"]);
        assert!(res.is_err());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = SceneConfig::from_file("no/such/config.json").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
