//! The "Work IN Progress" application: scene setup, per-frame animation, text insertion
//! and viewport handling.

pub use self::scheduler::FrameScheduler;

mod scheduler;

use crate::camera::{OrbitControls, PerspectiveCamera3d};
use crate::clock::Clock;
use crate::config::SceneConfig;
use crate::error::Result;
use crate::event::WindowEvent;
use crate::light::Light;
use crate::loader::{FontLoad, LoadStatus};
use crate::procedural;
use crate::renderer::Renderer;
use crate::scene::{Geometry, PointsMaterial, Scene, SceneNode, StandardMaterial};
use crate::text;
use crate::window::Window;
use glamx::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::TAU;

/// The scene built at startup, with handles on the nodes animated every frame.
#[derive(Clone)]
pub struct BuiltScene {
    pub scene: Scene,
    pub particles: SceneNode,
    pub cube: SceneNode,
    pub sphere: SceneNode,
}

/// Populates a new scene with, in order: the ambient light, the point light, the particle
/// cloud, the box and the sphere.
pub fn build_scene(config: &SceneConfig) -> BuiltScene {
    let mut scene = Scene::new();
    scene.background = config.background;
    let root = scene.root_mut();

    let lights = &config.lights;
    root.add_light(
        Light::ambient()
            .with_color(lights.ambient_color)
            .with_intensity(lights.ambient_intensity),
    )
    .set_name("ambient");
    root.add_light(
        Light::point()
            .with_color(lights.point_color)
            .with_intensity(lights.point_intensity)
            .with_falloff(lights.point_distance, lights.point_decay),
    )
    .set_name("point")
    .set_position(lights.point_position);

    let p = &config.particles;
    let cloud = match p.seed {
        Some(seed) => procedural::random_cube(p.count, p.spread, &mut StdRng::seed_from_u64(seed)),
        None => procedural::random_cube(p.count, p.spread, &mut rand::rng()),
    };
    let particles = root
        .add_points(
            cloud,
            PointsMaterial {
                color: p.color,
                size: p.size,
                size_attenuation: p.size_attenuation,
                transparent: true,
                opacity: p.opacity,
            },
        )
        .set_name("particles");

    let c = &config.cube;
    let cube = root
        .add_mesh(
            Geometry::new(procedural::cuboid(c.extents)),
            StandardMaterial::new(c.color)
                .with_metal_rough(c.metalness, c.roughness),
        )
        .set_name("cube")
        .set_position(c.position);

    let s = &config.sphere;
    let sphere = root
        .add_mesh(
            Geometry::new(procedural::sphere(s.radius, s.width_segments, s.height_segments)),
            StandardMaterial::new(s.color)
                .with_metal_rough(s.metalness, s.roughness),
        )
        .set_name("sphere")
        .set_position(s.position);

    log::debug!(
        "Scene built with {} particles and {} nodes.",
        p.count,
        scene.num_children()
    );

    BuiltScene {
        scene,
        particles,
        cube,
        sphere,
    }
}

/// Rotation after spinning at `spin` radians per second for `t` seconds, each angle
/// wrapped into `[0, 2π)`.
pub fn spin_angles(spin: Vec3, t: f64) -> Vec3 {
    let wrap = |rate: f32| (rate as f64 * t).rem_euclid(TAU) as f32;
    Vec3::new(wrap(spin.x), wrap(spin.y), wrap(spin.z))
}

/// Everything the application owns: one scene, one camera and its controls, one clock
/// and the pending font.
pub struct AppContext {
    config: SceneConfig,
    scene: Scene,
    particles: SceneNode,
    cube: SceneNode,
    sphere: SceneNode,
    text: Option<SceneNode>,
    camera: PerspectiveCamera3d,
    controls: OrbitControls,
    clock: Clock,
    font: FontLoad,
    viewport: (u32, u32),
}

impl AppContext {
    /// Builds the scene and a camera matching the current size of `renderer`.
    pub fn new(config: SceneConfig, renderer: &dyn Renderer, clock: Clock, font: FontLoad) -> Self {
        let BuiltScene {
            scene,
            particles,
            cube,
            sphere,
        } = build_scene(&config);

        let viewport = renderer.size();
        let cam = &config.camera;
        let mut camera = PerspectiveCamera3d::new(cam.fov, aspect(viewport), cam.near, cam.far);
        camera.set_position(cam.position);
        camera.look_at(cam.target);

        let mut controls = OrbitControls::new(cam.target);
        if cam.damping {
            controls = controls.with_damping(cam.damping_factor);
        }

        Self {
            config,
            scene,
            particles,
            cube,
            sphere,
            text: None,
            camera,
            controls,
            clock,
            font,
            viewport,
        }
    }

    /// Sets the rotation of every animated node for `t` seconds of elapsed time.
    pub fn animate(&mut self, t: f64) {
        let spins = [
            (&mut self.particles, self.config.particles.spin),
            (&mut self.cube, self.config.cube.spin),
            (&mut self.sphere, self.config.sphere.spin),
        ];

        for (node, spin) in spins {
            node.set_rotation(spin_angles(spin, t));
        }
    }

    /// Inserts the text mesh if the font just arrived. Returns whether it was inserted.
    pub fn poll_font(&mut self) -> bool {
        let Some(result) = self.font.poll() else {
            return false;
        };

        let cfg = &self.config.text;
        let options = cfg.geometry.options();
        let mesh = result.and_then(|font| text::text_mesh(&font, &cfg.text, &options));

        match mesh {
            Ok(mut mesh) => {
                mesh.center();
                let material = StandardMaterial::new(cfg.color)
                    .with_metal_rough(cfg.metalness, cfg.roughness)
                    .with_emissive(cfg.emissive, cfg.emissive_intensity);
                log::info!(
                    "Adding text {:?} ({} triangles).",
                    cfg.text,
                    mesh.num_triangles()
                );

                let node = self
                    .scene
                    .root_mut()
                    .add_mesh(Geometry::new(mesh), material)
                    .set_name("text");
                self.text = Some(node);
                true
            }
            Err(e) => {
                log::error!("The text will not be shown: {}", e);
                false
            }
        }
    }

    /// Runs one iteration of the render loop and draws through `renderer`.
    pub fn frame(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.animate(self.clock.elapsed_secs());
        self.poll_font();
        self.controls.update(&mut self.camera);
        renderer.render(&self.scene, &self.camera)
    }

    /// Matches the camera and the renderer to a viewport of `width` x `height` logical
    /// pixels. Zero-sized viewports are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32, renderer: &mut dyn Renderer) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}.", width, height);
            return;
        }

        self.viewport = (width, height);
        self.camera.set_aspect(aspect(self.viewport));
        self.camera.update_projection_matrix();
        renderer.set_size(width, height);
    }

    /// Reacts to a window event.
    pub fn handle_event(&mut self, event: &WindowEvent, renderer: &mut dyn Renderer) {
        match *event {
            WindowEvent::Resized(w, h) => self.on_resize(w, h, renderer),
            WindowEvent::ScaleFactorChanged(ratio) => renderer.set_pixel_ratio(ratio),
            _ => {
                let viewport = Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32);
                self.controls.handle_event(event, &self.camera, viewport);
            }
        }
    }

    /// The scene.
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The camera.
    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera3d {
        &self.camera
    }

    /// The orbit controls.
    #[inline]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// The clock driving the animation.
    #[inline]
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// The particle cloud node.
    #[inline]
    pub fn particles(&self) -> &SceneNode {
        &self.particles
    }

    /// The box node.
    #[inline]
    pub fn cube(&self) -> &SceneNode {
        &self.cube
    }

    /// The sphere node.
    #[inline]
    pub fn sphere(&self) -> &SceneNode {
        &self.sphere
    }

    /// The text node, once the font has been loaded.
    #[inline]
    pub fn text(&self) -> Option<&SceneNode> {
        self.text.as_ref()
    }

    /// Progress of the font load.
    #[inline]
    pub fn font_status(&self) -> LoadStatus {
        self.font.status()
    }
}

fn aspect((width, height): (u32, u32)) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Opens the window, builds the scene and renders it until the window is closed.
pub async fn run(config: SceneConfig) -> Result<()> {
    let mut window = Window::open(&config.window).await?;
    let font = FontLoad::start(config.text.font.clone());
    let mut scheduler = FrameScheduler::new(config.window.max_fps);
    let mut app = AppContext::new(config, &window, Clock::start(), font);

    log::info!("Entering the render loop.");
    loop {
        for event in window.poll_events() {
            app.handle_event(&event, &mut window);
        }

        if window.should_close() {
            break;
        }

        app.frame(&mut window)?;
        scheduler.wait();
    }

    log::info!("Window closed after {:.1}s.", app.clock.elapsed_secs());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Object;
    use approx::assert_relative_eq;

    #[test]
    fn stock_scene_has_five_children() {
        let config = SceneConfig {
            particles: crate::config::ParticlesConfig {
                seed: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };
        let built = build_scene(&config);

        assert_eq!(built.scene.num_children(), 5);
        assert_eq!(built.cube.position(), Vec3::new(-3.0, 1.0, -2.0));
        assert_eq!(built.sphere.position(), Vec3::new(3.0, -1.0, 2.0));

        let point = built.scene.root().find_by_name("point").unwrap();
        assert_eq!(point.position(), Vec3::new(5.0, 10.0, 5.0));

        let lights = built.scene.collect_lights();
        assert_eq!(lights.ambient, Vec3::splat(0.5));
        assert_eq!(lights.len(), 1);
    }

    #[test]
    fn particles_fill_the_cube() {
        let built = build_scene(&SceneConfig::default());
        let object = built.particles.object().unwrap();
        let Object::Points { geometry, material } = &*object else {
            panic!("particles are not points");
        };

        assert_eq!(geometry.cloud().len(), 1000);
        assert!(geometry
            .cloud()
            .positions
            .iter()
            .all(|p| p.abs().cmple(Vec3::splat(15.0)).all()));
        assert_eq!(material.effective_opacity(), 0.8);
    }

    #[test]
    fn spin_wraps_into_one_turn() {
        let angles = spin_angles(Vec3::new(0.5, 0.5, 0.0), 20.0);
        assert_relative_eq!(angles.x, (10.0f64 - TAU) as f32, epsilon = 1.0e-5);
        assert_eq!(angles.z, 0.0);

        let angles = spin_angles(Vec3::new(0.05, 0.1, 0.0), 10.0);
        assert_relative_eq!(angles.x, 0.5, epsilon = 1.0e-6);
        assert_relative_eq!(angles.y, 1.0, epsilon = 1.0e-6);
    }
}
