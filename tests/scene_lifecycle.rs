//! Drives the application without a window: a recording renderer stands in for the GPU and
//! a manual clock makes every frame deterministic.

use approx::assert_relative_eq;
use std::time::Duration;
use wip3d::prelude::*;

const FONT: &str = include_str!("fixtures/blocks.typeface.json");

/// Renders nothing, remembers what it was asked to do.
struct RecordingRenderer {
    size: (u32, u32),
    pixel_ratio: f64,
    frames: usize,
    meshes_drawn: usize,
    points_drawn: usize,
}

impl RecordingRenderer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            pixel_ratio: 1.0,
            frames: 0,
            meshes_drawn: 0,
            points_drawn: 0,
        }
    }
}

impl Renderer for RecordingRenderer {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, scene: &Scene, _camera: &dyn Camera3d) -> Result<()> {
        self.frames += 1;
        self.meshes_drawn = 0;
        self.points_drawn = 0;
        scene.root().traverse(&mut |data, _| match data.object() {
            Some(Object::Mesh { .. }) => self.meshes_drawn += 1,
            Some(Object::Points { .. }) => self.points_drawn += 1,
            None => {}
        });
        Ok(())
    }
}

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.particles.seed = Some(42);
    config
}

fn app(renderer: &RecordingRenderer) -> (FontSink, AppContext) {
    let (sink, font) = FontLoad::channel();
    let app = AppContext::new(config(), renderer, Clock::manual(), font);
    (sink, app)
}

#[test]
fn nodes_follow_elapsed_time() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (_sink, mut app) = app(&renderer);

    app.clock_mut().advance(Duration::from_secs(10));
    app.frame(&mut renderer).unwrap();

    assert_eq!(renderer.frames, 1);
    assert!(app
        .particles()
        .rotation()
        .abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1.0e-5));
    assert!(app
        .cube()
        .rotation()
        .abs_diff_eq(Vec3::new(5.0, 5.0, 0.0), 1.0e-5));
    assert!(app
        .sphere()
        .rotation()
        .abs_diff_eq(Vec3::new(0.0, 5.0, 5.0), 1.0e-5));
    assert!(app.text().is_none());
    assert_eq!(app.scene().num_children(), 5);

    // The same instant always gives the same pose.
    app.frame(&mut renderer).unwrap();
    assert!(app
        .cube()
        .rotation()
        .abs_diff_eq(Vec3::new(5.0, 5.0, 0.0), 1.0e-5));
}

#[test]
fn text_appears_once_when_the_font_arrives() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (sink, mut app) = app(&renderer);

    for _ in 0..3 {
        app.clock_mut().advance(Duration::from_millis(16));
        app.frame(&mut renderer).unwrap();
    }
    assert!(app.text().is_none());
    assert_eq!(app.font_status(), LoadStatus::Pending);
    assert_eq!(renderer.meshes_drawn, 2);
    assert_eq!(renderer.points_drawn, 1);

    sink.send(Font::from_json(FONT));
    app.frame(&mut renderer).unwrap();

    assert_eq!(app.font_status(), LoadStatus::Resolved);
    assert_eq!(app.scene().num_children(), 6);
    assert_eq!(renderer.meshes_drawn, 3);

    let text = app.text().expect("text node").clone();
    assert_eq!(text.name().as_deref(), Some("text"));
    assert_eq!(text.position(), Vec3::ZERO);
    assert_eq!(text.rotation(), Vec3::ZERO);

    let object = text.object().expect("text object");
    let Object::Mesh { geometry, material } = &*object else {
        panic!("the text is not a mesh");
    };
    assert_eq!(material.color, GOLD);
    assert_eq!(material.metalness, 1.0);
    let center = geometry.mesh().bounding_box().expect("text bounds").center();
    assert!(center.abs_diff_eq(Vec3::ZERO, 1.0e-4));
    drop(object);

    // Later frames neither add nor move it.
    for _ in 0..3 {
        app.clock_mut().advance(Duration::from_millis(16));
        app.frame(&mut renderer).unwrap();
    }
    assert_eq!(app.scene().num_children(), 6);
    assert_eq!(text.position(), Vec3::ZERO);
}

#[test]
fn failed_font_keeps_rendering() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (sink, mut app) = app(&renderer);

    drop(sink);
    app.frame(&mut renderer).unwrap();
    app.frame(&mut renderer).unwrap();

    assert_eq!(app.font_status(), LoadStatus::Failed);
    assert!(app.text().is_none());
    assert_eq!(app.scene().num_children(), 5);
    assert_eq!(renderer.frames, 2);
}

#[test]
fn unusable_font_is_reported_as_failed() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (sink, mut app) = app(&renderer);

    sink.send(Font::from_json("{ \"glyphs\": 3 }"));
    app.frame(&mut renderer).unwrap();

    assert_eq!(app.font_status(), LoadStatus::Failed);
    assert!(app.text().is_none());
}

#[test]
fn resize_updates_camera_and_renderer() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (_sink, mut app) = app(&renderer);
    assert_relative_eq!(app.camera().aspect(), 800.0 / 600.0);

    app.clock_mut().advance(Duration::from_secs(3));
    app.frame(&mut renderer).unwrap();
    let cube_before = app.cube().local_transform();
    let eye_before = app.camera().eye();

    app.handle_event(&WindowEvent::Resized(1024, 512), &mut renderer);

    assert_relative_eq!(app.camera().aspect(), 2.0);
    assert_eq!(renderer.size(), (1024, 512));
    let expected = PerspectiveCamera3d::new(35.0, 2.0, 0.1, 200.0).projection_matrix();
    assert!(app
        .camera()
        .projection_matrix()
        .abs_diff_eq(expected, 1.0e-6));
    assert_eq!(app.cube().local_transform(), cube_before);
    assert_eq!(app.camera().eye(), eye_before);

    // Minimized windows report a zero size, which leaves everything as is.
    app.handle_event(&WindowEvent::Resized(0, 0), &mut renderer);
    assert_relative_eq!(app.camera().aspect(), 2.0);
    assert_eq!(renderer.size(), (1024, 512));
}

#[test]
fn scale_factor_reaches_the_renderer() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (_sink, mut app) = app(&renderer);

    app.handle_event(&WindowEvent::ScaleFactorChanged(2.0), &mut renderer);
    assert_eq!(renderer.pixel_ratio(), 2.0);
    assert_eq!(renderer.size(), (800, 600));
}

#[test]
fn dragging_orbits_the_camera() {
    let mut renderer = RecordingRenderer::new(800, 600);
    let (_sink, mut app) = app(&renderer);
    app.frame(&mut renderer).unwrap();
    let before = app.camera().eye();

    let none = Modifiers::empty();
    app.handle_event(&WindowEvent::CursorPos(400.0, 300.0, none), &mut renderer);
    app.handle_event(
        &WindowEvent::MouseButton(MouseButton::Left, Action::Press, none),
        &mut renderer,
    );
    app.handle_event(&WindowEvent::CursorPos(500.0, 300.0, none), &mut renderer);
    app.handle_event(
        &WindowEvent::MouseButton(MouseButton::Left, Action::Release, none),
        &mut renderer,
    );
    app.frame(&mut renderer).unwrap();

    let after = app.camera().eye();
    assert!(!after.abs_diff_eq(before, 1.0e-4));
    assert_relative_eq!(after.length(), before.length(), epsilon = 1.0e-3);
}
