use crate::camera::PerspectiveCamera3d;
use crate::event::{Action, Modifiers, MouseButton, WindowEvent};
use glamx::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1.0e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
    None,
    Rotate,
    Pan,
    Dolly,
}

/// Orbits a [`PerspectiveCamera3d`] around a target point.
///
/// # Default Controls
/// - **Left mouse + drag**: Rotate around the target
/// - **Right mouse + drag**, or **Shift/Ctrl/Super + left drag**: Pan
/// - **Middle mouse + drag** or **mouse wheel**: Move toward or away from the target
///
/// Events only accumulate motion. [`OrbitControls::update`] applies it to the camera and
/// must be called once per frame; with damping the motion is spread over several frames.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitControls {
    /// The point the camera orbits around.
    pub target: Vec3,
    /// Whether user input is taken into account.
    pub enabled: bool,
    /// Whether motion eases out over several frames.
    pub enable_damping: bool,
    /// Fraction of the pending motion applied each frame when damping.
    pub damping_factor: f32,
    /// Multiplier of drag rotations.
    pub rotate_speed: f32,
    /// Multiplier of drag pans.
    pub pan_speed: f32,
    /// Exponent of the per-notch dolly scale.
    pub zoom_speed: f32,
    /// Smallest allowed distance to the target.
    pub min_distance: f32,
    /// Largest allowed distance to the target.
    pub max_distance: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    gesture: Gesture,
    last_cursor_pos: Option<Vec2>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitControls {
    /// Creates controls orbiting around `target`, without damping.
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            gesture: Gesture::None,
            last_cursor_pos: None,
        }
    }

    /// Enables damping with the given factor.
    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// Whether some motion is still waiting to be applied.
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > EPS
            || self.delta_phi.abs() > EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pan_offset.length_squared() > EPS * EPS
    }

    /// Rotates around the vertical axis by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Rotates toward the top pole by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Moves toward the target, dividing the distance by `factor`.
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Moves away from the target, multiplying the distance by `factor`.
    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    /// Pans by a displacement of `delta` logical pixels on a viewport `viewport_height` high.
    pub fn pan(&mut self, camera: &PerspectiveCamera3d, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }

        // Half the visible height at the target distance, in world units.
        let distance = (camera.position() - self.target).length();
        let half_height = distance * (camera.fov().to_radians() / 2.0).tan();
        let scale = 2.0 * half_height / viewport_height * self.pan_speed;

        self.pan_offset += camera.right() * (-delta.x * scale) + camera.up() * (delta.y * scale);
    }

    /// Accumulates the motion requested by `event`.
    ///
    /// `viewport` is the size of the drawable area in logical pixels.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        camera: &PerspectiveCamera3d,
        viewport: Vec2,
    ) {
        if !self.enabled {
            return;
        }

        match *event {
            WindowEvent::MouseButton(button, Action::Press, modifiers) => {
                self.gesture = match button {
                    MouseButton::Left
                        if modifiers
                            .intersects(Modifiers::Shift | Modifiers::Control | Modifiers::Super) =>
                    {
                        Gesture::Pan
                    }
                    MouseButton::Left => Gesture::Rotate,
                    MouseButton::Right => Gesture::Pan,
                    MouseButton::Middle => Gesture::Dolly,
                    MouseButton::Other => Gesture::None,
                };
            }
            WindowEvent::MouseButton(_, Action::Release, _) => self.gesture = Gesture::None,
            WindowEvent::CursorPos(x, y, _) => {
                let curr_pos = Vec2::new(x as f32, y as f32);
                let delta = self.last_cursor_pos.map_or(Vec2::ZERO, |last| curr_pos - last);
                self.last_cursor_pos = Some(curr_pos);

                if delta == Vec2::ZERO || viewport.y <= 0.0 {
                    return;
                }

                match self.gesture {
                    Gesture::Rotate => {
                        self.rotate_left(TAU * delta.x / viewport.y * self.rotate_speed);
                        self.rotate_up(TAU * delta.y / viewport.y * self.rotate_speed);
                    }
                    Gesture::Pan => self.pan(camera, delta, viewport.y),
                    Gesture::Dolly if delta.y > 0.0 => self.dolly_out(self.zoom_scale()),
                    Gesture::Dolly => self.dolly_in(self.zoom_scale()),
                    Gesture::None => {}
                }
            }
            WindowEvent::Scroll(_, y, _) => {
                // Ten units per wheel notch, positive when scrolling up.
                let notches = y as f32 / 10.0;
                self.scale *= self.zoom_scale().powf(notches);
            }
            _ => {}
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Applies the pending motion to `camera` and returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera3d) -> bool {
        let old_position = camera.position();
        let old_target = self.target;

        let offset = old_position - self.target;
        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        theta += self.delta_theta * factor;
        phi += self.delta_phi * factor;
        phi = phi.clamp(EPS, PI - EPS);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * factor;

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        let offset = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * radius;

        camera.set_position(self.target + offset);
        camera.look_at(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        old_position.distance_squared(camera.position()) > EPS
            || old_target.distance_squared(self.target) > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn camera() -> PerspectiveCamera3d {
        let mut camera = PerspectiveCamera3d::new(35.0, 800.0 / 600.0, 0.1, 200.0);
        camera.set_position(Vec3::new(0.0, 0.0, 15.0));
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn drag(controls: &mut OrbitControls, camera: &PerspectiveCamera3d, button: MouseButton, to: Vec2) {
        let none = Modifiers::empty();
        controls.handle_event(&WindowEvent::CursorPos(0.0, 0.0, none), camera, VIEWPORT);
        controls.handle_event(&WindowEvent::MouseButton(button, Action::Press, none), camera, VIEWPORT);
        controls.handle_event(
            &WindowEvent::CursorPos(to.x as f64, to.y as f64, none),
            camera,
            VIEWPORT,
        );
        controls.handle_event(&WindowEvent::MouseButton(button, Action::Release, none), camera, VIEWPORT);
    }

    #[test]
    fn idle_controls_keep_camera_still() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO).with_damping(0.05);

        assert!(!controls.update(&mut camera));
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 15.0), 1.0e-5));
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);

        drag(&mut controls, &camera, MouseButton::Left, Vec2::new(150.0, 40.0));
        assert!(controls.update(&mut camera));

        assert_relative_eq!(camera.position().length(), 15.0, epsilon = 1.0e-4);
        assert!(!camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 15.0), 1.0e-3));
        assert!(!controls.is_moving());
    }

    #[test]
    fn damped_motion_decays() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO).with_damping(0.05);
        controls.rotate_left(1.0);

        let start = camera.position();
        assert!(controls.update(&mut camera));
        let first_step = camera.position().distance(start);

        for _ in 0..500 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());

        let before = camera.position();
        controls.update(&mut camera);
        assert!(camera.position().distance(before) < first_step * 1.0e-3);
    }

    #[test]
    fn wheel_dollies_by_notch() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);

        let up = WindowEvent::Scroll(0.0, 10.0, Modifiers::empty());
        controls.handle_event(&up, &camera, VIEWPORT);
        controls.update(&mut camera);

        assert_relative_eq!(camera.position().length(), 15.0 * 0.95, epsilon = 1.0e-4);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);

        drag(&mut controls, &camera, MouseButton::Right, Vec2::new(100.0, 0.0));
        controls.update(&mut camera);

        // Dragging right moves the scene right, hence the target left.
        assert!(controls.target.x < 0.0);
        assert_relative_eq!(controls.target.y, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(camera.position().z, 15.0, epsilon = 1.0e-4);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enabled = false;

        drag(&mut controls, &camera, MouseButton::Left, Vec2::new(150.0, 40.0));
        assert!(!controls.update(&mut camera));
    }
}
