use crate::camera::Camera3d;
use glamx::{Mat4, Vec3};

/// A pinhole camera with a vertical field of view.
///
/// The projection matrix is cached: changing the field of view, the aspect ratio or the
/// clip planes has no visible effect until [`update_projection_matrix`] is called.
///
/// [`update_projection_matrix`]: PerspectiveCamera3d::update_projection_matrix
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera3d {
    fov: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
    position: Vec3,
    target: Vec3,
    up: Vec3,
    proj: Mat4,
}

impl PerspectiveCamera3d {
    /// Creates a camera at the origin looking down -Z.
    ///
    /// # Arguments
    /// * `fov` - Vertical field of view, in degrees
    /// * `aspect` - Width over height of the viewport
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let mut res = Self {
            fov,
            aspect,
            znear,
            zfar,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            proj: Mat4::IDENTITY,
        };
        res.update_projection_matrix();
        res
    }

    /// Vertical field of view, in degrees.
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Width over height of the viewport.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Sets the aspect ratio.
    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recomputes the cached projection matrix from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.proj = Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.znear, self.zfar);
    }

    /// Position of the camera.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the camera, keeping it aimed at the same point.
    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// The point the camera is aimed at.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Aims the camera at `target`.
    #[inline]
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Unit vector pointing to the right of the view, in world space.
    pub fn right(&self) -> Vec3 {
        self.view_matrix().inverse().x_axis.truncate()
    }

    /// Unit vector pointing to the top of the view, in world space.
    pub fn up(&self) -> Vec3 {
        self.view_matrix().inverse().y_axis.truncate()
    }
}

impl Camera3d for PerspectiveCamera3d {
    #[inline]
    fn eye(&self) -> Vec3 {
        self.position
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[inline]
    fn projection_matrix(&self) -> Mat4 {
        self.proj
    }

    #[inline]
    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glamx::Vec2;

    #[test]
    fn projection_is_cached_until_updated() {
        let mut camera = PerspectiveCamera3d::new(35.0, 1.0, 0.1, 200.0);
        let before = camera.projection_matrix();

        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        let expected = Mat4::perspective_rh(35.0f32.to_radians(), 2.0, 0.1, 200.0);
        assert_eq!(camera.projection_matrix(), expected);
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let mut camera = PerspectiveCamera3d::new(35.0, 4.0 / 3.0, 0.1, 200.0);
        camera.set_position(Vec3::new(0.0, 0.0, 15.0));
        camera.look_at(Vec3::ZERO);

        let size = Vec2::new(800.0, 600.0);
        assert!(camera.project(Vec3::ZERO, size).abs_diff_eq(size / 2.0, 1.0e-3));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1.0e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1.0e-6));
    }
}
