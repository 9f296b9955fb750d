use glamx::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Trait that all camera implementations must implement.
///
/// Cameras control the viewpoint from which the 3D scene is rendered. Renderers only
/// read them; input handling lives in controllers such as
/// [`OrbitControls`](crate::camera::OrbitControls).
pub trait Camera3d {
    /// Returns the camera's position in world space.
    fn eye(&self) -> Vec3;

    /// Returns the camera's view matrix, transforming world coordinates into camera space.
    fn view_matrix(&self) -> Mat4;

    /// Returns the projection matrix, transforming camera space into clip space.
    ///
    /// Depth is mapped to `[0, 1]`.
    fn projection_matrix(&self) -> Mat4;

    /// Returns the near and far clipping plane distances.
    fn clip_planes(&self) -> (f32, f32);

    /// Returns the combined projection and view transformation matrix.
    #[inline]
    fn transformation(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Projects a 3D point in world coordinates to 2D screen coordinates, with the origin
    /// at the bottom-left corner.
    fn project(&self, world_coord: Vec3, size: Vec2) -> Vec2 {
        let h_normalized_coord = self.transformation() * world_coord.extend(1.0);
        let normalized_coord = h_normalized_coord.xyz() / h_normalized_coord.w;

        Vec2::new(
            (1.0 + normalized_coord.x) * size.x / 2.0,
            (1.0 + normalized_coord.y) * size.y / 2.0,
        )
    }
}
