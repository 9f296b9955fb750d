//! The `Renderer` abstraction and the wgpu renderers drawing scene objects.

pub use self::mesh_renderer::MeshRenderer;
pub use self::point_renderer::PointRenderer;
pub use self::renderer::Renderer;

mod mesh_renderer;
mod point_renderer;
mod renderer;
mod uniform_buffer;
