//! The wgpu device shared by the window and the renderers.

pub use self::context::Context;

mod context;
