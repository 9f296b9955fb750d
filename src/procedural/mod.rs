//! Procedural mesh generation.
//!
//! CPU-side builders for the geometry the scene is made of: boxes, UV spheres and
//! random point clouds. Extruded text lives in [`crate::text`] and produces the same
//! [`RenderMesh`] type.

pub use self::cuboid::{cuboid, unit_cuboid};
pub use self::point_cloud::{random_cube, PointCloud};
pub use self::render_mesh::{Aabb, RenderMesh};
pub use self::sphere::sphere;

mod cuboid;
mod point_cloud;
mod render_mesh;
mod sphere;
pub mod utils;
