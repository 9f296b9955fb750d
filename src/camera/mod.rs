//! Camera trait, the perspective camera and its orbit controls.

pub use self::camera3d::Camera3d;
pub use self::orbit_controls::OrbitControls;
pub use self::perspective3d::PerspectiveCamera3d;

mod camera3d;
mod orbit_controls;
mod perspective3d;
