/*!
# wip3d

A small "Work IN Progress" 3D scene drawn with wgpu.

The scene holds:

* the words "Work IN Progress" as gold, beveled, extruded 3D text, centered on the
  origin once its typeface has been downloaded;
* a cloud of slowly rotating particles;
* a metallic cyan box and a metallic magenta sphere, both spinning;
* an ambient light and a point light, on a black background.

An orbiting camera with damping lets the user look around.

The library is split into an application layer ([`app`]) and the small engine it runs
on: a scene graph ([`scene`]), procedural geometry ([`procedural`]), typeface text
([`text`]), cameras and controls ([`camera`]), and a wgpu window implementing the
[`Renderer`](renderer::Renderer) trait ([`window`]).

Building the stock scene and driving it without a window is as simple as:

```
use wip3d::prelude::*;

let config = SceneConfig::default();
let built = build_scene(&config);
assert_eq!(built.scene.num_children(), 5);

built.cube.clone().set_rotation(spin_angles(config.cube.spin, 1.0));
```

The `wip3d` binary opens the window:

```text
wip3d --text "Hello" --particles 5000 --seed 7
```

Some controls are handled by the orbit controls:

* `left click + drag`: orbit around the target.
* `right click + drag`, or `shift + left click + drag`: pan.
* `scroll` or `middle click + drag`: dolly in / out.
* `escape`: close the window.
*/
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub use glamx;

pub mod app;
pub mod camera;
pub mod clock;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod light;
pub mod loader;
pub mod procedural;
pub mod renderer;
pub mod scene;
pub mod text;
pub mod window;

pub mod prelude {
    pub use crate::app::{build_scene, spin_angles, AppContext, BuiltScene};
    pub use crate::camera::*;
    pub use crate::clock::*;
    pub use crate::color::*;
    pub use crate::config::SceneConfig;
    pub use crate::error::{Error, Result};
    pub use crate::event::*;
    pub use crate::light::*;
    pub use crate::loader::*;
    pub use crate::renderer::Renderer;
    pub use crate::scene::*;
    pub use crate::text::{text_mesh, Font, TextOptions};
    pub use crate::window::Window;
    pub use glamx::{Mat3, Mat4, Quat, Vec2, Vec3};
}
