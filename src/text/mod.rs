//! 3D text: typeface fonts, glyph outlines and their beveled extrusion.
//!
//! ```
//! # use wip3d::text::{Font, TextOptions, text_mesh};
//! # let json = r#"{"resolution": 1000, "boundingBox": {"xMin": 0, "xMax": 1, "yMin": 0, "yMax": 1},
//! #   "glyphs": {"I": {"ha": 300, "o": "m 0 0 l 0 700 l 200 700 l 200 0"}}}"#;
//! let font = Font::from_json(json)?;
//! let mesh = text_mesh(&font, "I", &TextOptions::default())?;
//! assert!(mesh.num_triangles() > 0);
//! # Ok::<(), wip3d::error::Error>(())
//! ```

pub use self::extrude::{extrude_shapes, ExtrudeOptions};
pub use self::font::{Font, FontBoundingBox, Glyph};
pub use self::shape::{Path, Segment, Shape, ShapePath};

mod extrude;
mod font;
mod shape;
pub mod tessellate;

use crate::error::Result;
use crate::procedural::RenderMesh;

/// Layout and extrusion parameters of a text mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    /// Em size, in scene units.
    pub size: f32,
    /// How the glyph outlines are extruded.
    pub extrude: ExtrudeOptions,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            extrude: ExtrudeOptions {
                depth: 50.0,
                bevel_enabled: false,
                ..ExtrudeOptions::default()
            },
        }
    }
}

/// Builds the extruded mesh of `text`, with its origin at the start of the first baseline.
pub fn text_mesh(font: &Font, text: &str, options: &TextOptions) -> Result<RenderMesh> {
    let shapes = font.generate_shapes(text, options.size)?;
    extrude_shapes(&shapes, &options.extrude)
}
