//! Typeface JSON fonts: glyph outlines stored as command strings in font units.

use super::shape::{Shape, ShapePath};
use crate::error::{Error, Result};
use glamx::Vec2;
use serde::Deserialize;
use std::collections::HashMap;

/// Glyph used in place of characters missing from the font.
const FALLBACK_GLYPH: char = '?';

/// The extent of every glyph of a font, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontBoundingBox {
    /// Leftmost coordinate.
    pub x_min: f32,
    /// Rightmost coordinate.
    pub x_max: f32,
    /// Lowest coordinate, usually negative (descenders).
    pub y_min: f32,
    /// Highest coordinate.
    pub y_max: f32,
}

/// A single glyph of a typeface font.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Glyph {
    /// Horizontal advance, in font units.
    pub ha: f32,
    /// Leftmost coordinate of the outline.
    #[serde(default)]
    pub x_min: Option<f32>,
    /// Rightmost coordinate of the outline.
    #[serde(default)]
    pub x_max: Option<f32>,
    /// Outline commands. Absent for blank glyphs such as the space.
    #[serde(default)]
    pub o: Option<String>,
}

/// A font in the typeface JSON format.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    /// Name of the font family.
    #[serde(default)]
    pub family_name: String,
    /// Font units per em.
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// Extent of all glyphs.
    pub bounding_box: FontBoundingBox,
    /// Thickness of the underline, part of the line height.
    #[serde(default)]
    pub underline_thickness: f32,
    /// Glyphs keyed by the character they draw.
    pub glyphs: HashMap<String, Glyph>,
}

fn default_resolution() -> f32 {
    1000.0
}

impl Font {
    /// Parses a typeface JSON document.
    pub fn from_json(json: &str) -> Result<Font> {
        let font: Font = serde_json::from_str(json)?;
        log::debug!(
            "Parsed font {:?} with {} glyphs.",
            font.family_name,
            font.glyphs.len()
        );
        Ok(font)
    }

    /// The glyph drawing `ch`, if any.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0; 4];
        self.glyphs.get(&*ch.encode_utf8(&mut buf))
    }

    /// The distance between two baselines at the given size.
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lays `text` out and returns the outlines of its glyphs.
    ///
    /// `size` is the em size in scene units. Glyphs advance along +X from the origin, and
    /// each `'\n'` moves down by [`Font::line_height`]. Characters missing from the font
    /// are drawn with the `'?'` glyph, or skipped if the font has none.
    pub fn generate_shapes(&self, text: &str, size: f32) -> Result<Vec<Shape>> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut shapes = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset = Vec2::new(0.0, offset.y - line_height);
                continue;
            }

            let Some((drawn, glyph)) = self.glyph_or_fallback(ch) else {
                continue;
            };

            if let Some(outline) = &glyph.o {
                let path = parse_outline(drawn, outline, scale, offset)?;
                shapes.extend(path.to_shapes());
            }

            offset.x += glyph.ha * scale;
        }

        Ok(shapes)
    }

    fn glyph_or_fallback(&self, ch: char) -> Option<(char, &Glyph)> {
        if let Some(glyph) = self.glyph(ch) {
            return Some((ch, glyph));
        }

        log::warn!(
            "Character {:?} is missing from font {:?}.",
            ch,
            self.family_name
        );
        self.glyph(FALLBACK_GLYPH).map(|g| (FALLBACK_GLYPH, g))
    }
}

/// Reads the `m`/`l`/`q`/`b` commands of a glyph outline.
///
/// Curve commands give their end point first, then their control points. Unknown
/// commands are skipped.
fn parse_outline(glyph: char, outline: &str, scale: f32, offset: Vec2) -> Result<ShapePath> {
    let mut tokens = outline.split_whitespace();
    let mut path = ShapePath::new();

    let next_point = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<Vec2> {
        let mut coord = || -> Result<f32> {
            let token = tokens.next().ok_or_else(|| Error::Outline {
                glyph,
                detail: "unexpected end of outline".to_string(),
            })?;
            token.parse::<f32>().map_err(|e| Error::Outline {
                glyph,
                detail: format!("bad coordinate {:?}: {}", token, e),
            })
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Vec2::new(x, y) * scale + offset)
    };

    while let Some(action) = tokens.next() {
        match action {
            "m" => path.move_to(next_point(&mut tokens)?),
            "l" => path.line_to(next_point(&mut tokens)?),
            "q" => {
                let to = next_point(&mut tokens)?;
                let control = next_point(&mut tokens)?;
                path.quadratic_to(control, to);
            }
            "b" => {
                let to = next_point(&mut tokens)?;
                let control1 = next_point(&mut tokens)?;
                let control2 = next_point(&mut tokens)?;
                path.cubic_to(control1, control2, to);
            }
            _ => {}
        }
    }

    Ok(path)
}
