//! Color type and the named colors used by the scene.
//!
//! Colors are RGBA with `f32` components in [0.0, 1.0], expressed in sRGB space.
//! Shaders convert them to linear space before lighting.

pub use rgb::Rgba;

/// The color type used throughout wip3d. RGBA with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// <div style="margin:2px 0"><span style="background-color:rgb(0, 0, 0);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Black (0, 0, 0)</div>
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(255, 255, 255);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>White (255, 255, 255)</div>
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(255, 255, 0);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Yellow (255, 255, 0)</div>
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(0, 255, 255);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Cyan (0, 255, 255)</div>
pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(255, 0, 255);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Magenta (255, 0, 255)</div>
pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(255, 215, 0);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Gold (255, 215, 0)</div>
pub const GOLD: Color = Color::new(1.0, 0.84313726, 0.0, 1.0);

/// Builds an opaque color from a `0xRRGGBB` value.
pub const fn from_hex(hex: u32) -> Color {
    Color::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_match_named_constants() {
        assert_eq!(from_hex(0x00ffff), CYAN);
        assert_eq!(from_hex(0xff00ff), MAGENTA);
        assert_eq!(from_hex(0xffd700), GOLD);
        assert_eq!(from_hex(0x000000), BLACK);
    }
}
