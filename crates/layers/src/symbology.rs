use scene::raster::Rgba;
use serde::Deserialize;

/// Fill and outline for one kind of country drawing.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct CountryStyle {
    pub fill: Option<Rgba>,
    pub stroke: Option<Rgba>,
    /// Outline width in pixels at the reference canvas width.
    pub line_width: f64,
}

impl CountryStyle {
    pub const fn new(fill: Option<Rgba>, stroke: Option<Rgba>, line_width: f64) -> Self {
        Self {
            fill,
            stroke,
            line_width,
        }
    }
}

/// Canvas width at which `line_width` values are given. Wider canvases scale
/// outlines up so both texture tiers look alike on the globe.
pub const REFERENCE_CANVAS_WIDTH: f64 = 1024.0;

pub fn scaled_line_width(line_width: f64, canvas_width: u32) -> f64 {
    line_width * canvas_width as f64 / REFERENCE_CANVAS_WIDTH
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub ocean: Rgba,
    pub land: CountryStyle,
    pub border: CountryStyle,
    pub hover: CountryStyle,
    pub click: CountryStyle,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ocean: [10, 24, 48, 255],
            land: CountryStyle::new(Some([46, 92, 74, 255]), None, 0.0),
            border: CountryStyle::new(None, Some([200, 220, 210, 200]), 0.6),
            hover: CountryStyle::new(Some([255, 214, 102, 110]), Some([255, 214, 102, 255]), 1.5),
            click: CountryStyle::new(Some([255, 120, 90, 130]), Some([255, 120, 90, 255]), 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Palette, scaled_line_width};

    #[test]
    fn line_width_scales_with_canvas() {
        assert_eq!(scaled_line_width(1.5, 1024), 1.5);
        assert_eq!(scaled_line_width(1.5, 4096), 6.0);
    }

    #[test]
    fn partial_palette_keeps_defaults() {
        let p: Palette = serde_json::from_str(r#"{"ocean": [0, 0, 0, 255]}"#).expect("parse");
        assert_eq!(p.ocean, [0, 0, 0, 255]);
        assert_eq!(p.hover, Palette::default().hover);
    }
}
