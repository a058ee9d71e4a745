//! Map textures for the globe.
//!
//! Four canvases feed the globe's textures: the base map, country outlines,
//! the hover highlight and the click highlight. Highlights only ever contain a
//! single country, so a hover or click change redraws one small canvas and
//! leaves the base map alone.
//!
//! Canvases start at the low tier and are upgraded to the high tier once,
//! when the globe first scrolls into view.

use formats::CountryPath;
use scene::raster::TRANSPARENT;
use serde::Deserialize;
use tracing::{debug, info};

use crate::canvas::Canvas2d;
use crate::symbology::{CountryStyle, Palette, scaled_line_width};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextureLayer {
    Map,
    Strokes,
    Highlight,
    Click,
}

impl TextureLayer {
    pub const ALL: [TextureLayer; 4] = [
        TextureLayer::Map,
        TextureLayer::Strokes,
        TextureLayer::Highlight,
        TextureLayer::Click,
    ];

    fn slot(self) -> usize {
        match self {
            TextureLayer::Map => 0,
            TextureLayer::Strokes => 1,
            TextureLayer::Highlight => 2,
            TextureLayer::Click => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    Low,
    High,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct TierSize {
    pub width: u32,
    pub height: u32,
}

impl TierSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub low_res: TierSize,
    pub high_res: TierSize,
    pub palette: Palette,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            low_res: TierSize::new(1024, 512),
            high_res: TierSize::new(4096, 2048),
            palette: Palette::default(),
        }
    }
}

pub struct TextureCompositor<C: Canvas2d> {
    canvases: [C; 4],
    dirty: [bool; 4],
    tier: Tier,
    config: TextureConfig,
    hover: Option<usize>,
    click: Option<usize>,
}

impl<C: Canvas2d> TextureCompositor<C> {
    /// Takes ownership of the four canvases, ordered as [`TextureLayer::ALL`],
    /// and sizes them for the low tier. Nothing is drawn yet.
    pub fn new(mut canvases: [C; 4], config: TextureConfig) -> Self {
        let size = config.low_res;
        for c in &mut canvases {
            c.resize(size.width, size.height);
        }
        Self {
            canvases,
            dirty: [false; 4],
            tier: Tier::Low,
            config,
            hover: None,
            click: None,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn hover_index(&self) -> Option<usize> {
        self.hover
    }

    pub fn click_index(&self) -> Option<usize> {
        self.click
    }

    pub fn canvas(&self, layer: TextureLayer) -> &C {
        &self.canvases[layer.slot()]
    }

    /// Draws the base map and the outline canvas.
    pub fn draw_base(&mut self, countries: &[CountryPath]) {
        let palette = self.config.palette;

        let map = &mut self.canvases[TextureLayer::Map.slot()];
        map.clear(palette.ocean);
        for country in countries {
            draw_country(map, country, palette.land);
        }
        self.dirty[TextureLayer::Map.slot()] = true;

        let strokes = &mut self.canvases[TextureLayer::Strokes.slot()];
        strokes.clear(TRANSPARENT);
        for country in countries {
            draw_country(strokes, country, palette.border);
        }
        self.dirty[TextureLayer::Strokes.slot()] = true;

        debug!(countries = countries.len(), tier = ?self.tier, "base textures drawn");
    }

    /// Redraws the hover canvas with only `index` highlighted (`None` clears it).
    pub fn draw_hover(&mut self, countries: &[CountryPath], index: Option<usize>) {
        self.hover = index;
        let style = self.config.palette.hover;
        self.draw_single(TextureLayer::Highlight, countries, index, style);
    }

    /// Redraws the click canvas with only `index` highlighted (`None` clears it).
    pub fn draw_click(&mut self, countries: &[CountryPath], index: Option<usize>) {
        self.click = index;
        let style = self.config.palette.click;
        self.draw_single(TextureLayer::Click, countries, index, style);
    }

    /// Switches every canvas to the high tier and redraws it, including the
    /// current hover and click highlights. Only the first call does anything.
    pub fn upgrade_to_high(&mut self, countries: &[CountryPath]) -> bool {
        if self.tier == Tier::High {
            return false;
        }
        let size = self.config.high_res;
        for c in &mut self.canvases {
            c.resize(size.width, size.height);
        }
        self.tier = Tier::High;
        info!(width = size.width, height = size.height, "upgrading map textures");

        self.draw_base(countries);
        let (hover, click) = (self.hover, self.click);
        self.draw_hover(countries, hover);
        self.draw_click(countries, click);
        true
    }

    /// Layers drawn since the previous call, in [`TextureLayer::ALL`] order.
    pub fn take_dirty(&mut self) -> Vec<TextureLayer> {
        let out = TextureLayer::ALL
            .into_iter()
            .filter(|l| self.dirty[l.slot()])
            .collect();
        self.dirty = [false; 4];
        out
    }

    fn draw_single(
        &mut self,
        layer: TextureLayer,
        countries: &[CountryPath],
        index: Option<usize>,
        style: CountryStyle,
    ) {
        let canvas = &mut self.canvases[layer.slot()];
        canvas.clear(TRANSPARENT);
        if let Some(country) = index.and_then(|i| countries.get(i)) {
            draw_country(canvas, country, style);
        }
        self.dirty[layer.slot()] = true;
    }
}

fn draw_country<C: Canvas2d>(canvas: &mut C, country: &CountryPath, style: CountryStyle) {
    if let Some(fill) = style.fill {
        for polygon in &country.polygons {
            canvas.fill_rings(&polygon.rings, fill);
        }
    }
    if let Some(stroke) = style.stroke {
        let width = scaled_line_width(style.line_width, canvas.size().0);
        for polygon in &country.polygons {
            canvas.stroke_rings(&polygon.rings, width, stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TextureCompositor, TextureConfig, TextureLayer, Tier, TierSize};
    use crate::canvas::{Canvas2d, RasterCanvas};
    use foundation::math::Vec2;
    use formats::{CountryPath, country_paths_from_topojson};
    use pretty_assertions::assert_eq;
    use scene::raster::Rgba;

    const THREE: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [20, 0], [20, 20], [0, 20], [0, 0]],
            [[40, 0], [60, 0], [60, 20], [40, 20], [40, 0]],
            [[-100, -30], [-80, -30], [-80, -10], [-100, -10], [-100, -30]]
        ],
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "A", "arcs": [[0]]},
            {"type": "Polygon", "id": "B", "arcs": [[1]]},
            {"type": "Polygon", "id": "C", "arcs": [[2]]}
        ]}}
    }"#;

    fn countries() -> Vec<CountryPath> {
        country_paths_from_topojson(THREE, "countries").expect("decode")
    }

    fn small_config() -> TextureConfig {
        TextureConfig {
            low_res: TierSize::new(72, 36),
            high_res: TierSize::new(144, 72),
            ..TextureConfig::default()
        }
    }

    #[derive(Debug, Default)]
    struct CountingCanvas {
        size: (u32, u32),
        clears: usize,
        fills: usize,
        strokes: usize,
    }

    impl Canvas2d for CountingCanvas {
        fn size(&self) -> (u32, u32) {
            self.size
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }
        fn clear(&mut self, _color: Rgba) {
            self.clears += 1;
        }
        fn fill_rings(&mut self, _rings: &[Vec<Vec2>], _color: Rgba) {
            self.fills += 1;
        }
        fn stroke_rings(&mut self, _rings: &[Vec<Vec2>], _w: f64, _color: Rgba) {
            self.strokes += 1;
        }
    }

    fn counting() -> TextureCompositor<CountingCanvas> {
        TextureCompositor::new(Default::default(), small_config())
    }

    #[test]
    fn starts_at_low_tier_and_marks_base_dirty() {
        let mut comp = counting();
        assert_eq!(comp.canvas(TextureLayer::Map).size, (72, 36));
        assert!(comp.take_dirty().is_empty());

        comp.draw_base(&countries());
        assert_eq!(
            comp.take_dirty(),
            vec![TextureLayer::Map, TextureLayer::Strokes]
        );
        assert!(comp.take_dirty().is_empty());
        assert_eq!(comp.canvas(TextureLayer::Map).fills, 3);
        assert_eq!(comp.canvas(TextureLayer::Strokes).strokes, 3);
    }

    #[test]
    fn hover_redraw_touches_only_one_country() {
        let mut comp = counting();
        let countries = countries();
        comp.draw_base(&countries);
        comp.take_dirty();

        comp.draw_hover(&countries, Some(1));
        assert_eq!(comp.take_dirty(), vec![TextureLayer::Highlight]);
        let hl = comp.canvas(TextureLayer::Highlight);
        assert_eq!((hl.clears, hl.fills, hl.strokes), (1, 1, 1));
        assert_eq!(comp.canvas(TextureLayer::Map).fills, 3);

        comp.draw_hover(&countries, None);
        let hl = comp.canvas(TextureLayer::Highlight);
        assert_eq!((hl.clears, hl.fills), (2, 1));
        assert_eq!(comp.hover_index(), None);
    }

    #[test]
    fn click_layer_is_independent_of_hover() {
        let mut comp = counting();
        let countries = countries();
        comp.draw_click(&countries, Some(2));
        assert_eq!(comp.take_dirty(), vec![TextureLayer::Click]);
        assert_eq!(comp.click_index(), Some(2));
        assert_eq!(comp.canvas(TextureLayer::Highlight).clears, 0);
    }

    #[test]
    fn high_tier_upgrade_happens_once_and_keeps_highlights() {
        let mut comp = counting();
        let countries = countries();
        comp.draw_base(&countries);
        comp.draw_hover(&countries, Some(0));
        comp.take_dirty();

        assert!(comp.upgrade_to_high(&countries));
        assert_eq!(comp.tier(), Tier::High);
        assert_eq!(comp.canvas(TextureLayer::Click).size, (144, 72));
        assert_eq!(comp.take_dirty(), TextureLayer::ALL.to_vec());
        assert_eq!(comp.canvas(TextureLayer::Highlight).fills, 2);
        assert_eq!(comp.hover_index(), Some(0));

        assert!(!comp.upgrade_to_high(&countries));
        assert!(comp.take_dirty().is_empty());
    }

    #[test]
    fn raster_canvases_receive_pixels() {
        let mut comp: TextureCompositor<RasterCanvas> = TextureCompositor::new(
            std::array::from_fn(|_| RasterCanvas::new(1, 1)),
            small_config(),
        );
        let countries = countries();
        comp.draw_base(&countries);
        comp.draw_click(&countries, Some(0));

        let palette = small_config().palette;
        let map = comp.canvas(TextureLayer::Map).raster();
        // Ocean corner; country A spans lon 0..20, lat 0..20.
        assert_eq!(map.pixel(0, 0), Some(palette.ocean));
        assert_eq!(map.pixel(38, 16), palette.land.fill);

        let click = comp.canvas(TextureLayer::Click).raster();
        assert_ne!(click.pixel(38, 16), Some([0, 0, 0, 0]));
        assert_eq!(click.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
