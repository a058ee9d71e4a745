use foundation::math::Vec2;
use scene::raster::{Raster, Rgba};

/// Drawing surface for map textures.
///
/// Ring coordinates are normalized map space (`[0,1]²`, y down); each
/// implementation scales them to its own pixel size. `fill_rings` treats the
/// first ring as the outer boundary and the rest as holes.
pub trait Canvas2d {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self, color: Rgba);
    fn fill_rings(&mut self, rings: &[Vec<Vec2>], color: Rgba);
    fn stroke_rings(&mut self, rings: &[Vec<Vec2>], line_width_px: f64, color: Rgba);
}

/// CPU canvas backed by [`Raster`].
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    raster: Raster,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    fn to_pixels(&self, ring: &[Vec2]) -> Vec<[f64; 2]> {
        let (w, h) = (self.raster.width() as f64, self.raster.height() as f64);
        ring.iter().map(|p| [p.x * w, p.y * h]).collect()
    }
}

impl Canvas2d for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.raster.resize(width, height);
    }

    fn clear(&mut self, color: Rgba) {
        self.raster.clear(color);
    }

    fn fill_rings(&mut self, rings: &[Vec<Vec2>], color: Rgba) {
        let px: Vec<Vec<[f64; 2]>> = rings.iter().map(|r| self.to_pixels(r)).collect();
        self.raster.fill_polygon(&px, color);
    }

    fn stroke_rings(&mut self, rings: &[Vec<Vec2>], line_width_px: f64, color: Rgba) {
        for ring in rings {
            let px = self.to_pixels(ring);
            self.raster.stroke_polyline(&px, true, line_width_px, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Canvas2d, RasterCanvas};
    use foundation::math::Vec2;

    #[test]
    fn normalized_rings_scale_to_canvas_size() {
        let mut canvas = RasterCanvas::new(8, 4);
        let left_half = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.5, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        canvas.fill_rings(&[left_half], [1, 2, 3, 255]);
        assert_eq!(canvas.raster().pixel(3, 3), Some([1, 2, 3, 255]));
        assert_eq!(canvas.raster().pixel(4, 0), Some([0, 0, 0, 0]));

        canvas.resize(16, 8);
        assert_eq!(canvas.size(), (16, 8));
        assert_eq!(canvas.raster().pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
