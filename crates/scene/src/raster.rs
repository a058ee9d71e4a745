//! Software RGBA rasterizer for map-space polygons.
//!
//! Polygons are triangulated with `earcutr` and scan-converted one triangle at
//! a time. Coverage is sampled at pixel centers with a top-left fill rule, so a
//! pixel center lying exactly on an edge shared by two triangles (or by two
//! countries with a common border) belongs to exactly one of them.

use earcutr::earcut;

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Transparent raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn clear(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Reallocates to `width x height`, cleared to transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Fills a polygon given in pixel coordinates. The first ring is the
    /// outer boundary; further rings are holes.
    pub fn fill_polygon(&mut self, rings: &[Vec<[f64; 2]>], color: Rgba) {
        for tri in triangulate(rings) {
            self.fill_triangle(tri, color);
        }
    }

    /// Strokes a polyline of `line_width` pixels as one quad per segment.
    pub fn stroke_polyline(
        &mut self,
        points: &[[f64; 2]],
        closed: bool,
        line_width: f64,
        color: Rgba,
    ) {
        if points.len() < 2 || line_width <= 0.0 {
            return;
        }
        let half = line_width * 0.5;
        let mut segment = |a: [f64; 2], b: [f64; 2]| {
            let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
            let len = (dx * dx + dy * dy).sqrt();
            if len <= f64::EPSILON {
                return;
            }
            let (nx, ny) = (-dy / len * half, dx / len * half);
            let p0 = [a[0] + nx, a[1] + ny];
            let p1 = [b[0] + nx, b[1] + ny];
            let p2 = [b[0] - nx, b[1] - ny];
            let p3 = [a[0] - nx, a[1] - ny];
            self.fill_triangle([p0, p1, p2], color);
            self.fill_triangle([p0, p2, p3], color);
        };
        for w in points.windows(2) {
            segment(w[0], w[1]);
        }
        let (first, last) = (points[0], points[points.len() - 1]);
        if closed && first != last {
            segment(last, first);
        }
    }

    pub fn fill_triangle(&mut self, tri: [[f64; 2]; 3], color: Rgba) {
        let [a, mut b, mut c] = tri;
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        if area < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }

        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0);
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0);
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(self.width as f64);
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(self.height as f64);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let edges = [(b, c), (c, a), (a, b)];
        let owned = edges.map(|(p, q)| owns_edge(p, q));

        for y in min_y as u32..max_y as u32 {
            let py = y as f64 + 0.5;
            for x in min_x as u32..max_x as u32 {
                let p = [x as f64 + 0.5, py];
                let inside = edges.iter().zip(owned).all(|(&(e0, e1), owns)| {
                    let w = edge(e0, e1, p);
                    w > 0.0 || (w == 0.0 && owns)
                });
                if inside {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over compositing in straight alpha.
    fn blend(&mut self, x: u32, y: u32, src: Rgba) {
        let i = self.offset(x, y);
        let dst = &mut self.data[i..i + 4];
        if src[3] == 255 || dst[3] == 0 {
            dst.copy_from_slice(&src);
            return;
        }
        if src[3] == 0 {
            return;
        }
        let sa = src[3] as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let sc = src[c] as f32 / 255.0;
            let dc = dst[c] as f32 / 255.0;
            let v = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            dst[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Twice the signed area of `(a, b, p)`; positive when `p` is on the interior
/// side of `a -> b` for a positively wound triangle.
fn edge(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Tie-break for pixel centers exactly on an edge. The reversed edge always
/// gets the opposite answer.
fn owns_edge(a: [f64; 2], b: [f64; 2]) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

/// Triangulates a polygon with holes. Degenerate input yields no triangles.
pub fn triangulate(rings: &[Vec<[f64; 2]>]) -> Vec<[[f64; 2]; 3]> {
    let mut coords: Vec<f64> = Vec::new();
    let mut holes: Vec<usize> = Vec::new();
    let mut vertices: Vec<[f64; 2]> = Vec::new();

    for (ring_i, ring) in rings.iter().enumerate() {
        let ring = open_ring(ring);
        if ring.len() < 3 {
            if ring_i == 0 {
                return Vec::new();
            }
            continue;
        }
        if ring_i > 0 {
            holes.push(vertices.len());
        }
        for p in ring {
            coords.push(p[0]);
            coords.push(p[1]);
            vertices.push(*p);
        }
    }

    let indices = match earcut(&coords, &holes, 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };

    indices
        .chunks_exact(3)
        .filter_map(|t| {
            Some([
                *vertices.get(t[0])?,
                *vertices.get(t[1])?,
                *vertices.get(t[2])?,
            ])
        })
        .collect()
}

/// Drops the closing point of an explicitly closed ring.
fn open_ring(ring: &[[f64; 2]]) -> &[[f64; 2]] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
