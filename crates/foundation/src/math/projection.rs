//! Equirectangular map projection in normalized coordinates.
//!
//! Map space is `x, y ∈ [0, 1]` with `y` growing southwards (raster order).
//! A map of width `w` is `w / 2` tall.

use super::{LonLat, Vec2};

pub const MAP_ASPECT: f64 = 2.0;

pub fn project(p: LonLat) -> Vec2 {
    Vec2::new((p.lon_deg + 180.0) / 360.0, (90.0 - p.lat_deg) / 180.0)
}

pub fn unproject(m: Vec2) -> LonLat {
    LonLat::new(m.x * 360.0 - 180.0, 90.0 - m.y * 180.0)
}

/// Map space position of a sphere texture coordinate.
pub fn map_from_uv(uv: [f64; 2]) -> Vec2 {
    Vec2::new(uv[0], 1.0 - uv[1])
}

/// Pixel containing `m` in a `width x height` raster, or `None` outside the map.
pub fn map_to_pixel(m: Vec2, width: u32, height: u32) -> Option<(u32, u32)> {
    if !(m.x >= 0.0 && m.x <= 1.0 && m.y >= 0.0 && m.y <= 1.0) {
        return None;
    }
    if width == 0 || height == 0 {
        return None;
    }
    let px = ((m.x * width as f64).floor() as u32).min(width - 1);
    let py = ((m.y * height as f64).floor() as u32).min(height - 1);
    Some((px, py))
}

#[cfg(test)]
mod tests {
    use super::{map_from_uv, map_to_pixel, project, unproject};
    use crate::math::{LonLat, Vec2};

    #[test]
    fn project_corners() {
        assert_eq!(project(LonLat::new(-180.0, 90.0)), Vec2::new(0.0, 0.0));
        assert_eq!(project(LonLat::new(180.0, -90.0)), Vec2::new(1.0, 1.0));
        assert_eq!(unproject(Vec2::new(0.5, 0.5)), LonLat::new(0.0, 0.0));
    }

    #[test]
    fn uv_flips_vertical_axis() {
        assert_eq!(map_from_uv([0.25, 0.75]), Vec2::new(0.25, 0.25));
    }

    #[test]
    fn pixel_lookup_clamps_edges_and_rejects_outside() {
        assert_eq!(map_to_pixel(Vec2::new(1.0, 1.0), 8, 4), Some((7, 3)));
        assert_eq!(map_to_pixel(Vec2::new(0.5, 0.5), 8, 4), Some((4, 2)));
        assert_eq!(map_to_pixel(Vec2::new(-0.1, 0.5), 8, 4), None);
        assert_eq!(map_to_pixel(Vec2::new(f64::NAN, 0.5), 8, 4), None);
        assert_eq!(map_to_pixel(Vec2::new(0.5, 0.5), 0, 4), None);
    }
}
