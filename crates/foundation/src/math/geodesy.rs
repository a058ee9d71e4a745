//! Unit-sphere geodesy.
//!
//! The globe is a unit sphere in a y-up, right-handed frame:
//! - `(lat 0, lon 0)` faces `+x`
//! - `(lat 0, lon 90E)` faces `-z`
//! - the north pole is `+y`
//!
//! Texture coordinates follow the equirectangular map: `u = (lon + 180) / 360`,
//! `v = (lat + 90) / 180` (v grows northwards).

use super::Vec3;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

pub fn unit_from_lon_lat(p: LonLat) -> Vec3 {
    let lat = p.lat_deg.to_radians();
    let lon = p.lon_deg.to_radians();
    let cos_lat = lat.cos();
    Vec3::new(cos_lat * lon.cos(), lat.sin(), -cos_lat * lon.sin())
}

/// Inverse of [`unit_from_lon_lat`]. The input does not need to be normalized.
pub fn lon_lat_from_point(p: Vec3) -> Option<LonLat> {
    let n = p.normalize()?;
    let lat = n.y.clamp(-1.0, 1.0).asin();
    let lon = (-n.z).atan2(n.x);
    Some(LonLat::new(lon.to_degrees(), lat.to_degrees()))
}

pub fn uv_from_lon_lat(p: LonLat) -> [f64; 2] {
    [(p.lon_deg + 180.0) / 360.0, (p.lat_deg + 90.0) / 180.0]
}

pub fn lon_lat_from_uv(uv: [f64; 2]) -> LonLat {
    LonLat::new(uv[0] * 360.0 - 180.0, uv[1] * 180.0 - 90.0)
}

#[cfg(test)]
mod tests {
    use super::{LonLat, lon_lat_from_point, lon_lat_from_uv, unit_from_lon_lat, uv_from_lon_lat};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn axes_match_frame_convention() {
        let p = unit_from_lon_lat(LonLat::new(0.0, 0.0));
        assert_close(p.x, 1.0, 1e-12);
        let east = unit_from_lon_lat(LonLat::new(90.0, 0.0));
        assert_close(east.z, -1.0, 1e-12);
        let north = unit_from_lon_lat(LonLat::new(0.0, 90.0));
        assert_close(north.y, 1.0, 1e-12);
    }

    #[test]
    fn point_round_trips_through_lon_lat() {
        let src = LonLat::new(-73.5, 40.25);
        let back = lon_lat_from_point(unit_from_lon_lat(src) * 3.0).expect("non-zero");
        assert_close(back.lon_deg, src.lon_deg, 1e-9);
        assert_close(back.lat_deg, src.lat_deg, 1e-9);
        assert!(lon_lat_from_point(Vec3::ZERO).is_none());
    }

    #[test]
    fn uv_corners() {
        assert_eq!(uv_from_lon_lat(LonLat::new(-180.0, -90.0)), [0.0, 0.0]);
        assert_eq!(uv_from_lon_lat(LonLat::new(0.0, 0.0)), [0.5, 0.5]);
        assert_eq!(lon_lat_from_uv([1.0, 1.0]), LonLat::new(180.0, 90.0));
    }
}
