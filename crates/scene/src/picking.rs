use foundation::math::{Vec2, Vec3, lon_lat_from_point, map_from_uv, map_to_pixel, uv_from_lon_lat};
use formats::CountryPath;
use tracing::debug;

use crate::raster::{Raster, Rgba};

pub const DEFAULT_PICKING_WIDTH: u32 = 2048;
pub const DEFAULT_PICKING_HEIGHT: u32 = 1024;

/// Largest country count a 24-bit key can address with 0 reserved for
/// background.
pub const MAX_PICKABLE_COUNTRIES: usize = (1 << 24) - 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickingError {
    EmptyRaster { width: u32, height: u32 },
    TooManyCountries { count: usize },
}

impl std::fmt::Display for PickingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickingError::EmptyRaster { width, height } => {
                write!(f, "picking raster must be non-empty (got {width}x{height})")
            }
            PickingError::TooManyCountries { count } => write!(
                f,
                "{count} countries exceed the picking key space ({MAX_PICKABLE_COUNTRIES})"
            ),
        }
    }
}

impl std::error::Error for PickingError {}

/// Opaque color encoding `index + 1`, or `None` past the key space.
pub fn encode_index(index: usize) -> Option<Rgba> {
    if index >= MAX_PICKABLE_COUNTRIES {
        return None;
    }
    let key = (index + 1) as u32;
    Some([(key >> 16) as u8, (key >> 8) as u8, key as u8, 0xff])
}

/// Country index for a pixel color.
///
/// Background (key 0), partially transparent pixels and keys past
/// `country_count` all decode to `None`.
pub fn decode_color(color: Rgba, country_count: usize) -> Option<usize> {
    if color[3] != 0xff {
        return None;
    }
    let key = ((color[0] as usize) << 16) | ((color[1] as usize) << 8) | color[2] as usize;
    let index = key.checked_sub(1)?;
    (index < country_count).then_some(index)
}

/// Off-screen raster in which every country is filled with its encoded index.
///
/// Built once per geometry load and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PickingBuffer {
    raster: Raster,
    country_count: usize,
}

impl PickingBuffer {
    pub fn build(countries: &[CountryPath], width: u32, height: u32) -> Result<Self, PickingError> {
        if width == 0 || height == 0 {
            return Err(PickingError::EmptyRaster { width, height });
        }
        if countries.len() > MAX_PICKABLE_COUNTRIES {
            return Err(PickingError::TooManyCountries {
                count: countries.len(),
            });
        }

        let mut raster = Raster::new(width, height);
        let (w, h) = (width as f64, height as f64);
        for (index, country) in countries.iter().enumerate() {
            let Some(color) = encode_index(index) else {
                continue;
            };
            for polygon in &country.polygons {
                let rings: Vec<Vec<[f64; 2]>> = polygon
                    .rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| [p.x * w, p.y * h]).collect())
                    .collect();
                raster.fill_polygon(&rings, color);
            }
        }
        debug!(countries = countries.len(), width, height, "picking buffer built");

        Ok(Self {
            raster,
            country_count: countries.len(),
        })
    }

    pub fn country_count(&self) -> usize {
        self.country_count
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Country under a normalized map position (y down).
    pub fn lookup_map(&self, m: Vec2) -> Option<usize> {
        let (x, y) = map_to_pixel(m, self.raster.width(), self.raster.height())?;
        decode_color(self.raster.pixel(x, y)?, self.country_count)
    }

    /// Country under a sphere texture coordinate (v grows northwards).
    pub fn lookup_uv(&self, uv: [f64; 2]) -> Option<usize> {
        self.lookup_map(map_from_uv(uv))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

/// Nearest intersection of `ray` with a sphere of `radius` at the origin, if it
/// lies in front of the ray origin.
pub fn intersect_sphere(ray: Ray, radius: f64) -> Option<Vec3> {
    let dir = ray.dir.normalize()?;
    let b = ray.origin.dot(dir);
    let c = ray.origin.dot(ray.origin) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 || radius <= 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t_near = -b - sq;
    let t_far = -b + sq;
    let t = if t_near >= 0.0 {
        t_near
    } else if t_far >= 0.0 {
        t_far
    } else {
        return None;
    };
    Some(ray.origin + dir * t)
}

/// Texture coordinate of a point on (or near) the sphere surface.
pub fn uv_at_point(p: Vec3) -> Option<[f64; 2]> {
    lon_lat_from_point(p).map(uv_from_lon_lat)
}

#[cfg(test)]
mod tests {
    use super::{
        PickingBuffer, PickingError, Ray, decode_color, encode_index, intersect_sphere,
        uv_at_point,
    };
    use foundation::math::{LonLat, Vec3, unit_from_lon_lat, uv_from_lon_lat};
    use formats::country_paths_from_topojson;

    const TWO_SQUARES: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [20, 0], [20, 20], [0, 20], [0, 0]],
            [[20, 0], [40, 0], [40, 20], [20, 20], [20, 0]],
            [[-170, -60], [-150, -60], [-150, -40], [-170, -40], [-170, -60]]
        ],
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "A", "arcs": [[0]], "properties": {"name": "Alpha"}},
                    {"type": "MultiPolygon", "id": "B", "arcs": [[[1]], [[2]]], "properties": {"name": "Beta"}}
                ]
            }
        }
    }"#;

    fn buffer() -> PickingBuffer {
        let paths = country_paths_from_topojson(TWO_SQUARES, "countries").expect("decode");
        PickingBuffer::build(&paths, 720, 360).expect("build")
    }

    #[test]
    fn encoding_reserves_zero_for_background() {
        assert_eq!(encode_index(0), Some([0, 0, 1, 255]));
        assert_eq!(encode_index(0x1234), Some([0, 0x12, 0x35, 255]));
        assert_eq!(decode_color([0, 0, 1, 255], 1), Some(0));
        assert_eq!(decode_color([0, 0, 0, 255], 10), None);
        assert_eq!(decode_color([0, 0, 0, 0], 10), None);
    }

    #[test]
    fn blended_or_out_of_range_pixels_are_no_match() {
        assert_eq!(decode_color([0, 0, 2, 200], 10), None);
        assert_eq!(decode_color([0, 0, 9, 255], 3), None);
        assert_eq!(decode_color([0, 0, 3, 255], 3), Some(2));
    }

    #[test]
    fn uv_inside_polygons_resolves_to_their_index() {
        let pick = buffer();
        let uv = |lon, lat| uv_from_lon_lat(LonLat::new(lon, lat));
        assert_eq!(pick.lookup_uv(uv(10.0, 10.0)), Some(0));
        assert_eq!(pick.lookup_uv(uv(30.0, 5.0)), Some(1));
        // Second polygon of a multipolygon.
        assert_eq!(pick.lookup_uv(uv(-160.0, -50.0)), Some(1));
    }

    #[test]
    fn uv_outside_polygons_is_no_match() {
        let pick = buffer();
        assert_eq!(pick.lookup_uv(uv_from_lon_lat(LonLat::new(-60.0, 30.0))), None);
        assert_eq!(pick.lookup_uv([1.5, 0.5]), None);
        assert_eq!(pick.lookup_uv([f64::NAN, 0.5]), None);
    }

    #[test]
    fn rejects_empty_raster() {
        assert_eq!(
            PickingBuffer::build(&[], 0, 10).unwrap_err(),
            PickingError::EmptyRaster {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn ray_hits_front_of_sphere() {
        let ray = Ray::new(Vec3::new(0.2, 0.1, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect_sphere(ray, 1.0).expect("hit");
        assert!(hit.z > 0.0);
        assert!((hit.length() - 1.0).abs() < 1e-12);

        let miss = Ray::new(Vec3::new(2.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(intersect_sphere(miss, 1.0), None);

        let behind = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(intersect_sphere(behind, 1.0), None);
    }

    #[test]
    fn hit_point_uv_matches_geographic_uv() {
        let p = LonLat::new(25.0, -12.0);
        let uv = uv_at_point(unit_from_lon_lat(p) * 1.002).expect("uv");
        let expected = uv_from_lon_lat(p);
        assert!((uv[0] - expected[0]).abs() < 1e-12);
        assert!((uv[1] - expected[1]).abs() < 1e-12);
    }
}
