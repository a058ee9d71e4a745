//! Country paths: topology features projected onto the equirectangular map.
//!
//! The list order is significant. A country's position in the list is its
//! index everywhere else (picking keys, highlight redraws, selection).

use foundation::math::{LonLat, Vec2, project};

use crate::topology::{TopoFeature, Topology, TopologyError};

/// Width of the map the `d` path strings are expressed in.
pub const PATH_REF_WIDTH: f64 = 1000.0;
/// Height of the map the `d` path strings are expressed in.
pub const PATH_REF_HEIGHT: f64 = 500.0;

/// One polygon in normalized map space (`[0,1]²`, y down). The first ring is
/// the outer boundary; any further rings are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPolygon {
    pub rings: Vec<Vec<Vec2>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryPath {
    /// SVG path data at `PATH_REF_WIDTH x PATH_REF_HEIGHT`.
    pub d: String,
    pub name: String,
    pub id: String,
    pub polygons: Vec<MapPolygon>,
    /// Area-weighted center of the largest polygon's outer ring.
    pub centroid: LonLat,
}

impl CountryPath {
    pub fn from_feature(feature: &TopoFeature) -> Self {
        let polygons: Vec<MapPolygon> = feature
            .polygons
            .iter()
            .map(|poly| MapPolygon {
                rings: poly
                    .iter()
                    .map(|ring| ring.iter().map(|p| project(*p)).collect())
                    .collect(),
            })
            .collect();
        let d = path_data(&polygons);
        let centroid = largest_ring_centroid(feature);
        Self {
            d,
            name: feature.name.clone(),
            id: feature.id.clone(),
            polygons,
            centroid,
        }
    }

    /// Rings of every polygon, flattened.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Vec2>> {
        self.polygons.iter().flat_map(|p| p.rings.iter())
    }
}

/// Decodes `object` from a TopoJSON payload into country paths.
pub fn country_paths_from_topojson(
    payload: &str,
    object: &str,
) -> Result<Vec<CountryPath>, TopologyError> {
    let topo = Topology::from_json_str(payload)?;
    let features = topo.features(object)?;
    Ok(features.iter().map(CountryPath::from_feature).collect())
}

/// First country whose name matches, case-insensitively.
pub fn find_country<'a>(paths: &'a [CountryPath], name: &str) -> Option<(usize, &'a CountryPath)> {
    let needle = name.trim();
    paths
        .iter()
        .enumerate()
        .find(|(_, c)| c.name.eq_ignore_ascii_case(needle))
}

fn path_data(polygons: &[MapPolygon]) -> String {
    use std::fmt::Write;

    let mut d = String::new();
    for ring in polygons.iter().flat_map(|p| p.rings.iter()) {
        for (i, p) in ring.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(
                d,
                "{cmd}{},{}",
                fmt_coord(p.x * PATH_REF_WIDTH),
                fmt_coord(p.y * PATH_REF_HEIGHT)
            );
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

/// Two decimals, trailing zeros trimmed.
fn fmt_coord(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn ring_area_and_centroid(ring: &[LonLat]) -> (f64, LonLat) {
    let mut a2 = 0.0;
    let (mut cx, mut cy) = (0.0, 0.0);
    for w in ring.windows(2) {
        let (x0, y0) = (w[0].lon_deg, w[0].lat_deg);
        let (x1, y1) = (w[1].lon_deg, w[1].lat_deg);
        let cross = x0 * y1 - x1 * y0;
        a2 += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if a2.abs() < 1e-12 {
        let n = ring.len().max(1) as f64;
        let lon = ring.iter().map(|p| p.lon_deg).sum::<f64>() / n;
        let lat = ring.iter().map(|p| p.lat_deg).sum::<f64>() / n;
        return (0.0, LonLat::new(lon, lat));
    }
    (a2.abs() / 2.0, LonLat::new(cx / (3.0 * a2), cy / (3.0 * a2)))
}

fn largest_ring_centroid(feature: &TopoFeature) -> LonLat {
    feature
        .polygons
        .iter()
        .filter_map(|p| p.first())
        .map(|outer| ring_area_and_centroid(outer))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
        .unwrap_or_default()
}
