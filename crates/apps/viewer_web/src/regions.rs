use formats::{CountryPath, find_country};
use foundation::math::LonLat;

/// Points the region buttons turn to face the camera.
pub const REGIONS: &[(&str, LonLat)] = &[
    ("Africa", LonLat::new(20.0, 5.0)),
    ("Europe", LonLat::new(15.0, 50.0)),
    ("Asia", LonLat::new(90.0, 35.0)),
    ("Middle East", LonLat::new(45.0, 28.0)),
    ("North America", LonLat::new(-100.0, 45.0)),
    ("South America", LonLat::new(-60.0, -15.0)),
    ("Oceania", LonLat::new(135.0, -25.0)),
    ("Antarctica", LonLat::new(0.0, -75.0)),
];

/// Region centre for `name`, else the centroid of the country with that
/// name. Both lookups ignore case and surrounding whitespace.
pub fn resolve_region(name: &str, countries: &[CountryPath]) -> Option<LonLat> {
    let needle = name.trim();
    REGIONS
        .iter()
        .find(|(region, _)| region.eq_ignore_ascii_case(needle))
        .map(|(_, at)| *at)
        .or_else(|| find_country(countries, needle).map(|(_, c)| c.centroid))
}

#[cfg(test)]
mod tests {
    use super::resolve_region;
    use formats::country_paths_from_topojson;
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    const ISLAND: &str = r#"{
        "type": "Topology",
        "arcs": [[[30, -10], [50, -10], [50, 10], [30, 10], [30, -10]]],
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "IS", "arcs": [[0]], "properties": {"name": "Island"}}
        ]}}
    }"#;

    #[test]
    fn regions_resolve_before_geometry_loads() {
        assert_eq!(resolve_region("Europe", &[]), Some(LonLat::new(15.0, 50.0)));
        assert_eq!(resolve_region("  south america ", &[]), Some(LonLat::new(-60.0, -15.0)));
        assert_eq!(resolve_region("Island", &[]), None);
    }

    #[test]
    fn unknown_regions_fall_back_to_countries() {
        let countries = country_paths_from_topojson(ISLAND, "countries").expect("decode");
        let at = resolve_region("island", &countries).expect("country centroid");
        assert!((at.lon_deg - 40.0).abs() < 1e-6);
        assert!(at.lat_deg.abs() < 1e-6);
        assert_eq!(resolve_region("Atlantis", &countries), None);
    }
}
