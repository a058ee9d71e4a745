//! TopoJSON decoding.
//!
//! Supports the subset needed for world boundary datasets: quantized or
//! absolute arcs, and `GeometryCollection` / `Polygon` / `MultiPolygon`
//! objects. Other geometry types are skipped.

use std::collections::BTreeMap;

use foundation::math::LonLat;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    Json(String),
    NotATopology,
    MissingObject(String),
    BadArcIndex { arc: i64, arc_count: usize },
    BadPosition { arc: usize },
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::Json(msg) => write!(f, "topology JSON parse error: {msg}"),
            TopologyError::NotATopology => write!(f, "expected a TopoJSON Topology"),
            TopologyError::MissingObject(name) => {
                write!(f, "topology has no object named {name:?}")
            }
            TopologyError::BadArcIndex { arc, arc_count } => {
                write!(f, "arc index {arc} out of range (topology has {arc_count} arcs)")
            }
            TopologyError::BadPosition { arc } => {
                write!(f, "arc {arc} contains a position with fewer than two coordinates")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantizeTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub transform: Option<QuantizeTransform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    #[serde(other)]
    Unsupported,
}

/// One polygon as rings of geographic points; the first ring is the outer
/// boundary, the rest are holes.
pub type GeoPolygon = Vec<Vec<LonLat>>;

/// A decoded polygonal feature.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoFeature {
    pub id: String,
    pub name: String,
    pub polygons: Vec<GeoPolygon>,
}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        let topo: Topology =
            serde_json::from_str(payload).map_err(|e| TopologyError::Json(e.to_string()))?;
        if topo.kind != "Topology" {
            return Err(TopologyError::NotATopology);
        }
        Ok(topo)
    }

    /// Absolute positions for every arc, with quantization undone.
    pub fn decoded_arcs(&self) -> Result<Vec<Vec<LonLat>>, TopologyError> {
        let mut out = Vec::with_capacity(self.arcs.len());
        for (arc_i, arc) in self.arcs.iter().enumerate() {
            let mut points = Vec::with_capacity(arc.len());
            let (mut x, mut y) = (0.0f64, 0.0f64);
            for pos in arc {
                let [px, py] = match pos.as_slice() {
                    [px, py, ..] => [*px, *py],
                    _ => return Err(TopologyError::BadPosition { arc: arc_i }),
                };
                let p = match self.transform {
                    Some(t) => {
                        x += px;
                        y += py;
                        LonLat::new(
                            x * t.scale[0] + t.translate[0],
                            y * t.scale[1] + t.translate[1],
                        )
                    }
                    None => LonLat::new(px, py),
                };
                points.push(p);
            }
            out.push(points);
        }
        Ok(out)
    }

    /// Flattens the named object into polygonal features, in document order.
    ///
    /// Geometries without polygonal content are skipped.
    pub fn features(&self, object: &str) -> Result<Vec<TopoFeature>, TopologyError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
        let arcs = self.decoded_arcs()?;
        let mut out = Vec::new();
        collect_features(root, &arcs, &mut out)?;
        Ok(out)
    }
}

fn collect_features(
    geom: &TopoGeometry,
    arcs: &[Vec<LonLat>],
    out: &mut Vec<TopoFeature>,
) -> Result<(), TopologyError> {
    match geom {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_features(g, arcs, out)?;
            }
        }
        TopoGeometry::Polygon {
            arcs: rings,
            id,
            properties,
        } => {
            let polygon = stitch_polygon(rings, arcs)?;
            push_feature(vec![polygon], id.as_ref(), properties.as_ref(), out);
        }
        TopoGeometry::MultiPolygon {
            arcs: polygons,
            id,
            properties,
        } => {
            let mut decoded = Vec::with_capacity(polygons.len());
            for rings in polygons {
                decoded.push(stitch_polygon(rings, arcs)?);
            }
            push_feature(decoded, id.as_ref(), properties.as_ref(), out);
        }
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

fn push_feature(
    polygons: Vec<GeoPolygon>,
    id: Option<&Value>,
    properties: Option<&Map<String, Value>>,
    out: &mut Vec<TopoFeature>,
) {
    let polygons: Vec<GeoPolygon> = polygons
        .into_iter()
        .filter(|p| p.first().is_some_and(|outer| outer.len() >= 3))
        .collect();
    if polygons.is_empty() {
        return;
    }

    let id = match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let name = properties
        .and_then(|p| {
            ["name", "NAME", "ADMIN"]
                .iter()
                .find_map(|k| p.get(*k).and_then(|v| v.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    out.push(TopoFeature { id, name, polygons });
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Vec<LonLat>]) -> Result<GeoPolygon, TopologyError> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

/// Concatenates arcs into one ring. A negative index `!i` walks arc `i`
/// backwards; each arc after the first drops its first point, which repeats
/// the previous arc's last point.
fn stitch_ring(indices: &[i64], arcs: &[Vec<LonLat>]) -> Result<Vec<LonLat>, TopologyError> {
    let mut ring: Vec<LonLat> = Vec::new();
    for &index in indices {
        let (arc_i, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(arc_i)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::BadArcIndex {
                arc: index,
                arc_count: arcs.len(),
            })?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip).copied());
        } else {
            ring.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::{Topology, TopologyError};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    const SQUARE_ABSOLUTE: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [10, 0], [10, 10]],
            [[10, 10], [0, 10], [0, 0]]
        ],
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "SQ", "arcs": [[0, 1]], "properties": {"name": "Squareland"}},
                    {"type": "LineString", "arcs": [0]},
                    {"type": "Polygon", "id": 7, "arcs": [[-2, -1]]}
                ]
            }
        }
    }"#;

    #[test]
    fn stitches_rings_without_duplicate_junctions() {
        let topo = Topology::from_json_str(SQUARE_ABSOLUTE).expect("parse");
        let features = topo.features("countries").expect("features");
        assert_eq!(features.len(), 2);

        let sq = &features[0];
        assert_eq!(sq.id, "SQ");
        assert_eq!(sq.name, "Squareland");
        assert_eq!(
            sq.polygons[0][0],
            vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(10.0, 0.0),
                LonLat::new(10.0, 10.0),
                LonLat::new(0.0, 10.0),
                LonLat::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn reversed_arcs_and_numeric_ids() {
        let topo = Topology::from_json_str(SQUARE_ABSOLUTE).expect("parse");
        let features = topo.features("countries").expect("features");
        let rev = &features[1];
        assert_eq!(rev.id, "7");
        // Without a name property the id doubles as the name.
        assert_eq!(rev.name, "7");
        assert_eq!(
            rev.polygons[0][0],
            vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(0.0, 10.0),
                LonLat::new(10.0, 10.0),
                LonLat::new(10.0, 0.0),
                LonLat::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn undoes_delta_quantization() {
        let payload = r#"{
            "type": "Topology",
            "transform": {"scale": [0.5, 2.0], "translate": [-180, -90]},
            "arcs": [[[0, 0], [4, 0], [0, 3], [-4, 0], [0, -3]]],
            "objects": {"land": {"type": "MultiPolygon", "arcs": [[[0]]], "id": "L"}}
        }"#;
        let topo = Topology::from_json_str(payload).expect("parse");
        let features = topo.features("land").expect("features");
        assert_eq!(
            features[0].polygons[0][0],
            vec![
                LonLat::new(-180.0, -90.0),
                LonLat::new(-178.0, -90.0),
                LonLat::new(-178.0, -84.0),
                LonLat::new(-180.0, -84.0),
                LonLat::new(-180.0, -90.0),
            ]
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            Topology::from_json_str(r#"{"type": "FeatureCollection"}"#).unwrap_err(),
            TopologyError::NotATopology
        );
        assert!(matches!(
            Topology::from_json_str("{"),
            Err(TopologyError::Json(_))
        ));

        let topo = Topology::from_json_str(SQUARE_ABSOLUTE).expect("parse");
        assert_eq!(
            topo.features("land").unwrap_err(),
            TopologyError::MissingObject("land".to_string())
        );

        let bad = r#"{"type": "Topology", "arcs": [[[0, 0]]],
            "objects": {"c": {"type": "Polygon", "arcs": [[3]]}}}"#;
        let topo = Topology::from_json_str(bad).expect("parse");
        assert_eq!(
            topo.features("c").unwrap_err(),
            TopologyError::BadArcIndex { arc: 3, arc_count: 1 }
        );
    }
}
