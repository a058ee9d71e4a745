//! The globe: one shared sphere geometry drawn as five stacked layers.

use foundation::math::{LonLat, Vec3, unit_from_lon_lat, uv_from_lon_lat, wrap_angle_rad};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlobeLayer {
    Base,
    NightLights,
    Stroke,
    Hover,
    Click,
}

impl GlobeLayer {
    pub const ALL: [GlobeLayer; 5] = [
        GlobeLayer::Base,
        GlobeLayer::NightLights,
        GlobeLayer::Stroke,
        GlobeLayer::Hover,
        GlobeLayer::Click,
    ];

    /// Lower orders draw first.
    pub fn render_order(self) -> u32 {
        match self {
            GlobeLayer::Base => 0,
            GlobeLayer::NightLights => 1,
            GlobeLayer::Stroke => 2,
            GlobeLayer::Hover => 3,
            GlobeLayer::Click => 4,
        }
    }

    /// Radius before any animated scale is applied.
    pub fn base_radius(self) -> f64 {
        match self {
            GlobeLayer::Base => 1.0,
            GlobeLayer::NightLights => 1.001,
            GlobeLayer::Stroke => 1.002,
            GlobeLayer::Hover | GlobeLayer::Click => 1.003,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GlobeLayer::Base => "base",
            GlobeLayer::NightLights => "night_lights",
            GlobeLayer::Stroke => "stroke",
            GlobeLayer::Hover => "hover",
            GlobeLayer::Click => "click",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereVertex {
    pub position: Vec3,
    pub uv: [f64; 2],
}

/// Latitude/longitude grid on the unit sphere.
///
/// Vertices run row by row from the south pole (`v = 0`) to the north pole
/// (`v = 1`), each row from `lon = -180` to `lon = 180` inclusive so the seam
/// has distinct UVs on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
    pub lon_segments: u32,
    pub lat_segments: u32,
}

impl SphereMesh {
    pub fn uv_sphere(lon_segments: u32, lat_segments: u32) -> Self {
        let lon_segments = lon_segments.max(3);
        let lat_segments = lat_segments.max(2);
        let mut vertices =
            Vec::with_capacity(((lon_segments + 1) * (lat_segments + 1)) as usize);

        for row in 0..=lat_segments {
            let v = row as f64 / lat_segments as f64;
            let lat = v * 180.0 - 90.0;
            for col in 0..=lon_segments {
                let u = col as f64 / lon_segments as f64;
                let lon = u * 360.0 - 180.0;
                let p = LonLat::new(lon, lat);
                vertices.push(SphereVertex {
                    position: unit_from_lon_lat(p),
                    uv: uv_from_lon_lat(p),
                });
            }
        }

        let stride = lon_segments + 1;
        let mut indices = Vec::with_capacity((lon_segments * lat_segments * 6) as usize);
        for row in 0..lat_segments {
            for col in 0..lon_segments {
                let a = row * stride + col;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                // Counter-clockwise seen from outside.
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }

        Self {
            vertices,
            indices,
            lon_segments,
            lat_segments,
        }
    }
}

/// Globe rotation: yaw about +y, then pitch about +x.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlobeOrientation {
    pub yaw_rad: f64,
    pub pitch_rad: f64,
}

impl GlobeOrientation {
    pub const fn new(yaw_rad: f64, pitch_rad: f64) -> Self {
        Self { yaw_rad, pitch_rad }
    }

    /// Orientation that turns `p` to face a camera on the +z axis.
    pub fn facing(p: LonLat) -> Self {
        Self {
            yaw_rad: wrap_angle_rad(-(p.lon_deg + 90.0).to_radians()),
            pitch_rad: p.lat_deg.to_radians(),
        }
    }

    pub fn to_world(self, v: Vec3) -> Vec3 {
        rotate_x(rotate_y(v, self.yaw_rad), self.pitch_rad)
    }

    pub fn to_local(self, v: Vec3) -> Vec3 {
        rotate_y(rotate_x(v, -self.pitch_rad), -self.yaw_rad)
    }

    /// Column-major 3x3 rotation matrix, padded to 4x4 for shader uniforms.
    pub fn matrix_f32(self) -> [[f32; 4]; 4] {
        let x = self.to_world(Vec3::new(1.0, 0.0, 0.0)).to_f32();
        let y = self.to_world(Vec3::new(0.0, 1.0, 0.0)).to_f32();
        let z = self.to_world(Vec3::new(0.0, 0.0, 1.0)).to_f32();
        [
            [x[0], x[1], x[2], 0.0],
            [y[0], y[1], y[2], 0.0],
            [z[0], z[1], z[2], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

/// Point where the sun is overhead for a UTC day of year (1-based) and hour.
/// Declination uses the simple sine model; the equation of time is ignored.
pub fn subsolar_point(day_of_year: u32, utc_hours: f64) -> LonLat {
    let season = (360.0 / 365.0 * (day_of_year as f64 - 81.0)).to_radians();
    let lon = wrap_angle_rad(((12.0 - utc_hours) * 15.0).to_radians()).to_degrees();
    LonLat::new(lon, 23.44 * season.sin())
}

fn rotate_y(v: Vec3, a: f64) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

fn rotate_x(v: Vec3, a: f64) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

/// Per-layer draw state for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerState {
    pub visible: bool,
    /// Animated scale multiplied into the layer's base radius.
    pub scale: f64,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            visible: true,
            scale: 1.0,
        }
    }
}

/// The five co-located meshes that make up the globe, sharing one geometry.
#[derive(Debug, Clone)]
pub struct Globe {
    pub mesh: SphereMesh,
    pub orientation: GlobeOrientation,
    /// Whole-globe scale (shrinks while dragging).
    pub scale: f64,
    layers: [LayerState; 5],
}

impl Globe {
    pub fn new(mesh: SphereMesh) -> Self {
        let mut layers = [LayerState::default(); 5];
        // Rings only show once something is hovered or clicked.
        layers[slot(GlobeLayer::Hover)].visible = false;
        layers[slot(GlobeLayer::Click)].visible = false;
        Self {
            mesh,
            orientation: GlobeOrientation::default(),
            scale: 1.0,
            layers,
        }
    }

    pub fn layer(&self, layer: GlobeLayer) -> LayerState {
        self.layers[slot(layer)]
    }

    pub fn layer_mut(&mut self, layer: GlobeLayer) -> &mut LayerState {
        &mut self.layers[slot(layer)]
    }

    pub fn set_visible(&mut self, layer: GlobeLayer, visible: bool) {
        self.layer_mut(layer).visible = visible;
    }

    /// Effective radius of `layer` this frame.
    pub fn radius(&self, layer: GlobeLayer) -> f64 {
        layer.base_radius() * self.layer(layer).scale * self.scale
    }

    /// Layers in draw order.
    pub fn layers_in_order(&self) -> impl Iterator<Item = (GlobeLayer, LayerState)> + '_ {
        let mut order = GlobeLayer::ALL;
        order.sort_by_key(|l| l.render_order());
        order.into_iter().map(|l| (l, self.layer(l)))
    }
}

fn slot(layer: GlobeLayer) -> usize {
    match layer {
        GlobeLayer::Base => 0,
        GlobeLayer::NightLights => 1,
        GlobeLayer::Stroke => 2,
        GlobeLayer::Hover => 3,
        GlobeLayer::Click => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{Globe, GlobeLayer, GlobeOrientation, SphereMesh, subsolar_point};
    use foundation::math::{LonLat, Vec3, unit_from_lon_lat};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn uv_sphere_layout() {
        let mesh = SphereMesh::uv_sphere(8, 4);
        assert_eq!(mesh.vertices.len(), 9 * 5);
        assert_eq!(mesh.indices.len(), 8 * 4 * 6);
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices.last().map(|v| v.uv), Some([1.0, 1.0]));
        assert!(approx(mesh.vertices[0].position, Vec3::new(0.0, -1.0, 0.0)));
        for v in &mesh.vertices {
            assert!((v.position.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn render_order_and_radii() {
        let globe = Globe::new(SphereMesh::uv_sphere(8, 4));
        let order: Vec<GlobeLayer> = globe.layers_in_order().map(|(l, _)| l).collect();
        assert_eq!(order, GlobeLayer::ALL.to_vec());
        assert!(globe.radius(GlobeLayer::Stroke) > globe.radius(GlobeLayer::NightLights));
        assert!(globe.radius(GlobeLayer::Click) > globe.radius(GlobeLayer::Stroke));
        assert!(!globe.layer(GlobeLayer::Hover).visible);
        assert!(globe.layer(GlobeLayer::Base).visible);
    }

    #[test]
    fn layer_scale_and_globe_scale_multiply() {
        let mut globe = Globe::new(SphereMesh::uv_sphere(8, 4));
        globe.layer_mut(GlobeLayer::Hover).scale = 1.02;
        globe.scale = 0.5;
        assert!((globe.radius(GlobeLayer::Hover) - 1.003 * 1.02 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn facing_brings_point_to_camera() {
        for p in [
            LonLat::new(0.0, 0.0),
            LonLat::new(139.7, 35.7),
            LonLat::new(-74.0, 40.7),
            LonLat::new(151.2, -33.9),
        ] {
            let o = GlobeOrientation::facing(p);
            let world = o.to_world(unit_from_lon_lat(p));
            assert!(approx(world, Vec3::new(0.0, 0.0, 1.0)), "{p:?} -> {world:?}");
        }
    }

    #[test]
    fn to_local_inverts_to_world() {
        let o = GlobeOrientation::new(0.7, -0.3);
        let v = Vec3::new(0.3, -0.4, 0.8);
        assert!(approx(o.to_local(o.to_world(v)), v));
    }

    #[test]
    fn subsolar_point_follows_the_clock_and_season() {
        let equinox_noon = subsolar_point(81, 12.0);
        assert!(equinox_noon.lon_deg.abs() < 1e-9);
        assert!(equinox_noon.lat_deg.abs() < 1e-9);
        assert!((subsolar_point(81, 18.0).lon_deg + 90.0).abs() < 1e-9);
        assert!((subsolar_point(172, 12.0).lat_deg - 23.44).abs() < 0.01);
        assert!(subsolar_point(355, 12.0).lat_deg < -23.4);
    }
}
