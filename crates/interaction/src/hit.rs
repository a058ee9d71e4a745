use foundation::math::Vec2;
use gpu::camera::OrthoCamera;
use scene::globe::{GlobeLayer, GlobeOrientation};
use scene::picking::{PickingBuffer, Ray, intersect_sphere, uv_at_point};

/// What the hit test needs to know about the current view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub orientation: GlobeOrientation,
    pub zoom: f64,
    pub globe_scale: f64,
}

/// Resolves a screen position to a country index.
pub trait HitTest {
    fn hit(&self, screen: Vec2, view: &ViewState) -> Option<usize>;
}

/// Casts a camera ray against the stroke mesh and resolves the hit UV
/// through the picking buffer.
#[derive(Debug, Clone)]
pub struct GlobeHitTest {
    picking: PickingBuffer,
    camera: OrthoCamera,
}

impl GlobeHitTest {
    pub fn new(picking: PickingBuffer, camera: OrthoCamera) -> Self {
        Self { picking, camera }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.viewport = Vec2::new(width, height);
    }

    pub fn picking(&self) -> &PickingBuffer {
        &self.picking
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }
}

impl HitTest for GlobeHitTest {
    fn hit(&self, screen: Vec2, view: &ViewState) -> Option<usize> {
        let mut camera = self.camera;
        camera.zoom = view.zoom;
        let world = camera.ray_through(screen)?;
        let local = Ray::new(
            view.orientation.to_local(world.origin),
            view.orientation.to_local(world.dir),
        );
        let radius = GlobeLayer::Stroke.base_radius() * view.globe_scale;
        let point = intersect_sphere(local, radius)?;
        self.picking.lookup_uv(uv_at_point(point)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeHitTest, HitTest, ViewState};
    use foundation::math::{LonLat, Vec2};
    use formats::country_paths_from_topojson;
    use gpu::camera::OrthoCamera;
    use scene::globe::GlobeOrientation;
    use scene::picking::PickingBuffer;

    const ISLAND: &str = r#"{
        "type": "Topology",
        "arcs": [[[30, -10], [50, -10], [50, 10], [30, 10], [30, -10]]],
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "IS", "arcs": [[0]], "properties": {"name": "Island"}}
        ]}}
    }"#;

    // Same longitudes, one box on each side of the equator.
    const NORTH_SOUTH: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[30, 40], [50, 40], [50, 60], [30, 60], [30, 40]],
            [[30, -60], [50, -60], [50, -40], [30, -40], [30, -60]]
        ],
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "NO", "arcs": [[0]], "properties": {"name": "Northland"}},
            {"type": "Polygon", "id": "SO", "arcs": [[1]], "properties": {"name": "Southland"}}
        ]}}
    }"#;

    fn hit_test() -> GlobeHitTest {
        hit_test_for(ISLAND)
    }

    fn hit_test_for(topology: &str) -> GlobeHitTest {
        let paths = country_paths_from_topojson(topology, "countries").expect("decode");
        let picking = PickingBuffer::build(&paths, 720, 360).expect("build");
        GlobeHitTest::new(picking, OrthoCamera::new(400.0, 400.0))
    }

    #[test]
    fn center_ray_hits_country_turned_to_face_camera() {
        let hits = hit_test();
        let view = ViewState {
            orientation: GlobeOrientation::facing(LonLat::new(40.0, 0.0)),
            zoom: 1.0,
            globe_scale: 1.0,
        };
        assert_eq!(hits.hit(Vec2::new(200.0, 200.0), &view), Some(0));
        // Off the globe entirely.
        assert_eq!(hits.hit(Vec2::new(1.0, 1.0), &view), None);
    }

    #[test]
    fn country_on_far_side_is_not_hit() {
        let hits = hit_test();
        let view = ViewState {
            orientation: GlobeOrientation::facing(LonLat::new(-140.0, 0.0)),
            zoom: 1.0,
            globe_scale: 1.0,
        };
        assert_eq!(hits.hit(Vec2::new(200.0, 200.0), &view), None);
    }

    fn facing(lon_deg: f64, lat_deg: f64) -> ViewState {
        ViewState {
            orientation: GlobeOrientation::facing(LonLat::new(lon_deg, lat_deg)),
            zoom: 1.0,
            globe_scale: 1.0,
        }
    }

    #[test]
    fn north_is_up_on_screen() {
        let hits = hit_test_for(NORTH_SOUTH);
        let view = facing(40.0, 0.0);
        // y = 80 px maps to about 48.6 degrees north, y = 320 px to 48.6 south.
        assert_eq!(hits.hit(Vec2::new(200.0, 80.0), &view), Some(0));
        assert_eq!(hits.hit(Vec2::new(200.0, 320.0), &view), Some(1));
        assert_eq!(hits.hit(Vec2::new(200.0, 200.0), &view), None);
    }

    #[test]
    fn tilting_to_a_latitude_centers_it() {
        let hits = hit_test_for(NORTH_SOUTH);
        assert_eq!(hits.hit(Vec2::new(200.0, 200.0), &facing(40.0, 50.0)), Some(0));
        assert_eq!(hits.hit(Vec2::new(200.0, 200.0), &facing(40.0, -50.0)), Some(1));
    }
}
