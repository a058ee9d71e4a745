use foundation::math::{Vec2, Vec3};
use scene::picking::Ray;

/// Orthographic camera on the +z axis looking down -z at the globe.
///
/// Zoom divides the visible extent: at `zoom = 2` the globe looks twice as
/// large.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrthoCamera {
    /// Half the visible height in world units at `zoom = 1`.
    pub frustum_half_height: f64,
    pub zoom: f64,
    pub position_z: f64,
    pub near: f64,
    pub far: f64,
    /// Viewport size in CSS pixels.
    pub viewport: Vec2,
}

impl OrthoCamera {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            frustum_half_height: 1.25,
            zoom: 1.0,
            position_z: 10.0,
            near: 0.1,
            far: 100.0,
            viewport: Vec2::new(viewport_width, viewport_height),
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.viewport.y <= 0.0 {
            return 1.0;
        }
        self.viewport.x / self.viewport.y
    }

    pub fn half_height(&self) -> f64 {
        self.frustum_half_height / self.zoom.max(f64::EPSILON)
    }

    pub fn half_width(&self) -> f64 {
        self.half_height() * self.aspect()
    }

    /// Screen position (CSS pixels, origin top-left) to normalized device
    /// coordinates. `None` for an empty viewport.
    pub fn screen_to_ndc(&self, screen: Vec2) -> Option<Vec2> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.y * 2.0,
        ))
    }

    /// World-space ray from the near plane through a screen position.
    pub fn ray_through(&self, screen: Vec2) -> Option<Ray> {
        let ndc = self.screen_to_ndc(screen)?;
        let origin = Vec3::new(
            ndc.x * self.half_width(),
            ndc.y * self.half_height(),
            self.position_z - self.near,
        );
        Some(Ray::new(origin, Vec3::new(0.0, 0.0, -1.0)))
    }

    /// Column-major view-projection matrix with depth mapped to `[0, 1]`.
    pub fn view_proj_f32(&self) -> [[f32; 4]; 4] {
        let hw = self.half_width() as f32;
        let hh = self.half_height() as f32;
        let depth = (self.far - self.near) as f32;
        let z_offset = (self.position_z - self.near) as f32 / depth;
        [
            [1.0 / hw, 0.0, 0.0, 0.0],
            [0.0, 1.0 / hh, 0.0, 0.0],
            [0.0, 0.0, -1.0 / depth, 0.0],
            [0.0, 0.0, z_offset, 1.0],
        ]
    }
}
