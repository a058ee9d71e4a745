use foundation::math::Vec3;
use scene::globe::{Globe, GlobeLayer};

use crate::camera::OrthoCamera;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderCommand {
    pub layer: GlobeLayer,
    pub render_order: u32,
    pub radius: f32,
}

/// Everything the backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Direction towards the sun, world space.
    pub sun_dir: [f32; 3],
    /// Sorted by `render_order`.
    pub commands: Vec<RenderCommand>,
}

pub struct Renderer;

impl Renderer {
    /// One command per visible globe layer, lowest render order first.
    pub fn collect(globe: &Globe, camera: &OrthoCamera, sun_dir: Vec3) -> RenderFrame {
        let mut commands: Vec<RenderCommand> = globe
            .layers_in_order()
            .filter(|(_, state)| state.visible)
            .map(|(layer, _)| RenderCommand {
                layer,
                render_order: layer.render_order(),
                radius: globe.radius(layer) as f32,
            })
            .collect();
        commands.sort_by_key(|c| c.render_order);

        RenderFrame {
            view_proj: camera.view_proj_f32(),
            model: globe.orientation.matrix_f32(),
            sun_dir: sun_dir.normalize().unwrap_or(Vec3::new(1.0, 0.0, 0.0)).to_f32(),
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::camera::OrthoCamera;
    use foundation::math::Vec3;
    use scene::globe::{Globe, GlobeLayer, SphereMesh};

    #[test]
    fn hidden_layers_are_skipped() {
        let globe = Globe::new(SphereMesh::uv_sphere(8, 4));
        let frame = Renderer::collect(
            &globe,
            &OrthoCamera::new(100.0, 100.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let layers: Vec<GlobeLayer> = frame.commands.iter().map(|c| c.layer).collect();
        assert_eq!(
            layers,
            vec![GlobeLayer::Base, GlobeLayer::NightLights, GlobeLayer::Stroke]
        );
    }

    #[test]
    fn rings_draw_after_the_base_with_animated_radius() {
        let mut globe = Globe::new(SphereMesh::uv_sphere(8, 4));
        globe.set_visible(GlobeLayer::Click, true);
        globe.set_visible(GlobeLayer::NightLights, false);
        globe.layer_mut(GlobeLayer::Click).scale = 1.05;

        let frame = Renderer::collect(&globe, &OrthoCamera::new(100.0, 100.0), Vec3::ZERO);
        let orders: Vec<u32> = frame.commands.iter().map(|c| c.render_order).collect();
        assert_eq!(orders, vec![0, 2, 4]);
        let click = frame.commands.last().expect("click command");
        assert!((click.radius - (1.003 * 1.05) as f32).abs() < 1e-6);
        assert_eq!(frame.sun_dir, [1.0, 0.0, 0.0]);
    }
}
