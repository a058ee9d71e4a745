use serde::Deserialize;

/// Tunables for the interaction controller.
///
/// Every field has a default, so a config JSON only needs to name the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// How long a clicked country stays zoomed before the view reverts.
    pub revert_delay_s: f64,
    /// Pointer travel (CSS px) below which a press-release counts as a click.
    pub click_slop_px: f64,
    /// Drag rotation per pixel of pointer travel.
    pub rotate_speed_rad_per_px: f64,
    /// Absolute pitch limit, symmetric.
    pub max_pitch_rad: f64,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Exponent applied per wheel delta unit.
    pub wheel_zoom_speed: f64,
    /// Zoom while a country is clicked.
    pub click_zoom: f64,
    /// Rate (1/s) at which the displayed rotation and zoom chase their targets.
    pub rotation_smoothing: f64,
    pub auto_rotate: bool,
    pub auto_rotate_speed_rad_per_s: f64,
    /// Globe scale while dragging.
    pub drag_scale: f64,
    pub scale_tween_s: f64,
    pub ring_tween_s: f64,
    pub zoom_tween_s: f64,
    /// Ring scale at the start of the grow animation and the end of the shrink.
    pub ring_hidden_scale: f64,
    /// Low-pass rate (1/s) for device tilt.
    pub tilt_smoothing: f64,
    /// Device `beta` that maps to zero pitch (phone held at a comfortable angle).
    pub tilt_neutral_beta_deg: f64,
    /// Yaw per degree of device `gamma`.
    pub tilt_yaw_gain: f64,
    pub initial_lon_deg: f64,
    pub initial_lat_deg: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            revert_delay_s: 3.0,
            click_slop_px: 4.0,
            rotate_speed_rad_per_px: 0.005,
            max_pitch_rad: 1.2,
            initial_zoom: 1.0,
            min_zoom: 0.6,
            max_zoom: 4.0,
            wheel_zoom_speed: 0.0015,
            click_zoom: 1.6,
            rotation_smoothing: 8.0,
            auto_rotate: true,
            auto_rotate_speed_rad_per_s: 0.08,
            drag_scale: 0.95,
            scale_tween_s: 0.25,
            ring_tween_s: 0.35,
            zoom_tween_s: 0.6,
            ring_hidden_scale: 0.985,
            tilt_smoothing: 6.0,
            tilt_neutral_beta_deg: 45.0,
            tilt_yaw_gain: 1.0,
            initial_lon_deg: 10.0,
            initial_lat_deg: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControlConfig;

    #[test]
    fn overrides_merge_with_defaults() {
        let cfg: ControlConfig =
            serde_json::from_str(r#"{"revert_delay_s": 5.0, "auto_rotate": false}"#).expect("parse");
        assert_eq!(cfg.revert_delay_s, 5.0);
        assert!(!cfg.auto_rotate);
        assert_eq!(cfg.click_zoom, ControlConfig::default().click_zoom);
    }
}
