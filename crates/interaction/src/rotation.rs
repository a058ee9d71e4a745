//! Rotation sources feeding the globe orientation.
//!
//! Pointer drag (plus auto-rotate) and device tilt both write the same
//! target orientation; [`RotationMode`] decides which one is listened to.
//! The displayed orientation chases the target with exponential smoothing.

use foundation::math::{smoothing_alpha, wrap_angle_rad};
use scene::globe::GlobeOrientation;
use serde::Serialize;

use crate::config::ControlConfig;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    #[default]
    Pointer,
    DeviceOrientation,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Tilt {
    beta_deg: f64,
    gamma_deg: f64,
}

#[derive(Debug, Clone)]
pub struct RotationDriver {
    mode: RotationMode,
    current: GlobeOrientation,
    target: GlobeOrientation,
    /// Latest raw reading.
    raw_tilt: Option<Tilt>,
    /// Low-passed reading.
    tilt: Option<Tilt>,
    /// Yaw when device mode was entered; tilt steers relative to it.
    tilt_base_yaw: f64,
}

impl RotationDriver {
    pub fn new(initial: GlobeOrientation) -> Self {
        Self {
            mode: RotationMode::Pointer,
            current: initial,
            target: initial,
            raw_tilt: None,
            tilt: None,
            tilt_base_yaw: initial.yaw_rad,
        }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn current(&self) -> GlobeOrientation {
        self.current
    }

    pub fn target(&self) -> GlobeOrientation {
        self.target
    }

    pub fn set_mode(&mut self, mode: RotationMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.raw_tilt = None;
        self.tilt = None;
        self.tilt_base_yaw = self.target.yaw_rad;
    }

    pub fn set_target(&mut self, target: GlobeOrientation, max_pitch_rad: f64) {
        self.target = GlobeOrientation::new(
            wrap_angle_rad(target.yaw_rad),
            target.pitch_rad.clamp(-max_pitch_rad, max_pitch_rad),
        );
        if self.mode == RotationMode::DeviceOrientation {
            self.tilt_base_yaw = self.target.yaw_rad;
        }
    }

    /// Pointer drag by `(dx, dy)` CSS pixels. Ignored in device mode.
    pub fn drag_by(&mut self, dx: f64, dy: f64, cfg: &ControlConfig) {
        if self.mode != RotationMode::Pointer {
            return;
        }
        let t = GlobeOrientation::new(
            self.target.yaw_rad + dx * cfg.rotate_speed_rad_per_px,
            self.target.pitch_rad + dy * cfg.rotate_speed_rad_per_px,
        );
        self.set_target(t, cfg.max_pitch_rad);
    }

    pub fn auto_rotate(&mut self, dt_s: f64, cfg: &ControlConfig) {
        if self.mode != RotationMode::Pointer {
            return;
        }
        let t = GlobeOrientation::new(
            self.target.yaw_rad + cfg.auto_rotate_speed_rad_per_s * dt_s,
            self.target.pitch_rad,
        );
        self.set_target(t, cfg.max_pitch_rad);
    }

    /// Records a device-orientation reading (degrees). Ignored in pointer mode.
    pub fn feed_tilt(&mut self, beta_deg: f64, gamma_deg: f64) {
        if self.mode != RotationMode::DeviceOrientation {
            return;
        }
        if !beta_deg.is_finite() || !gamma_deg.is_finite() {
            return;
        }
        self.raw_tilt = Some(Tilt {
            beta_deg,
            gamma_deg,
        });
    }

    /// Advances smoothing by `dt_s`.
    pub fn step(&mut self, dt_s: f64, cfg: &ControlConfig) {
        if self.mode == RotationMode::DeviceOrientation
            && let Some(raw) = self.raw_tilt
        {
            let a = smoothing_alpha(cfg.tilt_smoothing, dt_s);
            let smoothed = match self.tilt {
                Some(prev) => Tilt {
                    beta_deg: prev.beta_deg + (raw.beta_deg - prev.beta_deg) * a,
                    gamma_deg: prev.gamma_deg + (raw.gamma_deg - prev.gamma_deg) * a,
                },
                None => raw,
            };
            self.tilt = Some(smoothed);
            self.target = GlobeOrientation::new(
                wrap_angle_rad(
                    self.tilt_base_yaw + (smoothed.gamma_deg * cfg.tilt_yaw_gain).to_radians(),
                ),
                (smoothed.beta_deg - cfg.tilt_neutral_beta_deg)
                    .to_radians()
                    .clamp(-cfg.max_pitch_rad, cfg.max_pitch_rad),
            );
        }

        let a = smoothing_alpha(cfg.rotation_smoothing, dt_s);
        let dyaw = wrap_angle_rad(self.target.yaw_rad - self.current.yaw_rad);
        self.current = GlobeOrientation::new(
            wrap_angle_rad(self.current.yaw_rad + dyaw * a),
            self.current.pitch_rad + (self.target.pitch_rad - self.current.pitch_rad) * a,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{RotationDriver, RotationMode};
    use crate::config::ControlConfig;
    use scene::globe::GlobeOrientation;

    fn settle(driver: &mut RotationDriver, cfg: &ControlConfig) {
        for _ in 0..600 {
            driver.step(1.0 / 60.0, cfg);
        }
    }

    #[test]
    fn drag_moves_target_and_clamps_pitch() {
        let cfg = ControlConfig::default();
        let mut d = RotationDriver::new(GlobeOrientation::default());
        d.drag_by(100.0, 10_000.0, &cfg);
        assert!((d.target().yaw_rad - 0.5).abs() < 1e-12);
        assert_eq!(d.target().pitch_rad, cfg.max_pitch_rad);
        // Displayed orientation lags until stepped.
        assert_eq!(d.current(), GlobeOrientation::default());
        settle(&mut d, &cfg);
        assert!((d.current().yaw_rad - 0.5).abs() < 1e-6);
    }

    #[test]
    fn yaw_takes_the_short_way_round() {
        let cfg = ControlConfig::default();
        let mut d = RotationDriver::new(GlobeOrientation::new(3.0, 0.0));
        d.set_target(GlobeOrientation::new(-3.0, 0.0), cfg.max_pitch_rad);
        d.step(1.0 / 60.0, &cfg);
        // Moving from 3.0 towards -3.0 through PI, not through 0.
        assert!(d.current().yaw_rad > 3.0 || d.current().yaw_rad < -3.0);
    }

    #[test]
    fn device_mode_ignores_drag_and_follows_tilt() {
        let cfg = ControlConfig::default();
        let mut d = RotationDriver::new(GlobeOrientation::default());
        d.set_mode(RotationMode::DeviceOrientation);

        d.drag_by(100.0, 0.0, &cfg);
        d.auto_rotate(1.0, &cfg);
        assert_eq!(d.target(), GlobeOrientation::default());

        d.feed_tilt(cfg.tilt_neutral_beta_deg + 10.0, 20.0);
        settle(&mut d, &cfg);
        assert!((d.target().pitch_rad - 10f64.to_radians()).abs() < 1e-9);
        assert!((d.target().yaw_rad - 20f64.to_radians()).abs() < 1e-9);
        assert!((d.current().pitch_rad - 10f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn tilt_is_low_passed() {
        let cfg = ControlConfig::default();
        let mut d = RotationDriver::new(GlobeOrientation::default());
        d.set_mode(RotationMode::DeviceOrientation);
        d.feed_tilt(cfg.tilt_neutral_beta_deg, 0.0);
        d.step(1.0 / 60.0, &cfg);
        d.feed_tilt(cfg.tilt_neutral_beta_deg + 30.0, 0.0);
        d.step(1.0 / 60.0, &cfg);
        let pitch = d.target().pitch_rad;
        assert!(pitch > 0.0 && pitch < 30f64.to_radians());
    }

    #[test]
    fn pointer_mode_ignores_tilt() {
        let cfg = ControlConfig::default();
        let mut d = RotationDriver::new(GlobeOrientation::default());
        d.feed_tilt(90.0, 45.0);
        d.step(1.0 / 60.0, &cfg);
        assert_eq!(d.target(), GlobeOrientation::default());
    }
}
