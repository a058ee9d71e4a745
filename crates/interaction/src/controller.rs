//! Hover/click/drag state machine for the globe.
//!
//! The controller owns every piece of interaction state. Input handlers and
//! the per-frame [`InteractionController::tick`] return [`Effect`]s for the
//! host to apply (texture redraws, detail panel selection); the controller
//! itself never touches canvases or the network.

use foundation::math::{LonLat, Vec2, smoothing_alpha};
use foundation::time::Time;
use runtime::frame::FrameClock;
use runtime::timer::Timers;
use runtime::tween::{Easing, Tween, Tweens};
use scene::globe::{Globe, GlobeLayer, GlobeOrientation};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::hit::{HitTest, ViewState};
use crate::rotation::{RotationDriver, RotationMode};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    Hovering(usize),
    Dragging,
    Clicked(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Redraw the hover texture with only this country (or nothing).
    RedrawHover(Option<usize>),
    /// Redraw the click texture with only this country (or nothing).
    RedrawClick(Option<usize>),
    /// Open the detail panel for this country.
    Select(usize),
    ClearSelection,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Anim {
    GlobeScale,
    HoverRing,
    ClickRing,
    Zoom,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Deadline {
    ClickRevert,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Press {
    start: Vec2,
    last: Vec2,
    dragging: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Ring {
    visible: bool,
    scale: f64,
    closing: bool,
}

/// Serializable view of the controller, for the page and for debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSnapshot {
    pub state: InteractionState,
    pub hovered: Option<usize>,
    pub clicked: Option<usize>,
    pub selected: Option<usize>,
    pub zoom: f64,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub mode: RotationMode,
    pub auto_rotating: bool,
}

pub struct InteractionController {
    config: ControlConfig,
    state: InteractionState,
    rotation: RotationDriver,
    clock: FrameClock,
    now: Time,
    zoom: f64,
    target_zoom: f64,
    /// Zoom to return to when the click choreography ends.
    resting_zoom: f64,
    globe_scale: f64,
    hover_ring: Ring,
    click_ring: Ring,
    hover: Option<usize>,
    clicked: Option<usize>,
    selected: Option<usize>,
    pointer: Option<Vec2>,
    press: Option<Press>,
    hover_enabled: bool,
    auto_rotate: bool,
    auto_rotate_paused: bool,
    tweens: Tweens<Anim>,
    timers: Timers<Deadline>,
    running: bool,
}

impl InteractionController {
    pub fn new(config: ControlConfig) -> Self {
        let initial = GlobeOrientation::facing(LonLat::new(
            config.initial_lon_deg,
            config.initial_lat_deg,
        ));
        let zoom = config.initial_zoom.clamp(config.min_zoom, config.max_zoom);
        let hidden = Ring {
            visible: false,
            scale: config.ring_hidden_scale,
            closing: false,
        };
        Self {
            state: InteractionState::Idle,
            rotation: RotationDriver::new(initial),
            clock: FrameClock::new(1.0 / 60.0),
            now: Time::default(),
            zoom,
            target_zoom: zoom,
            resting_zoom: zoom,
            globe_scale: 1.0,
            hover_ring: hidden,
            click_ring: hidden,
            hover: None,
            clicked: None,
            selected: None,
            pointer: None,
            press: None,
            hover_enabled: true,
            auto_rotate: config.auto_rotate,
            auto_rotate_paused: false,
            tweens: Tweens::new(),
            timers: Timers::new(),
            running: true,
            config,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hover
    }

    pub fn clicked(&self) -> Option<usize> {
        self.clicked
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn orientation(&self) -> GlobeOrientation {
        self.rotation.current()
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.rotation.mode()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
            && !self.auto_rotate_paused
            && self.rotation.mode() == RotationMode::Pointer
            && !self.is_dragging()
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            orientation: self.rotation.current(),
            zoom: self.zoom,
            globe_scale: self.globe_scale,
        }
    }

    pub fn pointer_down(&mut self, at: Vec2) {
        self.pointer = Some(at);
        self.press = Some(Press {
            start: at,
            last: at,
            dragging: false,
        });
    }

    /// Records the pointer; while pressed, past the click slop this drags.
    /// Hover is resolved on the next tick.
    pub fn pointer_move(&mut self, at: Vec2) {
        self.pointer = Some(at);
        let Some(mut press) = self.press else {
            return;
        };

        if !press.dragging {
            if at.distance(press.start) < self.config.click_slop_px {
                return;
            }
            press.dragging = true;
            self.begin_drag();
            let d = at - press.start;
            self.rotation.drag_by(d.x, d.y, &self.config);
        } else {
            let d = at - press.last;
            self.rotation.drag_by(d.x, d.y, &self.config);
        }
        press.last = at;
        self.press = Some(press);
        self.refresh_state();
    }

    /// Ends a press: a drag if the pointer travelled past the click slop,
    /// otherwise a click at `at`.
    pub fn pointer_up<H: HitTest>(&mut self, at: Vec2, hits: &H) -> Vec<Effect> {
        match self.press.take() {
            Some(p) if p.dragging => {
                self.end_drag();
                self.refresh_state();
                Vec::new()
            }
            Some(_) => self.click(at, hits),
            None => Vec::new(),
        }
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        if self.press.take().is_some_and(|p| p.dragging) {
            self.end_drag();
        }
        self.set_hover(None);
        self.refresh_state();
    }

    /// Wheel delta in CSS pixels; positive zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        let factor = (-delta_y * self.config.wheel_zoom_speed).exp();
        self.set_target_zoom(self.target_zoom * factor);
    }

    /// Pinch ratio between the current and previous finger distance.
    pub fn pinch(&mut self, ratio: f64) {
        if ratio.is_finite() && ratio > 0.0 {
            self.set_target_zoom(self.target_zoom * ratio);
        }
    }

    pub fn click<H: HitTest>(&mut self, at: Vec2, hits: &H) -> Vec<Effect> {
        let hit = hits.hit(at, &self.view());
        let fx = match hit {
            Some(index) if self.clicked == Some(index) => {
                debug!(index, "click on the clicked country ignored");
                Vec::new()
            }
            Some(index) => self.click_country(index),
            None => {
                self.revert_click();
                self.clear_selection()
            }
        };
        self.refresh_state();
        fx
    }

    /// Closes the detail panel and ends any click choreography.
    pub fn close_detail(&mut self) -> Vec<Effect> {
        self.revert_click();
        let fx = self.clear_selection();
        self.refresh_state();
        fx
    }

    /// Turns the globe so `p` faces the camera. Auto-rotate stays off until
    /// the next revert.
    pub fn rotate_to(&mut self, p: LonLat) {
        self.rotation
            .set_target(GlobeOrientation::facing(p), self.config.max_pitch_rad);
        self.auto_rotate_paused = true;
        debug!(lon = p.lon_deg, lat = p.lat_deg, "rotate to");
    }

    pub fn set_rotation_mode(&mut self, mode: RotationMode) {
        self.rotation.set_mode(mode);
        info!(?mode, "rotation mode");
    }

    pub fn device_orientation(&mut self, beta_deg: f64, gamma_deg: f64) {
        self.rotation.feed_tilt(beta_deg, gamma_deg);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    /// Advances clocks, timers and tweens, and re-runs the hover hit test.
    pub fn tick<H: HitTest>(&mut self, now: Time, hits: &H) -> Vec<Effect> {
        let mut fx = Vec::new();
        if !self.running {
            return fx;
        }
        let frame = self.clock.tick(now);
        self.now = now;

        for deadline in self.timers.expire(now) {
            match deadline {
                Deadline::ClickRevert => {
                    debug!("click revert timer expired");
                    self.revert_click();
                }
            }
        }

        let step = self.tweens.advance(now);
        for (anim, value) in step.values {
            match anim {
                Anim::GlobeScale => self.globe_scale = value,
                Anim::HoverRing => self.hover_ring.scale = value,
                Anim::ClickRing => self.click_ring.scale = value,
                Anim::Zoom => self.zoom = value,
            }
        }
        for anim in step.finished {
            match anim {
                Anim::GlobeScale => {
                    if !self.is_dragging() {
                        self.hover_enabled = true;
                    }
                }
                Anim::HoverRing => {
                    if self.hover_ring.closing {
                        self.hover_ring.visible = false;
                        self.hover_ring.closing = false;
                        if self.hover.is_none() {
                            fx.push(Effect::RedrawHover(None));
                        }
                    }
                }
                Anim::ClickRing => {
                    if self.click_ring.closing {
                        self.click_ring.visible = false;
                        self.click_ring.closing = false;
                        if self.clicked.is_none() {
                            fx.push(Effect::RedrawClick(None));
                        }
                    }
                }
                Anim::Zoom => {}
            }
        }

        if !self.tweens.is_active(Anim::Zoom) {
            let a = smoothing_alpha(self.config.rotation_smoothing, frame.dt_s);
            self.zoom += (self.target_zoom - self.zoom) * a;
        }

        if self.is_auto_rotating() {
            self.rotation.auto_rotate(frame.dt_s, &self.config);
        }
        self.rotation.step(frame.dt_s, &self.config);

        if self.hover_enabled && !self.is_dragging() {
            let view = self.view();
            let hit = self.pointer.and_then(|p| hits.hit(p, &view));
            fx.extend(self.set_hover(hit));
        }

        self.refresh_state();
        fx
    }

    /// Copies the animated state onto the globe meshes.
    pub fn apply_to_globe(&self, globe: &mut Globe) {
        globe.orientation = self.rotation.current();
        globe.scale = self.globe_scale;
        for (layer, ring) in [
            (GlobeLayer::Hover, self.hover_ring),
            (GlobeLayer::Click, self.click_ring),
        ] {
            let state = globe.layer_mut(layer);
            state.visible = ring.visible;
            state.scale = ring.scale;
        }
    }

    /// Stops the controller: pending timers and tweens are dropped and later
    /// ticks do nothing.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.tweens.cancel_all();
        self.timers.cancel_all();
        self.press = None;
        self.pointer = None;
        info!("interaction controller stopped");
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        let o = self.rotation.current();
        InteractionSnapshot {
            state: self.state,
            hovered: self.hover,
            clicked: self.clicked,
            selected: self.selected,
            zoom: self.zoom,
            yaw_deg: o.yaw_rad.to_degrees(),
            pitch_deg: o.pitch_rad.to_degrees(),
            mode: self.rotation.mode(),
            auto_rotating: self.is_auto_rotating(),
        }
    }

    fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    fn refresh_state(&mut self) {
        let next = if self.is_dragging() {
            InteractionState::Dragging
        } else if let Some(i) = self.clicked {
            InteractionState::Clicked(i)
        } else if let Some(i) = self.hover {
            InteractionState::Hovering(i)
        } else {
            InteractionState::Idle
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "interaction state");
            self.state = next;
        }
    }

    fn begin_drag(&mut self) {
        self.hover_enabled = false;
        self.set_hover(None);
        self.auto_rotate_paused = true;
        self.tweens.start(
            Anim::GlobeScale,
            Tween::new(
                self.globe_scale,
                self.config.drag_scale,
                self.now,
                self.config.scale_tween_s,
                Easing::EaseOutCubic,
            ),
        );
    }

    /// Hover comes back once the scale animation started here finishes.
    fn end_drag(&mut self) {
        self.tweens.start(
            Anim::GlobeScale,
            Tween::new(
                self.globe_scale,
                1.0,
                self.now,
                self.config.scale_tween_s,
                Easing::EaseOutCubic,
            ),
        );
        if self.clicked.is_none() {
            self.auto_rotate_paused = false;
        }
    }

    fn click_country(&mut self, index: usize) -> Vec<Effect> {
        let mut fx = Vec::new();
        self.timers.cancel(Deadline::ClickRevert);
        self.tweens.cancel(Anim::ClickRing);
        self.tweens.cancel(Anim::Zoom);

        if self.clicked.is_none() {
            self.resting_zoom = self.target_zoom;
        }
        self.clicked = Some(index);
        fx.push(Effect::RedrawClick(Some(index)));

        self.click_ring = Ring {
            visible: true,
            scale: self.config.ring_hidden_scale,
            closing: false,
        };
        self.tweens.start(
            Anim::ClickRing,
            Tween::new(
                self.config.ring_hidden_scale,
                1.0,
                self.now,
                self.config.ring_tween_s,
                Easing::EaseOutBack,
            ),
        );
        let zoom_to = self
            .config
            .click_zoom
            .clamp(self.config.min_zoom, self.config.max_zoom);
        self.start_zoom_tween(zoom_to);
        self.auto_rotate_paused = true;
        self.timers.schedule(
            Deadline::ClickRevert,
            self.now.after(self.config.revert_delay_s),
        );

        if self.selected != Some(index) {
            self.selected = Some(index);
            fx.push(Effect::Select(index));
        }
        debug!(index, "country clicked");
        fx
    }

    /// Ends the click choreography (ring, zoom, auto-rotate). The selection
    /// is left alone.
    fn revert_click(&mut self) {
        self.timers.cancel(Deadline::ClickRevert);
        if self.clicked.take().is_none() {
            return;
        }
        self.click_ring.closing = true;
        self.tweens.start(
            Anim::ClickRing,
            Tween::new(
                self.click_ring.scale,
                self.config.ring_hidden_scale,
                self.now,
                self.config.ring_tween_s,
                Easing::EaseInOutQuad,
            ),
        );
        self.start_zoom_tween(self.resting_zoom);
        if !self.is_dragging() {
            self.auto_rotate_paused = false;
        }
    }

    fn clear_selection(&mut self) -> Vec<Effect> {
        match self.selected.take() {
            Some(_) => vec![Effect::ClearSelection],
            None => Vec::new(),
        }
    }

    fn start_zoom_tween(&mut self, to: f64) {
        self.target_zoom = to;
        self.tweens.start(
            Anim::Zoom,
            Tween::new(
                self.zoom,
                to,
                self.now,
                self.config.zoom_tween_s,
                Easing::EaseInOutQuad,
            ),
        );
    }

    fn set_target_zoom(&mut self, zoom: f64) {
        self.tweens.cancel(Anim::Zoom);
        self.target_zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if self.clicked.is_none() {
            self.resting_zoom = self.target_zoom;
        }
    }

    /// Clearing hover shrinks the ring first; its redraw is emitted by
    /// `tick` when the shrink finishes.
    fn set_hover(&mut self, index: Option<usize>) -> Option<Effect> {
        if index == self.hover {
            return None;
        }
        self.hover = index;
        debug!(?index, "hover changed");
        match index {
            Some(i) => {
                self.hover_ring = Ring {
                    visible: true,
                    scale: self.config.ring_hidden_scale,
                    closing: false,
                };
                self.tweens.start(
                    Anim::HoverRing,
                    Tween::new(
                        self.config.ring_hidden_scale,
                        1.0,
                        self.now,
                        self.config.ring_tween_s,
                        Easing::EaseOutCubic,
                    ),
                );
                Some(Effect::RedrawHover(Some(i)))
            }
            None => {
                self.hover_ring.closing = true;
                self.tweens.start(
                    Anim::HoverRing,
                    Tween::new(
                        self.hover_ring.scale,
                        self.config.ring_hidden_scale,
                        self.now,
                        self.config.ring_tween_s,
                        Easing::EaseInOutQuad,
                    ),
                );
                None
            }
        }
    }
}
