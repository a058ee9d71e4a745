use std::cell::{Cell, RefCell};
use std::rc::Rc;

use detail::{
    Coordinates, DetailPanel, DetailRequest, RemoteServices, SelectedCountry, fetch_detail,
};
use formats::{CountryPath, country_paths_from_topojson};
use foundation::math::{LonLat, Vec2, unit_from_lon_lat};
use foundation::time::Time;
use gpu::{OrthoCamera, Renderer};
use interaction::{Effect, GlobeHitTest, HitTest, InteractionController, RotationMode, ViewState};
use layers::{Canvas2d, HighTierSchedule, TextureCompositor, TextureLayer};
use scene::globe::{Globe, GlobeLayer, SphereMesh, subsolar_point};
use scene::picking::PickingBuffer;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, DeviceOrientationEvent, Event, EventTarget, HtmlCanvasElement,
    IntersectionObserver, IntersectionObserverEntry, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, PointerEvent, WheelEvent,
};

mod backend;
mod canvas;
mod config;
mod http;
mod logging;
mod regions;

use backend::{GpuContext, canvas_by_id, globe_layer_for, init_gpu_from_canvas, render_frame};
use canvas::WebCanvas;
pub use config::{ConfigError, ViewerConfig};
use http::GlooHttp;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Hit testing is only possible once the topology has loaded.
enum Hits {
    Loading,
    Ready(GlobeHitTest),
}

impl HitTest for Hits {
    fn hit(&self, screen: Vec2, view: &ViewState) -> Option<usize> {
        match self {
            Hits::Loading => None,
            Hits::Ready(h) => h.hit(screen, view),
        }
    }
}

/// An event listener that unregisters itself when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// The `requestAnimationFrame` chain. Dropping it cancels the pending frame.
struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
    fn start() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("window missing"))?;
        let handle = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

        let next_handle = Rc::clone(&handle);
        let next_callback = Rc::clone(&callback);
        let raf_window = window.clone();
        *callback.borrow_mut() = Some(Closure::new(move |ts_ms: f64| {
            let running = with_app(|app| app.frame(Time::from_millis(ts_ms))).unwrap_or(false);
            if !running {
                next_handle.set(None);
                return;
            }
            if let Ok(cb) = next_callback.try_borrow()
                && let Some(cb) = cb.as_ref()
            {
                next_handle.set(
                    raf_window
                        .request_animation_frame(cb.as_ref().unchecked_ref())
                        .ok(),
                );
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            handle.set(Some(
                window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            ));
        }
        Ok(Self { handle, callback })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let (Some(window), Some(id)) = (web_sys::window(), self.handle.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the closure's reference to itself.
        if let Ok(mut cb) = self.callback.try_borrow_mut() {
            cb.take();
        }
    }
}

/// Fires the high-resolution texture pass when the canvas first scrolls into view.
struct VisibilityWatch {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl VisibilityWatch {
    fn new(target: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(|entries: js_sys::Array| {
            let visible = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|e| e.is_intersecting());
            with_app(|app| app.on_visibility(visible));
        });
        let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(target);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
enum CameraStatus {
    Off,
    Pending,
    Granted,
    Denied(String),
    Unsupported,
}

/// A granted camera stream; its tracks stop when dropped.
struct CameraStream(MediaStream);

impl Drop for CameraStream {
    fn drop(&mut self) {
        for track in self.0.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

struct PressedPointer {
    id: i32,
    at: Vec2,
}

struct App {
    config: ViewerConfig,
    canvas: HtmlCanvasElement,
    countries: Vec<CountryPath>,
    hits: Hits,
    camera: OrthoCamera,
    controller: InteractionController,
    compositor: TextureCompositor<WebCanvas>,
    globe: Globe,
    gpu: Option<GpuContext>,
    /// Night-lights pixels waiting for the GPU.
    pending_lights: Option<(u32, u32, Vec<u8>)>,
    panel: Rc<RefCell<DetailPanel>>,
    services: Rc<RemoteServices<GlooHttp>>,
    tiers: HighTierSchedule,
    pressed: Vec<PressedPointer>,
    pinch_distance: Option<f64>,
    camera_status: CameraStatus,
    camera_stream: Option<CameraStream>,
    listeners: Vec<Listener>,
    frame_loop: Option<FrameLoop>,
    visibility: Option<VisibilityWatch>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static MOUNT_GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Runs `f` against the mounted app. `None` when unmounted, re-entered, or
/// during thread teardown.
fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.try_with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
    .ok()
    .flatten()
}

fn current_generation() -> u64 {
    MOUNT_GENERATION.with(Cell::get)
}

/// Like [`with_app`], but only if the app mounted as `generation` is still
/// the one mounted. Async tasks use this so they never touch a later mount.
fn with_mount<R>(generation: u64, f: impl FnOnce(&mut App) -> R) -> Option<R> {
    if current_generation() != generation {
        return None;
    }
    with_app(f)
}

fn event_pos(e: &PointerEvent) -> Vec2 {
    Vec2::new(e.offset_x() as f64, e.offset_y() as f64)
}

impl App {
    fn new(config: ViewerConfig, canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let canvases = [
            WebCanvas::new(1, 1)?,
            WebCanvas::new(1, 1)?,
            WebCanvas::new(1, 1)?,
            WebCanvas::new(1, 1)?,
        ];
        let mut compositor = TextureCompositor::new(canvases, config.textures.clone());
        compositor.draw_base(&[]);

        let [lon_segments, lat_segments] = config.sphere_segments;
        let mut globe = Globe::new(SphereMesh::uv_sphere(lon_segments, lat_segments));
        globe.set_visible(GlobeLayer::NightLights, config.night_lights);

        let services = RemoteServices::new(GlooHttp, config.services.clone());
        let mut app = Self {
            canvas,
            countries: Vec::new(),
            hits: Hits::Loading,
            camera: OrthoCamera::new(1.0, 1.0),
            controller: InteractionController::new(config.control.clone()),
            compositor,
            globe,
            gpu: None,
            pending_lights: None,
            panel: Rc::new(RefCell::new(DetailPanel::new())),
            services: Rc::new(services),
            tiers: HighTierSchedule::new(),
            pressed: Vec::new(),
            pinch_distance: None,
            camera_status: CameraStatus::Off,
            camera_stream: None,
            listeners: Vec::new(),
            frame_loop: None,
            visibility: None,
            config,
        };
        app.resize();
        Ok(app)
    }

    /// Matches the drawing buffer to the element's CSS size.
    fn resize(&mut self) {
        let css_w = self.canvas.client_width().max(1) as f64;
        let css_h = self.canvas.client_height().max(1) as f64;
        let ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()).max(1.0);
        let (px_w, px_h) = ((css_w * ratio).round() as u32, (css_h * ratio).round() as u32);
        self.canvas.set_width(px_w);
        self.canvas.set_height(px_h);
        self.camera.viewport = Vec2::new(css_w, css_h);
        if let Hits::Ready(h) = &mut self.hits {
            h.set_viewport(css_w, css_h);
        }
        if let Some(gpu) = &mut self.gpu {
            backend::resize_gpu(gpu, px_w, px_h);
        }
    }

    fn on_topology(&mut self, countries: Vec<CountryPath>) -> Result<(), JsValue> {
        let picking = PickingBuffer::build(
            &countries,
            self.config.picking.width,
            self.config.picking.height,
        )
        .map_err(js_err)?;
        self.hits = Hits::Ready(GlobeHitTest::new(picking, self.camera));
        // Low tier first; the high tier follows a frame later if the globe
        // has already been seen.
        self.compositor.draw_base(&countries);
        self.tiers.geometry_ready();
        tracing::info!(countries = countries.len(), "topology ready");
        self.countries = countries;
        Ok(())
    }

    fn on_visibility(&mut self, visible: bool) {
        if self.tiers.observe(visible) {
            if let Some(watch) = &self.visibility {
                watch.observer.disconnect();
            }
        }
    }

    fn on_gpu(&mut self, gpu: GpuContext) {
        self.gpu = Some(gpu);
        // Everything drawn so far still needs uploading.
        for layer in TextureLayer::ALL {
            self.upload(layer);
        }
        if let Some((w, h, data)) = self.pending_lights.take() {
            self.set_lights(w, h, data);
        }
        self.resize();
    }

    fn set_lights(&mut self, width: u32, height: u32, data: Vec<u8>) {
        match &mut self.gpu {
            Some(gpu) => {
                backend::upload_layer_texture(gpu, GlobeLayer::NightLights, width, height, &data)
            }
            None => self.pending_lights = Some((width, height, data)),
        }
    }

    fn upload(&mut self, layer: TextureLayer) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let canvas = self.compositor.canvas(layer);
        let (w, h) = canvas.size();
        match canvas.pixels() {
            Ok(data) => backend::upload_layer_texture(gpu, globe_layer_for(layer), w, h, &data),
            Err(err) => tracing::warn!(?layer, error = ?err, "reading canvas pixels failed"),
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RedrawHover(index) => self.compositor.draw_hover(&self.countries, index),
                Effect::RedrawClick(index) => self.compositor.draw_click(&self.countries, index),
                Effect::Select(index) => self.select(index),
                Effect::ClearSelection => self.panel.borrow_mut().clear(),
            }
        }
    }

    fn select(&mut self, index: usize) {
        let Some(country) = self.countries.get(index) else {
            return;
        };
        let ticket = self.panel.borrow_mut().select(SelectedCountry {
            index,
            name: country.name.clone(),
            id: country.id.clone(),
        });
        let request = DetailRequest {
            name: country.name.clone(),
            code: country.id.clone(),
            centroid: Some(Coordinates::from(country.centroid)),
        };
        let services = Rc::clone(&self.services);
        let panel = Rc::clone(&self.panel);
        spawn_local(async move {
            fetch_detail(&services, &panel, ticket, &request).await;
        });
    }

    fn sun_direction(&self) -> foundation::math::Vec3 {
        let sun = match self.config.sun_lon_lat {
            Some([lon, lat]) => LonLat::new(lon, lat),
            None => {
                let date = js_sys::Date::new_0();
                let start = js_sys::Date::utc(date.get_utc_full_year() as f64, 0.0);
                let day = ((date.get_time() - start) / 86_400_000.0).floor() as u32 + 1;
                let hours = date.get_utc_hours() as f64
                    + date.get_utc_minutes() as f64 / 60.0
                    + date.get_utc_seconds() as f64 / 3600.0;
                subsolar_point(day, hours)
            }
        };
        self.globe.orientation.to_world(unit_from_lon_lat(sun))
    }

    /// One animation frame. Returns whether the loop should continue.
    fn frame(&mut self, now: Time) -> bool {
        if !self.controller.is_running() {
            return false;
        }
        let effects = self.controller.tick(now, &self.hits);
        self.apply(effects);
        self.controller.apply_to_globe(&mut self.globe);

        for layer in self.compositor.take_dirty() {
            self.upload(layer);
        }
        if self.tiers.take_due() {
            self.compositor.upgrade_to_high(&self.countries);
        }

        if let Some(gpu) = &self.gpu {
            let mut camera = self.camera;
            camera.zoom = self.controller.zoom();
            let frame = Renderer::collect(&self.globe, &camera, self.sun_direction());
            if let Err(err) = render_frame(gpu, &frame) {
                tracing::warn!(error = ?err, "frame skipped");
            }
        }
        true
    }

    fn pointer_down(&mut self, e: &PointerEvent) {
        let at = event_pos(e);
        let _ = self.canvas.set_pointer_capture(e.pointer_id());
        self.pressed.retain(|p| p.id != e.pointer_id());
        self.pressed.push(PressedPointer {
            id: e.pointer_id(),
            at,
        });
        match self.pressed.as_slice() {
            [_] => self.controller.pointer_down(at),
            [a, b] => {
                // Second finger: this is a pinch, not a drag.
                self.controller.pointer_leave();
                self.pinch_distance = Some(a.at.distance(b.at));
            }
            _ => {}
        }
    }

    fn pointer_move(&mut self, e: &PointerEvent) {
        let at = event_pos(e);
        if let Some(p) = self.pressed.iter_mut().find(|p| p.id == e.pointer_id()) {
            p.at = at;
        }
        if let [a, b] = self.pressed.as_slice() {
            let distance = a.at.distance(b.at);
            if let Some(prev) = self.pinch_distance
                && prev > 0.0
            {
                self.controller.pinch(distance / prev);
            }
            self.pinch_distance = Some(distance);
            return;
        }
        self.controller.pointer_move(at);
    }

    fn pointer_up(&mut self, e: &PointerEvent) {
        let was_pinching = self.pressed.len() >= 2;
        self.pressed.retain(|p| p.id != e.pointer_id());
        if was_pinching || self.pinch_distance.is_some() {
            if self.pressed.is_empty() {
                self.pinch_distance = None;
            }
            return;
        }
        let effects = self.controller.pointer_up(event_pos(e), &self.hits);
        self.apply(effects);
    }

    fn pointer_leave(&mut self, e: &PointerEvent) {
        self.pressed.retain(|p| p.id != e.pointer_id());
        if self.pressed.is_empty() {
            self.pinch_distance = None;
        }
        self.controller.pointer_leave();
    }

    fn attach_listeners(&mut self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("window missing"))?;
        let canvas: &EventTarget = self.canvas.as_ref();

        fn on_pointer(f: fn(&mut App, &PointerEvent)) -> impl FnMut(Event) + 'static {
            move |e: Event| {
                if let Some(e) = e.dyn_ref::<PointerEvent>() {
                    with_app(|app| f(app, e));
                }
            }
        }

        let pointer_events: [(&'static str, fn(&mut App, &PointerEvent)); 5] = [
            ("pointerdown", App::pointer_down),
            ("pointermove", App::pointer_move),
            ("pointerup", App::pointer_up),
            ("pointercancel", App::pointer_leave),
            ("pointerleave", App::pointer_leave),
        ];
        for (kind, handler) in pointer_events {
            self.listeners.push(Listener::new(canvas, kind, true, on_pointer(handler))?);
        }
        self.listeners.push(Listener::new(canvas, "wheel", false, |e: Event| {
            if let Some(e) = e.dyn_ref::<WheelEvent>() {
                e.prevent_default();
                // Line-mode deltas (Firefox) are roughly 16 px per line.
                let scale = if e.delta_mode() == WheelEvent::DOM_DELTA_LINE { 16.0 } else { 1.0 };
                with_app(|app| app.controller.wheel(e.delta_y() * scale));
            }
        })?);
        self.listeners.push(Listener::new(window.as_ref(), "resize", true, |_| {
            with_app(App::resize);
        })?);
        Ok(())
    }

    fn enable_device_orientation(&mut self) -> Result<(), JsValue> {
        if self.controller.rotation_mode() == RotationMode::DeviceOrientation {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| js_err("window missing"))?;
        self.listeners.push(Listener::new(window.as_ref(), "deviceorientation", true, |e: Event| {
            if let Some(e) = e.dyn_ref::<DeviceOrientationEvent>()
                && let (Some(beta), Some(gamma)) = (e.beta(), e.gamma())
            {
                with_app(|app| app.controller.device_orientation(beta, gamma));
            }
        })?);
        self.controller.set_auto_rotate(false);
        self.controller.set_rotation_mode(RotationMode::DeviceOrientation);
        Ok(())
    }

    fn attach_camera(&mut self, stream: MediaStream) {
        if let Some(id) = &self.config.camera_video_id
            && let Some(video) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id))
                .and_then(|el| el.dyn_into::<web_sys::HtmlVideoElement>().ok())
        {
            video.set_src_object(Some(&stream));
            let _ = video.play();
        }
        self.camera_stream = Some(CameraStream(stream));
        self.camera_status = CameraStatus::Granted;
    }

    fn shutdown(&mut self) {
        self.frame_loop = None;
        self.visibility = None;
        self.listeners.clear();
        self.camera_stream = None;
        self.controller.shutdown();
        self.panel.borrow_mut().clear();
        self.gpu = None;
        tracing::info!("viewer unmounted");
    }
}

/// Mounts the globe on the canvas with id `canvas_id`. `config_json` may be
/// empty. Any previous mount is torn down first.
#[wasm_bindgen]
pub fn mount(canvas_id: &str, config_json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(config_json).map_err(js_err)?;
    logging::init(config.log_level());
    unmount();

    let canvas = canvas_by_id(canvas_id)?;
    let generation = MOUNT_GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    let topology_url = config.topology_url.clone();
    let topology_object = config.topology_object.clone();
    let lights_url = config
        .lights_image_url
        .clone()
        .filter(|_| config.night_lights);

    let mut app = App::new(config, canvas.clone())?;
    app.attach_listeners()?;
    app.visibility = Some(VisibilityWatch::new(&canvas)?);
    let mesh = app.globe.mesh.clone();
    APP.with(|slot| *slot.borrow_mut() = Some(app));

    // The frame loop looks the app up on each frame, so it starts after the
    // app is in place.
    let frame_loop = FrameLoop::start()?;
    with_app(|app| app.frame_loop = Some(frame_loop));

    let gpu_canvas = canvas.clone();
    spawn_local(async move {
        match init_gpu_from_canvas(&gpu_canvas, &mesh).await {
            Ok(gpu) => {
                with_mount(generation, |app| app.on_gpu(gpu));
            }
            Err(err) => tracing::error!(error = ?err, "GPU init failed"),
        }
    });

    spawn_local(async move {
        let loaded = match http::fetch_text(&topology_url).await {
            Ok(text) => country_paths_from_topojson(&text, &topology_object).map_err(js_err),
            Err(err) => Err(js_err(err)),
        };
        match loaded {
            Ok(countries) => {
                if let Some(Err(err)) = with_mount(generation, |app| app.on_topology(countries)) {
                    tracing::error!(error = ?err, "topology setup failed");
                }
            }
            Err(err) => tracing::error!(url = %topology_url, error = ?err, "topology load failed"),
        }
    });

    if let Some(url) = lights_url {
        spawn_local(async move {
            match load_image_pixels(&url).await {
                Ok((w, h, data)) => {
                    with_mount(generation, |app| app.set_lights(w, h, data));
                }
                Err(err) => tracing::warn!(%url, error = ?err, "night lights unavailable"),
            }
        });
    }

    tracing::info!(canvas_id, "viewer mounted");
    Ok(())
}

async fn load_image_pixels(url: &str) -> Result<(u32, u32, Vec<u8>), JsValue> {
    let img = web_sys::HtmlImageElement::new()?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(url);
    JsFuture::from(img.decode()).await?;
    let (w, h) = (img.natural_width(), img.natural_height());
    let canvas = WebCanvas::new(w, h)?;
    canvas
        .context()
        .draw_image_with_html_image_element(&img, 0.0, 0.0)?;
    Ok((w, h, canvas.pixels()?))
}

/// Stops the frame loop, removes every listener and releases GPU and camera
/// resources. In-flight fetches finish but their results go nowhere.
#[wasm_bindgen]
pub fn unmount() {
    MOUNT_GENERATION.with(|g| g.set(g.get() + 1));
    let app = APP.try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut s| s.take()));
    if let Ok(Some(mut app)) = app {
        app.shutdown();
    }
}

/// Turns a named region, or failing that a country, to face the camera.
/// Returns whether the name was recognised.
#[wasm_bindgen]
pub fn rotate_to_region(name: &str) -> bool {
    with_app(|app| match regions::resolve_region(name, &app.countries) {
        Some(at) => {
            app.controller.rotate_to(at);
            true
        }
        None => {
            tracing::warn!(name, "unknown region");
            false
        }
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn rotate_to(lon_deg: f64, lat_deg: f64) {
    with_app(|app| app.controller.rotate_to(LonLat::new(lon_deg, lat_deg)));
}

#[wasm_bindgen]
pub fn close_detail() {
    with_app(|app| {
        let effects = app.controller.close_detail();
        app.apply(effects);
    });
}

/// Detail panel state as JSON; `null` when nothing is mounted.
#[wasm_bindgen]
pub fn get_detail_state() -> Result<String, JsValue> {
    with_app(|app| serde_json::to_string(&app.panel.borrow().snapshot()))
        .transpose()
        .map(|s| s.unwrap_or_else(|| "null".to_string()))
        .map_err(js_err)
}

#[wasm_bindgen]
pub fn get_interaction_state() -> Result<String, JsValue> {
    with_app(|app| serde_json::to_string(&app.controller.snapshot()))
        .transpose()
        .map(|s| s.unwrap_or_else(|| "null".to_string()))
        .map_err(js_err)
}

/// Asks for motion access where the platform gates it, then switches the
/// globe to tilt control. Resolves to whether tilt control is on.
#[wasm_bindgen]
pub async fn request_device_orientation() -> Result<bool, JsValue> {
    let global = js_sys::global();
    let ctor = js_sys::Reflect::get(&global, &JsValue::from_str("DeviceOrientationEvent"))?;
    if ctor.is_undefined() {
        return Ok(false);
    }
    let request = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))?;
    let granted = match request.dyn_ref::<js_sys::Function>() {
        Some(request) => {
            let promise: js_sys::Promise = request.call0(&ctor)?.dyn_into()?;
            JsFuture::from(promise).await?.as_string().as_deref() == Some("granted")
        }
        // No permission gate on this platform.
        None => true,
    };
    if !granted {
        tracing::info!("device orientation permission denied");
        return Ok(false);
    }
    with_app(App::enable_device_orientation).transpose()?;
    Ok(with_app(|app| app.controller.rotation_mode() == RotationMode::DeviceOrientation)
        .unwrap_or(false))
}

/// Requests the camera. Resolves to the new status as JSON; failure is
/// reported in the status, not as a rejection.
#[wasm_bindgen]
pub async fn request_camera() -> Result<String, JsValue> {
    let generation = current_generation();
    let devices = web_sys::window()
        .map(|w| w.navigator())
        .and_then(|n| n.media_devices().ok());
    let status = match devices {
        None => CameraStatus::Unsupported,
        Some(devices) => {
            with_app(|app| app.camera_status = CameraStatus::Pending);
            let constraints = MediaStreamConstraints::new();
            constraints.set_video(&JsValue::TRUE);
            let result = match devices.get_user_media_with_constraints(&constraints) {
                Ok(promise) => JsFuture::from(promise).await,
                Err(err) => Err(err),
            };
            match result.and_then(|s| s.dyn_into::<MediaStream>()) {
                Ok(stream) => {
                    if with_mount(generation, |app| app.attach_camera(stream.clone())).is_none() {
                        // Unmounted while waiting.
                        drop(CameraStream(stream));
                    }
                    CameraStatus::Granted
                }
                Err(err) => {
                    let message = js_sys::Error::from(err)
                        .message()
                        .as_string()
                        .unwrap_or_else(|| "camera unavailable".to_string());
                    tracing::warn!(%message, "camera denied");
                    CameraStatus::Denied(message)
                }
            }
        }
    };
    with_mount(generation, |app| app.camera_status = status.clone());
    serde_json::to_string(&status).map_err(js_err)
}

#[wasm_bindgen]
pub fn get_camera_status() -> Result<String, JsValue> {
    let status = with_app(|app| app.camera_status.clone()).unwrap_or(CameraStatus::Off);
    serde_json::to_string(&status).map_err(js_err)
}

#[cfg(test)]
mod tests {
    use super::{CameraStatus, Hits};
    use foundation::math::Vec2;
    use interaction::{HitTest, ViewState};
    use pretty_assertions::assert_eq;
    use scene::globe::GlobeOrientation;

    #[test]
    fn nothing_is_hit_before_topology_loads() {
        let view = ViewState {
            orientation: GlobeOrientation::default(),
            zoom: 1.0,
            globe_scale: 1.0,
        };
        assert_eq!(Hits::Loading.hit(Vec2::new(10.0, 10.0), &view), None);
    }

    #[test]
    fn camera_status_serializes_with_message() {
        let denied = serde_json::to_value(CameraStatus::Denied("NotAllowedError".into()))
            .expect("serialize");
        assert_eq!(denied["status"], "denied");
        assert_eq!(denied["message"], "NotAllowedError");
        let off = serde_json::to_value(CameraStatus::Off).expect("serialize");
        assert_eq!(off["status"], "off");
    }
}
