use detail::ServiceConfig;
use interaction::ControlConfig;
use layers::TextureConfig;
use scene::picking::{DEFAULT_PICKING_HEIGHT, DEFAULT_PICKING_WIDTH};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Json(String),
    ZoomRange { min: f64, max: f64 },
    EmptyTexture { tier: &'static str },
    EmptyPicking,
    MissingTopologyUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "invalid viewer config: {msg}"),
            ConfigError::ZoomRange { min, max } => {
                write!(f, "min_zoom {min} must be positive and not above max_zoom {max}")
            }
            ConfigError::EmptyTexture { tier } => write!(f, "{tier} texture size must be non-zero"),
            ConfigError::EmptyPicking => write!(f, "picking buffer size must be non-zero"),
            ConfigError::MissingTopologyUrl => write!(f, "topology_url is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct PickingSize {
    pub width: u32,
    pub height: u32,
}

impl Default for PickingSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_PICKING_WIDTH,
            height: DEFAULT_PICKING_HEIGHT,
        }
    }
}

/// Everything `mount` accepts. Every field has a default, so `{}` is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub topology_url: String,
    /// Object inside the topology holding the country geometries.
    pub topology_object: String,
    pub night_lights: bool,
    pub lights_image_url: Option<String>,
    /// Fixed sun position `[lon, lat]`; the real one for the current UTC time
    /// when absent.
    pub sun_lon_lat: Option<[f64; 2]>,
    pub sphere_segments: [u32; 2],
    /// `<video>` element that shows the camera stream once granted.
    pub camera_video_id: Option<String>,
    pub log_level: String,
    pub picking: PickingSize,
    pub control: ControlConfig,
    pub textures: TextureConfig,
    pub services: ServiceConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            topology_url: "countries-110m.json".to_string(),
            topology_object: "countries".to_string(),
            night_lights: true,
            lights_image_url: None,
            sun_lon_lat: None,
            sphere_segments: [128, 64],
            camera_video_id: None,
            log_level: "info".to_string(),
            picking: PickingSize::default(),
            control: ControlConfig::default(),
            textures: TextureConfig::default(),
            services: ServiceConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses and validates. An empty string gives the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = if json.trim().is_empty() {
            ViewerConfig::default()
        } else {
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.control;
        if !(c.min_zoom > 0.0 && c.min_zoom <= c.max_zoom) {
            return Err(ConfigError::ZoomRange {
                min: c.min_zoom,
                max: c.max_zoom,
            });
        }
        for (tier, size) in [("low", self.textures.low_res), ("high", self.textures.high_res)] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::EmptyTexture { tier });
            }
        }
        if self.picking.width == 0 || self.picking.height == 0 {
            return Err(ConfigError::EmptyPicking);
        }
        if self.topology_url.trim().is_empty() {
            return Err(ConfigError::MissingTopologyUrl);
        }
        Ok(())
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
