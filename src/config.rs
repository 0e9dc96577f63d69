use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Playing field geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field width in world units
    pub width: f32,
    /// Field height in world units
    pub height: f32,
    /// Whether opposite edges are joined (toroidal field)
    pub wrap: bool,
    /// Spatial index cell size; should be around the typical query radius
    pub cell_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 1024.0,
            wrap: true,
            cell_size: 32.0,
        }
    }
}

impl FieldConfig {
    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::Invalid("width must be a positive number".to_string()));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::Invalid("height must be a positive number".to_string()));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::Invalid("cell_size must be a positive number".to_string()));
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Some(width) = env_parse::<f32>("FIELD_WIDTH") {
            self.width = width;
        }
        if let Some(height) = env_parse::<f32>("FIELD_HEIGHT") {
            self.height = height;
        }
        if let Some(wrap) = env_parse::<bool>("FIELD_WRAP") {
            self.wrap = wrap;
        }
        if let Some(cell_size) = env_parse::<f32>("FIELD_CELL_SIZE") {
            if cell_size > 0.0 {
                self.cell_size = cell_size;
            } else {
                tracing::warn!("FIELD_CELL_SIZE must be > 0, using default");
            }
        }
    }
}

/// Simulation tuning used by the bot systems and the demo binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub field: FieldConfig,
    /// Bots spawned at start
    pub initial_bots: usize,
    /// Segments of a freshly spawned bot
    pub initial_length: usize,
    /// Food items the field is topped up to every tick
    pub target_food: usize,
    /// Nutritional value range of spawned food
    pub food_value_min: f32,
    pub food_value_max: f32,
    /// Radius of a single body segment
    pub segment_radius: f32,
    /// Distance a head moves per tick (and spacing between segments)
    pub speed: f32,
    /// How far a bot looks for food when steering
    pub sight_radius: f32,
    /// Food within this distance of a head is eaten
    pub eat_radius: f32,
    /// Max heading change per tick (radians)
    pub max_turn_rate: f32,
    /// Food value dropped for each segment of a dead bot
    pub food_per_segment: f32,
    /// Ticks the demo binary runs
    pub ticks: u64,
    /// Fixed RNG seed, random if unset
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            initial_bots: 32,
            initial_length: 10,
            target_food: 600,
            food_value_min: 0.5,
            food_value_max: 3.0,
            segment_radius: 4.0,
            speed: 4.0,
            sight_radius: 120.0,
            eat_radius: 6.0,
            max_turn_rate: 0.25,
            food_per_segment: 1.0,
            ticks: 500,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load config from `SNAKE_CONFIG` (JSON) if set, then apply environment overrides
    pub fn load_or_default() -> Self {
        let mut config = match std::env::var("SNAKE_CONFIG") {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Could not load SNAKE_CONFIG '{}': {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        config.field.apply_env();

        if let Some(bots) = env_parse::<usize>("INITIAL_BOTS") {
            if bots <= 10_000 {
                config.initial_bots = bots;
            } else {
                tracing::warn!("INITIAL_BOTS must be 0-10000, using default");
            }
        }

        if let Some(food) = env_parse::<usize>("TARGET_FOOD") {
            config.target_food = food;
        }

        if let Some(ticks) = env_parse::<u64>("TICKS") {
            config.ticks = ticks;
        }

        if let Some(seed) = env_parse::<u64>("SEED") {
            config.seed = Some(seed);
        }

        config
    }

    /// Read a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        if self.initial_length == 0 {
            return Err(ConfigError::Invalid("initial_length must be at least 1".to_string()));
        }
        if self.food_value_min > self.food_value_max {
            return Err(ConfigError::Invalid(
                "food_value_min cannot exceed food_value_max".to_string(),
            ));
        }
        for (name, value) in [
            ("segment_radius", self.segment_radius),
            ("speed", self.speed),
            ("sight_radius", self.sight_radius),
            ("eat_radius", self.eat_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be a positive number", name)));
            }
        }
        if self.max_turn_rate < 0.0 {
            return Err(ConfigError::Invalid("max_turn_rate cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// Parse an environment variable, warning about (and ignoring) malformed values
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}
