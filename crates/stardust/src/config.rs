#![forbid(unsafe_code)]

//! File-based configuration for particles, palette, and card geometry.
//!
//! ```toml
//! [particles]
//! density = 0.0004
//! max_count = 200
//!
//! [palette]
//! name = "frost"
//!
//! [card]
//! cell_width = 8.0
//! cell_height = 16.0
//! ```
//!
//! ```rust,ignore
//! let config = StardustConfig::load_file("stardust.toml")?;
//! let card = FundCard::new(fund)
//!     .params(config.to_animator_params())
//!     .style(config.to_card_style());
//! ```
//!
//! Every field has a default equal to the library default, so a partial
//! file overrides only what it names.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use stardust_fx::{AnimatorParams, StardustPalette};
use stardust_widgets::CardStyle;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StardustConfig {
    pub particles: ParticlesConfig,
    pub palette: PaletteConfig,
    pub card: CardConfig,
}

/// `[particles]`: mirrors [`AnimatorParams`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ParticlesConfig {
    /// Particles per square logical pixel.
    pub density: f64,
    pub min_count: usize,
    pub max_count: usize,
    /// Logical pixels per second.
    pub speed_min: f64,
    pub speed_max: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    pub overflow_margin: f64,
    pub regen_tolerance: f64,
    pub max_step_ms: u64,
    pub seed: u64,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        let params = AnimatorParams::default();
        Self {
            density: params.density,
            min_count: params.min_count,
            max_count: params.max_count,
            speed_min: params.speed_min,
            speed_max: params.speed_max,
            radius_min: params.radius_min,
            radius_max: params.radius_max,
            overflow_margin: params.overflow_margin,
            regen_tolerance: params.regen_tolerance,
            max_step_ms: u64::try_from(params.max_step.as_millis()).unwrap_or(u64::MAX),
            seed: params.seed,
        }
    }
}

/// `[palette]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PaletteConfig {
    /// One of `nebula`, `ember`, `frost`, `mono` (case-insensitive).
    pub name: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            name: StardustPalette::default().name().to_owned(),
        }
    }
}

/// `[card]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CardConfig {
    /// Logical pixels per terminal column.
    pub cell_width: f64,
    /// Logical pixels per terminal row.
    pub cell_height: f64,
}

impl Default for CardConfig {
    fn default() -> Self {
        let style = CardStyle::default();
        Self {
            cell_width: style.cell_width,
            cell_height: style.cell_height,
        }
    }
}

impl StardustConfig {
    /// Parse TOML without validating.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse JSON without validating.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a TOML string.
    #[cfg(feature = "config")]
    pub fn load_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_toml_str(s)?.validated()
    }

    /// Parse and validate a JSON string.
    #[cfg(feature = "config")]
    pub fn load_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_json_str(s)?.validated()
    }

    /// Parse and validate a file; `.json` files are JSON, anything else TOML.
    #[cfg(feature = "config")]
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Every problem found. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let p = &self.particles;

        if !(p.density.is_finite() && p.density >= 0.0) {
            errors.push(format!("particles.density must be >= 0, got {}", p.density));
        }
        if p.min_count > p.max_count {
            errors.push(format!(
                "particles.min_count ({}) exceeds particles.max_count ({})",
                p.min_count, p.max_count
            ));
        }
        for (name, lo, hi) in [
            ("speed", p.speed_min, p.speed_max),
            ("radius", p.radius_min, p.radius_max),
        ] {
            if !(lo.is_finite() && lo >= 0.0) {
                errors.push(format!("particles.{name}_min must be >= 0, got {lo}"));
            }
            if !hi.is_finite() || hi < lo {
                errors.push(format!(
                    "particles.{name}_max must be >= particles.{name}_min, got {hi}"
                ));
            }
        }
        if !(p.overflow_margin.is_finite() && p.overflow_margin >= 0.0) {
            errors.push(format!(
                "particles.overflow_margin must be >= 0, got {}",
                p.overflow_margin
            ));
        }
        if !(p.regen_tolerance.is_finite() && p.regen_tolerance >= 0.0) {
            errors.push(format!(
                "particles.regen_tolerance must be >= 0, got {}",
                p.regen_tolerance
            ));
        }
        if p.max_step_ms == 0 {
            errors.push("particles.max_step_ms must be > 0".into());
        }

        if StardustPalette::from_name(&self.palette.name).is_none() {
            let known: Vec<&str> = StardustPalette::ALL.iter().map(|p| p.name()).collect();
            errors.push(format!(
                "palette.name {:?} is not one of {}",
                self.palette.name,
                known.join(", ")
            ));
        }

        for (name, value) in [
            ("cell_width", self.card.cell_width),
            ("cell_height", self.card.cell_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("card.{name} must be > 0, got {value}"));
            }
        }

        errors
    }

    /// The configured palette; unknown names fall back to the default.
    #[must_use]
    pub fn palette(&self) -> StardustPalette {
        StardustPalette::from_name(&self.palette.name).unwrap_or_default()
    }

    /// Build [`AnimatorParams`] from `[particles]` and `[palette]`.
    #[must_use]
    pub fn to_animator_params(&self) -> AnimatorParams {
        let p = &self.particles;
        AnimatorParams {
            density: p.density,
            min_count: p.min_count,
            max_count: p.max_count,
            speed_min: p.speed_min,
            speed_max: p.speed_max,
            radius_min: p.radius_min,
            radius_max: p.radius_max,
            overflow_margin: p.overflow_margin,
            regen_tolerance: p.regen_tolerance,
            max_step: Duration::from_millis(p.max_step_ms),
            seed: p.seed,
            palette: self.palette(),
        }
    }

    /// Build a [`CardStyle`] from `[card]`; colors keep their defaults.
    #[must_use]
    pub fn to_card_style(&self) -> CardStyle {
        CardStyle {
            cell_width: self.card.cell_width,
            cell_height: self.card.cell_height,
            ..CardStyle::default()
        }
    }
}

/// Errors from loading a [`StardustConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Parsed, but [`StardustConfig::validate`] found problems.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
