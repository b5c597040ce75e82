//! Configuration management for Emmett
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, chosen by file extension.
//!
//! Configuration is organized into sections:
//! - Conductor material (resistivity, foil thickness, TCR)
//! - Board outline and track dimensions
//! - Resistance target
//! - Optimizer search limits
//! - Heater power budget
//!
//! All lengths are in microns.

use crate::error::{SettingsError, SettingsResult};
use emmett_core::units::{metres, to_microns};
use emmett_core::LengthUnit;
use emmett_router::planner::DEFAULT_HOLE_INSET;
use emmett_router::{
    BoardFeatures, HeaterBudget, LayoutPlanner, Material, OptimizationTarget, OptimizerSettings, RouterConfig,
    SegmentFactory, MINIMUM_SPACING,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Conductor material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    /// Ω·m at 20 °C
    pub resistivity: f64,
    /// Foil thickness, µm
    pub thickness: f64,
    /// Multiplier applied to arc resistance
    pub arc_correction: f64,
    /// Temperature coefficient of resistance, per °C
    pub tcr: f64,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        let copper = Material::default();
        Self {
            resistivity: copper.resistivity,
            thickness: to_microns(copper.thickness, LengthUnit::Metre),
            arc_correction: copper.arc_correction,
            tcr: copper.tcr,
        }
    }
}

impl MaterialSettings {
    /// Router material, with the thickness converted to metres
    pub fn material(&self) -> SettingsResult<Material> {
        let material = Material {
            resistivity: self.resistivity,
            thickness: metres(self.thickness),
            arc_correction: self.arc_correction,
            tcr: self.tcr,
        };
        material.validate()?;
        Ok(material)
    }
}

/// Board outline and track dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Copper-free border inside the outline
    pub margin: f64,
    pub track_width: f64,
    pub track_spacing: f64,
    /// Net the heater tracks belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        let config = RouterConfig::default();
        Self {
            left: config.left,
            top: config.top,
            width: config.board_width(),
            height: config.board_height(),
            margin: config.margin,
            track_width: config.width,
            track_spacing: config.spacing,
            net: None,
        }
    }
}

impl BoardSettings {
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            width: self.track_width,
            spacing: self.track_spacing,
            margin: self.margin,
            left: self.left,
            top: self.top,
            right: self.left + self.width,
            bottom: self.top + self.height,
        }
    }
}

/// Resistance the heater should reach.
///
/// Without an explicit resistance the heater budget supplies one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Ω when hot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    /// °C, the heater budget's maximum when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// µm
    pub min_spacing: f64,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            resistance: None,
            temperature: None,
            min_spacing: MINIMUM_SPACING,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Unit lengths are shown and typed in
    pub display_unit: LengthUnit,
    pub material: MaterialSettings,
    pub router: BoardSettings,
    pub target: TargetSettings,
    pub optimizer: OptimizerSettings,
    pub heater: HeaterBudget,
}

/// File formats a config can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) => Err(SettingsError::UnsupportedFormat(ext.to_string())),
            None => Err(SettingsError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when the file
    /// does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::SaveError(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let m = &self.material;
        positive("material.resistivity", m.resistivity)?;
        positive("material.thickness", m.thickness)?;
        positive("material.arc_correction", m.arc_correction)?;
        positive("material.tcr", m.tcr)?;

        let r = &self.router;
        finite("router.left", r.left)?;
        finite("router.top", r.top)?;
        if !(r.margin.is_finite() && r.margin >= 0.0) {
            return Err(SettingsError::invalid("router.margin", "must be zero or more"));
        }
        if !(r.width.is_finite() && r.width > 2.0 * r.margin) {
            return Err(SettingsError::invalid("router.width", "board must be wider than both margins"));
        }
        if !(r.height.is_finite() && r.height > 2.0 * r.margin) {
            return Err(SettingsError::invalid("router.height", "board must be taller than both margins"));
        }
        positive("router.track_width", r.track_width)?;
        at_least_minimum_spacing("router.track_spacing", r.track_spacing)?;

        let t = &self.target;
        if let Some(resistance) = t.resistance {
            positive("target.resistance", resistance)?;
        }
        if let Some(temperature) = t.temperature {
            finite("target.temperature", temperature)?;
        }
        at_least_minimum_spacing("target.min_spacing", t.min_spacing)?;

        let o = &self.optimizer;
        if o.max_iterations == 0 {
            return Err(SettingsError::invalid("optimizer.max_iterations", "must be > 0"));
        }
        positive("optimizer.min_width", o.min_width)?;
        if !(o.max_width.is_finite() && o.max_width > o.min_width) {
            return Err(SettingsError::invalid("optimizer.max_width", "must exceed min_width"));
        }
        positive("optimizer.resistance_tolerance", o.resistance_tolerance)?;
        positive("optimizer.width_tolerance", o.width_tolerance)?;

        let h = &self.heater;
        positive("heater.area_mm2", h.area_mm2)?;
        positive("heater.voltage", h.voltage)?;
        finite("heater.ambient", h.ambient)?;
        if !(h.max_temperature.is_finite() && h.max_temperature > h.ambient) {
            return Err(SettingsError::invalid("heater.max_temperature", "must be above ambient"));
        }
        if !(h.margin_percent.is_finite() && h.margin_percent > -100.0) {
            return Err(SettingsError::invalid("heater.margin_percent", "must be above -100"));
        }

        Ok(())
    }

    pub fn material(&self) -> SettingsResult<Material> {
        self.material.material()
    }

    pub fn router_config(&self) -> RouterConfig {
        self.router.router_config()
    }

    /// Target from the target section, filled in from the heater budget
    pub fn optimization_target(&self) -> OptimizationTarget {
        let resistance = self
            .target
            .resistance
            .unwrap_or_else(|| self.heater.target_resistance());
        let temperature = self.target.temperature.unwrap_or(self.heater.max_temperature);
        OptimizationTarget::new(resistance, temperature).with_min_spacing(self.target.min_spacing)
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        self.optimizer
    }

    /// Segment factory for the configured material and net
    pub fn segment_factory(&self) -> SettingsResult<SegmentFactory> {
        let factory = SegmentFactory::new(self.material()?)?;
        Ok(match &self.router.net {
            Some(net) => factory.with_net(net.clone()),
            None => factory,
        })
    }

    /// Planner for the configured board with stock footprint placement
    pub fn planner(&self) -> SettingsResult<LayoutPlanner> {
        let config = self.router_config();
        if config.board_width() <= 2.0 * DEFAULT_HOLE_INSET || config.board_height() <= 2.0 * DEFAULT_HOLE_INSET {
            return Err(SettingsError::invalid(
                "router",
                "board is too small for the mounting holes",
            ));
        }
        Ok(LayoutPlanner::new(
            config,
            BoardFeatures::for_board(&config),
            self.segment_factory()?,
        ))
    }

    /// Store the track dimensions of `config` back into the router section
    pub fn set_tracks(&mut self, config: &RouterConfig) {
        self.router.track_width = config.width;
        self.router.track_spacing = config.spacing;
    }
}

/// Platform config file location, `<config dir>/emmett/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".to_string()))?;
    path.push("emmett");
    path.push(CONFIG_FILE_NAME);
    Ok(path)
}

fn finite(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "must be a finite number"))
    }
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "must be > 0"))
    }
}

fn at_least_minimum_spacing(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value >= MINIMUM_SPACING {
        Ok(())
    } else {
        Err(SettingsError::invalid(
            key,
            format!("must be at least {MINIMUM_SPACING} µm"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.router_config(), RouterConfig::default());

        let material = config.material().unwrap();
        let copper = Material::default();
        assert!((material.thickness - copper.thickness).abs() < 1e-15);
        assert_eq!(material.resistivity, copper.resistivity);
        assert_eq!(material.tcr, copper.tcr);
    }

    #[test]
    fn test_material_thickness_is_in_microns() {
        let config = Config::default();
        assert!((config.material.thickness - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.material.tcr = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { key, .. }) if key == "material.tcr"
        ));

        let mut config = Config::default();
        config.router.track_spacing = 150.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.router.width = 800.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target.resistance = Some(-1.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.optimizer.max_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heater.max_temperature = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_falls_back_to_heater_budget() {
        let mut config = Config::default();
        let target = config.optimization_target();
        assert_eq!(target.resistance, config.heater.target_resistance());
        assert_eq!(target.temperature, 200.0);

        config.target.resistance = Some(6.0);
        config.target.temperature = Some(180.0);
        let target = config.optimization_target();
        assert_eq!(target.resistance, 6.0);
        assert_eq!(target.temperature, 180.0);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")).unwrap(), ConfigFormat::Json);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.yaml")),
            Err(SettingsError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_net_reaches_factory() {
        let mut config = Config::default();
        config.router.net = Some("HEATER".to_string());
        assert_eq!(config.segment_factory().unwrap().net(), Some("HEATER"));
    }

    #[test]
    fn test_default_path_ends_in_app_dir() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("emmett/config.toml"));
        }
    }
}
