//! Emmett Settings Crate
//!
//! Handles configuration files, their validation and conversion into
//! router types, and the linked track-dimension fields.

pub mod config;
pub mod error;
pub mod track_fields;

pub use config::{
    default_config_path, BoardSettings, Config, ConfigFormat, MaterialSettings, TargetSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use track_fields::{TrackField, TrackFields};
