use emmett_core::LengthUnit;
use emmett_settings::{Config, SettingsError};
use tempfile::tempdir;

fn customised() -> Config {
    let mut config = Config::default();
    config.display_unit = LengthUnit::Micron;
    config.material.thickness = 70.0;
    config.router.track_width = 800.0;
    config.router.track_spacing = 300.0;
    config.router.net = Some("HEATER".to_string());
    config.target.resistance = Some(6.0);
    config.optimizer.refine = false;
    config.heater.voltage = 12.0;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("emmett.toml");
    let config = customised();
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("emmett.json");
    let config = customised();
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[router]\ntrack_width = 600.0\n\n[target]\nresistance = 4.5\n").unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.router.track_width, 600.0);
    assert_eq!(config.router.track_spacing, 200.0);
    assert_eq!(config.optimization_target().resistance, 4.5);
    assert_eq!(config.heater, Config::default().heater);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[router]\ntrack_spacing = 50.0\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { key, .. }) if key == "router.track_spacing"
    ));

    std::fs::write(&path, "[router\n").unwrap();
    assert!(matches!(Config::load_from_file(&path), Err(SettingsError::TomlDe(_))));
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("emmett.toml");
    let mut config = Config::default();
    config.optimizer.max_iterations = 0;
    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("emmett.yaml");
    assert!(matches!(
        Config::default().save_to_file(&path),
        Err(SettingsError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(Config::load_from_file(&path), Err(SettingsError::LoadError(_))));
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
}

#[test]
fn test_config_drives_a_layout() {
    let config = customised();
    let planner = config.planner().unwrap();
    assert_eq!(planner.config().width, 800.0);
    assert_eq!(planner.factory().net(), Some("HEATER"));

    let layout = planner.generate_tracks().unwrap();
    assert!(layout.segments.iter().all(|s| s.net() == Some("HEATER")));
}
