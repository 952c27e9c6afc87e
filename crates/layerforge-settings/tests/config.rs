use layerforge_core::MaterialProfile;
use layerforge_settings::{Config, SettingsError, StartPolicy};
use tempfile::tempdir;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.materials.len(), 1);
    assert_eq!(config.toolpath.start_policy, StartPolicy::Incremented);
}

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.toolpath.overrun = 1.25;
    config.toolpath.start_policy = StartPolicy::Random;
    config.toolpath.random_seed = Some(42);
    config
        .materials
        .push(MaterialProfile::new("petg", 0.5, 1.0));

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.tolerances.machine_resolution = 0.05;
    config.tolerances.point_resolution = 0.005;

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[toolpath]\nhatch_angle = 45.0\n").unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.toolpath.hatch_angle, 45.0);
    assert_eq!(loaded.toolpath.travel_feed, 4800.0);
    assert_eq!(loaded.tolerances, Config::default().tolerances);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let err = Config::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_validation_failures() {
    let mut config = Config::default();
    config.toolpath.travel_feed = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.materials.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.materials.push(MaterialProfile::default());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.tolerances.swell = 0.5;
    assert!(matches!(
        config.validate(),
        Err(SettingsError::Validation(_))
    ));
}

#[test]
fn test_hatch_angle_alternation() {
    let config = Config::default();
    assert_eq!(config.toolpath.hatch_angle_for_layer(0), 0.0);
    assert_eq!(config.toolpath.hatch_angle_for_layer(1), 90.0);
    assert_eq!(config.toolpath.hatch_angle_for_layer(2), 0.0);
}

#[test]
fn test_material_registry_from_config() {
    let mut config = Config::default();
    config
        .materials
        .push(MaterialProfile::new("petg", 0.5, 1.0));
    let registry = config.material_registry();

    assert_eq!(registry.len(), 2);
    let petg = registry.find_by_name("petg").unwrap();
    assert_eq!(registry.get(petg).unwrap().infill_width, 1.0);
}
