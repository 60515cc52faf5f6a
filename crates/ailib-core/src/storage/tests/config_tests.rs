use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::config::{ConfigError, ConfigFormat, ManagerConfig};

fn sample_config() -> ManagerConfig {
    let mut config = ManagerConfig::with_data_dirs(["/home/user/.spring", "/usr/share/games/spring"]);
    config.interface_library_name = "CustomInterface".to_string();
    config
}

#[test]
fn test_default_layout() {
    let config = ManagerConfig::default();
    assert!(config.data_dirs.is_empty());
    assert_eq!(config.interfaces_dir, PathBuf::from(constants::AI_INTERFACES_DATA_DIR));
    assert_eq!(config.skirmish_ais_dir, PathBuf::from(constants::SKIRMISH_AI_DATA_DIR));
    assert_eq!(config.interface_info_file, "InterfaceInfo.json");
    assert_eq!(config.skirmish_ai_info_file, "AIInfo.json");
    assert_eq!(config.skirmish_ai_options_file, "AIOptions.json");
    assert_eq!(config.interface_library_name, "AIInterface");
}

#[test]
fn test_add_data_dir_appends_lowest_priority() {
    let mut config = ManagerConfig::with_data_dirs(["/first"]);
    config.add_data_dir("/second").add_data_dir("/third");
    assert_eq!(
        config.data_dirs,
        vec![PathBuf::from("/first"), PathBuf::from("/second"), PathBuf::from("/third")]
    );
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("ailib.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("AILIB.JSON")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("ailib.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("ailib")), None);
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("ailib.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("ailib.toml")), Some(ConfigFormat::Toml));
}

#[test]
fn test_json_round_trip() -> Result<()> {
    let config = sample_config();
    let text = config.serialize(ConfigFormat::Json)?;
    assert!(text.contains("CustomInterface"));
    assert_eq!(ManagerConfig::deserialize(&text, ConfigFormat::Json)?, config);
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_round_trip() -> Result<()> {
    let config = sample_config();
    let text = config.serialize(ConfigFormat::Yaml)?;
    assert_eq!(ManagerConfig::deserialize(&text, ConfigFormat::Yaml)?, config);
    Ok(())
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_round_trip() -> Result<()> {
    let config = sample_config();
    let text = config.serialize(ConfigFormat::Toml)?;
    assert_eq!(ManagerConfig::deserialize(&text, ConfigFormat::Toml)?, config);
    Ok(())
}

#[test]
fn test_partial_config_keeps_defaults() -> Result<()> {
    let config = ManagerConfig::deserialize(r#"{ "data_dirs": ["/games/spring"] }"#, ConfigFormat::Json)?;
    assert_eq!(config.data_dirs, vec![PathBuf::from("/games/spring")]);
    assert_eq!(config.interface_info_file, constants::INTERFACE_INFO_FILE);
    assert_eq!(config.interfaces_dir, PathBuf::from(constants::AI_INTERFACES_DATA_DIR));
    Ok(())
}

#[test]
fn test_invalid_content_is_a_deserialization_error() {
    let err = ManagerConfig::deserialize("{ data_dirs: ", ConfigFormat::Json).unwrap_err();
    match err {
        ConfigError::Deserialization { format, .. } => assert_eq!(format, "json"),
        other => panic!("Expected Deserialization error, got {:?}", other),
    }
}

#[test]
fn test_load_from_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("ailib.json");
    std::fs::write(&path, r#"{ "data_dirs": ["/a", "/b"], "interface_library_name": "X" }"#)
        .expect("Failed to write config");

    let config = ManagerConfig::load(&path)?;
    assert_eq!(config.data_dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert_eq!(config.interface_library_name, "X");
    Ok(())
}

#[test]
fn test_load_errors() {
    let dir = tempdir().expect("Failed to create temp directory");

    let unsupported = dir.path().join("ailib.ini");
    std::fs::write(&unsupported, "data_dirs=/a").expect("Failed to write config");
    assert!(matches!(
        ManagerConfig::load(&unsupported),
        Err(ConfigError::UnsupportedFormat(p)) if p == unsupported
    ));

    let missing = dir.path().join("missing.json");
    assert!(matches!(ManagerConfig::load(&missing), Err(ConfigError::Read { .. })));
}
