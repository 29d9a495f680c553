// Config loading and validation tests

use chartfill::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/charts.db"
max_pool_size = 4
"#;

const FULL_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/charts.db"
max_pool_size = 4
retention_hours = 48
prune_interval_secs = 600

[charts]
load_interval_secs = 30
ping_interval_secs = 15
default_hours = 1.0
max_hours = 48.0
tolerance_factor = 1.5
format_cache_size = 64
max_grid_points = 5000
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.database.path, "data/charts.db");
    assert_eq!(config.database.max_pool_size, 4);
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("valid");
    assert_eq!(config.database.retention_hours, 720);
    assert_eq!(config.database.prune_interval_secs, 3600);
    assert_eq!(config.charts.load_interval_secs, 60);
    assert_eq!(config.charts.ping_interval_secs, 60);
    assert_eq!(config.charts.default_hours, 4.0);
    assert_eq!(config.charts.tolerance_factor, 1.0);
    assert_eq!(config.charts.max_grid_points, 100_000);
}

#[test]
fn test_config_loads_full() {
    let config = AppConfig::load_from_str(FULL_CONFIG).expect("valid");
    assert_eq!(config.database.retention_hours, 48);
    assert_eq!(config.database.prune_interval_secs, 600);
    assert_eq!(config.charts.load_interval_secs, 30);
    assert_eq!(config.charts.ping_interval_secs, 15);
    assert_eq!(config.charts.max_hours, 48.0);
    assert_eq!(config.charts.format_cache_size, 64);
    assert_eq!(config.charts.max_grid_points, 5000);
    assert_eq!(config.charts.tolerance_secs(60), 90);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/charts.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    let bad = VALID_CONFIG.replace("max_pool_size = 4", "max_pool_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_pool_size"));
}

#[test]
fn test_config_validation_rejects_retention_zero() {
    let bad = FULL_CONFIG.replace("retention_hours = 48", "retention_hours = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retention_hours"));
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = FULL_CONFIG.replace("load_interval_secs = 30", "load_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("load_interval_secs"));

    let bad = FULL_CONFIG.replace("ping_interval_secs = 15", "ping_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("ping_interval_secs"));
}

#[test]
fn test_config_validation_rejects_default_hours_above_max() {
    let bad = FULL_CONFIG.replace("default_hours = 1.0", "default_hours = 100.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("default_hours"));
}

#[test]
fn test_config_validation_rejects_wide_tolerance() {
    let bad = FULL_CONFIG.replace("tolerance_factor = 1.5", "tolerance_factor = 3.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("tolerance_factor"));
}

#[test]
fn test_config_validation_rejects_zero_grid_points() {
    let bad = FULL_CONFIG.replace("max_grid_points = 5000", "max_grid_points = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_grid_points"));
}

#[test]
fn test_config_rejects_missing_section() {
    let bad = VALID_CONFIG.replace("[server]\nport = 8081\nhost = \"0.0.0.0\"\n", "");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_load_from_env_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();
    // SAFETY: test-only; no other test in this binary reads CONFIG_FILE.
    unsafe { std::env::set_var("CONFIG_FILE", &path) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.charts.ping_interval_secs, 15);
}
