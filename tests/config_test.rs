use datagrid::config::{AppConfig, ConfigManager};
use datagrid::schema::OrdinalSpec;
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(config_manager: &ConfigManager, content: &str) {
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(config_manager.config_path("config.toml"), content)
        .expect("Failed to write user config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.display.page_size, 10);
    assert_eq!(config.display.placeholder, "N/A");
    assert!(!config.display.row_numbers);
    assert_eq!(config.display.table_cell_padding, 1);

    assert!(config.session.role.is_none());
    assert_eq!(config.permissions.edit_roles, vec!["Admin", "Super Admin"]);
    assert_eq!(config.permissions.delete_roles, vec!["Admin", "Super Admin"]);

    assert_eq!(config.export.default_name, "export");
    assert!(config.export.directory.is_none());
    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert_eq!(config.theme.colors.keybind_hints, "cyan");
    assert_eq!(config.theme.colors.alternate_row_color, "indexed(234)");

    assert!(!config.debug.enabled);
    assert!(!config.debug.wants_log_file());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    for section in [
        "[display]",
        "[session]",
        "[permissions]",
        "[sorting]",
        "[export]",
        "[performance]",
        "[theme.colors]",
        "[debug]",
    ] {
        assert!(template.contains(section), "missing {}", section);
    }
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config: AppConfig = toml::from_str(&config_manager.generate_default_config())
        .expect("Template should parse");
    let default = AppConfig::default();

    assert_eq!(config.display.page_size, default.display.page_size);
    assert_eq!(config.permissions.edit_roles, default.permissions.edit_roles);
    assert_eq!(config.sorting.ordinals, default.sorting.ordinals);
    assert_eq!(
        config.theme.colors.entries(),
        default.theme.colors.entries()
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    fs::write(&first_path, "version = \"0.1\"\n").expect("Failed to truncate config");

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    let content = fs::read_to_string(&second_path).expect("Failed to read config");
    assert!(content.contains("[theme.colors]"));
}

#[test]
fn test_load_without_user_config_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config = AppConfig::load_from(&config_manager).expect("Should load default config");

    assert_eq!(config.version, "0.1");
    assert_eq!(config.display.page_size, 10);
}

#[test]
fn test_user_config_overrides_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r#"
version = "0.1"

[display]
page_size = 25
row_numbers = true

[session]
role = "Super Admin"

[permissions]
delete_roles = ["Super Admin"]

[theme.colors]
keybind_hints = "blue"
"#,
    );

    let config = AppConfig::load_from(&config_manager).expect("Should load user config");

    assert_eq!(config.display.page_size, 25);
    assert!(config.display.row_numbers);
    assert_eq!(config.session.role.as_deref(), Some("Super Admin"));
    assert_eq!(config.permissions.delete_roles, vec!["Super Admin"]);
    assert_eq!(config.theme.colors.keybind_hints, "blue");

    // Untouched values keep their defaults
    assert_eq!(config.display.placeholder, "N/A");
    assert_eq!(config.permissions.edit_roles, vec!["Admin", "Super Admin"]);
    assert_eq!(config.theme.colors.keybind_labels, "white");
}

#[test]
fn test_unparseable_user_config_is_ignored() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display\npage_size = ");

    let config = AppConfig::load_from(&config_manager).expect("Should fall back to defaults");
    assert_eq!(config.display.page_size, 10);
}

#[test]
fn test_invalid_user_values_fail_validation() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display]\npage_size = 0\n");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.display.placeholder = "-".to_string();
    override_config.export.default_name = "rows".to_string();
    override_config.performance.event_poll_interval_ms = 50;
    override_config.debug.log_level = "trace".to_string();

    base.merge(override_config);

    assert_eq!(base.display.placeholder, "-");
    assert_eq!(base.export.default_name, "rows");
    assert_eq!(base.performance.event_poll_interval_ms, 50);
    assert_eq!(base.debug.log_level, "trace");
    assert_eq!(base.display.page_size, 10);
}

#[test]
fn test_validate_config_valid() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "2.0".to_string(),
        ..Default::default()
    };

    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));
}

#[test]
fn test_validate_config_invalid_color_mode() {
    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_invalid_color() {
    let mut config = AppConfig::default();
    config.theme.colors.action_delete = "not_a_color".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("action_delete"));
}

#[test]
fn test_validate_config_invalid_log_level() {
    let mut config = AppConfig::default();
    config.debug.log_level = "loud".to_string();
    assert!(config.validate().is_err());

    config.debug.log_level = " warn ".to_string();
    assert_eq!(
        config.debug.level_filter().unwrap(),
        log::LevelFilter::Warn
    );
}

#[test]
fn test_sorting_domains() {
    let config = AppConfig::default();
    let domains = config.sorting.domains().expect("Default domains are valid");
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].name(), "priority");
    assert_eq!(domains[0].rank("medium"), Some(1));

    let mut config = AppConfig::default();
    config.sorting.ordinals.push(OrdinalSpec {
        name: "size".to_string(),
        ranks: Vec::new(),
    });
    assert!(config.sorting.domains().is_err());
    assert!(config.validate().is_err());
}

#[test]
fn test_debug_log_file_enables_logging() {
    let mut config = AppConfig::default();
    config.debug.log_file = Some("/tmp/datagrid-test.log".into());
    assert!(config.debug.wants_log_file());
}
