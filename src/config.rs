use crate::schema::OrdinalSpec;
use crate::sort::OrdinalDomain;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::LevelFilter;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use supports_color::Stream;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub session: SessionConfig,
    pub permissions: PermissionsConfig,
    pub sorting: SortingConfig,
    pub export: ExportConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub page_size: usize,
    /// Text shown for missing values
    pub placeholder: String,
    pub row_numbers: bool,
    pub table_cell_padding: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Role of the current user, used to gate edit and delete
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub edit_roles: Vec<String>,
    pub delete_roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingConfig {
    /// Ranked label sets compared by rank instead of alphabetically
    pub ordinals: Vec<OrdinalSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where exported CSV files go (default: current directory)
    pub directory: Option<PathBuf>,
    /// File stem used when the table has no title
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Log file (default: datagrid.log in the cache directory)
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

/// Declares the theme colors once: struct, defaults, merge, and the
/// name/value listing used by validation and [`Theme`].
macro_rules! color_config {
    ($($name:ident = $default:expr),* $(,)?) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ColorConfig {
            $(pub $name: String,)*
        }

        impl Default for ColorConfig {
            fn default() -> Self {
                Self {
                    $($name: $default.to_string(),)*
                }
            }
        }

        impl ColorConfig {
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![$((stringify!($name), self.$name.as_str()),)*]
            }

            pub fn merge(&mut self, other: Self) {
                let default = ColorConfig::default();
                $(
                    if other.$name != default.$name {
                        self.$name = other.$name;
                    }
                )*
            }
        }
    };
}

color_config! {
    primary = "cyan",
    secondary = "yellow",
    success = "green",
    error = "red",
    warning = "yellow",
    dimmed = "dark_gray",
    controls_bg = "indexed(236)",
    keybind_hints = "cyan",
    keybind_labels = "white",
    text_primary = "white",
    text_inverse = "black",
    table_header = "white",
    table_border = "cyan",
    table_selected = "reversed",
    row_numbers = "dark_gray",
    alternate_row_color = "indexed(234)",
    sort_indicator = "yellow",
    filter_active = "green",
    action_edit = "blue",
    action_delete = "red",
    modal_border = "cyan",
    modal_border_active = "yellow",
    modal_border_error = "red",
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            session: SessionConfig::default(),
            permissions: PermissionsConfig::default(),
            sorting: SortingConfig::default(),
            export: ExportConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: crate::table::DEFAULT_PAGE_SIZE,
            placeholder: crate::table::DEFAULT_PLACEHOLDER.to_string(),
            row_numbers: false,
            table_cell_padding: 1,
        }
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        let roles: Vec<String> = crate::actions::DEFAULT_ACTION_ROLES
            .iter()
            .map(|r| r.to_string())
            .collect();
        Self {
            edit_roles: roles.clone(),
            delete_roles: roles,
        }
    }
}

impl Default for SortingConfig {
    fn default() -> Self {
        let priority = OrdinalDomain::priority();
        Self {
            ordinals: vec![OrdinalSpec {
                name: priority.name().to_string(),
                ranks: priority.ranks().to_vec(),
            }],
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            default_name: crate::export::DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_file: None,
            log_level: "debug".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load using an explicit config directory.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();

        match Self::load_user_config(manager) {
            Ok(user_config) => config.merge(user_config),
            Err(e) => log::warn!("ignoring user config: {}", e),
        }

        config.validate()?;

        Ok(config)
    }

    fn load_user_config(manager: &ConfigManager) -> Result<AppConfig> {
        let config_path = manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.session.merge(other.session);
        self.permissions.merge(other.permissions);
        self.sorting.merge(other.sorting);
        self.export.merge(other.export);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.page_size == 0 {
            return Err(eyre!("page_size must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        self.sorting.domains()?;
        self.debug.level_filter()?;

        Ok(())
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.page_size != default.page_size {
            self.page_size = other.page_size;
        }
        if other.placeholder != default.placeholder {
            self.placeholder = other.placeholder;
        }
        if other.row_numbers != default.row_numbers {
            self.row_numbers = other.row_numbers;
        }
        if other.table_cell_padding != default.table_cell_padding {
            self.table_cell_padding = other.table_cell_padding;
        }
    }
}

impl SessionConfig {
    pub fn merge(&mut self, other: Self) {
        if other.role.is_some() {
            self.role = other.role;
        }
    }
}

impl PermissionsConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PermissionsConfig::default();
        if other.edit_roles != default.edit_roles {
            self.edit_roles = other.edit_roles;
        }
        if other.delete_roles != default.delete_roles {
            self.delete_roles = other.delete_roles;
        }
    }
}

impl SortingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.ordinals != SortingConfig::default().ordinals {
            self.ordinals = other.ordinals;
        }
    }

    pub fn domains(&self) -> Result<Vec<OrdinalDomain>> {
        self.ordinals
            .iter()
            .map(|spec| {
                OrdinalDomain::new(spec.name.clone(), spec.ranks.clone())
                    .map_err(|e| eyre!("Invalid [sorting] ordinal: {}", e))
            })
            .collect()
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        if other.directory.is_some() {
            self.directory = other.directory;
        }
        if other.default_name != ExportConfig::default().default_name {
            self.default_name = other.default_name;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
        if other.log_level != default.log_level {
            self.log_level = other.log_level;
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim()).map_err(|_| {
            eyre!(
                "Invalid log_level: {}. Must be one of off, error, warn, info, debug, trace",
                self.log_level
            )
        })
    }

    /// File logging is on when debug is enabled or a log file is named.
    pub fn wants_log_file(&self) -> bool {
        self.enabled || self.log_file.is_some()
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, `indexed(n)`, or named) for this terminal
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();
        let color = parse_color_name(trimmed)?;
        if self.no_color {
            return Ok(Color::Reset);
        }
        Ok(match color {
            Color::Rgb(r, g, b) => self.convert_rgb_to_terminal_color(r, g, b),
            other => other,
        })
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability-independent parse. Hex colors come back as `Color::Rgb`.
fn parse_color_name(trimmed: &str) -> Result<Color> {
    if trimmed.starts_with('#') && trimmed.len() == 7 {
        let (r, g, b) = parse_hex(trimmed)?;
        return Ok(Color::Rgb(r, g, b));
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with("indexed(") && lower.ends_with(')') {
        let num_str = &lower[8..lower.len() - 1];
        let num = num_str.trim().parse::<u8>().map_err(|_| {
            eyre!(
                "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                trimmed
            )
        })?;
        return Ok(Color::Indexed(num));
    }

    match lower.as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "white" => Ok(Color::White),

        "bright_black" | "bright black" => Ok(Color::Indexed(8)),
        "bright_red" | "bright red" => Ok(Color::Indexed(9)),
        "bright_green" | "bright green" => Ok(Color::Indexed(10)),
        "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
        "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
        "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
        "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
        "bright_white" | "bright white" => Ok(Color::Indexed(15)),

        "gray" | "grey" => Ok(Color::Indexed(8)),
        "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
        "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

        // Modifiers; the renderer applies them
        "reset" | "reversed" => Ok(Color::Reset),

        _ => Err(eyre!(
            "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
             bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
            trimmed
        )),
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 || !s.is_ascii() {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_name_capability_independent() {
        assert_eq!(parse_color_name("#ff0000").unwrap(), Color::Rgb(255, 0, 0));
        assert_eq!(parse_color_name("Indexed(236)").unwrap(), Color::Indexed(236));
        assert_eq!(parse_color_name("bright_red").unwrap(), Color::Indexed(9));
        assert!(parse_color_name("indexed(300)").is_err());
        assert!(parse_color_name("chartreuse-ish").is_err());
    }

    #[test]
    fn test_rgb_conversions() {
        assert_eq!(rgb_to_256_color(0, 0, 0), 16);
        assert_eq!(rgb_to_256_color(255, 0, 0), 196);
        assert_eq!(rgb_to_basic_ansi(250, 10, 10), Color::Red);
        assert_eq!(rgb_to_basic_ansi(20, 20, 20), Color::Black);
    }

    #[test]
    fn test_color_entries_cover_all_fields() {
        let colors = ColorConfig::default();
        let names: Vec<&str> = colors.entries().iter().map(|(n, _)| *n).collect();
        assert!(names.contains(&"primary"));
        assert!(names.contains(&"action_delete"));
        assert!(names.contains(&"sort_indicator"));
    }

    #[test]
    fn test_level_filter() {
        let mut debug = DebugConfig::default();
        assert_eq!(debug.level_filter().unwrap(), LevelFilter::Debug);
        debug.log_level = "loud".to_string();
        assert!(debug.level_filter().is_err());
    }
}
