use datagrid::config::{rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, Theme};
use ratatui::style::Color;

// Helper to ensure NO_COLOR is not set for color parsing tests
fn ensure_colors_enabled() {
    std::env::remove_var("NO_COLOR");
}

#[test]
fn test_parse_named_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("red").unwrap(), Color::Red);
    assert_eq!(parser.parse("  Cyan ").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("bright blue").unwrap(), Color::Indexed(12));
    assert_eq!(parser.parse("dark_grey").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("light_gray").unwrap(), Color::Indexed(7));
}

#[test]
fn test_parse_indexed_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("indexed(0)").unwrap(), Color::Indexed(0));
    assert_eq!(parser.parse("INDEXED( 236 )").unwrap(), Color::Indexed(236));
    assert!(parser.parse("indexed(256)").is_err());
    assert!(parser.parse("indexed(x)").is_err());
}

#[test]
fn test_parse_rejects_unknown_and_malformed() {
    let parser = ColorParser::new();
    assert!(parser.parse("mauve").is_err());
    assert!(parser.parse("#12345").is_err());
    assert!(parser.parse("#gg0000").is_err());
}

#[test]
fn test_rgb_conversions() {
    // Near-gray values use the grayscale ramp
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    assert_eq!(rgb_to_256_color(128, 128, 128), 232 + (120 * 24 / 240) as u8);
    // Saturated values use the color cube
    assert_eq!(rgb_to_256_color(255, 0, 0), 196);
    assert_eq!(rgb_to_256_color(0, 0, 255), 21);

    assert_eq!(rgb_to_basic_ansi(200, 10, 10), Color::Red);
    assert_eq!(rgb_to_basic_ansi(10, 200, 200), Color::Cyan);
    assert_eq!(rgb_to_basic_ansi(20, 20, 20), Color::Black);
    assert_eq!(rgb_to_basic_ansi(220, 220, 220), Color::White);
}

#[test]
fn test_theme_from_default_config() {
    ensure_colors_enabled();
    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).expect("Default theme should parse");

    assert_eq!(theme.get("action_delete"), Color::Red);
    assert_eq!(theme.get("action_edit"), Color::Blue);
    assert_eq!(theme.get("controls_bg"), Color::Indexed(236));
    assert_eq!(theme.get("alternate_row_color"), Color::Indexed(234));
    // Modifier-only entries carry no color
    assert_eq!(theme.get("table_selected"), Color::Reset);
}

#[test]
fn test_theme_with_custom_colors() {
    ensure_colors_enabled();
    let mut config = AppConfig::default();
    config.theme.colors.sort_indicator = "magenta".to_string();
    config.theme.colors.filter_active = "indexed(46)".to_string();

    let theme = Theme::from_config(&config.theme).unwrap();
    assert_eq!(theme.get("sort_indicator"), Color::Magenta);
    assert_eq!(theme.get("filter_active"), Color::Indexed(46));
}

#[test]
fn test_theme_lookup_of_unknown_name() {
    let theme = Theme::default();
    assert_eq!(theme.get("no_such_color"), Color::Reset);
    assert!(theme.get_optional("no_such_color").is_none());
    assert!(theme.get_optional("primary").is_some());
}

#[test]
fn test_theme_rejects_bad_color() {
    let mut config = AppConfig::default();
    config.theme.colors.modal_border = "ultraviolet".to_string();
    assert!(Theme::from_config(&config.theme).is_err());
}
