use cl_domain::config::{Config, ConfigSeverity, MAX_OVERLAP_WINDOW_HOURS};

#[test]
fn default_threshold_is_one_thousand_runs() {
    let config = Config::default();
    assert_eq!(config.lint.max_runs_per_day, 1000);
    assert_eq!(config.lint.overlap_window_hours, 24);
    assert_eq!(config.lint.overlap_issue_limit, 5);
}

#[test]
fn default_locale_is_english_in_utc() {
    let config = Config::default();
    assert_eq!(config.locale.default, "en");
    assert_eq!(config.oracle.timezone, "UTC");
    assert!(config.locale.custom.is_empty());
}

#[test]
fn defaults_validate_cleanly() {
    assert!(Config::default().validate().is_empty());
}

#[test]
fn partial_lint_section_keeps_other_defaults() {
    let toml_str = r#"
[lint]
max_runs_per_day = 200
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.lint.max_runs_per_day, 200);
    assert!(config.lint.check_overlaps);
    assert!(config.lint.check_commands);
    assert_eq!(config.lint.overlap_window_hours, 24);
}

#[test]
fn custom_locale_parses() {
    let toml_str = r#"
[locale]
default = "fr"

[locale.custom.fr]
days = { LUN = 1, MAR = 2 }
months = { JANV = 1 }
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.locale.default, "fr");
    let fr = &config.locale.custom["fr"];
    assert_eq!(fr.days["LUN"], 1);
    assert_eq!(fr.months["JANV"], 1);
}

#[test]
fn invalid_timezone_is_an_error() {
    let toml_str = r#"
[oracle]
timezone = "Not/Real"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
    assert_eq!(issues[0].field, "oracle.timezone");
}

#[test]
fn out_of_range_custom_symbol_is_reported() {
    let toml_str = r#"
[locale.custom.xx]
days = { BAD = 9 }
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "locale.custom.xx.days.BAD" && i.severity == ConfigSeverity::Error));
}

#[test]
fn unreachable_threshold_warns() {
    let mut config = Config::default();
    config.lint.max_runs_per_day = 5000;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
}

#[test]
fn oversized_overlap_window_is_an_error() {
    let mut config = Config::default();
    config.lint.overlap_window_hours = 3_000_000_000;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
    assert_eq!(issues[0].field, "lint.overlap_window_hours");

    config.lint.overlap_window_hours = MAX_OVERLAP_WINDOW_HOURS;
    assert!(config.validate().is_empty());
}
