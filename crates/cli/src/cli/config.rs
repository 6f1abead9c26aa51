use cl_domain::config::{Config, ConfigSeverity};

/// Print config issues; true when none of them is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();

    for issue in &issues {
        println!("{issue}");
    }
    println!(
        "\n{errors} error(s), {} warning(s) in {config_path}",
        issues.len() - errors
    );

    errors == 0
}

/// The resolved config (defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_config_parses_back() {
        let mut config = Config::default();
        config.oracle.timezone = "Europe/Paris".into();
        let text = show(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.oracle.timezone, "Europe/Paris");
        assert_eq!(back.lint.max_runs_per_day, config.lint.max_runs_per_day);
    }

    #[test]
    fn warnings_alone_pass_validation() {
        let mut config = Config::default();
        config.lint.max_runs_per_day = 5000;
        assert!(validate(&config, "cronlint.toml"));

        config.lint.max_runs_per_day = 0;
        assert!(!validate(&config, "cronlint.toml"));
    }
}
