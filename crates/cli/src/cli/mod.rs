pub mod config;
pub mod lint;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use cl_domain::config::Config;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CRONLINT_CONFIG";
/// Config file picked up from the working directory when nothing else is set.
pub const DEFAULT_CONFIG_PATH: &str = "cronlint.toml";

/// Static analysis for cron schedules and crontab files.
#[derive(Debug, Parser)]
#[command(name = "cronlint", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (overrides CRONLINT_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    /// Locale for day and month names (e.g. "en", "fr_FR.UTF-8").
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Override `lint.max_runs_per_day`.
    #[arg(long, global = true)]
    pub max_runs_per_day: Option<usize>,

    /// Log at debug level to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a single cron expression.
    Check {
        /// The expression, e.g. "*/5 * * * *" or "@daily".
        expression: String,
    },
    /// Validate a crontab file ("-" reads standard input).
    Lint {
        path: String,
    },
    /// Validate the installed crontab of the current (or given) user.
    User {
        /// Read another user's crontab (usually requires root).
        #[arg(long)]
        user: Option<String>,
    },
    /// Report minutes at which several jobs of a crontab run together.
    Overlaps {
        /// Crontab file ("-" reads standard input).
        path: String,
        /// Look-ahead window in hours (overrides `lint.overlap_window_hours`).
        #[arg(long)]
        window_hours: Option<u32>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

impl Cli {
    /// Fold command-line overrides into a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(max) = self.max_runs_per_day {
            config.lint.max_runs_per_day = max;
        }
        if let Command::Overlaps {
            window_hours: Some(hours),
            ..
        } = &self.command
        {
            config.lint.overlap_window_hours = *hours;
        }
    }
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration and return it with the path that was used.
///
/// An explicit `--config` path must exist. Otherwise `CRONLINT_CONFIG` (or
/// `cronlint.toml`) is read when present and defaults apply when not.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<(Config, String)> {
    let config_path = match explicit {
        Some(path) => {
            anyhow::ensure!(Path::new(path).exists(), "config file {path} not found");
            path.to_owned()
        }
        None => std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into()),
    };

    let config = if Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {config_path}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing {config_path}"))?
    } else {
        Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cronlint",
            "check",
            "*/5 * * * *",
            "--format",
            "json",
            "--max-runs-per-day",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.max_runs_per_day, Some(10));
        assert!(matches!(
            cli.command,
            Command::Check { ref expression } if expression == "*/5 * * * *"
        ));
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "cronlint",
            "overlaps",
            "jobs.cron",
            "--window-hours",
            "6",
            "--max-runs-per-day",
            "48",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.lint.overlap_window_hours, 6);
        assert_eq!(config.lint.max_runs_per_day, 48);
    }

    #[test]
    fn explicit_config_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lint]\nmax_runs_per_day = 12").unwrap();
        let path = file.path().to_str().unwrap();

        let (config, used) = load_config(Some(path)).unwrap();
        assert_eq!(config.lint.max_runs_per_day, 12);
        assert_eq!(used, path);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(Some("/nonexistent/cronlint.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn malformed_config_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lint]\nmax_runs_per_day = \"lots\"").unwrap();
        let path = file.path().to_str().unwrap();

        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().starts_with("parsing"));
    }
}
