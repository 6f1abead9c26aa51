use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cl_lint::Validator;
use cronlint::cli::{self, Cli, Command, ConfigCommand};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose);

    let (mut config, config_path) = cli::load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let passed = match &cli.command {
        Command::Version => {
            println!("cronlint {}", env!("CARGO_PKG_VERSION"));
            true
        }
        Command::Config(ConfigCommand::Validate) => cli::config::validate(&config, &config_path),
        Command::Config(ConfigCommand::Show) => {
            print!("{}", cli::config::show(&config).context("serializing config")?);
            true
        }
        Command::Check { expression } => {
            let validator = build_validator(&cli, &config);
            cli::lint::check(&validator, expression, cli.format)?
        }
        Command::Lint { path } => {
            let validator = build_validator(&cli, &config);
            cli::lint::lint(&validator, path, cli.format)?
        }
        Command::User { user } => {
            let validator = build_validator(&cli, &config);
            cli::lint::user(&validator, user.as_deref(), cli.format)?
        }
        Command::Overlaps { path, .. } => {
            let validator = build_validator(&cli, &config);
            cli::lint::overlaps(&validator, path, cli.format)?
        }
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn build_validator(cli: &Cli, config: &cl_domain::config::Config) -> Validator {
    for issue in config.validate() {
        tracing::warn!(%issue, "config issue");
    }
    Validator::from_config(config, cli.locale.as_deref())
}

/// Compact stderr logging. `--verbose` forces debug, otherwise `RUST_LOG`
/// applies with a default of `warn`.
fn init_cli_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
