mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use cli::{Cli, Commands};
use config::{config_path, ensure_dirs, LogLevel, OutputFormat, UserConfig};

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let config_file = cli.config.clone().unwrap_or_else(config_path);
    let config = UserConfig::load_from(&config_file);
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let _guard = logging::init(config.log_level, config.log_mode, log_level_override);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output
    };

    if !matches!(cli.command, Commands::Config { .. }) {
        config
            .engine
            .validate()
            .wrap_err_with(|| format!("Invalid [engine] section in {}", config_file.display()))?;
    }

    match cli.command {
        Commands::Stats { file, range } => commands::stats::run(&file, &range, &config, format),
        Commands::Health { file, range } => commands::health::run(&file, &range, &config, format),
        Commands::Providers { file, range, debug } => {
            commands::providers::run(&file, &range, debug, &config, format)
        }
        Commands::Sessions { file, range, id } => {
            commands::sessions::run(&file, &range, id.as_deref(), &config, format)
        }
        Commands::Locations { file } => commands::locations::run(&file, &config, format),
        Commands::Fingerprint { file } => commands::fingerprint::run(&file, &config, format),
        Commands::Config { path, reset } => commands::config::run(&config_file, path, reset),
    }
}
