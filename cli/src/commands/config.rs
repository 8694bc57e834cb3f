use std::path::Path;

use color_eyre::eyre::Result;

use crate::config::UserConfig;

pub fn run(config_file: &Path, path: bool, reset: bool) -> Result<()> {
    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save_to(config_file)?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    let config = UserConfig::load_from(config_file);
    config.engine.validate()?;
    println!("Config file: {}", config_file.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
