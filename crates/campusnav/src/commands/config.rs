use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let settings = config.map_settings();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!("{}", "server".bold());
    println!("  base_url:    {}", config.base_url());
    println!("{}", "map".bold());
    println!(
        "  center:      {}, {}",
        settings.center.lat, settings.center.lng
    );
    println!("  zoom:        {}", settings.zoom);
    println!("  tile_url:    {}", settings.tiles.url_template);
    println!("  attribution: {}", settings.tiles.attribution);
    println!("{}", "defaults".bold());
    println!("  theme:       {}", config.theme());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
