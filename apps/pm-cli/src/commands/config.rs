// config.rs — Config subcommands: check.

use clap::Subcommand;
use pm_monitor::MonitorConfig;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the resolved configuration and print it (secrets masked).
    Check,
}

pub fn execute(cmd: &ConfigCommands, config: &MonitorConfig) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Check => {
            print!("{}", toml::to_string_pretty(&config.masked())?);
            config.validate()?;
            println!("\nConfiguration OK.");
            Ok(())
        }
    }
}
