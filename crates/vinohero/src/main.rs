mod cli;
mod paths;
mod run;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Still(args)) => run::run_still(cli.run.config.as_deref(), args),
        Some(Command::Config(config_cmd)) => {
            handle_config_command(config_cmd.action, cli.run.config)
        }
        None => run::run_window(cli.run),
    }
}

fn handle_config_command(action: ConfigAction, explicit: Option<PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Where => {
            let (file, origin) = match explicit {
                Some(file) => (file, "explicit"),
                None => (AppPaths::discover()?.config_file(), "default"),
            };
            println!("Configuration file: {}", file.display());
            println!("  source: {origin}");
            let status = match (file.exists(), origin) {
                (true, _) => "present",
                (false, "explicit") => "missing (loading will fail)",
                (false, _) => "missing (defaults apply)",
            };
            println!("  status: {status}");
            Ok(())
        }
        ConfigAction::Check(args) => {
            let loaded = settings::load(args.file.or(explicit).as_deref())?;
            match loaded.source {
                Some(source) => println!("{}: ok", source.display()),
                None => println!("no configuration file found; defaults apply"),
            }
            Ok(())
        }
        ConfigAction::Default => {
            print!("{}", settings::default_toml()?);
            Ok(())
        }
    }
}
