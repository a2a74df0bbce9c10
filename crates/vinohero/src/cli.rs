use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vinohero",
    author,
    version,
    about = "VinoCEO hero renderer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Configuration file to use instead of the default location.
    #[arg(long, global = true, value_name = "FILE", env = "VINOHERO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window size in logical pixels (e.g. `1280x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Open the window borderless fullscreen.
    #[arg(long)]
    pub fullscreen: bool,

    /// Window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a single frame offscreen and write it as PNG.
    Still(StillArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct StillArgs {
    /// Destination PNG path.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Animation time to evaluate (seconds or a duration like `2.5s`, `1m`).
    #[arg(long, value_name = "SECONDS|DURATION", value_parser = heroconfig::parse_duration)]
    pub time: Option<std::time::Duration>,

    /// Display size in logical pixels (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Device pixel ratio to render at; clamped to 1-2.
    #[arg(long, value_name = "RATIO", value_parser = parse_pixel_ratio)]
    pub pixel_ratio: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print where the configuration file is looked up.
    Where,
    /// Parse and validate a configuration file.
    Check(CheckArgs),
    /// Print the default configuration as TOML.
    Default,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File to check; defaults to the configured location.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_pixel_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid pixel ratio '{value}'"))?;
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err("pixel ratio must be a positive number".to_string());
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn size_accepts_common_separators() {
        assert_eq!(parse_surface_size("1280x800"), Ok((1280, 800)));
        assert_eq!(parse_surface_size(" 640 X 480 "), Ok((640, 480)));
        assert_eq!(parse_surface_size("800×600"), Ok((800, 600)));
    }

    #[test]
    fn size_rejects_zero_and_garbage() {
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("800").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }

    #[test]
    fn pixel_ratio_must_be_positive() {
        assert_eq!(parse_pixel_ratio("1.5"), Ok(1.5));
        assert!(parse_pixel_ratio("0").is_err());
        assert!(parse_pixel_ratio("NaN").is_err());
    }

    #[test]
    fn still_subcommand_parses_time_forms() {
        let cli = Cli::try_parse_from([
            "vinohero", "still", "--output", "hero.png", "--time", "1m", "--size", "400x300",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Still(args)) => {
                assert_eq!(args.time, Some(Duration::from_secs(60)));
                assert_eq!(args.size, Some((400, 300)));
                assert_eq!(args.output, PathBuf::from("hero.png"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn window_mode_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from(["vinohero", "--fullscreen", "--title", "Cellar"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.fullscreen);
        assert_eq!(cli.run.title.as_deref(), Some("Cellar"));
    }
}
