use std::path::PathBuf;
use std::process::ExitCode;

use centipede_core::{SketchConfig, PRESETS};
use centipede_headless::{run_app, RunOptions, Scheduled};
use centipede_platform::Dimensions;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use glam::Vec2;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "centipede", version, about = "Procedural centipede animation")]
struct Cli {
    /// Built-in configuration to start from.
    #[arg(long, default_value = "wanderer", value_parser = preset_names())]
    preset: String,

    /// TOML configuration file; takes precedence over --preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to draw after setup.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    #[arg(long, default_value_t = 800)]
    width: i32,

    #[arg(long, default_value_t = 600)]
    height: i32,

    /// Container resize, as WxH@FRAME. Repeatable.
    #[arg(long, value_parser = parse_resize)]
    resize: Vec<Scheduled<Dimensions>>,

    /// Pointer press, as X,Y@FRAME. Repeatable.
    #[arg(long, value_parser = parse_click)]
    click: Vec<Scheduled<Vec2>>,

    /// Key press, as KEY@FRAME. Repeatable.
    #[arg(long, value_parser = parse_key)]
    key: Vec<Scheduled<char>>,

    /// Polls for which the container reports 0x0 before layout.
    #[arg(long, default_value_t = 0)]
    layout_delay: u32,

    /// Sleep for the configured retry delay between setup attempts.
    #[arg(long, default_value_t = false)]
    real_time: bool,

    /// Write the last frame as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the last frame's packed line vertices.
    #[arg(long)]
    vertices: Option<PathBuf>,

    /// Print a JSON run summary on stdout.
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Print the resolved configuration as TOML and exit.
    #[arg(long, default_value_t = false)]
    dump_config: bool,
}

fn preset_names() -> PossibleValuesParser {
    PossibleValuesParser::new(PRESETS.iter().copied())
}

fn split_frame(value: &str) -> Result<(&str, u64), String> {
    let (event, frame) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected `...@FRAME`, got `{value}`"))?;
    let frame = frame
        .parse()
        .map_err(|e| format!("bad frame in `{value}`: {e}"))?;
    Ok((event, frame))
}

fn parse_resize(value: &str) -> Result<Scheduled<Dimensions>, String> {
    let (size, frame) = split_frame(value)?;
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected `WxH@FRAME`, got `{value}`"))?;
    let width = w.parse().map_err(|e| format!("bad width in `{value}`: {e}"))?;
    let height = h.parse().map_err(|e| format!("bad height in `{value}`: {e}"))?;
    Ok(Scheduled {
        frame,
        event: Dimensions::new(width, height),
    })
}

fn parse_click(value: &str) -> Result<Scheduled<Vec2>, String> {
    let (point, frame) = split_frame(value)?;
    let (x, y) = point
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y@FRAME`, got `{value}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in `{value}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in `{value}`: {e}"))?;
    Ok(Scheduled {
        frame,
        event: Vec2::new(x, y),
    })
}

fn parse_key(value: &str) -> Result<Scheduled<char>, String> {
    let (key, frame) = split_frame(value)?;
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => Ok(Scheduled { frame, event: key }),
        _ => Err(format!("expected a single key before `@`, got `{value}`")),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match &cli.config {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::preset(&cli.preset)?,
    };
    if cli.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let mut options = RunOptions::new(config, Dimensions::new(cli.width, cli.height), cli.frames);
    options.layout_delay = cli.layout_delay;
    options.resizes = cli.resize;
    options.clicks = cli.click;
    options.keys = cli.key;
    options.sleep_on_retry = cli.real_time;

    let (summary, canvas) = run_app(&options)?;

    if let Some(path) = &cli.svg {
        std::fs::write(path, canvas.to_svg())?;
        info!(path = %path.display(), "wrote svg");
    }
    if let Some(path) = &cli.vertices {
        std::fs::write(path, canvas.vertex_bytes())?;
        info!(path = %path.display(), "wrote line vertices");
    }
    if cli.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    info!("Centipede starting");
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Centipede error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheduled_events() {
        let resize = parse_resize("1024x768@30").unwrap();
        assert_eq!(resize.frame, 30);
        assert_eq!(resize.event, Dimensions::new(1024, 768));

        let click = parse_click("12.5, -3@0").unwrap();
        assert_eq!(click.event, Vec2::new(12.5, -3.0));

        assert_eq!(parse_key("N@7").unwrap().event, 'N');
        assert!(parse_key("ab@7").is_err());
        assert!(parse_resize("1024x768").is_err());
        assert!(parse_click("1;2@3").is_err());
    }

    #[test]
    fn cli_accepts_repeated_events() {
        let cli = Cli::try_parse_from([
            "centipede",
            "--preset",
            "crawler",
            "--resize",
            "640x480@10",
            "--resize",
            "800x600@20",
            "--summary",
        ])
        .unwrap();
        assert_eq!(cli.resize.len(), 2);
        assert!(cli.summary);
        assert!(Cli::try_parse_from(["centipede", "--preset", "snake"]).is_err());
    }
}
