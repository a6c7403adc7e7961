use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use swatch_app::Application;
use swatch_engine::logging::{init_logging, LoggingConfig};

#[derive(Parser)]
#[command(name = "swatch")]
#[command(about = "Draws a colored rectangle; 1/2/3 pick red/green/blue, R or 0 resets", long_about = None)]
struct Cli {
    /// Window (or snapshot) width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window (or snapshot) height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Window title
    #[arg(long, default_value = "swatch")]
    title: String,

    /// Render one frame offscreen and write it to this PNG instead of opening a window
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,

    /// Fire an event before the first frame (color1, color2, color3, colorReset); repeatable
    #[arg(long = "event", value_name = "ID")]
    events: Vec<String>,

    /// Log filter in env_logger syntax (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("swatch: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app = Application::new()
        .title(cli.title)
        .size(cli.width as f64, cli.height as f64);
    for id in cli.events {
        app = app.replay(id);
    }

    match cli.snapshot {
        Some(path) => {
            let frame = app.snapshot(cli.width, cli.height)?;
            frame
                .save_png(&path)
                .with_context(|| format!("snapshot not saved to {}", path.display()))?;
            log::info!("wrote {}x{} snapshot to {}", frame.width(), frame.height(), path.display());
            Ok(())
        }
        None => app.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn events_are_repeatable_and_ordered() {
        let cli = Cli::parse_from(["swatch", "--event", "color2", "--event", "colorReset", "--snapshot", "out.png"]);
        assert_eq!(cli.events, vec!["color2", "colorReset"]);
        assert_eq!(cli.snapshot, Some(PathBuf::from("out.png")));
        assert_eq!((cli.width, cli.height), (800, 600));
    }
}
