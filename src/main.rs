use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{CommandFactory, Parser};
use log::warn;
use msvg::{
    ColorOverrides, MsvgError, NoProgress, Options, Outcome, Progress, TerminalProgress, Zoom,
};

#[derive(Parser)]
#[command(name = "msvg")]
#[command(about = "Strip, recolor and split the layers of exported map SVGs", long_about = None)]
#[command(override_usage = "msvg (input.svg|input/) (output.svg|output/) [OPTIONS]")]
struct Cli {
    /// Map file, or a directory of .svg maps
    input: PathBuf,

    /// Output file or directory (must not exist)
    output: PathBuf,

    /// Zoom of the svg map
    #[arg(short, long, value_enum, default_value_t = Zoom::Z14000)]
    zoom: Zoom,

    /// Expand each file into one file per layer
    #[arg(short, long)]
    expand: bool,

    /// Color for roads
    #[arg(short, long, value_name = "#HEX", help_heading = "Colors")]
    roads: Option<String>,

    /// Color for buildings
    #[arg(short, long, value_name = "#HEX", help_heading = "Colors")]
    buildings: Option<String>,

    /// Color for parks
    #[arg(short, long, value_name = "#HEX", help_heading = "Colors")]
    parks: Option<String>,

    /// Don't print progress
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = Arc::clone(&interrupt);
        if let Err(e) = ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst)) {
            warn!("could not install Ctrl-C handler: {e}");
        }
    }

    let options = Options {
        zoom: cli.zoom,
        expand: cli.expand,
        colors: ColorOverrides {
            roads: cli.roads,
            buildings: cli.buildings,
            parks: cli.parks,
        },
    };

    let mut progress: Box<dyn Progress> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(TerminalProgress::new("msvg"))
    };

    match msvg::run(&cli.input, &cli.output, &options, progress.as_mut(), &interrupt) {
        Ok(Outcome::Finished) => ExitCode::SUCCESS,
        Ok(Outcome::Interrupted) => ExitCode::from(130),
        Err(MsvgError::Usage(message)) => {
            eprintln!("{}", Cli::command().render_usage());
            eprintln!("msvg: {message}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("\nmsvg: {e}");
            ExitCode::FAILURE
        }
    }
}
