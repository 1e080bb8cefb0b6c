//! binary trial font tool
//!
//! Takes one or more font files and writes a trial version of each, keeping
//! the given unicodes and hiding the rest behind a replacer glyph.

use std::process::ExitCode;

use clap::Parser;
use trial_font::{run_batch, TrialConfig, DEFAULT_UNICODES};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The input font files.
    #[arg(required = true)]
    font_paths: Vec<std::path::PathBuf>,

    /// Skip hiding characters and only rename, making an "extended" trial
    /// with the full character set.
    #[arg(short = 'x', long)]
    extended: bool,

    /// Unicodes or unicode ranges to keep, comma-separated.
    #[arg(short, long, default_value = DEFAULT_UNICODES)]
    unicodes: String,

    /// Name of the glyph hidden characters are mapped to, or its unicode
    /// as "U+0058". The glyph must be mapped in the font.
    #[arg(short, long, default_value = "X")]
    replacer: String,

    /// Suffix added to the font names and file names.
    #[arg(short, long, default_value = "Trial")]
    suffix: String,

    /// Directory trial fonts are written to. Defaults to next to each input.
    #[arg(long)]
    output_dir: Option<std::path::PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match TrialConfig::new(&args.unicodes, &args.replacer, &args.suffix) {
        Ok(config) => config
            .extended(args.extended)
            .output_dir(args.output_dir),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    match run_batch(&args.font_paths, &config) {
        Ok(reports) => {
            for report in reports {
                println!("{}", report.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            for report in &e.completed {
                println!("{}", report.output.display());
            }
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}
