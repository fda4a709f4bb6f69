use std::path::PathBuf;
use std::process;

use clap::Parser;
use portfmt::cli::{self, color};
use portfmt::models::error::ErrorReport;
use portfmt::{Behavior, Settings};

#[derive(Parser)]
#[command(name = "portclippy")]
#[command(about = "Report deviations from the canonical variable order")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Never emit ANSI color sequences
    #[arg(long)]
    no_color: bool,

    /// Port Makefile (stdin when omitted)
    file: Option<PathBuf>,
}

fn run(cli: &Cli) -> portfmt::Result<i32> {
    let mut behavior = Behavior::OUTPUT_RAWLINES;
    if cli.no_color {
        behavior |= Behavior::OUTPUT_NO_COLOR;
    }
    let settings = Settings::with_behavior(behavior);

    let (name, input) = cli::read_input(cli.file.as_deref())?;
    let no_color = settings.behavior.contains(Behavior::OUTPUT_NO_COLOR);
    let lines = portfmt::lint_document(&name, &input, settings)?;
    if lines.is_empty() {
        return Ok(0);
    }

    let colored = cli::color_enabled(no_color);
    for line in &lines {
        // Common lines are context; additions and deletions carry the
        // canonical fix.
        let painted = match line.as_bytes().first() {
            Some(b'+') => color::paint(color::GREEN, line, colored),
            Some(b'-') => color::paint(color::RED, line, colored),
            _ => color::paint(color::CYAN, line, colored),
        };
        println!("{painted}");
    }
    Ok(1)
}

fn main() {
    cli::init_tracing();
    let cli = Cli::parse();
    let file = cli
        .file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!(
                "{}",
                ErrorReport {
                    binary: "portclippy",
                    file: &file,
                    error: &error,
                }
            );
            process::exit(error.exit_code());
        }
    }
}
