use std::path::PathBuf;
use std::process;

use clap::Parser;
use portfmt::cli::{self, color_enabled};
use portfmt::models::error::ErrorReport;
use portfmt::{Behavior, Error, Result, Settings};

#[derive(Parser)]
#[command(name = "portfmt")]
#[command(about = "Format a port Makefile into canonical shape")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Enable a non-default behavior: collapse, always-sort, keep-eol-comments
    #[arg(short = 'D', value_name = "BEHAVIOR")]
    enable: Vec<String>,

    /// Disable a named edit pass (see --list-passes)
    #[arg(short = 'd', value_name = "PASS")]
    disable: Vec<String>,

    /// List the registered edit passes and exit
    #[arg(long)]
    list_passes: bool,

    /// Rewrite the file in place
    #[arg(short = 'i')]
    inplace: bool,

    /// Format twice and fail when the result is not idempotent
    #[arg(short = 't')]
    test_roundtrip: bool,

    /// Print a unified diff instead of the formatted file
    #[arg(short = 'u')]
    unified: bool,

    /// Wrap long values at this column
    #[arg(short = 'w', value_name = "COL", default_value_t = 80)]
    wrapcol: usize,

    /// Port Makefile (stdin when omitted)
    file: Option<PathBuf>,
}

fn behavior_flag(name: &str) -> Result<Behavior> {
    match name {
        "collapse" => Ok(Behavior::COLLAPSE_ADJACENT_VARIABLES),
        "always-sort" => Ok(Behavior::ALWAYS_SORT_VARIABLES),
        "keep-eol-comments" => Ok(Behavior::KEEP_EOL_COMMENTS),
        _ => Err(Error::InvalidArgument(format!("unknown behavior: {name}"))),
    }
}

fn run(cli: &Cli) -> Result<i32> {
    if cli.list_passes {
        for name in portfmt::edit::registered_names() {
            println!("{name}");
        }
        return Ok(0);
    }

    let mut behavior = Behavior::default();
    if cli.inplace {
        behavior |= Behavior::OUTPUT_INPLACE;
    }
    for name in &cli.enable {
        behavior |= behavior_flag(name)?;
    }
    for name in &cli.disable {
        if portfmt::edit::lookup(name).is_none() {
            return Err(Error::InvalidArgument(format!("unknown pass: {name}")));
        }
    }

    let settings = Settings {
        behavior,
        wrapcol: cli.wrapcol,
        ..Settings::default()
    };

    let (name, input) = cli::read_input(cli.file.as_deref())?;
    let (output, _) = portfmt::format_document(&name, &input, settings.clone(), &cli.disable)?;

    if cli.test_roundtrip {
        let (twice, _) = portfmt::format_document(&name, &output, settings, &cli.disable)?;
        if twice != output {
            eprintln!("portfmt: {name}: formatting is not idempotent");
            return Ok(1);
        }
        return Ok(0);
    }

    if cli.unified {
        if let Some(diff) = cli::unified_diff(
            &input,
            &output,
            &name,
            settings.diff_context,
            color_enabled(false),
        ) {
            print!("{diff}");
        }
        return Ok(0);
    }

    cli::write_output(
        settings.behavior.contains(Behavior::OUTPUT_INPLACE),
        cli.file.as_deref(),
        &output,
    )?;
    Ok(0)
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
                    binary: "portfmt",
                    file: &file,
                    error: &error,
                }
            );
            process::exit(error.exit_code());
        }
    }
}
