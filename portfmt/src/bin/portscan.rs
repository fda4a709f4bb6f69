use std::path::PathBuf;
use std::process;

use clap::Parser;
use portfmt::cli;
use portfmt::models::error::ErrorReport;
use portfmt::scan::{self, log::LogOutcome, ScanFlags};

#[derive(Parser)]
#[command(name = "portscan")]
#[command(about = "Scan a ports tree for structural issues")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Root of the ports tree
    #[arg(short = 'p', value_name = "PORTSDIR", required = true)]
    portsdir: PathBuf,

    /// Maintain a timestamped log directory instead of writing to stdout
    #[arg(short = 'l', value_name = "LOGDIR")]
    logdir: Option<PathBuf>,

    /// Also report option groups and options
    #[arg(short = 'o')]
    options: bool,

    /// Restrict the scan to these origins (category/port)
    #[arg(value_name = "ORIGIN")]
    origins: Vec<String>,
}

fn run(cli: &Cli) -> portfmt::Result<i32> {
    let flags = ScanFlags {
        include_options: cli.options,
    };
    let lines = scan::scan(&cli.portsdir, &cli.origins, flags)?;

    match &cli.logdir {
        None => {
            for line in &lines {
                println!("{line}");
            }
            Ok(0)
        }
        Some(logdir) => match scan::log::commit(logdir, &lines)? {
            LogOutcome::Written(_) => Ok(0),
            LogOutcome::Unchanged => Ok(2),
        },
    }
}

fn main() {
    cli::init_tracing();
    let cli = Cli::parse();
    let portsdir = cli.portsdir.display().to_string();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!(
                "{}",
                ErrorReport {
                    binary: "portscan",
                    file: &portsdir,
                    error: &error,
                }
            );
            process::exit(error.exit_code());
        }
    }
}
