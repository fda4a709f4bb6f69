use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use portfmt::cli::{self, color_enabled};
use portfmt::edit::bump::{bump_epoch, bump_revision};
use portfmt::edit::get::GetVariables;
use portfmt::edit::merge::{Merge, MergeFlags};
use portfmt::edit::set_version::SetVersion;
use portfmt::edit::unknowns::{OutputUnknownTargets, OutputUnknownVariables};
use portfmt::edit::EditPass;
use portfmt::models::error::ErrorReport;
use portfmt::{Behavior, Error, Result, Settings};

#[derive(Parser)]
#[command(name = "portedit")]
#[command(about = "Apply targeted edits to a port Makefile")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Rewrite the file in place
    #[arg(short = 'i', global = true)]
    inplace: bool,

    /// Print a unified diff instead of the edited file
    #[arg(short = 'u', global = true)]
    unified: bool,

    /// Wrap long values at this column
    #[arg(short = 'w', value_name = "COL", global = true, default_value_t = 80)]
    wrapcol: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Increment PORTEPOCH (1 when absent)
    BumpEpoch {
        /// Port Makefile (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Increment PORTREVISION (1 when absent)
    BumpRevision {
        file: Option<PathBuf>,
    },
    /// Print the values of variables whose name matches an anchored regex
    Get {
        #[arg(value_name = "REGEX")]
        pattern: String,
        file: Option<PathBuf>,
    },
    /// Merge an overlay into the Makefile
    Merge {
        /// Overlay expression (may be given more than once); stdin when
        /// absent
        #[arg(short = 'e', value_name = "EXPR")]
        expr: Vec<String>,
        /// Keep overlay comments on inserted assignments
        #[arg(long)]
        comments: bool,
        file: Option<PathBuf>,
    },
    /// Set DISTVERSION/PORTVERSION and reset PORTREVISION
    SetVersion {
        #[arg(value_name = "VERSION")]
        version: String,
        file: Option<PathBuf>,
    },
    /// List variables the framework does not know about
    UnknownVars {
        file: Option<PathBuf>,
    },
    /// List targets the framework does not know about
    UnknownTargets {
        file: Option<PathBuf>,
    },
}

impl Command {
    fn file(&self) -> Option<&PathBuf> {
        match self {
            Command::BumpEpoch { file }
            | Command::BumpRevision { file }
            | Command::Get { file, .. }
            | Command::Merge { file, .. }
            | Command::SetVersion { file, .. }
            | Command::UnknownVars { file }
            | Command::UnknownTargets { file } => file.as_ref(),
        }
    }

    /// Reporting commands use the rawlines output queue; rewriting
    /// commands reformat only what they edited.
    fn behavior(&self) -> Behavior {
        match self {
            Command::Get { .. } | Command::UnknownVars { .. } | Command::UnknownTargets { .. } => {
                Behavior::OUTPUT_RAWLINES
            }
            _ => Behavior::OUTPUT_EDITED,
        }
    }

    fn pass(&self) -> Result<Box<dyn EditPass>> {
        Ok(match self {
            Command::BumpEpoch { .. } => Box::new(bump_epoch()),
            Command::BumpRevision { .. } => Box::new(bump_revision()),
            Command::Get { pattern, .. } => Box::new(GetVariables::new(pattern)?),
            Command::Merge { expr, comments, .. } => {
                let overlay = if expr.is_empty() {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                } else {
                    let mut joined = expr.join("\n");
                    joined.push('\n');
                    joined
                };
                let flags = MergeFlags {
                    shell_is_delete: true,
                    merge_comments: *comments,
                };
                Box::new(Merge::from_snippet(&overlay, flags)?)
            }
            Command::SetVersion { version, .. } => Box::new(SetVersion::new(version.clone())),
            Command::UnknownVars { .. } => Box::new(OutputUnknownVariables),
            Command::UnknownTargets { .. } => Box::new(OutputUnknownTargets),
        })
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let command = &cli.command;

    if matches!(command, Command::Merge { expr, file, .. } if expr.is_empty() && file.is_none()) {
        return Err(Error::InvalidArgument(
            "merge reads the overlay from stdin; pass the Makefile as an argument or use -e".into(),
        ));
    }

    let settings = Settings {
        behavior: command.behavior(),
        wrapcol: cli.wrapcol,
        ..Settings::default()
    };

    let file = command.file().map(PathBuf::as_path);
    let (name, input) = cli::read_input(file)?;
    let pass = command.pass()?;
    let (output, _) = portfmt::edit_document(&name, &input, settings.clone(), pass.as_ref())?;

    if settings.behavior.contains(Behavior::OUTPUT_RAWLINES) {
        print!("{output}");
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

    cli::write_output(cli.inplace, file, &output)?;
    Ok(0)
}

fn main() {
    cli::init_tracing();
    let cli = Cli::parse();
    let file = cli
        .command
        .file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!(
                "{}",
                ErrorReport {
                    binary: "portedit",
                    file: &file,
                    error: &error,
                }
            );
            process::exit(error.exit_code());
        }
    }
}
