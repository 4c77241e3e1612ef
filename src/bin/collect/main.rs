mod collect;
mod config;
mod logger;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::collect::Collect;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Move items matching a list of names into one destination directory"
)]
pub struct Args {
    /// File with one name per line. Use '-' or omit to read stdin
    #[arg(value_hint = clap::ValueHint::FilePath)]
    names_file: Option<PathBuf>,

    /// Add a name to look for
    #[arg(short = 'n', long = "name", num_args = 1, action = clap::ArgAction::Append, value_name = "NAME")]
    names: Vec<String>,

    /// Repository root directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// Destination path under the root, separated with '/'
    #[arg(short, long, value_name = "PATH")]
    dest: Option<String>,

    /// Create destination directories if missing
    #[arg(short, long, conflicts_with = "no_create")]
    create: bool,

    /// Never create destination directories
    #[arg(short = 'C', long)]
    no_create: bool,

    /// Match names case-insensitively
    #[arg(short, long)]
    ignore_case: bool,

    /// Keep known media extensions in the names
    #[arg(short, long)]
    keep_extensions: bool,

    /// Match items by full file name instead of file stem
    #[arg(short, long)]
    full_name: bool,

    /// Move without asking for confirmation
    #[arg(short, long, conflicts_with = "print")]
    auto: bool,

    /// Only print the dry run preview without moving anything
    #[arg(short, long)]
    print: bool,

    /// Save the final report to a file
    #[arg(short = 'o', long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    report: Option<PathBuf>,

    /// Do not print the moved items afterwards
    #[arg(short = 'S', long)]
    no_select: bool,

    /// Write a run log file
    #[arg(short = 'L', long)]
    log: bool,

    /// Enable debug prints
    #[arg(short = 'D', long)]
    debug: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        item_collect::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        Collect::new(args)?.run()
    }
}
