use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use item_collect::execute::MoveOutcome;
use item_collect::report::format_preview;
use item_collect::repository::FsRepository;
use item_collect::session::{self, Confirm, RunResult};
use item_collect::{get_relative_path_or_filename, print_bold, print_error, print_warning};

use crate::Args;
use crate::config::Config;
use crate::logger::FileLogger;

/// Collect items listed by name into one destination directory.
#[derive(Debug)]
pub struct Collect {
    root: PathBuf,
    config: Config,
}

/// Asks on the terminal before anything is moved.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, preview: &str) -> Result<bool> {
        println!("{preview}\n");
        print!("{}", "Proceed with moving matched items to the destination? (y/n): ".magenta());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input).context("Failed to read answer")?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

/// Prints the preview and goes ahead without asking.
struct PrintConfirm;

impl Confirm for PrintConfirm {
    fn confirm(&mut self, preview: &str) -> Result<bool> {
        println!("{preview}\n");
        Ok(true)
    }
}

impl Collect {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::from_args(args)?;
        let root = item_collect::resolve_input_path(config.root.as_deref())?;
        if config.debug {
            eprintln!("Config: {config:#?}");
            eprintln!("Root: {}", root.display());
        }
        Ok(Self { root, config })
    }

    pub fn run(&self) -> Result<()> {
        let (raw_names, from_stdin) = self.read_names()?;
        if from_stdin && !self.config.auto && !self.config.dryrun {
            anyhow::bail!("Names read from stdin need --auto or --print since stdin cannot also answer the prompt");
        }

        let mut repository = FsRepository::open(&self.root, self.config.name_mode())
            .with_context(|| format!("Failed to scan {}", self.root.display()))?;
        if self.config.verbose {
            println!("Scanned {}", self.root.display());
        }

        let mut logger = if self.config.log {
            let mut logger = FileLogger::new()?;
            logger.log_init(&self.root, &self.config);
            if self.config.verbose {
                println!("Logging to {}", logger.path().display());
            }
            Some(logger)
        } else {
            None
        };

        if self.config.dryrun {
            let preview = self.dry_run(&repository, &raw_names)?;
            println!("{preview}");
            return Ok(());
        }

        let options = self.config.collect_options();
        let result = if self.config.auto {
            session::run(&mut repository, &raw_names, &options, &mut PrintConfirm)
        } else {
            session::run(&mut repository, &raw_names, &options, &mut StdinConfirm)
        }?;

        match result {
            RunResult::Cancelled { .. } => {
                println!("{}", "Cancelled, nothing was moved".yellow());
                if let Some(logger) = logger.as_mut() {
                    logger.log_cancelled();
                }
                Ok(())
            }
            RunResult::Completed { outcome, report } => {
                print_bold!("{report}");
                self.print_details(&repository, &outcome);
                if let Some(logger) = logger.as_mut() {
                    for entry in repository.journal() {
                        logger.log_move(entry);
                    }
                    for failure in &outcome.failures {
                        logger.log_failure(&failure.name, &failure.reason);
                    }
                    logger.log_summary(&outcome);
                }
                self.save_report(&report)?;
                match outcome.error {
                    Some(error) => Err(anyhow::anyhow!("Move stopped early: {error}")),
                    None => Ok(()),
                }
            }
        }
    }

    /// Plan the run without touching the filesystem and save the preview as the report.
    fn dry_run(&self, repository: &FsRepository, raw_names: &str) -> Result<String> {
        let plan = session::preview(repository, raw_names, &self.config.collect_options())?;
        let preview = format_preview(&plan);
        self.save_report(&preview)?;
        Ok(preview)
    }

    /// Read raw names from the names file or stdin, then append names given with `--name`.
    ///
    /// Returns the names and whether stdin was consumed.
    fn read_names(&self) -> Result<(String, bool)> {
        let mut raw = String::new();
        let mut from_stdin = false;
        match self.config.names_file.as_deref() {
            Some(path) if path != Path::new("-") => {
                raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read names file: {}", path.display()))?;
            }
            Some(_) => {
                io::stdin().read_to_string(&mut raw).context("Failed to read names from stdin")?;
                from_stdin = true;
            }
            None if self.config.names.is_empty() => {
                io::stdin().read_to_string(&mut raw).context("Failed to read names from stdin")?;
                from_stdin = true;
            }
            None => {}
        }
        for name in &self.config.names {
            raw.push('\n');
            raw.push_str(name);
        }
        Ok((raw, from_stdin))
    }

    fn print_details(&self, repository: &FsRepository, outcome: &MoveOutcome) {
        for failure in &outcome.failures {
            print_warning!("Failed to move {}: {}", failure.name, failure.reason);
        }
        if let Some(error) = &outcome.error {
            print_error!("{error}");
        }

        if self.config.verbose {
            for entry in repository.journal() {
                println!(
                    "{} -> {}",
                    get_relative_path_or_filename(&entry.from, &self.root),
                    get_relative_path_or_filename(&entry.to, &self.root).green()
                );
            }
        }

        if self.config.select {
            let selected = repository.selected_paths();
            if !selected.is_empty() {
                println!("\n{}", "Moved items:".cyan().bold());
                for path in selected {
                    println!("  {}", get_relative_path_or_filename(&path, &self.root));
                }
            }
        }
    }

    fn save_report(&self, report: &str) -> Result<()> {
        if let Some(path) = &self.config.report {
            write_report(path, report)?;
            if self.config.verbose {
                println!("Report saved to {}", path.display());
            }
        }
        Ok(())
    }
}

/// Write the report text to a file, replacing any previous contents.
fn write_report(path: &Path, report: &str) -> Result<()> {
    fs::write(path, format!("{report}\n")).with_context(|| format!("Failed to save report: {}", path.display()))
}
