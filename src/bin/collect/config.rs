use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use item_collect::CollectOptions;
use item_collect::repository::NameMode;

use crate::Args;

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Default)]
pub struct Config {
    pub(crate) auto: bool,
    pub(crate) case_insensitive: bool,
    pub(crate) create: bool,
    pub(crate) debug: bool,
    pub(crate) destination: Option<String>,
    pub(crate) dryrun: bool,
    pub(crate) full_name: bool,
    pub(crate) keep_extensions: bool,
    pub(crate) log: bool,
    pub(crate) names: Vec<String>,
    pub(crate) names_file: Option<PathBuf>,
    pub(crate) report: Option<PathBuf>,
    pub(crate) root: Option<PathBuf>,
    pub(crate) select: bool,
    pub(crate) verbose: bool,
}

/// Config from the `[collect]` section of the config file
#[derive(Debug, Default, Deserialize)]
struct CollectConfig {
    #[serde(default)]
    auto: bool,
    #[serde(default)]
    case_insensitive: bool,
    create: Option<bool>,
    #[serde(default)]
    debug: bool,
    destination: Option<String>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    full_name: bool,
    #[serde(default)]
    keep_extensions: bool,
    #[serde(default)]
    log: bool,
    report: Option<PathBuf>,
    select: Option<bool>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    collect: CollectConfig,
}

impl CollectConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = item_collect::config::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.collect)
            .context("Failed to parse collect config TOML")
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let user_config = CollectConfig::get_user_config()?;
        Ok(Self::merge(args, user_config))
    }

    fn merge(args: Args, user_config: CollectConfig) -> Self {
        let create = if args.no_create {
            false
        } else {
            args.create || user_config.create.unwrap_or(true)
        };
        let select = !args.no_select && user_config.select.unwrap_or(true);
        let destination = args.dest.or(user_config.destination);

        Self {
            auto: args.auto || user_config.auto,
            case_insensitive: args.ignore_case || user_config.case_insensitive,
            create,
            debug: args.debug || user_config.debug,
            destination,
            dryrun: args.print || user_config.dryrun,
            full_name: args.full_name || user_config.full_name,
            keep_extensions: args.keep_extensions || user_config.keep_extensions,
            log: args.log || user_config.log,
            names: args.names,
            names_file: args.names_file,
            report: args.report.or(user_config.report).map(|path| expand_home(&path)),
            root: args.root,
            select,
            verbose: args.verbose || user_config.verbose,
        }
    }

    /// Options for the library run.
    pub(crate) fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            case_insensitive: self.case_insensitive,
            strip_extensions: !self.keep_extensions,
            use_destination: self.destination.is_some(),
            destination_path: self.destination.clone().unwrap_or_default(),
            create_destination: self.create,
            select_moved: self.select,
            collapse_after: true,
        }
    }

    pub(crate) const fn name_mode(&self) -> NameMode {
        if self.full_name { NameMode::FileName } else { NameMode::Stem }
    }
}

/// Replace a leading `~` with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod collect_config_tests {
    use super::*;

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = CollectConfig::from_toml_str("").unwrap();
        assert!(!config.auto);
        assert!(!config.dryrun);
        assert!(config.create.is_none());
        assert!(config.select.is_none());
        assert!(config.destination.is_none());
    }

    #[test]
    fn from_toml_str_parses_collect_section() {
        let toml = r#"
[collect]
auto = true
case_insensitive = true
create = false
destination = "Delivery/VFX"
keep_extensions = true
report = "/tmp/collect_report.txt"
select = false
full_name = true
"#;
        let config = CollectConfig::from_toml_str(toml).unwrap();
        assert!(config.auto);
        assert!(config.case_insensitive);
        assert_eq!(config.create, Some(false));
        assert_eq!(config.destination.as_deref(), Some("Delivery/VFX"));
        assert!(config.keep_extensions);
        assert_eq!(config.report, Some(PathBuf::from("/tmp/collect_report.txt")));
        assert_eq!(config.select, Some(false));
        assert!(config.full_name);
    }

    #[test]
    fn from_toml_str_invalid_toml_returns_error() {
        assert!(CollectConfig::from_toml_str("this is not valid toml {{{").is_err());
    }

    #[test]
    fn from_toml_str_wrong_type_returns_error() {
        assert!(CollectConfig::from_toml_str("[collect]\nauto = \"yes\"").is_err());
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[other_section]
some_value = true

[collect]
verbose = true
";
        let config = CollectConfig::from_toml_str(toml).unwrap();
        assert!(config.verbose);
        assert!(!config.debug);
    }
}

#[cfg(test)]
mod config_merge_tests {
    use super::*;
    use clap::Parser;

    fn args(arguments: &[&str]) -> Args {
        let mut all = vec!["collect"];
        all.extend_from_slice(arguments);
        Args::try_parse_from(all).unwrap()
    }

    #[test]
    fn defaults_create_and_select() {
        let config = Config::merge(args(&[]), CollectConfig::default());
        assert!(config.create);
        assert!(config.select);
        assert!(!config.dryrun);
        assert!(config.destination.is_none());
        assert_eq!(config.name_mode(), NameMode::Stem);

        let options = config.collect_options();
        assert!(options.strip_extensions);
        assert!(!options.use_destination);
        assert!(options.collapse_after);
    }

    #[test]
    fn cli_flags_combine_with_config() {
        let user_config = CollectConfig {
            verbose: true,
            full_name: true,
            ..CollectConfig::default()
        };
        let config = Config::merge(args(&["-i", "-p"]), user_config);
        assert!(config.verbose);
        assert!(config.case_insensitive);
        assert!(config.dryrun);
        assert_eq!(config.name_mode(), NameMode::FileName);
    }

    #[test]
    fn negative_flags_override_config() {
        let user_config = CollectConfig {
            create: Some(true),
            select: Some(true),
            ..CollectConfig::default()
        };
        let config = Config::merge(args(&["-C", "-S"]), user_config);
        assert!(!config.create);
        assert!(!config.select);
    }

    #[test]
    fn create_flag_overrides_disabled_config() {
        let disabled = || CollectConfig {
            create: Some(false),
            ..CollectConfig::default()
        };
        assert!(!Config::merge(args(&[]), disabled()).create);
        assert!(Config::merge(args(&["-c"]), disabled()).create);
    }

    #[test]
    fn cli_destination_wins_over_config() {
        let user_config = CollectConfig {
            destination: Some("Archive".to_string()),
            ..CollectConfig::default()
        };
        let config = Config::merge(args(&["-d", "Delivery"]), user_config);
        assert_eq!(config.destination.as_deref(), Some("Delivery"));

        let options = config.collect_options();
        assert!(options.use_destination);
        assert_eq!(options.destination_path, "Delivery");
    }

    #[test]
    fn report_path_expands_home() {
        let home = dirs::home_dir().unwrap();
        let user_config = CollectConfig {
            report: Some(PathBuf::from("~/logs/item-collect/last_report.txt")),
            ..CollectConfig::default()
        };
        let config = Config::merge(args(&[]), user_config);
        assert_eq!(config.report, Some(home.join("logs/item-collect/last_report.txt")));

        let config = Config::merge(args(&["-o", "~"]), CollectConfig::default());
        assert_eq!(config.report, Some(home));
    }

    #[test]
    fn report_path_without_tilde_is_unchanged() {
        let config = Config::merge(args(&["-o", "reports/~draft.txt"]), CollectConfig::default());
        assert_eq!(config.report, Some(PathBuf::from("reports/~draft.txt")));
    }

    #[test]
    fn keep_extensions_disables_stripping() {
        let config = Config::merge(args(&["-k"]), CollectConfig::default());
        assert!(!config.collect_options().strip_extensions);
    }
}
