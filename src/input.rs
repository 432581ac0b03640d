//! Provides a means to read, parse and hold configuration options for scans.
use clap::{Parser, Subcommand, ValueEnum};
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScanError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT_RANGE: &str = "1-65535";
pub const DEFAULT_BATCH_SIZE: u16 = 4500;
pub const DEFAULT_TIMEOUT_MS: u32 = 2000;

/// Represents the strategy in which the port scanning will run.
///   - Serial will run from start to end, for example 1 to 1_000.
///   - Random will randomize the order in which ports will be scanned.
#[derive(Deserialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Serial,
    Random,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangescan",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    disable_help_subcommand = true
)]
/// TCP connect scanner for one host and one port range.
/// WARNING Do not use this program against infrastructure you are not
/// allowed to test, a large batch size opens thousands of connections at once.
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a host across a port range.
    Scan(Opts),
}

#[derive(clap::Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Opts {
    /// IPv4 address or host name to scan.
    #[arg(default_value = DEFAULT_ADDRESS)]
    pub ip: String,

    /// Inclusive port range as start-end, for example 1-1000.
    #[arg(default_value = DEFAULT_PORT_RANGE)]
    pub portrange: String,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Greppable mode. Only output the host and open ports.
    #[arg(short, long)]
    pub greppable: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Print the final report as JSON.
    #[arg(long, conflicts_with = "greppable")]
    pub json: bool,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// A comma-delimited list or file of DNS resolvers. The system resolver is used otherwise.
    #[arg(long)]
    pub resolver: Option<String>,

    /// How many ports are probed at the same time. Lowered automatically
    /// when the open file limit of your OS is smaller.
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u16,

    /// The timeout in milliseconds before a port is assumed to be closed.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u32,

    /// Automatically ups the ULIMIT with the value you provided.
    #[arg(short, long)]
    pub ulimit: Option<u64>,

    /// The order in which probes are issued. The report is sorted either way.
    #[arg(long, value_enum, ignore_case = true, default_value = "serial")]
    pub scan_order: ScanOrder,
}

#[cfg(not(tarpaulin_include))]
impl Opts {
    /// Parses the process arguments. Usage errors exit with status 1,
    /// `--help` and `--version` with status 0.
    pub fn read() -> Self {
        let cli = Cli::try_parse().unwrap_or_else(|e| {
            let code = i32::from(e.use_stderr());
            if e.print().is_err() {
                eprintln!("{e}");
            }
            std::process::exit(code);
        });
        let Command::Scan(opts) = cli.command;
        opts
    }

    /// Merge values found within the user configuration file into the
    /// command line options.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_required(config);
            self.merge_optional(config);
        }
    }

    fn merge_required(&mut self, config: &Config) {
        macro_rules! merge_required {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_required!(
            greppable,
            accessible,
            json,
            no_progress,
            batch_size,
            timeout,
            scan_order
        );
    }

    fn merge_optional(&mut self, config: &Config) {
        macro_rules! merge_optional {
            ($($field: ident),+) => {
                $(
                    if config.$field.is_some() {
                        self.$field = config.$field.clone();
                    }
                )+
            }
        }

        merge_optional!(resolver, ulimit);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout))
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            ip: DEFAULT_ADDRESS.to_owned(),
            portrange: DEFAULT_PORT_RANGE.to_owned(),
            no_config: true,
            config_path: None,
            greppable: true,
            accessible: false,
            json: false,
            no_progress: true,
            resolver: None,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT_MS,
            ulimit: None,
            scan_order: ScanOrder::Serial,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[cfg(not(tarpaulin_include))]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    greppable: Option<bool>,
    accessible: Option<bool>,
    json: Option<bool>,
    no_progress: Option<bool>,
    batch_size: Option<u16>,
    timeout: Option<u32>,
    ulimit: Option<u64>,
    resolver: Option<String>,
    scan_order: Option<ScanOrder>,
}

#[cfg(not(tarpaulin_include))]
impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing or unreadable file yields an empty config.
    ///
    /// # Format
    ///
    /// batch_size = 2500
    /// timeout = 1500
    /// scan_order = "Random"
    /// resolver = "1.1.1.1,8.8.8.8"
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Result<Self, ScanError> {
        let Some(config_path) = custom_config_path.or_else(default_config_path) else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(config_path).unwrap_or_default();

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScanError> {
        toml::from_str(content).map_err(|e| ScanError::Config(e.to_string()))
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(".rangescan.toml");
    Some(config_path)
}
