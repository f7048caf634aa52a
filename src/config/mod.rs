pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::render::OutputFormat;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "name-score")]
#[command(about = "Gender scores and popularity rankings for baby names")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Boys source table (overrides the configuration file)
    #[arg(long, global = true)]
    pub boys_file: Option<String>,

    /// Girls source table (overrides the configuration file)
    #[arg(long, global = true)]
    pub girls_file: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Most masculine, most feminine and most gender-neutral names
    Score {
        /// Only consider the top N names by popularity; 0 for no filter
        #[arg(long)]
        top: Option<usize>,
    },
    /// Most popular boys and girls names with their gender scores
    Popular {
        /// Number of names in each list
        #[arg(short)]
        n: Option<usize>,
    },
    /// Names closest to a gender score (-1.0 masculine, +1.0 feminine)
    Nearest {
        #[arg(allow_negative_numbers = true)]
        target: f64,
        /// Number of names to show
        #[arg(short)]
        n: Option<usize>,
        /// Only consider the top N names by popularity; 0 for no filter
        #[arg(long)]
        top: Option<usize>,
    },
    /// Statistics and yearly history for one name
    Lookup {
        /// Name to search for (case-insensitive)
        name: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the configuration file, if any, and applies flag overrides.
    pub fn resolve(&self) -> crate::Result<toml_config::TomlConfig> {
        let mut config = match &self.config {
            Some(path) => toml_config::TomlConfig::from_file(path)?,
            None => toml_config::TomlConfig::default(),
        };

        if let Some(boys) = &self.boys_file {
            config.data.boys_file = boys.clone();
        }
        if let Some(girls) = &self.girls_file {
            config.data.girls_file = girls.clone();
        }

        Ok(config)
    }
}
