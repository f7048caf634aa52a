pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use app::names_service::{NameReport, NamesService, PopularReport, ScoreReport};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::catalog::{Catalog, CatalogState};
pub use core::parser::SourceTable;
pub use utils::error::{NamesError, Result};
