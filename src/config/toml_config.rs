use crate::core::parser::DEFAULT_SKIP_ROWS;
use crate::core::ConfigProvider;
use crate::utils::error::{NamesError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BOYS_FILE: &str = "babynames1996to2024/Names for Baby Boys 1996-2024.csv";
pub const DEFAULT_GIRLS_FILE: &str = "babynames1996to2024/Names for Baby Girls 1996-2024.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data: DataConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub boys_file: String,
    pub girls_file: String,
    pub skip_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            boys_file: DEFAULT_BOYS_FILE.to_string(),
            girls_file: DEFAULT_GIRLS_FILE.to_string(),
            skip_rows: DEFAULT_SKIP_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Popularity cut applied before score and nearest queries; 0 disables it.
    pub default_top: usize,
    pub list_size: usize,
    pub popular_size: usize,
    pub nearest_size: usize,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_top: 1000,
            list_size: 10,
            popular_size: 25,
            nearest_size: 25,
            start_year: 1996,
            end_year: 2024,
        }
    }
}

impl TomlConfig {
    /// Loads a configuration file; missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NamesError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NamesError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("data.boys_file", &self.data.boys_file)?;
        validation::validate_path("data.girls_file", &self.data.girls_file)?;
        validation::validate_file_extensions(
            "data",
            &[self.data.boys_file.as_str(), self.data.girls_file.as_str()],
            &["csv"],
        )?;

        validation::validate_positive_number("display.list_size", self.display.list_size, 1)?;
        validation::validate_positive_number("display.popular_size", self.display.popular_size, 1)?;
        validation::validate_positive_number("display.nearest_size", self.display.nearest_size, 1)?;

        validation::validate_range("display.start_year", self.display.start_year, 1800, 2200)?;
        validation::validate_range(
            "display.end_year",
            self.display.end_year,
            self.display.start_year,
            2200,
        )?;

        Ok(())
    }

    /// Years covered by the source tables, for headings.
    pub fn year_span(&self) -> (i32, i32) {
        (self.display.start_year, self.display.end_year)
    }
}

impl ConfigProvider for TomlConfig {
    fn boys_file(&self) -> &str {
        &self.data.boys_file
    }

    fn girls_file(&self) -> &str {
        &self.data.girls_file
    }

    fn skip_rows(&self) -> usize {
        self.data.skip_rows
    }

    fn list_size(&self) -> usize {
        self.display.list_size
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
