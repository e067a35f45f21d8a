//! TOML configuration.
//!
//! Every key is optional; an empty file reproduces the defaults of the reference field
//! protocol (half-width 25, `;` separated input with `,` decimals, EPSG:32721 output).
//!
//! ```toml
//! [transect]
//! half_width = 25.0
//! offset_policy = "warn"
//!
//! [input]
//! delimiter = ";"
//! decimal_separator = ","
//!
//! [input.trees]
//! id = "ID"
//! strip = "ID_faixa"
//!
//! [output]
//! epsg = 32721
//! stem = "trees_georeferenced"
//! ```

use crate::crs::Crs;
use crate::table::{StripColumns, TableOptions, TreeColumns};
use crate::transect::{DEFAULT_HALF_WIDTH, MapError, MapperBuilder, OffsetPolicy, TransectMapper};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{key} must be a single ASCII character, got {value:?}")]
    Delimiter { key: &'static str, value: char },
    #[error("input.delimiter and input.decimal_separator are both {0:?}")]
    SeparatorClash(char),
    #[error(transparent)]
    Mapper(#[from] MapError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub transect: TransectConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransectConfig {
    /// Lateral X value of the strip centre line.
    pub half_width: f64,
    pub offset_policy: OffsetPolicy,
}

impl Default for TransectConfig {
    fn default() -> Self {
        TransectConfig {
            half_width: DEFAULT_HALF_WIDTH,
            offset_policy: OffsetPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub delimiter: char,
    pub decimal_separator: char,
    pub trees: TreeColumns,
    pub strips: StripColumns,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            delimiter: ';',
            decimal_separator: ',',
            trees: TreeColumns::default(),
            strips: StripColumns::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub delimiter: char,
    pub epsg: u32,
    /// File name, without extension, of the exported files.
    pub stem: String,
    pub csv: bool,
    pub geojson: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            delimiter: ',',
            epsg: Crs::UTM_21S.epsg(),
            stem: "trees_georeferenced".to_string(),
            csv: true,
            geojson: true,
        }
    }
}

fn ascii_byte(key: &'static str, value: char) -> Result<u8, ConfigError> {
    if value.is_ascii() {
        Ok(value as u8)
    } else {
        Err(ConfigError::Delimiter { key, value })
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn mapper(&self) -> Result<TransectMapper, ConfigError> {
        Ok(MapperBuilder::new()
            .half_width(self.transect.half_width)
            .offset_policy(self.transect.offset_policy)
            .build()?)
    }

    pub fn table_options(&self) -> Result<TableOptions, ConfigError> {
        if self.input.delimiter == self.input.decimal_separator {
            return Err(ConfigError::SeparatorClash(self.input.delimiter));
        }
        Ok(TableOptions {
            delimiter: ascii_byte("input.delimiter", self.input.delimiter)?,
            decimal_separator: self.input.decimal_separator,
            trees: self.input.trees.clone(),
            strips: self.input.strips.clone(),
        })
    }

    pub fn output_delimiter(&self) -> Result<u8, ConfigError> {
        ascii_byte("output.delimiter", self.output.delimiter)
    }

    pub fn crs(&self) -> Crs {
        Crs::from_epsg(self.output.epsg)
    }
}
