use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emoticon::EmoticonConfig;
use crate::prelude::*;
use crate::render::SafeMode;

/// Formatting configuration, usually read from a TOML file.
///
/// ```toml
/// [render]
/// safe_mode = "replace"
/// extensions = ["emoticons(BASE_URL=/emoticons/,FILE_EXTENSION=png)"]
///
/// [emoticons]
/// base_url = "/static/emoticons/"
///
/// [emoticons.table]
/// ":)" = "smile"
/// ```
#[derive(Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct Config {
    pub render: Render,
    /// Registers the emoticon rule when present.
    pub emoticons: Option<EmoticonConfig>,
}

#[derive(Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct Render {
    pub safe_mode: SafeMode,
    pub smart_punctuation: bool,
    pub heading_attributes: bool,
    /// Extension spec strings, loaded in order.
    pub extensions: Vec<String>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let toml_raw = match path.exists() {
            true => {
                std::fs::read_to_string(path)
                    .wrap_err("Could not read in configuration file.")
                    .suggestion("The configuration file was found, but couldn't be read - try checking your file permissions.")?
            },
            false => bail!("Configuration file not found.")
        };

        Self::from_toml(&toml_raw)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).wrap_err("Could not parse configuration.")
    }
}
