//! Emoticon substitution.
//!
//! Swaps emoticon symbols in inline text for `<img>` elements, keeping the symbol as `alt` text:
//! `:p` becomes `<img src="tongue.gif" alt=":p" />` with the default settings.

mod table;

pub use table::EmoticonTable;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::render::{Element, Fragment, InlineRule, Node};

pub const DEFAULT_BASE_URL: &str = "";
pub const DEFAULT_FILE_EXTENSION: &str = "gif";

/// Settings for the emoticon rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EmoticonConfig {
    /// Mapping from emoticon symbols to image names.
    pub table: EmoticonTable,
    /// The base URL at which emoticons are accessible.
    pub base_url: String,
    /// The file extension used for emoticon images.
    pub file_extension: String,
}

impl Default for EmoticonConfig {
    fn default() -> Self {
        EmoticonConfig {
            table: EmoticonTable::default(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            file_extension: DEFAULT_FILE_EXTENSION.to_owned(),
        }
    }
}

/// A single `(OPTION, value)` override for [`EmoticonConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmoticonOption {
    /// `EMOTICONS`: replaces the whole table.
    Emoticons(EmoticonTable),
    /// `BASE_URL`
    BaseUrl(String),
    /// `FILE_EXTENSION`
    FileExtension(String),
}

impl EmoticonOption {
    pub fn key(&self) -> &'static str {
        match self {
            EmoticonOption::Emoticons(_) => "EMOTICONS",
            EmoticonOption::BaseUrl(_) => "BASE_URL",
            EmoticonOption::FileExtension(_) => "FILE_EXTENSION",
        }
    }
}

impl EmoticonConfig {
    /// Starts from the defaults and applies each option in turn.
    pub fn with_options(options: impl IntoIterator<Item = EmoticonOption>) -> Self {
        let mut config = EmoticonConfig::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    pub fn apply(&mut self, option: EmoticonOption) {
        match option {
            EmoticonOption::Emoticons(table) => self.table = table,
            EmoticonOption::BaseUrl(url) => self.base_url = url,
            EmoticonOption::FileExtension(ext) => self.file_extension = ext,
        }
    }

    /// Builds a config from string option pairs, as found in extension spec strings.
    ///
    /// `EMOTICONS` can't be expressed as a string and is rejected, as are unknown keys.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut config = EmoticonConfig::default();

        for (key, value) in pairs {
            let option = match key {
                "BASE_URL" => EmoticonOption::BaseUrl(value.to_owned()),
                "FILE_EXTENSION" => EmoticonOption::FileExtension(value.to_owned()),
                "EMOTICONS" => {
                    let err = eyre!("The EMOTICONS option can't be given as a string.")
                        .suggestion("Define the table in the `[emoticons.table]` section of the configuration instead.");
                    bail!(err)
                }
                _ => {
                    let err = eyre!("Unknown emoticon option \"{key}\".")
                        .note("Recognized options are EMOTICONS, BASE_URL and FILE_EXTENSION.");
                    bail!(err)
                }
            };
            config.apply(option);
        }

        Ok(config)
    }

    /// The `src` for an image name: plain concatenation, no URL encoding.
    pub fn source_for(&self, image: &str) -> String {
        format!("{}{}.{}", self.base_url, image, self.file_extension)
    }
}

/// The emoticon [`InlineRule`].
///
/// The matching pattern is compiled once, when the rule is built. Alternation follows table order
/// rather than preferring the longest symbol.
#[derive(Debug)]
pub struct EmoticonRule {
    config: EmoticonConfig,
    pattern: Option<Regex>,
}

impl EmoticonRule {
    pub fn new(config: EmoticonConfig) -> Result<Self> {
        let pattern = build_pattern(&config.table)?;
        warn_shadowed(&config.table);

        debug!(
            "Built emoticon rule with {} symbols (base URL {:?}, extension {:?}).",
            config.table.len(),
            config.base_url,
            config.file_extension
        );

        Ok(EmoticonRule { config, pattern })
    }

    /// Substitutes every emoticon in `text`.
    pub fn render(&self, text: &str) -> Result<Fragment> {
        self.expand(text)
    }

    fn image(&self, symbol: &str) -> Result<Element> {
        let image = self
            .config
            .table
            .get(symbol)
            .ok_or_else(|| eyre!("Matched emoticon \"{symbol}\" has no image."))?;

        Ok(Element::new("img")
            .with_attribute("src", self.config.source_for(image))
            .with_attribute("alt", symbol))
    }
}

impl InlineRule for EmoticonRule {
    fn name(&self) -> &str {
        "emoticons"
    }

    fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    fn handle_match(&self, matched: &str) -> Result<Node> {
        self.image(matched).map(Node::Element)
    }
}

/// One-shot form of [`EmoticonRule::render`].
pub fn render(text: &str, config: &EmoticonConfig) -> Result<Fragment> {
    EmoticonRule::new(config.clone())?.render(text)
}

/// Builds `(?P<emoticon>a|b|...)` from the table's symbols, each escaped for literal matching.
/// Returns `None` when there is nothing to match.
fn build_pattern(table: &EmoticonTable) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = table
        .symbols()
        .filter(|symbol| {
            if symbol.is_empty() {
                warn!("Ignoring an empty emoticon symbol.");
            }
            !symbol.is_empty()
        })
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!("(?P<emoticon>{})", alternatives.join("|"));
    let regex = Regex::new(&pattern).wrap_err("Could not compile the emoticon pattern.")?;

    Ok(Some(regex))
}

/// Warns about symbols that can never match because an earlier symbol is a prefix of them.
fn warn_shadowed(table: &EmoticonTable) {
    for (i, earlier) in table.symbols().enumerate() {
        if earlier.is_empty() {
            continue;
        }

        for later in table.symbols().skip(i + 1) {
            if later.len() > earlier.len() && later.starts_with(earlier) {
                warn!("Emoticon \"{later}\" can never match: the earlier \"{earlier}\" is a prefix of it.");
            }
        }
    }
}
