use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{eof, map, opt};
use nom::error::ParseError;
use nom::multi::separated_list0;
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated};
use nom::IResult;

use super::InlineRule;
use crate::emoticon::{EmoticonConfig, EmoticonRule};
use crate::prelude::*;

/// Extension names that [`ExtensionSpec::build`] knows how to load.
pub const KNOWN_EXTENSIONS: &[&str] = &["emoticons"];

/// A parsed extension spec string, such as `emoticons(BASE_URL=/emoticons/,FILE_EXTENSION=jpg)`.
///
/// The option list is optional; `emoticons` on its own loads the extension with its defaults.
/// Values run up to the next `,` or `)` and are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSpec {
    pub name: String,
    pub options: Vec<(String, String)>,
}

impl ExtensionSpec {
    pub fn parse(source: &str) -> Result<Self> {
        let (_, (name, options)) = parse_spec(source).map_err(|err| {
            eyre!("Malformed extension spec \"{source}\".")
                .section(err.to_string())
                .suggestion("Extension specs look like `name` or `name(KEY=value,KEY=value)`.")
        })?;

        Ok(ExtensionSpec {
            name: name.to_owned(),
            options: options
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        })
    }

    /// Resolves the extension by name and configures a rule from the spec's options.
    pub fn build(&self) -> Result<Box<dyn InlineRule>> {
        match self.name.as_str() {
            "emoticons" => {
                let pairs = self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()));
                let config = EmoticonConfig::from_pairs(pairs)?;
                Ok(Box::new(EmoticonRule::new(config)?))
            }
            name => {
                let err = eyre!("Unknown extension \"{name}\".")
                    .note(format!("Known extensions: {}", KNOWN_EXTENSIONS.join(", ")))
                    .suggestion("Double check the extension name for spelling mistakes.");
                bail!(err)
            }
        }
    }
}

/// Wraps the given parser, consuming all whitespace before and after it.
/// Taken from the Nom recipes document.
fn trim<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    E: ParseError<&'a str>,
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn parse_spec(i: &str) -> IResult<&str, (&str, Vec<(&str, &str)>)> {
    let option_list = delimited(
        char('('),
        separated_list0(char(','), trim(parse_option)),
        preceded(multispace0, char(')')),
    );

    map(
        terminated(pair(trim(identifier), opt(option_list)), trim(eof)),
        |(name, options)| (name, options.unwrap_or_default()),
    )(i)
}

fn parse_option(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        trim(identifier),
        char('='),
        map(take_while(|c: char| c != ',' && c != ')'), str::trim),
    )(i)
}

fn identifier(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(i)
}
