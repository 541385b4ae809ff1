//! Markdown rendering on top of `pulldown-cmark`.
//!
//! Rendering is a single pass over the parser's event stream:
//! 1. Raw HTML events are neutralized according to the [`SafeMode`].
//! 2. Adjacent text events are merged.
//! 3. Registered [`InlineRule`]s are expanded over the remaining inline text.
//! 4. The resulting events are pushed out as HTML.

mod expand;
mod extension;
mod fragment;
mod registry;
mod safe;

pub use extension::ExtensionSpec;
pub use fragment::{Element, Fragment, Node};
pub use registry::{InlineRule, Registry};
pub use safe::{SafeMode, HTML_PLACEHOLDER};

use pulldown_cmark::{html, Options, Parser};

use crate::config::Config;
use crate::emoticon::EmoticonRule;
use crate::prelude::*;

/// A Markdown renderer with an explicit registry of inline rules.
///
/// Immutable once built, so a single instance can be shared between threads.
#[derive(Debug)]
pub struct Renderer {
    options: Options,
    safe_mode: SafeMode,
    registry: Registry,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer with the default Markdown extensions, [`SafeMode::Replace`] and no inline rules.
    pub fn new() -> Self {
        Renderer {
            options: default_options(),
            safe_mode: SafeMode::default(),
            registry: Registry::new(),
        }
    }

    /// Builds a renderer from the `[render]` and `[emoticons]` sections of a [`Config`].
    ///
    /// The `[emoticons]` section, if present, is registered first; extension specs
    /// follow in the order they are listed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut options = default_options();
        if config.render.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if config.render.heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }

        let mut renderer = Renderer::new()
            .with_options(options)
            .with_safe_mode(config.render.safe_mode);

        if let Some(emoticons) = &config.emoticons {
            let rule = EmoticonRule::new(emoticons.clone())?;
            renderer = renderer.register(rule);
        }

        for spec in &config.render.extensions {
            let rule = ExtensionSpec::parse(spec)?
                .build()
                .wrap_err_with(|| format!("Could not load the extension \"{spec}\"."))?;
            renderer.registry.register(rule);
        }

        Ok(renderer)
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: SafeMode) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    /// Appends an inline rule to the registry.
    pub fn register(mut self, rule: impl InlineRule + 'static) -> Self {
        self.registry.register(Box::new(rule));
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn safe_mode(&self) -> SafeMode {
        self.safe_mode
    }

    /// Renders Markdown source into HTML.
    pub fn render(&self, source: &str) -> Result<String> {
        let events = Parser::new_ext(source, self.options).collect();
        let events = safe::sanitize(events, self.safe_mode)?;
        let events = expand::merge_text(events);
        let events = expand::expand_events(events, &self.registry)?;

        // There are no possible worlds in which the HTML output is smaller
        // than the Markdown input, so a little preallocation can't hurt.
        let mut html_buffer = String::with_capacity(source.len());
        html::push_html(&mut html_buffer, events.into_iter());

        Ok(html_buffer)
    }
}

fn default_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}
