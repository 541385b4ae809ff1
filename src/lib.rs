//! Forum post formatting.
//!
//! [`Renderer`] wraps `pulldown-cmark` with a safe mode for raw HTML and an explicit registry
//! of inline rules. [`EmoticonRule`] is one such rule, swapping emoticon symbols for images.
//! The [`post`] module builds on both to render post bodies and quoted replies.

#![warn(clippy::perf, clippy::style, warnings)]

pub mod config;
pub mod emoticon;
pub mod post;
pub mod render;

pub use config::Config;
pub use emoticon::{EmoticonConfig, EmoticonOption, EmoticonRule, EmoticonTable};
pub use post::{format_post_body, quote_post, MarkdownFormatter, Post, PostFormatting};
pub use render::{Element, Fragment, InlineRule, Node, Registry, Renderer, SafeMode};

/// Items that are relevant throughout the crate.
pub mod prelude {
    pub use color_eyre::eyre::{bail, eyre, ContextCompat, Report, Result, WrapErr};
    pub use color_eyre::Section;
    pub use tracing::{debug, trace, warn};
}
