//! Post body formatting and quoted replies.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use pulldown_cmark::escape::escape_html;
use regex::Regex;

use crate::config::Config;
use crate::prelude::*;
use crate::render::Renderer;

static QUOTE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^").unwrap());

/// Title of the link back to the quoted post.
pub const QUOTE_LINK_TITLE: &str = "View quoted post";

/// A forum post, as far as formatting is concerned.
pub trait Post {
    /// The raw Markdown body.
    fn body(&self) -> &str;

    /// Username of the post's author.
    fn username(&self) -> &str;

    fn absolute_url(&self) -> Cow<'_, str>;
}

/// A pluggable post formatting backend.
pub trait PostFormatting {
    /// Formats a raw post body as HTML.
    fn format_post_body(&self, raw: &str) -> Result<String>;

    /// Returns a raw post body which quotes the given post.
    fn quote_post(&self, post: &dyn Post) -> Result<String>;
}

/// The default [`PostFormatting`] backend: Markdown, rendered in safe mode.
#[derive(Debug, Default)]
pub struct MarkdownFormatter {
    renderer: Renderer,
}

impl MarkdownFormatter {
    /// A formatter with no inline rules and [`SafeMode::Replace`](crate::render::SafeMode::Replace).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(renderer: Renderer) -> Self {
        MarkdownFormatter { renderer }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_renderer(Renderer::from_config(config)?))
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

impl PostFormatting for MarkdownFormatter {
    fn format_post_body(&self, raw: &str) -> Result<String> {
        let html = self.renderer.render(raw)?;
        Ok(html.trim().to_owned())
    }

    fn quote_post(&self, post: &dyn Post) -> Result<String> {
        quote_post(post)
    }
}

/// Formats a raw post body as trimmed HTML, with raw HTML in the input replaced.
pub fn format_post_body(raw: &str) -> Result<String> {
    MarkdownFormatter::new().format_post_body(raw)
}

/// Builds a raw Markdown reply quoting `post`: an attribution line linking back to the post,
/// followed by the post's body with every line prefixed by `> `.
///
/// The username is HTML-escaped, single quotes included, since the result is meant to be rendered again.
pub fn quote_post(post: &(impl Post + ?Sized)) -> Result<String> {
    let mut escaped = String::with_capacity(post.username().len());
    escape_html(&mut escaped, post.username())?;
    let username = escaped.replace('\'', "&#39;");

    let quoted = QUOTE_LINE.replace_all(post.body(), "> ");

    Ok(format!(
        "**{username}** [wrote]({} \"{QUOTE_LINK_TITLE}\"):\n\n{quoted}\n\n",
        post.absolute_url()
    ))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::emoticon::{EmoticonConfig, EmoticonRule};

    struct TestPost {
        body: &'static str,
        username: &'static str,
        id: u32,
    }

    impl Post for TestPost {
        fn body(&self) -> &str {
            self.body
        }

        fn username(&self) -> &str {
            self.username
        }

        fn absolute_url(&self) -> Cow<'_, str> {
            Cow::Owned(format!("/posts/{}", self.id))
        }
    }

    fn post(body: &'static str, username: &'static str) -> TestPost {
        TestPost { body, username, id: 1 }
    }

    #[test]
    fn quote_single_line() {
        let quote = quote_post(&post("hello", "bob")).unwrap();

        assert_eq!(quote, "**bob** [wrote](/posts/1 \"View quoted post\"):\n\n> hello\n\n");
    }

    #[test]
    fn quote_every_line() {
        let quote = quote_post(&post("a\nb", "bob")).unwrap();

        assert!(quote.ends_with(":\n\n> a\n> b\n\n"));
    }

    #[test]
    fn quote_keeps_blank_lines() {
        let quote = quote_post(&post("a\n\nb\n", "bob")).unwrap();

        assert!(quote.ends_with(":\n\n> a\n> \n> b\n> \n\n"));
    }

    #[test]
    fn quote_escapes_username() {
        let quote = quote_post(&post("hi", "<script>&co")).unwrap();

        assert!(quote.starts_with("**&lt;script&gt;&amp;co** [wrote]"));
    }

    #[test]
    fn quote_escapes_quotes_in_username() {
        let quote = quote_post(&post("hi", "o'neil \"the\" great")).unwrap();

        assert!(quote.starts_with("**o&#39;neil &quot;the&quot; great** [wrote]"));
    }

    #[test]
    fn quote_through_trait_object() {
        let formatter = MarkdownFormatter::new();
        let post = post("hello", "bob");
        let post: &dyn Post = &post;

        assert_eq!(formatter.quote_post(post).unwrap(), quote_post(post).unwrap());
    }

    #[test]
    fn format_strips_script_and_trims() {
        let html = format_post_body("\n\n<script>alert('x')</script>\n\nHello *there*\n\n").unwrap();

        assert!(!html.contains("<script"));
        assert_eq!(html, "<p>[HTML_REMOVED]</p>\n<p>Hello <em>there</em></p>");
    }

    #[test]
    fn format_quoted_reply() {
        let quote = quote_post(&post("first\nsecond", "bob")).unwrap();
        let html = format_post_body(&quote).unwrap();

        assert_eq!(
            html,
            indoc! {r#"
                <p><strong>bob</strong> <a href="/posts/1" title="View quoted post">wrote</a>:</p>
                <blockquote>
                <p>first
                second</p>
                </blockquote>"#}
        );
    }

    #[test]
    fn format_with_emoticons() {
        let rule = EmoticonRule::new(EmoticonConfig::default()).unwrap();
        let formatter = MarkdownFormatter::with_renderer(Renderer::new().register(rule));

        let html = formatter.format_post_body("  nice :)\n\n").unwrap();

        assert_eq!(html, "<p>nice <img src=\"smile.gif\" alt=\":)\" /></p>");
    }

    #[test]
    fn formatter_from_config() {
        let config = Config::from_toml(indoc! {r#"
            [emoticons]
            base_url = "/static/e/"
        "#})
        .unwrap();

        let formatter = MarkdownFormatter::from_config(&config).unwrap();
        let html = formatter.format_post_body(":wub:").unwrap();

        assert_eq!(html, "<p><img src=\"/static/e/wub.gif\" alt=\":wub:\" /></p>");
    }
}
