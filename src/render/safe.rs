use std::mem;

use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{CowStr, Event, Tag};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Text substituted for raw HTML in [`SafeMode::Replace`].
pub const HTML_PLACEHOLDER: &str = "[HTML_REMOVED]";

/// How raw HTML embedded in Markdown source is treated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafeMode {
    /// Raw HTML is passed through untouched.
    Off,
    /// Raw HTML is replaced with [`HTML_PLACEHOLDER`].
    #[default]
    Replace,
    /// Raw HTML is dropped.
    Remove,
    /// Raw HTML is rendered as escaped text.
    Escape,
}

/// Applies `mode` to every raw HTML event in the stream.
///
/// Block-level HTML arrives from the parser as one event per line, so consecutive block events
/// are treated as a single run and replaced (or escaped) as one paragraph.
///
/// Tight list items carry their inline content without a paragraph around it. Inside an item,
/// HTML that does not end a line is inline.
pub(super) fn sanitize<'a>(events: Vec<Event<'a>>, mode: SafeMode) -> Result<Vec<Event<'a>>> {
    if mode == SafeMode::Off {
        return Ok(events);
    }

    let mut output = Vec::with_capacity(events.len());
    let mut inline_depth = 0_usize;
    let mut item_depth = 0_usize;
    let mut block = String::new();

    for event in events {
        match event {
            Event::Html(html)
                if inline_depth > 0 || (item_depth > 0 && !html.ends_with('\n')) =>
            {
                flush_block(&mut block, mode, &mut output)?;
                trace!("Neutralizing inline HTML {:?} ({mode:?}).", &*html);
                output.extend(neutralize_inline(html, mode)?);
            }
            Event::Html(html) => block.push_str(&html),
            event => {
                flush_block(&mut block, mode, &mut output)?;

                match &event {
                    Event::Start(tag) if is_inline_container(tag) => inline_depth += 1,
                    Event::End(tag) if is_inline_container(tag) => {
                        inline_depth = inline_depth.saturating_sub(1)
                    }
                    Event::Start(Tag::Item) => item_depth += 1,
                    Event::End(Tag::Item) => item_depth = item_depth.saturating_sub(1),
                    _ => {}
                }

                output.push(event);
            }
        }
    }
    flush_block(&mut block, mode, &mut output)?;

    Ok(output)
}

fn is_inline_container(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading(..)
            | Tag::TableCell
            | Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Link(..)
            | Tag::Image(..)
    )
}

/// Escaped HTML is emitted pre-escaped as an HTML event, so inline rules never match inside it.
fn neutralize_inline(html: CowStr<'_>, mode: SafeMode) -> Result<Option<Event<'_>>> {
    let event = match mode {
        SafeMode::Off => Event::Html(html),
        SafeMode::Replace => Event::Text(HTML_PLACEHOLDER.into()),
        SafeMode::Remove => return Ok(None),
        SafeMode::Escape => {
            let mut escaped = String::with_capacity(html.len());
            escape_html(&mut escaped, &html)?;
            Event::Html(escaped.into())
        }
    };

    Ok(Some(event))
}

fn flush_block(block: &mut String, mode: SafeMode, output: &mut Vec<Event<'_>>) -> Result<()> {
    if block.is_empty() {
        return Ok(());
    }

    let html = mem::take(block);
    debug!("Neutralizing {} bytes of block HTML ({mode:?}).", html.len());

    match mode {
        SafeMode::Off => output.push(Event::Html(html.into())),
        SafeMode::Replace => {
            output.push(Event::Html(format!("<p>{HTML_PLACEHOLDER}</p>\n").into()))
        }
        SafeMode::Remove => {}
        SafeMode::Escape => {
            let mut paragraph = String::from("<p>");
            escape_html(&mut paragraph, html.trim_end())?;
            paragraph.push_str("</p>\n");
            output.push(Event::Html(paragraph.into()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{html, Parser};

    use super::*;

    fn render(source: &str, mode: SafeMode) -> String {
        let events = sanitize(Parser::new(source).collect(), mode).unwrap();
        let mut output = String::new();
        html::push_html(&mut output, events.into_iter());
        output
    }

    #[test]
    fn replace_block() {
        let output = render("<script>alert('x')</script>\n\nHello", SafeMode::Replace);

        assert_eq!(output, "<p>[HTML_REMOVED]</p>\n<p>Hello</p>\n");
    }

    #[test]
    fn replace_inline() {
        let output = render("Hello <b>world</b>", SafeMode::Replace);

        assert_eq!(output, "<p>Hello [HTML_REMOVED]world[HTML_REMOVED]</p>\n");
    }

    #[test]
    fn remove() {
        let output = render("<div>gone</div>\n\nHello <b>world</b>", SafeMode::Remove);

        assert_eq!(output, "<p>Hello world</p>\n");
    }

    #[test]
    fn escape() {
        let inline = render("Hello <b>world</b>", SafeMode::Escape);
        let block = render("<div>x</div>", SafeMode::Escape);

        assert_eq!(inline, "<p>Hello &lt;b&gt;world&lt;/b&gt;</p>\n");
        assert_eq!(block, "<p>&lt;div&gt;x&lt;/div&gt;</p>\n");
    }

    #[test]
    fn escaped_html_is_not_text() {
        let events = sanitize(Parser::new("a <b>c</b>").collect(), SafeMode::Escape).unwrap();

        assert!(events.contains(&Event::Html(CowStr::Borrowed("&lt;b&gt;"))));
        assert!(!events.iter().any(|e| matches!(e, Event::Text(t) if t.contains('<'))));
    }

    #[test]
    fn tight_list_items() {
        let source = "- hi <b>x</b> there\n- plain";

        assert_eq!(
            render(source, SafeMode::Replace),
            "<ul>\n<li>hi [HTML_REMOVED]x[HTML_REMOVED] there</li>\n<li>plain</li>\n</ul>\n"
        );
        assert_eq!(
            render(source, SafeMode::Escape),
            "<ul>\n<li>hi &lt;b&gt;x&lt;/b&gt; there</li>\n<li>plain</li>\n</ul>\n"
        );
        assert_eq!(
            render(source, SafeMode::Remove),
            "<ul>\n<li>hi x there</li>\n<li>plain</li>\n</ul>\n"
        );
    }

    #[test]
    fn block_html_inside_list_item() {
        let output = render("- <div>\n  x\n  </div>", SafeMode::Replace);

        assert!(!output.contains("<div>"));
        assert!(output.contains("[HTML_REMOVED]"));
    }

    #[test]
    fn off() {
        let output = render("Hello <b>world</b>", SafeMode::Off);

        assert_eq!(output, "<p>Hello <b>world</b></p>\n");
    }

    #[test]
    fn code_is_untouched() {
        let output = render("`<b>`", SafeMode::Replace);

        assert_eq!(output, "<p><code>&lt;b&gt;</code></p>\n");
    }
}
