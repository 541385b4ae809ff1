use pulldown_cmark::{Event, Tag};
use regex::Regex;

use super::{Fragment, Node, Registry};
use crate::prelude::*;

/// Fine-tuned version of [`Regex::replace_all()`].
/// - Uses the fast (match only, no capture) path.
/// - Builds a [`Fragment`] rather than a flat string, so replacements can be elements.
/// - Error-aware; the replacement closure has a return type of [`Result<Node>`].
pub(super) fn regexp_expand(
    source: &str,
    expression: &Regex,
    mut replacer: impl FnMut(&str) -> Result<Node>,
) -> Result<Fragment> {
    let mut matches = expression.find_iter(source).peekable();
    if matches.peek().is_none() {
        return Ok(Fragment::text(source));
    }

    let mut fragment = Fragment::default();
    let mut last_match = 0;
    for m in matches {
        let replacement = replacer(m.as_str())?;
        fragment.push_text(&source[last_match..m.start()]);
        fragment.push(replacement);
        last_match = m.end();
    }
    fragment.push_text(&source[last_match..]);

    Ok(fragment)
}

/// Coalesces runs of adjacent [`Event::Text`] so that inline rules can match across the
/// boundaries the parser leaves behind (around punctuation, for instance).
pub(super) fn merge_text(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut merged: Vec<Event> = Vec::with_capacity(events.len());

    for event in events {
        if let Event::Text(text) = &event {
            if let Some(Event::Text(previous)) = merged.last_mut() {
                let mut joined = String::from(&**previous);
                joined.push_str(text);
                *previous = joined.into();
                continue;
            }
        }
        merged.push(event);
    }

    merged
}

/// Runs the registry over every text event outside code blocks and image alt text.
/// Elements are emitted as raw HTML events, after safe mode has already been applied.
pub(super) fn expand_events<'a>(events: Vec<Event<'a>>, registry: &Registry) -> Result<Vec<Event<'a>>> {
    if registry.is_empty() {
        return Ok(events);
    }

    let mut output = Vec::with_capacity(events.len());
    let mut verbatim = 0_usize;

    for event in events {
        match event {
            Event::Start(tag @ (Tag::CodeBlock(_) | Tag::Image(..))) => {
                verbatim += 1;
                output.push(Event::Start(tag));
            }
            Event::End(tag @ (Tag::CodeBlock(_) | Tag::Image(..))) => {
                verbatim = verbatim.saturating_sub(1);
                output.push(Event::End(tag));
            }
            Event::Text(text) if verbatim == 0 => {
                let fragment = registry.expand(&text)?;
                if fragment.is_plain() {
                    output.push(Event::Text(text));
                    continue;
                }

                trace!("Expanded inline text {:?} into {} nodes.", &*text, fragment.nodes().len());

                for node in fragment {
                    match node {
                        Node::Text(text) => output.push(Event::Text(text.into())),
                        Node::Element(element) => output.push(Event::Html(element.to_html()?.into())),
                    }
                }
            }
            event => output.push(event),
        }
    }

    Ok(output)
}
