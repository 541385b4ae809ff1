use std::fmt::Debug;

use regex::Regex;

use super::expand::regexp_expand;
use super::{Fragment, Node};
use crate::prelude::*;

/// A "match and transform" rule applied to inline text during rendering.
///
/// Rules never see text inside code spans, code blocks or image alt text.
pub trait InlineRule: Debug + Send + Sync {
    /// Short identifying name, used in logs.
    fn name(&self) -> &str;

    /// The pattern whose matches are handed to [`InlineRule::handle_match`].
    /// A rule without a pattern matches nothing.
    fn pattern(&self) -> Option<&Regex>;

    /// Transforms one match into the node that replaces it.
    fn handle_match(&self, matched: &str) -> Result<Node>;

    /// Expands every non-overlapping match in `text`, scanning left to right.
    fn expand(&self, text: &str) -> Result<Fragment> {
        match self.pattern() {
            Some(pattern) => regexp_expand(text, pattern, |m| self.handle_match(m)),
            None => Ok(Fragment::text(text)),
        }
    }
}

/// Ordered set of inline rules registered with a [`Renderer`](super::Renderer).
#[derive(Debug, Default)]
pub struct Registry {
    rules: Vec<Box<dyn InlineRule>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule. Rules run in registration order.
    pub fn register(&mut self, rule: Box<dyn InlineRule>) {
        debug!("Registered inline rule \"{}\".", rule.name());
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over `text`. Each rule only sees the text nodes left behind by the rules before it.
    pub fn expand(&self, text: &str) -> Result<Fragment> {
        let mut fragment = Fragment::text(text);

        for rule in &self.rules {
            if rule.pattern().is_none() {
                continue;
            }

            let mut expanded = Fragment::default();
            for node in fragment {
                match node {
                    Node::Text(text) => expanded.extend(rule.expand(&text)?),
                    element => expanded.push(element),
                }
            }
            fragment = expanded;
        }

        Ok(fragment)
    }
}
