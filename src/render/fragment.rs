use pulldown_cmark::escape::escape_html;

use crate::prelude::*;

/// A single node of a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// A void HTML element with ordered attributes, such as `<img src="..." alt="..." />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets an attribute, keeping its original position if it was already present.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Serializes the element into `out`. Attribute values are entity-escaped.
    pub fn write_html(&self, out: &mut String) -> Result<()> {
        out.push('<');
        out.push_str(&self.tag);

        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_html(&mut *out, value)?;
            out.push('"');
        }

        out.push_str(" />");
        Ok(())
    }

    pub fn to_html(&self) -> Result<String> {
        let mut html = String::new();
        self.write_html(&mut html)?;
        Ok(html)
    }
}

/// A flat run of text and elements produced by expanding inline rules over a piece of text.
///
/// Adjacent text nodes are always coalesced, and empty text nodes are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment(Vec<Node>);

impl Fragment {
    pub fn text(text: &str) -> Self {
        let mut fragment = Fragment::default();
        fragment.push_text(text);
        fragment
    }

    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.0.last_mut() {
            Some(Node::Text(previous)) => previous.push_str(text),
            _ => self.0.push(Node::Text(text.to_owned())),
        }
    }

    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text(text) => self.push_text(&text),
            element => self.0.push(element),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.0.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns `true` if no inline rule produced an element.
    pub fn is_plain(&self) -> bool {
        self.0.iter().all(|node| matches!(node, Node::Text(_)))
    }

}

impl Extend<Node> for Fragment {
    fn extend<T: IntoIterator<Item = Node>>(&mut self, iter: T) {
        for node in iter {
            self.push(node);
        }
    }
}

impl IntoIterator for Fragment {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_coalesces() {
        let mut fragment = Fragment::text("Hello");
        fragment.push_text("");
        fragment.push(Node::Text(", world".to_owned()));

        assert_eq!(fragment.nodes(), &[Node::Text("Hello, world".to_owned())]);
        assert!(fragment.is_plain());
    }

    #[test]
    fn element_attributes() {
        let element = Element::new("img")
            .with_attribute("src", "a.gif")
            .with_attribute("alt", ":)")
            .with_attribute("src", "b.gif");

        assert_eq!(element.attribute("src"), Some("b.gif"));
        assert_eq!(
            element.attributes().collect::<Vec<_>>(),
            vec![("src", "b.gif"), ("alt", ":)")]
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let element = Element::new("img").with_attribute("alt", "\"<3\" & co");

        assert_eq!(
            element.to_html().unwrap(),
            "<img alt=\"&quot;&lt;3&quot; &amp; co\" />"
        );
    }
}
