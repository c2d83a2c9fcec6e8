use std::collections::BTreeMap;

use serde::Serialize;

/// A flat view of an element's leaf children, keyed by tag.
pub type FieldMap = BTreeMap<String, String>;

/// A generic XML tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// XML attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements.
    pub children: Vec<XmlNode>,
    /// Optional text content. Empty text is stored as `None`.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new XML node with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create a leaf node carrying `text`.
    pub fn leaf(tag: impl Into<String>, text: &str) -> Self {
        let mut node = Self::new(tag);
        node.set_text(text);
        node
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return the first child with the provided tag, mutably.
    pub fn get_child_mut(&mut self, tag: &str) -> Option<&mut XmlNode> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Walk a nested child path. An empty path returns `self`.
    pub fn get_path(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter()
            .try_fold(self, |current, segment| current.get_child(segment))
    }

    /// Walk a nested child path mutably. An empty path returns `self`.
    pub fn get_path_mut(&mut self, path: &[&str]) -> Option<&mut XmlNode> {
        let mut current = self;
        for segment in path {
            current = current.get_child_mut(segment)?;
        }
        Some(current)
    }

    /// Walk a nested child path and return terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        self.get_path(path)?.text.as_deref()
    }

    /// Replace this node's text. An empty value clears it.
    pub fn set_text(&mut self, value: &str) {
        self.text = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    /// Return `true` when the node has no element children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Collect leaf children into a tag -> text map.
    ///
    /// Missing text maps to an empty string. Children that have their own
    /// children are skipped, and for repeated tags the first one wins.
    pub fn to_field_map(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        for child in self.children.iter().filter(|child| child.is_leaf()) {
            fields
                .entry(child.tag.clone())
                .or_insert_with(|| child.text.clone().unwrap_or_default());
        }
        fields
    }

    /// Write every entry of `fields` onto a leaf child of the same tag,
    /// appending children that do not exist yet.
    ///
    /// Returns `true` if any child was added or had its text changed.
    pub fn copy_fields(&mut self, fields: &FieldMap) -> bool {
        let mut changed = false;
        for (tag, value) in fields {
            match self.get_child_mut(tag) {
                Some(child) => {
                    if child.text.as_deref().unwrap_or_default() != value {
                        child.set_text(value);
                        changed = true;
                    }
                }
                None => {
                    self.children.push(XmlNode::leaf(tag.as_str(), value));
                    changed = true;
                }
            }
        }
        changed
    }

    /// Drop every leaf child whose tag is not accepted by `keep`.
    ///
    /// Returns the removed tags in document order.
    pub fn retain_fields<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = Vec::new();
        self.children.retain(|child| {
            if !child.is_leaf() || keep(&child.tag) {
                return true;
            }
            removed.push(child.tag.clone());
            false
        });
        removed
    }
}
