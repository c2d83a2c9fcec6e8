//! In-memory pfSense configuration document.
//!
//! A document is loaded once per invocation, mutated in place by the
//! reconcilers and written back at most once by [`ConfigDocument::save`].

use std::io::Write;
use std::path::{Path, PathBuf};

use pfxml_core::{parse, parse_file, write, FieldMap, ParseError, WriteError, XmlNode};
use thiserror::Error;

/// Errors raised while loading or saving a configuration document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse config {path}: {source}")]
    Parse { path: String, source: ParseError },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] WriteError),
    #[error("failed to write config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Revision metadata stamped on the root element at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub time: u64,
    pub description: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: XmlNode,
    source: Option<PathBuf>,
}

impl ConfigDocument {
    /// Load and parse `config.xml` from disk.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let root = parse_file(path).map_err(|source| DocumentError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            root,
            source: Some(path.to_path_buf()),
        })
    }

    /// Parse a document held in memory.
    pub fn from_bytes(xml: &[u8]) -> Result<Self, DocumentError> {
        let root = parse(xml).map_err(|source| DocumentError::Parse {
            path: "<memory>".to_string(),
            source,
        })?;
        Ok(Self { root, source: None })
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// Path the document was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Look up a nested section below the root, e.g. `["installedpackages", "suricata"]`.
    pub fn get_element(&self, path: &[&str]) -> Option<&XmlNode> {
        self.root.get_path(path)
    }

    pub fn get_element_mut(&mut self, path: &[&str]) -> Option<&mut XmlNode> {
        self.root.get_path_mut(path)
    }

    /// Build a detached element to be filled and appended to a collection.
    pub fn new_element(tag: &str) -> XmlNode {
        XmlNode::new(tag)
    }

    /// Copy record fields onto `element`. Returns `true` if anything changed.
    pub fn copy_fields_to_element(fields: &FieldMap, element: &mut XmlNode) -> bool {
        element.copy_fields(fields)
    }

    pub fn element_to_map(element: &XmlNode) -> FieldMap {
        element.to_field_map()
    }

    /// Replace the root `<revision>` block, creating it when missing.
    pub fn stamp_revision(&mut self, revision: &Revision) {
        let mut node = XmlNode::new("revision");
        node.children
            .push(XmlNode::leaf("time", &revision.time.to_string()));
        node.children
            .push(XmlNode::leaf("description", &revision.description));
        node.children
            .push(XmlNode::leaf("username", &revision.username));

        match self.root.get_child_mut("revision") {
            Some(existing) => *existing = node,
            None => {
                // pfSense keeps revision right after version.
                let at = self
                    .root
                    .children
                    .iter()
                    .position(|child| child.tag == "version")
                    .map_or(0, |idx| idx + 1);
                self.root.children.insert(at, node);
            }
        }
    }

    /// Serialize the document and atomically replace `path` with it.
    ///
    /// The bytes go to a temporary file in the destination directory first,
    /// so a failure leaves the previous file untouched.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let bytes = write(&self.root)?;
        let io_err = |source: std::io::Error| DocumentError::Io {
            path: path.display().to_string(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|err| io_err(err.error))?;
        Ok(())
    }
}
