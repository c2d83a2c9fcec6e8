use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while parsing XML into an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input XML could not be decoded or tokenized.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Tag, attribute, or CDATA bytes were not valid UTF-8.
    #[error("invalid UTF-8 while parsing XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// A text entity could not be unescaped.
    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Failed to read input file.
    #[error("failed to read XML file: {0}")]
    Io(#[from] std::io::Error),
    /// Structural issue in XML document.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Open elements plus the finished root, if any.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<XmlNode>,
    root: Option<XmlNode>,
}

impl TreeBuilder {
    fn open(&mut self, node: XmlNode) {
        self.stack.push(node);
    }

    fn close(&mut self) -> Result<(), ParseError> {
        let mut node = self.stack.pop().ok_or_else(|| {
            ParseError::Malformed("encountered closing tag without open tag".to_string())
        })?;
        // Whitespace around child elements is layout; in a leaf it is content.
        let blank = node.text.as_deref().is_some_and(|t| t.trim().is_empty());
        if blank && !node.children.is_empty() {
            node.text = None;
        }
        self.attach(node)
    }

    fn attach(&mut self, node: XmlNode) -> Result<(), ParseError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        if self.root.is_some() {
            return Err(ParseError::Malformed(
                "multiple top-level elements found".to_string(),
            ));
        }
        self.root = Some(node);
        Ok(())
    }

    fn append_text(&mut self, text: &str) {
        let Some(current) = self.stack.last_mut() else {
            return;
        };
        match &mut current.text {
            Some(existing) => existing.push_str(text),
            None => current.text = Some(text.to_string()),
        }
    }

    fn finish(self) -> Result<XmlNode, ParseError> {
        if !self.stack.is_empty() {
            return Err(ParseError::Malformed(
                "unclosed element(s) at end of document".to_string(),
            ));
        }
        self.root
            .ok_or_else(|| ParseError::Malformed("no root element found".to_string()))
    }
}

/// Parse XML bytes into an [`XmlNode`] tree.
///
/// Declarations, processing instructions, doctypes and comments are dropped.
/// CDATA sections are folded into the element text.
pub fn parse(xml: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => builder.open(start_node(&e, &reader)?),
            Event::Empty(e) => builder.attach(start_node(&e, &reader)?)?,
            Event::End(_) => builder.close()?,
            Event::Text(e) => builder.append_text(&e.unescape()?),
            Event::CData(e) => builder.append_text(std::str::from_utf8(e.as_ref())?),
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    builder.finish()
}

/// Parse an XML file into an [`XmlNode`] tree.
pub fn parse_file(path: &Path) -> Result<XmlNode, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

fn start_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseError> {
    let mut node = XmlNode::new(qname_to_string(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(qname_to_string(attr.key)?, value);
    }

    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseError};

    #[test]
    fn cdata_and_text_join_into_one_value() {
        let node = parse(b"<rule><descr><![CDATA[LAN <ids>]]></descr></rule>").expect("parse");
        assert_eq!(node.get_text(&["descr"]), Some("LAN <ids>"));
    }

    #[test]
    fn whitespace_only_leaf_text_is_kept() {
        let node = parse(b"<rule>\n\t<descr> </descr>\n\t<uuid>1</uuid>\n</rule>").expect("parse");
        assert_eq!(node.get_text(&["descr"]), Some(" "));
        assert_eq!(node.text, None);
    }

    #[test]
    fn rejects_second_root() {
        let err = parse(b"<a/><b/>").expect_err("two roots");
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(parse(b"<pfsense><system>").is_err());
    }
}
