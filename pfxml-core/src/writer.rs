use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while writing XML from an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize XML bytes.
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Failed to write output file.
    #[error("failed to write XML file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize an [`XmlNode`] tree into XML bytes.
///
/// Output starts with an XML declaration and is indented with one tab per
/// level, matching the layout pfSense writes for `config.xml`.
pub fn write(node: &XmlNode) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    write_node(&mut writer, node)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize an [`XmlNode`] tree and write it to `path`.
pub fn write_file(node: &XmlNode, path: &Path) -> Result<(), WriteError> {
    let bytes = write(node)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(node.tag.as_str());
    start.extend_attributes(
        node.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );

    // Blank text next to child elements would only fight the indentation.
    let text = node
        .text
        .as_deref()
        .filter(|text| !text.is_empty())
        .filter(|text| node.children.is_empty() || !text.trim().is_empty());
    if node.children.is_empty() && text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write;
    use crate::XmlNode;

    #[test]
    fn writes_declaration_and_escapes_text() {
        let mut root = XmlNode::new("pfsense");
        root.children.push(XmlNode::leaf("descr", "a<b"));
        root.children.push(XmlNode::new("empty"));

        let out = String::from_utf8(write(&root).expect("write")).expect("utf8");
        assert!(out.starts_with("<?xml version=\"1.0\"?>"));
        assert!(out.contains("<descr>a&lt;b</descr>"));
        assert!(out.contains("<empty/>"));
    }

    #[test]
    fn blank_text_kept_in_leaves_only() {
        let mut rule = XmlNode::new("rule");
        rule.text = Some("\n\t".to_string());
        rule.children.push(XmlNode::leaf("descr", " "));

        let out = String::from_utf8(write(&rule).expect("write")).expect("utf8");
        assert!(out.contains("<descr> </descr>"));
        assert!(out.contains("<rule>\n\t<descr>"));
    }
}
