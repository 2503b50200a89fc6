//! Serializing an [`XmlDocument`] via `quick-xml`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::instrument;

use crate::xml::document::{NodeId, XmlDocument, XmlNodeKind};
use crate::xml::{XmlError, XmlResult};

/// Output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

/// Serialize the document to a UTF-8 string.
#[instrument(level = "debug", skip(doc))]
pub fn to_string(doc: &XmlDocument, options: WriteOptions) -> XmlResult<String> {
    let root = doc.root().ok_or_else(|| XmlError::Structure("document has no root element".into()))?;
    node_to_string(doc, root, options)
}

/// Serialize the subtree rooted at `id`.
pub fn node_to_string(doc: &XmlDocument, id: NodeId, options: WriteOptions) -> XmlResult<String> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', options.indent)
    } else {
        Writer::new(Vec::new())
    };

    if options.declaration {
        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    write_node(doc, id, &mut writer)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| XmlError::Serialize(e.to_string()))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Serialize(e.to_string()))
}

fn write_node(doc: &XmlDocument, id: NodeId, writer: &mut Writer<Vec<u8>>) -> XmlResult<()> {
    let node = doc.node(id).ok_or(XmlError::StaleNode)?;
    match &node.kind {
        XmlNodeKind::Element {
            name,
            attributes,
            namespaces,
        } => {
            let qualified = name.qualified();
            let mut start = BytesStart::new(qualified.as_str());
            for decl in namespaces {
                let key = match &decl.prefix {
                    Some(prefix) => format!("xmlns:{prefix}"),
                    None => "xmlns".to_string(),
                };
                start.push_attribute((key.as_str(), decl.uri.as_str()));
            }
            for attr in attributes {
                let key = attr.name.qualified();
                start.push_attribute((key.as_str(), attr.value.as_str()));
            }

            if node.children.is_empty() {
                return emit(writer, Event::Empty(start));
            }
            emit(writer, Event::Start(start))?;
            for &child in &node.children {
                write_node(doc, child, writer)?;
            }
            emit(writer, Event::End(BytesEnd::new(qualified.as_str())))
        }
        XmlNodeKind::Text(text) => emit(writer, Event::Text(BytesText::new(text))),
        XmlNodeKind::Comment(text) => emit(writer, Event::Comment(BytesText::from_escaped(text.as_str()))),
        XmlNodeKind::ProcessingInstruction { target, value } => {
            let content = match value {
                Some(value) => format!("{target} {value}"),
                None => target.clone(),
            };
            emit(writer, Event::PI(BytesPI::new(content)))
        }
    }
}
