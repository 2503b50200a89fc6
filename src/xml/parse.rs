//! Building an [`XmlDocument`] from text via `roxmltree`.

use tracing::{debug, instrument};

use crate::domain::names::XML;
use crate::xml::document::{Attribute, NamespaceDecl, NodeId, QName, XmlDocument, XmlNodeKind};
use crate::xml::{XmlError, XmlResult};

/// Parsing options: DTDs are allowed since roxmltree never expands
/// external entities.
fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Parse XML text into a mutable document.
///
/// Whitespace-only text nodes are dropped: Trusted Lists are data-oriented
/// and the writer re-indents on output.
#[instrument(level = "debug", skip_all)]
pub fn parse(text: &str) -> XmlResult<XmlDocument> {
    let source = roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| XmlError::Parse(e.to_string()))?;

    let mut doc = XmlDocument::new();
    let root = build(&mut doc, source.root_element());
    doc.set_root(root);
    debug!("parsed document with {} nodes", doc.len());
    Ok(doc)
}

/// Parse XML bytes, which must be UTF-8.
pub fn parse_bytes(data: &[u8]) -> XmlResult<XmlDocument> {
    let text = std::str::from_utf8(data).map_err(|e| XmlError::Parse(format!("invalid UTF-8: {e}")))?;
    parse(text)
}

fn build(doc: &mut XmlDocument, source: roxmltree::Node<'_, '_>) -> NodeId {
    let id = doc.create(element_kind(source));
    for child in source.children() {
        let kind = match child.node_type() {
            roxmltree::NodeType::Element => {
                let child_id = build(doc, child);
                attach(doc, id, child_id);
                continue;
            }
            roxmltree::NodeType::Text => match child.text() {
                Some(text) if !text.trim().is_empty() => XmlNodeKind::Text(text.to_string()),
                _ => continue,
            },
            roxmltree::NodeType::Comment => XmlNodeKind::Comment(child.text().unwrap_or_default().to_string()),
            roxmltree::NodeType::PI => match child.pi() {
                Some(pi) => XmlNodeKind::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(str::to_string),
                },
                None => continue,
            },
            roxmltree::NodeType::Root => continue,
        };
        let child_id = doc.create(kind);
        attach(doc, id, child_id);
    }
    id
}

fn attach(doc: &mut XmlDocument, parent: NodeId, child: NodeId) {
    // both handles were just created, appending cannot fail
    let _ = doc.append_child(parent, child);
}

fn element_kind(node: roxmltree::Node<'_, '_>) -> XmlNodeKind {
    let tag = node.tag_name();
    let name = QName {
        namespace: tag.namespace().map(str::to_string),
        prefix: tag.namespace().and_then(|ns| element_prefix(node, ns)),
        local: tag.name().to_string(),
    };

    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: QName {
                namespace: attr.namespace().map(str::to_string),
                prefix: attr.namespace().and_then(|ns| attribute_prefix(node, ns)),
                local: attr.name().to_string(),
            },
            value: attr.value().to_string(),
        })
        .collect();

    XmlNodeKind::Element {
        name,
        attributes,
        namespaces: declared_namespaces(node),
    }
}

/// Namespaces in scope on `node` that its parent does not already have.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<NamespaceDecl> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.uri() != XML)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect()
}

/// Elements prefer the default namespace when it matches.
fn element_prefix(node: roxmltree::Node<'_, '_>, ns: &str) -> Option<String> {
    let mut prefixed = None;
    for decl in node.namespaces().filter(|decl| decl.uri() == ns) {
        match decl.name() {
            None => return None,
            Some(prefix) => {
                prefixed.get_or_insert(prefix);
            }
        }
    }
    prefixed.map(str::to_string)
}

/// The default namespace never applies to attributes, so a prefix is required.
fn attribute_prefix(node: roxmltree::Node<'_, '_>, ns: &str) -> Option<String> {
    if ns == XML {
        return Some("xml".to_string());
    }
    node.namespaces()
        .find(|decl| decl.uri() == ns && decl.name().is_some())
        .and_then(|decl| decl.name())
        .map(str::to_string)
}
