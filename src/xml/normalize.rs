//! Pruning of empty structure before a document is signed or saved.
//!
//! Bound form fields that were never filled in serialize as empty elements
//! or as the "no selection" placeholder. These are removed bottom-up, except
//! for elements the schema requires to be present.

use tracing::{instrument, trace};

use crate::domain::duplicate::clean_item;
use crate::domain::names::{attr, node, DSIG, NO_SELECTION_ENTRY, TSL};
use crate::xml::document::{NodeId, XmlDocument};

/// Remove empty nodes and placeholder attributes below `node`, bottom-up.
///
/// A child is removed when it has no children left and its text content is
/// empty or the placeholder, or when it is a TSL `URI` whose content starts
/// with the placeholder. `ds:Signature` subtrees are never entered, and
/// `NextUpdate`, populated `Qualifier` and `Qualifiers` elements are kept.
/// `node` itself is never removed.
#[instrument(level = "debug", skip(doc))]
pub fn remove_empty_nodes_from_the_bottom(doc: &mut XmlDocument, node: NodeId) {
    prune(doc, node);
}

/// Returns whether `id` kept any attribute.
fn prune(doc: &mut XmlDocument, id: NodeId) -> bool {
    if is_signature(doc, id) {
        return doc.has_attributes(id);
    }
    let has_attributes = clean_attributes(doc, id);

    for child in doc.children(id) {
        if is_signature(doc, child) {
            continue;
        }
        let child_has_attributes = prune(doc, child);
        if is_removable(doc, child) && !is_exception(doc, child, child_has_attributes) {
            trace!("removing empty node {}", doc.node_name(child));
            doc.remove(child);
        }
    }
    has_attributes
}

fn is_signature(doc: &XmlDocument, id: NodeId) -> bool {
    doc.is_element(id, DSIG, node::SIGNATURE)
}

fn is_removable(doc: &XmlDocument, id: NodeId) -> bool {
    let text = doc.text_content(id);
    let empty = text.is_empty() || text == NO_SELECTION_ENTRY;
    if empty && !doc.has_children(id) {
        return true;
    }
    doc.is_element(id, TSL, node::URI) && text.starts_with(NO_SELECTION_ENTRY)
}

/// Strip duplication tags from `lang` attributes and drop placeholder
/// attributes. Returns whether any attribute survived.
fn clean_attributes(doc: &mut XmlDocument, id: NodeId) -> bool {
    let Some(attributes) = doc.attributes_mut(id) else {
        return false;
    };
    for attribute in attributes.iter_mut().filter(|a| a.name.local == attr::LANG) {
        let cleaned = clean_item(&attribute.value).to_string();
        attribute.value = cleaned;
    }
    attributes.retain(|a| a.value != NO_SELECTION_ENTRY);
    !attributes.is_empty()
}

/// Elements that must survive even when empty.
fn is_exception(doc: &XmlDocument, id: NodeId, has_attributes: bool) -> bool {
    match doc.local_name(id) {
        Some(node::NEXT_UPDATE) => true,
        Some(node::QUALIFIER) => has_attributes,
        Some(node::QUALIFIERS) => doc
            .descendants(id)
            .into_iter()
            .skip(1)
            .any(|d| is_exception(doc, d, doc.has_attributes(d))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse::parse;
    use crate::xml::write::{to_string, WriteOptions};

    fn normalized(source: &str) -> String {
        let mut doc = parse(source).unwrap();
        let root = doc.root().unwrap();
        remove_empty_nodes_from_the_bottom(&mut doc, root);
        to_string(
            &doc,
            WriteOptions {
                indent: 0,
                declaration: false,
            },
        )
        .unwrap()
        .trim_end()
        .to_string()
    }

    #[test]
    fn given_nested_empty_elements_when_normalized_then_removed_bottom_up() {
        let out = normalized(
            r#"<a xmlns="http://uri.etsi.org/02231/v2#"><b><c/><d></d></b><e>keep</e></a>"#,
        );
        assert_eq!(out, r#"<a xmlns="http://uri.etsi.org/02231/v2#"><e>keep</e></a>"#);
    }

    #[test]
    fn given_placeholder_text_when_normalized_then_element_removed() {
        let out = normalized(r#"<a><b>----</b><c>value</c></a>"#);
        assert_eq!(out, "<a><c>value</c></a>");
    }

    #[test]
    fn given_uri_starting_with_placeholder_when_normalized_then_removed() {
        let out = normalized(
            r#"<a xmlns="http://uri.etsi.org/02231/v2#"><URI>----http://example.org</URI><URI>http://example.org</URI></a>"#,
        );
        assert_eq!(
            out,
            r#"<a xmlns="http://uri.etsi.org/02231/v2#"><URI>http://example.org</URI></a>"#
        );
    }

    #[test]
    fn given_uri_outside_tsl_namespace_when_normalized_then_kept() {
        let out = normalized(r#"<a><URI>----http://example.org</URI></a>"#);
        assert_eq!(out, "<a><URI>----http://example.org</URI></a>");
    }

    #[test]
    fn given_tagged_lang_when_normalized_then_tag_stripped() {
        let out = normalized(r#"<a><Name xml:lang="en_2">Name</Name></a>"#);
        assert_eq!(out, r#"<a><Name xml:lang="en">Name</Name></a>"#);
    }

    #[test]
    fn given_placeholder_attribute_when_normalized_then_attribute_removed() {
        let out = normalized(r#"<a><b kind="----" keep="yes">x</b></a>"#);
        assert_eq!(out, r#"<a><b keep="yes">x</b></a>"#);
    }

    #[test]
    fn given_empty_next_update_when_normalized_then_kept() {
        let out = normalized(r#"<a><NextUpdate/></a>"#);
        assert_eq!(out, "<a><NextUpdate/></a>");
    }

    #[test]
    fn given_qualifier_with_uri_when_normalized_then_qualifiers_kept() {
        let out = normalized(r#"<a><Qualifiers><Qualifier uri="http://q"/></Qualifiers></a>"#);
        assert_eq!(out, r#"<a><Qualifiers><Qualifier uri="http://q"/></Qualifiers></a>"#);
    }

    #[test]
    fn given_qualifier_with_placeholder_uri_when_normalized_then_both_removed() {
        let out = normalized(r#"<a><Qualifiers><Qualifier uri="----"/></Qualifiers><b>x</b></a>"#);
        assert_eq!(out, "<a><b>x</b></a>");
    }
}
