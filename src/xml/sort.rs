//! Recursive child sort for Trusted List collection elements.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::{instrument, trace};

use crate::domain::entities::{extension_label, OtherTslPointer};
use crate::domain::names::{node, DSIG, TSL};
use crate::domain::ordering::{compare_pointer_labels, compare_status_times, lexical, reverse_lexical};
use crate::xml::document::{NodeId, XmlDocument};
use crate::xml::reader::{preferred_name, read_time};
use crate::xml::XmlResult;

/// Sort key extracted from one collection entry.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(String),
    Time(Option<DateTime<Utc>>),
}

/// How the entries of one collection element are ordered.
struct Rule {
    parent: &'static str,
    child: &'static str,
    key: fn(&XmlDocument, NodeId) -> SortKey,
    compare: fn(&SortKey, &SortKey) -> Ordering,
}

const RULES: &[Rule] = &[
    Rule {
        parent: node::POINTERS_TO_OTHER_TSL,
        child: node::OTHER_TSL_POINTER,
        key: pointer_key,
        compare: compare_pointers,
    },
    Rule {
        parent: node::TRUST_SERVICE_PROVIDER_LIST,
        child: node::TRUST_SERVICE_PROVIDER,
        key: provider_key,
        compare: compare_reverse_lexical,
    },
    Rule {
        parent: node::TSP_SERVICES,
        child: node::TSP_SERVICE,
        key: service_key,
        compare: compare_lexical,
    },
    Rule {
        parent: node::SERVICE_HISTORY,
        child: node::SERVICE_HISTORY_INSTANCE,
        key: history_key,
        compare: compare_time,
    },
    Rule {
        parent: node::SERVICE_INFORMATION_EXTENSIONS,
        child: node::EXTENSION,
        key: extension_key,
        compare: compare_lexical,
    },
];

fn compare_text(a: &SortKey, b: &SortKey, order: fn(&str, &str) -> Ordering) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => order(a, b),
        _ => Ordering::Equal,
    }
}

fn compare_pointers(a: &SortKey, b: &SortKey) -> Ordering {
    compare_text(a, b, compare_pointer_labels)
}

fn compare_lexical(a: &SortKey, b: &SortKey) -> Ordering {
    compare_text(a, b, lexical)
}

fn compare_reverse_lexical(a: &SortKey, b: &SortKey) -> Ordering {
    compare_text(a, b, reverse_lexical)
}

fn compare_time(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Time(a), SortKey::Time(b)) => compare_status_times(a.as_ref(), b.as_ref()),
        _ => Ordering::Equal,
    }
}

fn pointer_key(doc: &XmlDocument, id: NodeId) -> SortKey {
    // MimeType lives in the additional types namespace, match on local names
    let text = |local: &str| {
        doc.descendants(id)
            .into_iter()
            .find(|&d| doc.local_name(d) == Some(local))
            .map(|n| doc.text_content(n).trim().to_string())
    };
    let territory = text(node::SCHEME_TERRITORY).unwrap_or_default();
    let mime_type = text(node::MIME_TYPE).unwrap_or_default();
    SortKey::Text(OtherTslPointer::label(&territory, &mime_type))
}

fn provider_key(doc: &XmlDocument, id: NodeId) -> SortKey {
    let names = doc.find_path(id, &[(TSL, node::TSP_INFORMATION), (TSL, node::TSP_NAME)]);
    SortKey::Text(names.and_then(|n| preferred_name(doc, n)).unwrap_or_default())
}

fn service_key(doc: &XmlDocument, id: NodeId) -> SortKey {
    let names = doc.find_path(id, &[(TSL, node::SERVICE_INFORMATION), (TSL, node::SERVICE_NAME)]);
    SortKey::Text(names.and_then(|n| preferred_name(doc, n)).unwrap_or_default())
}

fn history_key(doc: &XmlDocument, id: NodeId) -> SortKey {
    SortKey::Time(doc.child_text(id, TSL, node::STATUS_STARTING_TIME).and_then(|t| read_time(&t)))
}

fn extension_key(doc: &XmlDocument, id: NodeId) -> SortKey {
    let names: Vec<&str> = doc.child_elements(id).into_iter().filter_map(|c| doc.local_name(c)).collect();
    SortKey::Text(extension_label(names.into_iter()))
}

fn rule_for(doc: &XmlDocument, parent: NodeId) -> Option<&'static Rule> {
    RULES.iter().find(|rule| doc.is_element(parent, TSL, rule.parent))
}

/// Sort the children of `parent` and of every element below it.
///
/// Siblings are ordered by node name first. Entries of a collection
/// element then follow the rule of their collection; everything else keeps
/// its relative order inside its name group. `descending` reverses every
/// comparison. The signature subtree is left as it is.
#[instrument(level = "debug", skip(doc))]
pub fn sort_child_nodes(doc: &mut XmlDocument, parent: NodeId, descending: bool) -> XmlResult<()> {
    if doc.is_element(parent, DSIG, node::SIGNATURE) {
        return Ok(());
    }

    let rule = rule_for(doc, parent);
    let children = doc.children(parent);
    if children.len() > 1 {
        let mut keyed: Vec<(NodeId, String, Option<SortKey>)> = children
            .into_iter()
            .map(|c| {
                let key = rule
                    .filter(|rule| doc.is_element(c, TSL, rule.child))
                    .map(|rule| (rule.key)(doc, c));
                (c, doc.node_name(c), key)
            })
            .collect();

        keyed.sort_by(|(_, name_a, key_a), (_, name_b, key_b)| {
            let order = name_a.cmp(name_b).then_with(|| match (rule, key_a, key_b) {
                (Some(rule), Some(a), Some(b)) => (rule.compare)(a, b),
                _ => Ordering::Equal,
            });
            if descending {
                order.reverse()
            } else {
                order
            }
        });
        trace!("sorted {} children of {}", keyed.len(), doc.node_name(parent));
        doc.set_children(parent, keyed.into_iter().map(|(c, _, _)| c).collect())?;
    }

    for child in doc.child_elements(parent) {
        sort_child_nodes(doc, child, descending)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse::parse;
    use crate::xml::write::{to_string, WriteOptions};

    fn sorted_texts(source: &str, descending: bool, local: &str) -> Vec<String> {
        let mut doc = parse(source).unwrap();
        let root = doc.root().unwrap();
        sort_child_nodes(&mut doc, root, descending).unwrap();
        doc.find_elements(TSL, local)
            .into_iter()
            .map(|n| doc.text_content(n))
            .collect()
    }

    const SERVICES: &str = r#"<TSPServices xmlns="http://uri.etsi.org/02231/v2#">
        <TSPService><ServiceInformation><ServiceName><Name xml:lang="en">b</Name></ServiceName></ServiceInformation></TSPService>
        <TSPService><ServiceInformation><ServiceName><Name xml:lang="de">x</Name><Name xml:lang="en">a</Name></ServiceName></ServiceInformation></TSPService>
        <TSPService><ServiceInformation><ServiceName><Name xml:lang="en">c</Name></ServiceName></ServiceInformation></TSPService>
    </TSPServices>"#;

    #[test]
    fn given_services_when_sorted_then_preferred_names_ascending() {
        assert_eq!(sorted_texts(SERVICES, false, node::NAME), vec!["x", "a", "b", "c"]);
    }

    #[test]
    fn given_services_when_sorted_descending_then_order_reversed() {
        assert_eq!(sorted_texts(SERVICES, true, node::NAME), vec!["c", "b", "x", "a"]);
    }

    #[test]
    fn given_history_without_time_when_sorted_then_goes_last() {
        let source = r#"<ServiceHistory xmlns="http://uri.etsi.org/02231/v2#">
            <ServiceHistoryInstance><ServiceStatus>none</ServiceStatus></ServiceHistoryInstance>
            <ServiceHistoryInstance><StatusStartingTime>2020-01-01T00:00:00Z</StatusStartingTime></ServiceHistoryInstance>
            <ServiceHistoryInstance><StatusStartingTime>2016-06-30T22:00:00Z</StatusStartingTime></ServiceHistoryInstance>
        </ServiceHistory>"#;
        let mut doc = parse(source).unwrap();
        let root = doc.root().unwrap();
        sort_child_nodes(&mut doc, root, false).unwrap();

        let keys: Vec<String> = doc.children(root).into_iter().map(|c| doc.text_content(c)).collect();
        assert_eq!(keys, vec!["2016-06-30T22:00:00Z", "2020-01-01T00:00:00Z", "none"]);
    }

    fn sorted_compact(source: &str, descending: bool) -> String {
        let mut doc = parse(source).unwrap();
        let root = doc.root().unwrap();
        sort_child_nodes(&mut doc, root, descending).unwrap();
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
    fn given_element_without_rule_when_sorted_then_children_by_node_name() {
        assert_eq!(sorted_compact("<root><b/><a/></root>", false), "<root><a/><b/></root>");
        assert_eq!(sorted_compact("<root><a/><c/><b/></root>", true), "<root><c/><b/><a/></root>");
    }

    #[test]
    fn given_same_named_children_without_rule_when_sorted_then_keep_order() {
        let source = r#"<TSPName xmlns="http://uri.etsi.org/02231/v2#"><Name xml:lang="en">b</Name><Name xml:lang="de">a</Name></TSPName>"#;
        assert_eq!(sorted_compact(source, false), source);
        assert_eq!(sorted_compact(source, true), source);
    }

    #[test]
    fn given_nested_elements_without_rule_when_sorted_then_every_level_ordered() {
        assert_eq!(
            sorted_compact("<root><z><y/><x/></z><m/></root>", false),
            "<root><m/><z><x/><y/></z></root>"
        );
    }

    #[test]
    fn given_signature_when_sorted_then_subtree_untouched() {
        let source = r#"<root><ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:SignedInfo/><ds:SignatureValue>v</ds:SignatureValue></ds:Signature></root>"#;
        assert_eq!(sorted_compact(source, false), source);
    }

    #[test]
    fn given_comment_between_entries_when_sorted_then_entries_still_ordered() {
        let source = r#"<SomeList xmlns="http://uri.etsi.org/02231/v2#"><TSPServices>
            <TSPService><ServiceInformation><ServiceName><Name xml:lang="en">z</Name></ServiceName></ServiceInformation></TSPService>
            <!-- note -->
            <TSPService><ServiceInformation><ServiceName><Name xml:lang="en">m</Name></ServiceName></ServiceInformation></TSPService>
        </TSPServices></SomeList>"#;
        assert_eq!(sorted_texts(source, false, node::NAME), vec!["m", "z"]);
    }
}
