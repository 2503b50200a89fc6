//! Splitting multi-content `Extension` elements in a document.

use tracing::{debug, instrument};

use crate::domain::names::{node, TSL};
use crate::xml::document::{NodeId, XmlDocument};
use crate::xml::{XmlError, XmlResult};

/// Give every content element of `list` (a `ServiceInformationExtensions`
/// element) its own `Extension` wrapper.
///
/// New wrappers copy the attributes and namespace declarations of the
/// extension they were split from. Comments and other non-element nodes
/// move with the content element that follows them; trailing ones go to
/// the last wrapper. Returns whether anything was split.
#[instrument(level = "debug", skip(doc))]
pub fn wrap_extensions_individually(doc: &mut XmlDocument, list: NodeId) -> XmlResult<bool> {
    let mut changed = false;
    let mut rebuilt = Vec::new();

    for child in doc.children(list) {
        let content = doc.child_elements(child);
        if !doc.is_element(child, TSL, node::EXTENSION) || content.len() < 2 {
            rebuilt.push(child);
            continue;
        }

        let kind = doc.node(child).ok_or(XmlError::StaleNode)?.kind.clone();
        let mut pending = Vec::new();
        let mut last = None;
        for item in doc.children(child) {
            pending.push(item);
            if doc.element_name(item).is_none() {
                continue;
            }
            let wrapper = doc.create(kind.clone());
            for moved in pending.drain(..) {
                doc.append_child(wrapper, moved)?;
            }
            rebuilt.push(wrapper);
            last = Some(wrapper);
        }
        if let Some(wrapper) = last {
            for moved in pending {
                doc.append_child(wrapper, moved)?;
            }
        }
        doc.remove(child);
        changed = true;
    }

    if changed {
        debug!("split extensions into {} wrappers", rebuilt.len());
        doc.set_children(list, rebuilt)?;
    }
    Ok(changed)
}

/// Split the extensions of every service and history instance in the document.
/// Returns the number of extension lists that changed.
pub fn wrap_all_extensions(doc: &mut XmlDocument) -> XmlResult<usize> {
    let mut changed = 0;
    for list in doc.find_elements(TSL, node::SERVICE_INFORMATION_EXTENSIONS) {
        if wrap_extensions_individually(doc, list)? {
            changed += 1;
        }
    }
    Ok(changed)
}
