//! Splitting of multi-content extensions on the typed model.

use tracing::debug;

use crate::domain::entities::{Extension, TrustStatusList};

/// Replace every extension holding more than one content item by one
/// extension per item, each inheriting the original `critical` flag.
///
/// The list is rebuilt in place, keeping the order of the originals and of
/// the items inside a split extension. Returns whether anything was split.
pub fn wrap_extensions_individually(extensions: &mut Vec<Extension>) -> bool {
    let mut split = false;
    let mut rebuilt = Vec::with_capacity(extensions.len());

    for extension in extensions.drain(..) {
        if extension.content.len() > 1 {
            split = true;
            let critical = extension.critical;
            rebuilt.extend(
                extension
                    .content
                    .into_iter()
                    .map(|content| Extension::new(critical, vec![content])),
            );
        } else {
            rebuilt.push(extension);
        }
    }

    *extensions = rebuilt;
    split
}

/// Apply [`wrap_extensions_individually`] to every extension list of a document.
pub fn wrap_all_extensions(list: &mut TrustStatusList) -> bool {
    let mut split = false;
    for service in list.providers.iter_mut().flat_map(|p| p.services.iter_mut()) {
        split |= wrap_extensions_individually(&mut service.extensions);
        for instance in &mut service.history {
            split |= wrap_extensions_individually(&mut instance.extensions);
        }
    }
    if split {
        debug!("split multi-content extensions");
    }
    split
}
