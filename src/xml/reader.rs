//! Mapping a parsed Trusted List document onto the typed domain records.
//!
//! Reading is lenient: missing optional elements become empty values, only
//! a wrong document element is an error.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::domain::entities::{
    AdditionalServiceInformation, Extension, ExtensionContent, MultiLangName, OtherTslPointer, QualificationElement,
    SchemeInformation, ServiceHistoryInstance, ServiceInformation, TakenOverBy, TrustServiceProvider, TrustStatusList,
    TspInformation, TspService,
};
use crate::domain::names::{attr, node, ECC, TSL};
use crate::xml::document::{NodeId, XmlDocument};
use crate::xml::{XmlError, XmlResult};

/// Parse an `xs:dateTime` value into UTC.
pub fn read_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// `Name` children of a multilingual element.
pub fn read_names(doc: &XmlDocument, id: NodeId) -> Vec<MultiLangName> {
    doc.child_elements(id)
        .into_iter()
        .filter(|&c| doc.local_name(c) == Some(node::NAME))
        .map(|c| {
            MultiLangName::new(
                doc.attribute(c, attr::LANG).unwrap_or_default(),
                doc.text_content(c).trim(),
            )
        })
        .collect()
}

/// Display name of a multilingual element: English, else the first name.
pub fn preferred_name(doc: &XmlDocument, id: NodeId) -> Option<String> {
    MultiLangName::preferred(&read_names(doc, id)).map(str::to_string)
}

fn text(doc: &XmlDocument, id: NodeId, local: &str) -> String {
    doc.child_text(id, TSL, local).unwrap_or_default()
}

fn names(doc: &XmlDocument, id: NodeId, local: &str) -> Vec<MultiLangName> {
    doc.find_child(id, TSL, local)
        .map(|n| read_names(doc, n))
        .unwrap_or_default()
}

/// Read the whole document into a [`TrustStatusList`].
#[instrument(level = "debug", skip(doc))]
pub fn read_trust_status_list(doc: &XmlDocument) -> XmlResult<TrustStatusList> {
    let root = doc
        .root()
        .filter(|&r| doc.is_element(r, TSL, node::TRUST_SERVICE_STATUS_LIST))
        .ok_or_else(|| XmlError::MissingElement(node::TRUST_SERVICE_STATUS_LIST.to_string()))?;

    let scheme_info = doc.find_child(root, TSL, node::SCHEME_INFORMATION);
    let scheme = scheme_info.map(|s| read_scheme(doc, s)).unwrap_or_default();

    let pointers = scheme_info
        .and_then(|s| doc.find_child(s, TSL, node::POINTERS_TO_OTHER_TSL))
        .map(|p| {
            doc.find_children(p, TSL, node::OTHER_TSL_POINTER)
                .into_iter()
                .map(|ptr| read_pointer(doc, ptr))
                .collect()
        })
        .unwrap_or_default();

    let providers: Vec<TrustServiceProvider> = doc
        .find_child(root, TSL, node::TRUST_SERVICE_PROVIDER_LIST)
        .map(|list| {
            doc.find_children(list, TSL, node::TRUST_SERVICE_PROVIDER)
                .into_iter()
                .map(|tsp| read_provider(doc, tsp))
                .collect()
        })
        .unwrap_or_default();

    debug!("read list for '{}' with {} providers", scheme.territory, providers.len());
    Ok(TrustStatusList {
        scheme,
        pointers,
        providers,
    })
}

fn read_scheme(doc: &XmlDocument, id: NodeId) -> SchemeInformation {
    let sequence = text(doc, id, node::TSL_SEQUENCE_NUMBER);
    let sequence_number = match sequence.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) if sequence.is_empty() => None,
        Err(e) => {
            warn!("ignoring invalid sequence number '{}': {}", sequence, e);
            None
        }
    };
    let next_update = doc
        .find_path(id, &[(TSL, node::NEXT_UPDATE), (TSL, node::DATE_TIME)])
        .and_then(|n| read_time(&doc.text_content(n)));

    SchemeInformation {
        sequence_number,
        tsl_type: text(doc, id, node::TSL_TYPE),
        operator_names: names(doc, id, node::SCHEME_OPERATOR_NAME),
        territory: text(doc, id, node::SCHEME_TERRITORY),
        next_update,
    }
}

fn read_pointer(doc: &XmlDocument, id: NodeId) -> OtherTslPointer {
    let mut pointer = OtherTslPointer {
        location: text(doc, id, node::TSL_LOCATION),
        ..OtherTslPointer::default()
    };
    let infos = doc
        .find_child(id, TSL, node::ADDITIONAL_INFORMATION)
        .map(|a| doc.find_children(a, TSL, node::OTHER_INFORMATION))
        .unwrap_or_default();

    for info in infos {
        for field in doc.child_elements(info) {
            let value = doc.text_content(field).trim().to_string();
            match doc.local_name(field) {
                Some(node::SCHEME_TERRITORY) => pointer.territory = value,
                Some(node::MIME_TYPE) => pointer.mime_type = value,
                Some(node::TSL_TYPE) => pointer.tsl_type = value,
                _ => {}
            }
        }
    }
    pointer
}

fn read_provider(doc: &XmlDocument, id: NodeId) -> TrustServiceProvider {
    let information = doc
        .find_child(id, TSL, node::TSP_INFORMATION)
        .map(|info| TspInformation {
            names: names(doc, info, node::TSP_NAME),
            trade_names: names(doc, info, node::TSP_TRADE_NAME),
        })
        .unwrap_or_default();

    let services = doc
        .find_child(id, TSL, node::TSP_SERVICES)
        .map(|s| {
            doc.find_children(s, TSL, node::TSP_SERVICE)
                .into_iter()
                .map(|svc| read_service(doc, svc))
                .collect()
        })
        .unwrap_or_default();

    TrustServiceProvider { information, services }
}

fn read_service(doc: &XmlDocument, id: NodeId) -> TspService {
    let info = doc.find_child(id, TSL, node::SERVICE_INFORMATION);
    let information = info.map(|i| read_service_information(doc, i)).unwrap_or_default();
    let extensions = info.map(|i| read_extensions(doc, i)).unwrap_or_default();

    let history = doc
        .find_child(id, TSL, node::SERVICE_HISTORY)
        .map(|h| {
            doc.find_children(h, TSL, node::SERVICE_HISTORY_INSTANCE)
                .into_iter()
                .map(|instance| ServiceHistoryInstance {
                    information: read_service_information(doc, instance),
                    extensions: read_extensions(doc, instance),
                })
                .collect()
        })
        .unwrap_or_default();

    TspService {
        information,
        extensions,
        history,
    }
}

fn read_service_information(doc: &XmlDocument, id: NodeId) -> ServiceInformation {
    ServiceInformation {
        type_identifier: text(doc, id, node::SERVICE_TYPE_IDENTIFIER),
        names: names(doc, id, node::SERVICE_NAME),
        status: text(doc, id, node::SERVICE_STATUS),
        status_starting_time: doc
            .child_text(id, TSL, node::STATUS_STARTING_TIME)
            .and_then(|t| read_time(&t)),
    }
}

fn read_extensions(doc: &XmlDocument, id: NodeId) -> Vec<Extension> {
    let Some(list) = doc.find_child(id, TSL, node::SERVICE_INFORMATION_EXTENSIONS) else {
        return Vec::new();
    };
    doc.find_children(list, TSL, node::EXTENSION)
        .into_iter()
        .map(|ext| {
            let critical = doc.attribute(ext, attr::CRITICAL).is_some_and(|v| v == "true" || v == "1");
            let content = doc
                .child_elements(ext)
                .into_iter()
                .filter_map(|c| read_extension_content(doc, c))
                .collect();
            Extension::new(critical, content)
        })
        .collect()
}

fn read_extension_content(doc: &XmlDocument, id: NodeId) -> Option<ExtensionContent> {
    let content = match doc.local_name(id)? {
        node::QUALIFICATIONS => ExtensionContent::Qualifications(
            doc.find_children(id, ECC, node::QUALIFICATION_ELEMENT)
                .into_iter()
                .map(|q| read_qualification(doc, q))
                .collect(),
        ),
        node::TAKEN_OVER_BY => ExtensionContent::TakenOverBy(TakenOverBy {
            uri: text(doc, id, node::URI),
            tsp_names: names(doc, id, node::TSP_NAME),
            scheme_territory: text(doc, id, node::SCHEME_TERRITORY),
        }),
        node::ADDITIONAL_SERVICE_INFORMATION => {
            ExtensionContent::AdditionalServiceInformation(AdditionalServiceInformation {
                uri: text(doc, id, node::URI),
                information_value: doc.child_text(id, TSL, node::INFORMATION_VALUE),
            })
        }
        node::EXPIRED_CERTS_REVOCATION_INFO => {
            ExtensionContent::ExpiredCertsRevocationInfo(read_time(&doc.text_content(id))?)
        }
        other => {
            debug!("skipping unknown extension content '{}'", other);
            return None;
        }
    };
    Some(content)
}

fn read_qualification(doc: &XmlDocument, id: NodeId) -> QualificationElement {
    let qualifiers = doc
        .find_child(id, ECC, node::QUALIFIERS)
        .map(|q| {
            doc.find_children(q, ECC, node::QUALIFIER)
                .into_iter()
                .filter_map(|q| doc.attribute(q, attr::QUALIFIER_URI).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let criteria_assert = doc
        .find_child(id, ECC, node::CRITERIA_LIST)
        .and_then(|c| doc.attribute(c, attr::ASSERT).map(str::to_string));

    QualificationElement {
        qualifiers,
        criteria_assert,
    }
}
