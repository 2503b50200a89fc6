//! Tree node variants of the document outline.

use std::cell::OnceCell;
use std::fmt;

use chrono::{DateTime, Utc};
use generational_arena::Index;

use crate::domain::entities::{
    uri_suffix, Extension, MultiLangName, OtherTslPointer, QualificationElement, SchemeInformation,
    ServiceInformation, TspInformation,
};

/// Kind of a tree node, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Tsp,
    Service,
    History,
    Extension,
    Pointer,
    Qualification,
}

impl NodeKind {
    /// Icon identifier shown next to the node.
    pub fn icon(self) -> &'static str {
        match self {
            NodeKind::Root => "tsl",
            NodeKind::Tsp => "tsp",
            NodeKind::Service => "service",
            NodeKind::History => "history",
            NodeKind::Extension => "extension",
            NodeKind::Pointer => "pointer",
            NodeKind::Qualification => "qualification",
        }
    }

    /// Service and TSP labels derive from multilingual lists that are
    /// edited in place, so they are recomputed on every read.
    pub fn caches_label(self) -> bool {
        !matches!(self, NodeKind::Service | NodeKind::Tsp)
    }

    /// Pointer and Qualification nodes never have children.
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Pointer | NodeKind::Qualification)
    }

    /// Whether a node of this kind may hold a child of kind `child`.
    pub fn accepts(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Root => matches!(child, NodeKind::Pointer | NodeKind::Tsp),
            NodeKind::Tsp => child == NodeKind::Service,
            NodeKind::Service => matches!(child, NodeKind::History | NodeKind::Extension),
            NodeKind::History => child == NodeKind::Extension,
            NodeKind::Extension => child == NodeKind::Qualification,
            NodeKind::Pointer | NodeKind::Qualification => false,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            NodeKind::Root => "Trusted List",
            NodeKind::Tsp => "Trust Service Provider",
            NodeKind::Service => "Service",
            NodeKind::History => "History",
            NodeKind::Extension => "Extension",
            NodeKind::Pointer => "Pointer",
            NodeKind::Qualification => "Qualification",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.icon())
    }
}

/// Schema record carried by a node. `None` means the node was created
/// before any data was assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Root(Option<SchemeInformation>),
    Tsp(Option<TspInformation>),
    Service(Option<ServiceInformation>),
    History(Option<ServiceInformation>),
    Extension(Option<Extension>),
    Pointer(Option<OtherTslPointer>),
    Qualification(Option<QualificationElement>),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Root(_) => NodeKind::Root,
            NodePayload::Tsp(_) => NodeKind::Tsp,
            NodePayload::Service(_) => NodeKind::Service,
            NodePayload::History(_) => NodeKind::History,
            NodePayload::Extension(_) => NodeKind::Extension,
            NodePayload::Pointer(_) => NodeKind::Pointer,
            NodePayload::Qualification(_) => NodeKind::Qualification,
        }
    }

    /// Status starting time, only meaningful for history nodes.
    pub fn status_starting_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            NodePayload::History(Some(info)) => info.status_starting_time.as_ref(),
            _ => None,
        }
    }

    fn compute_label(&self) -> Option<String> {
        match self {
            NodePayload::Root(scheme) => scheme.as_ref().map(|s| {
                let operator = MultiLangName::preferred(&s.operator_names).unwrap_or_default();
                format!("{}: {}", s.territory, operator)
            }),
            NodePayload::Tsp(info) => info
                .as_ref()
                .and_then(|i| MultiLangName::preferred(&i.names))
                .map(str::to_string),
            NodePayload::Service(info) => info
                .as_ref()
                .and_then(|i| MultiLangName::preferred(&i.names))
                .map(str::to_string),
            NodePayload::History(info) => info.as_ref().map(|i| {
                let status = uri_suffix(&i.status);
                match i.status_starting_time {
                    Some(time) => format!("{} {}", time.format("%Y-%m-%d %H:%M:%S"), status),
                    None => status.to_string(),
                }
            }),
            NodePayload::Extension(ext) => ext.as_ref().map(Extension::label),
            NodePayload::Pointer(pointer) => pointer
                .as_ref()
                .map(|p| OtherTslPointer::label(&p.territory, &p.mime_type)),
            NodePayload::Qualification(qualification) => qualification
                .as_ref()
                .map(|q| itertools::join(q.qualifiers.iter().map(|uri| uri_suffix(uri)), ", ")),
        }
    }
}

/// A node in the document outline.
#[derive(Debug)]
pub struct TslNode {
    payload: NodePayload,
    /// Parent node, a navigation link only; the arena owns every node
    pub parent: Option<Index>,
    /// Child nodes in display order
    pub children: Vec<Index>,
    label: OnceCell<String>,
}

impl TslNode {
    pub fn new(payload: NodePayload) -> Self {
        Self {
            payload,
            parent: None,
            children: Vec::new(),
            label: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn icon(&self) -> &'static str {
        self.kind().icon()
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    /// Mutable access to the payload; the cached label is dropped.
    pub fn payload_mut(&mut self) -> &mut NodePayload {
        self.reset_label();
        &mut self.payload
    }

    /// Replace the payload; the cached label is dropped.
    pub fn set_payload(&mut self, payload: NodePayload) -> NodePayload {
        self.reset_label();
        std::mem::replace(&mut self.payload, payload)
    }

    pub(crate) fn into_payload(self) -> NodePayload {
        self.payload
    }

    /// Display label, computed from the payload.
    pub fn label(&self) -> String {
        if !self.kind().caches_label() {
            return self.compute_label();
        }
        self.label.get_or_init(|| self.compute_label()).clone()
    }

    /// Forget the cached label so the next read recomputes it.
    pub fn reset_label(&mut self) {
        self.label = OnceCell::new();
    }

    /// Whether a label is currently cached.
    pub fn has_cached_label(&self) -> bool {
        self.label.get().is_some()
    }

    /// Key the tree sort compares: the payload label, or an empty string
    /// for a node without data. The placeholder is never sorted on.
    pub fn sort_label(&self) -> String {
        self.payload.compute_label().unwrap_or_default()
    }

    fn compute_label(&self) -> String {
        self.payload
            .compute_label()
            .unwrap_or_else(|| self.kind().placeholder().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pointer(territory: &str, mime: &str) -> NodePayload {
        NodePayload::Pointer(Some(OtherTslPointer {
            territory: territory.into(),
            mime_type: mime.into(),
            ..Default::default()
        }))
    }

    #[test]
    fn given_pointer_when_label_then_caches_until_reset() {
        let mut node = TslNode::new(pointer("AT", "application/pdf"));
        assert!(!node.has_cached_label());
        assert_eq!(node.label(), "AT - application/pdf");
        assert!(node.has_cached_label());

        node.reset_label();
        assert!(!node.has_cached_label());
    }

    #[test]
    fn given_payload_mutation_when_label_then_recomputed() {
        let mut node = TslNode::new(pointer("AT", "application/pdf"));
        assert_eq!(node.label(), "AT - application/pdf");

        if let NodePayload::Pointer(Some(p)) = node.payload_mut() {
            p.territory = "BE".into();
        }
        assert_eq!(node.label(), "BE - application/pdf");
    }

    #[test]
    fn given_tsp_node_when_label_then_never_cached() {
        let node = TslNode::new(NodePayload::Tsp(Some(TspInformation {
            names: vec![MultiLangName::new("en", "ACME Trust")],
            trade_names: vec![],
        })));
        assert_eq!(node.label(), "ACME Trust");
        assert!(!node.has_cached_label());
    }

    #[test]
    fn given_empty_payload_when_label_then_placeholder() {
        let node = TslNode::new(NodePayload::Service(None));
        assert_eq!(node.label(), "Service");
    }

    #[test]
    fn given_history_when_label_then_time_and_status() {
        let node = TslNode::new(NodePayload::History(Some(ServiceInformation {
            status: "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/withdrawn".into(),
            status_starting_time: Some(Utc.with_ymd_and_hms(2016, 6, 30, 22, 0, 0).unwrap()),
            ..Default::default()
        })));
        assert_eq!(node.label(), "2016-06-30 22:00:00 withdrawn");
    }

    #[test]
    fn given_kinds_when_accepts_then_follow_document_structure() {
        assert!(NodeKind::Root.accepts(NodeKind::Pointer));
        assert!(NodeKind::Root.accepts(NodeKind::Tsp));
        assert!(!NodeKind::Root.accepts(NodeKind::Service));
        assert!(NodeKind::Service.accepts(NodeKind::History));
        assert!(!NodeKind::Pointer.accepts(NodeKind::Qualification));
        assert!(NodeKind::Qualification.is_leaf());
    }
}
