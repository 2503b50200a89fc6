//! Arena-backed mutable XML tree.

use generational_arena::{Arena, Index};

use crate::xml::{XmlError, XmlResult};

/// Handle of a node inside an [`XmlDocument`].
pub type NodeId = Index;

/// Namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    /// Prefix used when writing; `None` writes the name unprefixed
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Whether this name is `local` in namespace `ns`.
    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(ns)
    }

    /// Name as written in the document, `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Prefix-independent name, `{namespace}local`.
    pub fn expanded(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// A namespace declared on an element (`xmlns` or `xmlns:prefix`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNodeKind {
    Element {
        name: QName,
        attributes: Vec<Attribute>,
        namespaces: Vec<NamespaceDecl>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: XmlNodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// An owned, mutable XML document.
///
/// Nodes are addressed by [`NodeId`]. Removing a node drops its whole
/// subtree; handles to removed nodes simply stop resolving.
#[derive(Debug, Default)]
pub struct XmlDocument {
    arena: Arena<XmlNode>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document element.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: XmlNodeKind) -> NodeId {
        self.arena.insert(XmlNode {
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.create(XmlNodeKind::Element {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(XmlNodeKind::Text(text.into()))
    }

    pub fn node(&self, id: NodeId) -> Option<&XmlNode> {
        self.arena.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut XmlNode> {
        self.arena.get_mut(id)
    }

    /// Append `child` as last child of `parent`, detaching it from its old parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> XmlResult<()> {
        if !self.arena.contains(parent) || !self.arena.contains(child) {
            return Err(XmlError::StaleNode);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(XmlError::Structure("cannot append a node below itself".into()));
        }
        self.detach(child);
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Unlink a node from its parent; the node stays alive and detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.parent = None;
        }
    }

    /// Unlink a node and drop its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        let doomed = self.descendants(id);
        for node in doomed {
            self.arena.remove(node);
        }
        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Replace the child list of `parent`.
    ///
    /// Every new child is re-parented; former children that are not in the
    /// new list are detached but stay alive.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> XmlResult<()> {
        if !self.arena.contains(parent) || children.iter().any(|&c| !self.arena.contains(c)) {
            return Err(XmlError::StaleNode);
        }
        for old in self.children(parent) {
            if let Some(node) = self.arena.get_mut(old) {
                node.parent = None;
            }
        }
        for &child in &children {
            self.detach(child);
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children = children;
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Snapshot of the children of `id`, safe to hold across mutations.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| !n.children.is_empty())
    }

    /// Child elements of `id`, skipping text, comments and PIs.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|&c| self.element_name(c).is_some())
            .collect()
    }

    /// First child element named `local` in namespace `ns`.
    pub fn find_child(&self, id: NodeId, ns: &str, local: &str) -> Option<NodeId> {
        self.node(id)?
            .children
            .iter()
            .copied()
            .find(|&c| self.is_element(c, ns, local))
    }

    /// Child elements named `local` in namespace `ns`.
    pub fn find_children(&self, id: NodeId, ns: &str, local: &str) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|&c| self.is_element(c, ns, local))
            .collect()
    }

    /// Follow a path of child element names from `id`.
    pub fn find_path(&self, id: NodeId, path: &[(&str, &str)]) -> Option<NodeId> {
        path.iter()
            .try_fold(id, |current, (ns, local)| self.find_child(current, ns, local))
    }

    /// First descendant element (excluding `id` itself) named `local` in namespace `ns`.
    pub fn find_descendant(&self, id: NodeId, ns: &str, local: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .find(|&d| self.is_element(d, ns, local))
    }

    /// All elements of the document named `local` in namespace `ns`, in document order.
    pub fn find_elements(&self, ns: &str, local: &str) -> Vec<NodeId> {
        self.root
            .map(|root| {
                self.descendants(root)
                    .into_iter()
                    .filter(|&d| self.is_element(d, ns, local))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `id` and every node below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                result.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        result
    }

    pub fn element_name(&self, id: NodeId) -> Option<&QName> {
        match &self.node(id)?.kind {
            XmlNodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element_name(id).map(|n| n.local.as_str())
    }

    pub fn is_element(&self, id: NodeId, ns: &str, local: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.is(ns, local))
    }

    /// DOM-style node name: the expanded element name, `#text`, `#comment`
    /// or the PI target.
    pub fn node_name(&self, id: NodeId) -> String {
        match self.node(id).map(|n| &n.kind) {
            Some(XmlNodeKind::Element { name, .. }) => name.expanded(),
            Some(XmlNodeKind::Text(_)) => "#text".to_string(),
            Some(XmlNodeKind::Comment(_)) => "#comment".to_string(),
            Some(XmlNodeKind::ProcessingInstruction { target, .. }) => target.clone(),
            None => String::new(),
        }
    }

    /// DOM-style text content: for elements the concatenated text of all
    /// descendants, for other nodes their own data.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(|n| &n.kind) {
            Some(XmlNodeKind::Element { .. }) => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| match &self.node(d)?.kind {
                    XmlNodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            Some(XmlNodeKind::Text(text)) | Some(XmlNodeKind::Comment(text)) => text.clone(),
            Some(XmlNodeKind::ProcessingInstruction { value, .. }) => value.clone().unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Trimmed text of the first child element named `local` in namespace `ns`.
    pub fn child_text(&self, id: NodeId, ns: &str, local: &str) -> Option<String> {
        self.find_child(id, ns, local)
            .map(|c| self.text_content(c).trim().to_string())
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.node(id).map(|n| &n.kind) {
            Some(XmlNodeKind::Element { attributes, .. }) => attributes.as_slice(),
            _ => &[],
        }
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Vec<Attribute>> {
        match &mut self.node_mut(id)?.kind {
            XmlNodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn has_attributes(&self, id: NodeId) -> bool {
        !self.attributes(id).is_empty()
    }

    /// Value of the attribute with local name `local`, whatever its namespace.
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: QName, value: impl Into<String>) -> XmlResult<()> {
        let attributes = self.attributes_mut(id).ok_or(XmlError::StaleNode)?;
        let value = value.into();
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute { name, value }),
        }
        Ok(())
    }
}
