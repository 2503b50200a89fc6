use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::entities::{
    Extension, ExtensionContent, QualificationElement, ServiceHistoryInstance, TrustServiceProvider,
    TrustStatusList, TspService,
};
use crate::domain::node::{NodeKind, NodePayload, TslNode};
use crate::domain::ordering::{compare_pointer_labels, compare_status_times, lexical, reverse_lexical};
use crate::domain::{DomainError, DomainResult};

/// What a sibling comparator needs to know about a child.
#[derive(Debug)]
struct SortKey {
    idx: Index,
    kind: NodeKind,
    label: String,
    time: Option<DateTime<Utc>>,
}

type SiblingOrder = fn(&SortKey, &SortKey) -> Ordering;

/// Comparator applied to the children of a node of kind `parent`.
///
/// `None` means the children keep their order (they are still sorted recursively).
fn sibling_order(parent: NodeKind) -> Option<SiblingOrder> {
    match parent {
        NodeKind::Root => Some(compare_root_children as SiblingOrder),
        NodeKind::Tsp | NodeKind::History => Some(compare_labels as SiblingOrder),
        NodeKind::Service => Some(compare_service_children as SiblingOrder),
        NodeKind::Extension | NodeKind::Pointer | NodeKind::Qualification => None,
    }
}

fn compare_labels(a: &SortKey, b: &SortKey) -> Ordering {
    lexical(&a.label, &b.label)
}

fn compare_root_children(a: &SortKey, b: &SortKey) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Pointer, NodeKind::Pointer) => compare_pointer_labels(&a.label, &b.label),
        (NodeKind::Pointer, _) => Ordering::Less,
        (_, NodeKind::Pointer) => Ordering::Greater,
        _ => reverse_lexical(&a.label, &b.label),
    }
}

fn compare_service_children(a: &SortKey, b: &SortKey) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::History, NodeKind::History) => compare_status_times(a.time.as_ref(), b.time.as_ref()),
        (NodeKind::History, NodeKind::Extension) => Ordering::Less,
        (NodeKind::Extension, NodeKind::History) => Ordering::Greater,
        _ => lexical(&a.label, &b.label),
    }
}

/// Arena-based outline of a Trusted List document.
///
/// The arena owns every node; parents refer to children by index and
/// children point back to their parent for navigation only.
#[derive(Debug)]
pub struct TslTree {
    /// Arena storage for all tree nodes
    arena: Arena<TslNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TslTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TslTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node below `parent`, or as the root when `parent` is None.
    ///
    /// The node kind must fit the document structure (e.g. services only
    /// below TSPs), and only a Root node can be the root.
    #[instrument(level = "trace", skip(self, payload))]
    pub fn insert_node(&mut self, payload: NodePayload, parent: Option<Index>) -> DomainResult<Index> {
        let kind = payload.kind();
        match parent {
            Some(parent_idx) => {
                let parent_kind = self.get_node(parent_idx).ok_or(DomainError::NodeNotFound)?.kind();
                if !parent_kind.accepts(kind) {
                    return Err(DomainError::InvalidChild {
                        parent: parent_kind.to_string(),
                        child: kind.to_string(),
                    });
                }
            }
            None if kind != NodeKind::Root => {
                return Err(DomainError::InvalidChild {
                    parent: "document".to_string(),
                    child: kind.to_string(),
                });
            }
            None => {
                if let Some(old_root) = self.root {
                    self.remove_node(old_root)?;
                }
            }
        }
        Ok(self.attach(parent, payload))
    }

    fn attach(&mut self, parent: Option<Index>, payload: NodePayload) -> Index {
        let mut node = TslNode::new(payload);
        node.parent = parent;
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Remove a node and its whole subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, idx: Index) -> DomainResult<()> {
        let parent = self.get_node(idx).ok_or(DomainError::NodeNotFound)?.parent;

        let doomed: Vec<Index> = PostOrderIterator::starting_at(self, idx).map(|(i, _)| i).collect();
        for i in doomed {
            self.arena.remove(i);
        }

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.retain(|&c| c != idx);
                }
            }
            None => self.root = None,
        }
        Ok(())
    }

    pub fn get_node(&self, idx: Index) -> Option<&TslNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TslNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Labels of the direct children of `idx`, in current order.
    pub fn child_labels(&self, idx: Index) -> Vec<String> {
        self.get_node(idx)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.get_node(c))
                    .map(TslNode::label)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Sort the whole tree from the root down.
    pub fn sort_all(&mut self) -> DomainResult<()> {
        match self.root {
            Some(root) => self.sort(root),
            None => Ok(()),
        }
    }

    /// Reorder the children of `idx` by the rule of its kind, then sort every child.
    #[instrument(level = "trace", skip(self))]
    pub fn sort(&mut self, idx: Index) -> DomainResult<()> {
        let node = self.get_node(idx).ok_or(DomainError::NodeNotFound)?;
        let kind = node.kind();
        if kind.is_leaf() {
            return Ok(());
        }

        let mut children = node.children.clone();
        if kind == NodeKind::Extension {
            self.sort_extension_content(idx);
        }
        if let Some(order) = sibling_order(kind).filter(|_| children.len() > 1) {
            let mut keys: Vec<SortKey> = children
                .iter()
                .filter_map(|&c| self.get_node(c).map(|n| (c, n)))
                .map(|(c, n)| SortKey {
                    idx: c,
                    kind: n.kind(),
                    label: n.sort_label(),
                    time: n.payload().status_starting_time().copied(),
                })
                .collect();
            // stable: children without a distinguishing key keep their order
            keys.sort_by(order);
            children = keys.into_iter().map(|k| k.idx).collect();
            debug!("sorted {} children of {} node", children.len(), kind);

            if let Some(node) = self.get_node_mut(idx) {
                node.children = children.clone();
            }
        }

        for child in children {
            self.sort(child)?;
        }
        Ok(())
    }

    /// Order the content elements of an extension by element name, the
    /// same fallback the DOM sort applies to an `Extension` element.
    fn sort_extension_content(&mut self, idx: Index) {
        let sorted = |content: &[ExtensionContent]| {
            content
                .windows(2)
                .all(|pair| pair[0].expanded_name() <= pair[1].expanded_name())
        };
        let Some(node) = self.get_node_mut(idx) else {
            return;
        };
        if matches!(node.payload(), NodePayload::Extension(Some(ext)) if sorted(ext.content.as_slice())) {
            return;
        }
        if let NodePayload::Extension(Some(ext)) = node.payload_mut() {
            ext.content.sort_by_cached_key(ExtensionContent::expanded_name);
        }
    }

    /// Build the outline of a typed document.
    ///
    /// Children are inserted in document order: pointers, then providers;
    /// below a service its extensions come before its history.
    #[instrument(level = "debug", skip_all)]
    pub fn from_list(list: TrustStatusList) -> Self {
        let mut tree = Self::new();
        let root = tree.attach(None, NodePayload::Root(Some(list.scheme)));

        for pointer in list.pointers {
            tree.attach(Some(root), NodePayload::Pointer(Some(pointer)));
        }
        for provider in list.providers {
            let tsp = tree.attach(Some(root), NodePayload::Tsp(Some(provider.information)));
            for service in provider.services {
                let service_idx = tree.attach(Some(tsp), NodePayload::Service(Some(service.information)));
                tree.attach_extensions(service_idx, service.extensions);
                for instance in service.history {
                    let history = tree.attach(Some(service_idx), NodePayload::History(Some(instance.information)));
                    tree.attach_extensions(history, instance.extensions);
                }
            }
        }
        debug!("built outline with {} nodes", tree.len());
        tree
    }

    fn attach_extensions(&mut self, parent: Index, extensions: Vec<Extension>) {
        for mut extension in extensions {
            // qualification elements live on as child nodes
            let qualifications: Vec<QualificationElement> = extension
                .content
                .iter_mut()
                .flat_map(|content| match content {
                    ExtensionContent::Qualifications(elements) => std::mem::take(elements),
                    _ => Vec::new(),
                })
                .collect();
            let ext_idx = self.attach(Some(parent), NodePayload::Extension(Some(extension)));
            for qualification in qualifications {
                self.attach(Some(ext_idx), NodePayload::Qualification(Some(qualification)));
            }
        }
    }

    /// Reassemble the typed document in the current child order.
    #[instrument(level = "debug", skip_all)]
    pub fn into_list(mut self) -> DomainResult<TrustStatusList> {
        let root = self.root.ok_or(DomainError::EmptyTree)?;
        let (payload, children) = self.take(root)?;
        let NodePayload::Root(scheme) = payload else {
            return Err(DomainError::EmptyTree);
        };

        let mut list = TrustStatusList {
            scheme: scheme.unwrap_or_default(),
            ..Default::default()
        };
        for child in children {
            match self.take(child)? {
                (NodePayload::Pointer(pointer), _) => list.pointers.push(pointer.unwrap_or_default()),
                (NodePayload::Tsp(information), services) => {
                    let mut provider = TrustServiceProvider {
                        information: information.unwrap_or_default(),
                        services: Vec::with_capacity(services.len()),
                    };
                    for service in services {
                        provider.services.push(self.take_service(service)?);
                    }
                    list.providers.push(provider);
                }
                (other, _) => return Err(invalid_child(NodeKind::Root, other.kind())),
            }
        }
        Ok(list)
    }

    fn take(&mut self, idx: Index) -> DomainResult<(NodePayload, Vec<Index>)> {
        let mut node = self.arena.remove(idx).ok_or(DomainError::NodeNotFound)?;
        let children = std::mem::take(&mut node.children);
        Ok((node.into_payload(), children))
    }

    fn take_service(&mut self, idx: Index) -> DomainResult<TspService> {
        let (payload, children) = self.take(idx)?;
        let kind = payload.kind();
        let NodePayload::Service(information) = payload else {
            return Err(invalid_child(NodeKind::Tsp, kind));
        };

        let mut service = TspService {
            information: information.unwrap_or_default(),
            ..Default::default()
        };
        for child in children {
            match self.take(child)? {
                (NodePayload::History(information), extensions) => {
                    let mut instance = ServiceHistoryInstance {
                        information: information.unwrap_or_default(),
                        extensions: Vec::with_capacity(extensions.len()),
                    };
                    for ext in extensions {
                        instance.extensions.push(self.take_extension(ext, NodeKind::History)?);
                    }
                    service.history.push(instance);
                }
                (NodePayload::Extension(extension), qualifications) => {
                    service
                        .extensions
                        .push(self.rebuild_extension(extension, qualifications)?);
                }
                (other, _) => return Err(invalid_child(NodeKind::Service, other.kind())),
            }
        }
        Ok(service)
    }

    fn take_extension(&mut self, idx: Index, parent: NodeKind) -> DomainResult<Extension> {
        match self.take(idx)? {
            (NodePayload::Extension(extension), qualifications) => self.rebuild_extension(extension, qualifications),
            (other, _) => Err(invalid_child(parent, other.kind())),
        }
    }

    fn rebuild_extension(&mut self, extension: Option<Extension>, children: Vec<Index>) -> DomainResult<Extension> {
        let mut extension = extension.unwrap_or_default();
        let mut elements = Vec::with_capacity(children.len());
        for child in children {
            match self.take(child)? {
                (NodePayload::Qualification(q), _) => elements.push(q.unwrap_or_default()),
                (other, _) => return Err(invalid_child(NodeKind::Extension, other.kind())),
            }
        }
        if elements.is_empty() {
            return Ok(extension);
        }

        let slot = extension.content.iter_mut().find_map(|content| match content {
            ExtensionContent::Qualifications(existing) => Some(existing),
            _ => None,
        });
        match slot {
            Some(existing) => existing.extend(elements),
            None => extension.content.push(ExtensionContent::Qualifications(elements)),
        }
        Ok(extension)
    }
}

fn invalid_child(parent: NodeKind, child: NodeKind) -> DomainError {
    DomainError::InvalidChild {
        parent: parent.to_string(),
        child: child.to_string(),
    }
}

pub struct TreeIterator<'a> {
    tree: &'a TslTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TslTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TslNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a TslTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a TslTree) -> Self {
        match tree.root() {
            Some(root) => Self::starting_at(tree, root),
            None => Self {
                tree,
                stack: Vec::new(),
            },
        }
    }

    /// Post-order walk of the subtree rooted at `start`.
    fn starting_at(tree: &'a TslTree, start: Index) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TslNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
