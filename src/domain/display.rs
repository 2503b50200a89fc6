use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::TslTree;
use crate::domain::node::TslNode;

/// Render a structure as a printable `termtree`.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn node_line(node: &TslNode) -> String {
    format!("[{}] {}", node.icon(), node.label())
}

impl TreeNodeConvert for TslTree {
    fn to_tree_string(&self) -> Tree<String> {
        let Some(root) = self.root().and_then(|idx| self.get_node(idx).map(|n| (idx, n))) else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree(tree: &TslTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = tree.get_node(child_idx) {
                        let mut child_tree = Tree::new(node_line(child));
                        build_tree(tree, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let (root_idx, root_node) = root;
        let mut rendered = Tree::new(node_line(root_node));
        build_tree(self, root_idx, &mut rendered);
        rendered
    }
}
