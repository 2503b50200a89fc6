//! XML layer: a mutable DOM for Trusted List documents and the routines
//! that normalize it before it is signed or saved.
//!
//! Parsing goes through `roxmltree`, writing through `quick-xml`; in
//! between the document lives in an arena of nodes that can be reordered
//! and pruned in place.

pub mod document;
pub mod error;
pub mod extensions;
pub mod normalize;
pub mod parse;
pub mod reader;
pub mod sort;
pub mod write;

pub use document::{Attribute, NamespaceDecl, NodeId, QName, XmlDocument, XmlNode, XmlNodeKind};
pub use error::{XmlError, XmlResult};
pub use extensions::{wrap_all_extensions, wrap_extensions_individually};
pub use normalize::remove_empty_nodes_from_the_bottom;
pub use parse::parse;
pub use reader::read_trust_status_list;
pub use sort::sort_child_nodes;
pub use write::{node_to_string, to_string, WriteOptions};
