//! Domain layer: document model, outline tree and ordering rules
//!
//! This layer is independent of external concerns (no XML, no I/O, no config loading).

pub mod arena;
pub mod display;
pub mod duplicate;
pub mod entities;
pub mod error;
pub mod extensions;
pub mod names;
pub mod node;
pub mod ordering;

pub use arena::TslTree;
pub use display::TreeNodeConvert;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use node::{NodeKind, NodePayload, TslNode};
