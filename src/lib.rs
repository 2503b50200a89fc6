//! Editing core for ETSI Trusted Lists: outline tree, ordering rules and
//! the document normalization applied before a list is signed.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
pub mod xml;
