//! Trusted List document service
//!
//! Loads documents through the filesystem boundary, builds the outline
//! tree and runs the save pipeline (sort, prune, split extensions).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{NormalizeConfig, Settings};
use crate::domain::{TrustStatusList, TslTree};
use crate::infrastructure::traits::FileSystem;
use crate::xml::{
    parse, read_trust_status_list, remove_empty_nodes_from_the_bottom, sort_child_nodes, to_string, wrap_all_extensions,
    WriteOptions, XmlDocument, XmlError,
};

/// A parsed document together with where it came from.
#[derive(Debug)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub doc: XmlDocument,
}

/// What the save pipeline changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Whether collection elements were sorted
    pub sorted: bool,
    /// Number of nodes pruned as empty
    pub nodes_removed: usize,
    /// Number of extension lists that had entries split
    pub extensions_split: usize,
}

/// Service for loading, normalizing and saving Trusted List documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read and parse a document.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<LoadedDocument> {
        let content = self.fs.read_to_string(path).with_path_context("read document", path)?;
        let doc = parse(&content)?;
        debug!("load: {} nodes from {}", doc.len(), path.display());
        Ok(LoadedDocument {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Serialize a document with the configured indentation.
    pub fn render(&self, doc: &XmlDocument) -> ApplicationResult<String> {
        let options = WriteOptions {
            indent: self.settings.indent,
            ..WriteOptions::default()
        };
        Ok(to_string(doc, options)?)
    }

    /// Serialize and write a document, creating parent directories as needed.
    #[instrument(level = "debug", skip(self, doc))]
    pub fn save(&self, doc: &XmlDocument, path: &Path) -> ApplicationResult<()> {
        let content = self.render(doc)?;
        self.fs.ensure_parent(path).with_path_context("create parent directory", path)?;
        self.fs.write(path, &content).with_path_context("write document", path)?;
        info!("Saved {}", path.display());
        Ok(())
    }

    /// Map a loaded document onto the typed records.
    pub fn read_list(&self, loaded: &LoadedDocument) -> ApplicationResult<TrustStatusList> {
        read_trust_status_list(&loaded.doc).map_err(|e| match e {
            XmlError::MissingElement(_) => ApplicationError::NotATrustedList(loaded.path.clone()),
            other => other.into(),
        })
    }

    /// Build the outline tree of a document, optionally sorted.
    #[instrument(level = "debug", skip(self))]
    pub fn outline(&self, path: &Path, sorted: bool) -> ApplicationResult<TslTree> {
        let loaded = self.load(path)?;
        let list = self.read_list(&loaded)?;
        let mut tree = TslTree::from_list(list);
        if sorted {
            tree.sort_all()?;
        }
        Ok(tree)
    }

    /// Run the save pipeline on a document.
    ///
    /// Steps run in order: sort collections, prune empty nodes, split
    /// extensions. Each step can be switched off in `options`.
    #[instrument(level = "debug", skip(self, doc))]
    pub fn normalize(&self, doc: &mut XmlDocument, options: NormalizeConfig) -> ApplicationResult<NormalizeReport> {
        let root = doc
            .root()
            .ok_or_else(|| XmlError::Structure("document has no root element".into()))?;
        let mut report = NormalizeReport::default();

        if options.sort_children {
            sort_child_nodes(doc, root, options.descending)?;
            report.sorted = true;
        }
        if options.remove_empty {
            let before = doc.len();
            remove_empty_nodes_from_the_bottom(doc, root);
            report.nodes_removed = before.saturating_sub(doc.len());
        }
        if options.split_extensions {
            report.extensions_split = wrap_all_extensions(doc)?;
        }

        debug!("normalize: {:?}", report);
        Ok(report)
    }

    /// Sort collection elements only.
    pub fn sort(&self, doc: &mut XmlDocument, descending: bool) -> ApplicationResult<()> {
        let root = doc
            .root()
            .ok_or_else(|| XmlError::Structure("document has no root element".into()))?;
        sort_child_nodes(doc, root, descending)?;
        Ok(())
    }
}
