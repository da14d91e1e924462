//! Indexer type definitions.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{
    Catalog,
    CatalogError,
};
use crate::config::MatcherError;

/// A catalogue loaded from the workspace.
#[derive(Debug, Clone)]
pub struct IndexedCatalog {
    pub path: PathBuf,
    /// Declared language, else the one in the file name.
    pub language: Option<String>,
    pub catalog: Arc<Catalog>,
}

/// A catalogue file that could not be loaded.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: Arc<CatalogError>,
}

#[derive(Error, Debug)]
pub enum IndexerError {
    /// The path to index does not exist
    #[error("Path does not exist: {0}")]
    InvalidPath(PathBuf),

    /// The configured file patterns could not be compiled
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}
