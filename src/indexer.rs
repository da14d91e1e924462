//! Workspace catalogue indexing.
/// Indexer types and errors
pub mod types;
/// Parallel catalogue loader
pub mod workspace;

pub use types::{
    IndexedCatalog,
    IndexerError,
    LoadFailure,
};
pub use workspace::CatalogIndex;
